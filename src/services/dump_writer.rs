//! 抓取结果落盘服务 - 业务能力层
//!
//! 只负责"写一个帖子的 JSON 快照"能力，不关心流程

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;
use tracing::debug;

use crate::models::CapturedPost;

/// 抓取结果写入服务
pub struct DumpWriter {
    output_folder: PathBuf,
}

impl DumpWriter {
    pub fn new(output_folder: impl AsRef<Path>) -> Self {
        Self {
            output_folder: output_folder.as_ref().to_path_buf(),
        }
    }

    /// 写入单个帖子的抓取快照，返回落盘路径
    ///
    /// 文件名: post_{序号}_{本地时间}.json
    pub async fn write(&self, captured: &CapturedPost, post_index: usize) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_folder)
            .await
            .with_context(|| format!("无法创建输出目录: {}", self.output_folder.display()))?;

        let file_name = format!(
            "post_{}_{}.json",
            post_index,
            chrono::Local::now().format("%Y%m%d_%H%M%S")
        );
        let path = self.output_folder.join(file_name);

        let content = serde_json::to_string_pretty(captured)?;
        fs::write(&path, content)
            .await
            .with_context(|| format!("无法写入抓取结果: {}", path.display()))?;

        debug!(
            "已落盘: {} ({} 条评论, {} 条回复)",
            path.display(),
            captured.comments.len(),
            captured.replies.len()
        );
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CaptureStats, PostData};
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_write_creates_folder_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let writer = DumpWriter::new(dir.path().join("嵌套/输出"));

        let captured = CapturedPost {
            post: PostData::default(),
            comments: HashMap::new(),
            replies: HashMap::new(),
            captured_at: "2026-08-24T00:00:00+08:00".to_string(),
            stats: CaptureStats::default(),
        };

        let path = writer.write(&captured, 7).await.unwrap();
        assert!(path.exists());
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("post_7_"));
        assert!(name.ends_with(".json"));

        // 落盘内容可以解析回来
        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: CapturedPost = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.captured_at, captured.captured_at);
    }
}
