//! 兜底记录服务 - 业务能力层
//!
//! 只负责"把抓空的帖子记到 skipped.txt"能力，不关心流程

use anyhow::Result;
use std::fs::OpenOptions;
use std::io::Write;
use tracing::debug;

/// 兜底记录服务
pub struct SkippedWriter {
    skipped_file_path: String,
}

impl SkippedWriter {
    pub fn new() -> Self {
        Self {
            skipped_file_path: "skipped.txt".to_string(),
        }
    }

    /// 使用自定义文件路径创建
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            skipped_file_path: path.into(),
        }
    }

    /// 记录一个被跳过的帖子
    pub async fn write(&self, url: &str, post_index: usize, reason: &str) -> Result<()> {
        debug!("写入兜底记录: 帖子 {} | {} | 原因: {}", post_index, url, reason);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.skipped_file_path)?;

        let message = format!("帖子 {} | {} | 原因: {}\n", post_index, url, reason);
        file.write_all(message.as_bytes())?;

        Ok(())
    }
}

impl Default for SkippedWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skipped.txt");
        let writer = SkippedWriter::with_path(path.to_string_lossy().to_string());

        writer
            .write("https://m.weibo.cn/detail/1", 1, "零评论")
            .await
            .unwrap();
        writer
            .write("https://m.weibo.cn/detail/2", 2, "页面未就绪")
            .await
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.contains("零评论"));
    }
}
