//! 抓取任务模型
//!
//! 每个任务对应 tasks 目录下的一个 TOML 文件

use serde::{Deserialize, Serialize};

/// 一个帖子的抓取任务
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureTask {
    /// 帖子 URL
    pub url: String,
    /// 评论抓取上限（缺省时用全局配置）
    #[serde(default)]
    pub max_comments: Option<usize>,
    /// 是否展开楼中楼回复
    #[serde(default = "default_expand_replies")]
    pub expand_replies: bool,
    /// 任务来源文件（加载时填充）
    #[serde(skip)]
    pub file_path: Option<String>,
}

fn default_expand_replies() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_defaults() {
        let task: CaptureTask =
            toml::from_str(r#"url = "https://m.weibo.cn/detail/4000000000000000""#).unwrap();
        assert!(task.expand_replies);
        assert!(task.max_comments.is_none());
    }

    #[test]
    fn test_task_full_fields() {
        let task: CaptureTask = toml::from_str(
            r#"
            url = "https://m.weibo.cn/detail/1"
            max_comments = 50
            expand_replies = false
            "#,
        )
        .unwrap();
        assert_eq!(task.max_comments, Some(50));
        assert!(!task.expand_replies);
    }
}
