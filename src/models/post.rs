//! 帖子数据模型与抓取结果

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::comment::{CommentData, ReplyData};

/// 帖子正文与元数据
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostData {
    pub author: String,
    pub author_id: String,
    pub text: String,
    pub time_text: String,
    pub repost_count: u64,
    pub comment_count: u64,
    pub like_count: u64,
    pub url: String,
}

/// 抓取统计
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaptureStats {
    /// 刷新总轮次
    pub refresh_rounds: usize,
    /// 滚动次数
    pub scroll_attempts: usize,
    /// 翻过的页数
    pub pages_visited: usize,
    /// 展开回复的次数
    pub reply_expansions: usize,
}

/// 单个帖子的完整抓取结果（落盘 JSON 的根对象）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapturedPost {
    pub post: PostData,
    pub comments: HashMap<String, CommentData>,
    pub replies: HashMap<String, ReplyData>,
    /// 抓取完成时间（本地时区，RFC3339）
    pub captured_at: String,
    pub stats: CaptureStats,
}
