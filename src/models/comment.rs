//! 评论与回复数据模型

use serde::{Deserialize, Serialize};

/// JS 端抓取到的原始评论记录
///
/// 字段直接来自 DOM 文本，未做清洗；缺失字段由 serde 默认值兜底
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCommentRecord {
    #[serde(default)]
    pub author: String,
    /// 作者主页 href（形如 /u/1234567890），用于提取 author_id
    #[serde(default)]
    pub author_href: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub time_text: String,
    /// 点赞数原始文本（如 "赞 386"、"1.2万"、空串）
    #[serde(default)]
    pub like_text: String,
    /// 回复数原始文本（如 "共3条回复"）
    #[serde(default)]
    pub reply_text: String,
}

/// JS 端抓取到的原始回复记录
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawReplyRecord {
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub author_href: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub time_text: String,
    #[serde(default)]
    pub like_text: String,
    /// 所属评论卡片在 DOM 中的下标
    #[serde(default)]
    pub parent_index: usize,
}

/// 一条评论
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentData {
    pub id: String,
    pub author: String,
    pub author_id: String,
    pub content: String,
    pub time_text: String,
    pub like_count: u64,
    pub reply_count: u64,
}

/// 一条回复（隶属于某条评论）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyData {
    pub id: String,
    pub parent_comment_id: String,
    pub author: String,
    pub author_id: String,
    pub content: String,
    pub time_text: String,
    pub like_count: u64,
}

/// 评论 ID：comment_{毫秒时间戳}_{序号}_{作者ID}
///
/// 时间戳 + 序号在同一轮快速抓取内可能撞车，去重在合并时按
/// (author_id, content) 处理，ID 仅作为存储键
pub fn comment_id(epoch_ms: i64, index: usize, author_id: &str) -> String {
    format!("comment_{}_{}_{}", epoch_ms, index, author_id)
}

/// 回复 ID：reply_{毫秒时间戳}_{序号}_{作者ID}
pub fn reply_id(epoch_ms: i64, index: usize, author_id: &str) -> String {
    format!("reply_{}_{}_{}", epoch_ms, index, author_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_id_format() {
        assert_eq!(
            comment_id(1700000000000, 3, "1234567890"),
            "comment_1700000000000_3_1234567890"
        );
    }

    #[test]
    fn test_reply_id_format() {
        assert_eq!(reply_id(1700000000000, 0, ""), "reply_1700000000000_0_");
    }

    #[test]
    fn test_raw_record_tolerates_missing_fields() {
        let record: RawCommentRecord = serde_json::from_str(r#"{"author":"张三"}"#).unwrap();
        assert_eq!(record.author, "张三");
        assert!(record.content.is_empty());
        assert!(record.like_text.is_empty());
    }
}
