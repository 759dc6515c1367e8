//! 动态操作注册
//!
//! 容器每次刷新时扫描自己 DOM 区域内的可点击元素，按钮文字经由
//! 静态标签表映射为事件键后注册为操作。执行未注册的操作返回失败值，
//! 不会 panic。

use std::collections::HashMap;

use phf::phf_map;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::models::PersistedOperation;

/// 按钮标签 -> 事件键（精确匹配表）
static LABEL_TO_EVENT: phf::Map<&'static str, &'static str> = phf_map! {
    "下一页" => "next_page",
    "下页" => "next_page",
    "加载更多" => "load_more",
    "更多评论" => "load_more",
    "查看更多评论" => "load_more",
    "展开" => "expand_replies",
    "查看全部回复" => "expand_replies",
    "展开全部回复" => "expand_replies",
    "查看对话" => "expand_replies",
    "按热度" => "sort_by_hot",
    "按时间" => "sort_by_time",
};

/// 标签映射：先查精确表，再做包含式模糊匹配
///
/// 模糊规则针对带计数的标签（如 "共3条回复"、"还有5条评论"）
pub fn event_key_for_label(label: &str) -> Option<&'static str> {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(key) = LABEL_TO_EVENT.get(trimmed) {
        return Some(key);
    }

    if trimmed.contains("条回复") || trimmed.contains("条对话") {
        return Some("expand_replies");
    }
    if trimmed.contains("条评论") || trimmed.contains("更多") {
        return Some("load_more");
    }
    if trimmed.contains("下一页") {
        return Some("next_page");
    }

    None
}

/// 操作类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Click,
    Type,
    Fill,
}

impl OperationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OperationKind::Click => "click",
            OperationKind::Type => "type",
            OperationKind::Fill => "fill",
        }
    }
}

/// JS 扫描返回的原始可点击元素记录
#[derive(Debug, Clone, Deserialize)]
pub struct RawClickable {
    #[serde(default)]
    pub text: String,
    /// 在扫描选择器命中列表中的下标
    pub nth: usize,
    #[serde(default)]
    pub tag: String,
}

/// 一个已注册的操作
#[derive(Debug, Clone)]
pub struct Operation {
    pub event_key: String,
    pub label: String,
    pub kind: OperationKind,
    /// 扫描用的选择器（click_nth 的第一个参数）
    pub selector: String,
    pub nth: usize,
}

/// 操作执行结果
///
/// 操作层面的失败以值的形式返回，调用方自行决定是否继续
#[derive(Debug, Clone)]
pub struct OperationResult {
    pub success: bool,
    /// 操作是否实际作用到了元素（元素消失时为 false）
    pub consumed: bool,
    pub message: String,
    pub data: Option<JsonValue>,
}

impl OperationResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            consumed: true,
            message: message.into(),
            data: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            consumed: false,
            message: message.into(),
            data: None,
        }
    }

    /// 成功执行但元素已不在（如按钮被上一次点击移除）
    pub fn not_consumed(message: impl Into<String>) -> Self {
        Self {
            success: true,
            consumed: false,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: JsonValue) -> Self {
        self.data = Some(data);
        self
    }
}

/// 操作注册表
///
/// 每次重新扫描都整体重建，避免指向已失效元素的陈旧条目
#[derive(Debug, Default)]
pub struct OperationRegistry {
    operations: HashMap<String, Operation>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册操作，同事件键覆盖旧条目
    pub fn register(&mut self, operation: Operation) {
        self.operations.insert(operation.event_key.clone(), operation);
    }

    pub fn get(&self, event_key: &str) -> Option<&Operation> {
        self.operations.get(event_key)
    }

    pub fn contains(&self, event_key: &str) -> bool {
        self.operations.contains_key(event_key)
    }

    pub fn clear(&mut self) {
        self.operations.clear();
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// 从扫描记录重建注册表，返回注册数量
    pub fn rebuild_from_scan(&mut self, selector: &str, records: &[RawClickable]) -> usize {
        self.operations.clear();
        for record in records {
            if let Some(event_key) = event_key_for_label(&record.text) {
                // 同一事件键保留第一个命中的元素
                if self.operations.contains_key(event_key) {
                    continue;
                }
                self.register(Operation {
                    event_key: event_key.to_string(),
                    label: record.text.trim().to_string(),
                    kind: OperationKind::Click,
                    selector: selector.to_string(),
                    nth: record.nth,
                });
            }
        }
        self.operations.len()
    }

    /// 导出为持久化记录（按事件键排序，保证落盘稳定）
    pub fn to_persisted(&self) -> Vec<PersistedOperation> {
        let mut persisted: Vec<PersistedOperation> = self
            .operations
            .values()
            .map(|op| PersistedOperation {
                event_key: op.event_key.clone(),
                label: op.label.clone(),
                kind: op.kind.as_str().to_string(),
                nth: op.nth,
            })
            .collect();
        persisted.sort_by(|a, b| a.event_key.cmp(&b.event_key));
        persisted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clickable(text: &str, nth: usize) -> RawClickable {
        RawClickable {
            text: text.to_string(),
            nth,
            tag: "a".to_string(),
        }
    }

    #[test]
    fn test_label_exact_match() {
        assert_eq!(event_key_for_label("下一页"), Some("next_page"));
        assert_eq!(event_key_for_label(" 加载更多 "), Some("load_more"));
    }

    #[test]
    fn test_label_fuzzy_match_with_count() {
        assert_eq!(event_key_for_label("共3条回复"), Some("expand_replies"));
        assert_eq!(event_key_for_label("还有12条评论"), Some("load_more"));
    }

    #[test]
    fn test_label_unknown_is_none() {
        assert_eq!(event_key_for_label("关注"), None);
        assert_eq!(event_key_for_label(""), None);
    }

    #[test]
    fn test_rebuild_replaces_stale_entries() {
        let mut registry = OperationRegistry::new();
        registry.rebuild_from_scan(".comment-list a", &[clickable("下一页", 7)]);
        assert_eq!(registry.get("next_page").unwrap().nth, 7);

        // 第二次扫描按钮位置变了，旧条目必须被换掉
        registry.rebuild_from_scan(".comment-list a", &[clickable("下一页", 2)]);
        assert_eq!(registry.get("next_page").unwrap().nth, 2);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_rebuild_keeps_first_hit_per_event() {
        let mut registry = OperationRegistry::new();
        let count = registry.rebuild_from_scan(
            "a",
            &[
                clickable("展开", 0),
                clickable("查看全部回复", 5),
                clickable("下一页", 9),
            ],
        );
        assert_eq!(count, 2);
        assert_eq!(registry.get("expand_replies").unwrap().nth, 0);
    }

    #[test]
    fn test_result_constructors() {
        assert!(OperationResult::ok("done").consumed);
        let failure = OperationResult::failure("没找到按钮");
        assert!(!failure.success);
        assert!(!failure.consumed);
        let skipped = OperationResult::not_consumed("按钮已消失");
        assert!(skipped.success);
        assert!(!skipped.consumed);
    }

    #[test]
    fn test_to_persisted_is_sorted() {
        let mut registry = OperationRegistry::new();
        registry.rebuild_from_scan("a", &[clickable("下一页", 1), clickable("展开", 0)]);
        let persisted = registry.to_persisted();
        assert_eq!(persisted[0].event_key, "expand_replies");
        assert_eq!(persisted[1].event_key, "next_page");
    }
}
