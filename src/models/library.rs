//! 容器库模型
//!
//! `container-library.json` 记录每类容器的选择器配置，以及上一次运行
//! 发现并注册过的操作。文件不存在时使用内置的微博默认配置。

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// 容器库（container-library.json 的根对象）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerLibrary {
    /// 库格式版本
    pub version: u32,
    /// 容器名 -> 容器条目
    pub containers: HashMap<String, ContainerEntry>,
}

/// 单个容器的持久化条目
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContainerEntry {
    /// 容器根选择器
    pub root: String,
    /// 命名选择器（item / author / content / time ...）
    #[serde(default)]
    pub selectors: HashMap<String, String>,
    /// 上一次运行注册过的操作（仅记录，供人工检查选择器漂移）
    #[serde(default)]
    pub operations: Vec<PersistedOperation>,
}

/// 持久化的操作记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedOperation {
    pub event_key: String,
    pub label: String,
    pub kind: String,
    pub nth: usize,
}

impl ContainerEntry {
    /// 取命名选择器，缺失时退回容器根
    pub fn selector(&self, name: &str) -> &str {
        self.selectors.get(name).map(String::as_str).unwrap_or(&self.root)
    }
}

impl Default for ContainerLibrary {
    /// 内置的 m.weibo.cn 帖子详情页配置
    fn default() -> Self {
        let mut containers = HashMap::new();

        containers.insert(
            "post_page".to_string(),
            ContainerEntry {
                root: ".weibo-detail".to_string(),
                selectors: selectors(&[
                    ("author", ".m-text-box h3"),
                    ("author_link", ".m-img-box + .m-box-col a"),
                    ("text", ".weibo-text"),
                    ("time", ".time"),
                    ("footer", ".m-diy-btn"),
                ]),
                operations: Vec::new(),
            },
        );

        containers.insert(
            "comments".to_string(),
            ContainerEntry {
                root: ".comment-list".to_string(),
                selectors: selectors(&[
                    ("item", ".card .main"),
                    ("author", ".m-text-box a:first-child"),
                    ("author_link", ".m-text-box a:first-child"),
                    ("content", ".m-text-box .comment-content"),
                    ("time", ".m-text-box .time"),
                    ("like", ".m-icon-box .like-count"),
                    ("reply_hint", ".m-replies-hint"),
                ]),
                operations: Vec::new(),
            },
        );

        containers.insert(
            "replies".to_string(),
            ContainerEntry {
                root: ".comment-list .card".to_string(),
                selectors: selectors(&[
                    ("item", ".m-replies .reply-item"),
                    ("author", ".reply-item a:first-child"),
                    ("author_link", ".reply-item a:first-child"),
                    ("content", ".reply-item .reply-content"),
                    ("time", ".reply-item .time"),
                ]),
                operations: Vec::new(),
            },
        );

        containers.insert(
            "scroll".to_string(),
            ContainerEntry {
                root: ".comment-list".to_string(),
                selectors: selectors(&[("item", ".card")]),
                operations: Vec::new(),
            },
        );

        containers.insert(
            "pagination".to_string(),
            ContainerEntry {
                root: ".m-page".to_string(),
                selectors: selectors(&[
                    ("next", ".m-page .next:not(.disabled)"),
                    ("current", ".m-page .cur"),
                ]),
                operations: Vec::new(),
            },
        );

        Self {
            version: 1,
            containers,
        }
    }
}

impl ContainerLibrary {
    /// 取指定容器的条目，未配置时返回空条目
    pub fn entry(&self, name: &str) -> ContainerEntry {
        self.containers.get(name).cloned().unwrap_or_default()
    }

    /// 回写某个容器发现的操作
    pub fn record_operations(&mut self, name: &str, operations: Vec<PersistedOperation>) {
        self.containers.entry(name.to_string()).or_default().operations = operations;
    }
}

fn selectors(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_library_has_all_containers() {
        let library = ContainerLibrary::default();
        for name in ["post_page", "comments", "replies", "scroll", "pagination"] {
            assert!(library.containers.contains_key(name), "缺少容器: {}", name);
        }
    }

    #[test]
    fn test_selector_falls_back_to_root() {
        let library = ContainerLibrary::default();
        let entry = library.entry("comments");
        assert_eq!(entry.selector("item"), ".card .main");
        assert_eq!(entry.selector("不存在的键"), ".comment-list");
    }

    #[test]
    fn test_record_operations_creates_missing_entry() {
        let mut library = ContainerLibrary::default();
        let op = PersistedOperation {
            event_key: "next_page".to_string(),
            label: "下一页".to_string(),
            kind: "click".to_string(),
            nth: 0,
        };
        library.record_operations("自定义容器", vec![op.clone()]);
        assert_eq!(library.entry("自定义容器").operations, vec![op]);
    }
}
