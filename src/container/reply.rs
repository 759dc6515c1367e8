//! 回复容器（楼中楼）
//!
//! 逐条执行 expand_replies 操作直到上限或按钮耗尽，然后把展开的
//! 回复抓取为 `HashMap<String, ReplyData>`，按 DOM 下标挂到父评论。

use std::collections::HashMap;

use anyhow::Result;
use tokio::time::{sleep, Duration};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::container::core::{ContainerCore, RefreshTrigger};
use crate::infrastructure::JsExecutor;
use crate::models::comment::{reply_id, RawReplyRecord, ReplyData};
use crate::models::ContainerLibrary;
use crate::utils::text::{extract_author_id, parse_count};

/// 回复容器
pub struct ReplyContainer {
    core: ContainerCore,
    max_expansions: usize,
    /// 已执行的展开次数
    expansions: usize,
    /// 展开按钮是否已经点不到了
    exhausted: bool,
    replies: HashMap<String, ReplyData>,
    /// (author_id, content, parent_id) -> 回复 ID
    seen: HashMap<(String, String, String), String>,
    pause: Duration,
}

impl ReplyContainer {
    pub fn new(library: &ContainerLibrary, config: &Config) -> Self {
        Self {
            core: ContainerCore::new("replies", library.entry("replies"), config.max_auto_attempts),
            max_expansions: config.max_reply_expansions,
            expansions: 0,
            exhausted: false,
            replies: HashMap::new(),
            seen: HashMap::new(),
            pause: Duration::from_millis(config.scroll_pause_ms),
        }
    }

    pub fn core(&self) -> &ContainerCore {
        &self.core
    }

    pub fn replies(&self) -> &HashMap<String, ReplyData> {
        &self.replies
    }

    pub fn into_replies(self) -> HashMap<String, ReplyData> {
        self.replies
    }

    pub fn expansions(&self) -> usize {
        self.expansions
    }

    /// 新评论卡片出现后，页面上可能带来新的展开按钮
    pub fn notify_parent_growth(&mut self) {
        if self.exhausted {
            debug!("[容器 replies] 出现新评论卡片，恢复展开");
            self.exhausted = false;
        }
    }

    /// 展开回复直到上限，然后抓取并合并
    ///
    /// `parent_order` 是评论容器最近一轮的 DOM 顺序（与卡片逐位对齐，
    /// 无内容卡片为 None），用于按下标挂父评论。返回本轮新增的回复数。
    pub async fn expand_and_collect(
        &mut self,
        executor: &JsExecutor,
        parent_order: &[Option<String>],
    ) -> Result<usize> {
        if !self.core.begin_refresh(RefreshTrigger::Operation) {
            return Ok(0);
        }

        // 展开直到：按钮耗尽 / 未消费 / 达到上限
        while !self.exhausted && self.expansions < self.max_expansions {
            self.core.discover_operations(executor).await?;
            if !self.core.registry().contains("expand_replies") {
                debug!("[容器 replies] 未发现展开按钮，停止展开");
                self.exhausted = true;
                break;
            }

            let result = self
                .core
                .execute_operation(executor, "expand_replies", None)
                .await;

            if !result.success {
                warn!("[容器 replies] 展开操作失败: {}", result.message);
                self.exhausted = true;
                break;
            }
            if !result.consumed {
                debug!("[容器 replies] 展开按钮已消失，视为展开完毕");
                self.exhausted = true;
                break;
            }

            self.expansions += 1;
            sleep(self.pause).await;
        }

        if self.expansions >= self.max_expansions {
            debug!(
                "[容器 replies] 展开次数达到上限 ({}/{})",
                self.expansions, self.max_expansions
            );
        }

        let records = self.extract_raw_records(executor).await?;
        let epoch_ms = chrono::Local::now().timestamp_millis();
        let added = self.merge_raw_records(records, epoch_ms, parent_order)?;
        self.core.finish_refresh();

        if added > 0 {
            info!("✓ 回复抓取: 新增 {} 条, 累计 {} 条", added, self.replies.len());
        }
        if self.is_task_complete() {
            self.core.mark_saturated();
        }

        Ok(added)
    }

    /// 任务完成启发式：按钮耗尽或展开次数达到上限
    pub fn is_task_complete(&self) -> bool {
        self.exhausted || self.expansions >= self.max_expansions
    }

    async fn extract_raw_records(&self, executor: &JsExecutor) -> Result<Vec<RawReplyRecord>> {
        let entry = self.core.entry();
        let js_code = format!(
            r#"
            (() => {{
                const cards = document.querySelectorAll({root});
                const records = [];
                cards.forEach((card, cardIndex) => {{
                    card.querySelectorAll({item}).forEach((item) => {{
                        const pick = (sel) => {{
                            const el = item.querySelector(sel);
                            return el ? (el.innerText || '').trim() : '';
                        }};
                        const authorEl = item.querySelector({author});
                        records.push({{
                            author: authorEl ? (authorEl.innerText || '').trim() : '',
                            authorHref: authorEl ? (authorEl.getAttribute('href') || '') : '',
                            content: pick({content}),
                            timeText: pick({time}),
                            likeText: '',
                            parentIndex: cardIndex,
                        }});
                    }});
                }});
                return records;
            }})()
            "#,
            root = serde_json::to_string(&entry.root)?,
            item = serde_json::to_string(entry.selector("item"))?,
            author = serde_json::to_string(entry.selector("author"))?,
            content = serde_json::to_string(entry.selector("content"))?,
            time = serde_json::to_string(entry.selector("time"))?,
        );
        let records: Vec<RawReplyRecord> = executor.eval_as(js_code).await?;
        Ok(records)
    }

    /// 合并一轮原始回复，返回新增条数
    ///
    /// parent_index 越界（评论容器还没抓到对应卡片）或指向无内容
    /// 卡片（该卡片没有可挂靠的评论 ID）的记录丢弃
    pub fn merge_raw_records(
        &mut self,
        records: Vec<RawReplyRecord>,
        epoch_ms: i64,
        parent_order: &[Option<String>],
    ) -> Result<usize> {
        let mut added = 0;

        for (index, record) in records.into_iter().enumerate() {
            let content = record.content.trim().to_string();
            if content.is_empty() {
                continue;
            }
            let parent_id = match parent_order.get(record.parent_index) {
                Some(Some(id)) => id.clone(),
                Some(None) => {
                    debug!(
                        "[容器 replies] 父评论卡片 {} 无内容，回复无处挂靠，丢弃",
                        record.parent_index
                    );
                    continue;
                }
                None => {
                    debug!(
                        "[容器 replies] 回复的父评论下标 {} 越界，丢弃",
                        record.parent_index
                    );
                    continue;
                }
            };

            let author_id = extract_author_id(&record.author_href)?;
            let key = (author_id.clone(), content.clone(), parent_id.clone());
            if self.seen.contains_key(&key) {
                continue;
            }

            let id = reply_id(epoch_ms, index, &author_id);
            let reply = ReplyData {
                id: id.clone(),
                parent_comment_id: parent_id,
                author: record.author.trim().to_string(),
                author_id,
                content,
                time_text: record.time_text.trim().to_string(),
                like_count: parse_count(&record.like_text),
            };
            self.replies.insert(id.clone(), reply);
            self.seen.insert(key, id);
            added += 1;
        }

        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::library::ContainerLibrary;

    fn container(max_expansions: usize) -> ReplyContainer {
        let mut config = Config::default();
        config.max_reply_expansions = max_expansions;
        ReplyContainer::new(&ContainerLibrary::default(), &config)
    }

    fn record(author: &str, href: &str, content: &str, parent_index: usize) -> RawReplyRecord {
        RawReplyRecord {
            author: author.to_string(),
            author_href: href.to_string(),
            content: content.to_string(),
            time_text: "刚刚".to_string(),
            like_text: String::new(),
            parent_index,
        }
    }

    fn parents(ids: &[&str]) -> Vec<Option<String>> {
        ids.iter().map(|id| Some(id.to_string())).collect()
    }

    #[test]
    fn test_merge_links_reply_to_parent() {
        let mut container = container(5);
        let parents = parents(&["comment_a", "comment_b"]);

        let added = container
            .merge_raw_records(
                vec![record("甲", "/u/1", "回复一楼", 0), record("乙", "/u/2", "回复二楼", 1)],
                1700000000000,
                &parents,
            )
            .unwrap();

        assert_eq!(added, 2);
        let reply = container
            .replies()
            .get("reply_1700000000000_0_1")
            .unwrap();
        assert_eq!(reply.parent_comment_id, "comment_a");
    }

    #[test]
    fn test_merge_links_parent_past_empty_card() {
        use crate::container::comment::CommentContainer;
        use crate::models::comment::RawCommentRecord;

        // 第一张卡片是无文字的贴纸评论，第二张是李四的正常评论
        let mut comments = CommentContainer::new(&ContainerLibrary::default(), &Config::default());
        comments
            .merge_raw_records(
                vec![
                    RawCommentRecord {
                        author: "张三".to_string(),
                        author_href: "/u/111".to_string(),
                        ..RawCommentRecord::default()
                    },
                    RawCommentRecord {
                        author: "李四".to_string(),
                        author_href: "/u/222".to_string(),
                        content: "好文".to_string(),
                        ..RawCommentRecord::default()
                    },
                ],
                1700000000000,
            )
            .unwrap();

        // parent_index 按 DOM 卡片数，回复必须挂到李四而不是被丢弃
        let mut container = container(5);
        let added = container
            .merge_raw_records(
                vec![record("乙", "/u/333", "回复李四", 1)],
                1700000000001,
                comments.dom_order(),
            )
            .unwrap();

        assert_eq!(added, 1);
        let reply = container.replies().values().next().unwrap();
        assert_eq!(reply.parent_comment_id, "comment_1700000000000_1_222");
    }

    #[test]
    fn test_merge_drops_reply_on_empty_card() {
        let mut container = container(5);
        let order = vec![None, Some("comment_b".to_string())];
        let added = container
            .merge_raw_records(vec![record("甲", "/u/1", "回复贴纸", 0)], 1, &order)
            .unwrap();
        assert_eq!(added, 0);
        assert!(container.replies().is_empty());
    }

    #[test]
    fn test_merge_drops_out_of_range_parent() {
        let mut container = container(5);
        let parents = parents(&["comment_a"]);
        let added = container
            .merge_raw_records(vec![record("甲", "/u/1", "孤儿回复", 9)], 1, &parents)
            .unwrap();
        assert_eq!(added, 0);
        assert!(container.replies().is_empty());
    }

    #[test]
    fn test_merge_dedupes_same_reply() {
        let mut container = container(5);
        let parents = parents(&["comment_a"]);
        container
            .merge_raw_records(vec![record("甲", "/u/1", "同一条回复", 0)], 1, &parents)
            .unwrap();
        let added = container
            .merge_raw_records(vec![record("甲", "/u/1", "同一条回复", 0)], 2, &parents)
            .unwrap();
        assert_eq!(added, 0);
        assert_eq!(container.replies().len(), 1);
    }

    #[test]
    fn test_complete_when_expansion_limit_hit() {
        let mut container = container(2);
        assert!(!container.is_task_complete());
        container.expansions = 2;
        assert!(container.is_task_complete());
    }

    #[test]
    fn test_complete_when_button_exhausted() {
        let mut container = container(10);
        container.exhausted = true;
        assert!(container.is_task_complete());
    }

    #[test]
    fn test_expansion_resumes_on_new_parents() {
        let mut container = container(10);
        // 上一轮没发现展开按钮
        container.exhausted = true;
        assert!(container.is_task_complete());

        // 滚动加载出新评论卡片后，展开必须恢复
        container.notify_parent_growth();
        assert!(!container.is_task_complete());

        // 次数上限不受影响
        container.expansions = 10;
        assert!(container.is_task_complete());
    }
}
