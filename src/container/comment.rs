//! 评论容器
//!
//! 把评论区 DOM 抓取为 `HashMap<String, CommentData>`。ID 沿用
//! comment_{时间戳}_{序号}_{作者ID} 格式，跨轮去重按 (author_id, content)。

use std::collections::HashMap;

use anyhow::Result;
use tracing::{debug, info};

use crate::config::Config;
use crate::container::core::{ContainerCore, RefreshTrigger};
use crate::infrastructure::JsExecutor;
use crate::models::comment::{comment_id, CommentData, RawCommentRecord};
use crate::models::ContainerLibrary;
use crate::utils::text::{extract_author_id, parse_count};

/// 评论容器
pub struct CommentContainer {
    core: ContainerCore,
    max_comments: usize,
    no_growth_rounds: usize,
    /// 连续无新评论的刷新轮数
    growth_stalls: usize,
    comments: HashMap<String, CommentData>,
    /// (author_id, content) -> 评论 ID，用于跨轮去重
    seen: HashMap<(String, String), String>,
    /// 最近一次抓取时评论在 DOM 中的顺序（回复容器按下标找父评论）
    ///
    /// 与 DOM 卡片逐位对齐：被丢弃的卡片（如纯贴纸/图片评论）占位 None，
    /// 保证回复记录的 parent_index 落在正确的卡片上
    dom_order: Vec<Option<String>>,
}

impl CommentContainer {
    pub fn new(library: &ContainerLibrary, config: &Config) -> Self {
        Self {
            core: ContainerCore::new("comments", library.entry("comments"), config.max_auto_attempts),
            max_comments: config.max_comments,
            no_growth_rounds: config.no_growth_rounds,
            growth_stalls: 0,
            comments: HashMap::new(),
            seen: HashMap::new(),
            dom_order: Vec::new(),
        }
    }

    pub fn core(&self) -> &ContainerCore {
        &self.core
    }

    pub fn core_mut(&mut self) -> &mut ContainerCore {
        &mut self.core
    }

    pub fn comments(&self) -> &HashMap<String, CommentData> {
        &self.comments
    }

    pub fn into_comments(self) -> HashMap<String, CommentData> {
        self.comments
    }

    /// 最近一次抓取的 DOM 顺序（评论 ID 按页面出现顺序，无内容卡片为 None）
    pub fn dom_order(&self) -> &[Option<String>] {
        &self.dom_order
    }

    /// 覆盖评论上限（任务级配置）
    pub fn set_max_comments(&mut self, max_comments: usize) {
        self.max_comments = max_comments;
    }

    /// 刷新：抓取评论区并合并进评论表，返回新增评论数
    ///
    /// 触发被准入控制忽略时返回 Ok(0)
    pub async fn refresh(&mut self, executor: &JsExecutor, trigger: RefreshTrigger) -> Result<usize> {
        if !self.core.begin_refresh(trigger) {
            return Ok(0);
        }

        let records = self.extract_raw_records(executor).await?;
        let epoch_ms = chrono::Local::now().timestamp_millis();
        let added = self.merge_raw_records(records, epoch_ms)?;

        // 每次刷新都重新发现操作，按钮会随翻页/展开而变化
        self.core.discover_operations(executor).await?;
        self.core.finish_refresh();

        if added == 0 {
            self.growth_stalls += 1;
        } else {
            self.growth_stalls = 0;
        }

        debug!(
            "[容器 comments] 刷新完成 (触发: {}): 新增 {} 条, 累计 {} 条",
            trigger.as_str(),
            added,
            self.comments.len()
        );

        if self.is_task_complete() {
            info!(
                "✓ 评论抓取完成: {} 条 (停滞 {} 轮)",
                self.comments.len(),
                self.growth_stalls
            );
            self.core.mark_saturated();
        }

        Ok(added)
    }

    /// 任务完成启发式：达到上限、连续多轮无增长，或自动刷新已耗尽
    ///
    /// 评论容器只由 Timer/DomMutation 驱动，自动次数耗尽后刷新全是
    /// 空转，按已完成处理，避免刷新循环干等到轮次上限
    pub fn is_task_complete(&self) -> bool {
        self.comments.len() >= self.max_comments
            || self.growth_stalls >= self.no_growth_rounds
            || self.core.auto_exhausted()
    }

    /// 抓取评论区原始记录
    async fn extract_raw_records(&self, executor: &JsExecutor) -> Result<Vec<RawCommentRecord>> {
        let entry = self.core.entry();
        let js_code = format!(
            r#"
            (() => {{
                const root = document.querySelector({root});
                if (!root) return [];
                const items = root.querySelectorAll({item});
                const records = [];
                items.forEach((item) => {{
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
                        likeText: pick({like}),
                        replyText: pick({reply_hint}),
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
            like = serde_json::to_string(entry.selector("like"))?,
            reply_hint = serde_json::to_string(entry.selector("reply_hint"))?,
        );
        let records: Vec<RawCommentRecord> = executor.eval_as(js_code).await?;
        Ok(records)
    }

    /// 合并一轮原始记录，返回新增条数
    ///
    /// 空内容记录丢弃（dom_order 留 None 占位）；已见过的
    /// (author_id, content) 只更新点赞/回复数
    pub fn merge_raw_records(
        &mut self,
        records: Vec<RawCommentRecord>,
        epoch_ms: i64,
    ) -> Result<usize> {
        let mut added = 0;
        self.dom_order.clear();

        for (index, record) in records.into_iter().enumerate() {
            let content = record.content.trim().to_string();
            if content.is_empty() {
                self.dom_order.push(None);
                continue;
            }

            let author_id = extract_author_id(&record.author_href)?;
            let key = (author_id.clone(), content.clone());

            if let Some(existing_id) = self.seen.get(&key) {
                // 计数类字段跟随最新一轮
                if let Some(existing) = self.comments.get_mut(existing_id) {
                    existing.like_count = parse_count(&record.like_text);
                    existing.reply_count = parse_count(&record.reply_text);
                }
                self.dom_order.push(Some(existing_id.clone()));
                continue;
            }

            let id = comment_id(epoch_ms, index, &author_id);
            let comment = CommentData {
                id: id.clone(),
                author: record.author.trim().to_string(),
                author_id,
                content,
                time_text: record.time_text.trim().to_string(),
                like_count: parse_count(&record.like_text),
                reply_count: parse_count(&record.reply_text),
            };
            self.comments.insert(id.clone(), comment);
            self.seen.insert(key, id.clone());
            self.dom_order.push(Some(id));
            added += 1;
        }

        Ok(added)
    }
}
