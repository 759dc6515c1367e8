//! 帖子页容器
//!
//! 页级容器持有四个子容器（滚动/翻页/评论/回复），负责：
//! - 等待页面就绪
//! - 抓取帖子正文与元数据
//! - 子容器刷新的扇出协调（allSettled 语义：失败计数，不短路）
//! - 驱动"定时 + DOM 变更"刷新循环直到各子容器任务完成

use anyhow::Result;
use serde::Deserialize;
use tokio::time::{sleep, Duration};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::container::comment::CommentContainer;
use crate::container::core::{ContainerCore, RefreshTrigger};
use crate::container::pagination::PaginationContainer;
use crate::container::reply::ReplyContainer;
use crate::container::scroll::ScrollContainer;
use crate::error::DomError;
use crate::infrastructure::JsExecutor;
use std::collections::HashMap;

use crate::models::{CaptureStats, CaptureTask, CommentData, ContainerLibrary, PostData, ReplyData};
use crate::utils::text::{extract_author_id, parse_count, truncate_text};

/// 页面就绪轮询上限与间隔
const READY_MAX_ATTEMPTS: usize = 20;
const READY_POLL_MS: u64 = 500;

/// JS 端抓取到的帖子原始记录
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPostRecord {
    #[serde(default)]
    author: String,
    #[serde(default)]
    author_href: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    time_text: String,
    /// 底栏三个计数的原始文本（转发/评论/赞）
    #[serde(default)]
    footer_texts: Vec<String>,
}

/// 帖子页容器
pub struct PostPageContainer {
    core: ContainerCore,
    post: PostData,
    pub comments: CommentContainer,
    pub replies: ReplyContainer,
    pub scroll: ScrollContainer,
    pub pagination: PaginationContainer,
    expand_replies: bool,
    max_rounds: usize,
    round_interval: Duration,
}

impl PostPageContainer {
    pub fn new(library: &ContainerLibrary, config: &Config, task: &CaptureTask) -> Self {
        let mut comments = CommentContainer::new(library, config);
        if let Some(max_comments) = task.max_comments {
            comments.set_max_comments(max_comments);
        }

        Self {
            core: ContainerCore::new("post_page", library.entry("post_page"), config.max_auto_attempts),
            post: PostData {
                url: task.url.clone(),
                ..PostData::default()
            },
            comments,
            replies: ReplyContainer::new(library, config),
            scroll: ScrollContainer::new(library, config),
            pagination: PaginationContainer::new(library, config),
            expand_replies: task.expand_replies,
            max_rounds: config.max_refresh_rounds,
            round_interval: Duration::from_millis(config.refresh_interval_ms),
        }
    }

    pub fn core(&self) -> &ContainerCore {
        &self.core
    }

    pub fn post(&self) -> &PostData {
        &self.post
    }

    /// 抓取统计快照
    pub fn stats(&self) -> CaptureStats {
        CaptureStats {
            refresh_rounds: self.comments.core().refresh_count(),
            scroll_attempts: self.scroll.attempts(),
            pages_visited: self.pagination.pages_visited(),
            reply_expansions: self.replies.expansions(),
        }
    }

    /// 消费容器，取出抓取产物
    pub fn into_capture(
        self,
    ) -> (
        PostData,
        HashMap<String, CommentData>,
        HashMap<String, ReplyData>,
        CaptureStats,
    ) {
        let stats = self.stats();
        (
            self.post,
            self.comments.into_comments(),
            self.replies.into_replies(),
            stats,
        )
    }

    /// 轮询等待页面根元素出现
    pub async fn wait_until_ready(&self, executor: &JsExecutor) -> Result<()> {
        let root = self.core.entry().root.clone();
        for attempt in 1..=READY_MAX_ATTEMPTS {
            if executor.exists(&root).await? {
                debug!("✓ 页面就绪 (第 {} 次轮询)", attempt);
                return Ok(());
            }
            sleep(Duration::from_millis(READY_POLL_MS)).await;
        }
        Err(DomError::PageNotReady {
            selector: root,
            attempts: READY_MAX_ATTEMPTS,
        }
        .into())
    }

    /// 抓取帖子正文与元数据
    pub async fn extract_post(&mut self, executor: &JsExecutor) -> Result<()> {
        let entry = self.core.entry();
        let js_code = format!(
            r#"
            (() => {{
                const root = document.querySelector({root});
                if (!root) return {{}};
                const pick = (sel) => {{
                    const el = root.querySelector(sel);
                    return el ? (el.innerText || '').trim() : '';
                }};
                const authorLink = root.querySelector({author_link});
                const footerTexts = [];
                root.querySelectorAll({footer}).forEach((el) => {{
                    footerTexts.push((el.innerText || '').trim());
                }});
                return {{
                    author: pick({author}),
                    authorHref: authorLink ? (authorLink.getAttribute('href') || '') : '',
                    text: pick({text}),
                    timeText: pick({time}),
                    footerTexts: footerTexts,
                }};
            }})()
            "#,
            root = serde_json::to_string(&entry.root)?,
            author = serde_json::to_string(entry.selector("author"))?,
            author_link = serde_json::to_string(entry.selector("author_link"))?,
            text = serde_json::to_string(entry.selector("text"))?,
            time = serde_json::to_string(entry.selector("time"))?,
            footer = serde_json::to_string(entry.selector("footer"))?,
        );

        let record: RawPostRecord = executor.eval_as(js_code).await?;
        let url = self.post.url.clone();
        self.post = parse_raw_post(record, url)?;

        if !self.post.text.is_empty() {
            info!("📝 帖子正文: {}", truncate_text(&self.post.text, 80));
        }
        Ok(())
    }

    /// 子容器扇出刷新（allSettled 语义）
    ///
    /// 帖子元数据与评论并发刷新；任何一支失败只记 warn 并计数，
    /// 不影响另一支，也不中断整轮。返回 (成功数, 失败数)。
    pub async fn refresh_children(
        &mut self,
        executor: &JsExecutor,
        trigger: RefreshTrigger,
    ) -> (usize, usize) {
        let (post_result, comment_result) = futures::join!(
            refresh_post_meta(&self.core, &mut self.post, executor),
            self.comments.refresh(executor, trigger),
        );

        let mut succeeded = 0;
        let mut failed = 0;
        match post_result {
            Ok(()) => succeeded += 1,
            Err(e) => {
                warn!("[容器 post_page] 元数据刷新失败: {}", e);
                failed += 1;
            }
        }
        match comment_result {
            Ok(added) => {
                succeeded += 1;
                if added > 0 {
                    debug!("本轮新增 {} 条评论", added);
                }
            }
            Err(e) => {
                warn!("[容器 comments] 刷新失败: {}", e);
                failed += 1;
            }
        }
        (succeeded, failed)
    }

    /// 刷新循环：定时触发 + DOM 变更触发，直到任务完成或轮次耗尽
    pub async fn run_until_complete(&mut self, executor: &JsExecutor) -> Result<()> {
        // 初始化触发一轮，再进入定时循环
        self.comments
            .refresh(executor, RefreshTrigger::Initialization)
            .await?;

        let observing = self
            .comments
            .core()
            .install_mutation_observer(executor)
            .await
            .unwrap_or(false);
        if !observing {
            debug!("评论区尚未出现，MutationObserver 未安装");
        }

        for round in 1..=self.max_rounds {
            // 滚动加载；滚到底之后尝试翻页，翻页成功后滚动状态重置
            if !self.scroll.is_saturated() {
                self.scroll.scroll_step(executor).await?;
            } else if self.pagination.advance_page(executor).await? {
                self.scroll.reset_after_page_change();
            }

            // DOM 有变更用 DomMutation 触发，否则按定时触发
            let mutated = self
                .comments
                .core_mut()
                .poll_mutations(executor)
                .await
                .unwrap_or(false);
            let trigger = if mutated {
                RefreshTrigger::DomMutation
            } else {
                RefreshTrigger::Timer
            };

            let comments_before = self.comments.comments().len();
            let (_, failed) = self.refresh_children(executor, trigger).await;
            if failed > 0 {
                debug!("第 {} 轮有 {} 个子容器刷新失败，继续", round, failed);
            }

            // 滚动/翻页带来的新卡片可能带着未展开的回复
            if self.comments.comments().len() > comments_before {
                self.replies.notify_parent_growth();
            }

            if self.expand_replies && !self.comments.comments().is_empty() {
                let parent_order = self.comments.dom_order().to_vec();
                if let Err(e) = self
                    .replies
                    .expand_and_collect(executor, &parent_order)
                    .await
                {
                    warn!("[容器 replies] 展开/抓取失败: {}", e);
                }
            }

            if self.is_task_complete() {
                info!("✓ 第 {} 轮后所有子容器任务完成", round);
                return Ok(());
            }

            sleep(self.round_interval).await;
        }

        warn!(
            "⚠️ 刷新轮次耗尽 ({} 轮)，按当前已抓取内容收尾",
            self.max_rounds
        );
        Ok(())
    }

    /// 所有子容器都报告任务完成
    pub fn is_task_complete(&self) -> bool {
        let replies_done = !self.expand_replies || self.replies.is_task_complete();
        self.comments.is_task_complete()
            && self.scroll.is_task_complete()
            && self.pagination.is_task_complete()
            && replies_done
    }
}

/// 重新抓取帖子元数据（计数会随刷新变化）
async fn refresh_post_meta(
    core: &ContainerCore,
    post: &mut PostData,
    executor: &JsExecutor,
) -> Result<()> {
    let entry = core.entry();
    let js_code = format!(
        r#"
        (() => {{
            const root = document.querySelector({root});
            if (!root) return [];
            const texts = [];
            root.querySelectorAll({footer}).forEach((el) => {{
                texts.push((el.innerText || '').trim());
            }});
            return texts;
        }})()
        "#,
        root = serde_json::to_string(&entry.root)?,
        footer = serde_json::to_string(entry.selector("footer"))?,
    );
    let footer_texts: Vec<String> = executor.eval_as(js_code).await?;
    apply_footer_counts(post, &footer_texts);
    Ok(())
}

/// 底栏计数按"转发 / 评论 / 赞"的固定顺序解析
fn apply_footer_counts(post: &mut PostData, footer_texts: &[String]) {
    if let Some(text) = footer_texts.first() {
        post.repost_count = parse_count(text);
    }
    if let Some(text) = footer_texts.get(1) {
        post.comment_count = parse_count(text);
    }
    if let Some(text) = footer_texts.get(2) {
        post.like_count = parse_count(text);
    }
}

fn parse_raw_post(record: RawPostRecord, url: String) -> Result<PostData> {
    let mut post = PostData {
        author: record.author,
        author_id: extract_author_id(&record.author_href)?,
        text: record.text,
        time_text: record.time_text,
        repost_count: 0,
        comment_count: 0,
        like_count: 0,
        url,
    };
    apply_footer_counts(&mut post, &record.footer_texts);
    Ok(post)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task() -> CaptureTask {
        CaptureTask {
            url: "https://m.weibo.cn/detail/1".to_string(),
            max_comments: Some(10),
            expand_replies: true,
            file_path: None,
        }
    }

    #[test]
    fn test_parse_raw_post() {
        let record = RawPostRecord {
            author: "某博主".to_string(),
            author_href: "/u/1234567890".to_string(),
            text: "今天天气不错".to_string(),
            time_text: "1小时前".to_string(),
            footer_texts: vec![
                "转发 1.2万".to_string(),
                "评论 3456".to_string(),
                "赞 8万".to_string(),
            ],
        };
        let post = parse_raw_post(record, "https://m.weibo.cn/detail/1".to_string()).unwrap();
        assert_eq!(post.author_id, "1234567890");
        assert_eq!(post.repost_count, 12000);
        assert_eq!(post.comment_count, 3456);
        assert_eq!(post.like_count, 80000);
    }

    #[test]
    fn test_footer_counts_tolerate_missing_entries() {
        let mut post = PostData::default();
        apply_footer_counts(&mut post, &["转发 5".to_string()]);
        assert_eq!(post.repost_count, 5);
        assert_eq!(post.comment_count, 0);
        assert_eq!(post.like_count, 0);
    }

    #[test]
    fn test_task_overrides_comment_cap() {
        let config = Config::default();
        let library = ContainerLibrary::default();
        let container = PostPageContainer::new(&library, &config, &task());
        // 上限 10：塞满 10 条后任务即完成
        assert!(!container.is_task_complete());
    }

    #[test]
    fn test_completion_requires_all_children() {
        let config = Config::default();
        let library = ContainerLibrary::default();
        let mut t = task();
        t.expand_replies = false;
        let container = PostPageContainer::new(&library, &config, &t);
        // 新建容器没有任何子容器饱和，不可能已完成
        assert!(!container.is_task_complete());
    }
}
