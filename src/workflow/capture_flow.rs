//! 帖子抓取流程 - 流程层
//!
//! 核心职责：定义"一个帖子"的完整抓取流程
//!
//! 流程顺序：
//! 1. 等待页面就绪 → 抓取帖子正文
//! 2. 容器刷新循环（滚动/翻页/评论/回复）直到各容器任务完成
//! 3. 结果落盘；抓空的帖子写 skipped.txt（兜底）

use anyhow::Result;
use tracing::{info, warn};

use crate::config::Config;
use crate::container::PostPageContainer;
use crate::infrastructure::JsExecutor;
use crate::models::{CaptureTask, CapturedPost, ContainerLibrary, PersistedOperation};
use crate::services::{DumpWriter, SkippedWriter};
use crate::workflow::capture_ctx::CaptureCtx;

/// 帖子抓取结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessResult {
    /// 抓取成功并已落盘
    Success,
    /// 跳过（页面未就绪或零评论）
    Skipped,
}

/// 单个帖子的抓取产出
#[derive(Debug)]
pub struct CaptureOutcome {
    pub result: ProcessResult,
    pub comment_count: usize,
    pub reply_count: usize,
    /// 各容器本次发现的操作（回写容器库用）
    pub discovered: Vec<(String, Vec<PersistedOperation>)>,
}

/// 帖子抓取流程
///
/// - 编排完整的抓取流程
/// - 不持有任何资源（page）
/// - 只依赖业务能力（services）与容器
pub struct CaptureFlow {
    dump_writer: DumpWriter,
    skipped_writer: SkippedWriter,
    verbose_logging: bool,
}

impl CaptureFlow {
    /// 创建新的抓取流程
    pub fn new(config: &Config) -> Self {
        Self {
            dump_writer: DumpWriter::new(&config.output_folder),
            skipped_writer: SkippedWriter::with_path(config.skipped_file.clone()),
            verbose_logging: config.verbose_logging,
        }
    }

    pub async fn run(
        &self,
        executor: &JsExecutor,
        task: &CaptureTask,
        ctx: &CaptureCtx,
        library: &ContainerLibrary,
        config: &Config,
    ) -> Result<CaptureOutcome> {
        let mut page_container = PostPageContainer::new(library, config, task);

        // ========== 流程 1: 页面就绪 + 帖子正文 ==========
        if let Err(e) = page_container.wait_until_ready(executor).await {
            warn!("[帖子 {}] ⚠️ 页面未就绪: {}", ctx.post_index, e);
            self.skipped_writer
                .write(&ctx.url, ctx.post_index, "页面未就绪")
                .await?;
            return Ok(CaptureOutcome {
                result: ProcessResult::Skipped,
                comment_count: 0,
                reply_count: 0,
                discovered: Vec::new(),
            });
        }

        page_container.extract_post(executor).await?;
        info!(
            "[帖子 {}] 作者: {} | 评论计数: {}",
            ctx.post_index,
            page_container.post().author,
            page_container.post().comment_count
        );

        // ========== 流程 2: 容器刷新循环 ==========
        page_container.run_until_complete(executor).await?;

        let discovered = collect_discovered(&page_container);
        if self.verbose_logging {
            for (name, operations) in &discovered {
                info!(
                    "[帖子 {}] 容器 {} 注册了 {} 个操作",
                    ctx.post_index,
                    name,
                    operations.len()
                );
            }
        }

        // ========== 流程 3: 落盘 / 兜底 ==========
        let (post, comment_map, reply_map, stats) = page_container.into_capture();

        if comment_map.is_empty() {
            warn!("[帖子 {}] ⚠️ 抓取到零评论，写入 skipped.txt", ctx.post_index);
            self.skipped_writer
                .write(&ctx.url, ctx.post_index, "零评论")
                .await?;
            return Ok(CaptureOutcome {
                result: ProcessResult::Skipped,
                comment_count: 0,
                reply_count: 0,
                discovered,
            });
        }

        let comment_count = comment_map.len();
        let reply_count = reply_map.len();
        let captured = CapturedPost {
            post,
            comments: comment_map,
            replies: reply_map,
            captured_at: chrono::Local::now().to_rfc3339(),
            stats,
        };

        let path = self.dump_writer.write(&captured, ctx.post_index).await?;
        info!(
            "[帖子 {}] ✓ 抓取完成: {} 条评论, {} 条回复 → {}",
            ctx.post_index,
            comment_count,
            reply_count,
            path.display()
        );

        Ok(CaptureOutcome {
            result: ProcessResult::Success,
            comment_count,
            reply_count,
            discovered,
        })
    }
}

/// 汇总各容器发现的操作
fn collect_discovered(page: &PostPageContainer) -> Vec<(String, Vec<PersistedOperation>)> {
    [
        page.comments.core(),
        page.replies.core(),
        page.scroll.core(),
        page.pagination.core(),
        page.core(),
    ]
    .into_iter()
    .filter(|core| !core.registry().is_empty())
    .map(|core| (core.name().to_string(), core.persisted_operations()))
    .collect()
}
