//! 单帖处理器 - 编排层
//!
//! 负责一个帖子从导航到产出的完整处理，向下委托 CaptureFlow

use anyhow::{Context, Result};
use tracing::info;

use crate::config::Config;
use crate::infrastructure::JsExecutor;
use crate::models::{CaptureTask, ContainerLibrary};
use crate::workflow::{CaptureCtx, CaptureFlow, CaptureOutcome};

/// 处理单个帖子
///
/// executor 对应的页面会被导航到任务 URL
pub async fn process_post(
    executor: &JsExecutor,
    task: &CaptureTask,
    post_index: usize,
    config: &Config,
    library: &ContainerLibrary,
) -> Result<CaptureOutcome> {
    info!("[帖子 {}] 🌐 正在打开: {}", post_index, task.url);

    executor
        .page()
        .goto(&task.url)
        .await
        .with_context(|| format!("导航到 {} 失败", task.url))?;

    let ctx = CaptureCtx::new(post_index, task.url.clone());
    let flow = CaptureFlow::new(config);
    flow.run(executor, task, &ctx, library, config).await
}
