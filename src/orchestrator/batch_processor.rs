//! 批量帖子处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量帖子的抓取和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：启动日志、连接浏览器、加载容器库
//! 2. **批量加载**：扫描并加载所有待抓取的任务（`Vec<CaptureTask>`）
//! 3. **并发控制**：使用 Semaphore 限制并发数量
//! 4. **分批处理**：将帖子分批次处理，每批完成后再开始下一批
//! 5. **资源管理**：持有 Browser，每个任务分配独立页面
//! 6. **全局统计**：汇总所有帖子的抓取结果，回写容器库

use std::sync::Arc;

use anyhow::Result;
use chromiumoxide::Browser;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::browser;
use crate::config::Config;
use crate::infrastructure::JsExecutor;
use crate::models::{load_all_task_files, load_container_library, save_container_library};
use crate::models::{CaptureTask, ContainerLibrary};
use crate::orchestrator::post_processor;
use crate::utils::logging;
use crate::workflow::{CaptureOutcome, ProcessResult};

/// 应用主结构
pub struct App {
    config: Config,
    browser: Browser,
    library: ContainerLibrary,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        logging::init_log_file(&config.output_log_file)?;
        logging::log_startup(config.max_concurrent_posts);

        let (browser, _page) =
            browser::connect_to_browser(config.browser_debug_port, None).await?;

        let library = load_container_library(&config.library_file).await?;

        Ok(Self {
            config,
            browser,
            library,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(mut self) -> Result<()> {
        let all_tasks = self.load_tasks().await?;

        if all_tasks.is_empty() {
            warn!("⚠️ 没有找到待抓取的任务文件，程序结束");
            return Ok(());
        }

        let total_tasks = all_tasks.len();
        logging::log_tasks_loaded(total_tasks, self.config.max_concurrent_posts);

        let stats = self.process_all_tasks(all_tasks).await?;

        // 容器库带着最新发现的操作落盘
        save_container_library(&self.config.library_file, &self.library).await?;
        info!("✓ 容器库已回写: {}", self.config.library_file);

        logging::print_final_stats(
            stats.success,
            stats.failed,
            stats.total,
            &self.config.output_log_file,
        );

        Ok(())
    }

    /// 加载任务
    async fn load_tasks(&self) -> Result<Vec<CaptureTask>> {
        info!("\n📁 正在扫描待抓取的任务...");
        load_all_task_files(&self.config.tasks_folder).await
    }

    /// 处理所有任务
    async fn process_all_tasks(&mut self, all_tasks: Vec<CaptureTask>) -> Result<ProcessingStats> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_posts));
        let total_tasks = all_tasks.len();
        let mut stats = ProcessingStats {
            total: total_tasks,
            ..Default::default()
        };

        // 分批处理
        for batch_start in (0..total_tasks).step_by(self.config.max_concurrent_posts) {
            let batch_end = (batch_start + self.config.max_concurrent_posts).min(total_tasks);
            let batch_tasks = &all_tasks[batch_start..batch_end];
            let batch_num = (batch_start / self.config.max_concurrent_posts) + 1;
            let total_batches = total_tasks.div_ceil(self.config.max_concurrent_posts);

            logging::log_batch_start(
                batch_num,
                total_batches,
                batch_start + 1,
                batch_end,
                total_tasks,
            );

            let batch_result = self
                .process_batch(batch_tasks, batch_start, semaphore.clone())
                .await?;

            stats.success += batch_result.success;
            stats.failed += batch_result.failed;

            logging::log_batch_complete(
                batch_num,
                batch_result.success,
                batch_result.success + batch_result.failed,
            );
        }

        Ok(stats)
    }

    /// 处理单个批次
    ///
    /// 每个帖子分配独立页面，抓取结束后关闭；子任务的失败不会中断批次
    async fn process_batch(
        &mut self,
        batch_tasks: &[CaptureTask],
        batch_start: usize,
        semaphore: Arc<Semaphore>,
    ) -> Result<BatchResult> {
        let mut batch_handles = Vec::new();

        for (idx, task) in batch_tasks.iter().enumerate() {
            let post_index = batch_start + idx + 1;
            let permit = semaphore.clone().acquire_owned().await?;

            // 页面在主任务里创建（Browser 不能跨任务移动），处理在子任务里进行
            let page = self.browser.new_page("about:blank").await?;
            let page_handle = page.clone();
            let task_clone = task.clone();
            let config_clone = self.config.clone();
            let library_clone = self.library.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                let executor = JsExecutor::new(page);
                let outcome = post_processor::process_post(
                    &executor,
                    &task_clone,
                    post_index,
                    &config_clone,
                    &library_clone,
                )
                .await;

                // 页面用完即关，避免批量任务攒出几十个标签页
                if let Err(e) = page_handle.close().await {
                    warn!("[帖子 {}] 关闭页面失败: {}", post_index, e);
                }

                outcome
            });
            batch_handles.push((post_index, handle));
        }

        // 等待本批所有任务完成（allSettled：逐个收割，互不影响）
        let mut result = BatchResult::default();

        for (post_index, handle) in batch_handles {
            match handle.await {
                Ok(Ok(outcome)) => {
                    self.absorb_outcome(&outcome);
                    match outcome.result {
                        ProcessResult::Success => result.success += 1,
                        ProcessResult::Skipped => result.failed += 1,
                    }
                }
                Ok(Err(e)) => {
                    error!("[帖子 {}] ❌ 抓取过程中发生错误: {}", post_index, e);
                    result.failed += 1;
                }
                Err(e) => {
                    error!("[帖子 {}] 任务执行失败: {}", post_index, e);
                    result.failed += 1;
                }
            }
        }

        Ok(result)
    }

    /// 把单帖产出合并进全局状态（容器库操作记录）
    fn absorb_outcome(&mut self, outcome: &CaptureOutcome) {
        for (name, operations) in &outcome.discovered {
            self.library.record_operations(name, operations.clone());
        }
    }
}

/// 处理统计
#[derive(Debug, Default)]
struct ProcessingStats {
    success: usize,
    failed: usize,
    total: usize,
}

/// 批次处理结果
#[derive(Debug, Default)]
struct BatchResult {
    success: usize,
    failed: usize,
}
