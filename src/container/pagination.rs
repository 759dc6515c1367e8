//! 翻页容器
//!
//! 只要还能发现可用的"下一页"操作且未达页数上限，就继续点下一页；
//! 按钮消失/禁用或达到上限即判定饱和。

use anyhow::Result;
use tokio::time::{sleep, Duration};
use tracing::{debug, info};

use crate::config::Config;
use crate::container::core::{ContainerCore, RefreshTrigger};
use crate::infrastructure::JsExecutor;
use crate::models::ContainerLibrary;

/// 翻页容器
pub struct PaginationContainer {
    core: ContainerCore,
    max_pages: usize,
    pause: Duration,
    /// 已翻过的页数（不含初始页）
    pages_visited: usize,
    saturated: bool,
}

impl PaginationContainer {
    pub fn new(library: &ContainerLibrary, config: &Config) -> Self {
        Self {
            core: ContainerCore::new(
                "pagination",
                library.entry("pagination"),
                config.max_auto_attempts,
            ),
            max_pages: config.max_pages,
            pause: Duration::from_millis(config.page_pause_ms),
            pages_visited: 0,
            saturated: false,
        }
    }

    pub fn core(&self) -> &ContainerCore {
        &self.core
    }

    pub fn pages_visited(&self) -> usize {
        self.pages_visited
    }

    pub fn is_saturated(&self) -> bool {
        self.saturated
    }

    /// 任务完成启发式 = 饱和
    pub fn is_task_complete(&self) -> bool {
        self.saturated
    }

    /// 页数上限检查（纯逻辑，供步进与测试共用）
    fn reached_page_cap(&self) -> bool {
        self.pages_visited >= self.max_pages
    }

    /// 尝试翻到下一页，返回 true 表示翻页成功
    ///
    /// 不抛操作层错误：按钮不在、点击未消费都按饱和处理
    pub async fn advance_page(&mut self, executor: &JsExecutor) -> Result<bool> {
        if self.saturated {
            return Ok(false);
        }
        if self.reached_page_cap() {
            debug!(
                "[容器 pagination] 页数达到上限 ({}/{})",
                self.pages_visited, self.max_pages
            );
            self.saturated = true;
            self.core.mark_saturated();
            return Ok(false);
        }
        if !self.core.begin_refresh(RefreshTrigger::Operation) {
            return Ok(false);
        }

        // 每次翻页前重新扫描，分页条会随页码刷新重建
        self.core.discover_operations(executor).await?;

        if !self.core.registry().contains("next_page") {
            debug!("[容器 pagination] 未发现下一页按钮，判定饱和");
            self.core.finish_refresh();
            self.saturated = true;
            self.core.mark_saturated();
            return Ok(false);
        }

        let result = self.core.execute_operation(executor, "next_page", None).await;
        self.core.finish_refresh();

        if !result.success || !result.consumed {
            debug!("[容器 pagination] 翻页未生效: {}", result.message);
            self.saturated = true;
            self.core.mark_saturated();
            return Ok(false);
        }

        self.pages_visited += 1;
        sleep(self.pause).await;
        info!("📄 已翻到第 {} 页", self.pages_visited + 1);
        Ok(true)
    }

    /// 连续翻页直到饱和，返回翻过的页数
    pub async fn paginate_until_saturated(&mut self, executor: &JsExecutor) -> Result<usize> {
        let before = self.pages_visited;
        while self.advance_page(executor).await? {}
        Ok(self.pages_visited - before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::library::ContainerLibrary;

    fn container(max_pages: usize) -> PaginationContainer {
        let mut config = Config::default();
        config.max_pages = max_pages;
        PaginationContainer::new(&ContainerLibrary::default(), &config)
    }

    #[test]
    fn test_page_cap() {
        let mut container = container(3);
        assert!(!container.reached_page_cap());
        container.pages_visited = 3;
        assert!(container.reached_page_cap());
    }

    #[test]
    fn test_saturated_is_terminal_for_completion() {
        let mut container = container(3);
        assert!(!container.is_task_complete());
        container.saturated = true;
        assert!(container.is_task_complete());
    }
}
