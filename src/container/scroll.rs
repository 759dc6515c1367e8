//! 滚动容器
//!
//! 滚动到底 -> 固定等待 -> 重新测量，连续多轮高度和条目数都不变
//! 即判定无新内容（饱和）。

use anyhow::Result;
use tokio::time::{sleep, Duration};
use tracing::{debug, info};

use crate::config::Config;
use crate::container::core::{ContainerCore, RefreshTrigger};
use crate::infrastructure::JsExecutor;
use crate::models::ContainerLibrary;

/// 滚动容器
pub struct ScrollContainer {
    core: ContainerCore,
    max_attempts: usize,
    stall_rounds: usize,
    pause: Duration,
    /// 已执行的滚动次数
    attempts: usize,
    /// 连续无变化的轮数
    stalls: usize,
    last_height: u64,
    last_item_count: usize,
    saturated: bool,
}

impl ScrollContainer {
    pub fn new(library: &ContainerLibrary, config: &Config) -> Self {
        Self {
            core: ContainerCore::new("scroll", library.entry("scroll"), config.max_auto_attempts),
            max_attempts: config.max_scroll_attempts,
            stall_rounds: config.scroll_stall_rounds,
            pause: Duration::from_millis(config.scroll_pause_ms),
            attempts: 0,
            stalls: 0,
            last_height: 0,
            last_item_count: 0,
            saturated: false,
        }
    }

    pub fn core(&self) -> &ContainerCore {
        &self.core
    }

    pub fn attempts(&self) -> usize {
        self.attempts
    }

    pub fn is_saturated(&self) -> bool {
        self.saturated
    }

    /// 任务完成启发式 = 饱和
    pub fn is_task_complete(&self) -> bool {
        self.saturated
    }

    /// 翻页后内容被整页替换，滚动饱和状态需要重置
    pub fn reset_after_page_change(&mut self) {
        self.stalls = 0;
        self.saturated = false;
        self.last_height = 0;
        self.last_item_count = 0;
    }

    /// 执行一次滚动步进，返回 false 表示已饱和（或次数耗尽）
    pub async fn scroll_step(&mut self, executor: &JsExecutor) -> Result<bool> {
        if self.saturated {
            return Ok(false);
        }
        if self.attempts >= self.max_attempts {
            debug!(
                "[容器 scroll] 滚动次数耗尽 ({}/{})，判定饱和",
                self.attempts, self.max_attempts
            );
            self.saturated = true;
            self.core.mark_saturated();
            return Ok(false);
        }
        if !self.core.begin_refresh(RefreshTrigger::Operation) {
            return Ok(false);
        }

        let height = executor.scroll_to_bottom().await?;
        self.attempts += 1;
        sleep(self.pause).await;

        let item_selector = format!("{} {}", self.core.entry().root, self.core.entry().selector("item"));
        let item_count = executor.count(&item_selector).await?;
        let changed = self.register_measurement(height, item_count);
        self.core.finish_refresh();

        debug!(
            "[容器 scroll] 第 {} 次滚动: 高度 {}, 条目 {}, 停滞 {}/{}",
            self.attempts, height, item_count, self.stalls, self.stall_rounds
        );

        if !changed && self.stalls >= self.stall_rounds {
            info!(
                "✓ 滚动饱和: {} 次滚动后连续 {} 轮无新内容",
                self.attempts, self.stalls
            );
            self.saturated = true;
            self.core.mark_saturated();
            return Ok(false);
        }

        Ok(true)
    }

    /// 滚动直到无新内容（scroll_step 的收敛循环）
    pub async fn scroll_until_no_new_content(&mut self, executor: &JsExecutor) -> Result<usize> {
        let before = self.attempts;
        while self.scroll_step(executor).await? {}
        Ok(self.attempts - before)
    }

    /// 记录一次测量，返回相对上一轮是否有变化
    fn register_measurement(&mut self, height: u64, item_count: usize) -> bool {
        let changed = height != self.last_height || item_count != self.last_item_count;
        if changed {
            self.stalls = 0;
        } else {
            self.stalls += 1;
        }
        self.last_height = height;
        self.last_item_count = item_count;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::library::ContainerLibrary;

    fn container() -> ScrollContainer {
        let mut config = Config::default();
        config.max_scroll_attempts = 10;
        config.scroll_stall_rounds = 2;
        ScrollContainer::new(&ContainerLibrary::default(), &config)
    }

    #[test]
    fn test_measurement_detects_growth() {
        let mut container = container();
        assert!(container.register_measurement(1000, 10));
        assert!(container.register_measurement(2000, 18));
        assert_eq!(container.stalls, 0);
    }

    #[test]
    fn test_measurement_counts_stalls() {
        let mut container = container();
        container.register_measurement(1000, 10);
        assert!(!container.register_measurement(1000, 10));
        assert!(!container.register_measurement(1000, 10));
        assert_eq!(container.stalls, 2);
    }

    #[test]
    fn test_stall_counter_resets_on_change() {
        let mut container = container();
        container.register_measurement(1000, 10);
        container.register_measurement(1000, 10);
        assert_eq!(container.stalls, 1);
        // 条目数变了，停滞清零
        container.register_measurement(1000, 12);
        assert_eq!(container.stalls, 0);
    }

    #[test]
    fn test_reset_after_page_change() {
        let mut container = container();
        container.register_measurement(1000, 10);
        container.saturated = true;
        container.reset_after_page_change();
        assert!(!container.is_saturated());
        assert_eq!(container.last_height, 0);
    }
}
