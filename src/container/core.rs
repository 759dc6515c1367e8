//! 自刷新容器公共核心
//!
//! 每个具体容器组合一个 `ContainerCore`，核心负责：
//! - 刷新触发源的准入控制（自动触发有次数上限，手动触发不受限）
//! - 刷新/尝试计数与状态机
//! - 操作的动态发现与执行
//! - DOM 变更监听（注入 MutationObserver，轮询计数器）

use anyhow::Result;
use tracing::{debug, warn};

use crate::container::operation::{
    OperationKind, OperationRegistry, OperationResult, RawClickable,
};
use crate::infrastructure::JsExecutor;
use crate::models::{ContainerEntry, PersistedOperation};

/// 刷新触发源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    /// 容器初始化
    Initialization,
    /// 定时器
    Timer,
    /// DOM 变更监听
    DomMutation,
    /// 显式调用
    Manual,
    /// 操作执行后的联动刷新
    Operation,
}

impl RefreshTrigger {
    /// 自动触发源（受 max_auto_attempts 限制）
    pub fn is_auto(self) -> bool {
        matches!(self, RefreshTrigger::Timer | RefreshTrigger::DomMutation)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RefreshTrigger::Initialization => "initialization",
            RefreshTrigger::Timer => "timer",
            RefreshTrigger::DomMutation => "dom_mutation",
            RefreshTrigger::Manual => "manual",
            RefreshTrigger::Operation => "operation",
        }
    }
}

/// 容器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerStatus {
    Idle,
    Refreshing,
    /// 启发式判定已无新内容
    Saturated,
    Stopped,
}

/// 自刷新容器核心
pub struct ContainerCore {
    name: String,
    entry: ContainerEntry,
    status: ContainerStatus,
    /// 完成过的刷新总数（所有触发源）
    refresh_count: usize,
    /// 自动触发（Timer / DomMutation）已消耗的次数
    auto_attempts: usize,
    max_auto_attempts: usize,
    registry: OperationRegistry,
    /// 上次轮询到的 DOM 变更计数
    last_mutation_count: u64,
    /// 最近一次操作/刷新失败的信息
    last_error: Option<String>,
}

impl ContainerCore {
    pub fn new(name: impl Into<String>, entry: ContainerEntry, max_auto_attempts: usize) -> Self {
        Self {
            name: name.into(),
            entry,
            status: ContainerStatus::Idle,
            refresh_count: 0,
            auto_attempts: 0,
            max_auto_attempts,
            registry: OperationRegistry::new(),
            last_mutation_count: 0,
            last_error: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entry(&self) -> &ContainerEntry {
        &self.entry
    }

    pub fn status(&self) -> ContainerStatus {
        self.status
    }

    pub fn refresh_count(&self) -> usize {
        self.refresh_count
    }

    pub fn auto_attempts(&self) -> usize {
        self.auto_attempts
    }

    /// 自动触发（Timer / DomMutation）次数是否已耗尽
    pub fn auto_exhausted(&self) -> bool {
        self.auto_attempts >= self.max_auto_attempts
    }

    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// 刷新准入判断
    ///
    /// - Stopped 容器拒绝一切刷新
    /// - 自动触发在 auto_attempts 耗尽后被忽略（手动/初始化/操作联动不受限）
    pub fn should_refresh(&self, trigger: RefreshTrigger) -> bool {
        if self.status == ContainerStatus::Stopped {
            return false;
        }
        if trigger.is_auto() && self.auto_exhausted() {
            debug!(
                "[容器 {}] 自动刷新已达上限 ({}/{})，忽略 {} 触发",
                self.name,
                self.auto_attempts,
                self.max_auto_attempts,
                trigger.as_str()
            );
            return false;
        }
        true
    }

    /// 进入刷新，返回 false 表示本次触发被忽略
    pub fn begin_refresh(&mut self, trigger: RefreshTrigger) -> bool {
        if !self.should_refresh(trigger) {
            return false;
        }
        if trigger.is_auto() {
            self.auto_attempts += 1;
        }
        self.status = ContainerStatus::Refreshing;
        true
    }

    /// 结束刷新
    pub fn finish_refresh(&mut self) {
        self.refresh_count += 1;
        if self.status == ContainerStatus::Refreshing {
            self.status = ContainerStatus::Idle;
        }
    }

    pub fn mark_saturated(&mut self) {
        self.status = ContainerStatus::Saturated;
    }

    pub fn mark_stopped(&mut self) {
        self.status = ContainerStatus::Stopped;
    }

    pub fn record_error(&mut self, message: impl Into<String>) {
        self.last_error = Some(message.into());
    }

    /// 容器根区域内的可点击元素选择器
    fn clickable_selector(&self) -> String {
        let root = &self.entry.root;
        format!("{root} button, {root} a, {root} [role='button']")
    }

    /// 扫描容器 DOM 区域，重建操作注册表，返回注册数量
    pub async fn discover_operations(&mut self, executor: &JsExecutor) -> Result<usize> {
        let selector = self.clickable_selector();
        let js_code = format!(
            r#"
            (() => {{
                const els = document.querySelectorAll({selector});
                const records = [];
                els.forEach((el, i) => {{
                    const text = (el.innerText || '').trim();
                    if (text && text.length <= 20) {{
                        records.push({{ text: text, nth: i, tag: el.tagName.toLowerCase() }});
                    }}
                }});
                return records;
            }})()
            "#,
            selector = serde_json::to_string(&selector)?,
        );

        let records: Vec<RawClickable> = executor.eval_as(js_code).await?;
        let registered = self.registry.rebuild_from_scan(&selector, &records);
        debug!(
            "[容器 {}] 扫描到 {} 个可点击元素，注册 {} 个操作",
            self.name,
            records.len(),
            registered
        );
        Ok(registered)
    }

    /// 执行已注册的操作
    ///
    /// 操作层面的失败（未注册、元素消失、脚本报错）一律以
    /// OperationResult 值返回，调用方决定是否继续
    pub async fn execute_operation(
        &mut self,
        executor: &JsExecutor,
        event_key: &str,
        payload: Option<&str>,
    ) -> OperationResult {
        let operation = match self.registry.get(event_key) {
            Some(op) => op.clone(),
            None => {
                let message = format!("[容器 {}] 未注册的操作: {}", self.name, event_key);
                debug!("{}", message);
                return OperationResult::failure(message);
            }
        };

        let outcome = match operation.kind {
            OperationKind::Click => executor.click_nth(&operation.selector, operation.nth).await,
            OperationKind::Type | OperationKind::Fill => {
                executor
                    .fill_nth(&operation.selector, operation.nth, payload.unwrap_or(""))
                    .await
            }
        };

        match outcome {
            Ok(true) => OperationResult::ok(format!(
                "[容器 {}] 操作 {} ({}) 执行成功",
                self.name, event_key, operation.label
            )),
            Ok(false) => OperationResult::not_consumed(format!(
                "[容器 {}] 操作 {} 的目标元素已消失",
                self.name, event_key
            )),
            Err(e) => {
                let message = format!("[容器 {}] 操作 {} 执行失败: {}", self.name, event_key, e);
                warn!("{}", message);
                self.record_error(&message);
                OperationResult::failure(message)
            }
        }
    }

    /// 注入 MutationObserver，监听容器根的子树变更
    ///
    /// 返回 false 表示容器根不存在（页面未就绪）
    pub async fn install_mutation_observer(&self, executor: &JsExecutor) -> Result<bool> {
        let js_code = format!(
            r#"
            (() => {{
                const root = document.querySelector({root});
                if (!root) return false;
                window.__wbMutations = window.__wbMutations || {{}};
                if (window.__wbMutations[{name}] !== undefined) return true;
                window.__wbMutations[{name}] = 0;
                new MutationObserver(() => {{
                    window.__wbMutations[{name}] += 1;
                }}).observe(root, {{ childList: true, subtree: true }});
                return true;
            }})()
            "#,
            root = serde_json::to_string(&self.entry.root)?,
            name = serde_json::to_string(&self.name)?,
        );
        executor.eval_as(js_code).await
    }

    /// 轮询 DOM 变更计数器，返回上次轮询以来是否有变更
    pub async fn poll_mutations(&mut self, executor: &JsExecutor) -> Result<bool> {
        let js_code = format!(
            "(window.__wbMutations && window.__wbMutations[{}]) || 0",
            serde_json::to_string(&self.name)?,
        );
        let current: u64 = executor.eval_as(js_code).await?;
        let changed = current != self.last_mutation_count;
        self.last_mutation_count = current;
        Ok(changed)
    }

    /// 导出注册表用于回写容器库
    pub fn persisted_operations(&self) -> Vec<PersistedOperation> {
        self.registry.to_persisted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn core(max_auto: usize) -> ContainerCore {
        ContainerCore::new("测试容器", ContainerEntry::default(), max_auto)
    }

    #[test]
    fn test_auto_triggers_stop_at_max_attempts() {
        let mut core = core(2);

        assert!(core.begin_refresh(RefreshTrigger::Timer));
        core.finish_refresh();
        assert!(core.begin_refresh(RefreshTrigger::DomMutation));
        core.finish_refresh();

        // 自动触发耗尽
        assert!(core.auto_exhausted());
        assert!(!core.begin_refresh(RefreshTrigger::Timer));
        assert!(!core.begin_refresh(RefreshTrigger::DomMutation));
        assert_eq!(core.auto_attempts(), 2);
        assert_eq!(core.refresh_count(), 2);
    }

    #[test]
    fn test_manual_refresh_survives_exhaustion() {
        let mut core = core(1);
        assert!(core.begin_refresh(RefreshTrigger::Timer));
        core.finish_refresh();
        assert!(!core.begin_refresh(RefreshTrigger::Timer));

        // 手动 / 初始化 / 操作联动不受自动上限约束
        assert!(core.begin_refresh(RefreshTrigger::Manual));
        core.finish_refresh();
        assert!(core.begin_refresh(RefreshTrigger::Initialization));
        core.finish_refresh();
        assert!(core.begin_refresh(RefreshTrigger::Operation));
        core.finish_refresh();
        assert_eq!(core.refresh_count(), 4);
    }

    #[test]
    fn test_stopped_container_rejects_everything() {
        let mut core = core(5);
        core.mark_stopped();
        assert!(!core.begin_refresh(RefreshTrigger::Manual));
        assert!(!core.begin_refresh(RefreshTrigger::Timer));
        assert_eq!(core.refresh_count(), 0);
    }

    #[test]
    fn test_status_transitions() {
        let mut core = core(5);
        assert_eq!(core.status(), ContainerStatus::Idle);
        core.begin_refresh(RefreshTrigger::Manual);
        assert_eq!(core.status(), ContainerStatus::Refreshing);
        core.finish_refresh();
        assert_eq!(core.status(), ContainerStatus::Idle);
        core.mark_saturated();
        assert_eq!(core.status(), ContainerStatus::Saturated);
        // 饱和不等于停止，手动刷新仍然可用
        assert!(core.should_refresh(RefreshTrigger::Manual));
    }
}
