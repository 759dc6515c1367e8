//! # Weibo Container Capture
//!
//! 一个基于自刷新容器的微博帖子抓取程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `JsExecutor` - 唯一的 page owner，提供 eval() / click / fill 能力
//! - `browser/` - 浏览器连接与启动
//!
//! ### ② 容器层（Containers）
//! - `container/` - 自刷新容器族，只处理自己的 DOM 区域
//! - `ContainerCore` - 公共生命周期：触发准入、计数、操作注册、变更监听
//! - `CommentContainer` / `ReplyContainer` - 评论与楼中楼抓取
//! - `ScrollContainer` / `PaginationContainer` - 滚动与翻页启发式
//! - `PostPageContainer` - 页级协调与子容器扇出刷新
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个帖子"的完整抓取流程
//! - `CaptureCtx` - 上下文封装（post_index + url）
//! - `CaptureFlow` - 流程编排（就绪 → 刷新循环 → 落盘 → 兜底）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量帖子处理器，管理资源和并发
//! - `orchestrator/post_processor` - 单个帖子处理器，导航并委托流程层
//!
//! ## 模块结构

pub mod browser;
pub mod config;
pub mod container;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::connect_to_browser;
pub use config::Config;
pub use container::{
    CommentContainer, ContainerStatus, PaginationContainer, PostPageContainer, RefreshTrigger,
    ReplyContainer, ScrollContainer,
};
pub use error::{AppError, AppResult};
pub use infrastructure::JsExecutor;
pub use models::{CaptureTask, CapturedPost, CommentData, ContainerLibrary, ReplyData};
pub use orchestrator::{process_post, App};
pub use workflow::{CaptureCtx, CaptureFlow, CaptureOutcome, ProcessResult};
