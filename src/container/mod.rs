//! 自刷新容器族
//!
//! `core` 提供公共生命周期（触发准入、计数、操作注册、变更监听），
//! 五个具体容器在其上实现各自的抓取启发式。

pub mod comment;
pub mod core;
pub mod operation;
pub mod page;
pub mod pagination;
pub mod reply;
pub mod scroll;

pub use comment::CommentContainer;
pub use core::{ContainerCore, ContainerStatus, RefreshTrigger};
pub use operation::{Operation, OperationKind, OperationRegistry, OperationResult};
pub use page::PostPageContainer;
pub use pagination::PaginationContainer;
pub use reply::ReplyContainer;
pub use scroll::ScrollContainer;
