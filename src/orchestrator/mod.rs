//! 编排层 - 批量任务处理与资源管理

pub mod batch_processor;
pub mod post_processor;

pub use batch_processor::App;
pub use post_processor::process_post;
