//! 流程层 - 定义"一个帖子"的完整抓取流程

pub mod capture_ctx;
pub mod capture_flow;

pub use capture_ctx::CaptureCtx;
pub use capture_flow::{CaptureFlow, CaptureOutcome, ProcessResult};
