//! 业务能力层 - 描述"我能做什么"，只处理单个帖子

pub mod dump_writer;
pub mod skipped_writer;

pub use dump_writer::DumpWriter;
pub use skipped_writer::SkippedWriter;
