//! 基础设施层 - 持有稀缺资源（Page），只暴露能力

pub mod js_executor;

pub use js_executor::JsExecutor;
