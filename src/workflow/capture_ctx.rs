//! 抓取上下文 - 流程层

/// 单个帖子的抓取上下文
///
/// 封装跨层传递的标识信息，避免函数签名里散落裸参数
#[derive(Debug, Clone)]
pub struct CaptureCtx {
    /// 帖子在本批任务中的序号（从 1 开始，用于日志和落盘文件名）
    pub post_index: usize,
    /// 帖子 URL
    pub url: String,
}

impl CaptureCtx {
    pub fn new(post_index: usize, url: impl Into<String>) -> Self {
        Self {
            post_index,
            url: url.into(),
        }
    }
}
