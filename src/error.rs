use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 浏览器相关错误
    #[error("浏览器错误: {0}")]
    Browser(#[from] BrowserError),
    /// DOM 操作错误
    #[error("DOM错误: {0}")]
    Dom(#[from] DomError),
    /// 容器生命周期错误
    #[error("容器错误: {0}")]
    Container(#[from] ContainerError),
    /// 文件/存储错误
    #[error("存储错误: {0}")]
    Storage(#[from] StorageError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 其他错误（用于包装第三方库错误）
    #[error("错误: {0}")]
    Other(String),
}

/// 浏览器相关错误
#[derive(Debug, Error)]
pub enum BrowserError {
    /// 连接浏览器失败
    #[error("无法连接到浏览器 (端口: {port}): {source}")]
    ConnectionFailed {
        port: u16,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 创建页面失败
    #[error("创建页面失败: {source}")]
    PageCreationFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 导航失败
    #[error("导航到 {url} 失败: {source}")]
    NavigationFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 执行脚本失败
    #[error("执行脚本失败: {source}")]
    ScriptExecutionFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 浏览器配置失败
    #[error("浏览器配置失败: {source}")]
    ConfigurationFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// DOM 操作错误
#[derive(Debug, Error)]
pub enum DomError {
    /// 选择器未匹配到元素
    #[error("选择器未匹配到元素: {selector}")]
    SelectorNotFound { selector: String },
    /// 页面在限定次数内未就绪
    #[error("页面未就绪 (选择器: {selector}, 已尝试 {attempts} 次)")]
    PageNotReady { selector: String, attempts: usize },
    /// JS 返回值解析失败
    #[error("JS返回值解析失败: {source}")]
    EvalResultParseFailed {
        #[source]
        source: serde_json::Error,
    },
}

/// 容器生命周期错误
#[derive(Debug, Error)]
pub enum ContainerError {
    /// 操作未注册
    #[error("容器 {container} 中未注册操作: {event_key}")]
    OperationNotRegistered {
        container: String,
        event_key: String,
    },
    /// 容器已停止，拒绝刷新
    #[error("容器 {container} 已停止")]
    Stopped { container: String },
}

/// 文件/存储错误
#[derive(Debug, Error)]
pub enum StorageError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: Box<toml::de::Error>,
    },
    /// JSON 解析失败
    #[error("JSON解析失败 ({path}): {source}")]
    JsonParseFailed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    /// 目录不存在
    #[error("目录不存在: {path}")]
    DirectoryNotFound { path: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
}

impl From<chromiumoxide::error::CdpError> for AppError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        AppError::Browser(BrowserError::ScriptExecutionFailed {
            source: Box::new(err),
        })
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Dom(DomError::EvalResultParseFailed { source: err })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建浏览器连接错误
    pub fn browser_connection_failed(
        port: u16,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Browser(BrowserError::ConnectionFailed {
            port,
            source: Box::new(source),
        })
    }

    /// 创建操作未注册错误
    pub fn operation_not_registered(
        container: impl Into<String>,
        event_key: impl Into<String>,
    ) -> Self {
        AppError::Container(ContainerError::OperationNotRegistered {
            container: container.into(),
            event_key: event_key.into(),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
