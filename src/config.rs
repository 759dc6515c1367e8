/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 同时处理的帖子数量
    pub max_concurrent_posts: usize,
    /// 浏览器调试端口
    pub browser_debug_port: u16,
    /// 任务 TOML 文件存放目录
    pub tasks_folder: String,
    /// 抓取结果 JSON 输出目录
    pub output_folder: String,
    /// 容器库文件路径
    pub library_file: String,
    /// 零评论帖子的兜底记录文件
    pub skipped_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    // --- 容器刷新配置 ---
    /// 定时刷新间隔（毫秒）
    pub refresh_interval_ms: u64,
    /// 自动触发（定时/DOM变更）刷新的最大次数
    pub max_auto_attempts: usize,
    /// 刷新轮次上限（单个帖子）
    pub max_refresh_rounds: usize,
    // --- 滚动容器配置 ---
    /// 最大滚动次数
    pub max_scroll_attempts: usize,
    /// 连续多少轮无新内容视为饱和
    pub scroll_stall_rounds: usize,
    /// 每次滚动后的固定等待（毫秒）
    pub scroll_pause_ms: u64,
    // --- 翻页容器配置 ---
    /// 最大翻页数
    pub max_pages: usize,
    /// 翻页后的固定等待（毫秒）
    pub page_pause_ms: u64,
    // --- 评论/回复容器配置 ---
    /// 单个帖子抓取的评论上限
    pub max_comments: usize,
    /// 连续多少轮评论数不增长视为完成
    pub no_growth_rounds: usize,
    /// 单条评论的回复展开次数上限
    pub max_reply_expansions: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent_posts: 3,
            browser_debug_port: 9222,
            tasks_folder: "tasks".to_string(),
            output_folder: "captured_posts".to_string(),
            library_file: "container-library.json".to_string(),
            skipped_file: "skipped.txt".to_string(),
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
            refresh_interval_ms: 2000,
            max_auto_attempts: 10,
            max_refresh_rounds: 30,
            max_scroll_attempts: 50,
            scroll_stall_rounds: 3,
            scroll_pause_ms: 800,
            max_pages: 20,
            page_pause_ms: 1200,
            max_comments: 500,
            no_growth_rounds: 3,
            max_reply_expansions: 5,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            max_concurrent_posts: std::env::var("MAX_CONCURRENT_POSTS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_concurrent_posts),
            browser_debug_port: std::env::var("BROWSER_DEBUG_PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.browser_debug_port),
            tasks_folder: std::env::var("TASKS_FOLDER").unwrap_or(default.tasks_folder),
            output_folder: std::env::var("OUTPUT_FOLDER").unwrap_or(default.output_folder),
            library_file: std::env::var("LIBRARY_FILE").unwrap_or(default.library_file),
            skipped_file: std::env::var("SKIPPED_FILE").unwrap_or(default.skipped_file),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            refresh_interval_ms: std::env::var("REFRESH_INTERVAL_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.refresh_interval_ms),
            max_auto_attempts: std::env::var("MAX_AUTO_ATTEMPTS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_auto_attempts),
            max_refresh_rounds: std::env::var("MAX_REFRESH_ROUNDS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_refresh_rounds),
            max_scroll_attempts: std::env::var("MAX_SCROLL_ATTEMPTS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_scroll_attempts),
            scroll_stall_rounds: std::env::var("SCROLL_STALL_ROUNDS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.scroll_stall_rounds),
            scroll_pause_ms: std::env::var("SCROLL_PAUSE_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.scroll_pause_ms),
            max_pages: std::env::var("MAX_PAGES").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_pages),
            page_pause_ms: std::env::var("PAGE_PAUSE_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.page_pause_ms),
            max_comments: std::env::var("MAX_COMMENTS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_comments),
            no_growth_rounds: std::env::var("NO_GROWTH_ROUNDS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.no_growth_rounds),
            max_reply_expansions: std::env::var("MAX_REPLY_EXPANSIONS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_reply_expansions),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_caps_are_positive() {
        let config = Config::default();
        assert!(config.max_auto_attempts > 0);
        assert!(config.max_scroll_attempts > 0);
        assert!(config.scroll_stall_rounds > 0);
        assert!(config.max_pages > 0);
    }
}
