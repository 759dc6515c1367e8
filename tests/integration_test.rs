use weibo_container_capture::models::{load_all_task_files, load_container_library};
use weibo_container_capture::utils::logging;
use weibo_container_capture::workflow::{CaptureCtx, CaptureFlow};
use weibo_container_capture::{connect_to_browser, CaptureTask, Config, JsExecutor};

#[tokio::test]
#[ignore] // 默认忽略，需要手动运行：cargo test -- --ignored
async fn test_capture_single_post() {
    // 初始化日志
    logging::init();

    // 加载配置
    let config = Config::from_env();

    // 连接浏览器（需要事先以 --remote-debugging-port 启动并登录微博）
    let (_browser, page) = connect_to_browser(config.browser_debug_port, None)
        .await
        .expect("连接浏览器失败");

    let executor = JsExecutor::new(page);

    // 注意：请根据实际情况修改帖子 URL
    let task = CaptureTask {
        url: "https://m.weibo.cn/detail/4000000000000000".to_string(),
        max_comments: Some(30),
        expand_replies: true,
        file_path: None,
    };

    executor
        .page()
        .goto(&task.url)
        .await
        .expect("导航到帖子失败");

    let library = load_container_library(&config.library_file)
        .await
        .expect("加载容器库失败");

    let ctx = CaptureCtx::new(1, task.url.clone());
    let flow = CaptureFlow::new(&config);

    let outcome = flow
        .run(&executor, &task, &ctx, &library, &config)
        .await
        .expect("抓取帖子失败");

    println!("抓取结果: {:?}, {} 条评论", outcome.result, outcome.comment_count);
}

#[tokio::test]
#[ignore]
async fn test_browser_connection() {
    logging::init();

    let config = Config::from_env();

    let result = connect_to_browser(config.browser_debug_port, None).await;

    assert!(result.is_ok(), "应该能够成功连接浏览器");
}

#[tokio::test]
#[ignore]
async fn test_load_task_files() {
    logging::init();

    let config = Config::from_env();

    let result = load_all_task_files(&config.tasks_folder).await;

    assert!(result.is_ok(), "应该能够加载任务文件");

    let tasks = result.unwrap();
    println!("找到 {} 个任务", tasks.len());
}
