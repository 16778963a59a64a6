use std::sync::Arc;

use course_capture::browser::{connect_to_browser, launch_browser};
use course_capture::config::Config;
use course_capture::models::SiteProfile;
use course_capture::services::{ChromeAuthenticator, ChromeLessonEnumerator, ChromePageCapturer};
use course_capture::utils::logging;
use course_capture::{download_course, Authenticator, LessonSource, RunOptions};

#[tokio::test]
#[ignore] // 默认忽略，需要手动运行：cargo test -- --ignored
async fn test_download_course() {
    // 初始化日志
    logging::init(true);

    // 加载配置（需要 COURSE_URL 以及账号密码或已保存的 Cookie）
    let config = Config::from_env().expect("读取配置失败");

    let authenticator = ChromeAuthenticator::new(&config, SiteProfile::default());
    let report = download_course(
        &authenticator,
        &ChromeLessonEnumerator::new(),
        Arc::new(ChromePageCapturer::new()),
        &RunOptions::from(&config),
    )
    .await
    .expect("下载课程失败");

    assert_eq!(report.results.len(), report.course.len());
    assert!(report.succeeded() > 0, "至少应该有一个课时成功");
}

#[tokio::test]
#[ignore]
async fn test_enumerate_lessons() {
    logging::init(true);
    let config = Config::from_env().expect("读取配置失败");

    let authenticator = ChromeAuthenticator::new(&config, SiteProfile::default());
    let session = authenticator.authenticate().await.expect("登录失败");
    let course = ChromeLessonEnumerator::new()
        .enumerate(&session, &config.course_url)
        .await;
    authenticator.teardown(session).await;

    let course = course.expect("获取课时失败");
    println!("课程 {} 共 {} 个课时", course.name, course.len());
    assert!(!course.is_empty());
}

#[tokio::test]
#[ignore]
async fn test_launch_browser() {
    logging::init(true);

    let result = launch_browser(true, None, (1440, 900)).await;

    assert!(result.is_ok(), "应该能够成功启动浏览器");
}

#[tokio::test]
#[ignore]
async fn test_browser_connection() {
    logging::init(true);
    let config = Config::from_env().expect("读取配置失败");

    // 需要先以 --remote-debugging-port 启动浏览器
    let port = config.browser_debug_port.unwrap_or(9222);
    let result = connect_to_browser(port).await;

    assert!(result.is_ok(), "应该能够成功连接浏览器");
}
