use anyhow::Result;
use chromiumoxide::Browser;
use tokio::time::sleep;
use tracing::{debug, error, info};

/// 连接到已经打开的浏览器（`--remote-debugging-port`）
///
/// 适合已在该浏览器里手动登录过的情况，页面共享它的 Cookie。
pub async fn connect_to_browser(port: u16) -> Result<Browser> {
    let browser_url = format!("http://localhost:{}", port);
    info!("正在连接到浏览器: {}", browser_url);

    let (browser, handler) = Browser::connect(&browser_url).await.map_err(|e| {
        error!("连接浏览器失败: {}", e);
        e
    })?;
    debug!("浏览器连接成功");

    // 在后台处理浏览器事件
    tokio::spawn(super::drive_events(handler));

    // 添加短暂延迟以等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    let pages = browser.pages().await?;
    debug!("浏览器中已有 {} 个页面", pages.len());

    Ok(browser)
}
