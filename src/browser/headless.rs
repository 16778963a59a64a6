use std::path::Path;

use anyhow::Result;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::{Browser, BrowserConfig};
use tokio::time::sleep;
use tracing::{debug, error, info};

/// 启动浏览器
///
/// # 参数
/// - `headless`: 是否无头模式（有头模式方便手动登录 / 输入验证码）
/// - `executable`: 指定浏览器可执行文件，为空时由 chromiumoxide 自动查找
/// - `viewport`: 窗口大小 (宽, 高)
pub async fn launch_browser(
    headless: bool,
    executable: Option<&Path>,
    viewport: (u32, u32),
) -> Result<Browser> {
    info!("🚀 启动浏览器 (无头模式: {})...", headless);

    let (width, height) = viewport;
    let mut builder = BrowserConfig::builder()
        .window_size(width, height)
        .viewport(Viewport {
            width,
            height,
            ..Default::default()
        })
        .args(vec![
            "--disable-gpu",
            "--no-sandbox",
            "--disable-dev-shm-usage",
            "--disable-blink-features=AutomationControlled",
        ]);
    builder = if headless {
        builder.new_headless_mode()
    } else {
        builder.with_head()
    };
    if let Some(path) = executable {
        debug!("浏览器路径: {}", path.display());
        builder = builder.chrome_executable(path);
    }

    let config = builder.build().map_err(|e| {
        error!("配置浏览器失败: {}", e);
        anyhow::anyhow!("配置浏览器失败: {}", e)
    })?;

    let (browser, handler) = Browser::launch(config).await.map_err(|e| {
        error!("启动浏览器失败: {}", e);
        anyhow::anyhow!("启动浏览器失败: {}", e)
    })?;
    debug!("浏览器启动成功");

    // 在后台处理浏览器事件
    tokio::spawn(super::drive_events(handler));

    // 等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    info!("✅ 浏览器已就绪");
    Ok(browser)
}
