//! 页面截图服务 - 业务能力层
//!
//! 打开课时页面 → 触发懒加载 → 整页截图。
//! 不写文件，不修改共享状态。

use std::io::Cursor;
use std::time::Duration;

use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::ScreenshotParams;
use image::ImageReader;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::error::CaptureError;
use crate::infrastructure::JsExecutor;
use crate::models::{Lesson, SiteProfile};
use crate::services::capability::PageCapturer;
use crate::services::session_authenticator::BrowserSession;

/// 单页最多滚动次数，防止无限增长的页面
const MAX_SCROLL_STEPS: u64 = 400;

/// 基于 chromiumoxide 的整页截图
#[derive(Debug)]
pub struct ChromePageCapturer {
    screenshot_timeout: Duration,
}

impl ChromePageCapturer {
    pub fn new() -> Self {
        Self {
            screenshot_timeout: Duration::from_secs(60),
        }
    }

    async fn capture_on(
        &self,
        session: &BrowserSession,
        executor: &JsExecutor,
        lesson: &Lesson,
    ) -> Result<Vec<u8>, CaptureError> {
        let tag = format!("[#{:03}]", lesson.index);
        let profile = session.profile();

        debug!("{} 🔄 正在打开页面...", tag);
        session
            .navigate(executor, &lesson.url)
            .await
            .map_err(|e| CaptureError::navigation(&lesson.url, e))?;

        debug!("{} ⏳ 等待懒加载内容...", tag);
        trigger_lazy_content(executor, profile, &tag).await;

        match executor.click_first(&profile.hide_selectors).await {
            Ok(true) => {
                debug!("{} ✓ 已隐藏浮层", tag);
                sleep(Duration::from_millis(500)).await;
            }
            Ok(false) => {}
            Err(e) => debug!("{} 隐藏浮层失败: {}", tag, e),
        }

        debug!("{} 📸 正在截图...", tag);
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(true)
            .build();
        let bytes = match timeout(self.screenshot_timeout, executor.page().screenshot(params)).await
        {
            Ok(Ok(bytes)) => bytes,
            Ok(Err(e)) => return Err(CaptureError::render(e)),
            Err(_) => {
                return Err(CaptureError::render(format!(
                    "{} 秒内未完成截图",
                    self.screenshot_timeout.as_secs()
                )))
            }
        };
        info!("{} ✓ 截图完成 ({} KB)", tag, bytes.len() / 1024);
        Ok(bytes)
    }
}

impl Default for ChromePageCapturer {
    fn default() -> Self {
        Self::new()
    }
}

impl PageCapturer<BrowserSession> for ChromePageCapturer {
    async fn capture(&self, ctx: &BrowserSession, lesson: &Lesson) -> Result<Vec<u8>, CaptureError> {
        let executor = ctx
            .open_page()
            .await
            .map_err(|e| CaptureError::navigation(&lesson.url, e))?;
        let result = self.capture_on(ctx, &executor, lesson).await;
        executor.close().await;
        result
    }
}

/// 等图片加载、逐段滚动到底再回到顶部，让懒加载内容全部出现
///
/// 这里的失败不影响截图，只记日志。
async fn trigger_lazy_content(executor: &JsExecutor, profile: &SiteProfile, tag: &str) {
    let image_wait = Duration::from_millis(profile.image_wait_ms);
    if let Err(e) = executor.wait_for_images(image_wait).await {
        warn!("{} ⚠️ 图片加载等待失败（继续）: {}", tag, e);
    }

    let (total, viewport) = match (executor.scroll_height().await, executor.viewport_height().await)
    {
        (Ok(total), Ok(viewport)) => (total, viewport),
        (Err(e), _) | (_, Err(e)) => {
            warn!("{} ⚠️ 无法读取页面高度（跳过滚动）: {}", tag, e);
            return;
        }
    };

    let step = scroll_step(viewport, profile.scroll_step_divisor);
    let pause = Duration::from_millis(profile.scroll_pause_ms);
    for position in scroll_positions(total, step) {
        if let Err(e) = executor.scroll_to(position).await {
            warn!("{} ⚠️ 滚动失败: {}", tag, e);
            break;
        }
        sleep(pause).await;
    }

    let _ = executor.scroll_to(0).await;
    sleep(Duration::from_millis(profile.settle_ms)).await;
    if let Err(e) = executor.wait_for_images(image_wait).await {
        debug!("{} 二次等待图片失败: {}", tag, e);
    }
}

fn scroll_step(viewport: u64, divisor: u32) -> u64 {
    (viewport / u64::from(divisor.max(1))).max(1)
}

fn scroll_positions(total: u64, step: u64) -> impl Iterator<Item = u64> {
    (0..total).step_by(step.max(1) as usize).take(MAX_SCROLL_STEPS as usize)
}

/// 检查截图是否为可解码的非空图片，返回 (宽, 高)
pub fn validate_raster(bytes: &[u8]) -> Result<(u32, u32), CaptureError> {
    if bytes.is_empty() {
        return Err(CaptureError::render("截图为空"));
    }
    let (width, height) = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(CaptureError::render)?
        .into_dimensions()
        .map_err(|e| CaptureError::render(format!("图片损坏: {}", e)))?;
    if width == 0 || height == 0 {
        return Err(CaptureError::render(format!(
            "图片尺寸为 {}x{}",
            width, height
        )));
    }
    Ok((width, height))
}
