//! JS 执行器 - 基础设施层
//!
//! 持有一个 page，只暴露"执行 JS / 滚动 / 点击"这些页面能力，
//! 不认识 Lesson / Course。

use std::time::Duration;

use anyhow::Result;
use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tracing::debug;

/// JS 执行器
///
/// 每个截图任务各自持有一个，任务结束时调用 [`JsExecutor::close`]。
pub struct JsExecutor {
    page: Page,
}

impl JsExecutor {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 获取 page 的引用（导航、截图等直接操作）
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 执行 JS 代码并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> Result<JsonValue> {
        let result = self.page.evaluate(js_code.into()).await?;
        let json_value = result.into_value()?;
        Ok(json_value)
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> Result<T> {
        let json_value = self.eval(js_code).await?;
        let typed_value = serde_json::from_value(json_value)?;
        Ok(typed_value)
    }

    /// 页面总高度
    pub async fn scroll_height(&self) -> Result<u64> {
        self.eval_as("document.body ? document.body.scrollHeight : 0")
            .await
    }

    /// 视口高度
    pub async fn viewport_height(&self) -> Result<u64> {
        self.eval_as("window.innerHeight").await
    }

    pub async fn scroll_to(&self, y: u64) -> Result<()> {
        self.eval(format!("window.scrollTo(0, {}); true", y)).await?;
        Ok(())
    }

    /// 等待页面上的所有图片加载完成（每张最多等 `per_image`）
    pub async fn wait_for_images(&self, per_image: Duration) -> Result<()> {
        let js_code = format!(
            r#"
            (async () => {{
                const images = Array.from(document.images);
                await Promise.all(images.map(img => {{
                    if (img.complete) return Promise.resolve();
                    return new Promise(resolve => {{
                        img.onload = resolve;
                        img.onerror = resolve;
                        setTimeout(resolve, {});
                    }});
                }}));
                return images.length;
            }})()
            "#,
            per_image.as_millis()
        );
        let count: u64 = self.eval_as(js_code).await?;
        debug!("页面图片数量: {}", count);
        Ok(())
    }

    /// 按顺序尝试选择器，点击第一个存在的元素，返回是否点击成功
    pub async fn click_first(&self, selectors: &[String]) -> Result<bool> {
        let selectors_json = serde_json::to_string(selectors)?;
        let js_code = format!(
            r#"
            (() => {{
                for (const selector of {}) {{
                    let el = null;
                    try {{ el = document.querySelector(selector); }} catch (e) {{ continue; }}
                    if (el) {{ el.click(); return true; }}
                }}
                return false;
            }})()
            "#,
            selectors_json
        );
        self.eval_as(js_code).await
    }

    /// 点击文字完全匹配的按钮或链接
    pub async fn click_by_text(&self, text: &str) -> Result<bool> {
        let text_json = serde_json::to_string(text)?;
        let js_code = format!(
            r#"
            (() => {{
                const wanted = {};
                const candidates = document.querySelectorAll('button, a, [role="button"], [role="tab"], span, div');
                for (const el of candidates) {{
                    if ((el.innerText || '').trim() === wanted) {{ el.click(); return true; }}
                }}
                return false;
            }})()
            "#,
            text_json
        );
        self.eval_as(js_code).await
    }

    /// 关闭页面（失败只记日志）
    pub async fn close(self) {
        if let Err(e) = self.page.close().await {
            debug!("关闭页面失败: {}", e);
        }
    }
}
