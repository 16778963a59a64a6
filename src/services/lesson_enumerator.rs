//! 课时枚举服务 - 业务能力层
//!
//! 打开课程页，展开目录，收集课时链接

use std::collections::HashSet;
use std::time::Duration;

use serde::Deserialize;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::AppError;
use crate::infrastructure::JsExecutor;
use crate::models::Course;
use crate::services::capability::LessonSource;
use crate::services::session_authenticator::BrowserSession;
use crate::utils::naming::title_from_url;

/// 页面上取到的原始链接
#[derive(Debug, Clone, Deserialize)]
pub struct RawLink {
    pub href: String,
    #[serde(default)]
    pub text: String,
}

/// 基于 chromiumoxide 的课时枚举
#[derive(Debug, Default)]
pub struct ChromeLessonEnumerator;

impl ChromeLessonEnumerator {
    pub fn new() -> Self {
        Self
    }

    async fn collect_links(
        &self,
        session: &BrowserSession,
        course_url: &str,
    ) -> anyhow::Result<Vec<RawLink>> {
        let executor = session.open_page().await?;
        let result = self.links_on(session, &executor, course_url).await;
        executor.close().await;
        result
    }

    async fn links_on(
        &self,
        session: &BrowserSession,
        executor: &JsExecutor,
        course_url: &str,
    ) -> anyhow::Result<Vec<RawLink>> {
        session.navigate(executor, course_url).await?;
        sleep(Duration::from_millis(session.profile().settle_ms)).await;

        // 展开目录（按钮不存在时忽略）
        for text in &session.profile().expand_button_texts {
            match executor.click_by_text(text).await {
                Ok(true) => {
                    info!("   ✓ 已点击 \"{}\"", text);
                    sleep(Duration::from_millis(2000)).await;
                }
                Ok(false) => debug!("   未找到按钮 \"{}\"", text),
                Err(e) => warn!("   ⚠️ 点击 \"{}\" 失败: {}", text, e),
            }
        }

        let selector = serde_json::to_string(&session.profile().lesson_link_selector)?;
        let js_code = format!(
            r#"
            (() => Array.from(document.querySelectorAll({})).map(a => ({{
                href: a.href,
                text: (a.innerText || '').trim()
            }})))()
            "#,
            selector
        );
        executor.eval_as::<Vec<RawLink>>(js_code).await
    }
}

impl LessonSource<BrowserSession> for ChromeLessonEnumerator {
    async fn enumerate(&self, ctx: &BrowserSession, course_url: &str) -> Result<Course, AppError> {
        info!("📚 正在获取课时列表: {}", course_url);

        let links = self
            .collect_links(ctx, course_url)
            .await
            .map_err(|e| AppError::Enumeration {
                url: course_url.to_string(),
                reason: e.to_string(),
            })?;
        debug!("页面上共有 {} 个候选链接", links.len());

        let course = Course::new(course_url, select_lesson_links(course_url, links));
        log_lessons_found(&course);
        Ok(course)
    }
}

/// 过滤并去重课时链接，返回 (标题, URL)
///
/// 只保留与课程同一主机、且路径在课程路径之下的链接，去掉课程首页本身，
/// 锚点部分去掉后再去重，重复链接保留第一次出现的位置。
pub fn select_lesson_links(course_url: &str, links: Vec<RawLink>) -> Vec<(String, String)> {
    let Some((course_host, course_path)) = Url::parse(course_url)
        .ok()
        .and_then(|url| Some((url.host_str()?.to_string(), path_of(&url))))
    else {
        warn!("⚠️ 课程 URL 无法解析: {}", course_url);
        return Vec::new();
    };
    if course_path.is_empty() {
        return Vec::new();
    }
    let mut seen = HashSet::new();

    links
        .into_iter()
        .filter_map(|link| {
            let mut url = Url::parse(link.href.trim()).ok()?;
            url.set_fragment(None);
            let path = path_of(&url);
            let is_lesson = url.host_str() == Some(course_host.as_str())
                && path.len() > course_path.len()
                && path.starts_with(&course_path);
            let href = url.to_string();
            if !is_lesson || !seen.insert(href.clone()) {
                return None;
            }
            let title = link
                .text
                .lines()
                .map(str::trim)
                .find(|line| !line.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| title_from_url(&href));
            Some((title, href))
        })
        .collect()
}

/// 路径中的非空段
fn path_of(url: &Url) -> Vec<String> {
    url.path_segments()
        .map(|segments| {
            segments
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn log_lessons_found(course: &Course) {
    info!("✓ 找到 {} 个课时", course.len());
    for lesson in course.lessons.iter().take(3) {
        info!("   • {}", lesson);
    }
    if course.len() > 3 {
        info!("   ... 以及另外 {} 个", course.len() - 3);
    }
}
