//! 登录服务 - 业务能力层
//!
//! 产出 [`BrowserSession`]：一个已登录的浏览器，所有截图任务共享它的 Cookie。
//!
//! 登录顺序：
//! 1. 读取保存的 Cookie → 校验
//! 2. 有账号密码：自动填写登录表单，等待登录完成（有头模式下可手动输入验证码）
//! 3. 无账号密码且为有头模式：等待手动登录
//!
//! 全部失败时返回认证错误，整次运行中止。

use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Result};
use chromiumoxide::cdp::browser_protocol::network::{Cookie, CookieParam, TimeSinceEpoch};
use chromiumoxide::element::Element;
use chromiumoxide::Browser;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::browser;
use crate::config::Config;
use crate::error::AppError;
use crate::infrastructure::JsExecutor;
use crate::models::SiteProfile;
use crate::services::capability::Authenticator;
use crate::services::cookie_store::{CookieStore, StoredCookie};

/// 登录状态轮询间隔
const LOGIN_POLL_INTERVAL: Duration = Duration::from_secs(3);
/// 查找表单元素的最长等待
const FIELD_WAIT: Duration = Duration::from_secs(10);

/// 已认证的浏览器会话
pub struct BrowserSession {
    browser: Browser,
    /// 浏览器由本程序启动（结束时需要关闭）
    owned: bool,
    profile: SiteProfile,
    navigation_timeout: Duration,
}

impl BrowserSession {
    pub fn new(
        browser: Browser,
        owned: bool,
        profile: SiteProfile,
        navigation_timeout: Duration,
    ) -> Self {
        Self {
            browser,
            owned,
            profile,
            navigation_timeout,
        }
    }

    pub fn profile(&self) -> &SiteProfile {
        &self.profile
    }

    /// 打开一个新的空白页面，与会话共享 Cookie
    pub async fn open_page(&self) -> Result<JsExecutor> {
        let page = self.browser.new_page("about:blank").await?;
        Ok(JsExecutor::new(page))
    }

    /// 带超时的页面导航
    pub async fn navigate(&self, executor: &JsExecutor, url: &str) -> Result<()> {
        match timeout(self.navigation_timeout, executor.page().goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(anyhow!(e)),
            Err(_) => bail!("{} 秒内未加载完成", self.navigation_timeout.as_secs()),
        }
    }

    /// 关闭会话（连接到的外部浏览器不关闭）
    pub async fn close(mut self) {
        if !self.owned {
            debug!("外部浏览器保持打开");
            return;
        }
        if let Err(e) = self.browser.close().await {
            warn!("关闭浏览器失败: {}", e);
            return;
        }
        let _ = self.browser.wait().await;
        info!("🧹 浏览器已关闭");
    }
}

/// 基于 chromiumoxide 的登录实现
pub struct ChromeAuthenticator {
    config: Config,
    profile: SiteProfile,
    store: CookieStore,
}

impl ChromeAuthenticator {
    pub fn new(config: &Config, profile: SiteProfile) -> Self {
        Self {
            config: config.clone(),
            profile,
            store: CookieStore::new(&config.cookies_file),
        }
    }

    async fn open_browser(&self) -> Result<(Browser, bool)> {
        match self.config.browser_debug_port {
            Some(port) => Ok((browser::connect_to_browser(port).await?, false)),
            None => {
                let browser = browser::launch_browser(
                    self.config.headless,
                    self.config.chrome_executable.as_deref(),
                    (self.profile.viewport_width, self.profile.viewport_height),
                )
                .await?;
                Ok((browser, true))
            }
        }
    }

    async fn login(&self, session: &BrowserSession) -> Result<()> {
        let executor = session.open_page().await?;
        let result = self.login_on(session, &executor).await;
        executor.close().await;
        result
    }

    async fn login_on(&self, session: &BrowserSession, executor: &JsExecutor) -> Result<()> {
        info!("🔐 正在登录...");

        // ========== 1. 尝试保存的会话 ==========
        let saved = self.store.load().await;
        if !saved.is_empty() {
            let params: Vec<CookieParam> = saved.iter().filter_map(to_cookie_param).collect();
            executor.page().set_cookies(params).await?;
            if let Err(e) = session.navigate(executor, &self.config.course_url).await {
                warn!("⚠️ 打开课程页失败: {}", e);
            }
            if self.is_logged_in(executor).await {
                info!("✓ 使用已保存的会话");
                return Ok(());
            }
            warn!("⚠️ 保存的 Cookie 已失效");
        }

        // ========== 2. 打开登录页 ==========
        session.navigate(executor, &self.profile.login_url).await?;
        info!("✓ 登录页已打开: {}", self.profile.login_url);

        if self.config.has_credentials() {
            self.fill_login_form(executor).await?;
        } else if self.config.headless {
            bail!("没有可用的会话，也没有提供账号密码 (EDUCATIVE_EMAIL / EDUCATIVE_PASSWORD)");
        } else {
            log_manual_login(self.config.login_timeout_secs);
        }

        // ========== 3. 等待登录完成 ==========
        let login_timeout = Duration::from_secs(self.config.login_timeout_secs);
        if !self.wait_for_login(executor, login_timeout).await {
            bail!("{} 秒内未检测到登录成功", self.config.login_timeout_secs);
        }
        info!("✓ 登录成功");

        let cookies = executor.page().get_cookies().await?;
        let stored: Vec<StoredCookie> = cookies.iter().map(to_stored_cookie).collect();
        if let Err(e) = self.store.save(&stored).await {
            warn!("⚠️ 保存 Cookie 失败: {}", e);
        }
        Ok(())
    }

    async fn fill_login_form(&self, executor: &JsExecutor) -> Result<()> {
        info!("正在填写登录表单...");
        let email_field = find_first(executor, &self.profile.email_selectors)
            .await
            .ok_or_else(|| anyhow!("找不到邮箱输入框"))?;
        email_field.click().await?;
        email_field.type_str(&self.config.email).await?;
        info!("✓ 邮箱已填写: {}", self.config.email);

        let password_field = find_first(executor, &self.profile.password_selectors)
            .await
            .ok_or_else(|| anyhow!("找不到密码输入框"))?;
        password_field.click().await?;
        password_field.type_str(&self.config.password).await?;
        info!("✓ 密码已填写");

        match find_first(executor, &self.profile.submit_selectors).await {
            Some(button) => {
                button.click().await?;
            }
            None => {
                debug!("找不到登录按钮，改为回车提交");
                password_field.press_key("Enter").await?;
            }
        }
        info!("✓ 登录表单已提交，如需验证码请在浏览器中完成");
        Ok(())
    }

    async fn wait_for_login(&self, executor: &JsExecutor, limit: Duration) -> bool {
        let started = Instant::now();
        while started.elapsed() < limit {
            if self.is_logged_in(executor).await {
                return true;
            }
            sleep(LOGIN_POLL_INTERVAL).await;
            let remaining = limit.saturating_sub(started.elapsed()).as_secs();
            if remaining > 0 && remaining % 15 < LOGIN_POLL_INTERVAL.as_secs() {
                info!("⏱️ 等待登录完成... 剩余 {} 秒", remaining);
            }
        }
        self.is_logged_in(executor).await
    }

    async fn is_logged_in(&self, executor: &JsExecutor) -> bool {
        match executor.page().get_cookies().await {
            Ok(cookies) => has_cookie(&cookies, &self.profile.logged_in_cookie),
            Err(e) => {
                debug!("读取 Cookie 失败: {}", e);
                false
            }
        }
    }
}

impl Authenticator for ChromeAuthenticator {
    type Context = BrowserSession;

    async fn authenticate(&self) -> Result<BrowserSession, AppError> {
        let (browser, owned) = self
            .open_browser()
            .await
            .map_err(|e| AppError::Browser(e.to_string()))?;
        let session = BrowserSession::new(
            browser,
            owned,
            self.profile.clone(),
            Duration::from_secs(self.config.navigation_timeout_secs),
        );

        match self.login(&session).await {
            Ok(()) => Ok(session),
            Err(e) => {
                session.close().await;
                Err(AppError::Authentication(e.to_string()))
            }
        }
    }

    async fn teardown(&self, ctx: BrowserSession) {
        ctx.close().await;
    }
}

/// 依次尝试选择器，直到找到元素或超时
async fn find_first(executor: &JsExecutor, selectors: &[String]) -> Option<Element> {
    let started = Instant::now();
    loop {
        for selector in selectors {
            if let Ok(element) = executor.page().find_element(selector.as_str()).await {
                debug!("找到元素: {}", selector);
                return Some(element);
            }
        }
        if started.elapsed() >= FIELD_WAIT {
            return None;
        }
        sleep(Duration::from_millis(500)).await;
    }
}

fn has_cookie(cookies: &[Cookie], name: &str) -> bool {
    cookies.iter().any(|c| c.name == name)
}

fn to_stored_cookie(cookie: &Cookie) -> StoredCookie {
    StoredCookie {
        name: cookie.name.clone(),
        value: cookie.value.clone(),
        domain: cookie.domain.clone(),
        path: cookie.path.clone(),
        secure: cookie.secure,
        http_only: cookie.http_only,
        expires: (!cookie.session).then_some(cookie.expires),
    }
}

fn to_cookie_param(cookie: &StoredCookie) -> Option<CookieParam> {
    let mut builder = CookieParam::builder()
        .name(cookie.name.clone())
        .value(cookie.value.clone())
        .domain(cookie.domain.clone())
        .path(cookie.path.clone())
        .secure(cookie.secure)
        .http_only(cookie.http_only);
    if let Some(expires) = cookie.expires {
        builder = builder.expires(TimeSinceEpoch::new(expires));
    }
    match builder.build() {
        Ok(param) => Some(param),
        Err(e) => {
            debug!("跳过 Cookie {}: {}", cookie.name, e);
            None
        }
    }
}

fn log_manual_login(timeout_secs: u64) {
    info!("{}", "=".repeat(60));
    info!("⏳ 请在浏览器中手动完成登录");
    info!("   1. 选择邮箱登录");
    info!("   2. 输入邮箱和密码");
    info!("   3. 如有验证码请一并完成");
    info!("   剩余时间: {} 秒", timeout_secs);
    info!("{}", "=".repeat(60));
}
