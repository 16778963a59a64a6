use serde::{Deserialize, Serialize};

/// 目标站点的配置
///
/// 登录表单选择器、课程目录选择器和懒加载等待参数都放在这里，
/// 换站点时只需提供一个新的 TOML 文件。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteProfile {
    /// 登录页地址
    pub login_url: String,
    /// 登录成功后才会出现的 Cookie 名
    pub logged_in_cookie: String,
    /// 邮箱输入框（按顺序尝试）
    pub email_selectors: Vec<String>,
    /// 密码输入框
    pub password_selectors: Vec<String>,
    /// 登录按钮
    pub submit_selectors: Vec<String>,
    /// 课程页上需要先点开的按钮文字（如 "Content"、"Expand All"）
    pub expand_button_texts: Vec<String>,
    /// 课时链接选择器
    pub lesson_link_selector: String,
    /// 截图前要隐藏的浮层
    pub hide_selectors: Vec<String>,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// 每次滚动视口高度的 1/N
    pub scroll_step_divisor: u32,
    /// 每次滚动后的等待（毫秒）
    pub scroll_pause_ms: u64,
    /// 滚动结束后的额外等待（毫秒）
    pub settle_ms: u64,
    /// 单张图片最长等待（毫秒）
    pub image_wait_ms: u64,
}

impl Default for SiteProfile {
    fn default() -> Self {
        Self {
            login_url: "https://www.educative.io/login".to_string(),
            logged_in_cookie: "logged_in".to_string(),
            email_selectors: strings(&[
                "input[name='email']",
                "#email",
                "input[type='email']",
                "input[placeholder='Email']",
            ]),
            password_selectors: strings(&[
                "input[name='password']",
                "#password",
                "input[type='password']",
                "input[placeholder='Password']",
            ]),
            submit_selectors: strings(&[
                "button[type='submit']",
                "input[type='submit']",
                "button[class*='login']",
                "button[class*='submit']",
            ]),
            expand_button_texts: strings(&["Content", "Expand All"]),
            lesson_link_selector: "a.Lesson_lesson__uSC7b".to_string(),
            hide_selectors: strings(&[
                "[aria-label*='minimap' i]",
                "[title*='minimap' i]",
                "button[class*='minimap' i]",
                ".minimap-toggle",
                "[data-testid*='minimap' i]",
            ]),
            viewport_width: 1440,
            viewport_height: 900,
            scroll_step_divisor: 3,
            scroll_pause_ms: 1000,
            settle_ms: 3000,
            image_wait_ms: 10_000,
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
