use std::path::PathBuf;
use std::str::FromStr;

use url::Url;

use crate::error::ConfigError;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 课程根 URL
    pub course_url: String,
    // --- 账号 ---
    pub email: String,
    pub password: String,
    /// 同时截图的课时数量上限
    pub max_concurrent_lessons: usize,
    /// 输出根目录
    pub output_dir: PathBuf,
    /// 会话 Cookie 保存位置
    pub cookies_file: PathBuf,
    /// 是否使用无头模式
    pub headless: bool,
    /// 指定浏览器可执行文件（为空时自动查找）
    pub chrome_executable: Option<PathBuf>,
    /// 设置后连接到已打开的浏览器，而不是启动新的
    pub browser_debug_port: Option<u16>,
    /// 单次页面导航超时（秒）
    pub navigation_timeout_secs: u64,
    /// 等待登录完成的超时（秒）
    pub login_timeout_secs: u64,
    /// 站点配置文件（TOML）
    pub site_profile: Option<PathBuf>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            course_url: "https://www.educative.io/courses/agentic-ai-systems".to_string(),
            email: String::new(),
            password: String::new(),
            max_concurrent_lessons: 5,
            output_dir: PathBuf::from("output"),
            cookies_file: PathBuf::from("output/cookies.json"),
            headless: true,
            chrome_executable: None,
            browser_debug_port: None,
            navigation_timeout_secs: 100,
            login_timeout_secs: 120,
            site_profile: None,
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 从环境变量（以及当前目录下的 `.env`）读取配置
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源读取配置，未设置的键使用默认值
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();
        let output_dir = lookup("OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or(default.output_dir);
        // cookie 文件默认跟随输出目录
        let cookies_file = lookup("COOKIES_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| output_dir.join("cookies.json"));

        Ok(Self {
            course_url: lookup("COURSE_URL").unwrap_or(default.course_url),
            email: lookup("EDUCATIVE_EMAIL").unwrap_or(default.email),
            password: lookup("EDUCATIVE_PASSWORD").unwrap_or(default.password),
            max_concurrent_lessons: parse_var(&lookup, "MAX_CONCURRENT_LESSONS")?
                .unwrap_or(default.max_concurrent_lessons)
                .max(1),
            output_dir,
            cookies_file,
            headless: parse_var(&lookup, "HEADLESS")?.unwrap_or(default.headless),
            chrome_executable: lookup("CHROME_EXECUTABLE").map(PathBuf::from),
            browser_debug_port: parse_var(&lookup, "BROWSER_DEBUG_PORT")?,
            navigation_timeout_secs: parse_var(&lookup, "NAVIGATION_TIMEOUT_SECS")?
                .unwrap_or(default.navigation_timeout_secs),
            login_timeout_secs: parse_var(&lookup, "LOGIN_TIMEOUT_SECS")?
                .unwrap_or(default.login_timeout_secs),
            site_profile: lookup("SITE_PROFILE").map(PathBuf::from),
            verbose_logging: parse_var(&lookup, "VERBOSE_LOGGING")?
                .unwrap_or(default.verbose_logging),
        })
    }

    /// 是否提供了账号密码
    pub fn has_credentials(&self) -> bool {
        !self.email.is_empty() && !self.password.is_empty()
    }

    /// 校验课程 URL：必须是带主机名的 http(s) 地址
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidCourseUrl(self.course_url.clone());
        let url = Url::parse(self.course_url.trim()).map_err(|_| invalid())?;
        let has_host = url.host_str().is_some_and(|host| !host.is_empty());
        if matches!(url.scheme(), "http" | "https") && has_host {
            Ok(())
        } else {
            Err(invalid())
        }
    }
}

fn parse_var<F, T>(lookup: &F, var_name: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var_name) {
        None => Ok(None),
        Some(value) if value.trim().is_empty() => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: std::any::type_name::<T>().to_string(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.max_concurrent_lessons, 5);
        assert_eq!(config.output_dir, PathBuf::from("output"));
        assert_eq!(config.cookies_file, PathBuf::from("output/cookies.json"));
        assert!(config.headless);
        assert!(config.browser_debug_port.is_none());
        assert!(!config.has_credentials());
    }

    #[test]
    fn reads_values_and_follows_output_dir() {
        let config = Config::from_lookup(lookup_from(&[
            ("COURSE_URL", "https://example.com/courses/rust-basics"),
            ("EDUCATIVE_EMAIL", "a@b.c"),
            ("EDUCATIVE_PASSWORD", "secret"),
            ("MAX_CONCURRENT_LESSONS", "3"),
            ("OUTPUT_DIR", "/tmp/out"),
            ("HEADLESS", "false"),
            ("BROWSER_DEBUG_PORT", "9222"),
        ]))
        .unwrap();

        assert_eq!(config.course_url, "https://example.com/courses/rust-basics");
        assert!(config.has_credentials());
        assert_eq!(config.max_concurrent_lessons, 3);
        assert_eq!(config.cookies_file, PathBuf::from("/tmp/out/cookies.json"));
        assert!(!config.headless);
        assert_eq!(config.browser_debug_port, Some(9222));
    }

    #[test]
    fn zero_concurrency_is_clamped_to_one() {
        let config = Config::from_lookup(lookup_from(&[("MAX_CONCURRENT_LESSONS", "0")])).unwrap();
        assert_eq!(config.max_concurrent_lessons, 1);
    }

    #[test]
    fn bad_number_is_reported() {
        let err = Config::from_lookup(lookup_from(&[("MAX_CONCURRENT_LESSONS", "five")]))
            .unwrap_err();
        match err {
            ConfigError::EnvVarParseFailed { var_name, value, .. } => {
                assert_eq!(var_name, "MAX_CONCURRENT_LESSONS");
                assert_eq!(value, "five");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn course_url_must_be_http() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.course_url = "courses/rust-basics".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidCourseUrl(_))
        ));

        config.course_url = "https://".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_course_urls_are_rejected() {
        let mut config = Config::default();
        for bad in [
            "https://exa mple.com/courses/x",
            "https://?q=1",
            "http://#frag",
            "ftp://example.com/courses/x",
            "file:///courses/x",
        ] {
            config.course_url = bad.to_string();
            assert!(
                matches!(config.validate(), Err(ConfigError::InvalidCourseUrl(_))),
                "{bad} should be rejected"
            );
        }

        config.course_url = "http://localhost:8080/courses/x".to_string();
        assert!(config.validate().is_ok());
    }
}
