//! 会话 Cookie 存储 - 业务能力层
//!
//! 只负责把登录后的 Cookie 存到 JSON 文件 / 从文件读回

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, info, warn};

/// 保存到磁盘的 Cookie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub http_only: bool,
    /// 过期时间（秒级时间戳），会话 Cookie 为空
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<f64>,
}

fn default_path() -> String {
    "/".to_string()
}

/// Cookie 文件存储
pub struct CookieStore {
    path: PathBuf,
}

impl CookieStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读取已保存的 Cookie，文件不存在或损坏时返回空列表
    pub async fn load(&self) -> Vec<StoredCookie> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(_) => {
                debug!("没有已保存的 Cookie: {}", self.path.display());
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<StoredCookie>>(&content) {
            Ok(cookies) => {
                info!("🍪 已读取 {} 个保存的 Cookie", cookies.len());
                cookies
            }
            Err(e) => {
                warn!("⚠️ Cookie 文件无法解析，忽略: {}", e);
                Vec::new()
            }
        }
    }

    /// 保存 Cookie（覆盖旧文件）
    pub async fn save(&self, cookies: &[StoredCookie]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("无法创建目录: {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(cookies)?;
        fs::write(&self.path, json)
            .await
            .with_context(|| format!("无法写入 Cookie 文件: {}", self.path.display()))?;
        info!("✓ 会话 Cookie 已保存到 {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cookie(name: &str) -> StoredCookie {
        StoredCookie {
            name: name.to_string(),
            value: "v".to_string(),
            domain: ".educative.io".to_string(),
            path: "/".to_string(),
            secure: true,
            http_only: false,
            expires: Some(1_900_000_000.0),
        }
    }

    #[tokio::test]
    async fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = CookieStore::new(dir.path().join("sub").join("cookies.json"));
        store.save(&[cookie("logged_in"), cookie("flask")]).await.unwrap();

        let loaded = store.load().await;
        assert_eq!(loaded, vec![cookie("logged_in"), cookie("flask")]);
    }

    #[tokio::test]
    async fn missing_or_broken_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = CookieStore::new(dir.path().join("cookies.json"));
        assert!(store.load().await.is_empty());

        std::fs::write(store.path(), "{not json").unwrap();
        assert!(store.load().await.is_empty());
    }

    #[test]
    fn minimal_entries_get_defaults() {
        let cookies: Vec<StoredCookie> =
            serde_json::from_str(r#"[{"name":"a","value":"b","domain":"x.io"}]"#).unwrap();
        assert_eq!(cookies[0].path, "/");
        assert!(!cookies[0].secure);
        assert!(cookies[0].expires.is_none());
    }
}
