use std::path::Path;

use tokio::fs;

use crate::error::ConfigError;
use crate::models::SiteProfile;

/// 从 TOML 文件加载站点配置，未写出的字段使用默认值
pub async fn load_site_profile(path: &Path) -> Result<SiteProfile, ConfigError> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::ProfileLoadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    let profile = parse_site_profile(&content).map_err(|e| ConfigError::ProfileLoadFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    tracing::info!("已加载站点配置: {}", path.display());
    Ok(profile)
}

/// 解析 TOML 文本
pub fn parse_site_profile(content: &str) -> Result<SiteProfile, toml::de::Error> {
    toml::from_str(content)
}
