use std::path::PathBuf;

use thiserror::Error;

/// 应用程序错误类型（整次运行级别）
///
/// 只有认证、枚举、配置类错误会中止整次运行；
/// 单个课时的错误由 [`CaptureError`] 表示，记录后继续。
#[derive(Debug, Error)]
pub enum AppError {
    /// 认证失败（致命，任何截图开始前中止）
    #[error("认证失败: {0}")]
    Authentication(String),

    /// 课时列表获取失败
    #[error("课时列表获取失败 ({url}): {reason}")]
    Enumeration { url: String, reason: String },

    /// 浏览器启动或连接失败
    #[error("浏览器错误: {0}")]
    Browser(String),

    /// 合并课程 PDF 失败（只影响合并这一步）
    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    /// 配置错误
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// 文件操作失败
    #[error("文件操作失败 ({path}): {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// 单个课时截图过程中的错误
#[derive(Debug, Error)]
pub enum CaptureError {
    /// 页面无法访问或导航超时
    #[error("导航到 {url} 失败: {reason}")]
    Navigation { url: String, reason: String },

    /// 截图为空或图片损坏
    #[error("截图失败: {0}")]
    Render(String),

    /// 生成课时 PDF 失败
    #[error(transparent)]
    Assembly(#[from] AssemblyError),
}

impl CaptureError {
    pub fn navigation(url: impl Into<String>, reason: impl ToString) -> Self {
        CaptureError::Navigation {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    pub fn render(reason: impl ToString) -> Self {
        CaptureError::Render(reason.to_string())
    }
}

/// PDF 组装错误
#[derive(Debug, Error)]
pub enum AssemblyError {
    /// 输入图片无法解码
    #[error("第 {index} 张图片无法读取: {reason}")]
    UnreadableImage { index: usize, reason: String },

    /// 输入 PDF 无法读取
    #[error("PDF 无法读取 ({path}): {reason}")]
    UnreadablePdf { path: PathBuf, reason: String },

    /// 没有任何输入
    #[error("没有可组装的输入")]
    EmptyInput,

    /// PDF 编码失败
    #[error("PDF 编码失败: {0}")]
    Encode(String),

    /// 写入文件失败
    #[error("写入 {path} 失败: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },

    /// 站点配置文件读取失败
    #[error("站点配置 {path} 读取失败: {reason}")]
    ProfileLoadFailed { path: PathBuf, reason: String },

    /// 课程 URL 非法
    #[error("课程 URL 非法: {0}")]
    InvalidCourseUrl(String),
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
