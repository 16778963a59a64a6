//! 日志工具模块
//!
//! 日志初始化，以及启动 / 统计信息的输出

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::models::{CaptureOutcome, Course};
use crate::orchestrator::RunReport;

/// 初始化日志
///
/// 优先使用 `RUST_LOG`，否则按 `verbose` 选择 debug / info。
/// 重复调用不会报错（测试里会多次调用）。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},chromiumoxide=warn", default_level)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 课程下载器启动");
    info!("📚 课程: {}", config.course_url);
    info!("📁 输出目录: {}", config.output_dir.display());
    info!("📊 最大并发数: {}", config.max_concurrent_lessons);
    if config.has_credentials() {
        info!("📧 账号: {}", config.email);
    }
    info!("{}", "=".repeat(60));
}

/// 记录课时加载信息
pub fn log_course_loaded(course: &Course, max_concurrent: usize) {
    info!("✓ 课程 {} 共 {} 个课时", course.name, course.len());
    info!("📋 最多同时处理 {} 个课时\n", max_concurrent);
}

/// 打印最终统计信息
pub fn print_final_stats(report: &RunReport) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", report.succeeded(), report.results.len());
    info!("❌ 失败: {}", report.failed());
    for result in &report.results {
        if let CaptureOutcome::Failure { kind, detail } = &result.outcome {
            info!("   • {} [{}] {}", result.lesson, kind, truncate_text(detail, 120));
        }
    }
    match &report.combined {
        Ok(path) => info!("📘 整本 PDF: {}", path.display()),
        Err(reason) => info!("⚠️ 整本 PDF 未生成: {}", reason),
    }
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
