//! 课程处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整次运行的入口：登录 → 获取课时 → 并发截图 → 合并 → 汇总。
//!
//! - 登录失败、课时获取失败是仅有的中止条件，此时不写任何输出
//! - 已认证上下文由本模块持有，截图全部结束后释放
//! - 合并失败只影响整本 PDF，不影响课时 PDF

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{load_site_profile, CaptureResult, Course, SiteProfile};
use crate::orchestrator::coordinator::{merge_course, CaptureCoordinator};
use crate::services::{
    Authenticator, ChromeAuthenticator, ChromeLessonEnumerator, ChromePageCapturer, LessonSource,
    PageCapturer, SummaryWriter,
};
use crate::utils::logging;

/// 一次运行需要的参数
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub course_url: String,
    pub output_dir: PathBuf,
    pub max_concurrent: usize,
}

impl From<&Config> for RunOptions {
    fn from(config: &Config) -> Self {
        Self {
            course_url: config.course_url.clone(),
            output_dir: config.output_dir.clone(),
            max_concurrent: config.max_concurrent_lessons,
        }
    }
}

/// 运行结果状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// 所有课时成功且整本 PDF 已生成
    Complete,
    /// 部分课时失败或合并失败
    Partial,
}

/// 一次运行的完整结果
#[derive(Debug)]
pub struct RunReport {
    pub course: Course,
    /// 按课时序号排列，数量与课时数相同
    pub results: Vec<CaptureResult>,
    /// 整本 PDF 路径，或合并失败原因
    pub combined: Result<PathBuf, String>,
}

impl RunReport {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }

    pub fn status(&self) -> RunStatus {
        if self.failed() == 0 && self.combined.is_ok() {
            RunStatus::Complete
        } else {
            RunStatus::Partial
        }
    }

    /// 退出码：0 全部成功，2 部分失败
    pub fn exit_code(&self) -> ExitCode {
        match self.status() {
            RunStatus::Complete => ExitCode::SUCCESS,
            RunStatus::Partial => ExitCode::from(2),
        }
    }
}

/// 下载整门课程
///
/// # 参数
/// - `authenticator`: 登录能力，产出共享上下文
/// - `source`: 课时枚举能力
/// - `capturer`: 截图能力，所有任务共享
/// - `options`: 课程 URL、输出目录、并发上限
pub async fn download_course<A, L, P>(
    authenticator: &A,
    source: &L,
    capturer: Arc<P>,
    options: &RunOptions,
) -> AppResult<RunReport>
where
    A: Authenticator,
    L: LessonSource<A::Context>,
    P: PageCapturer<A::Context>,
{
    // ========== 1. 登录（失败即中止） ==========
    let ctx = authenticator.authenticate().await?;

    // ========== 2. 获取课时 ==========
    let course = match source.enumerate(&ctx, &options.course_url).await {
        Ok(course) if !course.is_empty() => course,
        Ok(_) => {
            authenticator.teardown(ctx).await;
            return Err(AppError::Enumeration {
                url: options.course_url.clone(),
                reason: "没有找到任何课时".to_string(),
            });
        }
        Err(e) => {
            authenticator.teardown(ctx).await;
            return Err(e);
        }
    };
    logging::log_course_loaded(&course, options.max_concurrent);

    // ========== 3. 并发截图 ==========
    let ctx = Arc::new(ctx);
    let coordinator = CaptureCoordinator::new(options.max_concurrent, &course, &options.output_dir);
    let results = coordinator
        .capture_all(capturer, Arc::clone(&ctx), course.lessons.clone())
        .await;

    match Arc::try_unwrap(ctx) {
        Ok(ctx) => authenticator.teardown(ctx).await,
        Err(_) => warn!("⚠️ 会话仍被引用，跳过释放"),
    }

    // ========== 4. 合并 ==========
    let combined = match merge_course(&course, &results, &options.output_dir).await {
        Ok(path) => Ok(path),
        Err(e) => {
            error!("❌ 合并失败: {}", e);
            Err(e.to_string())
        }
    };

    // ========== 5. 汇总 ==========
    let report = RunReport {
        course,
        results,
        combined,
    };
    let writer = SummaryWriter::new(&report.course.output_dir(&options.output_dir));
    let combined_ref = match &report.combined {
        Ok(path) => Ok(path.as_path()),
        Err(reason) => Err(reason.as_str()),
    };
    match writer
        .write(&report.course.name, &report.results, combined_ref)
        .await
    {
        Ok(()) => info!("📝 汇总已写入 {}", writer.path().display()),
        Err(e) => warn!("⚠️ 写入汇总失败: {}", e),
    }

    Ok(report)
}

/// 应用主结构（chromiumoxide 实现的组装）
pub struct App {
    config: Config,
    profile: SiteProfile,
}

impl App {
    /// 初始化应用：校验配置并读取站点配置
    pub async fn initialize(config: Config) -> AppResult<Self> {
        config.validate()?;
        let profile = match &config.site_profile {
            Some(path) => load_site_profile(path).await?,
            None => SiteProfile::default(),
        };
        logging::log_startup(&config);
        Ok(Self { config, profile })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> AppResult<RunReport> {
        let authenticator = ChromeAuthenticator::new(&self.config, self.profile.clone());
        let enumerator = ChromeLessonEnumerator::new();
        let capturer = Arc::new(ChromePageCapturer::new());

        let report = download_course(
            &authenticator,
            &enumerator,
            capturer,
            &RunOptions::from(&self.config),
        )
        .await?;

        logging::print_final_stats(&report);
        Ok(report)
    }
}
