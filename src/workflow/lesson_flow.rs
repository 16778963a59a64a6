//! 课时处理流程 - 流程层
//!
//! 核心职责：定义"一个课时"的完整处理流程
//!
//! 流程顺序：
//! 1. 截图（PageCapturer）
//! 2. 校验截图
//! 3. 截图 → 课时 PDF
//! 4. 原子写入 `NNN_<Title>/<Title>.pdf`
//!
//! 任何一步失败都只产出失败的 `CaptureResult`，不向上抛错。

use std::path::PathBuf;

use tracing::{info, warn};

use crate::error::CaptureError;
use crate::models::{CaptureResult, FailureKind, Lesson};
use crate::services::page_capturer::validate_raster;
use crate::services::pdf_assembler;
use crate::services::PageCapturer;
use crate::workflow::lesson_ctx::LessonCtx;

/// 课时处理流程
///
/// - 不持有浏览器资源，上下文由调用方显式传入
/// - 只写自己课时目录下的文件
#[derive(Debug, Clone)]
pub struct LessonFlow {
    course_dir: PathBuf,
}

impl LessonFlow {
    pub fn new(course_dir: impl Into<PathBuf>) -> Self {
        Self {
            course_dir: course_dir.into(),
        }
    }

    pub async fn run<C, P>(
        &self,
        capturer: &P,
        ctx: &C,
        lesson: Lesson,
        lesson_ctx: &LessonCtx,
    ) -> CaptureResult
    where
        P: PageCapturer<C>,
    {
        info!("{} 📥 开始: {}", lesson_ctx, lesson.url);

        // ========== 1. 截图 ==========
        let raster = match capturer.capture(ctx, &lesson).await {
            Ok(raster) => raster,
            Err(e) => return self.fail(lesson, lesson_ctx, e),
        };

        // ========== 2. 校验 ==========
        if let Err(e) = validate_raster(&raster) {
            return self.fail(lesson, lesson_ctx, e);
        }

        // ========== 3. 转 PDF ==========
        let pdf = match tokio::task::spawn_blocking(move || pdf_assembler::images_to_pdf(&[raster]))
            .await
        {
            Ok(Ok(pdf)) => pdf,
            Ok(Err(e)) => return self.fail(lesson, lesson_ctx, CaptureError::Assembly(e)),
            Err(e) => {
                warn!("{} ❌ PDF 转换任务中断: {}", lesson_ctx, e);
                return CaptureResult::failure(lesson, FailureKind::Aborted, e.to_string());
            }
        };

        // ========== 4. 写入 ==========
        let pdf_path = lesson.pdf_path(&self.course_dir);
        if let Err(e) = pdf_assembler::write_pdf_atomic(&pdf_path, &pdf).await {
            return self.fail(lesson, lesson_ctx, CaptureError::Assembly(e));
        }

        info!(
            "{} ✅ {} ({} KB)",
            lesson_ctx,
            pdf_path.display(),
            pdf.len() / 1024
        );
        CaptureResult::success(lesson, pdf_path)
    }

    fn fail(&self, lesson: Lesson, lesson_ctx: &LessonCtx, err: CaptureError) -> CaptureResult {
        warn!("{} ❌ {} ({})", lesson_ctx, err, lesson.url);
        CaptureResult::from_error(lesson, &err)
    }
}
