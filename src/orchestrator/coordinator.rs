//! 截图调度器 - 编排层
//!
//! ## 职责
//!
//! 1. **并发控制**：Semaphore 限制同时进行的截图数量
//! 2. **上下文共享**：已认证上下文以 `Arc` 显式传给每个任务，只读
//! 3. **失败隔离**：单个课时失败（包括任务 panic）只记录，不影响其他课时
//! 4. **结果归位**：完成顺序任意，结果按课时序号排序
//! 5. **整本合并**：按课时序号合并成功的课时 PDF

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::error::AssemblyError;
use crate::models::{CaptureResult, Course, FailureKind, Lesson};
use crate::services::pdf_assembler;
use crate::services::PageCapturer;
use crate::workflow::{LessonCtx, LessonFlow};

/// 截图调度器
pub struct CaptureCoordinator {
    max_concurrent: usize,
    course_name: String,
    course_dir: PathBuf,
}

impl CaptureCoordinator {
    pub fn new(max_concurrent: usize, course: &Course, output_root: &Path) -> Self {
        Self {
            max_concurrent: max_concurrent.max(1),
            course_name: course.name.clone(),
            course_dir: course.output_dir(output_root),
        }
    }

    /// 对所有课时截图，每个课时恰好产出一个结果，结果按序号排列
    pub async fn capture_all<C, P>(
        &self,
        capturer: Arc<P>,
        ctx: Arc<C>,
        lessons: Vec<Lesson>,
    ) -> Vec<CaptureResult>
    where
        C: Send + Sync + 'static,
        P: PageCapturer<C>,
    {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let flow = LessonFlow::new(&self.course_dir);
        let total = lessons.len();
        let mut seen = HashSet::new();
        let mut handles = Vec::with_capacity(total);
        let mut results = Vec::with_capacity(total);

        for lesson in lessons {
            if !seen.insert(lesson.index) {
                warn!("⚠️ 课时 {} 重复出现，跳过", lesson);
                continue;
            }

            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    error!("[课时 {:03}] 无法获取并发许可: {}", lesson.index, e);
                    results.push(CaptureResult::failure(lesson, FailureKind::Aborted, e.to_string()));
                    continue;
                }
            };

            let lesson_ctx = LessonCtx::new(&self.course_name, &lesson, total);
            let capturer = Arc::clone(&capturer);
            let ctx = Arc::clone(&ctx);
            let flow = flow.clone();
            let fallback = lesson.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                flow.run(capturer.as_ref(), ctx.as_ref(), lesson, &lesson_ctx)
                    .await
            });
            handles.push((fallback, handle));
        }

        // 等待所有任务完成
        for (lesson, handle) in handles {
            match handle.await {
                Ok(result) => results.push(result),
                Err(e) => {
                    error!("[课时 {:03}] 任务执行失败: {}", lesson.index, e);
                    results.push(CaptureResult::failure(lesson, FailureKind::Aborted, e.to_string()));
                }
            }
        }

        results.sort_by_key(|r| r.lesson.index);
        results
    }
}

/// 按课时序号合并成功的课时 PDF，写到 `<course>/<course>_COMPLETE.pdf`
///
/// 合并失败只影响这一步，已生成的课时 PDF 保持不变。
pub async fn merge_course(
    course: &Course,
    results: &[CaptureResult],
    output_root: &Path,
) -> Result<PathBuf, AssemblyError> {
    let mut ordered: Vec<(usize, PathBuf)> = results
        .iter()
        .filter_map(|r| r.pdf_path().map(|path| (r.lesson.index, path.clone())))
        .collect();
    ordered.sort_by_key(|(index, _)| *index);
    let paths: Vec<PathBuf> = ordered.into_iter().map(|(_, path)| path).collect();

    if paths.is_empty() {
        return Err(AssemblyError::EmptyInput);
    }

    info!("📚 正在合并 {} 个课时 PDF...", paths.len());
    let merged = tokio::task::spawn_blocking(move || pdf_assembler::merge_pdfs(&paths))
        .await
        .map_err(|e| AssemblyError::Encode(e.to_string()))??;

    let output = course.combined_pdf_path(output_root);
    pdf_assembler::write_pdf_atomic(&output, &merged).await?;
    info!("✓ 已合并: {}", output.display());
    Ok(output)
}
