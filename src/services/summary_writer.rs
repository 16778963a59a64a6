//! 运行汇总写入服务 - 业务能力层
//!
//! 只负责把本次运行的结果写成 `download_summary.txt`

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;
use tracing::debug;

use crate::models::{CaptureOutcome, CaptureResult};

/// 汇总文件名
pub const SUMMARY_FILE_NAME: &str = "download_summary.txt";

/// 汇总写入服务
pub struct SummaryWriter {
    summary_path: PathBuf,
}

impl SummaryWriter {
    /// 汇总写在课程目录下
    pub fn new(course_dir: &Path) -> Self {
        Self {
            summary_path: course_dir.join(SUMMARY_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.summary_path
    }

    /// 写入汇总（覆盖上一次运行的汇总）
    ///
    /// # 参数
    /// - `course_name`: 课程名
    /// - `results`: 按课时序号排好的结果
    /// - `combined`: 整本 PDF 的路径，或合并失败的原因
    pub async fn write(
        &self,
        course_name: &str,
        results: &[CaptureResult],
        combined: Result<&Path, &str>,
    ) -> Result<()> {
        let content = render_summary(
            course_name,
            results,
            combined,
            &chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        );
        debug!("写入汇总: {}", self.summary_path.display());

        if let Some(parent) = self.summary_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&self.summary_path, content)
            .await
            .with_context(|| format!("无法写入汇总: {}", self.summary_path.display()))?;
        Ok(())
    }
}

/// 生成汇总文本
pub fn render_summary(
    course_name: &str,
    results: &[CaptureResult],
    combined: Result<&Path, &str>,
    timestamp: &str,
) -> String {
    let success = results.iter().filter(|r| r.is_success()).count();
    let mut out = format!(
        "{}\n课程下载汇总 - {}\n{}\n课程: {}\n成功: {}/{}\n失败: {}\n\n",
        "=".repeat(60),
        timestamp,
        "=".repeat(60),
        course_name,
        success,
        results.len(),
        results.len() - success,
    );

    for result in results {
        let line = match &result.outcome {
            CaptureOutcome::Success(path) => format!(
                "✅ {:03} {} -> {}\n",
                result.lesson.index,
                result.lesson.title,
                path.display()
            ),
            CaptureOutcome::Failure { kind, detail } => format!(
                "❌ {:03} {} [{}] {} ({})\n",
                result.lesson.index, result.lesson.title, kind, detail, result.lesson.url
            ),
        };
        out.push_str(&line);
    }

    out.push('\n');
    match combined {
        Ok(path) => out.push_str(&format!("整本 PDF: {}\n", path.display())),
        Err(reason) => out.push_str(&format!("整本 PDF 未生成: {}\n", reason)),
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FailureKind, Lesson};

    #[test]
    fn summary_lists_every_lesson() {
        let results = vec![
            CaptureResult::success(
                Lesson::new(1, "Intro", "https://x/c/intro"),
                PathBuf::from("output/c/001_Intro/Intro.pdf"),
            ),
            CaptureResult::failure(
                Lesson::new(2, "Memory", "https://x/c/memory"),
                FailureKind::Navigation,
                "timeout",
            ),
        ];
        let text = render_summary(
            "c",
            &results,
            Ok(Path::new("output/c/c_COMPLETE.pdf")),
            "2026-01-01 00:00:00",
        );

        assert!(text.contains("成功: 1/2"));
        assert!(text.contains("失败: 1"));
        assert!(text.contains("✅ 001 Intro -> output/c/001_Intro/Intro.pdf"));
        assert!(text.contains("❌ 002 Memory [导航失败] timeout (https://x/c/memory)"));
        assert!(text.contains("整本 PDF: output/c/c_COMPLETE.pdf"));
    }

    #[test]
    fn merge_failure_is_reported() {
        let text = render_summary("c", &[], Err("没有可组装的输入"), "t");
        assert!(text.contains("整本 PDF 未生成: 没有可组装的输入"));
    }
}
