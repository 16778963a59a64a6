use std::fmt;
use std::path::PathBuf;

use crate::error::CaptureError;
use crate::models::Lesson;

/// 失败类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// 页面无法访问或超时
    Navigation,
    /// 截图为空或损坏
    Render,
    /// 课时 PDF 生成失败
    Assembly,
    /// 任务异常退出（panic / 被取消）
    Aborted,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::Navigation => "导航失败",
            FailureKind::Render => "截图失败",
            FailureKind::Assembly => "PDF生成失败",
            FailureKind::Aborted => "任务中断",
        };
        f.write_str(name)
    }
}

/// 单个课时的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// 成功，附带课时 PDF 路径
    Success(PathBuf),
    /// 失败，附带类别和说明
    Failure { kind: FailureKind, detail: String },
}

/// 课时 + 处理结果
#[derive(Debug, Clone)]
pub struct CaptureResult {
    pub lesson: Lesson,
    pub outcome: CaptureOutcome,
}

impl CaptureResult {
    pub fn success(lesson: Lesson, path: PathBuf) -> Self {
        Self {
            lesson,
            outcome: CaptureOutcome::Success(path),
        }
    }

    pub fn failure(lesson: Lesson, kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            lesson,
            outcome: CaptureOutcome::Failure {
                kind,
                detail: detail.into(),
            },
        }
    }

    pub fn from_error(lesson: Lesson, err: &CaptureError) -> Self {
        let kind = match err {
            CaptureError::Navigation { .. } => FailureKind::Navigation,
            CaptureError::Render(_) => FailureKind::Render,
            CaptureError::Assembly(_) => FailureKind::Assembly,
        };
        Self::failure(lesson, kind, err.to_string())
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, CaptureOutcome::Success(_))
    }

    /// 成功时返回 PDF 路径
    pub fn pdf_path(&self) -> Option<&PathBuf> {
        match &self.outcome {
            CaptureOutcome::Success(path) => Some(path),
            CaptureOutcome::Failure { .. } => None,
        }
    }
}
