//! 整条流水线的测试（不启动浏览器）
//!
//! 用假的登录 / 枚举 / 截图实现替换 chromiumoxide，检查：
//! 并发上限、部分失败、按序合并、认证失败不写文件、重复运行覆盖。

use std::collections::{HashMap, HashSet};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use course_capture::{
    download_course, AppError, Authenticator, CaptureError, CaptureOutcome, Course, FailureKind,
    Lesson, LessonSource, PageCapturer, RunOptions, RunStatus,
};
use image::{ImageFormat, Rgb, RgbImage};
use lopdf::Document;

const COURSE_URL: &str = "https://learn.example.com/courses/agentic-ai-systems";

// ========== 假实现 ==========

struct FakeSession;

#[derive(Default)]
struct FakeAuthenticator {
    reject: bool,
    teardowns: AtomicUsize,
}

impl Authenticator for FakeAuthenticator {
    type Context = FakeSession;

    async fn authenticate(&self) -> Result<FakeSession, AppError> {
        if self.reject {
            Err(AppError::Authentication("invalid credentials".to_string()))
        } else {
            Ok(FakeSession)
        }
    }

    async fn teardown(&self, _ctx: FakeSession) {
        self.teardowns.fetch_add(1, Ordering::SeqCst);
    }
}

struct FakeSource {
    count: usize,
}

impl LessonSource<FakeSession> for FakeSource {
    async fn enumerate(&self, _ctx: &FakeSession, course_url: &str) -> Result<Course, AppError> {
        let lessons = (1..=self.count)
            .map(|i| (format!("Lesson {i}: Part"), format!("{course_url}/lesson-{i}")))
            .collect();
        Ok(Course::new(course_url, lessons))
    }
}

enum Behavior {
    Timeout,
    Empty,
    Panic,
}

#[derive(Default)]
struct FakeCapturer {
    delays_ms: HashMap<usize, u64>,
    behaviors: HashMap<usize, Behavior>,
    active: AtomicUsize,
    max_active: AtomicUsize,
    calls: AtomicUsize,
    completed: Mutex<Vec<usize>>,
}

impl FakeCapturer {
    fn with_delay(mut self, index: usize, ms: u64) -> Self {
        self.delays_ms.insert(index, ms);
        self
    }

    fn with_behavior(mut self, index: usize, behavior: Behavior) -> Self {
        self.behaviors.insert(index, behavior);
        self
    }
}

impl PageCapturer<FakeSession> for FakeCapturer {
    async fn capture(&self, _ctx: &FakeSession, lesson: &Lesson) -> Result<Vec<u8>, CaptureError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);

        let delay = self.delays_ms.get(&lesson.index).copied().unwrap_or(10);
        tokio::time::sleep(Duration::from_millis(delay)).await;

        self.active.fetch_sub(1, Ordering::SeqCst);
        self.completed.lock().unwrap().push(lesson.index);

        match self.behaviors.get(&lesson.index) {
            Some(Behavior::Timeout) => Err(CaptureError::navigation(&lesson.url, "100 秒内未加载完成")),
            Some(Behavior::Empty) => Ok(Vec::new()),
            Some(Behavior::Panic) => panic!("capturer crashed on lesson {}", lesson.index),
            None => Ok(png_for(lesson.index)),
        }
    }
}

// ========== 工具函数 ==========

/// 每个课时的截图宽度不同（10 + 序号），用来在合并结果里辨认页面
fn png_for(index: usize) -> Vec<u8> {
    let img = RgbImage::from_pixel(10 + index as u32, 8, Rgb([200, 200, 200]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

/// 合并 PDF 中每页的宽度，按页序
fn page_widths(path: &Path) -> Vec<i64> {
    let doc = Document::load(path).unwrap();
    doc.get_pages()
        .into_values()
        .map(|id| {
            let page = doc.get_dictionary(id).unwrap();
            let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
            media_box[2].as_i64().unwrap()
        })
        .collect()
}

fn files_under(root: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    if !root.exists() {
        return out;
    }
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in std::fs::read_dir(&dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                stack.push(path);
            } else {
                out.push(path.strip_prefix(root).unwrap().to_path_buf());
            }
        }
    }
    out.sort();
    out
}

fn options(output: &Path, max_concurrent: usize) -> RunOptions {
    RunOptions {
        course_url: COURSE_URL.to_string(),
        output_dir: output.to_path_buf(),
        max_concurrent,
    }
}

// ========== 测试 ==========

#[tokio::test]
async fn one_timeout_out_of_ten_keeps_the_rest() {
    let dir = tempfile::tempdir().unwrap();
    let auth = FakeAuthenticator::default();
    let capturer = Arc::new(FakeCapturer::default().with_behavior(4, Behavior::Timeout));

    let report = download_course(&auth, &FakeSource { count: 10 }, capturer, &options(dir.path(), 5))
        .await
        .unwrap();

    assert_eq!(report.results.len(), 10);
    assert_eq!(report.succeeded(), 9);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.status(), RunStatus::Partial);

    let failed = &report.results[3];
    assert_eq!(failed.lesson.index, 4);
    assert!(matches!(
        failed.outcome,
        CaptureOutcome::Failure { kind: FailureKind::Navigation, .. }
    ));

    let course_dir = dir.path().join("agentic-ai-systems");
    assert!(!course_dir.join("004_Lesson_4_Part").exists());
    assert!(course_dir
        .join("003_Lesson_3_Part")
        .join("Lesson_3_Part.pdf")
        .exists());

    let combined = report.combined.as_ref().unwrap();
    assert_eq!(
        combined,
        &course_dir.join("agentic-ai-systems_COMPLETE.pdf")
    );
    assert_eq!(
        page_widths(combined),
        vec![11, 12, 13, 15, 16, 17, 18, 19, 20]
    );
    assert!(course_dir.join("download_summary.txt").exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn never_more_than_the_cap_in_flight() {
    let dir = tempfile::tempdir().unwrap();
    let auth = FakeAuthenticator::default();
    let mut capturer = FakeCapturer::default();
    for i in 1..=20 {
        capturer = capturer.with_delay(i, 30);
    }
    let capturer = Arc::new(capturer);

    let report = download_course(
        &auth,
        &FakeSource { count: 20 },
        Arc::clone(&capturer),
        &options(dir.path(), 5),
    )
    .await
    .unwrap();

    assert_eq!(report.succeeded(), 20);
    assert_eq!(capturer.calls.load(Ordering::SeqCst), 20);
    let max_active = capturer.max_active.load(Ordering::SeqCst);
    assert!(max_active <= 5, "max in flight was {max_active}");
    assert!(max_active > 1, "captures never overlapped");
}

#[tokio::test]
async fn combined_pdf_follows_lesson_order_not_completion_order() {
    let dir = tempfile::tempdir().unwrap();
    let auth = FakeAuthenticator::default();
    let capturer = Arc::new(
        FakeCapturer::default()
            .with_delay(1, 60)
            .with_delay(2, 120)
            .with_delay(3, 0),
    );

    let report = download_course(
        &auth,
        &FakeSource { count: 3 },
        Arc::clone(&capturer),
        &options(dir.path(), 5),
    )
    .await
    .unwrap();

    assert_eq!(*capturer.completed.lock().unwrap(), vec![3, 1, 2]);
    let indices: Vec<_> = report.results.iter().map(|r| r.lesson.index).collect();
    assert_eq!(indices, vec![1, 2, 3]);
    assert_eq!(page_widths(report.combined.as_ref().unwrap()), vec![11, 12, 13]);
    assert_eq!(report.status(), RunStatus::Complete);
}

#[tokio::test]
async fn rejected_login_captures_nothing_and_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("output");
    let auth = FakeAuthenticator {
        reject: true,
        ..Default::default()
    };
    let capturer = Arc::new(FakeCapturer::default());

    let err = download_course(&auth, &FakeSource { count: 5 }, Arc::clone(&capturer), &options(&output, 5))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Authentication(_)));
    assert_eq!(capturer.calls.load(Ordering::SeqCst), 0);
    assert!(files_under(&output).is_empty());
    assert!(!output.exists());
}

#[tokio::test]
async fn empty_course_is_fatal_and_releases_the_session() {
    let dir = tempfile::tempdir().unwrap();
    let auth = FakeAuthenticator::default();
    let capturer = Arc::new(FakeCapturer::default());

    let err = download_course(&auth, &FakeSource { count: 0 }, capturer, &options(dir.path(), 5))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Enumeration { .. }));
    assert_eq!(auth.teardowns.load(Ordering::SeqCst), 1);
    assert!(files_under(dir.path()).is_empty());
}

#[tokio::test]
async fn session_is_released_once_after_capture() {
    let dir = tempfile::tempdir().unwrap();
    let auth = FakeAuthenticator::default();
    tokio_test::assert_ok!(
        download_course(
            &auth,
            &FakeSource { count: 3 },
            Arc::new(FakeCapturer::default()),
            &options(dir.path(), 2),
        )
        .await
    );
    assert_eq!(auth.teardowns.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn empty_screenshot_and_panics_are_recorded_per_lesson() {
    let dir = tempfile::tempdir().unwrap();
    let auth = FakeAuthenticator::default();
    let capturer = Arc::new(
        FakeCapturer::default()
            .with_behavior(2, Behavior::Empty)
            .with_behavior(3, Behavior::Panic),
    );

    let report = download_course(&auth, &FakeSource { count: 4 }, capturer, &options(dir.path(), 5))
        .await
        .unwrap();

    let kinds: Vec<Option<FailureKind>> = report
        .results
        .iter()
        .map(|r| match &r.outcome {
            CaptureOutcome::Success(_) => None,
            CaptureOutcome::Failure { kind, .. } => Some(*kind),
        })
        .collect();
    assert_eq!(
        kinds,
        vec![None, Some(FailureKind::Render), Some(FailureKind::Aborted), None]
    );
    assert_eq!(page_widths(report.combined.as_ref().unwrap()), vec![11, 14]);
}

#[tokio::test]
async fn all_lessons_failing_leaves_no_combined_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let auth = FakeAuthenticator::default();
    let capturer = Arc::new(
        FakeCapturer::default()
            .with_behavior(1, Behavior::Timeout)
            .with_behavior(2, Behavior::Timeout),
    );

    let report = download_course(&auth, &FakeSource { count: 2 }, capturer, &options(dir.path(), 5))
        .await
        .unwrap();

    assert_eq!(report.results.len(), 2);
    assert!(report.combined.is_err());
    assert_eq!(report.status(), RunStatus::Partial);
    assert_eq!(
        files_under(&dir.path().join("agentic-ai-systems")),
        vec![PathBuf::from("download_summary.txt")]
    );
}

#[tokio::test]
async fn rerun_overwrites_the_same_files() {
    let dir = tempfile::tempdir().unwrap();
    let auth = FakeAuthenticator::default();

    for _ in 0..2 {
        let report = download_course(
            &auth,
            &FakeSource { count: 3 },
            Arc::new(FakeCapturer::default()),
            &options(dir.path(), 5),
        )
        .await
        .unwrap();
        assert_eq!(report.status(), RunStatus::Complete);
    }

    let files = files_under(dir.path());
    let expected: HashSet<PathBuf> = [
        "agentic-ai-systems/001_Lesson_1_Part/Lesson_1_Part.pdf",
        "agentic-ai-systems/002_Lesson_2_Part/Lesson_2_Part.pdf",
        "agentic-ai-systems/003_Lesson_3_Part/Lesson_3_Part.pdf",
        "agentic-ai-systems/agentic-ai-systems_COMPLETE.pdf",
        "agentic-ai-systems/download_summary.txt",
    ]
    .into_iter()
    .map(PathBuf::from)
    .collect();
    assert_eq!(files.len(), expected.len());
    assert_eq!(files.into_iter().collect::<HashSet<_>>(), expected);

    let combined = dir
        .path()
        .join("agentic-ai-systems")
        .join("agentic-ai-systems_COMPLETE.pdf");
    assert_eq!(page_widths(&combined), vec![11, 12, 13]);
}
