//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责整次运行和并发调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `course_processor` - 课程处理器
//! - 登录 → 获取课时 → 截图 → 合并 → 汇总
//! - 持有已认证上下文，截图结束后释放
//! - 决定退出状态
//!
//! ### `coordinator` - 截图调度器
//! - Semaphore 限制并发
//! - 每个课时恰好一个结果，失败不扩散
//! - 按课时序号合并整本 PDF
//!
//! ## 层次关系
//!
//! ```text
//! course_processor (处理 Course)
//!     ↓
//! coordinator (处理 Vec<Lesson>)
//!     ↓
//! workflow::LessonFlow (处理单个 Lesson)
//!     ↓
//! services (能力层：登录 / 枚举 / 截图 / PDF)
//!     ↓
//! infrastructure (基础设施：JsExecutor)
//! ```

pub mod coordinator;
pub mod course_processor;

pub use coordinator::{merge_course, CaptureCoordinator};
pub use course_processor::{download_course, App, RunOptions, RunReport, RunStatus};
