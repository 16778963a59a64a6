//! # Course Capture
//!
//! 登录在线课程平台，把每个课时页面整页截图，生成课时 PDF 和整本课程 PDF。
//!
//! ## 架构设计
//!
//! 本系统沿用四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有 Page，只暴露能力
//! - `JsExecutor` - 执行 JS、滚动、点击
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `ChromeAuthenticator` - 登录并产出共享会话
//! - `ChromeLessonEnumerator` - 获取课时列表
//! - `ChromePageCapturer` - 懒加载 + 整页截图
//! - `pdf_assembler` - 截图转 PDF、合并 PDF
//! - `SummaryWriter` - 写运行汇总
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个课时"的完整处理流程
//! - `LessonCtx` - 上下文封装（课程名 + 课时序号）
//! - `LessonFlow` - 截图 → 校验 → PDF → 写入
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/course_processor` - 整次运行：登录、枚举、调度、合并、汇总
//! - `orchestrator/coordinator` - 有上限的并发截图和按序合并
//!
//! ## 输出结构
//!
//! ```text
//! output/
//! └── course-name/
//!     ├── 001_Lesson_Name/
//!     │   └── Lesson_Name.pdf
//!     ├── 002_Next_Lesson/
//!     ├── course-name_COMPLETE.pdf
//!     └── download_summary.txt
//! ```

pub mod browser;
pub mod cli;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult, AssemblyError, CaptureError};
pub use infrastructure::JsExecutor;
pub use models::{CaptureOutcome, CaptureResult, Course, FailureKind, Lesson, SiteProfile};
pub use orchestrator::{download_course, App, RunOptions, RunReport, RunStatus};
pub use services::{Authenticator, LessonSource, PageCapturer};
pub use workflow::{LessonCtx, LessonFlow};
