//! 能力接口
//!
//! 编排层只依赖这三个 trait。真实实现基于 chromiumoxide，
//! 测试里可以换成不启动浏览器的假实现。

use std::future::Future;

use crate::error::{AppError, CaptureError};
use crate::models::{Course, Lesson};

/// 登录能力：产出一个可共享的已认证上下文
pub trait Authenticator: Send + Sync {
    /// 已认证上下文，截图期间被所有任务只读共享
    type Context: Send + Sync + 'static;

    /// 建立已认证上下文，失败时整次运行中止
    fn authenticate(&self) -> impl Future<Output = Result<Self::Context, AppError>> + Send;

    /// 所有截图结束后释放上下文
    fn teardown(&self, ctx: Self::Context) -> impl Future<Output = ()> + Send;
}

/// 课时枚举能力
pub trait LessonSource<C>: Send + Sync {
    /// 从课程根 URL 得到按顺序排列的课时
    fn enumerate(
        &self,
        ctx: &C,
        course_url: &str,
    ) -> impl Future<Output = Result<Course, AppError>> + Send;
}

/// 页面截图能力
pub trait PageCapturer<C>: Send + Sync + 'static {
    /// 打开课时页面，等懒加载内容就绪后返回整页截图（PNG 字节）
    fn capture(
        &self,
        ctx: &C,
        lesson: &Lesson,
    ) -> impl Future<Output = Result<Vec<u8>, CaptureError>> + Send;
}
