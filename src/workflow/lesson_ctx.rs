//! 课时处理上下文
//!
//! 封装"我正在处理哪门课的第几课时"这一信息，用作日志前缀

use std::fmt::Display;

use crate::models::Lesson;

/// 课时处理上下文
#[derive(Debug, Clone)]
pub struct LessonCtx {
    /// 课程名
    pub course_name: String,

    /// 课时序号（从1开始）
    pub lesson_index: usize,

    /// 课时总数（仅用于日志显示）
    pub total: usize,
}

impl LessonCtx {
    pub fn new(course_name: impl Into<String>, lesson: &Lesson, total: usize) -> Self {
        Self {
            course_name: course_name.into(),
            lesson_index: lesson.index,
            total,
        }
    }
}

impl Display for LessonCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{} 课时 {:03}/{:03}]",
            self.course_name, self.lesson_index, self.total
        )
    }
}
