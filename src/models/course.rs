use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::utils::naming::{course_name_from_url, sanitize_filename};

/// 课程：名称 + 有序课时列表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    /// 课程名（URL 中 `/courses/<slug>` 的 slug）
    pub name: String,
    /// 课程根 URL
    pub url: String,
    pub lessons: Vec<Lesson>,
}

impl Course {
    /// 根据课程 URL 创建课程，课时按给定顺序从 1 开始编号
    pub fn new(url: impl Into<String>, lessons: Vec<(String, String)>) -> Self {
        let url = url.into();
        let lessons = lessons
            .into_iter()
            .enumerate()
            .map(|(i, (title, lesson_url))| Lesson::new(i + 1, title, lesson_url))
            .collect();
        Self {
            name: course_name_from_url(&url),
            url,
            lessons,
        }
    }

    /// 课程输出目录: `<output_root>/<course-name>`
    pub fn output_dir(&self, output_root: &Path) -> PathBuf {
        output_root.join(&self.name)
    }

    /// 合并后的整本 PDF 路径
    pub fn combined_pdf_path(&self, output_root: &Path) -> PathBuf {
        self.output_dir(output_root)
            .join(format!("{}_COMPLETE.pdf", self.name))
    }

    pub fn len(&self) -> usize {
        self.lessons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lessons.is_empty()
    }
}

/// 课时
///
/// 在枚举时创建，截图时只消费一次，之后不再修改。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    /// 序号（从 1 开始，用于排序和命名）
    pub index: usize,
    pub title: String,
    pub url: String,
}

impl Lesson {
    pub fn new(index: usize, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            index,
            title: title.into(),
            url: url.into(),
        }
    }

    /// 文件名用的标题
    pub fn file_stem(&self) -> String {
        let stem = sanitize_filename(&self.title);
        if stem.is_empty() {
            format!("lesson_{:03}", self.index)
        } else {
            stem
        }
    }

    /// 课时目录名: `NNN_<Title>`
    pub fn dir_name(&self) -> String {
        format!("{:03}_{}", self.index, self.file_stem())
    }

    /// 课时 PDF 路径: `<course_dir>/NNN_<Title>/<Title>.pdf`
    pub fn pdf_path(&self, course_dir: &Path) -> PathBuf {
        course_dir
            .join(self.dir_name())
            .join(format!("{}.pdf", self.file_stem()))
    }
}

impl fmt::Display for Lesson {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:03} {}", self.index, self.title)
    }
}
