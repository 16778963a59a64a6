//! 文件命名工具
//!
//! 课时目录、PDF 文件名和课程名的生成规则

use std::sync::OnceLock;

use regex::Regex;
use url::Url;

/// 文件名最大长度（字符数）
const MAX_FILENAME_CHARS: usize = 80;

fn invalid_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w\s-]").expect("literal regex"))
}

fn separators() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[-\s]+").expect("literal regex"))
}

/// 生成安全的文件名
///
/// 去掉标点，空白和连字符合并为 `_`，截断到 80 个字符
pub fn sanitize_filename(name: &str) -> String {
    let stripped = invalid_chars().replace_all(name.trim(), "");
    let joined = separators().replace_all(stripped.trim(), "_");
    joined
        .trim_matches('_')
        .chars()
        .take(MAX_FILENAME_CHARS)
        .collect()
}

/// 从课程 URL 中取课程名（`/courses/<slug>`），取不到时返回 `course`
///
/// 课程名直接用作输出目录名，只保留字母数字、`-`、`_` 和 `.`，
/// `.` / `..` 这类会跳出输出目录的名字一律退回 `course`。
pub fn course_name_from_url(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|parsed| {
            let segments: Vec<String> = parsed.path_segments()?.map(str::to_string).collect();
            let pos = segments.iter().position(|s| s == "courses")?;
            segments.get(pos + 1).cloned()
        })
        .and_then(|slug| safe_dir_name(&slug))
        .unwrap_or_else(|| "course".to_string())
}

fn safe_dir_name(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect();
    if cleaned.chars().all(|c| c == '.') {
        None
    } else {
        Some(cleaned)
    }
}

/// URL 最后一段转成标题: `what-is-an-agent` → `What Is An Agent`
pub fn title_from_url(url: &str) -> String {
    let last = Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .path_segments()?
                .rfind(|s| !s.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_default();
    last.split('-')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
