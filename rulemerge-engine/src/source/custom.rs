//! 用户自定义规则文件解析
//! 文件按分类分节：注释文本以独立单词形式包含分类名（ASCII 大小写不敏感）即开启新节，
//! 直到下一个节头之前的非注释行都属于该分类

use rustc_hash::FxHashMap;

/// 按分类分组的自定义规则行（保持文件内原始顺序）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomSections {
    sections: FxHashMap<String, Vec<String>>,
}

impl CustomSections {
    /// 从单个分类的规则行构建（测试与程序化注入使用）
    pub fn insert(&mut self, category: impl Into<String>, lines: Vec<String>) {
        self.sections.entry(category.into()).or_default().extend(lines);
    }

    /// 获取分类的自定义规则行，无则返回空切片
    pub fn lines_for(&self, category: &str) -> &[String] {
        self.sections.get(category).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.sections.values().all(Vec::is_empty)
    }

    /// 全部规则行数
    pub fn total_lines(&self) -> usize {
        self.sections.values().map(Vec::len).sum()
    }
}

/// 在注释文本中匹配分类名：按整词匹配，多个命中时取最长的分类名
fn match_section_header<'a, S: AsRef<str>>(comment: &str, categories: &'a [S]) -> Option<&'a str> {
    let comment = comment.to_ascii_lowercase();
    categories
        .iter()
        .map(|name| name.as_ref())
        .filter(|name| !name.is_empty() && contains_word(&comment, &name.to_ascii_lowercase()))
        .max_by_key(|name| name.len())
}

/// `word` 在 `text` 中出现且两侧不是字母或数字（`domains` 不视为包含 `ai`）
fn contains_word(text: &str, word: &str) -> bool {
    let bytes = text.as_bytes();
    text.match_indices(word).any(|(start, _)| {
        let end = start + word.len();
        let before = start == 0 || !bytes[start - 1].is_ascii_alphanumeric();
        let after = end == bytes.len() || !bytes[end].is_ascii_alphanumeric();
        before && after
    })
}

/// 解析自定义规则文件
/// - categories: 已配置的分类名，节头只识别这些名字
/// - 第一个节头之前的规则行被忽略
pub fn parse_custom_sections<S: AsRef<str>>(content: &str, categories: &[S]) -> CustomSections {
    let mut sections = CustomSections::default();
    let mut current: Option<&str> = None;
    let mut orphan_lines = 0usize;

    for raw in content.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(comment) = line.strip_prefix('#') {
            if let Some(category) = match_section_header(comment, categories) {
                current = Some(category);
                sections.sections.entry(category.to_string()).or_default();
            }
            // 未命中分类名的注释行只是普通注释
            continue;
        }

        match current {
            Some(category) => sections
                .sections
                .entry(category.to_string())
                .or_default()
                .push(line.to_string()),
            None => orphan_lines += 1,
        }
    }

    if orphan_lines > 0 {
        log::warn!(
            "Custom rules: {} line(s) before the first category header were ignored",
            orphan_lines
        );
    }

    sections
}
