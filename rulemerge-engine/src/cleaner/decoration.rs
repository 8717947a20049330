//! 行级装饰清理：行内注释剥离 + 不动点修剪
//! 上游规则源的装饰层数不固定（YAML 列表符、引号、`+.` 后缀标记可能层层嵌套），
//! 这里用显式的有界不动点函数处理，而不是写死剥离层数

use std::borrow::Cow;

/// 行首可剥离的装饰字符（空白另行处理）
pub const LEADING_DECORATION: &[char] = &['+', '-', '.', '\'', '"'];

/// 行尾可剥离的装饰字符（空白另行处理）
pub const TRAILING_DECORATION: &[char] = &['\'', '"', ','];

/// 引号字符，清理后的 value 中不允许残留
pub const QUOTE_CHARS: &[char] = &['\'', '"'];

/// 修剪结果
/// - leading: 被剥离的前导装饰原文（用于 Payload 方言判断 `+.` / `.` 后缀标记）
/// - body: 修剪后的正文
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trimmed<'a> {
    pub leading: &'a str,
    pub body: &'a str,
}

impl<'a> Trimmed<'a> {
    /// 前导装饰是否以 `.` 结尾（`+.` / `.` / `- '+.` 等后缀标记）
    pub fn has_suffix_sigil(&self) -> bool {
        self.leading.trim_end_matches(QUOTE_CHARS).ends_with('.')
    }
}

#[inline]
fn is_leading(c: char) -> bool {
    c.is_whitespace() || LEADING_DECORATION.contains(&c)
}

#[inline]
fn is_trailing(c: char) -> bool {
    c.is_whitespace() || TRAILING_DECORATION.contains(&c)
}

/// 剥离行内注释：从第一个未转义的 `#` 到行尾
/// `\#` 视为字面量 `#`
pub fn strip_comment(line: &str) -> Cow<'_, str> {
    if !line.contains('#') {
        return Cow::Borrowed(line);
    }

    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' if chars.peek() == Some(&'#') => {
                chars.next();
                out.push('#');
            }
            '#' => break,
            _ => out.push(ch),
        }
    }
    Cow::Owned(out)
}

/// 不动点修剪
/// 每轮：剥离行首空白与 `+ - . ' "`，剥离行尾空白与 `' " ,`；
/// 本轮未改变长度即到达不动点。每轮至少移除一个字符，轮数上界为输入长度 + 1
pub fn trim_decoration(s: &str) -> Trimmed<'_> {
    let mut body = s;
    for _ in 0..=s.len() {
        let next = body.trim_start_matches(is_leading).trim_end_matches(is_trailing);
        if next.len() == body.len() {
            break;
        }
        body = next;
    }

    // 行首剥离集合在各轮中不变，正文起点即单次剥离后的起点
    let leading_len = s.len() - s.trim_start_matches(is_leading).len();
    let leading = if body.is_empty() { s } else { &s[..leading_len] };

    Trimmed { leading, body }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_comment() {
        assert_eq!(strip_comment("DOMAIN,a.com # note"), "DOMAIN,a.com ");
        assert_eq!(strip_comment("# whole line"), "");
        assert_eq!(strip_comment("DOMAIN,a.com"), "DOMAIN,a.com");
        assert_eq!(strip_comment(r"USER-AGENT,foo\#bar # tail"), "USER-AGENT,foo#bar ");
    }

    #[test]
    fn test_trim_decoration_nested_layers() {
        let t = trim_decoration("  - '+.b.com'");
        assert_eq!(t.body, "b.com");
        assert_eq!(t.leading, "  - '+.");
        assert!(t.has_suffix_sigil());

        let t = trim_decoration("- \"'a.com'\",");
        assert_eq!(t.body, "a.com");
        assert!(!t.has_suffix_sigil());
    }

    #[test]
    fn test_trim_decoration_is_fixed_point() {
        for input in ["  - '+.b.com'", "'\"'x.org'\"'", "...+++a.net,,", "DOMAIN,a.com", "", "'''"] {
            let once = trim_decoration(input).body;
            let twice = trim_decoration(once).body;
            assert_eq!(once, twice, "input: {:?}", input);
        }
    }

    #[test]
    fn test_trim_decoration_all_decoration() {
        let t = trim_decoration(" '+.' ");
        assert_eq!(t.body, "");
    }

    #[test]
    fn test_trim_keeps_prefixed_rule() {
        let t = trim_decoration("'DOMAIN-SUFFIX,b.com',");
        assert_eq!(t.body, "DOMAIN-SUFFIX,b.com");
        assert_eq!(t.leading, "'");
    }
}
