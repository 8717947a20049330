use std::fmt::{self, Write};

/// 日志预览：折叠连续空白，超过 max_len 个字符时截断并追加 `…`
/// 返回惰性 Display，只在日志级别启用时才真正格式化
#[inline]
pub fn preview_compact(s: &str, max_len: usize) -> impl fmt::Display + '_ {
    struct Compact<'a> {
        source: &'a str,
        max_len: usize,
    }

    impl fmt::Display for Compact<'_> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let mut written = 0usize;
            let mut in_space = false;

            for ch in self.source.trim().chars() {
                if written >= self.max_len {
                    return f.write_char('…');
                }
                if ch.is_whitespace() {
                    if in_space {
                        continue;
                    }
                    in_space = true;
                    f.write_char(' ')?;
                } else {
                    in_space = false;
                    f.write_char(ch)?;
                }
                written += 1;
            }
            Ok(())
        }
    }

    Compact { source: s, max_len }
}
