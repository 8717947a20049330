//! 单行规范化：原始规则行 → CanonicalRule 或拒绝
use std::net::{Ipv4Addr, Ipv6Addr};

use once_cell::sync::Lazy;
use regex::Regex;

use super::decoration::{strip_comment, trim_decoration, QUOTE_CHARS};
use crate::core::{CanonicalRule, MatchType, RuleOrigin, SourceDialect};

/// HTML 属性赋值片段（误拉取到网页时的典型残留，如 `class="x"`）
static HTML_ATTR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[A-Za-z][\w:-]*\s*=\s*["']"#).expect("valid html attr regex"));

/// 方言头标记
const PAYLOAD_HEADER: &str = "payload:";

/// 拒绝原因，仅用于统计，不作为控制流信号向上传播
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// 空行 / 纯注释行 / 只剩装饰字符
    Empty,
    /// 方言头（`payload:`、`[Rule]` 等）
    HeaderToken,
    /// HTML 泄漏（尖括号、属性赋值）
    HtmlLeak,
    /// 无法识别的规则类型（如 `GEOIP,CN`）
    UnknownType,
    /// value 非法（为空或残留引号）
    InvalidValue,
}

/// 单行规范化器
#[derive(Debug, Default, Clone)]
pub struct LineNormalizer;

impl LineNormalizer {
    /// 规范化单行，拒绝时返回 None
    pub fn normalize(
        &self,
        raw_line: &str,
        dialect: SourceDialect,
        category: &str,
        origin: RuleOrigin,
    ) -> Option<CanonicalRule> {
        self.classify(raw_line, dialect, category, origin).ok()
    }

    /// 规范化单行并给出拒绝原因
    pub fn classify(
        &self,
        raw_line: &str,
        dialect: SourceDialect,
        category: &str,
        origin: RuleOrigin,
    ) -> Result<CanonicalRule, RejectReason> {
        let stripped = strip_comment(raw_line);
        let line = stripped.trim();

        if line.is_empty() {
            return Err(RejectReason::Empty);
        }
        if is_header_token(line) {
            return Err(RejectReason::HeaderToken);
        }
        if line.contains(['<', '>']) || HTML_ATTR_RE.is_match(line) {
            return Err(RejectReason::HtmlLeak);
        }

        let trimmed = trim_decoration(line);
        let body = trimmed.body;
        if body.is_empty() {
            return Err(RejectReason::Empty);
        }

        let (match_type, value) = match split_type_prefix(body) {
            Some((match_type, rest)) => (match_type, clean_operand(match_type, rest)),
            None => {
                // 裸类型标记（如 `DOMAIN-SUFFIX,` 剥离逗号后）或未知类型前缀
                if MatchType::parse_token(body).is_some() {
                    return Err(RejectReason::InvalidValue);
                }
                if body.contains(',') {
                    return Err(RejectReason::UnknownType);
                }
                let match_type = match dialect {
                    SourceDialect::List => MatchType::DomainSuffix,
                    SourceDialect::Payload => infer_payload_type(body, trimmed.has_suffix_sigil()),
                };
                (match_type, body)
            }
        };

        if value.is_empty() || value.contains(QUOTE_CHARS) {
            return Err(RejectReason::InvalidValue);
        }

        Ok(CanonicalRule::new(match_type, value, category, origin))
    }
}

/// 是否为方言头：`payload:` 或 INI 节头 `[Rule]`
fn is_header_token(line: &str) -> bool {
    line.eq_ignore_ascii_case(PAYLOAD_HEADER) || (line.starts_with('[') && line.ends_with(']'))
}

/// 拆分 `TYPE,value[,extra...]`，仅识别九种已知类型
fn split_type_prefix(body: &str) -> Option<(MatchType, &str)> {
    let (head, rest) = body.split_once(',')?;
    let match_type = MatchType::parse_token(head)?;
    // 附加字段（策略名、no-resolve 等）丢弃，策略在编码时重新生成
    let operand = match match_type {
        // 正则本身可能含逗号（如 `{1,3}`），只剥离可识别的尾部附加字段
        MatchType::DomainRegex => strip_trailing_options(rest),
        _ => rest.split(',').next().unwrap_or_default(),
    };
    Some((match_type, operand))
}

/// 从尾部逐个剥离 `no-resolve` 与大写策略名字段，其余内容原样保留
fn strip_trailing_options(mut rest: &str) -> &str {
    while let Some((head, last)) = rest.rsplit_once(',') {
        if !is_trailing_option(last.trim()) {
            break;
        }
        rest = head;
    }
    rest
}

/// 尾部附加字段：`no-resolve` 或形如 `PROXY` / `DIRECT` / `REJECT` 的策略名
fn is_trailing_option(field: &str) -> bool {
    if field.eq_ignore_ascii_case("no-resolve") {
        return true;
    }
    let mut chars = field.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_' || c == '-')
}

/// 清理类型前缀后的操作数
fn clean_operand(match_type: MatchType, operand: &str) -> &str {
    if match_type.is_domain() {
        trim_decoration(operand).body
    } else {
        // 正则、UA 等可能以 `.`/`+` 开头，只剥离空白与引号
        operand.trim().trim_matches(QUOTE_CHARS).trim()
    }
}

/// Payload 方言下无前缀条目的类型推断
fn infer_payload_type(body: &str, has_suffix_sigil: bool) -> MatchType {
    if let Some(match_type) = infer_cidr_type(body) {
        return match_type;
    }
    if has_suffix_sigil {
        MatchType::DomainSuffix
    } else {
        MatchType::Domain
    }
}

/// `addr/len` 形式的网段识别
fn infer_cidr_type(body: &str) -> Option<MatchType> {
    let (addr, len) = body.split_once('/')?;
    let len: u8 = len.parse().ok()?;
    if addr.parse::<Ipv4Addr>().is_ok() && len <= 32 {
        Some(MatchType::IpCidr)
    } else if addr.parse::<Ipv6Addr>().is_ok() && len <= 128 {
        Some(MatchType::IpCidr6)
    } else {
        None
    }
}
