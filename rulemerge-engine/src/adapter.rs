//! 方言转换：List / Payload / Policy 三种线上格式之间的单条规则转换
//! 转换不会发明九种已知类型之外的类型，也不会修改 value

use crate::cleaner::decoration::QUOTE_CHARS;
use crate::core::{CanonicalRule, MatchType};

/// Payload 方言的后缀标记
pub const SUFFIX_SIGIL: &str = "+.";

/// List → Payload：`DOMAIN,v` → `'v'`，`DOMAIN-SUFFIX,v` → `'+.v'`
/// 其它类型在 Payload 方言中无法表达，返回 None
pub fn to_payload_entry(match_type: MatchType, value: &str) -> Option<String> {
    match match_type {
        MatchType::Domain => Some(format!("'{}'", value)),
        MatchType::DomainSuffix => Some(format!("'{}{}'", SUFFIX_SIGIL, value)),
        _ => None,
    }
}

/// 单条 Payload 条目解码为 `(类型, value)`
/// 接受 `'+.v'`、`'v'`、`- '+.v'` 以及无引号形式
pub fn decode_payload_entry(entry: &str) -> Option<(MatchType, String)> {
    let entry = entry.trim();
    let entry = entry.strip_prefix('-').map(str::trim_start).unwrap_or(entry);
    let inner = entry.trim_matches(QUOTE_CHARS);
    if inner.is_empty() {
        return None;
    }

    match inner.strip_prefix(SUFFIX_SIGIL) {
        Some(value) if !value.is_empty() => Some((MatchType::DomainSuffix, value.to_string())),
        Some(_) => None,
        None => Some((MatchType::Domain, inner.to_string())),
    }
}

/// Payload → Policy：带 `+.` 标记 → `DOMAIN-SUFFIX,v,P`，否则 → `DOMAIN,v,P`
pub fn payload_entry_to_policy(entry: &str, policy: &str) -> Option<String> {
    decode_payload_entry(entry)
        .map(|(match_type, value)| format_policy_line(match_type, &value, policy))
}

/// List/Policy → Policy：已带类型前缀的行追加或替换末尾策略；无前缀的行按 DOMAIN-SUFFIX 处理
/// 未知类型前缀返回 None
pub fn list_line_to_policy(line: &str, policy: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    match line.split_once(',') {
        Some((head, rest)) => {
            let match_type = MatchType::parse_token(head)?;
            let value = rest.split(',').next().unwrap_or_default().trim();
            if value.is_empty() {
                return None;
            }
            Some(format_policy_line(match_type, value, policy))
        }
        None => Some(format_policy_line(MatchType::DomainSuffix, line, policy)),
    }
}

/// List 方言单行
pub fn rule_to_list(rule: &CanonicalRule) -> String {
    format!("{},{}", rule.match_type, rule.value)
}

/// Policy 方言单行
pub fn rule_to_policy(rule: &CanonicalRule, policy: &str) -> String {
    format_policy_line(rule.match_type, &rule.value, policy)
}

fn format_policy_line(match_type: MatchType, value: &str, policy: &str) -> String {
    format!("{},{},{}", match_type, value, policy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_to_payload() {
        assert_eq!(to_payload_entry(MatchType::Domain, "a.com").as_deref(), Some("'a.com'"));
        assert_eq!(
            to_payload_entry(MatchType::DomainSuffix, "b.com").as_deref(),
            Some("'+.b.com'")
        );
        assert_eq!(to_payload_entry(MatchType::IpCidr, "10.0.0.0/8"), None);
        assert_eq!(to_payload_entry(MatchType::DomainKeyword, "google"), None);
    }

    #[test]
    fn test_payload_to_policy() {
        assert_eq!(
            payload_entry_to_policy("  '+.b.com'", "PROXY").as_deref(),
            Some("DOMAIN-SUFFIX,b.com,PROXY")
        );
        assert_eq!(
            payload_entry_to_policy("  - 'a.com'", "DIRECT").as_deref(),
            Some("DOMAIN,a.com,DIRECT")
        );
        assert_eq!(payload_entry_to_policy("''", "DIRECT"), None);
        assert_eq!(payload_entry_to_policy("'+.'", "DIRECT"), None);
    }

    #[test]
    fn test_list_line_to_policy() {
        assert_eq!(
            list_line_to_policy("DOMAIN,a.com", "PROXY").as_deref(),
            Some("DOMAIN,a.com,PROXY")
        );
        assert_eq!(
            list_line_to_policy("IP-CIDR,1.0.0.0/8,DIRECT", "REJECT").as_deref(),
            Some("IP-CIDR,1.0.0.0/8,REJECT")
        );
        assert_eq!(
            list_line_to_policy("b.com", "PROXY").as_deref(),
            Some("DOMAIN-SUFFIX,b.com,PROXY")
        );
        assert_eq!(list_line_to_policy("GEOIP,CN,DIRECT", "PROXY"), None);
    }

    #[test]
    fn test_round_trip_domain_suffix() {
        let entry = to_payload_entry(MatchType::DomainSuffix, "example.com").unwrap();
        assert_eq!(
            payload_entry_to_policy(&entry, "PROXY").as_deref(),
            Some("DOMAIN-SUFFIX,example.com,PROXY")
        );
    }
}
