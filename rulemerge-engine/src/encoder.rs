//! 输出编码：规则序列 → List / Payload / Policy 文本
//! 编码不改变规则顺序

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::adapter::{decode_payload_entry, rule_to_list, rule_to_policy, to_payload_entry};
use crate::core::{CanonicalRule, MatchType, OutputDialect};
use crate::error::{CoreError, CoreResult};

const PAYLOAD_HEADER: &str = "payload:";
const PAYLOAD_INDENT: &str = "  ";

/// 分类 → 策略名映射
/// 未配置的分类使用分类名大写作为策略（Direct → DIRECT）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyMap {
    overrides: FxHashMap<String, String>,
}

impl PolicyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为分类指定固定策略（链式调用）
    pub fn with_override(mut self, category: impl Into<String>, policy: impl Into<String>) -> Self {
        self.insert(category, policy);
        self
    }

    pub fn insert(&mut self, category: impl Into<String>, policy: impl Into<String>) {
        self.overrides.insert(category.into(), policy.into());
    }

    /// 解析分类对应的策略名
    pub fn resolve(&self, category: &str) -> String {
        match self.overrides.get(category) {
            Some(policy) => policy.clone(),
            None => category.to_ascii_uppercase(),
        }
    }
}

/// 按方言编码规则序列
pub fn encode(rules: &[CanonicalRule], dialect: OutputDialect, policies: &PolicyMap) -> String {
    match dialect {
        OutputDialect::Payload => encode_payload(rules),
        OutputDialect::List => encode_list(rules),
        OutputDialect::Policy => encode_policy(rules, policies),
    }
}

/// Payload 方言：只输出域名类规则，其它类型静默跳过
pub fn encode_payload(rules: &[CanonicalRule]) -> String {
    let mut out = String::with_capacity(PAYLOAD_HEADER.len() + rules.len() * 24);
    out.push_str(PAYLOAD_HEADER);
    out.push('\n');

    let mut skipped = 0usize;
    for rule in rules {
        match to_payload_entry(rule.match_type, &rule.value) {
            Some(entry) => {
                out.push_str(PAYLOAD_INDENT);
                out.push_str(&entry);
                out.push('\n');
            }
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        log::trace!("Payload encode: {} non-domain rule(s) not representable", skipped);
    }
    out
}

pub fn encode_list(rules: &[CanonicalRule]) -> String {
    let mut out = String::with_capacity(rules.len() * 32);
    for rule in rules {
        out.push_str(&rule_to_list(rule));
        out.push('\n');
    }
    out
}

/// Policy 方言：策略名按规则自身的 category 解析
pub fn encode_policy(rules: &[CanonicalRule], policies: &PolicyMap) -> String {
    let mut out = String::with_capacity(rules.len() * 40);
    for rule in rules {
        let policy = policies.resolve(&rule.category);
        out.push_str(&rule_to_policy(rule, &policy));
        out.push('\n');
    }
    out
}

/// 解析 Payload 文档为 `(类型, value)` 序列
/// 缺少 `payload:` 头或条目无法解码时返回 RuleParseError
pub fn decode_payload(text: &str) -> CoreResult<Vec<(MatchType, String)>> {
    let mut lines = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    match lines.next() {
        Some((_, line)) if line.trim().eq_ignore_ascii_case(PAYLOAD_HEADER) => {}
        Some((idx, line)) => {
            return Err(CoreError::RuleParseError(format!(
                "line {}: expected `{}` header, found `{}`",
                idx + 1,
                PAYLOAD_HEADER,
                line.trim()
            )))
        }
        None => {
            return Err(CoreError::RuleParseError(
                "empty payload document".to_string(),
            ))
        }
    }

    lines
        .map(|(idx, line)| {
            decode_payload_entry(line).ok_or_else(|| {
                CoreError::RuleParseError(format!("line {}: invalid payload entry `{}`", idx + 1, line.trim()))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RuleOrigin;

    fn rule(t: MatchType, v: &str, category: &str) -> CanonicalRule {
        CanonicalRule::new(t, v, category, RuleOrigin::Remote)
    }

    #[test]
    fn test_encode_payload() {
        let rules = vec![
            rule(MatchType::Domain, "a.com", "Direct"),
            rule(MatchType::DomainSuffix, "b.com", "Direct"),
            rule(MatchType::IpCidr, "10.0.0.0/8", "Direct"),
        ];
        assert_eq!(
            encode(&rules, OutputDialect::Payload, &PolicyMap::new()),
            "payload:\n  'a.com'\n  '+.b.com'\n"
        );
        assert_eq!(encode_payload(&[]), "payload:\n");
    }

    #[test]
    fn test_encode_list_keeps_all_types() {
        let rules = vec![
            rule(MatchType::DomainKeyword, "openai", "Ai"),
            rule(MatchType::IpCidr6, "2001:db8::/32", "Ai"),
        ];
        assert_eq!(
            encode(&rules, OutputDialect::List, &PolicyMap::new()),
            "DOMAIN-KEYWORD,openai\nIP-CIDR6,2001:db8::/32\n"
        );
    }

    #[test]
    fn test_encode_policy_with_override() {
        let policies = PolicyMap::new().with_override("Ai", "PROXY");
        let rules = vec![
            rule(MatchType::Domain, "x.com", "Proxy"),
            rule(MatchType::Domain, "y.com", "Ai"),
            rule(MatchType::IpCidr, "1.0.0.0/8", "Direct"),
        ];
        assert_eq!(
            encode(&rules, OutputDialect::Policy, &policies),
            "DOMAIN,x.com,PROXY\nDOMAIN,y.com,PROXY\nIP-CIDR,1.0.0.0/8,DIRECT\n"
        );
    }

    #[test]
    fn test_payload_round_trip() {
        let rules = vec![
            rule(MatchType::DomainSuffix, "example.com", "Proxy"),
            rule(MatchType::Domain, "api.example.com", "Proxy"),
        ];
        let decoded = decode_payload(&encode_payload(&rules)).unwrap();
        assert_eq!(
            decoded,
            vec![
                (MatchType::DomainSuffix, "example.com".to_string()),
                (MatchType::Domain, "api.example.com".to_string()),
            ]
        );
    }

    #[test]
    fn test_decode_payload_errors() {
        assert!(matches!(
            decode_payload("DOMAIN,a.com\n"),
            Err(CoreError::RuleParseError(_))
        ));
        assert!(decode_payload("").is_err());
        assert!(decode_payload("payload:\n  ''\n").is_err());
        assert!(decode_payload("payload:\n").unwrap().is_empty());
    }
}
