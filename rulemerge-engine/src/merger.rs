//! 优先级合并：自定义规则 + 远程规则 → 单分类规则集
//!
//! 排序策略：自定义规则整体在前，保持文件内原始顺序；
//! 远程规则去重后按 `(类型前缀, value)` 字典序排在其后。
//! 远程规则的到达顺序不影响最终结果。

use rustc_hash::FxHashSet;

use crate::core::{CanonicalRule, CategoryRuleSet, RuleKey};

/// 合并单个分类的规则
/// - custom: 自定义规则，全部保留（自身重复只保留首次出现）
/// - remote: 远程规则，与已收录规则去重键相同时丢弃
pub fn merge<C, R>(category: &str, custom: C, remote: R) -> CategoryRuleSet
where
    C: IntoIterator<Item = CanonicalRule>,
    R: IntoIterator<Item = CanonicalRule>,
{
    let mut seen: FxHashSet<RuleKey> = FxHashSet::default();

    let mut merged: Vec<CanonicalRule> = custom
        .into_iter()
        .filter(|rule| seen.insert(rule.key()))
        .collect();

    let mut remainder: Vec<CanonicalRule> = remote
        .into_iter()
        .filter(|rule| seen.insert(rule.key()))
        .collect();
    remainder.sort_by(CanonicalRule::cmp_by_key);

    merged.extend(remainder);
    CategoryRuleSet::from_ordered(category, merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{MatchType, RuleOrigin};

    fn custom(t: MatchType, v: &str) -> CanonicalRule {
        CanonicalRule::new(t, v, "Direct", RuleOrigin::Custom)
    }

    fn remote(t: MatchType, v: &str) -> CanonicalRule {
        CanonicalRule::new(t, v, "Direct", RuleOrigin::Remote)
    }

    fn keys(set: &CategoryRuleSet) -> Vec<String> {
        set.iter().map(|r| r.to_string()).collect()
    }

    #[test]
    fn test_custom_wins_and_is_listed_first() {
        let set = merge(
            "Direct",
            vec![custom(MatchType::DomainSuffix, "b.com")],
            vec![remote(MatchType::DomainSuffix, "b.com"), remote(MatchType::Domain, "c.com")],
        );

        assert_eq!(keys(&set), ["DOMAIN-SUFFIX,b.com", "DOMAIN,c.com"]);
        assert_eq!(set.rules()[0].origin, RuleOrigin::Custom);
        assert_eq!(set.rules()[1].origin, RuleOrigin::Remote);
        assert_eq!(set.custom_count(), 1);
    }

    #[test]
    fn test_custom_order_is_preserved() {
        let set = merge(
            "Direct",
            vec![
                custom(MatchType::DomainSuffix, "z.com"),
                custom(MatchType::Domain, "a.com"),
                custom(MatchType::DomainSuffix, "z.com"),
            ],
            vec![remote(MatchType::Domain, "m.com"), remote(MatchType::Domain, "b.com")],
        );
        assert_eq!(
            keys(&set),
            ["DOMAIN-SUFFIX,z.com", "DOMAIN,a.com", "DOMAIN,b.com", "DOMAIN,m.com"]
        );
    }

    #[test]
    fn test_no_duplicate_keys() {
        let set = merge(
            "Direct",
            vec![],
            vec![
                remote(MatchType::Domain, "a.com"),
                remote(MatchType::DomainSuffix, "a.com"),
                remote(MatchType::Domain, "a.com"),
                remote(MatchType::IpCidr, "10.0.0.0/8"),
                remote(MatchType::IpCidr, "10.0.0.0/8"),
            ],
        );
        let unique: FxHashSet<RuleKey> = set.iter().map(CanonicalRule::key).collect();
        assert_eq!(unique.len(), set.len());
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_remote_arrival_order_is_not_observable() {
        let a = vec![
            remote(MatchType::IpCidr, "10.0.0.0/8"),
            remote(MatchType::Domain, "x.com"),
            remote(MatchType::DomainSuffix, "b.com"),
            remote(MatchType::Domain, "a.com"),
        ];
        let mut b = a.clone();
        b.reverse();
        b.push(remote(MatchType::Domain, "x.com"));

        assert_eq!(merge("Direct", vec![], a), merge("Direct", vec![], b));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let first = merge(
            "Direct",
            vec![custom(MatchType::DomainSuffix, "z.com")],
            vec![remote(MatchType::Domain, "c.com"), remote(MatchType::DomainSuffix, "z.com")],
        );
        let second = merge("Direct", vec![], first.rules().to_vec());

        let first_keys: FxHashSet<RuleKey> = first.iter().map(CanonicalRule::key).collect();
        let second_keys: FxHashSet<RuleKey> = second.iter().map(CanonicalRule::key).collect();
        assert_eq!(first_keys, second_keys);

        // 不含自定义规则时，重复合并逐字节一致
        let third = merge("Direct", vec![], second.rules().to_vec());
        assert_eq!(second, third);
    }
}
