//! 跨分类对账：按优先级顺序处理多个分类规则集，生成统一输出
//! 自定义规则先于全部远程规则参与去重：自定义规则只会被更高优先级分类的自定义规则覆盖，
//! 远程规则被任何已保留的规则覆盖；同一轮内去重键只保留首个（优先级最高）分类中的那条。
//! 输出排序与合并器一致：存活的自定义规则在前，其余远程规则整体按 `(类型前缀, value)` 排序

use rustc_hash::FxHashSet;

use crate::core::{CanonicalRule, CategoryRuleSet, RuleKey};

/// 对账结果：跨分类去重后的统一规则序列
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconciledRuleSet {
    rules: Vec<CanonicalRule>,
    /// 被更高优先级分类覆盖的规则数
    pub suppressed: usize,
}

impl ReconciledRuleSet {
    pub fn rules(&self) -> &[CanonicalRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn into_rules(self) -> Vec<CanonicalRule> {
        self.rules
    }
}

/// 按给定优先级顺序对账，规则的 category 字段保留其来源分类
pub fn reconcile<'a, I>(ordered: I) -> ReconciledRuleSet
where
    I: IntoIterator<Item = &'a CategoryRuleSet>,
{
    let ordered: Vec<&CategoryRuleSet> = ordered.into_iter().collect();
    let mut seen: FxHashSet<RuleKey> = FxHashSet::default();
    let mut kept = vec![0usize; ordered.len()];
    let mut custom = Vec::new();
    let mut remote = Vec::new();
    let mut suppressed = 0usize;

    // 第一轮：全部分类的自定义规则
    for (index, set) in ordered.iter().enumerate() {
        for rule in set.iter().filter(|r| r.is_custom()) {
            if seen.insert(rule.key()) {
                kept[index] += 1;
                custom.push(rule.clone());
            } else {
                suppressed += 1;
            }
        }
    }

    // 第二轮：远程规则
    for (index, set) in ordered.iter().enumerate() {
        for rule in set.iter().filter(|r| !r.is_custom()) {
            if seen.insert(rule.key()) {
                kept[index] += 1;
                remote.push(rule.clone());
            } else {
                suppressed += 1;
            }
        }
        log::trace!(
            "Reconcile [{}]: kept {} of {} rule(s)",
            set.category,
            kept[index],
            set.len()
        );
    }

    // 去重键唯一，sort_by 的结果与到达顺序无关
    remote.sort_by(CanonicalRule::cmp_by_key);
    custom.extend(remote);

    ReconciledRuleSet {
        rules: custom,
        suppressed,
    }
}
