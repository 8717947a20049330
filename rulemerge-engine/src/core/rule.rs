use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

use super::enums::{MatchType, RuleOrigin};

/// 去重键：`(match_type, value)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleKey {
    pub match_type: MatchType,
    pub value: String,
}

/// 标准化后的单条分流规则
/// 1. value 已移除引号、前导符号、行内注释等装饰
/// 2. category 为规则所属分类（如 Direct / Proxy）
/// 3. origin 标记规则来自用户自定义还是远程源
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanonicalRule {
    pub match_type: MatchType,
    pub value: String,
    pub category: String,
    pub origin: RuleOrigin,
}

impl CanonicalRule {
    pub fn new(
        match_type: MatchType,
        value: impl Into<String>,
        category: impl Into<String>,
        origin: RuleOrigin,
    ) -> Self {
        Self {
            match_type,
            value: value.into(),
            category: category.into(),
            origin,
        }
    }

    /// 生成去重键
    pub fn key(&self) -> RuleKey {
        RuleKey {
            match_type: self.match_type,
            value: self.value.clone(),
        }
    }

    pub fn is_custom(&self) -> bool {
        self.origin == RuleOrigin::Custom
    }

    /// 排序比较：先类型前缀字典序，再 value 字典序
    pub fn cmp_by_key(&self, other: &Self) -> Ordering {
        self.match_type
            .cmp(&other.match_type)
            .then_with(|| self.value.cmp(&other.value))
    }
}

// List 方言形式：TYPE,value
impl Display for CanonicalRule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.match_type, self.value)
    }
}

/// 单个分类的规则集合（有序、按去重键唯一）
/// 仅由合并器构建，构建完成后只读
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryRuleSet {
    pub category: String,
    pub(crate) rules: Vec<CanonicalRule>,
}

impl CategoryRuleSet {
    pub(crate) fn from_ordered(category: impl Into<String>, rules: Vec<CanonicalRule>) -> Self {
        Self {
            category: category.into(),
            rules,
        }
    }

    pub fn rules(&self) -> &[CanonicalRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CanonicalRule> {
        self.rules.iter()
    }

    /// 自定义规则数量
    pub fn custom_count(&self) -> usize {
        self.rules.iter().filter(|r| r.is_custom()).count()
    }

    pub fn into_rules(self) -> Vec<CanonicalRule> {
        self.rules
    }
}

impl<'a> IntoIterator for &'a CategoryRuleSet {
    type Item = &'a CanonicalRule;
    type IntoIter = std::slice::Iter<'a, CanonicalRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
