mod enums;
mod rule;
mod source;

// 导出常用项
pub use enums::{MatchType, OutputDialect, RuleOrigin, SourceDialect};
pub use rule::{CanonicalRule, CategoryRuleSet, RuleKey};
pub use source::SourceRecord;
