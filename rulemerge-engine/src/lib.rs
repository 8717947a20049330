// 核心公共结构体+枚举
pub mod core;
// 内核错误定义
pub mod error;
// 规则源解析（方言识别 / Payload 文档 / 自定义规则分节）
pub mod source;
// 规则清洗子模块（逐行规范化）
pub mod cleaner;
// 方言转换
pub mod adapter;
// 单分类优先级合并
pub mod merger;
// 跨分类对账
pub mod reconciler;
// 输出编码
pub mod encoder;
// 规范化 + 合并 + 统计
pub mod processor;
// 日志辅助
pub mod utils;

// 顶层导出常用类型
pub use core::{
    CanonicalRule, CategoryRuleSet, MatchType, OutputDialect, RuleKey, RuleOrigin, SourceDialect,
    SourceRecord,
};
pub use cleaner::{CleanStats, LineNormalizer, RejectReason};
pub use encoder::{decode_payload, encode, PolicyMap};
pub use error::{CoreError, CoreResult};
pub use merger::merge;
pub use processor::{CategoryBuild, RuleProcessor};
pub use reconciler::{reconcile, ReconciledRuleSet};
pub use source::{infer_dialect, parse_custom_sections, CustomSections};
