//! 配置模块：分类规则源表、拉取选项、统一输出
pub mod rule;

pub use rule::{
    CategoryConfig, CategorySource, CustomConfigBuilder, FetchOptions, RetryPolicy, RuleSetConfig,
    UnifiedOutput,
};
