//! rulemerge - 分流规则聚合工具
//! 多源拉取 → 规范化 → 优先级合并 → 跨分类对账 → 多格式输出

pub mod config;
pub mod error;
pub mod pipeline;
pub mod rule;

// 导出全局错误类型
pub use self::error::{RmResult, RuleMergeError};

// 导出配置模块核心结构体与构建器
pub use crate::config::{
    CategoryConfig, CategorySource, CustomConfigBuilder, FetchOptions, RetryPolicy, RuleSetConfig,
    UnifiedOutput,
};

// 导出流水线
pub use crate::pipeline::{PipelineReport, RulePipeline};

// 导出规则加载与写入接口
pub use crate::rule::{OutputFile, RemoteRuleSource, RuleLoader, RuleWriter, SourceFetcher};

// 内核常用类型
pub use rulemerge_engine::{
    CanonicalRule, CategoryRuleSet, MatchType, OutputDialect, PolicyMap, RuleOrigin, SourceDialect,
};
