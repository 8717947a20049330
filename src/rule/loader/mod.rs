//! 规则加载模块
//! 统一导出规则加载相关组件
pub mod custom_loader;
pub mod remote_fetcher;
pub mod remote_source;
pub mod rule_loader;

// 导出远程源相关
pub use remote_source::{build_remote_sources, RemoteRuleSource};

// 导出拉取器
#[cfg(feature = "remote-loader")]
pub use remote_fetcher::HttpFetcher;
pub use remote_fetcher::SourceFetcher;

// 导出加载器
pub use custom_loader::load_custom_rules;
pub use rule_loader::{FetchFailure, FetchReport, RuleLoader};
