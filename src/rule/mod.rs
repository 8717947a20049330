//! 规则模块：负责规则源加载与输出写入
pub mod loader;
pub mod writer;

// 统一导出核心公共接口
pub use loader::{RemoteRuleSource, RuleLoader, SourceFetcher};
pub use writer::{OutputFile, RuleWriter, WriteFailure};
