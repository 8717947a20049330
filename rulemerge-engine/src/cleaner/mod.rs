//! 规则清理模块
//! 负责剥离注释与装饰字符、拒绝非规则行、推断规则类型，
//! 为后续合并提供干净的 CanonicalRule

pub mod clean_stats;
pub mod decoration;
pub mod line_normalizer;

pub use clean_stats::CleanStats;
pub use decoration::{strip_comment, trim_decoration, Trimmed};
pub use line_normalizer::{LineNormalizer, RejectReason};
