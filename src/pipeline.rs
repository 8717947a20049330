//! 规则聚合流水线
//! 拉取 → 逐分类规范化与合并 → 跨分类对账 → 编码 → 写入

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use rulemerge_engine::{
    encode, reconcile, CategoryRuleSet, CleanStats, CustomSections, OutputDialect, PolicyMap,
    RuleProcessor,
};
use rustc_hash::FxHashMap;

use crate::config::RuleSetConfig;
use crate::error::RmResult;
use crate::rule::loader::{build_remote_sources, load_custom_rules, FetchFailure, RuleLoader, SourceFetcher};
use crate::rule::writer::{OutputFile, RuleWriter, WriteFailure};

/// 单分类输出方言
const CATEGORY_DIALECTS: [OutputDialect; 2] = [OutputDialect::Payload, OutputDialect::List];

/// 流水线执行结果
#[derive(Debug, Default)]
pub struct PipelineReport {
    /// 成功写入的文件
    pub written: Vec<PathBuf>,
    /// 无可用规则而跳过输出的分类
    pub skipped_categories: Vec<String>,
    pub failed_sources: Vec<FetchFailure>,
    pub failed_writes: Vec<WriteFailure>,
    /// 各分类统计（配置顺序）
    pub stats: Vec<(String, CleanStats)>,
    /// 统一输出中被高优先级分类覆盖的规则数
    pub unified_suppressed: usize,
}

impl PipelineReport {
    pub fn has_failures(&self) -> bool {
        !self.failed_sources.is_empty() || !self.failed_writes.is_empty()
    }
}

/// 规则聚合流水线
pub struct RulePipeline {
    config: RuleSetConfig,
    loader: RuleLoader,
    processor: RuleProcessor,
}

impl RulePipeline {
    /// 使用指定拉取器构建流水线，配置非法时返回 ConfigError
    pub fn new(config: RuleSetConfig, fetcher: Arc<dyn SourceFetcher>) -> RmResult<Self> {
        config.validate()?;
        let loader = RuleLoader::new(fetcher, &config.fetch);
        Ok(Self {
            config,
            loader,
            processor: RuleProcessor::new(),
        })
    }

    /// 使用 HTTP 拉取器构建流水线
    #[cfg(feature = "remote-loader")]
    pub fn with_http(config: RuleSetConfig) -> RmResult<Self> {
        config.validate()?;
        let loader = RuleLoader::http(&config.fetch)?;
        Ok(Self {
            config,
            loader,
            processor: RuleProcessor::new(),
        })
    }

    pub fn config(&self) -> &RuleSetConfig {
        &self.config
    }

    /// 执行完整流水线
    /// 只有配置类错误（含自定义规则文件不可读）与输出目录不可用会返回 Err，
    /// 单个规则源 / 单个文件的失败记录在 PipelineReport 中
    pub async fn run(&self) -> RmResult<PipelineReport> {
        let start = Instant::now();
        let mut report = PipelineReport::default();

        let custom = self.load_custom().await?;
        let mut fetched = self
            .loader
            .fetch_all(build_remote_sources(&self.config))
            .await;
        report.failed_sources = std::mem::take(&mut fetched.failures);

        let policies = self.policies();
        let mut files = Vec::new();
        let mut built: FxHashMap<String, CategoryRuleSet> = FxHashMap::default();
        let mut totals = CleanStats::default();

        for category in &self.config.categories {
            let name = category.name.as_str();
            let records = fetched.take(name);
            let build = self
                .processor
                .build_category(name, &records, custom.lines_for(name));
            totals.absorb(&build.stats);
            report.stats.push((name.to_string(), build.stats.clone()));

            if build.rules.is_empty() {
                log::warn!("No valid rules found for [{}]. Skipping.", name);
                report.skipped_categories.push(name.to_string());
                continue;
            }

            log::info!(
                "[{}] {} rule(s) ({} custom) from {} source(s), {} line(s) rejected",
                name,
                build.rules.len(),
                build.rules.custom_count(),
                records.len(),
                build.stats.rejected_meaningful()
            );
            for dialect in CATEGORY_DIALECTS {
                files.push(OutputFile::new(
                    format!("{}.{}", name, dialect.file_suffix()),
                    encode(build.rules.rules(), dialect, &policies),
                ));
            }
            built.insert(name.to_string(), build.rules);
        }

        if let Some(unified) = &self.config.unified {
            let ordered: Vec<&CategoryRuleSet> = unified
                .categories
                .iter()
                .filter_map(|name| built.get(name))
                .collect();
            let reconciled = reconcile(ordered);
            report.unified_suppressed = reconciled.suppressed;

            if reconciled.is_empty() {
                log::warn!("No valid rules found for [{}]. Skipping.", unified.name);
                report.skipped_categories.push(unified.name.clone());
            } else {
                log::info!(
                    "[{}] {} rule(s), {} suppressed by higher-priority categories",
                    unified.name,
                    reconciled.len(),
                    reconciled.suppressed
                );
                files.push(OutputFile::new(
                    format!("{}.{}", unified.name, OutputDialect::Policy.file_suffix()),
                    encode(reconciled.rules(), OutputDialect::Policy, &unified.policies),
                ));
            }
        }

        let writer = RuleWriter::new(&self.config.output_dir);
        writer.prepare().await?;
        let (written, failed_writes) = writer.write_all(&files).await;
        report.written = written;
        report.failed_writes = failed_writes;

        log::debug!(
            "Totals: {} line(s), {} accepted, {} rejected, {} duplicate(s) dropped",
            totals.total_lines,
            totals.accepted_lines,
            totals.rejected_meaningful(),
            totals.duplicates_dropped
        );
        log::info!(
            "Pipeline finished in {:?}: {} file(s) written, {} skipped, {} source failure(s), {} write failure(s)",
            start.elapsed(),
            report.written.len(),
            report.skipped_categories.len(),
            report.failed_sources.len(),
            report.failed_writes.len()
        );
        Ok(report)
    }

    async fn load_custom(&self) -> RmResult<CustomSections> {
        match &self.config.custom_rules_path {
            Some(path) => load_custom_rules(path, &self.config.category_names()).await,
            None => Ok(CustomSections::default()),
        }
    }

    fn policies(&self) -> PolicyMap {
        self.config
            .unified
            .as_ref()
            .map(|unified| unified.policies.clone())
            .unwrap_or_default()
    }
}
