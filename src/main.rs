//! rulemerge 命令行入口
//!
//! 运行命令：
//! cargo run -- --custom custom_rules.list --output rules --verbose

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use env_logger::{Builder, Env, Target};
use rulemerge::{CustomConfigBuilder, RetryPolicy, RulePipeline, RuleSetConfig};

/// 分流规则聚合：多源拉取、规范化、优先级合并、多格式输出
#[derive(Parser, Debug)]
#[command(name = "rulemerge", version, about)]
struct Cli {
    /// 配置文件（JSON / YAML），缺省使用内置规则源表
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 自定义规则文件（按分类注释分节）
    #[arg(long)]
    custom: Option<PathBuf>,

    /// 输出目录
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// 并发拉取上限
    #[arg(long)]
    concurrency: Option<usize>,

    /// HTTP 超时（秒）
    #[arg(long)]
    timeout: Option<u64>,

    /// 失败重试次数（0 表示不重试）
    #[arg(long)]
    retry: Option<u8>,

    /// GitHub 代理 URL，如 https://ghfast.top/
    #[arg(long)]
    gh_proxy: Option<String>,

    /// 输出调试日志
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// 配置文件 + 命令行覆盖项
    fn build_config(&self) -> anyhow::Result<RuleSetConfig> {
        let base = match &self.config {
            Some(path) => RuleSetConfig::from_file(path)
                .with_context(|| format!("invalid config file {}", path.display()))?,
            None => RuleSetConfig::default(),
        };

        let mut builder = CustomConfigBuilder::from_config(base);
        if let Some(path) = &self.custom {
            builder = builder.custom_rules_path(path);
        }
        if let Some(dir) = &self.output {
            builder = builder.output_dir(dir);
        }
        if let Some(concurrency) = self.concurrency {
            builder = builder.concurrency(concurrency);
        }
        if let Some(secs) = self.timeout {
            builder = builder.timeout_secs(secs);
        }
        if let Some(retry) = self.retry {
            builder = builder.retry(match retry {
                0 => RetryPolicy::Never,
                n => RetryPolicy::Times(n),
            });
        }
        if let Some(url) = &self.gh_proxy {
            builder = builder.gh_proxy_url(url);
        }

        let config = builder.build();
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    Builder::from_env(Env::default().default_filter_or(default_level))
        .target(Target::Stdout)
        .init();

    let config = cli.build_config()?;
    let pipeline = RulePipeline::with_http(config)?;
    let report = pipeline.run().await?;

    for path in &report.written {
        println!("Generated {}", path.display());
    }
    for failure in &report.failed_sources {
        eprintln!("Error processing {}: {}", failure.url, failure.error);
    }
    for failure in &report.failed_writes {
        eprintln!("Error writing {}: {}", failure.path.display(), failure.error);
    }
    Ok(())
}
