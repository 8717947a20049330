//! 并发规则源加载
//! 有界并发（Semaphore）拉取全部远程源，单个源失败不影响其它源，
//! 全部任务结束后按分类汇总 SourceRecord

use std::sync::Arc;
use std::time::Instant;

use rulemerge_engine::SourceRecord;
use rustc_hash::FxHashMap;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use super::remote_fetcher::SourceFetcher;
use super::remote_source::RemoteRuleSource;
use crate::config::FetchOptions;
use crate::error::{RmResult, RuleMergeError};

/// 单个规则源的拉取失败记录
#[derive(Debug, Clone)]
pub struct FetchFailure {
    pub category: String,
    pub url: String,
    pub error: String,
}

/// 拉取汇总
#[derive(Debug, Default)]
pub struct FetchReport {
    /// 分类 → 拉取成功的规则源（保持配置顺序）
    pub records: FxHashMap<String, Vec<SourceRecord>>,
    pub failures: Vec<FetchFailure>,
}

impl FetchReport {
    /// 取出分类的规则源，无则返回空
    pub fn take(&mut self, category: &str) -> Vec<SourceRecord> {
        self.records.remove(category).unwrap_or_default()
    }

    pub fn success_count(&self) -> usize {
        self.records.values().map(Vec::len).sum()
    }
}

/// 规则加载器
#[derive(Clone)]
pub struct RuleLoader {
    fetcher: Arc<dyn SourceFetcher>,
    concurrency: usize,
    gh_proxy_url: Option<String>,
}

impl RuleLoader {
    pub fn new(fetcher: Arc<dyn SourceFetcher>, options: &FetchOptions) -> Self {
        Self {
            fetcher,
            concurrency: options.concurrency.max(1),
            gh_proxy_url: options.gh_proxy_url.clone(),
        }
    }

    /// 基于 HTTP 拉取器构建
    #[cfg(feature = "remote-loader")]
    pub fn http(options: &FetchOptions) -> RmResult<Self> {
        let fetcher = super::remote_fetcher::HttpFetcher::new(options)?;
        Ok(Self::new(Arc::new(fetcher), options))
    }

    /// 并发拉取全部规则源
    pub async fn fetch_all(&self, sources: Vec<RemoteRuleSource>) -> FetchReport {
        let start = Instant::now();
        let total = sources.len();
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();
        // 任务 panic / 被取消时 JoinError 不带返回值，按下标回填失败记录
        let mut pending: Vec<Option<RemoteRuleSource>> = Vec::with_capacity(total);

        for (index, source) in sources.into_iter().enumerate() {
            let semaphore = semaphore.clone();
            let fetcher = self.fetcher.clone();
            let gh_proxy_url = self.gh_proxy_url.clone();
            pending.push(Some(source.clone()));

            tasks.spawn(async move {
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) => fetch_one(fetcher.as_ref(), &source, gh_proxy_url.as_deref()).await,
                    Err(e) => Err(RuleMergeError::AsyncTaskError(format!(
                        "fetch pool closed: {}",
                        e
                    ))),
                };
                (index, source, result)
            });
        }

        // 全部任务结束后再汇总
        let mut finished = Vec::with_capacity(total);
        let mut aborted = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(item) => {
                    pending[item.0] = None;
                    finished.push(item);
                }
                Err(e) => {
                    log::error!("Fetch task aborted: {}", e);
                    aborted.push(e.to_string());
                }
            }
        }

        let reason = aborted.join("; ");
        for (index, source) in pending.into_iter().enumerate() {
            if let Some(source) = source {
                finished.push((
                    index,
                    source,
                    Err(RuleMergeError::AsyncTaskError(format!(
                        "fetch task aborted: {}",
                        reason
                    ))),
                ));
            }
        }
        finished.sort_by_key(|(index, _, _)| *index);

        let mut report = FetchReport::default();
        for (_, source, result) in finished {
            match result {
                Ok(record) => report
                    .records
                    .entry(source.category)
                    .or_default()
                    .push(record),
                Err(e) => {
                    log::warn!("Skip source [{}] {}: {}", source.category, source.raw_url, e);
                    report.failures.push(FetchFailure {
                        category: source.category,
                        url: source.raw_url,
                        error: e.to_string(),
                    });
                }
            }
        }

        log::info!(
            "Fetched {}/{} source(s) in {:?} ({} failed)",
            report.success_count(),
            total,
            start.elapsed(),
            report.failures.len()
        );
        report
    }
}

/// 拉取单个规则源：原始地址失败且配置了 GitHub 代理时经代理重试
async fn fetch_one(
    fetcher: &dyn SourceFetcher,
    source: &RemoteRuleSource,
    gh_proxy_url: Option<&str>,
) -> RmResult<SourceRecord> {
    log::debug!("Fetching [{}] {}", source.category, source.raw_url);

    let content = match fetcher.fetch_text(&source.raw_url).await {
        Ok(content) => content,
        Err(e) => match source.proxied_url(gh_proxy_url) {
            Some(fallback_url) => {
                log::warn!(
                    "Fetch {} failed: {}, trying proxy URL {}",
                    source.raw_url,
                    e,
                    fallback_url
                );
                fetcher.fetch_text(&fallback_url).await?
            }
            None => return Err(e),
        },
    };

    let dialect = source.resolve_dialect(&content)?;
    Ok(SourceRecord::new(content, dialect, source.label()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::loader::remote_fetcher::StaticFetcher;
    use rulemerge_engine::SourceDialect;

    const PROXY_URL: &str = "https://raw.githubusercontent.com/x/rules/release/proxy.txt";

    fn options(gh_proxy_url: Option<&str>) -> FetchOptions {
        FetchOptions {
            concurrency: 2,
            gh_proxy_url: gh_proxy_url.map(String::from),
            ..FetchOptions::default()
        }
    }

    #[tokio::test]
    async fn test_fetch_all_isolates_failures() {
        let fetcher = StaticFetcher::default()
            .with("https://example.com/a.list", "DOMAIN,a.com\n")
            .with("https://example.com/b.yaml", "payload:\n  - '+.b.com'\n")
            .with("https://example.com/c.json", "{}");
        let loader = RuleLoader::new(Arc::new(fetcher), &options(None));

        let mut report = loader
            .fetch_all(vec![
                RemoteRuleSource::new("Direct", "https://example.com/a.list", None),
                RemoteRuleSource::new("Direct", "https://example.com/missing.list", None),
                RemoteRuleSource::new("Proxy", "https://example.com/b.yaml", None),
                RemoteRuleSource::new("Proxy", "https://example.com/c.json", None),
            ])
            .await;

        assert_eq!(report.failures.len(), 2);
        let direct = report.take("Direct");
        assert_eq!(direct.len(), 1);
        assert_eq!(direct[0].dialect, SourceDialect::List);
        assert_eq!(direct[0].label, "Direct/a.list");

        let proxy = report.take("Proxy");
        assert_eq!(proxy.len(), 1);
        assert_eq!(proxy[0].dialect, SourceDialect::Payload);
        assert!(report.take("Reject").is_empty());
    }

    #[tokio::test]
    async fn test_fetch_falls_back_to_gh_proxy() {
        let proxied = format!("https://ghfast.top/{}", PROXY_URL.trim_start_matches("https://"));
        let fetcher = StaticFetcher::default().with(&proxied, "payload:\n  - 'a.com'\n");
        let loader = RuleLoader::new(Arc::new(fetcher.clone()), &options(Some("https://ghfast.top/")));

        let mut report = loader
            .fetch_all(vec![RemoteRuleSource::new("Proxy", PROXY_URL, None)])
            .await;
        assert!(report.failures.is_empty());
        assert_eq!(report.take("Proxy").len(), 1);

        let no_proxy = RuleLoader::new(Arc::new(fetcher), &options(None));
        let report = no_proxy
            .fetch_all(vec![RemoteRuleSource::new("Proxy", PROXY_URL, None)])
            .await;
        assert_eq!(report.failures.len(), 1);
    }

    /// 指定 URL 拉取时 panic 的拉取器
    struct PanickingFetcher {
        inner: StaticFetcher,
        poisoned: &'static str,
    }

    #[async_trait::async_trait]
    impl SourceFetcher for PanickingFetcher {
        async fn fetch_text(&self, url: &str) -> RmResult<String> {
            if url == self.poisoned {
                panic!("fetcher crashed on {}", url);
            }
            self.inner.fetch_text(url).await
        }
    }

    #[tokio::test]
    async fn test_panicked_task_is_reported_as_failure() {
        let fetcher = PanickingFetcher {
            inner: StaticFetcher::default().with("https://example.com/a.list", "DOMAIN,a.com\n"),
            poisoned: "https://example.com/crash.list",
        };
        let loader = RuleLoader::new(Arc::new(fetcher), &options(None));

        let mut report = loader
            .fetch_all(vec![
                RemoteRuleSource::new("Direct", "https://example.com/a.list", None),
                RemoteRuleSource::new("Direct", "https://example.com/crash.list", None),
            ])
            .await;

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].url, "https://example.com/crash.list");
        assert_eq!(report.failures[0].category, "Direct");
        assert!(report.failures[0].error.contains("aborted"));
        assert_eq!(report.take("Direct").len(), 1);
    }
}
