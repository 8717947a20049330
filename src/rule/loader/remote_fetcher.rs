//! 远程规则拉取工具
//! 核心特性：
//! 1. 纯异步设计（基于tokio异步运行时）
//! 2. 可配置重试策略（Never/Times(n)）
//! 3. 拉取接口抽象为 SourceFetcher，便于替换实现
//! 4. 特性条件编译（remote-loader特性控制 HTTP 实现）

use async_trait::async_trait;

use crate::error::RmResult;
#[cfg(feature = "remote-loader")]
use crate::{
    config::{FetchOptions, RetryPolicy},
    error::RuleMergeError,
};
#[cfg(feature = "remote-loader")]
use reqwest::Client;

#[cfg(feature = "remote-loader")]
const USER_AGENT: &str = concat!("rulemerge/", env!("CARGO_PKG_VERSION"));

/// 规则源文本拉取接口
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// 拉取 URL 对应的原始文本
    async fn fetch_text(&self, url: &str) -> RmResult<String>;
}

/// 通用异步重试逻辑
/// - max_retries: 最大重试次数（0表示不重试）
/// - func: 异步闭包，返回RmResult<T>
///
/// 返回：执行结果 | 最后一次错误
#[cfg(feature = "remote-loader")]
pub(crate) async fn simple_retry<F, Fut, T>(max_retries: usize, mut func: F) -> RmResult<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = RmResult<T>> + Send + 'static,
{
    let mut last_err: Option<RuleMergeError> = None;

    for attempt in 0..=max_retries {
        match func().await {
            Ok(res) => return Ok(res),
            Err(e) => {
                if attempt < max_retries {
                    log::warn!(
                        "Request failed: {}, retrying (attempt {}/{})",
                        e,
                        attempt + 1,
                        max_retries
                    );
                    tokio::time::sleep(tokio::time::Duration::from_secs(1)).await;
                }
                last_err = Some(e);
            }
        }
    }

    Err(last_err.unwrap_or_else(|| {
        RuleMergeError::NetworkError("All retry attempts exhausted".to_string())
    }))
}

/// 基于 reqwest 的 HTTP 拉取器
#[cfg(feature = "remote-loader")]
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    retry: RetryPolicy,
}

#[cfg(feature = "remote-loader")]
impl HttpFetcher {
    pub fn new(options: &FetchOptions) -> RmResult<Self> {
        let client = Client::builder()
            .timeout(options.timeout())
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            retry: options.retry,
        })
    }
}

#[cfg(feature = "remote-loader")]
#[async_trait]
impl SourceFetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> RmResult<String> {
        simple_retry(self.retry.max_retries(), || {
            let client = self.client.clone();
            let url = url.to_string();

            Box::pin(async move {
                let response = client
                    .get(&url)
                    .header("Accept-Encoding", "gzip, deflate")
                    .send()
                    .await?;

                if !response.status().is_success() {
                    return Err(RuleMergeError::NetworkError(format!(
                        "URL {} returned status code {}",
                        url,
                        response.status()
                    )));
                }

                let text = response.text().await?;
                log::trace!("Fetched {} ({} bytes)", url, text.len());
                Ok(text)
            })
        })
        .await
    }
}

/// 内存拉取器：URL → 固定文本，未登记的 URL 视为拉取失败
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub(crate) struct StaticFetcher {
    responses: rustc_hash::FxHashMap<String, String>,
}

#[cfg(test)]
impl StaticFetcher {
    pub(crate) fn with(mut self, url: &str, body: &str) -> Self {
        self.responses.insert(url.to_string(), body.to_string());
        self
    }
}

#[cfg(test)]
#[async_trait]
impl SourceFetcher for StaticFetcher {
    async fn fetch_text(&self, url: &str) -> RmResult<String> {
        self.responses.get(url).cloned().ok_or_else(|| {
            crate::error::RuleMergeError::NetworkError(format!("URL {} returned status code 404", url))
        })
    }
}

#[cfg(all(test, feature = "remote-loader"))]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_simple_retry_gives_up_after_max_retries() {
        let calls = Arc::new(AtomicUsize::new(0));

        let result: RmResult<()> = simple_retry(2, || {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(RuleMergeError::NetworkError("boom".into()))
            }
        })
        .await;

        assert!(matches!(result, Err(RuleMergeError::NetworkError(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_simple_retry_returns_first_success() {
        let calls = Arc::new(AtomicUsize::new(0));

        let result = simple_retry(3, || {
            let calls = calls.clone();
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n == 0 {
                    Err(RuleMergeError::NetworkError("flaky".into()))
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
