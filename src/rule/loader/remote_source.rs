//! 远程规则源定义
//! 一个远程源 = 分类名 + 原始 URL + 可选的显式方言

use rulemerge_engine::{infer_dialect, SourceDialect};
use url::Url;

use crate::config::RuleSetConfig;
use crate::error::RmResult;

/// 需要经 GitHub 代理中转的主机
const GITHUB_HOSTS: [&str; 3] = [
    "raw.githubusercontent.com",
    "github.com",
    "gist.githubusercontent.com",
];

/// 远程规则源
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRuleSource {
    pub category: String,               // 所属分类
    pub raw_url: String,                // 原始 URL
    pub dialect: Option<SourceDialect>, // 显式方言（None 时按 URL 推断）
}

impl RemoteRuleSource {
    pub fn new(
        category: impl Into<String>,
        raw_url: impl Into<String>,
        dialect: Option<SourceDialect>,
    ) -> Self {
        Self {
            category: category.into(),
            raw_url: raw_url.into(),
            dialect,
        }
    }

    /// 日志与统计使用的短标签：`分类/文件名`
    pub fn label(&self) -> String {
        let file_name = Url::parse(&self.raw_url)
            .ok()
            .and_then(|url| {
                url.path_segments()
                    .and_then(|mut segments| segments.next_back().map(str::to_string))
            })
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| self.raw_url.clone());
        format!("{}/{}", self.category, file_name)
    }

    /// 确定方言：显式配置优先，否则按 URL 路径扩展名推断（`.txt` 需嗅探内容）
    pub fn resolve_dialect(&self, content: &str) -> RmResult<SourceDialect> {
        if let Some(dialect) = self.dialect {
            return Ok(dialect);
        }
        let url = Url::parse(&self.raw_url)?;
        Ok(infer_dialect(url.path(), content)?)
    }

    /// GitHub 代理地址：`{proxy}{原始 URL 去掉 https://}`
    /// 非 GitHub 主机或未配置代理时返回 None
    pub fn proxied_url(&self, gh_proxy_url: Option<&str>) -> Option<String> {
        let proxy = gh_proxy_url.filter(|p| !p.trim().is_empty())?;
        let host = Url::parse(&self.raw_url).ok()?.host_str()?.to_ascii_lowercase();
        if !GITHUB_HOSTS.contains(&host.as_str()) {
            return None;
        }
        let proxy_path = self.raw_url.trim_start_matches("https://");
        Some(format!("{}{}", proxy, proxy_path))
    }
}

/// 按配置顺序展开全部远程规则源
pub fn build_remote_sources(config: &RuleSetConfig) -> Vec<RemoteRuleSource> {
    config
        .categories
        .iter()
        .flat_map(|category| {
            category.sources.iter().map(move |source| {
                RemoteRuleSource::new(category.name.clone(), source.url.clone(), source.dialect)
            })
        })
        .collect()
}
