//! 规则聚合配置管理

use std::path::{Path, PathBuf};
use std::time::Duration;

use rulemerge_engine::{PolicyMap, SourceDialect};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::{RmResult, RuleMergeError};

/// 重试策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RetryPolicy {
    Never,     // 不重试
    Times(u8), // 固定次数重试（不含第一次）
}

impl RetryPolicy {
    /// 最大重试次数
    pub fn max_retries(&self) -> usize {
        match self {
            RetryPolicy::Never => 0,
            RetryPolicy::Times(n) => *n as usize,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::Times(2)
    }
}

/// 单个远程规则源
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySource {
    pub url: String,
    /// 显式指定方言；缺省时按 URL 扩展名推断
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialect: Option<SourceDialect>,
}

impl CategorySource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            dialect: None,
        }
    }

    pub fn with_dialect(url: impl Into<String>, dialect: SourceDialect) -> Self {
        Self {
            url: url.into(),
            dialect: Some(dialect),
        }
    }
}

/// 单个分类及其规则源列表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryConfig {
    pub name: String,
    #[serde(default)]
    pub sources: Vec<CategorySource>,
}

impl CategoryConfig {
    pub fn new<I, S>(name: impl Into<String>, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            sources: urls.into_iter().map(CategorySource::new).collect(),
        }
    }
}

/// 网络拉取相关选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchOptions {
    /// HTTP 超时（单位：秒）
    pub timeout_secs: u64,
    /// 重试策略
    pub retry: RetryPolicy,
    /// 并发拉取上限
    pub concurrency: usize,
    /// GitHub 代理 URL，原始地址拉取失败时经代理重试
    pub gh_proxy_url: Option<String>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            retry: RetryPolicy::default(),
            concurrency: 8,
            gh_proxy_url: None,
        }
    }
}

impl FetchOptions {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// 跨分类统一输出（Policy 方言）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnifiedOutput {
    /// 输出文件名（不含扩展名）
    pub name: String,
    /// 分类优先级顺序，靠前的分类优先保留冲突规则
    pub categories: Vec<String>,
    /// 分类 → 固定策略名
    #[serde(default)]
    pub policies: PolicyMap,
}

impl Default for UnifiedOutput {
    fn default() -> Self {
        Self {
            name: "Rules".to_string(),
            categories: ["Reject", "Proxy", "Ai", "Direct"]
                .into_iter()
                .map(String::from)
                .collect(),
            policies: PolicyMap::new().with_override("Ai", "PROXY"),
        }
    }
}

/// 完整规则聚合配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSetConfig {
    /// 分类列表（顺序即处理顺序）
    pub categories: Vec<CategoryConfig>,
    /// 用户自定义规则文件
    pub custom_rules_path: Option<PathBuf>,
    /// 输出目录
    pub output_dir: PathBuf,
    pub fetch: FetchOptions,
    /// 统一输出，None 表示不生成
    pub unified: Option<UnifiedOutput>,
}

impl Default for RuleSetConfig {
    fn default() -> Self {
        Self {
            categories: default_categories(),
            custom_rules_path: None,
            output_dir: PathBuf::from("rules"),
            fetch: FetchOptions::default(),
            unified: Some(UnifiedOutput::default()),
        }
    }
}

const LOYALSOLDIER: &str = "https://raw.githubusercontent.com/Loyalsoldier/clash-rules/release";
const BLACKMATRIX7: &str =
    "https://raw.githubusercontent.com/blackmatrix7/ios_rule_script/master/rule/Clash";
const ACL4SSR: &str = "https://raw.githubusercontent.com/ACL4SSR/ACL4SSR/master/Clash";

/// 内置规则源表
fn default_categories() -> Vec<CategoryConfig> {
    vec![
        CategoryConfig::new("Proxy", [format!("{}/proxy.txt", LOYALSOLDIER)]),
        CategoryConfig::new(
            "Direct",
            [
                format!("{}/direct.txt", LOYALSOLDIER),
                format!("{}/Download/Download.list", BLACKMATRIX7),
                format!("{}/ChinaMax/ChinaMax.list", BLACKMATRIX7),
                format!("{}/Direct/Direct.list", BLACKMATRIX7),
                format!("{}/ChinaDomain.list", ACL4SSR),
                format!("{}/ChinaCompanyIp.list", ACL4SSR),
                format!("{}/ChinaIp.list", ACL4SSR),
                format!("{}/LocalAreaNetwork.list", ACL4SSR),
                "https://raw.githubusercontent.com/Aethersailor/Custom_OpenClash_Rules/main/Rule/Custom_Direct.list"
                    .to_string(),
            ],
        ),
        CategoryConfig::new("Reject", [format!("{}/reject.txt", LOYALSOLDIER)]),
        CategoryConfig::new(
            "Ai",
            [
                format!("{}/Copilot/Copilot.list", BLACKMATRIX7),
                format!("{}/OpenAI/OpenAI.list", BLACKMATRIX7),
            ],
        ),
    ]
}

impl RuleSetConfig {
    /// 从配置文件加载：`.yml` / `.yaml` 按 YAML 解析，其余按 JSON 解析
    pub fn from_file(path: impl AsRef<Path>) -> RmResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            RuleMergeError::ConfigError(format!("读取配置文件[{}]失败：{}", path.display(), e))
        })?;

        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yml") || ext.eq_ignore_ascii_case("yaml"));

        let config: Self = if is_yaml {
            serde_yaml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };
        config.validate()?;
        Ok(config)
    }

    /// 分类名列表（保持配置顺序）
    pub fn category_names(&self) -> Vec<String> {
        self.categories.iter().map(|c| c.name.clone()).collect()
    }

    /// 配置校验，失败即为致命错误
    pub fn validate(&self) -> RmResult<()> {
        if self.categories.is_empty() {
            return Err(RuleMergeError::ConfigError("未配置任何分类".into()));
        }

        // 输出文件名在大小写不敏感的文件系统上也不能冲突
        let mut folded = FxHashSet::default();
        for category in &self.categories {
            let name = category.name.trim();
            if name.is_empty() {
                return Err(RuleMergeError::ConfigError("分类名不能为空".into()));
            }
            // 分类名直接用作输出文件名
            if name.contains(['/', '\\']) {
                return Err(RuleMergeError::ConfigError(format!(
                    "分类名[{}]包含路径分隔符",
                    name
                )));
            }
            if !folded.insert(name.to_ascii_lowercase()) {
                return Err(RuleMergeError::ConfigError(format!("分类名[{}]重复", name)));
            }
        }

        if self.fetch.concurrency == 0 {
            return Err(RuleMergeError::ConfigError("并发数必须大于 0".into()));
        }

        if let Some(unified) = &self.unified {
            if unified.name.trim().is_empty() {
                return Err(RuleMergeError::ConfigError("统一输出文件名不能为空".into()));
            }
            for name in &unified.categories {
                if !self.categories.iter().any(|c| &c.name == name) {
                    return Err(RuleMergeError::ConfigError(format!(
                        "统一输出引用了未配置的分类[{}]",
                        name
                    )));
                }
            }
        }

        Ok(())
    }
}

/// 自定义构建器（链式 API）
#[derive(Debug, Clone, Default)]
pub struct CustomConfigBuilder {
    config: RuleSetConfig,
}

impl CustomConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从已有配置继续定制
    pub fn from_config(config: RuleSetConfig) -> Self {
        Self { config }
    }

    /// 清空内置分类表
    pub fn clear_categories(mut self) -> Self {
        self.config.categories.clear();
        self
    }

    /// 追加分类；同名分类的规则源合并到已有分类
    pub fn category<I, S>(mut self, name: impl Into<String>, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let incoming = CategoryConfig::new(name, urls);
        match self
            .config
            .categories
            .iter_mut()
            .find(|c| c.name == incoming.name)
        {
            Some(existing) => existing.sources.extend(incoming.sources),
            None => self.config.categories.push(incoming),
        }
        self
    }

    pub fn custom_rules_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.custom_rules_path = Some(path.into());
        self
    }

    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output_dir = path.into();
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.fetch.timeout_secs = secs;
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.config.fetch.retry = retry;
        self
    }

    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.config.fetch.concurrency = concurrency;
        self
    }

    pub fn gh_proxy_url(mut self, url: impl Into<String>) -> Self {
        self.config.fetch.gh_proxy_url = Some(url.into());
        self
    }

    pub fn unified(mut self, unified: Option<UnifiedOutput>) -> Self {
        self.config.unified = unified;
        self
    }

    pub fn build(self) -> RuleSetConfig {
        self.config
    }
}
