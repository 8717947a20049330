use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::error::CoreError;

/// 规则匹配类型枚举，对应分流规则行首的类型前缀
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchType {
    #[serde(rename = "DOMAIN")]
    Domain,
    #[serde(rename = "DOMAIN-SUFFIX")]
    DomainSuffix,
    #[serde(rename = "DOMAIN-KEYWORD")]
    DomainKeyword,
    #[serde(rename = "DOMAIN-REGEX")]
    DomainRegex,
    #[serde(rename = "IP-CIDR")]
    IpCidr,
    #[serde(rename = "IP-CIDR6")]
    IpCidr6,
    #[serde(rename = "IP-ASN")]
    IpAsn,
    #[serde(rename = "PROCESS-NAME")]
    ProcessName,
    #[serde(rename = "USER-AGENT")]
    UserAgent,
}

impl MatchType {
    /// 全部可识别类型
    pub const ALL: [MatchType; 9] = [
        MatchType::Domain,
        MatchType::DomainSuffix,
        MatchType::DomainKeyword,
        MatchType::DomainRegex,
        MatchType::IpCidr,
        MatchType::IpCidr6,
        MatchType::IpAsn,
        MatchType::ProcessName,
        MatchType::UserAgent,
    ];

    /// 规则行中的类型前缀（始终大写）
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::Domain => "DOMAIN",
            MatchType::DomainSuffix => "DOMAIN-SUFFIX",
            MatchType::DomainKeyword => "DOMAIN-KEYWORD",
            MatchType::DomainRegex => "DOMAIN-REGEX",
            MatchType::IpCidr => "IP-CIDR",
            MatchType::IpCidr6 => "IP-CIDR6",
            MatchType::IpAsn => "IP-ASN",
            MatchType::ProcessName => "PROCESS-NAME",
            MatchType::UserAgent => "USER-AGENT",
        }
    }

    /// 解析类型前缀，ASCII 大小写不敏感；未知类型返回 None
    pub fn parse_token(token: &str) -> Option<Self> {
        let token = token.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(token))
    }

    /// 是否为域名类规则（Payload 方言仅能表达 DOMAIN / DOMAIN-SUFFIX）
    pub fn is_domain(&self) -> bool {
        matches!(self, MatchType::Domain | MatchType::DomainSuffix)
    }
}

impl Display for MatchType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_token(s)
            .ok_or_else(|| CoreError::InvalidInput(format!("unknown match type `{}`", s)))
    }
}

// 按类型前缀的字典序排序，保证输出与字符串排序一致
impl Ord for MatchType {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl PartialOrd for MatchType {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// 规则来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleOrigin {
    /// 用户自定义规则（最高优先级）
    Custom,
    /// 第三方远程规则源
    Remote,
}

impl Display for RuleOrigin {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleOrigin::Custom => write!(f, "custom"),
            RuleOrigin::Remote => write!(f, "remote"),
        }
    }
}

/// 规则源方言（输入侧）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceDialect {
    /// `TYPE,value[,extra]`，每行一条
    List,
    /// `payload:` 头 + 缩进的带引号条目
    Payload,
}

impl Display for SourceDialect {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceDialect::List => write!(f, "list"),
            SourceDialect::Payload => write!(f, "payload"),
        }
    }
}

/// 输出方言
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputDialect {
    /// `TYPE,value`
    List,
    /// `payload:` + `  'value'` / `  '+.value'`
    Payload,
    /// `TYPE,value,POLICY`
    Policy,
}

impl OutputDialect {
    /// 输出文件扩展名
    pub fn file_suffix(&self) -> &'static str {
        match self {
            OutputDialect::List => "list",
            OutputDialect::Payload => "txt",
            OutputDialect::Policy => "conf",
        }
    }
}
