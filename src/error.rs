//! 全局错误类型定义
use rulemerge_engine::CoreError;
use serde_json::Error as SerdeJsonError;
use serde_yaml::Error as SerdeYamlError;
use std::io::Error as IoError;
use thiserror::Error;
use url::ParseError as UrlParseError;

#[derive(Error, Debug)]
pub enum RuleMergeError {
    // 内核错误（方言识别、规则解析、输入校验）
    #[error("{0}")]
    Core(#[from] CoreError),

    // 网络相关错误
    #[error("网络相关错误：{0}")]
    NetworkError(String),
    #[cfg(feature = "remote-loader")]
    #[error("HTTP 请求失败：{0}")]
    HttpError(#[from] reqwest::Error),

    // 序列化/反序列化错误
    #[error("JSON解析失败：{0}")]
    JsonError(#[from] SerdeJsonError),
    #[error("YAML解析失败：{0}")]
    YamlError(#[from] SerdeYamlError),

    // 基础错误
    #[error("IO操作失败：{0}")]
    IoError(#[from] IoError),
    #[error("URL解析失败：{0}")]
    UrlError(#[from] UrlParseError),
    #[error("配置错误：{0}")]
    ConfigError(String),

    #[error("异步任务执行失败：{0}")]
    AsyncTaskError(String),
}

// 全局Result类型
pub type RmResult<T> = Result<T, RuleMergeError>;
