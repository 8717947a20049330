//! rulemerge-engine 内核错误定义
//! 内核层只做纯计算，错误集中在规则源方言识别与输入校验，与 I/O 层错误解耦
use thiserror::Error;

/// 内核核心错误枚举
#[derive(Error, Debug)]
pub enum CoreError {
    // ===================== 规则源相关错误 =====================
    /// 无法识别的规则源方言（如未知的文件扩展名）
    /// 仅对单个规则源致命，调用方按拉取失败处理
    #[error("Unsupported source dialect: {0}")]
    UnsupportedDialect(String),

    /// 规则解析失败（整份内容无法按声明的方言解析）
    #[error("Rule parse failed: {0}")]
    RuleParseError(String),

    // ===================== 内核基础错误 =====================
    /// 无效输入参数
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// 内核层全局Result类型别名
pub type CoreResult<T> = Result<T, CoreError>;
