use super::enums::SourceDialect;

/// 规则源记录：拉取层的产物，规范化层的输入
/// 拉取失败不产生记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRecord {
    /// 原始文本内容
    pub raw_content: String,
    /// 原始文本方言
    pub dialect: SourceDialect,
    /// 来源标识（URL / 文件路径），仅用于日志
    pub label: String,
}

impl SourceRecord {
    pub fn new(raw_content: impl Into<String>, dialect: SourceDialect, label: impl Into<String>) -> Self {
        Self {
            raw_content: raw_content.into(),
            dialect,
            label: label.into(),
        }
    }
}
