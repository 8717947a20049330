//! 规则源解析模块
//! 方言识别、Payload 文档读取、自定义规则文件分节

pub mod custom;
pub mod payload;

use std::borrow::Cow;

use crate::core::{SourceDialect, SourceRecord};
use crate::error::{CoreError, CoreResult};

pub use custom::{parse_custom_sections, CustomSections};
pub use payload::read_payload_entries;

/// 根据路径扩展名推断方言
/// - `.list` → List
/// - `.yml` / `.yaml` → Payload
/// - `.txt` → 内容嗅探（兜底手段，仅在扩展名无法区分时使用）
/// - 其它 → UnsupportedDialect
pub fn infer_dialect(path: &str, content: &str) -> CoreResult<SourceDialect> {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "list" => Ok(SourceDialect::List),
        "yml" | "yaml" => Ok(SourceDialect::Payload),
        "txt" => Ok(sniff_dialect(content)),
        _ => Err(CoreError::UnsupportedDialect(format!(
            "unsupported file extension `.{}` ({})",
            extension, path
        ))),
    }
}

/// 内容嗅探：第一个有意义的行是 `payload:` 即视为 Payload 方言
pub fn sniff_dialect(content: &str) -> SourceDialect {
    let first = content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'));

    match first {
        Some(line) if line.eq_ignore_ascii_case("payload:") => SourceDialect::Payload,
        _ => SourceDialect::List,
    }
}

/// 将规则源记录拆分为待规范化的行
/// Payload 方言优先按 YAML 读取，失败时逐行处理
pub fn record_lines(record: &SourceRecord) -> Vec<Cow<'_, str>> {
    if record.dialect == SourceDialect::Payload {
        if let Some(entries) = read_payload_entries(&record.raw_content) {
            return entries.into_iter().map(Cow::Owned).collect();
        }
    }
    record.raw_content.lines().map(Cow::Borrowed).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_dialect_by_extension() {
        assert_eq!(infer_dialect("/rule/Clash/OpenAI/OpenAI.list", "").unwrap(), SourceDialect::List);
        assert_eq!(infer_dialect("/release/proxy.YAML", "").unwrap(), SourceDialect::Payload);
        assert_eq!(
            infer_dialect("/release/proxy.txt", "# generated\npayload:\n  - '+.a.com'\n").unwrap(),
            SourceDialect::Payload
        );
        assert_eq!(
            infer_dialect("/plain/direct.txt", "DOMAIN,a.com\n").unwrap(),
            SourceDialect::List
        );
        assert!(matches!(
            infer_dialect("/rules/proxy.json", ""),
            Err(CoreError::UnsupportedDialect(_))
        ));
        assert!(infer_dialect("/rules/noext", "").is_err());
    }

    #[test]
    fn test_record_lines_payload_fallback() {
        let broken = SourceRecord::new("payload:\n  - 'a.com\n  - [", SourceDialect::Payload, "t");
        assert_eq!(record_lines(&broken).len(), 3);

        let valid = SourceRecord::new("payload:\n  - '+.a.com'\n", SourceDialect::Payload, "t");
        assert_eq!(record_lines(&valid), vec![Cow::Borrowed("+.a.com")]);
    }
}
