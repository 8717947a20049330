//! Payload 方言文档读取
//! 合法 YAML 文档走 serde_yaml 反序列化，条目保留 `+.` 后缀标记交给规范化器；
//! 非法文档（截断、混入 HTML 等）退化为逐行扫描

use serde::Deserialize;

/// Payload 文档原始结构：`payload: [...]`
#[derive(Debug, Deserialize)]
struct PayloadDocument {
    #[serde(default)]
    payload: Option<Vec<serde_yaml::Value>>,
}

/// 读取 Payload 文档的全部条目
/// 返回 None 表示内容不是合法的 Payload YAML，调用方应逐行处理
pub fn read_payload_entries(content: &str) -> Option<Vec<String>> {
    let doc: PayloadDocument = match serde_yaml::from_str(content) {
        Ok(doc) => doc,
        Err(e) => {
            log::debug!("Payload document is not valid YAML, falling back to line scan: {}", e);
            return None;
        }
    };

    // 合法 YAML 但没有 payload 键（如 `404: Not Found`）同样视为非 Payload 文档
    let payload = doc.payload?;
    let entries = payload
        .into_iter()
        .filter_map(|value| match value {
            serde_yaml::Value::String(s) => Some(s),
            // 纯数字等标量原样转字符串，交给规范化器判定
            serde_yaml::Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect();

    Some(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_payload_entries() {
        let content = "payload:\n  - '+.b.com'\n  - 'a.com'\n  - DOMAIN-KEYWORD,openai # ai\n";
        let entries = read_payload_entries(content).unwrap();
        assert_eq!(entries, vec!["+.b.com", "a.com", "DOMAIN-KEYWORD,openai"]);
    }

    #[test]
    fn test_read_payload_entries_invalid_yaml() {
        assert!(read_payload_entries("<html><body>404: Not Found").is_none());
        assert!(read_payload_entries("payload:\n  - 'a.com\n  - [").is_none());
    }
}
