//! 用户自定义规则文件加载

use std::path::Path;

use rulemerge_engine::{parse_custom_sections, CustomSections};

use crate::error::{RmResult, RuleMergeError};

/// 读取自定义规则文件并按分类分节
/// 文件已配置但无法读取视为配置错误
pub async fn load_custom_rules<S: AsRef<str>>(
    path: &Path,
    categories: &[S],
) -> RmResult<CustomSections> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        RuleMergeError::ConfigError(format!("读取自定义规则文件[{}]失败：{}", path.display(), e))
    })?;

    let sections = parse_custom_sections(&content, categories);
    log::info!(
        "Loaded {} custom rule line(s) from {}",
        sections.total_lines(),
        path.display()
    );
    Ok(sections)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_custom_rules() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.list");
        tokio::fs::write(&path, "# Direct\nDOMAIN-SUFFIX,corp.example\n# Proxy\nDOMAIN,x.com\n")
            .await
            .unwrap();

        let sections = load_custom_rules(&path, &["Direct", "Proxy"]).await.unwrap();
        assert_eq!(sections.lines_for("Direct"), ["DOMAIN-SUFFIX,corp.example"]);
        assert_eq!(sections.lines_for("Proxy"), ["DOMAIN,x.com"]);

        let missing = load_custom_rules(&dir.path().join("nope.list"), &["Direct"]).await;
        assert!(matches!(missing, Err(RuleMergeError::ConfigError(_))));
    }
}
