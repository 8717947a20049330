use std::time::Instant;

use crate::{
    cleaner::{CleanStats, LineNormalizer, RejectReason},
    core::{CanonicalRule, CategoryRuleSet, RuleOrigin, SourceDialect, SourceRecord},
    merger::merge,
    source::record_lines,
    utils::preview_compact,
};

/// 日志中单行预览的最大长度
const LINE_PREVIEW_LEN: usize = 80;

/// 单个分类的构建结果
#[derive(Debug, Clone, Default)]
pub struct CategoryBuild {
    pub rules: CategoryRuleSet,
    pub stats: CleanStats,
}

/// 规则处理器，核心职责：逐行规范化 + 优先级合并 + 统计调试
#[derive(Debug, Default)]
pub struct RuleProcessor {
    normalizer: LineNormalizer,
}

impl RuleProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// 构建单个分类的规则集
    /// - records: 该分类已拉取成功的远程规则源
    /// - custom_lines: 自定义规则文件中属于该分类的行（按 List 方言处理）
    pub fn build_category(
        &self,
        category: &str,
        records: &[SourceRecord],
        custom_lines: &[String],
    ) -> CategoryBuild {
        let start = Instant::now();
        let mut stats = CleanStats::default();

        let custom = self.normalize_lines(
            custom_lines.iter().map(String::as_str),
            SourceDialect::List,
            category,
            RuleOrigin::Custom,
            "custom",
            &mut stats,
        );

        let mut remote = Vec::new();
        for record in records {
            stats.source_count += 1;
            let lines = record_lines(record);
            let normalized = self.normalize_lines(
                lines.iter().map(|line| &**line),
                record.dialect,
                category,
                RuleOrigin::Remote,
                &record.label,
                &mut stats,
            );
            log::debug!(
                "[{}] {} ({}): {} rule(s) from {} line(s)",
                category,
                record.label,
                record.dialect,
                normalized.len(),
                lines.len()
            );
            remote.extend(normalized);
        }

        let incoming = custom.len() + remote.len();
        let rules = merge(category, custom, remote);
        stats.duplicates_dropped = (incoming - rules.len()) as u32;

        stats.print_stats(category, start.elapsed());
        CategoryBuild { rules, stats }
    }

    /// 逐行规范化，拒绝的行只计入统计
    fn normalize_lines<'a, I>(
        &self,
        lines: I,
        dialect: SourceDialect,
        category: &str,
        origin: RuleOrigin,
        label: &str,
        stats: &mut CleanStats,
    ) -> Vec<CanonicalRule>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut accepted = Vec::new();
        for line in lines {
            stats.total_lines += 1;
            match self.normalizer.classify(line, dialect, category, origin) {
                Ok(rule) => {
                    stats.accepted_lines += 1;
                    accepted.push(rule);
                }
                Err(reason) => {
                    if reason != RejectReason::Empty {
                        log::trace!(
                            "[{}] {} rejected ({:?}): {}",
                            category,
                            label,
                            reason,
                            preview_compact(line, LINE_PREVIEW_LEN)
                        );
                    }
                    stats.record_reject(reason);
                }
            }
        }
        accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MatchType;
    use crate::encoder::encode_payload;

    #[test]
    fn test_build_category_custom_overrides_remote() {
        let records = vec![
            SourceRecord::new("DOMAIN-SUFFIX,b.com\nDOMAIN,c.com\n", SourceDialect::List, "remote-a"),
            SourceRecord::new(
                "payload:\n  - '+.b.com'\n  - 'd.com'\n",
                SourceDialect::Payload,
                "remote-b",
            ),
        ];
        let custom = vec!["DOMAIN-SUFFIX,b.com".to_string()];

        let build = RuleProcessor::new().build_category("Direct", &records, &custom);
        let lines: Vec<String> = build.rules.iter().map(|r| r.to_string()).collect();

        assert_eq!(lines, ["DOMAIN-SUFFIX,b.com", "DOMAIN,c.com", "DOMAIN,d.com"]);
        assert!(build.rules.rules()[0].is_custom());
        assert_eq!(build.stats.source_count, 2);
        assert_eq!(build.stats.duplicates_dropped, 2);
    }

    #[test]
    fn test_build_category_rejects_html_noise() {
        let records = vec![SourceRecord::new(
            "<html>\n<body class=\"err\">404: Not Found</body>\n</html>\n",
            SourceDialect::List,
            "broken",
        )];

        let build = RuleProcessor::new().build_category("Reject", &records, &[]);
        assert!(build.rules.is_empty());
        assert_eq!(build.stats.rejected_html, 3);
        assert_eq!(build.stats.accepted_lines, 0);
    }

    #[test]
    fn test_build_category_scenario_from_mixed_sources() {
        let records = vec![
            SourceRecord::new("DOMAIN,a.com\n", SourceDialect::List, "list"),
            SourceRecord::new("payload:\n  '+.b.com'\n", SourceDialect::Payload, "payload"),
        ];

        let build = RuleProcessor::new().build_category("Proxy", &records, &[]);
        let pairs: Vec<(MatchType, &str)> = build
            .rules
            .iter()
            .map(|r| (r.match_type, r.value.as_str()))
            .collect();
        assert_eq!(
            pairs,
            [(MatchType::Domain, "a.com"), (MatchType::DomainSuffix, "b.com")]
        );
    }

    #[test]
    fn test_list_source_to_payload_document() {
        let content = ["DOMAIN,a.com", "DOMAIN-SUFFIX,b.com", "# comment", "", "DOMAIN-SUFFIX,b.com"]
            .join("\n");
        let records = vec![SourceRecord::new(content, SourceDialect::List, "list")];

        let build = RuleProcessor::new().build_category("Direct", &records, &[]);
        assert_eq!(
            encode_payload(build.rules.rules()),
            "payload:\n  'a.com'\n  '+.b.com'\n"
        );
        assert_eq!(build.stats.rejected_empty, 2);
        assert_eq!(build.stats.duplicates_dropped, 1);
    }
}
