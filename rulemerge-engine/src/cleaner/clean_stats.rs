//! 负责规范化统计数据的定义、更新与格式化输出

use super::line_normalizer::RejectReason;

/// 规范化统计信息
/// 记录单个分类构建过程中的各类指标：
/// 1. 规则源数量与原始行数
/// 2. 接受/拒绝行数，拒绝按原因细分
/// 3. 合并阶段被丢弃的重复规则数
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CleanStats {
    // ========== 输入统计 ==========
    /// 参与构建的规则源数量（不含自定义规则）
    pub source_count: u32,
    /// 原始行总数（含自定义规则行）
    pub total_lines: u32,
    /// 成功规范化的行数
    pub accepted_lines: u32,

    // ========== 拒绝统计 ==========
    /// 空行 / 注释行
    pub rejected_empty: u32,
    /// 方言头
    pub rejected_header: u32,
    /// HTML 泄漏
    pub rejected_html: u32,
    /// 未知规则类型
    pub rejected_unknown_type: u32,
    /// 非法 value
    pub rejected_invalid_value: u32,

    // ========== 合并统计 ==========
    /// 合并阶段被丢弃的重复规则数
    pub duplicates_dropped: u32,
}

impl CleanStats {
    /// 记录一次拒绝
    pub fn record_reject(&mut self, reason: RejectReason) {
        match reason {
            RejectReason::Empty => self.rejected_empty += 1,
            RejectReason::HeaderToken => self.rejected_header += 1,
            RejectReason::HtmlLeak => self.rejected_html += 1,
            RejectReason::UnknownType => self.rejected_unknown_type += 1,
            RejectReason::InvalidValue => self.rejected_invalid_value += 1,
        }
    }

    /// 非空行中被拒绝的行数（空行与注释不计入）
    pub fn rejected_meaningful(&self) -> u32 {
        self.rejected_header
            + self.rejected_html
            + self.rejected_unknown_type
            + self.rejected_invalid_value
    }

    /// 累加另一份统计
    pub fn absorb(&mut self, other: &CleanStats) {
        self.source_count += other.source_count;
        self.total_lines += other.total_lines;
        self.accepted_lines += other.accepted_lines;
        self.rejected_empty += other.rejected_empty;
        self.rejected_header += other.rejected_header;
        self.rejected_html += other.rejected_html;
        self.rejected_unknown_type += other.rejected_unknown_type;
        self.rejected_invalid_value += other.rejected_invalid_value;
        self.duplicates_dropped += other.duplicates_dropped;
    }

    /// 格式化输出统计信息（结构化日志）
    pub fn print_stats(&self, category: &str, total_time: std::time::Duration) {
        log::debug!(
            "[{}] Normalize completed | Time: {:?} | Sources: {} | Lines: {} | Accepted: {} | Duplicates dropped: {}",
            category,
            total_time,
            self.source_count,
            self.total_lines,
            self.accepted_lines,
            self.duplicates_dropped
        );

        log::debug!(
            "[{}] Reject stats: empty/comment {} | header {} | html leak {} | unknown type {} | invalid value {}",
            category,
            self.rejected_empty,
            self.rejected_header,
            self.rejected_html,
            self.rejected_unknown_type,
            self.rejected_invalid_value
        );
    }
}
