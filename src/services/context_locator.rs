//! 上下文定位 - 业务能力层
//!
//! 在全文渲染中为某个表格编号找到一段最可能包含其会计年度的文字窗口。
//! 找不到是正常结果（空窗口），调用方据此跳过深度分析。

use std::ops::Range;
use tracing::debug;

/// 策略一：编号行之前的行数
const HEADING_LINES_BEFORE: usize = 15;
/// 策略一：编号行之后的行数（含表格本身）
const HEADING_LINES_AFTER: usize = 35;
/// 策略二：从表格标记向上查找年份的最大行数
const BACKWARD_SCAN_LINES: usize = 15;
/// 策略二：年份行之前保留的行数
const YEAR_LINES_BEFORE: usize = 10;
/// 策略二：表格标记之后保留的行数
const ANCHOR_LINES_AFTER: usize = 5;

/// 命中的定位策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocateStrategy {
    /// 行首编号（如 "7 ที่ดิน อาคารและอุปกรณ์"）
    NumberedHeading,
    /// 第 N 个 `<table>` 标记之前最近的年份
    TableMarker,
}

/// 上下文窗口
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContextWindow {
    pub text: String,
    /// 窗口在全文中的行范围（左闭右开）
    pub lines: Range<usize>,
    pub strategy: Option<LocateStrategy>,
}

impl ContextWindow {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    fn from_lines(lines: &[&str], range: Range<usize>, strategy: LocateStrategy) -> Self {
        Self {
            text: lines[range.clone()].join("\n"),
            lines: range,
            strategy: Some(strategy),
        }
    }
}

/// 上下文定位器
#[derive(Debug, Clone)]
pub struct ContextLocator {
    year_tokens: Vec<String>,
}

impl ContextLocator {
    pub fn new(year_tokens: Vec<String>) -> Self {
        Self { year_tokens }
    }

    fn contains_year(&self, text: &str) -> bool {
        self.year_tokens.iter().any(|year| text.contains(year.as_str()))
    }

    /// 为表格编号定位上下文窗口
    ///
    /// 先按行首编号查找，失败后按第 N 个表格标记查找；都失败时返回空窗口
    pub fn locate(&self, full_text: &str, ordinal: u32) -> ContextWindow {
        if full_text.is_empty() {
            return ContextWindow::empty();
        }

        let lines: Vec<&str> = full_text.split('\n').collect();

        if let Some(window) = self.by_numbered_heading(&lines, ordinal) {
            debug!("表格 {} 通过行首编号定位到上下文 {:?}", ordinal, window.lines);
            return window;
        }

        if let Some(window) = self.by_table_marker(&lines, ordinal) {
            debug!("表格 {} 通过表格标记定位到上下文 {:?}", ordinal, window.lines);
            return window;
        }

        debug!("表格 {} 未找到包含年份的上下文", ordinal);
        ContextWindow::empty()
    }

    /// 策略一：第一条以 "<编号> " 开头的行，窗口内必须出现年份
    fn by_numbered_heading(&self, lines: &[&str], ordinal: u32) -> Option<ContextWindow> {
        let prefix = format!("{} ", ordinal);
        let heading = lines
            .iter()
            .position(|line| line.trim().starts_with(&prefix))?;

        let start = heading.saturating_sub(HEADING_LINES_BEFORE);
        let end = (heading + HEADING_LINES_AFTER).min(lines.len());
        let window = ContextWindow::from_lines(lines, start..end, LocateStrategy::NumberedHeading);

        self.contains_year(&window.text).then_some(window)
    }

    /// 策略二：第 N 个表格标记，向上取最近的年份行
    ///
    /// 取最近而不是最早的年份，页眉页脚里的封面年份不能当作表格年份
    fn by_table_marker(&self, lines: &[&str], ordinal: u32) -> Option<ContextWindow> {
        let anchor = lines
            .iter()
            .enumerate()
            .filter(|(_, line)| is_table_start(line))
            .nth((ordinal as usize).checked_sub(1)?)
            .map(|(index, _)| index)?;

        let year_line = (1..=BACKWARD_SCAN_LINES)
            .map_while(|offset| anchor.checked_sub(offset))
            .find(|&index| self.contains_year(lines[index]))?;

        let start = year_line.saturating_sub(YEAR_LINES_BEFORE);
        let end = (anchor + ANCHOR_LINES_AFTER).min(lines.len());
        Some(ContextWindow::from_lines(lines, start..end, LocateStrategy::TableMarker))
    }
}

fn is_table_start(line: &str) -> bool {
    line.contains("<table>") || line.contains("<table ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_year_tokens;

    fn locator() -> ContextLocator {
        ContextLocator::new(default_year_tokens())
    }

    fn filler(count: usize, label: &str) -> Vec<String> {
        (0..count).map(|i| format!("{} line {}", label, i)).collect()
    }

    #[test]
    fn test_numbered_heading_window_is_bounded() {
        let mut lines = filler(40, "before");
        let heading_index = lines.len();
        lines.push("7 Property and equipment".to_string());
        lines.extend(filler(5, "body"));
        lines.push("As at 31 December 2023".to_string());
        lines.extend(filler(60, "after"));
        let text = lines.join("\n");

        let window = locator().locate(&text, 7);
        assert_eq!(window.strategy, Some(LocateStrategy::NumberedHeading));
        assert!(window.text.contains("7 Property and equipment"));
        assert!(window.text.contains("2023"));
        assert!(window.lines.contains(&heading_index));
        assert!(window.lines.len() <= 51);
        assert_eq!(window.lines, heading_index - 15..heading_index + 35);
    }

    #[test]
    fn test_numbered_heading_requires_leading_number() {
        let text = "Reference 7 Property\n  7 ที่ดิน อาคารและอุปกรณ์\nปี 2567";
        let window = locator().locate(text, 7);
        assert_eq!(window.strategy, Some(LocateStrategy::NumberedHeading));
        assert_eq!(window.lines, 0..3);

        // "17 " 不能匹配编号 7，"7x" 也不行
        let text = "17 Other\n7x item\n2567";
        let window = locator().locate(text, 7);
        assert!(window.is_empty());
    }

    #[test]
    fn test_table_marker_prefers_closest_year() {
        let mut lines = filler(5, "cover");
        lines.push("<table>".to_string()); // 第 1 个表格
        lines.extend(filler(3, "gap"));
        let far_year = lines.len();
        lines.push("สำหรับปีสิ้นสุดวันที่ 31 ธันวาคม 2565".to_string());
        lines.extend(filler(8, "middle"));
        let near_year = lines.len();
        lines.push("พ.ศ. 2566".to_string());
        lines.extend(filler(2, "caption"));
        let anchor = lines.len();
        lines.push("<table><tr><td>ค่าเสื่อมราคา</td></tr></table>".to_string()); // 第 2 个表格
        lines.extend(filler(10, "tail"));
        assert_eq!(anchor - near_year, 3);
        assert_eq!(anchor - far_year, 12);
        let text = lines.join("\n");

        let window = locator().locate(&text, 2);
        assert_eq!(window.strategy, Some(LocateStrategy::TableMarker));
        assert_eq!(window.lines, near_year - 10..anchor + 5);
        assert!(window.text.contains("พ.ศ. 2566"));
    }

    #[test]
    fn test_table_marker_used_when_heading_has_no_year() {
        let mut lines = vec!["3 Intangible assets".to_string()];
        lines.extend(filler(60, "no year"));
        lines.push("<table>".to_string());
        lines.push("<table>".to_string());
        lines.push("Year ended 2024".to_string());
        lines.push("<table border=\"1\">".to_string());
        let text = lines.join("\n");

        let window = locator().locate(&text, 3);
        assert_eq!(window.strategy, Some(LocateStrategy::TableMarker));
        assert!(window.text.contains("Year ended 2024"));
    }

    #[test]
    fn test_no_year_in_range_returns_empty() {
        let mut lines = vec!["Annual report 2567".to_string()];
        lines.extend(filler(20, "far away"));
        lines.push("<table>".to_string());
        let text = lines.join("\n");

        let window = locator().locate(&text, 1);
        assert!(window.is_empty());
        assert_eq!(window.strategy, None);
    }

    #[test]
    fn test_ordinal_zero_never_matches_a_marker() {
        let text = "2567\n<table>\n<table>";
        assert!(locator().locate(text, 0).is_empty());
    }

    #[test]
    fn test_empty_text() {
        assert!(locator().locate("", 4).is_empty());
    }
}
