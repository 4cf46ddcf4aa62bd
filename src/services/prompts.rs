//! 表格分类提示词

/// 快速分类提示词（只看表格 HTML）
pub fn fast_prompt(table_html: &str, ordinal: u32, title: &str) -> String {
    format!(
        r#"Analyze this financial statement table (it may follow Thai or international reporting format).

**Table**: {title}

**HTML**:
{table_html}

Classify the table and extract key information.

Return ONLY valid JSON (no markdown, no explanation):
{{
  "table_number": {ordinal},
  "table_type": "balance_sheet" | "profit_loss" | "fixed_assets" | "notes" | "cash_flow" | "equity" | "other",
  "contains_depreciation": true or false,
  "key_headers": ["header1", "header2"],
  "confidence": "high" | "medium" | "low"
}}

Classification hints:
- balance_sheet: สินทรัพย์, หนี้สิน, ส่วนของผู้ถือหุ้น, Assets, Liabilities
- profit_loss: รายได้, รายจ่าย, กำไร, ขาดทุน, Revenue, Expense, EBIT
- fixed_assets: ที่ดิน อาคาร อุปกรณ์, ค่าเสื่อมราคา, Depreciation
- equity: ทุนเรือนหุ้น, กำไรสะสม, Retained Earnings
- cash_flow: เงินสด, Cash Flow
"#
    )
}

/// 深度分类提示词（表格 HTML + 上下文窗口）
///
/// 年份和科目名称必须保持原文，下游按原文匹配
pub fn deep_prompt(table_html: &str, context: &str, ordinal: u32, title: &str) -> String {
    format!(
        r#"Analyze this financial table together with its surrounding context (it may follow Thai or international reporting format).

**Table**: {title}

**Context from document** (may contain Thai Buddhist years like 2567, 2566 OR international years like 2023, 2024):
{context}

**Table HTML**:
{table_html}

Extract detailed information including the fiscal year.

Return ONLY valid JSON (no markdown, no explanation):
{{
  "table_number": {ordinal},
  "year": "2567" or "2023" or null,
  "table_type": "balance_sheet" | "profit_loss" | "fixed_assets" | "notes" | "cash_flow" | "equity" | "other",
  "contains_depreciation": true or false,
  "key_headers": ["header1", "header2"],
  "depreciation_amount": number or null,
  "ebit_amount": number or null,
  "key_line_items": {{
    "item name exactly as written in the document": 6704482.16
  }},
  "confidence": "high" | "medium" | "low"
}}

Rules:
- Take the year from the context exactly as written. Thai Buddhist years stay Buddhist (2567), international years stay international (2024). Never convert between calendar systems.
- Keep every line item name in the ORIGINAL language of the document. Thai stays Thai, English stays English. Do not translate.
- For fixed_assets tables report the total depreciation (ค่าเสื่อมราคา / Depreciation) as depreciation_amount.
- Amounts are plain numbers without thousands separators.
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fast_prompt_embeds_table_and_hints() {
        let prompt = fast_prompt("<table><tr><td>x</td></tr></table>", 4, "Table 4 (Page 2)");
        assert!(prompt.contains("**Table**: Table 4 (Page 2)"));
        assert!(prompt.contains("\"table_number\": 4"));
        assert!(prompt.contains("ค่าเสื่อมราคา"));
        assert!(!prompt.contains("Context from document"));
    }

    #[test]
    fn test_deep_prompt_demands_verbatim_labels_and_year() {
        let prompt = deep_prompt("<table></table>", "ปี 2567", 7, "Table 7 (Page 0)");
        assert!(prompt.contains("Context from document"));
        assert!(prompt.contains("ปี 2567"));
        assert!(prompt.contains("Never convert between calendar systems"));
        assert!(prompt.contains("Do not translate"));
    }
}
