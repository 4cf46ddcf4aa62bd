//! 表格索引 - 业务能力层
//!
//! 从 tables.html 中按文档顺序枚举表格：每个 `<h2>` 标题对应其后的第一个 `<table>`

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;
use tracing::{debug, warn};

use crate::models::TableRecord;

fn table_number_re() -> &'static Regex {
    static TABLE_NUMBER_RE: OnceLock<Regex> = OnceLock::new();
    TABLE_NUMBER_RE.get_or_init(|| Regex::new(r"Table (\d+)").expect("valid table number regex"))
}

/// 从标题中提取表格编号，如 "Table 7 (Page 0)" → 7
///
/// 无法识别时返回 0
pub fn parse_ordinal(title: &str) -> u32 {
    table_number_re()
        .captures(title)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// 枚举表格列表中的所有表格
///
/// 没有后续 `<table>` 的标题会被跳过（记录警告，不报错）
pub fn index_tables(listing_html: &str) -> Vec<TableRecord> {
    let document = Html::parse_document(listing_html);
    let selector = match Selector::parse("h2, table") {
        Ok(selector) => selector,
        Err(e) => {
            warn!("无法创建表格选择器: {:?}", e);
            return Vec::new();
        }
    };

    // 文档顺序
    let elements: Vec<ElementRef> = document.root_element().select(&selector).collect();

    let mut records = Vec::new();
    for (index, element) in elements.iter().enumerate() {
        if element.value().name() != "h2" {
            continue;
        }

        let title = element.text().collect::<String>().trim().to_string();
        let ordinal = parse_ordinal(&title);

        let next_table = elements[index + 1..]
            .iter()
            .find(|candidate| candidate.value().name() == "table");

        match next_table {
            Some(table) => {
                debug!("索引表格: {} (编号 {})", title, ordinal);
                records.push(TableRecord {
                    ordinal,
                    title,
                    html: table.html(),
                });
            }
            None => {
                warn!("⚠️ 标题 '{}' 之后没有 <table> 元素，跳过", title);
            }
        }
    }

    records
}
