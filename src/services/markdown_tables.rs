//! 全文表格解析 - 业务能力层
//!
//! 从全文渲染中按出现顺序取出所有 `<table>`，生成 tables.html 和每张表的 CSV

use csv::WriterBuilder;
use scraper::{ElementRef, Html, Selector};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};

/// 抽取服务在全文中插入的分页标记
pub const PAGE_BREAK: &str = "<!-- PAGE BREAK -->";

/// 表格列表文件名
pub const TABLES_HTML: &str = "tables.html";

/// 从全文中解析出的一张表
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTable {
    /// 全文中的顺序编号（从 1 开始）
    pub number: usize,
    /// 所在页（从 0 开始）
    pub page: usize,
    pub html: String,
    pub rows: Vec<Vec<String>>,
}

impl ParsedTable {
    pub fn title(&self) -> String {
        format!("Table {} (Page {})", self.number, self.page)
    }

    pub fn csv_file_name(&self) -> String {
        format!("table_{}_page_{}.csv", self.number, self.page)
    }
}

/// 解析全文中的所有表格
pub fn parse_tables(full_text: &str) -> Vec<ParsedTable> {
    let (table_selector, row_selector, cell_selector) =
        match (Selector::parse("table"), Selector::parse("tr"), Selector::parse("th, td")) {
            (Ok(t), Ok(r), Ok(c)) => (t, r, c),
            _ => {
                warn!("无法创建表格选择器");
                return Vec::new();
            }
        };

    let mut tables = Vec::new();
    for (page, page_text) in full_text.split(PAGE_BREAK).enumerate() {
        let fragment = Html::parse_fragment(page_text);
        for table in fragment.root_element().select(&table_selector) {
            // 嵌套表格由外层表格整体导出
            if has_table_ancestor(&table) {
                continue;
            }
            let rows = table
                .select(&row_selector)
                .map(|row| {
                    row.select(&cell_selector)
                        .map(|cell| normalize_cell(&cell.text().collect::<String>()))
                        .collect::<Vec<_>>()
                })
                .filter(|cells| !cells.is_empty())
                .collect();

            tables.push(ParsedTable {
                number: tables.len() + 1,
                page,
                html: table.html(),
                rows,
            });
        }
    }

    debug!("从全文中解析出 {} 张表格", tables.len());
    tables
}

fn has_table_ancestor(element: &ElementRef) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| ancestor.value().name() == "table")
}

fn normalize_cell(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 生成 tables.html 内容：每张表一个 `<h2>` 标题加表格本身
pub fn render_listing(tables: &[ParsedTable]) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Extracted tables</title></head>\n<body>\n",
    );
    for table in tables {
        html.push_str(&format!("<h2>{}</h2>\n{}\n", table.title(), table.html));
    }
    html.push_str("</body>\n</html>\n");
    html
}

/// 写出 tables.html 和所有 CSV，返回 CSV 路径
pub async fn save_tables(tables: &[ParsedTable], output_dir: &Path) -> AppResult<Vec<PathBuf>> {
    let listing_path = output_dir.join(TABLES_HTML);
    tokio::fs::write(&listing_path, render_listing(tables))
        .await
        .map_err(|e| AppError::file_write_failed(listing_path.display().to_string(), e))?;

    let mut written = Vec::with_capacity(tables.len());
    for table in tables {
        let path = output_dir.join(table.csv_file_name());
        tokio::fs::write(&path, rows_to_csv(&table.rows)?)
            .await
            .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;
        written.push(path);
    }

    info!("✓ 已保存 {} 张表格到 {}", tables.len(), output_dir.display());
    Ok(written)
}

fn rows_to_csv(rows: &[Vec<String>]) -> AppResult<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::<u8>::new());
    for row in rows {
        writer.write_record(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| AppError::file_write_failed("<csv buffer>", e.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::table_indexer::index_tables;
    use pretty_assertions::assert_eq;

    const FULL_TEXT: &str = "# งบการเงิน 2567\n\
<table><tr><th>รายการ</th><th>2567</th></tr><tr><td>เงินสด</td><td>1,000</td></tr></table>\n\
<!-- PAGE BREAK -->\n\
7 ที่ดิน อาคารและอุปกรณ์\n\
<table border=\"1\"><tr><td>ที่ดิน</td><td>  5,000 </td></tr></table>\n\
<p>text</p>\n\
<table><tr><td>ค่าเสื่อมราคา</td><td>(200)</td></tr></table>\n";

    #[test]
    fn test_tables_numbered_across_pages() {
        let tables = parse_tables(FULL_TEXT);
        assert_eq!(tables.len(), 3);
        assert_eq!(
            tables.iter().map(|t| (t.number, t.page)).collect::<Vec<_>>(),
            vec![(1, 0), (2, 1), (3, 1)]
        );
        assert_eq!(
            tables[0].rows,
            vec![
                vec!["รายการ".to_string(), "2567".to_string()],
                vec!["เงินสด".to_string(), "1,000".to_string()],
            ]
        );
        assert_eq!(tables[1].rows[0][1], "5,000");
        assert_eq!(tables[2].title(), "Table 3 (Page 1)");
    }

    #[test]
    fn test_listing_round_trips_through_indexer() {
        let tables = parse_tables(FULL_TEXT);
        let records = index_tables(&render_listing(&tables));
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].ordinal, 2);
        assert_eq!(records[1].title, "Table 2 (Page 1)");
        assert!(records[2].html.contains("ค่าเสื่อมราคา"));
    }

    #[test]
    fn test_nested_tables_are_not_exported_twice() {
        let text = "<table><tr><td><table><tr><td>inner</td></tr></table></td></tr></table>";
        assert_eq!(parse_tables(text).len(), 1);
    }

    #[tokio::test]
    async fn test_save_tables_writes_listing_and_csv() {
        let dir = tempfile::tempdir().unwrap();
        let tables = parse_tables(FULL_TEXT);

        let written = save_tables(&tables, dir.path()).await.unwrap();
        assert_eq!(written.len(), 3);
        assert!(dir.path().join(TABLES_HTML).exists());

        let csv = std::fs::read_to_string(dir.path().join("table_1_page_0.csv")).unwrap();
        assert_eq!(csv, "รายการ,2567\nเงินสด,\"1,000\"\n");
    }
}
