use serde::{Deserialize, Serialize};

/// 表格列表中的一张表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRecord {
    /// 标题中声明的表格编号，无法识别时为 0（可能重复）
    pub ordinal: u32,
    /// 标题文字，如 "Table 7 (Page 0)"
    pub title: String,
    /// 单个 `<table>` 元素的 HTML
    pub html: String,
}

impl TableRecord {
    /// 该表对应的 CSV 导出文件通配符
    pub fn csv_glob(&self) -> String {
        format!("table_{}_*.csv", self.ordinal)
    }
}
