//! 表格处理上下文
//!
//! 封装"我正在处理哪个文档的第几张表"这一信息

use std::fmt::Display;

/// 表格处理上下文
#[derive(Debug, Clone)]
pub struct TableCtx {
    /// 文档名（仅用于日志显示）
    pub document: String,

    /// 表格在列表中的位置（从1开始）
    pub position: usize,

    /// 列表中的表格总数
    pub total: usize,

    /// 标题中的表格编号
    pub ordinal: u32,
}

impl TableCtx {
    pub fn new(document: impl Into<String>, position: usize, total: usize, ordinal: u32) -> Self {
        Self {
            document: document.into(),
            position,
            total,
            ordinal,
        }
    }
}

impl Display for TableCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[文档 {} 表格 {}/{} 编号#{}]",
            self.document, self.position, self.total, self.ordinal
        )
    }
}
