//! 表格分类结果
//!
//! LLM 返回的 JSON 字段类型并不总是可靠（数字可能带千分位、年份可能是数字），
//! 因此数值字段使用宽松的反序列化。

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::table::TableRecord;

/// 财务报表类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum TableType {
    BalanceSheet,
    ProfitLoss,
    FixedAssets,
    Notes,
    CashFlow,
    Equity,
    Other,
}

impl TableType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableType::BalanceSheet => "balance_sheet",
            TableType::ProfitLoss => "profit_loss",
            TableType::FixedAssets => "fixed_assets",
            TableType::Notes => "notes",
            TableType::CashFlow => "cash_flow",
            TableType::Equity => "equity",
            TableType::Other => "other",
        }
    }
}

impl From<String> for TableType {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "balance_sheet" => TableType::BalanceSheet,
            "profit_loss" => TableType::ProfitLoss,
            "fixed_assets" => TableType::FixedAssets,
            "notes" => TableType::Notes,
            "cash_flow" => TableType::CashFlow,
            "equity" => TableType::Equity,
            _ => TableType::Other,
        }
    }
}

impl std::fmt::Display for TableType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 分类置信度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum Confidence {
    High,
    Medium,
    #[default]
    Low,
}

impl From<String> for Confidence {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "high" => Confidence::High,
            "medium" => Confidence::Medium,
            _ => Confidence::Low,
        }
    }
}

/// 快速分类结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    #[serde(default, deserialize_with = "lenient_u32")]
    pub table_number: u32,
    #[serde(default = "default_table_type")]
    pub table_type: TableType,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub contains_depreciation: bool,
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub key_headers: Vec<String>,
    #[serde(default)]
    pub confidence: Confidence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ClassificationResult {
    /// 分类失败时的降级结果
    pub fn degraded(table_number: u32, error: impl Into<String>) -> Self {
        Self {
            table_number,
            table_type: TableType::Other,
            contains_depreciation: false,
            key_headers: Vec::new(),
            confidence: Confidence::Low,
            error: Some(error.into()),
        }
    }
}

/// 深度分类结果（带上下文）
///
/// `year` 保持文档原始纪年（佛历 2567 或公历 2024），不做换算。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeepClassificationResult {
    #[serde(flatten)]
    pub base: ClassificationResult,
    #[serde(deserialize_with = "lenient_year")]
    pub year: Option<String>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub depreciation_amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub ebit_amount: Option<f64>,
    /// 原文语言的科目名称 → 金额
    #[serde(default, deserialize_with = "lenient_amount_map")]
    pub key_line_items: BTreeMap<String, f64>,
}

impl DeepClassificationResult {
    /// 深度分类失败时的降级结果
    pub fn degraded(table_number: u32, error: impl Into<String>) -> Self {
        Self {
            base: ClassificationResult::degraded(table_number, error),
            year: None,
            depreciation_amount: None,
            ebit_amount: None,
            key_line_items: BTreeMap::new(),
        }
    }
}

/// 单张表的最终分析结果
///
/// 深度结果整体替换快速结果，两者从不逐字段合并
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TableAnalysis {
    Deep(DeepClassificationResult),
    Basic(ClassificationResult),
}

/// 写入 ai_analysis.json 的记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    #[serde(flatten)]
    pub analysis: TableAnalysis,
    pub table_title: String,
    pub original_csv: String,
}

impl AnalysisRecord {
    /// 附上表格标题和 CSV 通配符
    pub fn for_table(analysis: TableAnalysis, table: &TableRecord) -> Self {
        Self {
            analysis,
            table_title: table.title.clone(),
            original_csv: table.csv_glob(),
        }
    }

    fn base(&self) -> &ClassificationResult {
        match &self.analysis {
            TableAnalysis::Deep(deep) => &deep.base,
            TableAnalysis::Basic(basic) => basic,
        }
    }

    pub fn table_number(&self) -> u32 {
        self.base().table_number
    }

    pub fn table_type(&self) -> TableType {
        self.base().table_type
    }

    pub fn confidence(&self) -> Confidence {
        self.base().confidence
    }

    pub fn contains_depreciation(&self) -> bool {
        self.base().contains_depreciation
    }

    pub fn error(&self) -> Option<&str> {
        self.base().error.as_deref()
    }

    pub fn is_deep(&self) -> bool {
        matches!(self.analysis, TableAnalysis::Deep(_))
    }

    pub fn year(&self) -> Option<&str> {
        match &self.analysis {
            TableAnalysis::Deep(deep) => deep.year.as_deref(),
            TableAnalysis::Basic(_) => None,
        }
    }

    pub fn depreciation_amount(&self) -> Option<f64> {
        match &self.analysis {
            TableAnalysis::Deep(deep) => deep.depreciation_amount,
            TableAnalysis::Basic(_) => None,
        }
    }
}

// ========== 宽松反序列化 ==========

fn default_table_type() -> TableType {
    TableType::Other
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()).unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    })
}

/// 表头可能是年份数字（2567）或 null
fn lenient_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(b) => Some(b.to_string()),
                _ => None,
            })
            .collect(),
        Value::String(s) if !s.trim().is_empty() => vec![s],
        _ => Vec::new(),
    })
}

fn lenient_year<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(amount_from_value(&value))
}

fn lenient_amount_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Object(items) = value else {
        return Ok(BTreeMap::new());
    };
    Ok(items
        .iter()
        .filter_map(|(label, amount)| amount_from_value(amount).map(|v| (label.clone(), v)))
        .collect())
}

/// 解析金额：支持数字、带千分位的字符串和括号负数
pub fn amount_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s.trim().chars().filter(|c| *c != ',' && *c != ' ').collect();
            if let Some(inner) = cleaned.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
                inner.parse::<f64>().ok().map(|v| -v)
            } else {
                cleaned.parse().ok()
            }
        }
        _ => None,
    }
}
