use serde::Deserialize;
use std::path::Path;

use crate::error::{AppError, AppResult, ConfigError};

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 同时处理的文档数量
    pub max_concurrent_documents: usize,
    /// 待处理 PDF 存放目录
    pub pdf_folder: String,
    /// 输出根目录（每个文档一个子目录）
    pub output_dir: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    /// 快速分类的最大输出 token
    pub fast_max_tokens: u32,
    /// 深度分类的最大输出 token
    pub deep_max_tokens: u32,
    pub llm_timeout_secs: u64,
    // --- 文档抽取服务配置 ---
    pub extraction_api_key: String,
    pub extraction_api_url: String,
    pub extraction_timeout_secs: u64,
    /// 上下文定位时识别的年份标记（佛历与公历）
    pub year_tokens: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent_documents: 3,
            pdf_folder: "input".to_string(),
            output_dir: "output".to_string(),
            verbose_logging: false,
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o".to_string(),
            fast_max_tokens: 1000,
            deep_max_tokens: 2000,
            llm_timeout_secs: 120,
            extraction_api_key: String::new(),
            extraction_api_url: "https://api.va.landing.ai/v1/tools/agentic-document-analysis"
                .to_string(),
            extraction_timeout_secs: 600,
            year_tokens: default_year_tokens(),
        }
    }
}

/// 默认年份标记
pub fn default_year_tokens() -> Vec<String> {
    ["2567", "2566", "2565", "2564", "2024", "2023", "2022", "2021"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Config {
    /// 加载配置：先读 `ANALYZER_CONFIG` 指向的 TOML 文件（可选），再用环境变量覆盖
    pub fn load() -> AppResult<Self> {
        let base = match std::env::var("ANALYZER_CONFIG") {
            Ok(path) if !path.trim().is_empty() => Self::from_file(Path::new(&path))?,
            _ => Self::default(),
        };
        base.apply_env()
    }

    /// 只从环境变量加载
    pub fn from_env() -> AppResult<Self> {
        Self::default().apply_env()
    }

    /// 从 TOML 文件加载
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
        Self::from_toml_str(&content, &path.display().to_string())
    }

    /// 从 TOML 字符串解析，缺失字段使用默认值
    pub fn from_toml_str(content: &str, origin: &str) -> AppResult<Self> {
        toml::from_str(content).map_err(|source| {
            AppError::Config(ConfigError::TomlParseFailed {
                path: origin.to_string(),
                source,
            })
        })
    }

    /// 用环境变量覆盖已有配置
    pub fn apply_env(self) -> AppResult<Self> {
        Ok(Self {
            max_concurrent_documents: env_parse("MAX_CONCURRENT_DOCUMENTS", self.max_concurrent_documents)?,
            pdf_folder: env_string("PDF_FOLDER", self.pdf_folder),
            output_dir: env_string("OUTPUT_DIR", self.output_dir),
            verbose_logging: env_parse("VERBOSE_LOGGING", self.verbose_logging)?,
            llm_api_key: env_string("LLM_API_KEY", self.llm_api_key),
            llm_api_base_url: env_string("LLM_API_BASE_URL", self.llm_api_base_url),
            llm_model_name: env_string("LLM_MODEL_NAME", self.llm_model_name),
            fast_max_tokens: env_parse("FAST_MAX_TOKENS", self.fast_max_tokens)?,
            deep_max_tokens: env_parse("DEEP_MAX_TOKENS", self.deep_max_tokens)?,
            llm_timeout_secs: env_parse("LLM_TIMEOUT_SECS", self.llm_timeout_secs)?,
            extraction_api_key: env_string("VISION_AGENT_API_KEY", self.extraction_api_key),
            extraction_api_url: env_string("EXTRACTION_API_URL", self.extraction_api_url),
            extraction_timeout_secs: env_parse("EXTRACTION_TIMEOUT_SECS", self.extraction_timeout_secs)?,
            year_tokens: match std::env::var("YEAR_TOKENS") {
                Ok(raw) => parse_year_tokens(&raw),
                Err(_) => self.year_tokens,
            },
        })
    }

    /// 校验必需的配置项
    ///
    /// 这是整个运行中唯一允许直接中止的错误
    pub fn validate(&self) -> AppResult<()> {
        if self.llm_api_key.trim().is_empty() {
            return Err(AppError::missing_config("LLM_API_KEY"));
        }
        if self.extraction_api_key.trim().is_empty() {
            return Err(AppError::missing_config("VISION_AGENT_API_KEY"));
        }
        if self.max_concurrent_documents == 0 {
            return Err(AppError::Config(ConfigError::EnvVarParseFailed {
                var_name: "MAX_CONCURRENT_DOCUMENTS".to_string(),
                value: "0".to_string(),
                expected_type: "正整数".to_string(),
            }));
        }
        Ok(())
    }
}

fn env_string(var_name: &str, fallback: String) -> String {
    std::env::var(var_name).unwrap_or(fallback)
}

fn env_parse<T: std::str::FromStr>(var_name: &str, fallback: T) -> AppResult<T> {
    match std::env::var(var_name) {
        Ok(value) => value.trim().parse().map_err(|_| {
            AppError::Config(ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: std::any::type_name::<T>().to_string(),
            })
        }),
        Err(_) => Ok(fallback),
    }
}

fn parse_year_tokens(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
