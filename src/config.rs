//! 配置管理模块
//! 支持从环境变量和配置文件加载配置

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::mnemonic::WordCount;

/// 应用配置结构体
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "text"
}

/// 结果文件输出配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

/// 生成参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// 未指定 --count 时的批次大小
    pub default_batch_size: u32,
    /// 新生成助记词的单词数
    pub word_count: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            format: std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".into()),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: std::env::var("KEYGEN_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./data")),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            default_batch_size: std::env::var("KEYGEN_DEFAULT_COUNT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            word_count: std::env::var("KEYGEN_WORD_COUNT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(12),
        }
    }
}

impl GenerationConfig {
    /// 严格读取环境变量，无法解析的值直接报错
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            default_batch_size: parse_var(
                "KEYGEN_DEFAULT_COUNT",
                std::env::var("KEYGEN_DEFAULT_COUNT").ok(),
                10,
            )?,
            word_count: parse_var(
                "KEYGEN_WORD_COUNT",
                std::env::var("KEYGEN_WORD_COUNT").ok(),
                12,
            )?,
        })
    }

    /// 校验过的单词数，非法值回退到 12 词
    pub fn word_count(&self) -> WordCount {
        WordCount::from_words(self.word_count).unwrap_or_default()
    }
}

impl Config {
    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            logging: LoggingConfig::default(),
            output: OutputConfig::default(),
            generation: GenerationConfig::from_env()?,
        })
    }

    /// 从配置文件加载配置，缺失的段落取环境变量默认值
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: Config =
            toml::from_str(&content).with_context(|| "Failed to parse config file as TOML")?;

        Ok(config)
    }

    /// 从环境变量和配置文件合并加载（配置文件优先级更高）
    pub fn from_env_and_file<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let mut config = Self::from_env()?;

        if let Some(path) = path {
            if path.as_ref().exists() {
                config = Self::from_file(path)?;
            }
        }

        Ok(config)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            anyhow::bail!("LOG_LEVEL must be one of: {:?}", valid_levels);
        }

        if self.logging.format != "json" && self.logging.format != "text" {
            anyhow::bail!("LOG_FORMAT must be 'json' or 'text'");
        }

        if self.generation.default_batch_size == 0 {
            anyhow::bail!("KEYGEN_DEFAULT_COUNT must be a positive integer");
        }

        if WordCount::from_words(self.generation.word_count).is_none() {
            anyhow::bail!("KEYGEN_WORD_COUNT must be one of 12, 15, 18, 21, 24");
        }

        if self.output.dir.as_os_str().is_empty() {
            anyhow::bail!("KEYGEN_OUTPUT_DIR must not be empty");
        }

        Ok(())
    }
}

/// 未设置时取默认值；设置了但解析失败时保留原始值报错
fn parse_var<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{} has invalid value {:?}: {}", key, value, e)),
    }
}
