//! 程序配置
//!
//! 加载顺序：默认值 → TOML 文件（可选）→ 环境变量 → 命令行覆盖

use crate::error::{Result, ScoutError};
use serde::Deserialize;
use std::path::Path;

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 查询服务地址（/lookup、/batch-report-pdf 等接口所在的主机）
    pub api_base_url: String,
    /// 每批最多处理的数据行数
    pub max_batch_rows: usize,
    /// 报告下载目录
    pub report_dir: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8000".to_string(),
            max_batch_rows: 5,
            report_dir: "reports".to_string(),
            verbose_logging: false,
            output_log_file: "role_scout.log".to_string(),
        }
    }
}

impl Config {
    /// 从 TOML 文件加载，缺失的字段使用默认值，再叠加环境变量
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let base = match path {
            Some(path) => {
                let content =
                    std::fs::read_to_string(path).map_err(|e| ScoutError::io(path, e))?;
                Self::from_toml_str(&content)?
            }
            None => Self::default(),
        };

        let config = base.with_env();
        config.validate()?;
        Ok(config)
    }

    /// 解析 TOML 文本
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ScoutError::Config(e.to_string()))
    }

    fn with_env(self) -> Self {
        Self {
            api_base_url: std::env::var("SCOUT_API_BASE_URL").unwrap_or(self.api_base_url),
            max_batch_rows: std::env::var("MAX_BATCH_ROWS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(self.max_batch_rows),
            report_dir: std::env::var("REPORT_DIR").unwrap_or(self.report_dir),
            verbose_logging: std::env::var("VERBOSE_LOGGING")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(self.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(self.output_log_file),
        }
    }

    /// 检查配置是否可用
    pub fn validate(&self) -> Result<()> {
        if self.max_batch_rows == 0 {
            return Err(ScoutError::Config("max_batch_rows 必须至少为 1".to_string()));
        }
        if self.api_base_url.trim().is_empty() {
            return Err(ScoutError::Config("api_base_url 不能为空".to_string()));
        }
        Ok(())
    }
}
