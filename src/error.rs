//! 错误类型
//!
//! 只有"整批失败"或"输入无效"才会成为错误；单行查询失败永远被记录为
//! `LookupOutcome::Failure`，不会以 `Err` 的形式穿过异步边界。

use std::path::PathBuf;
use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum ScoutError {
    /// 输入错误（文件为空、缺少列、没有有效行等），批处理不会启动
    #[error("{0}")]
    Input(#[from] InputError),

    /// 报告生成失败（整批致命错误）
    #[error("报告生成失败: {message}")]
    Report { message: String },

    /// HTTP 传输错误
    #[error("HTTP错误: {0}")]
    Http(#[from] reqwest::Error),

    /// 文件读写错误
    #[error("文件错误 ({}): {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),

    /// JSON 序列化失败
    #[error("JSON解析失败: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScoutError {
    /// 包装 IO 错误并附带路径
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ScoutError::Io {
            path: path.into(),
            source,
        }
    }

    /// 报告生成错误
    pub fn report(message: impl Into<String>) -> Self {
        ScoutError::Report {
            message: message.into(),
        }
    }

    /// 是否为输入错误（用户可以修改文件后重试）
    pub fn is_input(&self) -> bool {
        matches!(self, ScoutError::Input(_))
    }
}

/// 输入错误
///
/// 这些消息会原样展示给用户。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("The uploaded file is empty.")]
    EmptyFile,

    #[error("The file needs a header row and at least one data row.")]
    MissingHeader,

    #[error("Missing required column(s): {}", missing_columns(.title, .company))]
    MissingColumns { title: bool, company: bool },

    #[error("No rows with a Title or Company Name were found.")]
    NoValidRows,

    #[error("Please provide both a company and a role.")]
    MissingLookupFields,
}

fn missing_columns(title: &bool, company: &bool) -> String {
    let mut names = Vec::new();
    if *title {
        names.push("\"Title\"");
    }
    if *company {
        names.push("\"Company Name\"");
    }
    names.join(", ")
}

/// 统一的 Result 类型
pub type Result<T> = std::result::Result<T, ScoutError>;
