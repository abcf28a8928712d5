//! 单次查询的数据模型
//!
//! 查询请求、人物记录和统一的查询结果

use crate::error::InputError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value as JsonValue};

/// 查询请求
///
/// 序列化后即为 `/lookup` 的请求体 `{company, role}`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupRequest {
    pub company: String,
    pub role: String,
}

impl LookupRequest {
    /// 创建请求，两个字段都会去除首尾空白
    pub fn new(company: impl AsRef<str>, role: impl AsRef<str>) -> Self {
        Self {
            company: company.as_ref().trim().to_string(),
            role: role.as_ref().trim().to_string(),
        }
    }

    /// 创建请求并要求两个字段都非空（单次查询入口使用）
    pub fn validated(company: impl AsRef<str>, role: impl AsRef<str>) -> Result<Self, InputError> {
        let request = Self::new(company, role);
        if request.company.is_empty() || request.role.is_empty() {
            return Err(InputError::MissingLookupFields);
        }
        Ok(request)
    }
}

/// 查询服务返回的人物记录
///
/// 成功响应体按原样接收：所有字段都是可选的，类型不符的字段按缺失处理，
/// 未识别的字段保存在 `extra` 中，提交报告时会原样带回。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonRecord {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub current_title: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub primary_source: Option<String>,
    /// 验证来源 URL（顺序无意义，允许重复）
    #[serde(default, deserialize_with = "deserialize_sources")]
    pub validation_sources: Vec<String>,
    #[serde(
        default,
        deserialize_with = "lenient_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub attempts: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub cache: bool,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// 置信度分档
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceBand {
    High,
    Medium,
    Low,
}

impl ConfidenceBand {
    /// > 0.8 为高，>= 0.6 为中，其余（包括缺失和 NaN）为低
    pub fn from_score(score: Option<f64>) -> Self {
        match score {
            Some(s) if s > 0.8 => ConfidenceBand::High,
            Some(s) if s >= 0.6 => ConfidenceBand::Medium,
            _ => ConfidenceBand::Low,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConfidenceBand::High => "high",
            ConfidenceBand::Medium => "medium",
            ConfidenceBand::Low => "low",
        }
    }
}

impl PersonRecord {
    /// 姓名齐全时返回 "First Last"，否则返回 "Unknown"
    pub fn full_name(&self) -> String {
        match (non_blank(&self.first_name), non_blank(&self.last_name)) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            _ => "Unknown".to_string(),
        }
    }

    pub fn display_title(&self) -> &str {
        non_blank(&self.current_title).unwrap_or("Couldn't Fetch Title")
    }

    /// 有效的置信度（NaN 视为缺失）
    pub fn score(&self) -> Option<f64> {
        self.confidence_score.filter(|s| !s.is_nan())
    }

    pub fn confidence_band(&self) -> ConfidenceBand {
        ConfidenceBand::from_score(self.score())
    }

    /// 保留两位小数，缺失时为 "N/A"
    pub fn format_score(&self) -> String {
        match self.score() {
            Some(s) => format!("{:.2}", s),
            None => "N/A".to_string(),
        }
    }

    /// 服务端"无可靠结果"的提示
    ///
    /// 只有 `error` 非空时才算：优先返回 `detail`，其次 `error`。
    pub fn error(&self) -> Option<&str> {
        let error = extra_str(&self.extra, "error")?;
        Some(extra_str(&self.extra, "detail").unwrap_or(error))
    }

    /// 主来源优先，其次第一个验证来源
    pub fn best_source(&self) -> Option<&str> {
        non_blank(&self.primary_source).or_else(|| {
            self.validation_sources
                .first()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
        })
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn extra_str<'a>(extra: &'a Map<String, JsonValue>, key: &str) -> Option<&'a str> {
    extra
        .get(key)
        .and_then(JsonValue::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

// 类型不符（包括 null）时取默认值，不让整条记录失败
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let raw = JsonValue::deserialize(deserializer)?;
    Ok(serde_json::from_value(raw).unwrap_or_default())
}

// attempts 可能以 1.0 或 "2" 的形式出现
fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let count = match JsonValue::deserialize(deserializer)? {
        JsonValue::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0)
                .map(|f| f as u64)
        }),
        JsonValue::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    Ok(count.and_then(|c| u32::try_from(c).ok()))
}

// validation_sources 可能为 null、不是数组，或数组中夹杂非字符串
fn deserialize_sources<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let sources = match JsonValue::deserialize(deserializer)? {
        JsonValue::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                JsonValue::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };
    Ok(sources)
}

/// 单行查询结果：成功或失败，二者必居其一
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Success(PersonRecord),
    Failure(String),
}

impl LookupOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, LookupOutcome::Success(_))
    }

    pub fn person(&self) -> Option<&PersonRecord> {
        match self {
            LookupOutcome::Success(person) => Some(person),
            LookupOutcome::Failure(_) => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            LookupOutcome::Success(_) => None,
            LookupOutcome::Failure(message) => Some(message),
        }
    }

    /// 是否真正找到了人物（成功且记录中没有"无可靠结果"提示）
    pub fn is_found(&self) -> bool {
        self.problem().is_none()
    }

    /// 需要展示给用户的问题：失败消息，或成功记录中的 error
    pub fn problem(&self) -> Option<&str> {
        match self {
            LookupOutcome::Success(person) => person.error(),
            LookupOutcome::Failure(message) => Some(message),
        }
    }
}
