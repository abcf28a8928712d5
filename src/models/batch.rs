//! 批处理数据模型

use crate::models::lookup::{LookupOutcome, LookupRequest, PersonRecord};
use serde::Serialize;

/// 从表格中提取出的一行（两个固定字段）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRow {
    pub title: String,
    pub company_name: String,
}

impl BatchRow {
    pub fn new(title: impl Into<String>, company_name: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            company_name: company_name.into(),
        }
    }

    /// Title 和 Company Name 都为空
    pub fn is_blank(&self) -> bool {
        self.title.trim().is_empty() && self.company_name.trim().is_empty()
    }

    /// 转换为查询请求（Title 对应 role）
    pub fn to_request(&self) -> LookupRequest {
        LookupRequest::new(&self.company_name, &self.title)
    }
}

/// 一行的处理结果
#[derive(Debug, Clone, PartialEq)]
pub struct BatchEntry {
    pub title: String,
    pub company_name: String,
    pub outcome: LookupOutcome,
}

/// 报告中的一行（五列，与生成的 CSV 报告一致）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub title: String,
    pub company_name: String,
    pub first_name: String,
    pub last_name: String,
    pub source: String,
}

impl BatchEntry {
    pub fn new(row: &BatchRow, outcome: LookupOutcome) -> Self {
        Self {
            title: row.title.clone(),
            company_name: row.company_name.clone(),
            outcome,
        }
    }

    /// 投影为报告行：失败或无可靠结果时 Source 列为错误信息
    pub fn report_row(&self) -> ReportRow {
        let (first_name, last_name, source) = match &self.outcome {
            LookupOutcome::Success(person) => match person.error() {
                Some(message) => (String::new(), String::new(), message.to_string()),
                None => (
                    trimmed(&person.first_name),
                    trimmed(&person.last_name),
                    person.best_source().unwrap_or_default().to_string(),
                ),
            },
            LookupOutcome::Failure(message) => (String::new(), String::new(), message.clone()),
        };

        ReportRow {
            title: self.title.clone(),
            company_name: self.company_name.clone(),
            first_name,
            last_name,
            source,
        }
    }
}

fn trimmed(value: &Option<String>) -> String {
    value.as_deref().unwrap_or_default().trim().to_string()
}

/// 整批结果，顺序与输入行一致
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchResult {
    entries: Vec<BatchEntry>,
}

impl BatchResult {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// 只允许追加
    pub fn push(&mut self, entry: BatchEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[BatchEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 找到人物的行数（无可靠结果按失败计）
    pub fn success_count(&self) -> usize {
        self.entries.iter().filter(|e| e.outcome.is_found()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.len() - self.success_count()
    }

    /// 构建报告生成接口的请求体 `{results: [...]}`
    pub fn report_payload(&self) -> ReportPayload<'_> {
        ReportPayload {
            results: self.entries.iter().map(ReportItem::from).collect(),
        }
    }
}

/// `/batch-report-pdf` 请求体
#[derive(Debug, Serialize)]
pub struct ReportPayload<'a> {
    pub results: Vec<ReportItem<'a>>,
}

/// 请求体中的单个元素：成功带 `result`，失败带 `error`
#[derive(Debug, Serialize)]
pub struct ReportItem<'a> {
    pub title: &'a str,
    pub company_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<&'a PersonRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'a str>,
}

impl<'a> From<&'a BatchEntry> for ReportItem<'a> {
    fn from(entry: &'a BatchEntry) -> Self {
        Self {
            title: &entry.title,
            company_name: &entry.company_name,
            result: entry.outcome.person(),
            error: entry.outcome.error_message(),
        }
    }
}
