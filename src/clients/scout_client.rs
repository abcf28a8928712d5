//! 查询服务 API 客户端
//!
//! 封装 /lookup、/batch-report-pdf、/pdf-download、/csv-download、/report 的调用

use crate::clients::{LookupApi, ReportApi};
use crate::config::Config;
use crate::error::{Result, ScoutError};
use crate::models::{
    BatchResult, LookupOutcome, LookupRequest, PersonRecord, ReportResponse, ReportToken,
    ReportTokens,
};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, warn};

const LOOKUP_FAILED: &str = "Lookup failed";
const NETWORK_ERROR: &str = "Network error";
const REPORT_FAILED: &str = "Report generation failed";

/// 查询服务客户端
#[derive(Clone)]
pub struct ScoutClient {
    http: reqwest::Client,
    base_url: String,
}

impl ScoutClient {
    /// 创建新的客户端
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_base_url(&config.api_base_url)
    }

    /// 使用自定义地址创建
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// 下载报告文件
    ///
    /// # 参数
    /// - `url`: 由令牌拼出的下载地址
    ///
    /// # 返回
    /// 返回文件内容
    pub async fn download(&self, url: &str) -> Result<Vec<u8>> {
        debug!("下载报告: {}", url);

        let response = self.http.get(url).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;

        Ok(bytes.to_vec())
    }

    /// 为单次查询结果生成 PDF
    ///
    /// 结果以 JSON 字符串放在表单字段 `payload` 中提交。
    pub async fn single_report(&self, person: &PersonRecord) -> Result<Vec<u8>> {
        let payload = serde_json::to_string(person)?;

        let response = self
            .http
            .post(self.endpoint("report"))
            .form(&[("payload", payload)])
            .send()
            .await?
            .error_for_status()?;

        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl LookupApi for ScoutClient {
    async fn lookup(&self, request: &LookupRequest) -> LookupOutcome {
        debug!("查询: {} / {}", request.company, request.role);

        let response = match self
            .http
            .post(self.endpoint("lookup"))
            .json(request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("查询请求失败: {}", e);
                return LookupOutcome::Failure(network_message(&e));
            }
        };

        let status = response.status();
        match response.text().await {
            Ok(body) => outcome_from_response(status, &body),
            Err(e) => LookupOutcome::Failure(network_message(&e)),
        }
    }
}

#[async_trait]
impl ReportApi for ScoutClient {
    async fn generate_report(&self, results: &BatchResult) -> Result<ReportTokens> {
        debug!("提交报告，共 {} 行", results.len());

        let response = self
            .http
            .post(self.endpoint("batch-report-pdf"))
            .json(&results.report_payload())
            .send()
            .await
            .map_err(|e| ScoutError::report(network_message(&e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ScoutError::report(network_message(&e)))?;

        tokens_from_response(status, &body)
    }

    fn pdf_url(&self, token: &ReportToken) -> String {
        self.endpoint(&format!("pdf-download/{}", token))
    }

    fn csv_url(&self, token: &ReportToken) -> String {
        self.endpoint(&format!("csv-download/{}", token))
    }
}

/// 将查询响应规范化为结果
///
/// 非成功状态码：优先取响应体的 `error`，其次 `detail`，否则为 "Lookup failed"。
/// 成功状态码：响应体按原样接收。
pub fn outcome_from_response(status: StatusCode, body: &str) -> LookupOutcome {
    if !status.is_success() {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| error_field(&v))
            .unwrap_or_else(|| LOOKUP_FAILED.to_string());
        return LookupOutcome::Failure(message);
    }

    match serde_json::from_str::<PersonRecord>(body) {
        Ok(person) => LookupOutcome::Success(person),
        Err(e) => LookupOutcome::Failure(e.to_string()),
    }
}

/// 将报告生成响应转换为令牌
pub fn tokens_from_response(status: StatusCode, body: &str) -> Result<ReportTokens> {
    if !status.is_success() {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| error_field(&v))
            .unwrap_or_else(|| REPORT_FAILED.to_string());
        return Err(ScoutError::report(message));
    }

    serde_json::from_str::<ReportResponse>(body)
        .ok()
        .and_then(ReportResponse::into_tokens)
        .ok_or_else(|| ScoutError::report("Report generation returned no token"))
}

fn error_field(body: &Value) -> Option<String> {
    ["error", "detail"].iter().find_map(|key| {
        body.get(*key)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

fn network_message(e: &reqwest::Error) -> String {
    let message = e.to_string();
    if message.trim().is_empty() {
        NETWORK_ERROR.to_string()
    } else {
        message
    }
}
