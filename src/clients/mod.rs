//! 客户端层（Infrastructure）
//!
//! 查询服务的 HTTP 客户端，以及编排层依赖的两个能力接口。
//! 编排层只认识 `LookupApi` / `ReportApi`，测试中用内存实现替换。

pub mod scout_client;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{BatchResult, LookupOutcome, LookupRequest, ReportToken, ReportTokens};

pub use scout_client::ScoutClient;

/// 单次查询能力
///
/// 永远不返回错误：成功和失败都被规范化为 `LookupOutcome`。
#[async_trait]
pub trait LookupApi: Send + Sync {
    async fn lookup(&self, request: &LookupRequest) -> LookupOutcome;
}

/// 报告生成与下载地址
#[async_trait]
pub trait ReportApi: Send + Sync {
    /// 一次性提交整批结果，返回报告令牌
    async fn generate_report(&self, results: &BatchResult) -> Result<ReportTokens>;

    /// PDF 报告的下载地址
    fn pdf_url(&self, token: &ReportToken) -> String;

    /// CSV 报告的下载地址
    fn csv_url(&self, token: &ReportToken) -> String;
}
