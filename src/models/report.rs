//! 报告令牌

use serde::Deserialize;
use std::fmt;

/// 报告令牌：不透明字符串，只有下载接口认识它
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReportToken(String);

impl ReportToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReportToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 一次报告生成返回的令牌（PDF 必有，CSV 可选）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTokens {
    pub pdf: ReportToken,
    pub csv: Option<ReportToken>,
}

/// `/batch-report-pdf` 的响应体
#[derive(Debug, Default, Deserialize)]
pub struct ReportResponse {
    #[serde(default)]
    pub pdf_token: Option<String>,
    #[serde(default)]
    pub csv_token: Option<String>,
}

impl ReportResponse {
    /// 成功响应中必须带有非空的 pdf_token
    pub fn into_tokens(self) -> Option<ReportTokens> {
        let pdf = self.pdf_token.filter(|t| !t.trim().is_empty())?;
        Some(ReportTokens {
            pdf: ReportToken::new(pdf),
            csv: self
                .csv_token
                .filter(|t| !t.trim().is_empty())
                .map(ReportToken::new),
        })
    }
}
