//! 报告会话 - 业务能力层
//!
//! 持有本次批处理的报告令牌，并控制"查看报告"动作是否可用

use crate::models::{ReportToken, ReportTokens};

/// 报告会话
///
/// 职责：
/// - 最多持有一组令牌
/// - 新一轮批处理开始时整体丢弃（不撤销）
/// - 兑换不会消耗令牌，可重复兑换
#[derive(Debug, Default)]
pub struct ReportSession {
    tokens: Option<ReportTokens>,
    view_enabled: bool,
}

impl ReportSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// 保存令牌并启用"查看报告"
    pub fn store(&mut self, tokens: ReportTokens) {
        self.tokens = Some(tokens);
        self.view_enabled = true;
    }

    /// 丢弃令牌并禁用"查看报告"
    pub fn clear(&mut self) {
        self.tokens = None;
        self.view_enabled = false;
    }

    pub fn is_view_enabled(&self) -> bool {
        self.view_enabled
    }

    pub fn tokens(&self) -> Option<&ReportTokens> {
        self.tokens.as_ref()
    }

    /// 兑换 PDF 令牌；未持有令牌或动作未启用时为 None
    pub fn redeem(&self) -> Option<&ReportToken> {
        self.redeemable().map(|t| &t.pdf)
    }

    /// 兑换 CSV 令牌
    pub fn redeem_csv(&self) -> Option<&ReportToken> {
        self.redeemable().and_then(|t| t.csv.as_ref())
    }

    fn redeemable(&self) -> Option<&ReportTokens> {
        if !self.view_enabled {
            return None;
        }
        self.tokens.as_ref()
    }
}
