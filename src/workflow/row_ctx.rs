//! 行处理上下文
//!
//! 封装"我正在处理第几行，共几行"这一信息

use std::fmt::Display;

/// 行处理上下文
#[derive(Debug, Clone, Copy)]
pub struct RowCtx {
    /// 行在本批中的索引（从 0 开始）
    pub index: usize,

    /// 本批总行数
    pub total: usize,
}

impl RowCtx {
    pub fn new(index: usize, total: usize) -> Self {
        Self { index, total }
    }

    /// 从 1 开始的行号（仅用于日志显示）
    pub fn number(&self) -> usize {
        self.index + 1
    }
}

impl Display for RowCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[行 {}/{}]", self.number(), self.total)
    }
}
