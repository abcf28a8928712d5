//! 单行处理流程 - 流程层
//!
//! 核心职责：定义"一行"的完整处理流程
//!
//! 流程顺序：
//! 1. 构建查询请求
//! 2. 调用查询服务（只尝试一次）
//! 3. 记录结果

use tracing::{info, warn};

use crate::clients::LookupApi;
use crate::models::{BatchEntry, BatchRow, LookupOutcome};
use crate::utils::logging::truncate_text;
use crate::workflow::row_ctx::RowCtx;

/// 单行处理流程
///
/// - 不持有任何批次状态
/// - 失败不会向上抛出，只会成为 `Failure`
pub struct RowFlow<'a, L: LookupApi + ?Sized> {
    lookup: &'a L,
    verbose_logging: bool,
}

impl<'a, L: LookupApi + ?Sized> RowFlow<'a, L> {
    pub fn new(lookup: &'a L, verbose_logging: bool) -> Self {
        Self {
            lookup,
            verbose_logging,
        }
    }

    pub async fn run(&self, row: &BatchRow, ctx: &RowCtx) -> BatchEntry {
        info!(
            "{} 🔍 {} @ {}",
            ctx,
            truncate_text(&row.title, 60),
            truncate_text(&row.company_name, 60)
        );

        let outcome = self.lookup.lookup(&row.to_request()).await;

        match (&outcome, outcome.problem()) {
            (LookupOutcome::Success(_), Some(message)) => {
                warn!("{} ⚠️ 无可靠结果: {}", ctx, message);
            }
            (LookupOutcome::Success(person), None) => {
                info!(
                    "{} ✓ {} - {} (置信度: {})",
                    ctx,
                    person.full_name(),
                    person.display_title(),
                    person.format_score()
                );
                if self.verbose_logging {
                    if let Some(source) = person.best_source() {
                        info!("{}   来源: {}", ctx, source);
                    }
                    info!(
                        "{}   尝试次数: {:?}, 缓存: {}, 验证来源: {} 个",
                        ctx,
                        person.attempts,
                        person.cache,
                        person.validation_sources.len()
                    );
                }
            }
            (LookupOutcome::Failure(message), _) => {
                warn!("{} ⚠️ 查询失败: {}", ctx, message);
            }
        }

        BatchEntry::new(row, outcome)
    }
}
