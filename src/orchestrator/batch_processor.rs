//! 批量查询处理器 - 编排层
//!
//! ## 职责
//!
//! 驱动一次完整的批量查询：提取行 → 逐行查询 → 汇总 → 提交报告 → 保存令牌。
//!
//! ## 状态机
//!
//! | 当前状态        | 触发                 | 下一状态         |
//! |-----------------|----------------------|------------------|
//! | Idle            | start（有有效行）    | Running          |
//! | Idle            | start（无有效行）    | Idle             |
//! | Running         | 所有行都有结果       | AwaitingReport   |
//! | AwaitingReport  | 报告返回令牌         | Ready            |
//! | AwaitingReport  | 报告失败             | Failed           |
//! | Ready / Failed  | open                 | Idle             |
//!
//! ## 设计特点
//!
//! - **严格串行**：上一行的结果返回之前不会发出下一行的查询
//! - **单行失败不中断**：失败被记录为 `Failure`，批处理继续
//! - **整批提交**：报告只接收完整的结果序列，且每轮只提交一次
//! - **进度推送**：展示层通过 `subscribe()` 订阅进度事件

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{error, info, warn};

use crate::clients::{LookupApi, ReportApi};
use crate::error::{InputError, Result, ScoutError};
use crate::models::{
    extract, progress_fraction, BatchResult, BatchRow, BatchState, ProgressEvent, ProgressState,
    ReportTokens,
};
use crate::services::ReportSession;
use crate::utils::logging::{log_batch_complete, log_batch_start};
use crate::workflow::{RowCtx, RowFlow};

/// 批量查询编排器
pub struct BatchOrchestrator<A: LookupApi + ReportApi> {
    api: A,
    max_rows: usize,
    verbose_logging: bool,
    state: BatchState,
    session: ReportSession,
    results: BatchResult,
    progress: ProgressState,
    progress_tx: Option<UnboundedSender<ProgressEvent>>,
}

impl<A: LookupApi + ReportApi> BatchOrchestrator<A> {
    /// 创建编排器
    ///
    /// # 参数
    /// - `api`: 查询与报告能力
    /// - `max_rows`: 每批最多处理的数据行数
    pub fn new(api: A, max_rows: usize) -> Self {
        Self {
            api,
            max_rows,
            verbose_logging: false,
            state: BatchState::Idle,
            session: ReportSession::new(),
            results: BatchResult::default(),
            progress: ProgressState::default(),
            progress_tx: None,
        }
    }

    pub fn with_verbose_logging(mut self, verbose: bool) -> Self {
        self.verbose_logging = verbose;
        self
    }

    /// 订阅进度事件（替换之前的订阅者）
    pub fn subscribe(&mut self) -> UnboundedReceiver<ProgressEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.progress_tx = Some(tx);
        rx
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    pub fn session(&self) -> &ReportSession {
        &self.session
    }

    pub fn results(&self) -> &BatchResult {
        &self.results
    }

    pub fn progress(&self) -> &ProgressState {
        &self.progress
    }

    /// 当前持有的令牌
    pub fn token(&self) -> Option<&ReportTokens> {
        self.session.tokens()
    }

    /// 重新打开批处理：清空进度展示、结果和令牌，回到 Idle
    pub fn open(&mut self) {
        if !self.state.can_start() {
            warn!("批处理进行中，忽略重新打开");
            return;
        }
        self.session.clear();
        self.results = BatchResult::default();
        self.state = BatchState::Idle;
        self.emit(ProgressEvent::Reset);
    }

    /// 从原始表格文本启动一次批处理
    ///
    /// 没有有效行时返回输入错误，状态保持 Idle。
    pub async fn start(&mut self, raw_text: &str) -> Result<ReportTokens> {
        if self.state != BatchState::Idle {
            self.open();
        }

        let extraction = extract(raw_text, self.max_rows);
        let lines_beyond_cap = extraction.lines_beyond_cap;

        match extraction.into_rows() {
            Ok(rows) => self.run_rows(rows, lines_beyond_cap).await,
            Err(issue) => Err(self.reject(issue)),
        }
    }

    /// 处理已经提取好的行
    ///
    /// 与 `start` 相同的规则：两个字段都为空的行被丢弃，超过上限的行不处理。
    pub async fn run_batch(&mut self, rows: Vec<BatchRow>) -> Result<ReportTokens> {
        if self.state != BatchState::Idle {
            self.open();
        }

        let mut rows: Vec<BatchRow> = rows.into_iter().filter(|row| !row.is_blank()).collect();
        let lines_beyond_cap = rows.len().saturating_sub(self.max_rows);
        rows.truncate(self.max_rows);

        if rows.is_empty() {
            return Err(self.reject(InputError::NoValidRows));
        }
        self.run_rows(rows, lines_beyond_cap).await
    }

    async fn run_rows(
        &mut self,
        rows: Vec<BatchRow>,
        lines_beyond_cap: usize,
    ) -> Result<ReportTokens> {
        let total = rows.len();

        // Idle → Running
        self.state = BatchState::Running;
        self.session.clear();
        self.results = BatchResult::with_capacity(total);

        log_batch_start(total, lines_beyond_cap, self.max_rows);
        self.emit(ProgressEvent::Started {
            total,
            lines_beyond_cap,
        });

        for (index, row) in rows.iter().enumerate() {
            let ctx = RowCtx::new(index, total);
            self.emit(ProgressEvent::Processing { index, total });

            let entry = RowFlow::new(&self.api, self.verbose_logging)
                .run(row, &ctx)
                .await;
            let success = entry.outcome.is_found();
            self.results.push(entry);

            self.emit(ProgressEvent::RowFinished {
                index,
                total,
                success,
                fraction: progress_fraction(index, total),
            });
        }

        log_batch_complete(&self.results);

        // Running → AwaitingReport
        self.state = BatchState::AwaitingReport;
        self.emit(ProgressEvent::SubmittingReport { total });
        info!("📤 正在提交报告，共 {} 行...", total);

        match self.api.generate_report(&self.results).await {
            Ok(tokens) => {
                info!("✓ 报告已生成");
                self.session.store(tokens.clone());
                self.state = BatchState::Ready;
                self.emit(ProgressEvent::ReportReady {
                    token: tokens.pdf.clone(),
                });
                Ok(tokens)
            }
            Err(e) => {
                let message = match &e {
                    ScoutError::Report { message } => message.clone(),
                    other => other.to_string(),
                };
                error!("❌ 报告生成失败: {}", message);
                self.state = BatchState::Failed;
                self.emit(ProgressEvent::Failed { message });
                Err(e)
            }
        }
    }

    /// 兑换 PDF 令牌，返回下载地址；不消耗令牌
    pub fn redeem_report(&self) -> Option<String> {
        self.session.redeem().map(|token| self.api.pdf_url(token))
    }

    /// 兑换 CSV 令牌，返回下载地址
    pub fn redeem_csv(&self) -> Option<String> {
        self.session.redeem_csv().map(|token| self.api.csv_url(token))
    }

    fn reject(&mut self, issue: InputError) -> ScoutError {
        warn!("⚠️ 批处理未启动: {}", issue);
        self.state = BatchState::Idle;
        self.emit(ProgressEvent::Failed {
            message: issue.to_string(),
        });
        issue.into()
    }

    fn emit(&mut self, event: ProgressEvent) {
        self.progress.apply(&event);
        if let Some(tx) = &self.progress_tx {
            // 订阅者已退出时忽略
            let _ = tx.send(event);
        }
    }
}
