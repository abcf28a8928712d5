//! 批处理状态与进度

use crate::models::report::ReportToken;
use std::fmt;

/// 批处理状态机
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    Running,
    AwaitingReport,
    Ready,
    Failed,
}

impl BatchState {
    /// 运行中或等待报告时禁止再次启动
    pub fn can_start(&self) -> bool {
        !matches!(self, BatchState::Running | BatchState::AwaitingReport)
    }
}

/// 推送给展示层的进度事件
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// 重新打开批处理，展示状态已清空
    Reset,
    /// 批处理开始；`lines_beyond_cap` 为因行数上限未读取的数据行
    Started { total: usize, lines_beyond_cap: usize },
    /// 即将处理第 `index + 1` 行
    Processing { index: usize, total: usize },
    /// 第 `index + 1` 行已完成
    RowFinished {
        index: usize,
        total: usize,
        success: bool,
        fraction: f64,
    },
    /// 全部行完成，正在提交报告
    SubmittingReport { total: usize },
    /// 报告就绪
    ReportReady { token: ReportToken },
    /// 报告生成失败
    Failed { message: String },
}

/// 进度展示状态（每次覆盖写入）
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressState {
    pub fraction: f64,
    pub message: String,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self {
            fraction: 0.0,
            message: String::new(),
        }
    }
}

impl ProgressState {
    /// 根据事件覆盖当前展示状态
    pub fn apply(&mut self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Reset => *self = Self::default(),
            ProgressEvent::RowFinished { fraction, .. } => {
                self.fraction = *fraction;
                self.message = event.to_string();
            }
            _ => self.message = event.to_string(),
        }
    }
}

/// (i+1)/n，限制在 [0, 1]
pub fn progress_fraction(index: usize, total: usize) -> f64 {
    if total == 0 {
        return 1.0;
    }
    ((index + 1) as f64 / total as f64).clamp(0.0, 1.0)
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressEvent::Reset => Ok(()),
            ProgressEvent::Started { total, .. } => write!(f, "Starting batch of {} rows", total),
            ProgressEvent::Processing { index, total } => {
                write!(f, "Processing row {} of {}", index + 1, total)
            }
            ProgressEvent::RowFinished {
                index,
                total,
                fraction,
                ..
            } => write!(
                f,
                "Processed {} of {} ({:.0}%)",
                index + 1,
                total,
                fraction * 100.0
            ),
            ProgressEvent::SubmittingReport { .. } => write!(f, "Generating report..."),
            ProgressEvent::ReportReady { .. } => write!(f, "Report ready"),
            ProgressEvent::Failed { message } => f.write_str(message),
        }
    }
}
