//! 日志工具模块
//!
//! 提供日志初始化、运行日志文件和格式化输出的辅助函数

use crate::error::{Result, ScoutError};
use crate::models::{BatchResult, LookupOutcome};
use std::fs::{self, OpenOptions};
use std::io::Write;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化 tracing 日志
///
/// `RUST_LOG` 优先；否则为 info，详细模式下为 debug。重复调用无副作用。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 初始化运行日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n批量查询日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header).map_err(|e| ScoutError::io(log_file_path, e))?;
    Ok(())
}

/// 将整批结果逐行追加到运行日志
pub fn append_batch_log(log_file_path: &str, results: &BatchResult) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)
        .map_err(|e| ScoutError::io(log_file_path, e))?;

    let mut lines = String::new();
    for (index, entry) in results.entries().iter().enumerate() {
        let status = match &entry.outcome {
            LookupOutcome::Success(person) => match person.error() {
                Some(message) => format!("无结果: {}", message),
                None => format!(
                    "{} | {} | {}",
                    person.full_name(),
                    person.display_title(),
                    person.format_score()
                ),
            },
            LookupOutcome::Failure(message) => format!("失败: {}", message),
        };
        lines.push_str(&format!(
            "行 {} | {} | {} | {}\n",
            index + 1,
            entry.title,
            entry.company_name,
            status
        ));
    }

    file.write_all(lines.as_bytes())
        .map_err(|e| ScoutError::io(log_file_path, e))?;
    Ok(())
}

/// 记录批次开始信息
///
/// # 参数
/// - `total`: 本批行数
/// - `lines_beyond_cap`: 因上限未读取的行数
/// - `max_rows`: 行数上限
pub fn log_batch_start(total: usize, lines_beyond_cap: usize, max_rows: usize) {
    info!("{}", "=".repeat(60));
    info!("📦 开始批量查询: 共 {} 行", total);
    if lines_beyond_cap > 0 {
        info!(
            "✂️ 每批最多 {} 行，另有 {} 行未处理",
            max_rows, lines_beyond_cap
        );
    }
    info!("{}", "=".repeat(60));
}

/// 记录批次完成信息
pub fn log_batch_complete(results: &BatchResult) {
    info!("{}", "─".repeat(60));
    info!(
        "✓ 查询完成: 成功 {}/{}，失败 {}",
        results.success_count(),
        results.len(),
        results.failure_count()
    );
    info!("{}", "─".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
