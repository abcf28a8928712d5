//! 报告写入服务 - 业务能力层
//!
//! 只负责"把下载好的报告写到磁盘"，不关心流程

use crate::error::{Result, ScoutError};
use regex::Regex;
use std::path::PathBuf;
use std::sync::OnceLock;
use tokio::fs;
use tracing::debug;

const BATCH_PDF_NAME: &str = "role_scout_batch_report.pdf";
const BATCH_CSV_NAME: &str = "role_scout_batch_report.csv";
const SINGLE_PDF_NAME: &str = "role_scout_report.pdf";

static UNSAFE_FILE_CHARS: OnceLock<Regex> = OnceLock::new();

fn unsafe_file_chars() -> &'static Regex {
    UNSAFE_FILE_CHARS
        .get_or_init(|| Regex::new(r"[^A-Za-z0-9_.-]+").expect("固定的正则表达式"))
}

/// 报告写入服务
pub struct ReportWriter {
    report_dir: PathBuf,
}

impl ReportWriter {
    /// 使用自定义目录创建
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            report_dir: dir.into(),
        }
    }

    /// 保存批处理 PDF 报告
    pub async fn save_batch_pdf(&self, bytes: &[u8]) -> Result<PathBuf> {
        self.write(BATCH_PDF_NAME, bytes).await
    }

    /// 保存批处理 CSV 报告
    pub async fn save_batch_csv(&self, bytes: &[u8]) -> Result<PathBuf> {
        self.write(BATCH_CSV_NAME, bytes).await
    }

    /// 保存单次查询的 PDF，文件名取自人名
    pub async fn save_single_pdf(&self, full_name: &str, bytes: &[u8]) -> Result<PathBuf> {
        self.write(&single_report_name(full_name), bytes).await
    }

    async fn write(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
        fs::create_dir_all(&self.report_dir)
            .await
            .map_err(|e| ScoutError::io(&self.report_dir, e))?;

        let path = self.report_dir.join(file_name);
        debug!("写入报告: {} ({} 字节)", path.display(), bytes.len());

        fs::write(&path, bytes)
            .await
            .map_err(|e| ScoutError::io(&path, e))?;

        Ok(path)
    }
}

/// 人名转为安全的文件名；姓名未知时使用默认名
pub fn single_report_name(full_name: &str) -> String {
    let name = full_name.trim();
    if name.is_empty() || name == "Unknown" {
        return SINGLE_PDF_NAME.to_string();
    }

    let stem = unsafe_file_chars().replace_all(name, "_");

    if stem.trim_matches('_').is_empty() {
        SINGLE_PDF_NAME.to_string()
    } else {
        format!("{}.pdf", stem)
    }
}
