//! 应用入口 - 编排层
//!
//! 持有配置、HTTP 客户端和报告写入服务，把命令行动作转换为编排器调用。

use std::path::{Path, PathBuf};

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::clients::{LookupApi, ScoutClient};
use crate::config::Config;
use crate::error::Result;
use crate::models::loaders::load_csv_file;
use crate::models::{BatchResult, LookupOutcome, LookupRequest, PersonRecord, ProgressEvent};
use crate::orchestrator::batch_processor::BatchOrchestrator;
use crate::services::ReportWriter;
use crate::utils::logging::{append_batch_log, init_log_file};

/// 批处理完成后的下载选项
#[derive(Debug, Clone, Copy)]
pub struct DownloadOptions {
    /// 下载 PDF 报告
    pub pdf: bool,
    /// 同时下载 CSV 报告
    pub csv: bool,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            pdf: true,
            csv: false,
        }
    }
}

/// 应用主结构
pub struct App {
    config: Config,
    client: ScoutClient,
    writer: ReportWriter,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> Result<Self> {
        config.validate()?;

        let client = ScoutClient::new(&config)?;
        let writer = ReportWriter::with_dir(&config.report_dir);

        info!("{}", "=".repeat(60));
        info!("🚀 程序启动 - 查询服务: {}", client.base_url());
        info!("📊 每批最多 {} 行", config.max_batch_rows);
        info!("{}", "=".repeat(60));

        Ok(Self {
            config,
            client,
            writer,
        })
    }

    /// 单次查询
    ///
    /// 公司或职位为空时直接返回输入错误，不发出请求。
    pub async fn lookup_one(
        &self,
        company: &str,
        role: &str,
        save_pdf: bool,
    ) -> Result<LookupOutcome> {
        let request = LookupRequest::validated(company, role)?;
        info!("🔍 查询: {} @ {}", request.role, request.company);

        let outcome = self.client.lookup(&request).await;

        match &outcome {
            LookupOutcome::Success(person) => {
                print_person(person);
                if save_pdf && person.error().is_none() {
                    let bytes = self.client.single_report(person).await?;
                    let path = self
                        .writer
                        .save_single_pdf(&person.full_name(), &bytes)
                        .await?;
                    info!("📄 报告已保存: {}", path.display());
                }
            }
            LookupOutcome::Failure(message) => {
                warn!("⚠️ 查询失败: {}", message);
            }
        }

        Ok(outcome)
    }

    /// 批量查询
    ///
    /// # 参数
    /// - `path`: 上传的表格文件
    /// - `downloads`: 完成后要下载的报告
    ///
    /// # 返回
    /// 返回整批结果
    pub async fn run_batch(&self, path: &Path, downloads: DownloadOptions) -> Result<BatchResult> {
        init_log_file(&self.config.output_log_file)?;

        let raw_text = load_csv_file(path).await?;

        let mut orchestrator =
            BatchOrchestrator::new(self.client.clone(), self.config.max_batch_rows)
                .with_verbose_logging(self.config.verbose_logging);
        let printer = spawn_progress_printer(orchestrator.subscribe());

        let outcome = orchestrator.start(&raw_text).await;
        let results = orchestrator.results().clone();

        if !results.is_empty() {
            append_batch_log(&self.config.output_log_file, &results)?;
            print_summary(&results);
        }

        let saved = match outcome {
            Ok(_) => self.view_report(&orchestrator, downloads).await,
            Err(e) => Err(e),
        };

        drop(orchestrator);
        let _ = printer.await;

        for path in saved? {
            info!("📄 报告已保存: {}", path.display());
        }
        info!("\n日志已保存至: {}", self.config.output_log_file);

        Ok(results)
    }

    /// "查看报告"：兑换令牌并下载到报告目录
    async fn view_report(
        &self,
        orchestrator: &BatchOrchestrator<ScoutClient>,
        downloads: DownloadOptions,
    ) -> Result<Vec<PathBuf>> {
        let mut saved = Vec::new();

        if downloads.pdf {
            if let Some(url) = orchestrator.redeem_report() {
                let bytes = self.client.download(&url).await?;
                saved.push(self.writer.save_batch_pdf(&bytes).await?);
            }
        } else if let Some(url) = orchestrator.redeem_report() {
            info!("🔗 报告地址: {}", url);
        }

        if downloads.csv {
            match orchestrator.redeem_csv() {
                Some(url) => {
                    let bytes = self.client.download(&url).await?;
                    saved.push(self.writer.save_batch_csv(&bytes).await?);
                }
                None => warn!("⚠️ 服务未返回 CSV 报告"),
            }
        }

        Ok(saved)
    }
}

/// 订阅进度并输出到日志
fn spawn_progress_printer(mut rx: UnboundedReceiver<ProgressEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match &event {
                ProgressEvent::Reset | ProgressEvent::Processing { .. } => {}
                ProgressEvent::RowFinished { fraction, .. } => {
                    info!("[{:>3.0}%] {}", fraction * 100.0, event);
                }
                ProgressEvent::Started {
                    lines_beyond_cap, ..
                } if *lines_beyond_cap > 0 => {
                    warn!("{} ({} 行超出上限未处理)", event, lines_beyond_cap);
                }
                ProgressEvent::Failed { .. } => error!("❌ {}", event),
                _ => info!("{}", event),
            }
        }
    })
}

fn print_person(person: &PersonRecord) {
    if let Some(message) = person.error() {
        warn!("⚠️ {}", message);
        return;
    }

    info!("{}", "─".repeat(60));
    info!("姓名: {}", person.full_name());
    info!("职位: {}", person.display_title());
    info!(
        "置信度: {} ({})",
        person.format_score(),
        person.confidence_band().label()
    );
    info!(
        "主来源: {}",
        person.primary_source.as_deref().unwrap_or("N/A")
    );
    info!("验证来源: {} 个", person.validation_sources.len());
    for url in &person.validation_sources {
        info!("  - {}", url);
    }
    if let Some(attempts) = person.attempts {
        info!("尝试次数: {}", attempts);
    }
    if person.cache {
        info!("（来自缓存）");
    }
    info!("{}", "─".repeat(60));
}

fn print_summary(results: &BatchResult) {
    info!("{}", "=".repeat(60));
    info!("📋 Title | Company Name | First Name | Last Name | Source");
    for row in results.entries().iter().map(|e| e.report_row()) {
        info!(
            "{} | {} | {} | {} | {}",
            row.title, row.company_name, row.first_name, row.last_name, row.source
        );
    }
    info!("{}", "=".repeat(60));
}
