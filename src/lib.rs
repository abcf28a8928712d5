//! # Role Scout
//!
//! 按"公司 + 职位"查询现任人员的命令行客户端，支持从表格批量查询并生成报告
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 客户端层（Clients）
//! - `clients/` - 与查询服务的 HTTP 交互，只暴露能力
//! - `LookupApi` / `ReportApi` - 编排层依赖的能力接口
//! - `ScoutClient` - 基于 reqwest 的实现
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `ReportSession` - 持有报告令牌，控制"查看报告"
//! - `ReportWriter` - 把报告写到磁盘
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一行"的完整处理流程
//! - `RowCtx` - 上下文封装（第几行 / 共几行）
//! - `RowFlow` - 查询 → 规范化 → 记录
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量查询状态机，串行驱动所有行并提交报告
//! - `orchestrator/app` - 应用入口，连接配置、客户端和编排器
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{LookupApi, ReportApi, ScoutClient};
pub use config::Config;
pub use error::{InputError, Result, ScoutError};
pub use models::{
    BatchEntry, BatchResult, BatchRow, BatchState, LookupOutcome, LookupRequest, PersonRecord,
    ProgressEvent, ReportToken, ReportTokens,
};
pub use orchestrator::{App, BatchOrchestrator, DownloadOptions};
pub use services::{ReportSession, ReportWriter};
pub use utils::logging as logger;
