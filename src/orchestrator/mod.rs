//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量查询编排器
//! - 行提取、逐行串行查询、进度推送
//! - 整批提交报告、持有报告会话
//!
//! ### `app` - 应用入口
//! - 持有配置、HTTP 客户端、报告写入服务
//! - 单次查询、批量查询、下载报告
//!
//! ## 层次关系
//!
//! ```text
//! app (命令行动作)
//!     ↓
//! batch_processor (处理 Vec<BatchRow>)
//!     ↓
//! workflow::RowFlow (处理单行)
//!     ↓
//! clients (能力接口：LookupApi / ReportApi)
//! ```

pub mod app;
pub mod batch_processor;

pub use app::{App, DownloadOptions};
pub use batch_processor::BatchOrchestrator;
