//! # Prior Auth Portal
//!
//! 订单追踪与事前授权管理服务
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Clients / Store）
//! - `clients/` - 持有外部 API 凭据，只暴露能力
//! - `LlmClient` - 完成 API 调用能力
//! - `RetrievalClient` - 指南检索能力
//! - `store/` - 记录存储适配器（create / update / subscribe）
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单次调用
//! - `PdfService` - PDF 文本提取能力
//! - `ExtractionService` - 就诊单字段抽取能力
//! - `GuidelineService` - 指南检索能力
//! - `CodingService` - CPT 编码建议能力
//! - `ValidationService` - 编码校验能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义完整的业务流程
//! - `IntakeFlow` - 录入流程编排（抽取 → 检索 → 建议）
//! - `ReviewFlow` - 复核流程编排（检索 → 校验 → 保存门控）
//!
//! ### ④ 编排层（Server / UI）
//! - `server/` - HTTP 路由与共享状态，唯一持有存储的模块
//! - `ui/` - 客户端视图状态（过滤、列表、编辑对话框状态机）
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod server;
pub mod services;
pub mod store;
pub mod ui;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{
    AuthStatus, CodeSuggestion, DocumentFields, Order, OrderStatus, PriorAuthorization,
    ValidationVerdict,
};
pub use server::Server;
pub use workflow::{IntakeFlow, IntakeOutcome, ReviewFlow, ReviewInput};
