//! HTTP 服务 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：密钥快速失败检查、构建共享状态
//! 2. **路由装配**：routes 模块中的各个处理器
//! 3. **资源管理**：唯一持有存储与各业务服务的模块
//! 4. **错误映射**：AppError → HTTP 状态码与响应体

use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{AppError, LlmError, StoreError};
use crate::services::{
    CodingService, ExtractionService, GuidelineService, PdfService, ValidationService,
};
use crate::store::{AuthStore, OrderStore};
use crate::workflow::{IntakeFlow, ReviewFlow};

pub mod routes;

/// 上传体积上限（PDF 可能不小）
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// 共享应用状态
pub struct AppState {
    pub config: Config,
    pub pdf: PdfService,
    pub extraction: ExtractionService,
    pub guidelines: GuidelineService,
    pub coding: CodingService,
    pub validation: ValidationService,
    pub intake: IntakeFlow,
    pub review: ReviewFlow,
    pub orders: OrderStore,
    pub authorizations: AuthStore,
}

pub type SharedState = Arc<AppState>;

/// HTTP 服务
pub struct Server {
    listen_addr: String,
    state: SharedState,
}

impl Server {
    /// 初始化服务
    ///
    /// 必需密钥缺失时立即失败，绝不在无密钥状态下开始监听
    pub fn initialize(config: Config) -> Result<Self> {
        if config.completion_api_key.trim().is_empty()
            || config.retrieval_api_key.trim().is_empty()
        {
            anyhow::bail!("API key is missing");
        }

        log_startup(&config);

        let listen_addr = config.listen_addr.clone();
        let state = Arc::new(AppState {
            pdf: PdfService::new(),
            extraction: ExtractionService::new(&config),
            guidelines: GuidelineService::new(&config),
            coding: CodingService::new(&config),
            validation: ValidationService::new(&config),
            intake: IntakeFlow::new(&config),
            review: ReviewFlow::new(&config),
            orders: OrderStore::new(),
            authorizations: AuthStore::new(),
            config,
        });

        Ok(Self { listen_addr, state })
    }

    /// 运行服务直到收到 ctrl-c
    pub async fn run(self) -> Result<()> {
        let app = router(self.state);

        let listener = TcpListener::bind(&self.listen_addr).await?;
        info!("🚀 服务已启动: http://{}", listener.local_addr()?);

        axum::serve(listener, app.into_make_service())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("服务已停止");
        Ok(())
    }
}

/// 装配路由
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/healthz", get(routes::health))
        // AI 管线代理路由
        .route("/api/pdf-text", post(routes::extract_pdf_text))
        .route("/api/document-fields", post(routes::extract_document_fields))
        .route("/api/guidelines", post(routes::retrieve_guidelines))
        .route("/api/cpt-codes", post(routes::suggest_cpt_codes))
        .route("/api/validate-codes", post(routes::validate_codes))
        // 记录存储路由
        .route(
            "/api/orders",
            post(routes::create_order).get(routes::list_orders),
        )
        .route("/api/orders/:id/status", post(routes::update_order_status))
        .route(
            "/api/authorizations",
            post(routes::create_authorization).get(routes::list_authorizations),
        )
        .route(
            "/api/authorizations/intake",
            post(routes::intake_authorization),
        )
        .route(
            "/api/authorizations/:id/review",
            post(routes::review_authorization),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

// ========== 日志辅助函数 ==========

fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 订单与事前授权服务");
    info!("📡 完成 API: {}", config.completion_api_base_url);
    info!("📚 检索 API: {}", config.retrieval_api_url);
    info!("🧠 模型: 抽取 {} / 编码 {}", config.extraction_model, config.coding_model);
    info!("{}", "=".repeat(60));
}

// ========== 错误映射 ==========

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Config(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "API key is missing".to_string(),
            ),
            AppError::Llm(LlmError::NoJsonObject { .. })
            | AppError::Llm(LlmError::InvalidJson { .. }) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Invalid JSON response".to_string(),
            ),
            AppError::Store(StoreError::NotFound { .. }) => {
                (StatusCode::NOT_FOUND, "Record not found".to_string())
            }
            // 其余上游失败统一 500，不向客户端透出细节
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        if status.is_server_error() {
            error!("请求处理失败: {}", self);
        } else {
            warn!("请求被拒绝: {}", self);
        }

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
