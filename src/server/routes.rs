//! HTTP 处理器
//!
//! 处理器只做输入校验和服务调用的编排，业务逻辑在 services /
//! workflow 层。响应体字段名沿用前端约定的 camelCase。

use axum::{
    body::Bytes,
    extract::{Multipart, Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::models::{
    codes, AuthPatch, CodeSuggestion, DocumentFields, GuidelineChunk, NewOrder,
    NewPriorAuthorization, Order, OrderPatch, PriorAuthorization, ValidationVerdict,
};
use crate::server::SharedState;
use crate::ui::StatusFilter;
use crate::workflow::{ReviewFlow, ReviewInput, SaveDisposition};

pub(crate) async fn health() -> &'static str {
    "ok"
}

// ========== AI 管线代理路由 ==========

/// 上传的 PDF 文件
struct UploadedFile {
    filename: String,
    content_type: String,
    bytes: Bytes,
}

/// 读取 multipart 表单：`file` 字段必填，`employeeId` 可选
///
/// 缺文件和非 PDF 类型都是 400
async fn read_pdf_upload(
    mut multipart: Multipart,
) -> AppResult<(UploadedFile, Option<String>)> {
    let mut file = None;
    let mut employee_id = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Malformed multipart request: {}", e)))?
    {
        // bytes()/text() 会消费 field，字段名先拷出来
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let filename = field.file_name().unwrap_or("document.pdf").to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(|e| {
                    AppError::validation(format!("Failed to read uploaded file: {}", e))
                })?;
                file = Some(UploadedFile {
                    filename,
                    content_type,
                    bytes,
                });
            }
            Some("employeeId") => {
                employee_id = field.text().await.ok().filter(|s| !s.trim().is_empty());
            }
            _ => {}
        }
    }

    let file = file.ok_or_else(|| AppError::validation("No file provided"))?;
    if !file.content_type.contains("pdf") {
        return Err(AppError::validation("File must be a PDF"));
    }

    Ok((file, employee_id))
}

#[derive(Debug, Serialize)]
pub(crate) struct ExtractedDocument {
    pub message: &'static str,
    pub filename: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub content_type: String,
    pub text: String,
}

/// POST /api/pdf-text — 上传 PDF，返回纯文本和文件元数据
pub(crate) async fn extract_pdf_text(
    State(state): State<SharedState>,
    multipart: Multipart,
) -> AppResult<Json<ExtractedDocument>> {
    let (file, _) = read_pdf_upload(multipart).await?;

    let text = state.pdf.extract_text(&file.bytes)?;
    info!("📄 PDF 处理完成: {} ({} 字节)", file.filename, file.bytes.len());

    Ok(Json(ExtractedDocument {
        message: "File processed successfully",
        filename: file.filename,
        size: file.bytes.len() as u64,
        content_type: file.content_type,
        text,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DocumentTextRequest {
    #[serde(default)]
    document_text: String,
}

/// POST /api/document-fields — 就诊单文本 → 结构化字段
pub(crate) async fn extract_document_fields(
    State(state): State<SharedState>,
    Json(request): Json<DocumentTextRequest>,
) -> AppResult<Json<DocumentFields>> {
    if request.document_text.trim().is_empty() {
        return Err(AppError::validation("PDF text is required"));
    }

    let fields = state.extraction.extract_fields(&request.document_text).await?;
    Ok(Json(fields))
}

#[derive(Debug, Deserialize)]
pub(crate) struct GuidelineRequest {
    #[serde(default)]
    query: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct GuidelineResponse {
    chunks: Vec<GuidelineChunk>,
}

/// POST /api/guidelines — 查询串 → 排序的指南片段
pub(crate) async fn retrieve_guidelines(
    State(state): State<SharedState>,
    Json(request): Json<GuidelineRequest>,
) -> AppResult<Json<GuidelineResponse>> {
    let chunks = state.guidelines.retrieve(&request.query).await?;
    Ok(Json(GuidelineResponse { chunks }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CptCodesRequest {
    #[serde(default)]
    medical_guidelines: Vec<String>,
    #[serde(default)]
    medical_plan: String,
}

/// POST /api/cpt-codes — 指南片段 + 医嘱计划 → CPT 建议
pub(crate) async fn suggest_cpt_codes(
    State(state): State<SharedState>,
    Json(request): Json<CptCodesRequest>,
) -> AppResult<Json<CodeSuggestion>> {
    let suggestion = state
        .coding
        .suggest_codes(&request.medical_guidelines, &request.medical_plan)
        .await?;
    Ok(Json(suggestion))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ValidateCodesRequest {
    #[serde(default)]
    icd_codes: Vec<String>,
    #[serde(default)]
    cpt_codes: Vec<String>,
    #[serde(default)]
    cpt_codes_explanation: String,
    #[serde(default)]
    medical_guidelines: Vec<String>,
}

/// POST /api/validate-codes — 编码 + 指南 → 校验结论
pub(crate) async fn validate_codes(
    State(state): State<SharedState>,
    Json(request): Json<ValidateCodesRequest>,
) -> AppResult<Json<ValidationVerdict>> {
    let verdict = state
        .validation
        .validate_codes(
            &request.icd_codes,
            &request.cpt_codes,
            &request.cpt_codes_explanation,
            &request.medical_guidelines,
        )
        .await?;
    Ok(Json(verdict))
}

// ========== 记录存储路由 ==========

#[derive(Debug, Deserialize)]
pub(crate) struct ListQuery {
    #[serde(default)]
    status: Option<String>,
    #[serde(default, rename = "customerId")]
    customer_id: Option<String>,
    #[serde(default, rename = "employeeId")]
    employee_id: Option<String>,
}

/// POST /api/orders — 表单创建订单
pub(crate) async fn create_order(
    State(state): State<SharedState>,
    Json(new): Json<NewOrder>,
) -> AppResult<Json<Order>> {
    if new.customer_name.trim().is_empty()
        || new.customer_email.trim().is_empty()
        || new.sku.trim().is_empty()
    {
        return Err(AppError::validation(
            "Customer name, email and SKU are required",
        ));
    }

    let order = state.orders.create(new).await;
    info!("✓ 订单已创建: {}", order.id);
    Ok(Json(order))
}

/// GET /api/orders — 列表，支持 status / customerId 过滤
pub(crate) async fn list_orders(
    State(state): State<SharedState>,
    Query(query): Query<ListQuery>,
) -> Json<Vec<Order>> {
    let orders = match &query.customer_id {
        Some(customer_id) => state.orders.list_for_customer(customer_id).await,
        None => state.orders.list().await,
    };

    let filter = query
        .status
        .as_deref()
        .map(StatusFilter::parse)
        .unwrap_or_default();

    Json(
        orders
            .into_iter()
            .filter(|o| filter.matches(o.status.as_str()))
            .collect(),
    )
}

/// POST /api/orders/:id/status — 状态补丁
pub(crate) async fn update_order_status(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(patch): Json<OrderPatch>,
) -> AppResult<Json<Order>> {
    let order = state.orders.update(&id, patch).await?;
    Ok(Json(order))
}

/// POST /api/authorizations — 直接表单创建授权
pub(crate) async fn create_authorization(
    State(state): State<SharedState>,
    Json(new): Json<NewPriorAuthorization>,
) -> AppResult<Json<PriorAuthorization>> {
    if new.patient_name.trim().is_empty() || new.patient_date_of_birth.trim().is_empty() {
        return Err(AppError::validation(
            "Patient name and date of birth are required",
        ));
    }

    let auth = state.authorizations.create(new).await;
    info!("✓ 授权已创建: {}", auth.id);
    Ok(Json(auth))
}

/// GET /api/authorizations — 列表，支持 status / employeeId 过滤
pub(crate) async fn list_authorizations(
    State(state): State<SharedState>,
    Query(query): Query<ListQuery>,
) -> Json<Vec<PriorAuthorization>> {
    let auths = match &query.employee_id {
        Some(employee_id) => state.authorizations.list_for_employee(employee_id).await,
        None => state.authorizations.list().await,
    };

    let filter = query
        .status
        .as_deref()
        .map(StatusFilter::parse)
        .unwrap_or_default();

    Json(
        auths
            .into_iter()
            .filter(|a| filter.matches(a.status.as_str()))
            .collect(),
    )
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct IntakeResponse {
    fields: DocumentFields,
    suggestion: CodeSuggestion,
    authorization: PriorAuthorization,
}

/// POST /api/authorizations/intake — 上传 PDF 走完整录入管线
///
/// PDF → 文本 → 字段抽取 → 指南检索 → CPT 建议 → 落库
pub(crate) async fn intake_authorization(
    State(state): State<SharedState>,
    multipart: Multipart,
) -> AppResult<Json<IntakeResponse>> {
    let (file, employee_id) = read_pdf_upload(multipart).await?;

    let text = state.pdf.extract_text(&file.bytes)?;
    let outcome = state.intake.run(&text).await?;

    let authorization = state
        .authorizations
        .create_from_intake(&outcome.fields, &outcome.suggestion, employee_id)
        .await;

    info!("📤 录入完成: 授权 {} (来源 {})", authorization.id, file.filename);

    Ok(Json(IntakeResponse {
        fields: outcome.fields,
        suggestion: outcome.suggestion,
        authorization,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReviewRequest {
    #[serde(default)]
    icd_codes: Vec<String>,
    #[serde(default)]
    cpt_codes: Vec<String>,
    #[serde(default)]
    cpt_codes_explanation: String,
    #[serde(default)]
    override_acknowledged: bool,
    #[serde(default)]
    override_explanation: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReviewResponse {
    verdict: ValidationVerdict,
    /// 保存成功时为更新后的记录；校验未通过且未覆盖时为空
    #[serde(skip_serializing_if = "Option::is_none")]
    authorization: Option<PriorAuthorization>,
}

/// POST /api/authorizations/:id/review — 复核编辑后的编码并按结论落库
pub(crate) async fn review_authorization(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(request): Json<ReviewRequest>,
) -> AppResult<Json<ReviewResponse>> {
    // 先确认记录存在，再花钱调模型
    state.authorizations.get(&id).await?;

    let input = ReviewInput {
        icd_codes: codes::normalize(&request.icd_codes),
        cpt_codes: codes::normalize(&request.cpt_codes),
        cpt_codes_explanation: request.cpt_codes_explanation.clone(),
    };

    let verdict = state.review.validate(&input).await?;

    let disposition = match ReviewFlow::resolve_save(
        &verdict,
        request.override_acknowledged,
        request.override_explanation.as_deref(),
    ) {
        Ok(disposition) => Some(disposition),
        // 勾选了覆盖但说明缺失：拒绝这次保存
        Err(e) if request.override_acknowledged => return Err(e),
        // 未确认覆盖：不落库，把结论带回给前端
        Err(_) => None,
    };

    let authorization = match disposition {
        Some(SaveDisposition::Adopt { explanation }) => Some(
            state
                .authorizations
                .update(
                    &id,
                    AuthPatch {
                        cpt_codes: Some(input.cpt_codes.clone()),
                        icd_codes: Some(input.icd_codes.clone()),
                        cpt_codes_explanation: Some(explanation),
                        is_override: Some(false),
                        ..Default::default()
                    },
                )
                .await?,
        ),
        Some(SaveDisposition::Override { explanation }) => Some(
            state
                .authorizations
                .update(
                    &id,
                    AuthPatch {
                        cpt_codes: Some(input.cpt_codes.clone()),
                        icd_codes: Some(input.icd_codes.clone()),
                        cpt_codes_explanation: Some(request.cpt_codes_explanation),
                        is_override: Some(true),
                        override_explanation: Some(explanation),
                        ..Default::default()
                    },
                )
                .await?,
        ),
        None => None,
    };

    Ok(Json(ReviewResponse {
        verdict,
        authorization,
    }))
}
