//! PDF 录入流程 - 流程层
//!
//! 核心职责：定义"一份就诊单"的完整录入流程
//!
//! 流程顺序：
//! 1. 文档文本 → 结构化字段抽取
//! 2. 医嘱计划描述 → 指南检索
//! 3. 指南片段 + 医嘱计划 → CPT 编码建议
//!
//! 每一步都等待上一步完成，严格串行；落库由编排层完成。

use tracing::info;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{CodeSuggestion, DocumentFields};
use crate::services::{chunk_texts, CodingService, ExtractionService, GuidelineService};

/// 录入流程的产物
#[derive(Debug, Clone)]
pub struct IntakeOutcome {
    /// 抽取出的结构化字段
    pub fields: DocumentFields,
    /// 检索到的指南片段文本（相关度顺序）
    pub guideline_texts: Vec<String>,
    /// CPT 编码建议
    pub suggestion: CodeSuggestion,
}

/// PDF 录入流程
///
/// - 编排完整的录入流程
/// - 不持有存储（落库由编排层决定）
/// - 只依赖业务能力（services）
pub struct IntakeFlow {
    extraction: ExtractionService,
    guidelines: GuidelineService,
    coding: CodingService,
}

impl IntakeFlow {
    /// 创建新的录入流程
    pub fn new(config: &Config) -> Self {
        Self {
            extraction: ExtractionService::new(config),
            guidelines: GuidelineService::new(config),
            coding: CodingService::new(config),
        }
    }

    /// 对一份就诊单文本执行完整录入流程
    pub async fn run(&self, document_text: &str) -> AppResult<IntakeOutcome> {
        if document_text.trim().is_empty() {
            return Err(AppError::validation("PDF text is required"));
        }

        // ========== 步骤 1: 字段抽取 ==========
        let fields = self.extraction.extract_fields(document_text).await?;

        // 患者姓名和出生日期缺失视为硬失败
        if fields.patient_name.trim().is_empty() || fields.patient_dob.trim().is_empty() {
            return Err(AppError::validation(
                "Extracted document is missing patient name or date of birth",
            ));
        }

        info!(
            "✓ 字段抽取完成: 患者 {} ({})",
            fields.patient_name, fields.patient_dob
        );

        // ========== 步骤 2: 指南检索（以医嘱计划为查询） ==========
        let chunks = self.guidelines.for_medical_plan(&fields.medical_plan).await?;
        let guideline_texts = chunk_texts(&chunks);

        // ========== 步骤 3: CPT 编码建议 ==========
        let suggestion = self
            .coding
            .suggest_codes(&guideline_texts, &fields.medical_plan)
            .await?;

        Ok(IntakeOutcome {
            fields,
            guideline_texts,
            suggestion,
        })
    }
}
