//! 就诊单字段抽取服务 - 业务能力层
//!
//! 只负责"文档文本 → 结构化字段"能力，不关心流程

use tracing::{debug, info};

use crate::clients::LlmClient;
use crate::config::Config;
use crate::error::AppResult;
use crate::models::DocumentFields;
use crate::services::json_extract;

/// 就诊单字段抽取服务
///
/// 职责：
/// - 用固定提示词调用完成 API
/// - 从自由文本响应中截取 JSON 并解析为 [`DocumentFields`]
/// - 不校验字段完整性（由调用方决定缺失字段是否算失败）
pub struct ExtractionService {
    llm: LlmClient,
    model: String,
}

impl ExtractionService {
    /// 创建新的字段抽取服务
    pub fn new(config: &Config) -> Self {
        Self {
            llm: LlmClient::new(config),
            model: config.extraction_model.clone(),
        }
    }

    /// 从就诊单文本中抽取结构化字段
    pub async fn extract_fields(&self, document_text: &str) -> AppResult<DocumentFields> {
        info!("🔍 正在从就诊单文本中抽取结构化字段...");

        let prompt = build_extraction_prompt(document_text);
        let content = self.llm.chat(&self.model, &prompt, None).await?;

        let fields: DocumentFields = json_extract::parse_json_object(&content)?;

        debug!(
            "抽取完成: 患者 {}，ICD 编码 {} 个",
            fields.patient_name,
            fields.icd_codes.len()
        );

        Ok(fields)
    }
}

/// 构建字段抽取提示词
fn build_extraction_prompt(document_text: &str) -> String {
    format!(
        r#"Act as an expert in Optical Character Recognition.
I am providing a doctor visit note, extract out the information carefully, double check your work and format it as a JSON object like below example.
{{
"patient_name": "John Cena",
"patient_dob": "04/28/1997",
"medical_plan": "Order MRI of the Right Knee Without Contrast",
"diagnostic_impressions": "Osteoarthritis of right knee (M17.11)",
"icd_codes": ["M17.11"]
}}
Only return the JSON object as response and nothing else.

Here is the text content: {}"#,
        document_text
    )
}
