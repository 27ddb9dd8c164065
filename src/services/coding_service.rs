//! CPT 编码建议服务 - 业务能力层
//!
//! 只负责"指南片段 + 医嘱计划 → CPT 编码建议"能力

use tracing::{info, warn};

use crate::clients::LlmClient;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{codes, CodeSuggestion};
use crate::services::json_extract;

/// CPT 编码建议服务
pub struct CodingService {
    llm: LlmClient,
    model: String,
}

impl CodingService {
    /// 创建新的编码建议服务
    pub fn new(config: &Config) -> Self {
        Self {
            llm: LlmClient::new(config),
            model: config.coding_model.clone(),
        }
    }

    /// 根据指南片段和医嘱计划给出 CPT 编码建议
    ///
    /// # 参数
    /// - `guidelines`: 指南片段文本，按相关度排序
    /// - `medical_plan`: 医生的医嘱计划描述
    pub async fn suggest_codes(
        &self,
        guidelines: &[String],
        medical_plan: &str,
    ) -> AppResult<CodeSuggestion> {
        if guidelines.is_empty() {
            return Err(AppError::validation("Medical guidelines are required"));
        }

        info!("🤖 正在生成 CPT 编码建议...");

        let prompt = build_suggestion_prompt(guidelines, medical_plan);
        let content = self.llm.chat(&self.model, &prompt, None).await?;

        let suggestion: CodeSuggestion = json_extract::parse_json_object(&content)?;

        for code in &suggestion.cpt_codes {
            if !codes::is_wellformed_cpt(code) {
                warn!("⚠️ 模型给出的 CPT 编码形状异常: {}", code);
            }
        }

        info!("✓ CPT 建议: {:?}", suggestion.cpt_codes);

        Ok(suggestion)
    }
}

/// 构建编码建议提示词
fn build_suggestion_prompt(guidelines: &[String], medical_plan: &str) -> String {
    format!(
        r#"Act as an expert medical coder specializing in procedure CPT codes.
Review the medical plan from the doctor provided, then for each procedure requested by the doctor review the provided medical guidelines and give the code that most closely matches each requested procedure.
Note if the doctor is requesting a single type of scan for multiple body parts, then you should return the code for the scan that covers all the body parts.
Double check your work and format it as a JSON object like below example.
{{
"cptCode": ["99213"],
"description": "Office or other outpatient visit for evaluation and management",
"cptCodesExplanation": "The code 99213 is the most appropriate code for the requested procedure because it is a comprehensive evaluation and management code that includes a detailed history and physical examination."
}}

Here is the medical guidelines: {}
Here is the medical plan from doctor: {}

Please make sure to ONLY return the JSON as response and nothing else."#,
        guidelines.join("\n"),
        medical_plan
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::json_extract::parse_json_object;

    #[test]
    fn test_prompt_embeds_guidelines_in_order() {
        let guidelines = vec!["rule one".to_string(), "rule two".to_string()];
        let prompt = build_suggestion_prompt(&guidelines, "Order MRI of the Right Knee");
        let one = prompt.find("rule one").unwrap();
        let two = prompt.find("rule two").unwrap();
        assert!(one < two);
        assert!(prompt.contains("Order MRI of the Right Knee"));
    }

    #[test]
    fn test_canned_response_parses() {
        let content = r#"Based on the guidelines, here is my suggestion:
{"cptCode": ["73721"], "description": "MRI lower extremity joint", "cptCodesExplanation": "73721 covers MRI of a lower-extremity joint without contrast."}"#;
        let suggestion: CodeSuggestion = parse_json_object(content).unwrap();
        assert_eq!(suggestion.cpt_codes, vec!["73721"]);
        assert!(!suggestion.cpt_codes_explanation.is_empty());
    }
}
