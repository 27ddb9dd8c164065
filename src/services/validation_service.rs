//! 编码校验服务 - 业务能力层
//!
//! 只负责"ICD/CPT 编码 + 指南 → 校验结论"能力。
//! 这是唯一请求 JSON 结构化输出模式的场景。

use tracing::info;

use crate::clients::LlmClient;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::ValidationVerdict;
use crate::services::json_extract;

/// 校验阶段的系统消息
const SYSTEM_MESSAGE: &str =
    "You are a medical coding expert specializing in ICD and CPT code validation.";

/// 编码校验服务
pub struct ValidationService {
    llm: LlmClient,
    model: String,
}

impl ValidationService {
    /// 创建新的编码校验服务
    pub fn new(config: &Config) -> Self {
        Self {
            llm: LlmClient::new(config),
            model: config.coding_model.clone(),
        }
    }

    /// 校验 CPT 编码对给定诊断是否合适
    ///
    /// # 参数
    /// - `icd_codes`: 诊断编码
    /// - `cpt_codes`: 待校验的操作编码
    /// - `explanation`: 当前的选码说明
    /// - `guidelines`: 指南片段文本
    pub async fn validate_codes(
        &self,
        icd_codes: &[String],
        cpt_codes: &[String],
        explanation: &str,
        guidelines: &[String],
    ) -> AppResult<ValidationVerdict> {
        if icd_codes.is_empty() || cpt_codes.is_empty() {
            return Err(AppError::validation("ICD and CPT codes are required"));
        }

        info!(
            "🔎 正在校验编码: ICD {:?} ⇔ CPT {:?}",
            icd_codes, cpt_codes
        );

        let prompt = build_validation_prompt(icd_codes, cpt_codes, explanation, guidelines);
        let content = self
            .llm
            .chat_json(&self.model, &prompt, Some(SYSTEM_MESSAGE))
            .await?;

        let verdict: ValidationVerdict = json_extract::parse_json_object(&content)?;

        info!(
            "✓ 校验完成: isValid={} confidence={:?}",
            verdict.is_valid, verdict.confidence
        );

        Ok(verdict)
    }
}

/// 构建校验提示词
fn build_validation_prompt(
    icd_codes: &[String],
    cpt_codes: &[String],
    explanation: &str,
    guidelines: &[String],
) -> String {
    format!(
        r#"As a medical coding expert, validate if the provided CPT codes are appropriate for the given ICD codes and medical guidelines.

ICD Codes: {}
CPT Codes: {}
Current CPT Codes Explanation: {}
Medical Guidelines: {}

Please analyze if the CPT codes are appropriate for the diagnosis (ICD codes) according to the medical guidelines.
If they are appropriate, explain why. If they are not appropriate, explain what codes would be more suitable.

Respond in the following JSON format:
{{
  "isValid": boolean,
  "explanation": "detailed explanation of the validation result",
  "suggestedChanges": "if not valid, suggest alternative codes or changes",
  "confidence": "high/medium/low"
}}
Only return the JSON object as response and nothing else."#,
        icd_codes.join(", "),
        cpt_codes.join(", "),
        explanation,
        guidelines.join("\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Confidence;
    use crate::services::json_extract::parse_json_object;

    #[test]
    fn test_prompt_joins_codes_with_commas() {
        let prompt = build_validation_prompt(
            &["M17.11".to_string(), "M17.12".to_string()],
            &["73721".to_string()],
            "initial explanation",
            &["guideline text".to_string()],
        );
        assert!(prompt.contains("ICD Codes: M17.11, M17.12"));
        assert!(prompt.contains("CPT Codes: 73721"));
        assert!(prompt.contains("guideline text"));
    }

    #[test]
    fn test_canned_verdict_parses() {
        let content = r#"{"isValid": false, "explanation": "99213 is an E/M code, not an imaging code", "suggestedChanges": "Use 73721", "confidence": "high"}"#;
        let verdict: ValidationVerdict = parse_json_object(content).unwrap();
        assert!(!verdict.is_valid);
        assert_eq!(verdict.confidence, Confidence::High);
    }
}
