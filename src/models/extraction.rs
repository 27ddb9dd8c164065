//! AI 管线各阶段的数据结构
//!
//! 字段名与完成端点约定的 JSON 形状一一对应：
//! 抽取阶段是 snake_case，编码建议 / 校验阶段是 camelCase。

use serde::{Deserialize, Serialize};

/// 就诊单抽取出的结构化字段
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentFields {
    #[serde(default)]
    pub patient_name: String,
    #[serde(default)]
    pub patient_dob: String,
    /// 医嘱计划描述
    #[serde(default)]
    pub medical_plan: String,
    /// 诊断印象
    #[serde(default)]
    pub diagnostic_impressions: String,
    #[serde(default)]
    pub icd_codes: Vec<String>,
}

/// CPT 编码建议
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeSuggestion {
    #[serde(rename = "cptCode", default)]
    pub cpt_codes: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cpt_codes_explanation: String,
}

/// 编码校验结论
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationVerdict {
    pub is_valid: bool,
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_changes: Option<String>,
    #[serde(default)]
    pub confidence: Confidence,
}

/// 校验置信度
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    #[default]
    Medium,
    Low,
}

/// 检索服务返回的指南片段，按相关度排序
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuidelineChunk {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_wire_shape() {
        let raw = r#"{
            "isValid": false,
            "explanation": "73721 covers MRI of a lower-extremity joint",
            "suggestedChanges": "Replace 99213 with 73721",
            "confidence": "high"
        }"#;
        let verdict: ValidationVerdict = serde_json::from_str(raw).unwrap();
        assert!(!verdict.is_valid);
        assert_eq!(verdict.confidence, Confidence::High);
        assert_eq!(
            verdict.suggested_changes.as_deref(),
            Some("Replace 99213 with 73721")
        );
    }

    #[test]
    fn test_verdict_defaults() {
        // suggestedChanges / confidence 缺省时也能解析
        let raw = r#"{"isValid": true, "explanation": "ok"}"#;
        let verdict: ValidationVerdict = serde_json::from_str(raw).unwrap();
        assert!(verdict.is_valid);
        assert_eq!(verdict.confidence, Confidence::Medium);
        assert!(verdict.suggested_changes.is_none());
    }

    #[test]
    fn test_suggestion_wire_shape() {
        let raw = r#"{
            "cptCode": ["99213"],
            "description": "Office or other outpatient visit",
            "cptCodesExplanation": "The code 99213 is the most appropriate code"
        }"#;
        let suggestion: CodeSuggestion = serde_json::from_str(raw).unwrap();
        assert_eq!(suggestion.cpt_codes, vec!["99213"]);
    }
}
