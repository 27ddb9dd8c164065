//! 事前授权（Prior Authorization）实体

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::codes;

/// 授权状态
///
/// 状态只驱动展示（前端按状态着色），服务端不做状态机约束。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthStatus {
    Pending,
    Completed,
    Submitted,
    Rejected,
    Cancelled,
}

impl AuthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthStatus::Pending => "PENDING",
            AuthStatus::Completed => "COMPLETED",
            AuthStatus::Submitted => "SUBMITTED",
            AuthStatus::Rejected => "REJECTED",
            AuthStatus::Cancelled => "CANCELLED",
        }
    }

    /// 大小写不敏感解析（用于状态过滤）
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Some(AuthStatus::Pending),
            "COMPLETED" => Some(AuthStatus::Completed),
            "SUBMITTED" => Some(AuthStatus::Submitted),
            "REJECTED" => Some(AuthStatus::Rejected),
            "CANCELLED" => Some(AuthStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for AuthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 事前授权记录
///
/// cptCodes / icdCodes 在线上以 JSON 编码字符串存取
/// （见 [`codes::json_text`]），内存中始终是 `Vec<String>`。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorAuthorization {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,
    pub patient_name: String,
    pub patient_date_of_birth: String,
    pub status: AuthStatus,
    #[serde(with = "codes::json_text")]
    pub cpt_codes: Vec<String>,
    #[serde(with = "codes::json_text")]
    pub icd_codes: Vec<String>,
    /// CPT 编码的选码说明
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpt_codes_explanation: Option<String>,
    /// 是否在校验未通过的情况下人工覆盖保存
    #[serde(default)]
    pub is_override: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_explanation: Option<String>,
    /// 医嘱计划原文
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medical_plan: Option<String>,
    /// 保险计划 / 付款方名称
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 直接表单创建授权的字段
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPriorAuthorization {
    pub patient_name: String,
    pub patient_date_of_birth: String,
    #[serde(default)]
    pub employee_id: Option<String>,
    #[serde(default)]
    pub cpt_codes: Vec<String>,
    #[serde(default)]
    pub icd_codes: Vec<String>,
    #[serde(default)]
    pub cpt_codes_explanation: Option<String>,
    #[serde(default)]
    pub medical_plan: Option<String>,
    #[serde(default)]
    pub payer_name: Option<String>,
}

/// 授权部分更新
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthPatch {
    #[serde(default)]
    pub status: Option<AuthStatus>,
    #[serde(default)]
    pub cpt_codes: Option<Vec<String>>,
    #[serde(default)]
    pub icd_codes: Option<Vec<String>>,
    #[serde(default)]
    pub cpt_codes_explanation: Option<String>,
    #[serde(default)]
    pub is_override: Option<bool>,
    #[serde(default)]
    pub override_explanation: Option<String>,
    #[serde(default)]
    pub medical_plan: Option<String>,
}

impl AuthPatch {
    /// 合并到现有记录，只覆盖提供了的字段
    pub fn apply(&self, auth: &mut PriorAuthorization) {
        if let Some(status) = self.status {
            auth.status = status;
        }
        if let Some(cpt_codes) = &self.cpt_codes {
            auth.cpt_codes = codes::normalize(cpt_codes);
        }
        if let Some(icd_codes) = &self.icd_codes {
            auth.icd_codes = codes::normalize(icd_codes);
        }
        if let Some(explanation) = &self.cpt_codes_explanation {
            auth.cpt_codes_explanation = Some(explanation.clone());
        }
        if let Some(is_override) = self.is_override {
            auth.is_override = is_override;
        }
        if let Some(override_explanation) = &self.override_explanation {
            auth.override_explanation = Some(override_explanation.clone());
        }
        if let Some(medical_plan) = &self.medical_plan {
            auth.medical_plan = Some(medical_plan.clone());
        }
    }
}
