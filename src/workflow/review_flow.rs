//! 编码复核流程 - 流程层
//!
//! 核心职责：对人工编辑后的编码重新校验，并决定保存如何落库
//!
//! 流程顺序：
//! 1. ICD 编码串 → 指南检索（独立于录入时的查询）
//! 2. 编码 + 说明 + 指南 → 校验结论
//! 3. 结论通过 → 采纳校验说明保存；
//!    结论不通过 → 必须有已确认的人工覆盖说明才允许保存

use tracing::{info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{codes, ValidationVerdict};
use crate::services::{chunk_texts, GuidelineService, ValidationService};

/// 待复核的编辑内容
#[derive(Debug, Clone)]
pub struct ReviewInput {
    pub icd_codes: Vec<String>,
    pub cpt_codes: Vec<String>,
    pub cpt_codes_explanation: String,
}

/// 复核之后这次保存的落库方式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveDisposition {
    /// 校验通过：采纳校验给出的说明
    Adopt { explanation: String },
    /// 校验未通过但人工覆盖：记录覆盖说明
    Override { explanation: String },
}

/// 编码复核流程
pub struct ReviewFlow {
    guidelines: GuidelineService,
    validation: ValidationService,
}

impl ReviewFlow {
    /// 创建新的复核流程
    pub fn new(config: &Config) -> Self {
        Self {
            guidelines: GuidelineService::new(config),
            validation: ValidationService::new(config),
        }
    }

    /// 对编辑后的编码重新校验
    ///
    /// 指南按 ICD 编码串重新检索，与录入时的查询无关
    pub async fn validate(&self, input: &ReviewInput) -> AppResult<ValidationVerdict> {
        if input.icd_codes.is_empty() || input.cpt_codes.is_empty() {
            return Err(AppError::validation("ICD and CPT codes are required"));
        }

        for code in input
            .icd_codes
            .iter()
            .filter(|c| !codes::is_wellformed_icd(c))
        {
            warn!("⚠️ 人工编辑的 ICD 编码形状异常: {}", code);
        }
        for code in input
            .cpt_codes
            .iter()
            .filter(|c| !codes::is_wellformed_cpt(c))
        {
            warn!("⚠️ 人工编辑的 CPT 编码形状异常: {}", code);
        }

        let chunks = self.guidelines.for_icd_codes(&input.icd_codes).await?;

        let verdict = self
            .validation
            .validate_codes(
                &input.icd_codes,
                &input.cpt_codes,
                &input.cpt_codes_explanation,
                &chunk_texts(&chunks),
            )
            .await?;

        if verdict.is_valid {
            info!("✓ 复核通过");
        } else {
            info!("⚠️ 复核未通过，需要人工覆盖才能保存");
        }

        Ok(verdict)
    }

    /// 依据校验结论决定这次保存如何落库
    ///
    /// # 参数
    /// - `verdict`: 校验结论
    /// - `override_acknowledged`: 用户是否勾选了覆盖确认
    /// - `override_explanation`: 人工填写的覆盖说明
    ///
    /// # 返回
    /// 结论未通过且没有已确认的覆盖时报错，保存被拒绝
    pub fn resolve_save(
        verdict: &ValidationVerdict,
        override_acknowledged: bool,
        override_explanation: Option<&str>,
    ) -> AppResult<SaveDisposition> {
        if verdict.is_valid {
            return Ok(SaveDisposition::Adopt {
                explanation: verdict.explanation.clone(),
            });
        }

        if !override_acknowledged {
            return Err(AppError::validation(
                "Validation failed; saving requires an acknowledged override",
            ));
        }

        let explanation = override_explanation
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                AppError::validation(
                    "An override explanation is required when saving rejected codes",
                )
            })?;

        Ok(SaveDisposition::Override {
            explanation: explanation.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Confidence;

    fn verdict(is_valid: bool) -> ValidationVerdict {
        ValidationVerdict {
            is_valid,
            explanation: "model explanation".to_string(),
            suggested_changes: None,
            confidence: Confidence::High,
        }
    }

    #[test]
    fn test_valid_verdict_adopts_model_explanation() {
        let disposition = ReviewFlow::resolve_save(&verdict(true), false, None).unwrap();
        assert_eq!(
            disposition,
            SaveDisposition::Adopt {
                explanation: "model explanation".to_string()
            }
        );
    }

    #[test]
    fn test_invalid_verdict_without_acknowledgment_is_rejected() {
        let err = ReviewFlow::resolve_save(&verdict(false), false, Some("reason")).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_invalid_verdict_requires_nonempty_explanation() {
        assert!(ReviewFlow::resolve_save(&verdict(false), true, None).is_err());
        assert!(ReviewFlow::resolve_save(&verdict(false), true, Some("  ")).is_err());
    }

    #[test]
    fn test_acknowledged_override_saves() {
        let disposition =
            ReviewFlow::resolve_save(&verdict(false), true, Some("Peer-to-peer approved"))
                .unwrap();
        assert_eq!(
            disposition,
            SaveDisposition::Override {
                explanation: "Peer-to-peer approved".to_string()
            }
        );
    }
}
