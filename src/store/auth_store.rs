//! 事前授权存储适配器
//!
//! 编码数组的规范化在这一层统一做掉，入库的记录不再带
//! 首尾空白或小写编码。

use chrono::Utc;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{
    codes, AuthPatch, AuthStatus, CodeSuggestion, DocumentFields, NewPriorAuthorization,
    PriorAuthorization,
};
use crate::store::record_store::{Record, RecordStore, Subscription};

impl Record for PriorAuthorization {
    fn id(&self) -> &str {
        &self.id
    }
}

/// 事前授权存储
#[derive(Clone, Default)]
pub struct AuthStore {
    inner: RecordStore<PriorAuthorization>,
}

impl AuthStore {
    pub fn new() -> Self {
        Self {
            inner: RecordStore::new(),
        }
    }

    /// 直接表单创建，状态固定 PENDING
    pub async fn create(&self, new: NewPriorAuthorization) -> PriorAuthorization {
        let now = Utc::now();
        let auth = PriorAuthorization {
            id: Uuid::new_v4().to_string(),
            employee_id: new.employee_id,
            patient_name: new.patient_name,
            patient_date_of_birth: new.patient_date_of_birth,
            status: AuthStatus::Pending,
            cpt_codes: codes::normalize(&new.cpt_codes),
            icd_codes: codes::normalize(&new.icd_codes),
            cpt_codes_explanation: new.cpt_codes_explanation,
            is_override: false,
            override_explanation: None,
            medical_plan: new.medical_plan,
            payer_name: new.payer_name,
            created_at: now,
            updated_at: now,
        };
        self.inner.insert(auth).await
    }

    /// 由 PDF 抽取管线的产物创建
    ///
    /// ICD 编码来自字段抽取，CPT 编码与说明来自编码建议
    pub async fn create_from_intake(
        &self,
        fields: &DocumentFields,
        suggestion: &CodeSuggestion,
        employee_id: Option<String>,
    ) -> PriorAuthorization {
        self.create(NewPriorAuthorization {
            patient_name: fields.patient_name.clone(),
            patient_date_of_birth: fields.patient_dob.clone(),
            employee_id,
            cpt_codes: suggestion.cpt_codes.clone(),
            icd_codes: fields.icd_codes.clone(),
            cpt_codes_explanation: Some(suggestion.cpt_codes_explanation.clone()),
            medical_plan: Some(fields.medical_plan.clone()),
            payer_name: None,
        })
        .await
    }

    /// 部分更新（字段编辑 / 校验与覆盖工作流）
    pub async fn update(&self, id: &str, patch: AuthPatch) -> AppResult<PriorAuthorization> {
        self.inner
            .update(id, move |auth| {
                patch.apply(auth);
                auth.updated_at = Utc::now();
            })
            .await
    }

    pub async fn get(&self, id: &str) -> AppResult<PriorAuthorization> {
        self.inner.get(id).await
    }

    pub async fn list(&self) -> Vec<PriorAuthorization> {
        self.inner.list().await
    }

    /// 按经办人过滤的列表
    pub async fn list_for_employee(&self, employee_id: &str) -> Vec<PriorAuthorization> {
        let employee_id = employee_id.to_string();
        self.inner
            .list_where(|a| a.employee_id.as_deref() == Some(employee_id.as_str()))
            .await
    }

    /// 订阅全部授权
    pub async fn observe_all(&self) -> Subscription<PriorAuthorization> {
        self.inner.subscribe(|_| true).await
    }

    /// 订阅某个经办人的授权（等值过滤）
    pub async fn observe_employee(&self, employee_id: &str) -> Subscription<PriorAuthorization> {
        let employee_id = employee_id.to_string();
        self.inner
            .subscribe(move |a| a.employee_id.as_deref() == Some(employee_id.as_str()))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_normalizes_codes() {
        let store = AuthStore::new();
        let created = store
            .create(NewPriorAuthorization {
                patient_name: "John Cena".to_string(),
                patient_date_of_birth: "04/28/1997".to_string(),
                employee_id: Some("EMP-7".to_string()),
                cpt_codes: vec![" 99213 ".to_string()],
                icd_codes: vec!["m17.11".to_string()],
                cpt_codes_explanation: None,
                medical_plan: None,
                payer_name: None,
            })
            .await;

        assert_eq!(created.status, AuthStatus::Pending);
        assert_eq!(created.cpt_codes, vec!["99213"]);
        assert_eq!(created.icd_codes, vec!["M17.11"]);
        assert!(!created.is_override);
    }

    #[tokio::test]
    async fn test_employee_filter_is_equality() {
        let store = AuthStore::new();
        for employee in ["EMP-1", "EMP-2", "EMP-1"] {
            store
                .create(NewPriorAuthorization {
                    patient_name: "P".to_string(),
                    patient_date_of_birth: "01/01/2000".to_string(),
                    employee_id: Some(employee.to_string()),
                    cpt_codes: vec![],
                    icd_codes: vec![],
                    cpt_codes_explanation: None,
                    medical_plan: None,
                    payer_name: None,
                })
                .await;
        }

        assert_eq!(store.list_for_employee("EMP-1").await.len(), 2);
        assert_eq!(store.list_for_employee("EMP-3").await.len(), 0);
    }
}
