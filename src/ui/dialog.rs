//! 授权编辑对话框状态机
//!
//! 状态流转：
//! Idle → Editing（字段变更）→ Validating（校验请求在途）
//! → Validated(valid) | Validated(invalid, 需覆盖) → Saved | Idle（取消）
//!
//! Validated(invalid) 下未确认覆盖时保存不可用。

use crate::error::{AppError, AppResult};
use crate::models::{PriorAuthorization, ValidationVerdict};

/// 对话框状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogState {
    /// 打开但尚未改动
    Idle,
    /// 字段已变更
    Editing,
    /// 校验请求在途
    Validating,
    /// 校验已返回
    Validated { valid: bool },
    /// 已保存
    Saved,
}

/// 可编辑的授权字段（表单草稿）
#[derive(Debug, Clone, Default)]
pub struct EditableAuth {
    pub patient_name: String,
    pub patient_date_of_birth: String,
    pub icd_codes: Vec<String>,
    pub cpt_codes: Vec<String>,
    pub cpt_codes_explanation: String,
}

impl From<&PriorAuthorization> for EditableAuth {
    fn from(auth: &PriorAuthorization) -> Self {
        Self {
            patient_name: auth.patient_name.clone(),
            patient_date_of_birth: auth.patient_date_of_birth.clone(),
            icd_codes: auth.icd_codes.clone(),
            cpt_codes: auth.cpt_codes.clone(),
            cpt_codes_explanation: auth.cpt_codes_explanation.clone().unwrap_or_default(),
        }
    }
}

/// 编辑对话框
pub struct EditDialog {
    state: DialogState,
    /// 表单草稿
    pub draft: EditableAuth,
    /// 覆盖确认复选框
    pub override_acknowledged: bool,
    /// 人工覆盖说明
    pub override_explanation: String,
    verdict: Option<ValidationVerdict>,
}

impl EditDialog {
    /// 为一条记录打开对话框
    pub fn open(auth: &PriorAuthorization) -> Self {
        Self {
            state: DialogState::Idle,
            draft: EditableAuth::from(auth),
            override_acknowledged: false,
            override_explanation: String::new(),
            verdict: None,
        }
    }

    pub fn state(&self) -> &DialogState {
        &self.state
    }

    pub fn verdict(&self) -> Option<&ValidationVerdict> {
        self.verdict.as_ref()
    }

    /// 任意字段变更
    ///
    /// 已有的校验结论随之失效，需要重新校验
    pub fn field_changed(&mut self) {
        self.state = DialogState::Editing;
        self.verdict = None;
        self.override_acknowledged = false;
    }

    /// 发起校验（请求进入在途状态）
    pub fn begin_validation(&mut self) -> AppResult<()> {
        if self.state != DialogState::Editing {
            return Err(AppError::validation(
                "Nothing to validate: no fields have been edited",
            ));
        }
        self.state = DialogState::Validating;
        Ok(())
    }

    /// 校验返回
    pub fn validation_finished(&mut self, verdict: ValidationVerdict) {
        self.state = DialogState::Validated {
            valid: verdict.is_valid,
        };
        self.verdict = Some(verdict);
    }

    /// 校验请求失败（网络 / 上游错误），回到编辑态
    pub fn validation_failed(&mut self) {
        self.state = DialogState::Editing;
        self.verdict = None;
    }

    /// 勾选覆盖确认并填写说明
    pub fn acknowledge_override(&mut self, explanation: impl Into<String>) {
        self.override_acknowledged = true;
        self.override_explanation = explanation.into();
    }

    /// 保存是否可用
    pub fn can_save(&self) -> bool {
        match self.state {
            DialogState::Validated { valid: true } => true,
            DialogState::Validated { valid: false } => {
                self.override_acknowledged && !self.override_explanation.trim().is_empty()
            }
            _ => false,
        }
    }

    /// 保存
    pub fn save(&mut self) -> AppResult<()> {
        if !self.can_save() {
            return Err(AppError::validation(
                "Save is disabled until validation passes or an override is acknowledged",
            ));
        }
        self.state = DialogState::Saved;
        Ok(())
    }

    /// 取消，丢弃草稿
    pub fn cancel(&mut self) {
        self.state = DialogState::Idle;
        self.verdict = None;
        self.override_acknowledged = false;
        self.override_explanation.clear();
    }
}
