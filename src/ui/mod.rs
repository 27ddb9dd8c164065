//! 客户端视图状态 - 展示层
//!
//! 纯本地、不持久化的 UI 状态：状态过滤、整表替换的列表视图、
//! 编辑对话框状态机。跨会话不保留。

pub mod dialog;
pub mod list_view;

pub use dialog::{DialogState, EditDialog, EditableAuth};
pub use list_view::{HasStatus, ListView, StatusFilter};
