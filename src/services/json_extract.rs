//! 从 LLM 自由文本响应中截取并解析 JSON 对象
//!
//! 模型经常把 JSON 包在解释性文字里。这里的策略是取第一个 `{`
//! 到最后一个 `}` 之间的子串再解析，对前后缀噪声免疫。

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::{AppError, AppResult, LlmError};
use crate::utils::logging::truncate_text;

/// 截取响应中的 JSON 对象片段
///
/// 找不到成对的 `{...}` 时返回显式错误，绝不退化为空对象。
pub fn extract_json_object(content: &str) -> AppResult<&str> {
    let start = content.find('{');
    let end = content.rfind('}');

    match (start, end) {
        (Some(start), Some(end)) if start < end => Ok(&content[start..=end]),
        _ => Err(AppError::Llm(LlmError::NoJsonObject {
            preview: truncate_text(content, 120),
        })),
    }
}

/// 截取并解析为目标结构
///
/// 解析失败时把原始内容写入日志，便于诊断
pub fn parse_json_object<T: DeserializeOwned>(content: &str) -> AppResult<T> {
    let span = extract_json_object(content)?;
    serde_json::from_str(span).map_err(|e| {
        warn!("LLM 返回的 JSON 无法解析，原始内容: {}", content);
        AppError::Llm(LlmError::InvalidJson {
            source: Box::new(e),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_extraction_is_idempotent_under_prose() {
        let bare = r#"{"cptCode":["99213"],"description":"visit"}"#;
        let wrapped = format!("Sure! Here is the JSON you asked for:\n{}\nLet me know.", bare);

        let from_bare: Value = parse_json_object(bare).unwrap();
        let from_wrapped: Value = parse_json_object(&wrapped).unwrap();
        assert_eq!(from_bare, from_wrapped);
    }

    #[test]
    fn test_nested_braces_survive() {
        let wrapped = r#"answer: {"outer": {"inner": [1, 2]}} done"#;
        let value: Value = parse_json_object(wrapped).unwrap();
        assert_eq!(value["outer"]["inner"][1], 2);
    }

    #[test]
    fn test_missing_braces_is_an_error() {
        let err = extract_json_object("no json here at all").unwrap_err();
        assert!(matches!(
            err,
            AppError::Llm(LlmError::NoJsonObject { .. })
        ));
    }

    #[test]
    fn test_reversed_braces_is_an_error() {
        // `}` 在 `{` 之前不构成对象
        assert!(extract_json_object("} oops {").is_err());
    }

    #[test]
    fn test_unparsable_span_is_an_error() {
        let err = parse_json_object::<Value>("prefix {not valid json} suffix").unwrap_err();
        assert!(matches!(err, AppError::Llm(LlmError::InvalidJson { .. })));
    }
}
