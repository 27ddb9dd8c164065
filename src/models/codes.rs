//! CPT / ICD 编码数组的序列化契约
//!
//! 持久化和线上传输时，编码数组统一存为 JSON 编码后的字符串
//! （`"[\"99213\"]"`）；内存中始终是 `Vec<String>`。
//! 反序列化额外容忍裸数组形式，保证旧数据仍然可读。

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{AppError, AppResult, StoreError};

/// serde `with` 模块：`Vec<String>` ⇄ JSON 文本字符串
pub mod json_text {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(codes: &Vec<String>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let text = serde_json::to_string(codes).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        // 新约定是 JSON 文本，旧记录可能还是裸数组
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            List(Vec<String>),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Text(text) => serde_json::from_str(&text).map_err(serde::de::Error::custom),
            Repr::List(list) => Ok(list),
        }
    }
}

/// 编码数组 → JSON 文本
pub fn encode(codes: &[String]) -> AppResult<String> {
    serde_json::to_string(codes).map_err(|e| AppError::Store(StoreError::CodesEncoding { source: e }))
}

/// JSON 文本 → 编码数组
pub fn decode(text: &str) -> AppResult<Vec<String>> {
    serde_json::from_str(text).map_err(|e| AppError::Store(StoreError::CodesEncoding { source: e }))
}

/// 去掉首尾空白并统一大写
pub fn normalize(codes: &[String]) -> Vec<String> {
    codes
        .iter()
        .map(|c| c.trim().to_ascii_uppercase())
        .filter(|c| !c.is_empty())
        .collect()
}

static CPT_RE: OnceLock<Regex> = OnceLock::new();
static ICD_RE: OnceLock<Regex> = OnceLock::new();

/// CPT 编码形状检查（5 位数字）
pub fn is_wellformed_cpt(code: &str) -> bool {
    CPT_RE
        .get_or_init(|| Regex::new(r"^\d{5}$").expect("CPT 正则"))
        .is_match(code)
}

/// ICD-10 编码形状检查（字母 + 两位数字，可带小数扩展）
pub fn is_wellformed_icd(code: &str) -> bool {
    ICD_RE
        .get_or_init(|| Regex::new(r"^[A-TV-Z]\d{2}(\.\d{1,4})?$").expect("ICD 正则"))
        .is_match(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_preserves_order() {
        let codes = vec!["M17.11".to_string(), "99213".to_string(), "E11.9".to_string()];
        let text = encode(&codes).unwrap();
        assert_eq!(decode(&text).unwrap(), codes);
    }

    #[test]
    fn test_decode_rejects_malformed_text() {
        assert!(decode("not json").is_err());
        assert!(decode("{\"a\":1}").is_err());
    }

    #[test]
    fn test_json_text_tolerates_raw_array() {
        #[derive(serde::Deserialize)]
        struct Row {
            #[serde(with = "super::json_text")]
            codes: Vec<String>,
        }

        // 新约定：JSON 文本
        let new_style: Row = serde_json::from_str(r#"{"codes":"[\"99213\"]"}"#).unwrap();
        assert_eq!(new_style.codes, vec!["99213"]);

        // 旧记录：裸数组
        let old_style: Row = serde_json::from_str(r#"{"codes":["99213"]}"#).unwrap();
        assert_eq!(old_style.codes, vec!["99213"]);
    }

    #[test]
    fn test_wellformed_checks() {
        assert!(is_wellformed_cpt("99213"));
        assert!(!is_wellformed_cpt("9921"));
        assert!(!is_wellformed_cpt("73721-TC"));
        assert!(is_wellformed_icd("M17.11"));
        assert!(is_wellformed_icd("E11"));
        assert!(!is_wellformed_icd("M1711")); // 缺少小数点
        assert!(!is_wellformed_icd("17.11"));
    }

    #[test]
    fn test_normalize() {
        let raw = vec![" m17.11 ".to_string(), String::new(), "99213".to_string()];
        assert_eq!(normalize(&raw), vec!["M17.11", "99213"]);
    }
}
