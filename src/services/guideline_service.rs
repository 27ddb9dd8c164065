//! 指南检索服务 - 业务能力层
//!
//! 只负责"查询 → 指南片段"能力；不做缓存、去重或分数过滤

use tracing::info;

use crate::clients::RetrievalClient;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::GuidelineChunk;

/// 指南检索服务
pub struct GuidelineService {
    client: RetrievalClient,
}

impl GuidelineService {
    /// 创建新的指南检索服务
    pub fn new(config: &Config) -> Self {
        Self {
            client: RetrievalClient::new(config),
        }
    }

    /// 按任意查询串检索
    pub async fn retrieve(&self, query: &str) -> AppResult<Vec<GuidelineChunk>> {
        if query.trim().is_empty() {
            return Err(AppError::validation("Query is required"));
        }

        let chunks = self.client.retrieve(query).await?;
        info!("✓ 检索到 {} 条指南片段", chunks.len());
        Ok(chunks)
    }

    /// 以医嘱计划描述为查询
    pub async fn for_medical_plan(&self, medical_plan: &str) -> AppResult<Vec<GuidelineChunk>> {
        self.retrieve(medical_plan).await
    }

    /// 以空格连接的 ICD 编码串为查询
    pub async fn for_icd_codes(&self, icd_codes: &[String]) -> AppResult<Vec<GuidelineChunk>> {
        self.retrieve(&icd_codes.join(" ")).await
    }
}

/// 取出片段文本，保持相关度顺序
pub fn chunk_texts(chunks: &[GuidelineChunk]) -> Vec<String> {
    chunks.iter().map(|c| c.text.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_texts_preserves_order() {
        let chunks = vec![
            GuidelineChunk {
                text: "first".to_string(),
                score: Some(0.9),
            },
            GuidelineChunk {
                text: "second".to_string(),
                score: Some(0.5),
            },
        ];
        assert_eq!(chunk_texts(&chunks), vec!["first", "second"]);
    }
}
