//! 检索 API 客户端
//!
//! 封装所有与指南检索服务的调用逻辑

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::GuidelineChunk;
use crate::utils::logging::truncate_text;

/// 检索 API 客户端
pub struct RetrievalClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
}

/// 检索端点的响应体
#[derive(Debug, Deserialize)]
struct RetrievalResponse {
    #[serde(default)]
    scored_chunks: Vec<GuidelineChunk>,
}

impl RetrievalClient {
    /// 创建新的检索客户端
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: config.retrieval_api_url.clone(),
            api_key: config.retrieval_api_key.clone(),
        }
    }

    /// 按查询串检索指南片段
    ///
    /// # 参数
    /// - `query`: 查询文本（ICD 编码串或医嘱计划描述）
    ///
    /// # 返回
    /// 返回按相关度排序的片段列表，顺序原样保留
    pub async fn retrieve(&self, query: &str) -> AppResult<Vec<GuidelineChunk>> {
        debug!("调用检索 API，查询: {}", truncate_text(query, 80));

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({ "query": query }))
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(&self.api_url, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!("检索 API 返回错误状态: {}", status);
            return Err(AppError::bad_status(&self.api_url, status.as_u16()));
        }

        let body: RetrievalResponse = response
            .json()
            .await
            .map_err(|e| AppError::api_request_failed(&self.api_url, e))?;

        debug!("检索完成，共 {} 个片段", body.scored_chunks.len());

        Ok(body.scored_chunks)
    }
}
