//! 完成 API 客户端
//!
//! 封装所有与完成端点（OpenAI 兼容）的交互。
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 校验场景可请求 JSON 结构化输出模式

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs, ResponseFormat,
    },
    Client,
};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, LlmError};

/// 完成 API 客户端
///
/// 职责：
/// - 发送聊天请求并取回文本内容
/// - 不关心提示词内容，也不解析业务 JSON
pub struct LlmClient {
    client: Client<OpenAIConfig>,
    temperature: f32,
}

impl LlmClient {
    /// 创建新的完成 API 客户端
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.completion_api_key)
            .with_api_base(&config.completion_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            temperature: config.sampling_temperature,
        }
    }

    /// 发送聊天请求
    ///
    /// # 参数
    /// - `model`: 模型名称
    /// - `user_message`: 用户消息内容
    /// - `system_message`: 系统消息（可选）
    ///
    /// # 返回
    /// 返回 LLM 的响应内容（去掉首尾空白）
    pub async fn chat(
        &self,
        model: &str,
        user_message: &str,
        system_message: Option<&str>,
    ) -> AppResult<String> {
        self.request(model, user_message, system_message, false).await
    }

    /// 发送聊天请求并要求 JSON 结构化输出
    ///
    /// 用于校验场景，减少模型返回不合法 JSON 的概率
    pub async fn chat_json(
        &self,
        model: &str,
        user_message: &str,
        system_message: Option<&str>,
    ) -> AppResult<String> {
        self.request(model, user_message, system_message, true).await
    }

    async fn request(
        &self,
        model: &str,
        user_message: &str,
        system_message: Option<&str>,
        json_mode: bool,
    ) -> AppResult<String> {
        debug!("调用完成 API，模型: {}", model);
        debug!("用户消息长度: {} 字符", user_message.len());

        let mut messages = Vec::new();

        // 添加系统消息（如果提供）
        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()
                .map_err(|e| AppError::llm_api_failed(model, e))?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        // 添加用户消息
        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()
            .map_err(|e| AppError::llm_api_failed(model, e))?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        // 构建请求
        let mut builder = CreateChatCompletionRequestArgs::default();
        builder
            .model(model)
            .messages(messages)
            .temperature(self.temperature);
        if json_mode {
            builder.response_format(ResponseFormat::JsonObject);
        }
        let request = builder
            .build()
            .map_err(|e| AppError::llm_api_failed(model, e))?;

        // 调用 API
        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("完成 API 调用失败: {}", e);
            AppError::llm_api_failed(model, e)
        })?;

        debug!("完成 API 调用成功");

        // 提取响应内容
        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| {
                AppError::Llm(LlmError::EmptyContent {
                    model: model.to_string(),
                })
            })?;

        Ok(content.trim().to_string())
    }
}
