use std::fmt;

use thiserror::Error;

/// 应用程序错误类型
///
/// 按来源分类：输入校验 / 配置 / 外部 API / LLM / PDF / 记录存储。
/// HTTP 层负责把这些分类映射为响应状态码（见 server 模块）。
#[derive(Debug)]
pub enum AppError {
    /// 请求输入校验错误（消息直接返回给调用方）
    Validation(String),
    /// 配置错误
    Config(ConfigError),
    /// 外部 API 调用错误（检索服务等）
    Api(ApiError),
    /// LLM 服务错误
    Llm(LlmError),
    /// PDF 解析错误
    Pdf(PdfError),
    /// 记录存储错误
    Store(StoreError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(msg) => write!(f, "输入校验失败: {}", msg),
            AppError::Config(e) => write!(f, "配置错误: {}", e),
            AppError::Api(e) => write!(f, "API错误: {}", e),
            AppError::Llm(e) => write!(f, "LLM错误: {}", e),
            AppError::Pdf(e) => write!(f, "PDF错误: {}", e),
            AppError::Store(e) => write!(f, "存储错误: {}", e),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Validation(_) => None,
            AppError::Config(e) => Some(e),
            AppError::Api(e) => Some(e),
            AppError::Llm(e) => Some(e),
            AppError::Pdf(e) => Some(e),
            AppError::Store(e) => Some(e),
        }
    }
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量不存在（或为空）
    #[error("环境变量 {var_name} 不存在或为空")]
    EnvVarNotFound { var_name: String },
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
}

/// 外部 API 调用错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络请求失败
    #[error("API请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// API 返回非 2xx 状态
    #[error("API返回错误响应 ({endpoint}): status={status}")]
    BadStatus { endpoint: String, status: u16 },
    /// JSON 解析失败
    #[error("JSON解析失败: {source}")]
    JsonParseFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// LLM 服务错误
#[derive(Debug, Error)]
pub enum LlmError {
    /// API 调用失败
    #[error("LLM API调用失败 (模型: {model}): {source}")]
    ApiCallFailed {
        model: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 返回内容为空
    #[error("LLM返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
    /// 响应中不存在完整的 `{...}` JSON 片段
    #[error("LLM响应中不存在完整的JSON对象: {preview}")]
    NoJsonObject { preview: String },
    /// JSON 片段无法解析为目标结构
    #[error("LLM返回的JSON无法解析: {source}")]
    InvalidJson {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// PDF 解析错误
#[derive(Debug, Error)]
pub enum PdfError {
    /// 文件无法加载为 PDF 文档
    #[error("PDF文档加载失败: {source}")]
    LoadFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 文本提取失败
    #[error("PDF文本提取失败: {source}")]
    ExtractFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// 记录存储错误
#[derive(Debug, Error)]
pub enum StoreError {
    /// 记录不存在
    #[error("记录不存在: {id}")]
    NotFound { id: String },
    /// 编码数组与 JSON 文本互转失败
    #[error("编码字段序列化失败: {source}")]
    CodesEncoding {
        #[source]
        source: serde_json::Error,
    },
}

// ========== 从常见错误类型转换 ==========
// 注意：不需要手动实现 From<AppError> for anyhow::Error，
// 因为 anyhow 已经为所有实现了 std::error::Error 的类型提供了自动实现

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Config(err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Api(ApiError::JsonParseFailed {
            source: Box::new(err),
        })
    }
}

impl From<lopdf::Error> for AppError {
    fn from(err: lopdf::Error) -> Self {
        AppError::Pdf(PdfError::LoadFailed {
            source: Box::new(err),
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建输入校验错误
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    /// 创建API请求失败错误
    pub fn api_request_failed(
        endpoint: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Api(ApiError::RequestFailed {
            endpoint: endpoint.into(),
            source: Box::new(source),
        })
    }

    /// 创建API错误响应错误
    pub fn bad_status(endpoint: impl Into<String>, status: u16) -> Self {
        AppError::Api(ApiError::BadStatus {
            endpoint: endpoint.into(),
            status,
        })
    }

    /// 创建LLM API调用错误
    pub fn llm_api_failed(
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Llm(LlmError::ApiCallFailed {
            model: model.into(),
            source: Box::new(source),
        })
    }

    /// 创建记录不存在错误
    pub fn record_not_found(id: impl Into<String>) -> Self {
        AppError::Store(StoreError::NotFound { id: id.into() })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
