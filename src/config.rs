use crate::error::{AppResult, ConfigError};

/// 程序配置
///
/// 在 main 中构造一次，按引用传给各个客户端/服务。
/// 必需的密钥缺失时 from_env 直接失败，不会带病启动。
#[derive(Clone, Debug)]
pub struct Config {
    /// HTTP 监听地址
    pub listen_addr: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- 完成 API（OpenAI 兼容）配置 ---
    pub completion_api_key: String,
    pub completion_api_base_url: String,
    /// 就诊单字段抽取使用的模型
    pub extraction_model: String,
    /// CPT 编码建议 / 校验使用的模型
    pub coding_model: String,
    /// 采样温度
    pub sampling_temperature: f32,
    // --- 检索 API 配置 ---
    pub retrieval_api_key: String,
    pub retrieval_api_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:3000".to_string(),
            verbose_logging: false,
            completion_api_key: String::new(),
            completion_api_base_url: "https://api.openai.com/v1".to_string(),
            extraction_model: "gpt-4".to_string(),
            coding_model: "gpt-4o".to_string(),
            sampling_temperature: 0.7,
            retrieval_api_key: String::new(),
            retrieval_api_url: "https://api.ragie.ai/retrievals".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        let default = Self::default();
        Ok(Self {
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or(default.listen_addr),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            completion_api_key: require_env("OPENAI_API_KEY")?,
            completion_api_base_url: std::env::var("OPENAI_API_BASE_URL").unwrap_or(default.completion_api_base_url),
            extraction_model: std::env::var("EXTRACTION_MODEL").unwrap_or(default.extraction_model),
            coding_model: std::env::var("CODING_MODEL").unwrap_or(default.coding_model),
            sampling_temperature: std::env::var("SAMPLING_TEMPERATURE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.sampling_temperature),
            retrieval_api_key: require_env("RAGIE_AI_API_KEY")?,
            retrieval_api_url: std::env::var("RAGIE_API_URL").unwrap_or(default.retrieval_api_url),
        })
    }
}

/// 读取必需的环境变量，缺失或为空即报错
fn require_env(var_name: &str) -> AppResult<String> {
    match std::env::var(var_name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::EnvVarNotFound {
            var_name: var_name.to_string(),
        }
        .into()),
    }
}
