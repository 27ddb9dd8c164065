use anyhow::Result;
use prior_auth_portal::utils::logging;
use prior_auth_portal::{Config, Server};

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logging::init();

    // 加载配置（必需密钥缺失时直接失败）
    let config = Config::from_env()?;

    // 初始化并运行服务
    Server::initialize(config)?.run().await?;

    Ok(())
}
