use anyhow::Result;
use founder_finder::config::load_dotenv;
use founder_finder::utils::logging;
use founder_finder::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // .env 中的变量（包括日志开关）需要最先生效
    let dotenv = load_dotenv(".env");

    // 先初始化日志，配置解析中的警告才能输出
    let verbose = std::env::var("VERBOSE_LOGGING")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(false);
    logging::init(verbose);

    match dotenv {
        Ok(true) => tracing::info!("📄 已加载 .env 文件"),
        Ok(false) => {}
        Err(e) => tracing::warn!("⚠️ {}", e),
    }

    // 加载配置
    let config = Config::from_env();

    // 初始化并运行应用
    let _report = App::initialize(config).await?.run().await?;

    Ok(())
}
