use anyhow::Result;
use fin_table_analyzer::utils::logging;
use fin_table_analyzer::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::load()?;

    // 初始化日志
    logging::init_with_verbose(config.verbose_logging);

    // 初始化并运行应用
    let report = App::initialize(config)?.run().await?;

    if report.summary.has_errors() {
        std::process::exit(1);
    }

    Ok(())
}
