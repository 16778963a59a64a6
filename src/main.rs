use std::process::ExitCode;

use clap::Parser;
use course_capture::cli::Cli;
use course_capture::utils::logging;
use course_capture::{App, Config};
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // 加载配置
    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            logging::init(false);
            error!("❌ {}", e);
            return ExitCode::FAILURE;
        }
    };
    cli.apply(&mut config);

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    let app = match App::initialize(config).await {
        Ok(app) => app,
        Err(e) => {
            error!("❌ 初始化失败: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match app.run().await {
        Ok(report) => report.exit_code(),
        Err(e) => {
            error!("❌ 下载失败: {}", e);
            ExitCode::FAILURE
        }
    }
}
