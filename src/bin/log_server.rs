use log::{error, info};

use sensetap::config::AppConfig;
use sensetap::logger;
use sensetap::server::LogServer;

#[tokio::main]
async fn main() {
    logger::init_logger();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let mut server = match LogServer::bind(&config.server).await {
        Ok(server) => server,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for interrupt: {}", e);
            std::future::pending::<()>().await;
        }
    };

    match server.run_until(interrupt).await {
        Ok(report) => info!(
            "Session finished ({:?}): {} bytes, {} JSON records, {} raw records",
            report.close_reason, report.bytes_received, report.json_records, report.raw_records
        ),
        Err(e) => {
            error!("Server error: {}", e);
            std::process::exit(1);
        }
    }
}
