use server::core::{Config, Server};
use server::utils::logger;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    let config = Config::from_env();

    let log_dir = format!("{}/logs", config.work_dir);
    let _ = std::fs::create_dir_all(&log_dir);
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into());
    logger::init_logger_with_file(Some(&log_level), Some(&log_dir));

    tracing::info!(
        environment = %config.environment,
        port = config.http_port,
        "Starting shop server"
    );

    if let Err(e) = Server::new(config).run().await {
        tracing::error!(error = %e, "Server exited with error");
        std::process::exit(1);
    }
}
