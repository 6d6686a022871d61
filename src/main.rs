use deepflow::infrastructure::bootstrap;
use deepflow::infrastructure::config::Settings;
use deepflow::interfaces::http::start_server;
use tracing::info;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::load()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;

    let state = bootstrap::build_state(&settings)
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;

    let server = start_server(state, &settings.server.host, settings.server.port)?;
    info!(
        host = %settings.server.host,
        port = settings.server.port,
        "DeepFlow API listening"
    );

    server.await
}
