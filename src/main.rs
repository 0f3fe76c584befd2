use domain_trust_backend::AppState;
use domain_trust_backend::config::AppConfig;
use domain_trust_backend::routes;
use tokio::net::TcpListener; //TCP listener
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main] // the program entry point using the Tokio async runtime.
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok(); //loads environment variables

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // refuse to start on bad configuration, e.g. an unresolvable PORT
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };

    if config.virus_total_api_key.is_none() {
        warn!("VIRUS_TOTAL_API_KEY is not set; domain checks will report invalid credentials");
    }

    let state = AppState::from_config(&config)?;
    let app = routes::router(state);

    let addr = config.socket_addr();
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
