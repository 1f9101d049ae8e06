use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;
use transkit_mock_server::MockState;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let api_key = std::env::var("MOCK_API_KEY").unwrap_or_else(|_| "test-key".to_string());
    let addr = format!("127.0.0.1:{port}");

    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, "mock transkit listening");
    transkit_mock_server::run(listener, MockState::new(api_key)).await
}
