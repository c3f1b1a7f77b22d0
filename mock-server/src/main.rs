use mock_server::Role;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "8443".to_string());
    let role = match std::env::var("SCC_ROLE") {
        Ok(value) => Role::parse(&value).ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, format!("invalid SCC_ROLE: {value}"))
        })?,
        Err(_) => Role::Master,
    };

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, ?role, "mock connector listening");
    mock_server::run(listener, role).await
}
