//! Collectibles image upload endpoint.

use collectibles_client::shutdown;
use collectibles_client::upload::{create_router, DiskUploader};
use collectibles_client::Config;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting collectibles upload endpoint");

    let config = Config::load().unwrap_or_else(|e| {
        error!(error = %e, "FATAL: Config error, fix env vars or collectibles.toml");
        std::process::exit(1);
    });

    info!(
        upload_dir = %config.upload_dir,
        max_bytes = config.max_upload_bytes,
        "Configuration loaded"
    );

    let uploader = DiskUploader::new(&config.upload_dir, config.max_upload_bytes);
    let app = create_router(uploader, config.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!(address = %config.bind_address, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::signal("collectibles-upload"))
        .await?;

    info!("Upload endpoint stopped, in-flight uploads drained");
    Ok(())
}
