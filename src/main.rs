use std::sync::Arc;

use bookshelf::routes;
use bookshelf::BookCatalog;
use bookshelf::BookFile;
use bookshelf::ListenerRegistry;
use bookshelf::Settings;
use tokio::sync::watch;
use tracing::error;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        error!("server exited with error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> bookshelf::Result<()> {
    let settings = Settings::load()?;

    let store = Arc::new(BookFile::open(&settings.storage.data_file).await?);
    let listeners = Arc::new(ListenerRegistry::new());
    let catalog = Arc::new(BookCatalog::new(store, listeners));

    // Initializing shutdown signal
    let (graceful_tx, mut graceful_rx) = watch::channel(());
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for shutdown signal: {}", e);
            return;
        }
        info!("shutdown signal received");
        let _ = graceful_tx.send(());
    });

    let (addr, server) = warp::serve(routes(catalog)).bind_with_graceful_shutdown(
        settings.server.listen_address,
        async move {
            let _ = graceful_rx.changed().await;
        },
    );

    info!("bookshelf listening on {}", addr);
    server.await;
    info!("bookshelf stopped");
    Ok(())
}
