use anyhow::Context;
use prism_indexer::datasource::{ChainReader, JsonLinesFeed, RpcChainReader};
use prism_indexer::store::EntityStore;
use prism_indexer::{api, config::Config, db::init_db, Indexer, SqliteStore};
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    let config = Config::from_env().context("configuration error")?;

    let pool = init_db(&config.database_path)
        .await
        .with_context(|| format!("failed to initialize database at {}", config.database_path))?;
    let store: Arc<dyn EntityStore> = Arc::new(SqliteStore::new(pool));
    let chain: Arc<dyn ChainReader> = Arc::new(RpcChainReader::new(
        config.rpc_url.clone(),
        config.rpc_max_elapsed,
    ));

    // Catch up with the feed before answering queries.
    let indexer = Indexer::new(store.clone(), chain);
    let mut feed = JsonLinesFeed::new(&config.events_path);
    let stats = indexer
        .run(&mut feed)
        .await
        .with_context(|| format!("indexing {} failed", config.events_path))?;
    tracing::info!(
        handled = stats.handled,
        ignored = stats.ignored,
        skipped = stats.skipped,
        "feed exhausted"
    );

    if !config.serve_api {
        return Ok(());
    }

    let app = api::create_router(api::AppState::new(store));
    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;

    tracing::info!("Server listening on {}", addr);
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
