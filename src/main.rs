use crudkit::infrastructure::config::AppConfig;
use crudkit::infrastructure::db;
use crudkit::infrastructure::state::AppState;
use crudkit::presentation;

use std::env;
use std::future::Future;
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    run_with_signal().await
}

async fn run_with_signal() -> anyhow::Result<()> {
    run(async {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("shutting down");
    })
    .await
}

async fn run<F>(shutdown_signal: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let config = AppConfig::load()?;

    // Tests may call this more than once
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            env::var("RUST_LOG").unwrap_or_else(|_| "crudkit=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .try_init();

    let (listener, app) = bootstrap(config).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal)
    .await?;

    Ok(())
}

async fn bootstrap(config: AppConfig) -> anyhow::Result<(tokio::net::TcpListener, axum::Router)> {
    let pool = db::create_pool(&config.database).await?;

    db::run_migrations(&pool).await?;

    let addr = config.bind_address();
    let state = AppState::postgres(config, pool)?;
    let app = presentation::router::app(state)?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    Ok((listener, app))
}
