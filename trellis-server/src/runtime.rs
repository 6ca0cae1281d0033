use tokio::net::TcpListener;

use trellis_core::AppConfig;

use crate::app::router;
use crate::error::ServerError;

/// Start the server and block the current thread until it exits.
pub fn start_blocking(config: AppConfig) -> Result<(), ServerError> {
    init_tracing();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(ServerError::Runtime)?;
    runtime.block_on(run(config))
}

/// Bind `config.server.bind` and serve until ctrl-c.
pub async fn run(config: AppConfig) -> Result<(), ServerError> {
    let app = router(&config);
    let addr = config.server.bind.clone();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;

    let local = listener.local_addr().map_err(ServerError::Serve)?;
    tracing::info!(
        addr = %local,
        template_dirs = ?config.renderer.template_dirs,
        debug = config.renderer.debug,
        "trellis server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve)
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("received ctrl-c, shutting down server"),
        Err(err) => tracing::warn!(error = %err, "ctrl-c handler failed, shutting down"),
    }
}

/// Install the global `tracing` subscriber. `RUST_LOG` overrides the
/// default `info` filter; repeated calls are no-ops.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}
