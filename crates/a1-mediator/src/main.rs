//! A1 mediator binary.
//!
//! - REST surface: /a1-p/policytypes/...
//! - Config from `$A1_CONFIG` (default `a1.yaml`)
//! - State in the in-process SDL backend

use std::sync::Arc;

use tracing_subscriber::{fmt, EnvFilter};

use a1_mediator::config::{self, CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH};
use a1_mediator::sdl::InMemorySdl;
use a1_mediator::{app_state, router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let cfg = config::load_from_file(&path)?;
    let listen = cfg.server.listen_addr()?;

    let state = app_state::AppState::new(cfg, Arc::new(InMemorySdl::new()))?;
    let app = router::build_router(state);

    tracing::info!(%listen, config = %path, "a1-mediator starting");
    let listener = tokio::net::TcpListener::bind(listen).await?;

    axum::serve(listener, app).await?;
    Ok(())
}
