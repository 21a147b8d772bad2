//! Crawler test site fixture server.
//!
//! Serves every page of the test site as server-rendered HTML, streams the
//! hybrid page, and hosts the WASM bundle that mounts the client islands.
//!
//! Usage: `crawltestd [--config <path>] [--bind <addr>]`

use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod limiter;
mod render;
mod routes;

use config::{Args, ServerConfig};
use error::ServerError;
use routes::AppState;

const USAGE: &str = "\
crawltestd - crawler test site fixture server

USAGE:
    crawltestd [--config <path>] [--bind <addr>]

OPTIONS:
    --config <path>   JSON config file
    --bind <addr>     listen address (default 127.0.0.1:8080)
    -h, --help        print this help

ENVIRONMENT:
    CRAWLTEST_BIND, CRAWLTEST_DIST_DIR, CRAWLTEST_WEB_BUNDLE
    RUST_LOG          log filter (default crawltestd=info,tower_http=info)";

async fn run(config: ServerConfig) -> Result<(), ServerError> {
    let addr = config.bind_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    let state = Arc::new(AppState::new(config));
    info!(
        %addr,
        dist_dir = %state.config.dist_dir.display(),
        rate_limit = state.limiter.max_requests(),
        "crawler test site listening"
    );

    let app = routes::router(state);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C: shutting down");
        }
    })
    .await
    .map_err(ServerError::Serve)
}

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("crawltestd=info,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = match Args::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}\n\n{USAGE}");
            return ExitCode::from(2);
        }
    };
    if args.help {
        println!("{USAGE}");
        return ExitCode::SUCCESS;
    }

    let config = match ServerConfig::load(&args, |k| std::env::var(k).ok()) {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
