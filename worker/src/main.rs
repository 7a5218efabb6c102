use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use worker::{build_router, WorkerArgs, WorkerNode};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("worker=info")),
        )
        .init();

    let args = WorkerArgs::parse();
    let config = args.node_config()?;
    let node = Arc::new(WorkerNode::new(config));

    let app = build_router(node);

    let listener = TcpListener::bind(("0.0.0.0", args.port))
        .await
        .with_context(|| format!("no pude escuchar en el puerto {}", args.port))?;

    info!(
        "nodo {} escuchando en {} (pfail={:.2}, pcrash={:.2}, rinit={:.2})",
        args.id,
        listener.local_addr()?,
        args.pfail,
        args.pcrash,
        args.rinit
    );

    axum::serve(listener, app).await?;
    Ok(())
}
