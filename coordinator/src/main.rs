mod config;
mod coordinator;
mod node_client;
mod report;
mod round;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use reqwest::Client;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::CoordinatorArgs;
use crate::coordinator::{Coordinator, CALL_TIMEOUT};
use crate::node_client::{HttpNodeClient, NodeClient};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("coordinator=info,reqwest=info")),
        )
        .init();

    let args = CoordinatorArgs::parse();
    let http = Client::builder()
        .connect_timeout(CALL_TIMEOUT)
        .build()
        .context("no pude crear el cliente HTTP")?;

    // sin todos los nodos no hay corrida
    info!("conectando a los nodos...");
    let mut nodes: Vec<Arc<dyn NodeClient>> = Vec::new();
    for (node_id, url) in args.endpoints()? {
        let client = HttpNodeClient::connect(node_id, &url, http.clone(), CALL_TIMEOUT)
            .await
            .with_context(|| format!("error conectando al nodo {} en {}", node_id, url))?;
        info!("conectado al nodo {} en {}", node_id, client.base_url());
        nodes.push(Arc::new(client));
    }

    let coordinator = Coordinator::new(nodes);
    info!(
        "iniciando {} sumas de vectores con {} nodos",
        args.rounds,
        coordinator.node_ids().len()
    );

    let mut rng = StdRng::from_os_rng();
    let log = coordinator.run(args.rounds, &mut rng).await;

    info!("=== obteniendo estadísticas finales ===");
    let report = coordinator.collect_final_report().await;

    for (node_id, tally) in &log.per_node {
        info!(
            "nodo {} visto por el coordinador - correctas: {}, incorrectas: {}, caídas: {} (total {})",
            node_id,
            tally.correct,
            tally.incorrect,
            tally.crashed,
            tally.total()
        );
    }

    report::write_report(&args.output, &report, &coordinator.node_ids())?;
    info!("resultados guardados en {}", args.output.display());

    Ok(())
}
