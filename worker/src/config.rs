use std::time::Duration;

use clap::Parser;
use common::NodeId;

use crate::decision::{InvalidProbability, Probabilities};
use crate::node::NodeConfig;

#[derive(Parser, Debug, Clone)]
#[command(name = "worker")]
#[command(about = "Nodo de cómputo que suma vectores y lleva su reputación")]
pub struct WorkerArgs {
    /// Id del nodo (1..N)
    #[arg(long, default_value_t = 1)]
    pub id: NodeId,

    /// Puerto donde escucha el nodo
    #[arg(long, default_value_t = 50051)]
    pub port: u16,

    /// Probabilidad de responder una suma incorrecta
    #[arg(long, default_value_t = 0.1)]
    pub pfail: f64,

    /// Probabilidad de caída por tarea
    #[arg(long, default_value_t = 0.05)]
    pub pcrash: f64,

    /// Reputación inicial
    #[arg(long, default_value_t = 1000.0)]
    pub rinit: f64,

    /// Latencia de procesamiento simulada por tarea, en milisegundos
    #[arg(long, default_value_t = 0)]
    pub latency_ms: u64,
}

impl WorkerArgs {
    pub fn node_config(&self) -> Result<NodeConfig, InvalidProbability> {
        Ok(NodeConfig {
            id: self.id,
            probabilities: Probabilities::new(self.pcrash, self.pfail)?,
            initial_reputation: self.rinit,
            latency: Duration::from_millis(self.latency_ms),
        })
    }
}
