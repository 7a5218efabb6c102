use std::env;
use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use common::NodeId;

pub const NODE_URLS_ENV: &str = "NODE_URLS";
pub const DEFAULT_NODE_URLS: [&str; 3] = [
    "http://localhost:50051",
    "http://localhost:50052",
    "http://localhost:50053",
];

#[derive(Parser, Debug, Clone)]
#[command(name = "coordinator")]
#[command(about = "Reparte sumas de vectores entre los nodos y mide su reputación")]
pub struct CoordinatorArgs {
    /// Número de sumas (rondas) a realizar
    #[arg(short = 'n', long = "rounds", default_value_t = 10)]
    pub rounds: u32,

    /// URL de un nodo; se puede repetir o separar por comas.
    /// Sin este flag se usa NODE_URLS y si no, localhost:50051-50053
    #[arg(long = "node", value_name = "URL", value_delimiter = ',')]
    pub nodes: Vec<String>,

    /// Archivo donde se escribe el reporte final
    #[arg(long, default_value = "output.txt")]
    pub output: PathBuf,
}

impl CoordinatorArgs {
    /// Endpoints con su id, asignados 1..N en orden. Una lista vacía es error.
    pub fn endpoints(&self) -> Result<Vec<(NodeId, String)>> {
        resolve_endpoints(&self.nodes, env::var(NODE_URLS_ENV).ok())
    }
}

fn resolve_endpoints(
    from_flags: &[String],
    from_env: Option<String>,
) -> Result<Vec<(NodeId, String)>> {
    let urls: Vec<String> = if !from_flags.is_empty() {
        from_flags.to_vec()
    } else if let Some(raw) = from_env.filter(|s| !s.trim().is_empty()) {
        raw.split(',').map(|s| s.trim().to_string()).collect()
    } else {
        DEFAULT_NODE_URLS.iter().map(|s| s.to_string()).collect()
    };

    let endpoints: Vec<(NodeId, String)> = urls
        .into_iter()
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .zip(1..)
        .map(|(url, id)| (id, url))
        .collect();

    if endpoints.is_empty() {
        bail!("no hay nodos configurados (revisa --node o {})", NODE_URLS_ENV);
    }
    Ok(endpoints)
}
