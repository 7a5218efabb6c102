use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use common::rpc::{STATS_PATH, SUM_PATH};
use common::{
    sum_vectors, vectors_match, StatsResponse, SumVectorsRequest, SumVectorsResponse,
    UnavailableResponse, Vector,
};
use reqwest::{Client, StatusCode};
use std::env;

/// - Con NODE_URL definida se usa esa
/// - Local: default http://localhost:50051
fn default_node_url() -> String {
    env::var("NODE_URL").unwrap_or_else(|_| "http://localhost:50051".to_string())
}

#[derive(Parser)]
#[command(name = "client")]
#[command(about = "CLI simple para hablar con un nodo")]
struct Cli {
    /// URL del nodo
    #[arg(long, global = true)]
    node: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Muestra reputación y contadores del nodo
    Stats,

    /// Envía una suma al nodo y la verifica localmente
    Sum {
        /// Vectores como números separados por comas, ej: 1,2,3 4,5,6
        #[arg(value_name = "VECTOR", required = true)]
        vectors: Vec<String>,
    },
}

fn parse_vector(raw: &str) -> Result<Vector> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<f32>()
                .with_context(|| format!("valor inválido '{}' en '{}'", s, raw))
        })
        .collect()
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let client = Client::new();
    let base_url = cli
        .node
        .unwrap_or_else(default_node_url)
        .trim_end_matches('/')
        .to_string();

    match cli.command {
        Commands::Stats => {
            let url = format!("{}{}", base_url, STATS_PATH);
            let resp = client.get(&url).send().await?;
            if !resp.status().is_success() {
                bail!("el nodo respondió status {}", resp.status());
            }

            let body: StatsResponse = resp.json().await?;
            let s = body.stats;
            println!("Nodo {}:", body.node_id);
            println!("  reputación   : {:.2}", s.reputation);
            println!("  correctas    : {}", s.correct_count);
            println!("  incorrectas  : {}", s.incorrect_count);
            println!("  caídas       : {}", s.crash_count);
            println!("  operaciones  : {}", s.total_operations());
        }

        Commands::Sum { vectors } => {
            let vectors = vectors
                .iter()
                .map(|v| parse_vector(v))
                .collect::<Result<Vec<Vector>>>()?;
            let reference = sum_vectors(&vectors);

            let url = format!("{}{}", base_url, SUM_PATH);
            let resp = client
                .post(&url)
                .json(&SumVectorsRequest { vectors })
                .send()
                .await?;

            match resp.status() {
                StatusCode::SERVICE_UNAVAILABLE => {
                    let body: UnavailableResponse = resp.json().await?;
                    println!("Nodo {} caído: {}", body.node_id, body.error);
                }
                status if status.is_success() => {
                    let body: SumVectorsResponse = resp.json().await?;
                    let verdict = if vectors_match(&reference, &body.result) {
                        "CORRECTA"
                    } else {
                        "INCORRECTA"
                    };
                    println!("Nodo {}:", body.node_id);
                    println!("  resultado  : {:?}", body.result);
                    println!("  referencia : {:?}", reference);
                    println!("  respuesta  : {}", verdict);
                }
                status => bail!("el nodo respondió status {}", status),
            }
        }
    }

    Ok(())
}
