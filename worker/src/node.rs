use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;

use common::{sum_vectors, NodeId, NodeStats, SumVectorsResponse, Vector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::decision::{decide, Decision, Probabilities};

pub const CRASH_PENALTY: f64 = 300.0;
pub const INCORRECT_PENALTY: RangeInclusive<u32> = 150..=250;
pub const CORRECT_REWARD: RangeInclusive<u32> = 100..=180;
/// Una respuesta corrupta mueve una posición en [-MAX_CORRUPTION, MAX_CORRUPTION).
pub const MAX_CORRUPTION: f32 = 5.0;

#[derive(Debug, Error)]
#[error("nodo {node_id} no disponible")]
pub struct NodeUnavailable {
    pub node_id: NodeId,
}

#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub id: NodeId,
    pub probabilities: Probabilities,
    pub initial_reputation: f64,
    /// Tiempo de procesamiento simulado, dentro del lock de escritura.
    pub latency: Duration,
}

struct NodeState {
    stats: NodeStats,
    rng: StdRng,
}

/// Un nodo de cómputo con su reputación.
///
/// Todo el estado vive detrás de un único `RwLock`: cada tarea toma el lock
/// de escritura de principio a fin y las consultas de estadísticas sólo el
/// de lectura, así nunca se ve un estado a medio actualizar.
pub struct WorkerNode {
    id: NodeId,
    probabilities: Probabilities,
    latency: Duration,
    state: RwLock<NodeState>,
}

impl WorkerNode {
    pub fn new(config: NodeConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    pub fn with_rng(config: NodeConfig, rng: StdRng) -> Self {
        Self {
            id: config.id,
            probabilities: config.probabilities,
            latency: config.latency,
            state: RwLock::new(NodeState {
                stats: NodeStats::new(config.initial_reputation),
                rng,
            }),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Atiende una tarea de suma.
    ///
    /// El procesamiento corre en su propia tarea de tokio: si quien llama deja
    /// de esperar (timeout, conexión cerrada) el nodo termina igual y deja su
    /// contabilidad al día.
    pub async fn sum_vectors(
        self: &Arc<Self>,
        vectors: Vec<Vector>,
    ) -> Result<SumVectorsResponse, NodeUnavailable> {
        let node = Arc::clone(self);
        let handle = tokio::spawn(async move { node.process(&vectors).await });

        match handle.await {
            Ok(res) => res,
            Err(e) => {
                warn!("nodo {}: la tarea de suma terminó mal: {:?}", self.id, e);
                Err(NodeUnavailable { node_id: self.id })
            }
        }
    }

    async fn process(&self, vectors: &[Vector]) -> Result<SumVectorsResponse, NodeUnavailable> {
        let mut guard = self.state.write().await;

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let NodeState { stats, rng } = &mut *guard;

        let crash_draw: f64 = rng.random();
        let incorrect_draw: f64 = rng.random();

        match decide(crash_draw, incorrect_draw, &self.probabilities) {
            Decision::Crash => {
                stats.crash_count += 1;
                stats.reputation -= CRASH_PENALTY;
                warn!(
                    "nodo {}: CAÍDA - nueva reputación: {:.2}",
                    self.id, stats.reputation
                );
                Err(NodeUnavailable { node_id: self.id })
            }
            Decision::Incorrect => {
                let mut result = sum_vectors(vectors);
                corrupt(&mut result, rng);

                let penalty = f64::from(rng.random_range(INCORRECT_PENALTY));
                stats.incorrect_count += 1;
                stats.reputation -= penalty;
                info!(
                    "nodo {}: respuesta INCORRECTA - penalización: {:.2} - nueva reputación: {:.2}",
                    self.id, penalty, stats.reputation
                );
                Ok(SumVectorsResponse {
                    result,
                    node_id: self.id,
                })
            }
            Decision::Correct => {
                let result = sum_vectors(vectors);

                let reward = f64::from(rng.random_range(CORRECT_REWARD));
                stats.correct_count += 1;
                stats.reputation += reward;
                info!(
                    "nodo {}: respuesta CORRECTA - recompensa: {:.2} - nueva reputación: {:.2}",
                    self.id, reward, stats.reputation
                );
                Ok(SumVectorsResponse {
                    result,
                    node_id: self.id,
                })
            }
        }
    }

    pub async fn stats(&self) -> NodeStats {
        self.state.read().await.stats.clone()
    }
}

/// Altera una única posición elegida al azar. Un resultado vacío queda igual.
fn corrupt(result: &mut [f32], rng: &mut StdRng) {
    if result.is_empty() {
        return;
    }
    let idx = rng.random_range(0..result.len());
    result[idx] += rng.random::<f32>() * 2.0 * MAX_CORRUPTION - MAX_CORRUPTION;
}
