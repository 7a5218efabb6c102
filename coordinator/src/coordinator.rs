use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use common::{FinalReport, NodeId};
use futures::future::join_all;
use rand::Rng;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info, warn};

use crate::node_client::{NodeClient, RpcError};
use crate::round::{classify, Outcome, RoundOutcome, TaskBatch};

pub const CALL_TIMEOUT: Duration = Duration::from_secs(2);
pub const ROUND_PAUSE: Duration = Duration::from_millis(100);

/// Lo que el coordinador vio de cada nodo durante la corrida.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeTally {
    pub correct: u64,
    pub incorrect: u64,
    pub crashed: u64,
}

impl NodeTally {
    pub fn total(&self) -> u64 {
        self.correct + self.incorrect + self.crashed
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunLog {
    pub rounds: u32,
    pub per_node: BTreeMap<NodeId, NodeTally>,
}

impl RunLog {
    fn record(&mut self, outcomes: &[RoundOutcome]) {
        self.rounds += 1;
        for o in outcomes {
            let tally = self.per_node.entry(o.node_id).or_default();
            match o.outcome {
                Outcome::Correct => tally.correct += 1,
                Outcome::Incorrect => tally.incorrect += 1,
                Outcome::Crashed => tally.crashed += 1,
            }
        }
    }
}

pub struct Coordinator {
    nodes: Vec<Arc<dyn NodeClient>>,
    call_timeout: Duration,
    round_pause: Duration,
}

impl Coordinator {
    pub fn new(nodes: Vec<Arc<dyn NodeClient>>) -> Self {
        Self {
            nodes,
            call_timeout: CALL_TIMEOUT,
            round_pause: ROUND_PAUSE,
        }
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.iter().map(|n| n.node_id()).collect()
    }

    /// Ejecuta `rounds` rondas en orden estricto: una ronda no empieza hasta
    /// que todas las llamadas de la anterior terminaron o vencieron.
    pub async fn run<R: Rng + ?Sized>(&self, rounds: u32, rng: &mut R) -> RunLog {
        let mut log = RunLog::default();

        for round in 1..=rounds {
            let batch = TaskBatch::random(rng);
            info!(
                "=== suma {}: {} vectores de tamaño {} ===",
                round,
                batch.vector_count(),
                batch.vector_len()
            );
            debug!("vectores: {:?}", batch.vectors());

            let outcomes = self.run_round(&batch).await;
            log.record(&outcomes);

            if round < rounds {
                sleep(self.round_pause).await;
            }
        }

        log
    }

    /// Reparte el lote a todos los nodos a la vez y espera a que cada llamada
    /// termine o venza su plazo. Devuelve un resultado por nodo, en el orden
    /// en que están configurados.
    pub async fn run_round(&self, batch: &TaskBatch) -> Vec<RoundOutcome> {
        let reference = batch.reference();

        let calls = self
            .nodes
            .iter()
            .map(|node| self.dispatch(node.as_ref(), batch, &reference));

        join_all(calls).await
    }

    async fn dispatch(
        &self,
        node: &dyn NodeClient,
        batch: &TaskBatch,
        reference: &[f32],
    ) -> RoundOutcome {
        let node_id = node.node_id();
        let started = Instant::now();

        // si vence el plazo la llamada se abandona; el nodo puede terminarla igual
        let response = match timeout(self.call_timeout, node.sum_vectors(batch.vectors())).await {
            Ok(res) => res,
            Err(_) => Err(RpcError::Timeout(self.call_timeout)),
        };
        let result = RoundOutcome {
            node_id,
            outcome: classify(reference, &response),
            elapsed: started.elapsed(),
        };

        match &response {
            Err(e) => warn!(
                "nodo {}: ERROR/CAÍDA - {} ({:?})",
                result.node_id, e, result.elapsed
            ),
            Ok(_) => info!(
                "nodo {}: respuesta {} ({:?})",
                result.node_id, result.outcome, result.elapsed
            ),
        }

        result
    }

    /// Pide las estadísticas finales a cada nodo. El que no responda queda
    /// fuera del reporte.
    pub async fn collect_final_report(&self) -> FinalReport {
        let mut report = FinalReport::new();

        for node in &self.nodes {
            let node_id = node.node_id();
            let res = match timeout(self.call_timeout, node.get_stats()).await {
                Ok(res) => res,
                Err(_) => Err(RpcError::Timeout(self.call_timeout)),
            };

            match res {
                Ok(stats) => {
                    info!(
                        "nodo {} - rep: {:.2}, correctas: {}, incorrectas: {}, caídas: {}",
                        node_id,
                        stats.reputation,
                        stats.correct_count,
                        stats.incorrect_count,
                        stats.crash_count
                    );
                    report.insert(node_id, stats);
                }
                Err(e) => {
                    warn!("error obteniendo stats del nodo {}: {}", node_id, e);
                }
            }
        }

        report
    }
}
