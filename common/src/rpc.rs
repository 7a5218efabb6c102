use serde::{Deserialize, Serialize};

use crate::stats::{NodeId, NodeStats};
use crate::vector::Vector;

/* --------- Rutas HTTP expuestas por cada worker --------- */

pub const HEALTH_PATH: &str = "/health";
pub const SUM_PATH: &str = "/api/v1/sum";
pub const STATS_PATH: &str = "/api/v1/stats";

/* --------- Mensajes --------- */

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SumVectorsRequest {
    pub vectors: Vec<Vector>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SumVectorsResponse {
    pub result: Vector,
    pub node_id: NodeId,
}

/// Cuerpo de la respuesta 503 cuando el nodo simula una caída.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnavailableResponse {
    pub node_id: NodeId,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsResponse {
    pub node_id: NodeId,
    #[serde(flatten)]
    pub stats: NodeStats,
}
