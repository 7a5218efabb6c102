use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type NodeId = u32;

/// Foto de la reputación y contadores de un nodo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeStats {
    pub reputation: f64,
    pub correct_count: u64,
    pub incorrect_count: u64,
    pub crash_count: u64,
}

impl NodeStats {
    pub fn new(initial_reputation: f64) -> Self {
        Self {
            reputation: initial_reputation,
            correct_count: 0,
            incorrect_count: 0,
            crash_count: 0,
        }
    }

    /// Tareas que el nodo ha procesado (correctas + incorrectas + caídas).
    pub fn total_operations(&self) -> u64 {
        self.correct_count + self.incorrect_count + self.crash_count
    }
}

/// Estadísticas finales por nodo, tomadas una vez al terminar la corrida.
pub type FinalReport = BTreeMap<NodeId, NodeStats>;
