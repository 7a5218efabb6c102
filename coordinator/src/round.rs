use std::fmt;
use std::ops::RangeInclusive;
use std::time::Duration;

use common::{sum_vectors, vectors_match, NodeId, SumVectorsResponse, Vector};
use rand::Rng;

use crate::node_client::RpcError;

pub const VECTOR_LEN: RangeInclusive<usize> = 1..=5;
pub const VECTOR_COUNT: RangeInclusive<usize> = 2..=4;
pub const MAX_VALUE: f32 = 100.0;

/// Lote de vectores de una ronda. No cambia una vez creado.
#[derive(Debug, Clone)]
pub struct TaskBatch {
    vectors: Vec<Vector>,
}

impl TaskBatch {
    pub fn new(vectors: Vec<Vector>) -> Self {
        Self { vectors }
    }

    /// Lote aleatorio: 2-4 vectores del mismo largo (1-5), valores en [0, 100).
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let len = rng.random_range(VECTOR_LEN);
        let count = rng.random_range(VECTOR_COUNT);

        let vectors = (0..count)
            .map(|_| (0..len).map(|_| rng.random::<f32>() * MAX_VALUE).collect())
            .collect();
        Self::new(vectors)
    }

    pub fn vectors(&self) -> &[Vector] {
        &self.vectors
    }

    pub fn vector_count(&self) -> usize {
        self.vectors.len()
    }

    pub fn vector_len(&self) -> usize {
        self.vectors.first().map_or(0, Vec::len)
    }

    /// Suma de referencia contra la que se verifican los nodos.
    pub fn reference(&self) -> Vector {
        sum_vectors(&self.vectors)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Crashed,
    Correct,
    Incorrect,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Outcome::Crashed => "CAÍDA",
            Outcome::Correct => "CORRECTA",
            Outcome::Incorrect => "INCORRECTA",
        };
        f.write_str(s)
    }
}

/// Resultado de un nodo en una ronda.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundOutcome {
    pub node_id: NodeId,
    pub outcome: Outcome,
    pub elapsed: Duration,
}

/// Cualquier error (timeout incluido) cuenta como caída; sin comparar nada.
pub fn classify(reference: &[f32], response: &Result<SumVectorsResponse, RpcError>) -> Outcome {
    match response {
        Err(_) => Outcome::Crashed,
        Ok(resp) if vectors_match(reference, &resp.result) => Outcome::Correct,
        Ok(_) => Outcome::Incorrect,
    }
}
