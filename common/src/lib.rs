pub mod rpc;
pub mod stats;
pub mod vector;

pub use rpc::{StatsResponse, SumVectorsRequest, SumVectorsResponse, UnavailableResponse};
pub use stats::{FinalReport, NodeId, NodeStats};
pub use vector::{sum_vectors, vectors_match, Vector, TOLERANCE};
