pub mod config;
pub mod decision;
pub mod handlers;
pub mod node;

pub use config::WorkerArgs;
pub use handlers::build_router;
pub use node::{NodeConfig, NodeUnavailable, WorkerNode};
