use std::time::Duration;

use async_trait::async_trait;
use common::rpc::{HEALTH_PATH, STATS_PATH, SUM_PATH};
use common::{
    NodeId, NodeStats, StatsResponse, SumVectorsRequest, SumVectorsResponse, UnavailableResponse,
    Vector,
};
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tokio::time::timeout;
use tracing::warn;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("nodo {node_id} no disponible: {message}")]
    Unavailable { node_id: NodeId, message: String },

    #[error("sin respuesta tras {0:?}")]
    Timeout(Duration),

    #[error("status inesperado {0}")]
    Status(StatusCode),

    #[error("error de transporte: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Las dos operaciones que el coordinador usa de cada nodo.
#[async_trait]
pub trait NodeClient: Send + Sync {
    fn node_id(&self) -> NodeId;

    async fn sum_vectors(&self, vectors: &[Vector]) -> Result<SumVectorsResponse, RpcError>;

    async fn get_stats(&self) -> Result<NodeStats, RpcError>;
}

/// Cliente HTTP/JSON contra un worker.
pub struct HttpNodeClient {
    node_id: NodeId,
    base_url: String,
    http: Client,
}

impl HttpNodeClient {
    /// Crea el cliente y comprueba que el nodo responde en /health antes de
    /// `deadline`; un nodo que acepta la conexión y no contesta también falla.
    pub async fn connect(
        node_id: NodeId,
        base_url: &str,
        http: Client,
        deadline: Duration,
    ) -> Result<Self, RpcError> {
        let client = Self {
            node_id,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        };

        let health = client.http.get(client.url(HEALTH_PATH)).send();
        let resp = match timeout(deadline, health).await {
            Ok(res) => res?,
            Err(_) => return Err(RpcError::Timeout(deadline)),
        };
        if !resp.status().is_success() {
            return Err(RpcError::Status(resp.status()));
        }
        Ok(client)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl NodeClient for HttpNodeClient {
    fn node_id(&self) -> NodeId {
        self.node_id
    }

    async fn sum_vectors(&self, vectors: &[Vector]) -> Result<SumVectorsResponse, RpcError> {
        let resp = self
            .http
            .post(self.url(SUM_PATH))
            .json(&SumVectorsRequest {
                vectors: vectors.to_vec(),
            })
            .send()
            .await?;

        match resp.status() {
            StatusCode::SERVICE_UNAVAILABLE => {
                let body: UnavailableResponse = resp.json().await?;
                Err(RpcError::Unavailable {
                    node_id: body.node_id,
                    message: body.error,
                })
            }
            status if status.is_success() => Ok(resp.json().await?),
            status => Err(RpcError::Status(status)),
        }
    }

    async fn get_stats(&self) -> Result<NodeStats, RpcError> {
        let resp = self.http.get(self.url(STATS_PATH)).send().await?;
        if !resp.status().is_success() {
            return Err(RpcError::Status(resp.status()));
        }

        let body: StatsResponse = resp.json().await?;
        if body.node_id != self.node_id {
            warn!(
                "el nodo en {} se identifica como {} (esperaba {})",
                self.base_url, body.node_id, self.node_id
            );
        }
        Ok(body.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::net::TcpListener;
    use worker::decision::Probabilities;
    use worker::{build_router, NodeConfig, WorkerNode};

    const DEADLINE: Duration = Duration::from_secs(2);

    async fn spawn_worker(id: NodeId, pcrash: f64, pfail: f64) -> String {
        let config = NodeConfig {
            id,
            probabilities: Probabilities::new(pcrash, pfail).unwrap(),
            initial_reputation: 1000.0,
            latency: Duration::ZERO,
        };
        let app = build_router(Arc::new(WorkerNode::new(config)));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/", addr)
    }

    #[tokio::test]
    async fn connect_falla_si_no_hay_nodo() {
        // puerto libre: lo pedimos y lo soltamos
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = format!("http://{}", addr);
        let res = HttpNodeClient::connect(1, &url, Client::new(), DEADLINE).await;
        assert!(matches!(res, Err(RpcError::Transport(_))));
    }

    #[tokio::test]
    async fn connect_falla_si_el_nodo_acepta_y_no_contesta() {
        // acepta conexiones y las deja abiertas sin responder nada
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let http = Client::builder()
            .connect_timeout(Duration::from_secs(2))
            .build()
            .unwrap();
        let deadline = Duration::from_millis(300);

        let res = tokio::time::timeout(
            Duration::from_secs(5),
            HttpNodeClient::connect(1, &format!("http://{}", addr), http, deadline),
        )
        .await
        .expect("connect debe resolver antes del plazo externo");

        assert!(matches!(res, Err(RpcError::Timeout(d)) if d == deadline));
    }

    #[tokio::test]
    async fn suma_y_stats_por_http() {
        let url = spawn_worker(2, 0.0, 0.0).await;
        let client = HttpNodeClient::connect(2, &url, Client::new(), DEADLINE).await.unwrap();
        assert!(!client.base_url().ends_with('/'));

        let resp = client
            .sum_vectors(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]])
            .await
            .unwrap();
        assert_eq!(resp.result, vec![5.0, 7.0, 9.0]);
        assert_eq!(resp.node_id, 2);

        let stats = client.get_stats().await.unwrap();
        assert_eq!(stats.correct_count, 1);
        assert_eq!(stats.total_operations(), 1);
    }

    #[tokio::test]
    async fn caida_llega_como_unavailable() {
        let url = spawn_worker(3, 1.0, 0.0).await;
        let client = HttpNodeClient::connect(3, &url, Client::new(), DEADLINE).await.unwrap();

        let err = client.sum_vectors(&[vec![1.0]]).await.unwrap_err();
        assert!(matches!(err, RpcError::Unavailable { node_id: 3, .. }));

        let stats = client.get_stats().await.unwrap();
        assert_eq!(stats.crash_count, 1);
        assert_eq!(stats.reputation, 700.0);
    }
}
