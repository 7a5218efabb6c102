use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use common::rpc::{HEALTH_PATH, STATS_PATH, SUM_PATH};
use common::{StatsResponse, SumVectorsRequest, UnavailableResponse};
use tracing::debug;

use crate::node::WorkerNode;

pub fn build_router(node: Arc<WorkerNode>) -> Router {
    Router::new()
        .route(HEALTH_PATH, get(health))
        .route(SUM_PATH, post(sum_vectors))
        .route(STATS_PATH, get(get_stats))
        .with_state(node)
}

/* ---------------- handlers HTTP ---------------- */

async fn health() -> &'static str {
    "ok"
}

// Una caída simulada se responde con 503 para que el coordinador la cuente como tal
async fn sum_vectors(
    State(node): State<Arc<WorkerNode>>,
    Json(req): Json<SumVectorsRequest>,
) -> Response {
    debug!("nodo {}: recibí {} vectores", node.id(), req.vectors.len());

    match node.sum_vectors(req.vectors).await {
        Ok(resp) => Json(resp).into_response(),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(UnavailableResponse {
                node_id: e.node_id,
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

async fn get_stats(State(node): State<Arc<WorkerNode>>) -> Json<StatsResponse> {
    Json(StatsResponse {
        node_id: node.id(),
        stats: node.stats().await,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::Probabilities;
    use crate::node::NodeConfig;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use common::SumVectorsResponse;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Duration;
    use tower::ServiceExt;

    fn router(pcrash: f64, pfail: f64) -> Router {
        let config = NodeConfig {
            id: 3,
            probabilities: Probabilities::new(pcrash, pfail).unwrap(),
            initial_reputation: 1000.0,
            latency: Duration::ZERO,
        };
        build_router(Arc::new(WorkerNode::with_rng(config, StdRng::seed_from_u64(1))))
    }

    fn sum_request(body: &str) -> Request<Body> {
        Request::post(SUM_PATH)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json<T: serde::de::DeserializeOwned>(resp: Response) -> T {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_responde_ok() {
        let resp = router(0.0, 0.0)
            .oneshot(Request::get(HEALTH_PATH).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn sum_devuelve_resultado_con_id_del_nodo() {
        let resp = router(0.0, 0.0)
            .oneshot(sum_request(r#"{"vectors": [[1, 2, 3], [4, 5, 6]]}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body: SumVectorsResponse = body_json(resp).await;
        assert_eq!(body.result, vec![5.0, 7.0, 9.0]);
        assert_eq!(body.node_id, 3);
    }

    #[tokio::test]
    async fn caida_se_responde_con_503() {
        let resp = router(1.0, 0.0)
            .oneshot(sum_request(r#"{"vectors": [[1]]}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body: UnavailableResponse = body_json(resp).await;
        assert_eq!(body.node_id, 3);
    }

    #[tokio::test]
    async fn stats_refleja_las_tareas_atendidas() {
        let app = router(1.0, 0.0);

        for _ in 0..2 {
            let _ = app
                .clone()
                .oneshot(sum_request(r#"{"vectors": []}"#))
                .await
                .unwrap();
        }

        let resp = app
            .oneshot(Request::get(STATS_PATH).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body: StatsResponse = body_json(resp).await;
        assert_eq!(body.node_id, 3);
        assert_eq!(body.stats.crash_count, 2);
        assert_eq!(body.stats.reputation, 400.0);
    }
}
