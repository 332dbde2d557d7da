// Loopback HTTP surface: lets product listings in another process read the
// active selection and filter product lists through the matcher.

use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::net::TcpListener;
use tracing::{debug, info};

use crate::api::fitment_api::filter_products_with_stats;
use crate::cascade::controller::SelectionController;
use crate::cascade::selection::VehicleSelection;
use crate::fitment::matcher::FitmentMatcher;
use crate::fitment::stats::FilterStats;

#[derive(Clone)]
pub struct FitmentState {
    pub controller: SelectionController,
    pub matcher: Arc<FitmentMatcher>,
    pub stats: Arc<FilterStats>,
}

impl FitmentState {
    pub fn new(controller: SelectionController, matcher: FitmentMatcher) -> Self {
        Self {
            controller,
            matcher: Arc::new(matcher),
            stats: Arc::new(FilterStats::new()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FilterRequest {
    pub products: Vec<Value>,
    /// Overrides the controller's current selection when present.
    #[serde(default)]
    pub selection: Option<VehicleSelection>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FilterResponse {
    pub total: usize,
    pub matched: usize,
    pub products: Vec<Value>,
}

pub struct FitmentServer {
    port: u16,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl FitmentServer {
    /// Start the server on a random loopback port.
    pub async fn start(state: FitmentState) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let port = listener.local_addr()?.port();

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let app = Router::new()
            .route("/selection", get(selection_handler))
            .route("/products/filter", post(filter_handler))
            .route("/stats", get(stats_handler))
            .with_state(state);

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .ok();
        });

        info!("fitment server listening on 127.0.0.1:{}", port);
        Ok(Self {
            port,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{}", self.port, path)
    }

    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// GET /selection: the controller's current selection.
async fn selection_handler(State(state): State<FitmentState>) -> Json<VehicleSelection> {
    Json(state.controller.get_state())
}

/// POST /products/filter: products that fit the given or current selection.
async fn filter_handler(
    State(state): State<FitmentState>,
    Json(req): Json<FilterRequest>,
) -> Response {
    let selection = req
        .selection
        .map(VehicleSelection::normalized)
        .unwrap_or_else(|| state.controller.get_state());
    let total = req.products.len();
    let products = filter_products_with_stats(&state.matcher, &req.products, &selection, &state.stats);
    debug!(
        "filter request selection={} total={} matched={}",
        selection.to_json(),
        total,
        products.len()
    );
    (
        StatusCode::OK,
        Json(FilterResponse {
            total,
            matched: products.len(),
            products,
        }),
    )
        .into_response()
}

/// GET /stats: filter statistics since start.
async fn stats_handler(State(state): State<FitmentState>) -> Response {
    Json(state.stats.snapshot()).into_response()
}
