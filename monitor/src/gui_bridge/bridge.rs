use crate::gui_bridge::model::VisualizationModel;
use anyhow::Context;
use fieldcore::ingest::SourceMessage;
use fieldcore::telemetry::MetricsRecorder;
use fieldcore::{FieldError, FieldResult, FieldSnapshot, SnapshotSink};
use log::{error, info, warn};
use serde::Deserialize;
use serde_json::json;
use std::{
    net::SocketAddr,
    sync::{Arc, RwLock},
    thread,
};
use tokio::runtime::Builder;
use tokio::sync::mpsc;
use warp::{http::StatusCode, Filter};

type SharedModel = Arc<RwLock<Option<VisualizationModel>>>;

#[derive(Debug)]
struct WarpError;

impl warp::reject::Reject for WarpError {}

#[derive(Debug, Deserialize)]
struct IngestRequest {
    records: Vec<String>,
}

fn routes(
    state: SharedModel,
    metrics: Arc<MetricsRecorder>,
    ingest: mpsc::Sender<SourceMessage>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let state_filter = warp::any().map(move || state.clone());
    let metrics_filter = warp::any().map(move || metrics.clone());
    let ingest_filter = warp::any().map(move || ingest.clone());

    let snapshot_route = warp::path("snapshot")
        .and(warp::get())
        .and(state_filter)
        .map(|state: SharedModel| {
            let latest = state.read().map(|guard| guard.clone()).unwrap_or(None);
            warp::reply::json(&latest)
        });

    let metrics_route = warp::path("metrics")
        .and(warp::get())
        .and(metrics_filter)
        .map(|metrics: Arc<MetricsRecorder>| warp::reply::json(&metrics.snapshot()));

    let ingest_route = warp::path("ingest")
        .and(warp::post())
        .and(warp::body::content_length_limit(64 * 1024))
        .and(warp::body::json())
        .and(ingest_filter)
        .and_then(
            |request: IngestRequest, ingest: mpsc::Sender<SourceMessage>| async move {
                let accepted = request.records.len();
                for record in request.records {
                    if ingest.send(SourceMessage::Record(record)).await.is_err() {
                        warn!("ingest rejected: pipeline input is closed");
                        return Err(warp::reject::custom(WarpError));
                    }
                }
                Ok::<_, warp::Rejection>(warp::reply::with_status(
                    warp::reply::json(&json!({ "status": "ok", "accepted": accepted })),
                    StatusCode::OK,
                ))
            },
        );

    snapshot_route.or(metrics_route).or(ingest_route)
}

/// Hosts the display endpoint and forwards posted records into the pipeline input.
pub struct GuiBridge {
    state: SharedModel,
}

impl GuiBridge {
    pub fn new(
        address: SocketAddr,
        metrics: Arc<MetricsRecorder>,
        ingest: mpsc::Sender<SourceMessage>,
    ) -> anyhow::Result<Self> {
        let state: SharedModel = Arc::new(RwLock::new(None));
        let api = routes(state.clone(), metrics, ingest);

        thread::Builder::new()
            .name("gui-bridge".into())
            .spawn(move || {
                let runtime = match Builder::new_current_thread().enable_all().build() {
                    Ok(runtime) => runtime,
                    Err(err) => {
                        error!("failed to build bridge runtime: {}", err);
                        return;
                    }
                };
                runtime.block_on(async move {
                    match warp::serve(api).try_bind_ephemeral(address) {
                        Ok((bound, server)) => {
                            info!("[GUI] serving on http://{}", bound);
                            server.await;
                        }
                        Err(err) => error!("failed to bind GUI bridge on {}: {}", address, err),
                    }
                });
            })
            .context("spawning GUI bridge thread")?;

        Ok(Self { state })
    }

    /// Sink that replaces the served model with every emitted snapshot.
    pub fn sink(&self) -> BridgeSink {
        BridgeSink::new(self.state.clone())
    }

    pub fn publish_status(&self, message: &str) {
        info!("[GUI] {}", message);
    }
}

pub struct BridgeSink {
    state: SharedModel,
}

impl BridgeSink {
    fn new(state: SharedModel) -> Self {
        Self { state }
    }
}

impl SnapshotSink for BridgeSink {
    fn emit(&mut self, snapshot: FieldSnapshot) -> FieldResult<()> {
        let model = VisualizationModel::from(&snapshot);
        let mut guard = self
            .state
            .write()
            .map_err(|_| FieldError::Sink("bridge state lock poisoned".into()))?;
        *guard = Some(model);
        Ok(())
    }
}
