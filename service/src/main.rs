mod api;
mod store;


use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Context;
use axum::routing::{get, post};
use axum::Router;
use giftwheel_engine::{AdminSession, SegmentStore, SimulatedWheel, WheelEngine};
use giftwheel_types::api::ObserverEvent;
use giftwheel_types::LandedSegment;
use tokio::sync::{broadcast, mpsc};
use tracing::{info, warn};

use crate::store::JsonFileStore;

#[derive(Clone, Debug)]
struct ServiceConfig {
    host: String,
    port: u16,
    spin_ms: u64,
    webhook_token: Option<String>,
    segments_path: String,
}

impl ServiceConfig {
    fn from_env() -> Self {
        Self {
            host: std::env::var("GIFTWHEEL_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: read_u16("GIFTWHEEL_PORT", 3001),
            spin_ms: read_u64("GIFTWHEEL_SPIN_MS", 6_000),
            webhook_token: std::env::var("GIFTWHEEL_WEBHOOK_TOKEN").ok(),
            segments_path: std::env::var("GIFTWHEEL_SEGMENTS_PATH")
                .unwrap_or_else(|_| "segments.json".to_string()),
        }
    }
}

fn read_u16(key: &str, fallback: u16) -> u16 {
    std::env::var(key)
        .ok()
        .and_then(|raw| raw.parse::<u16>().ok())
        .unwrap_or(fallback)
}

fn read_u64(key: &str, fallback: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|raw| raw.parse::<u64>().ok())
        .unwrap_or(fallback)
}

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) engine: Arc<Mutex<WheelEngine<SimulatedWheel>>>,
    pub(crate) admin: Arc<tokio::sync::Mutex<AdminSession>>,
    pub(crate) store: Arc<JsonFileStore>,
    pub(crate) broadcaster: broadcast::Sender<ObserverEvent>,
    pub(crate) webhook_token: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = ServiceConfig::from_env();
    if config.webhook_token.is_none() {
        warn!("GIFTWHEEL_WEBHOOK_TOKEN not set, webhook posts are unauthenticated");
    }

    let store = Arc::new(JsonFileStore::new(&config.segments_path));
    let segments = store.load().await.context("load segment registry")?;

    let (completions_tx, completions_rx) = mpsc::unbounded_channel();
    let surface = SimulatedWheel::new(Duration::from_millis(config.spin_ms), completions_tx);
    let mut engine = WheelEngine::new(surface);
    engine.handle_segments_updated(segments);

    let mut admin = AdminSession::new();
    admin.reset_from(engine.segments());

    let engine = Arc::new(Mutex::new(engine));
    let (broadcaster, _) = broadcast::channel::<ObserverEvent>(1024);

    let state = AppState {
        engine: engine.clone(),
        admin: Arc::new(tokio::sync::Mutex::new(admin)),
        store,
        broadcaster: broadcaster.clone(),
        webhook_token: config.webhook_token.clone(),
    };

    spawn_completion_pump(engine, broadcaster, completions_rx);

    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("invalid listen addr")?;
    info!(%addr, spin_ms = config.spin_ms, "giftwheel service listening");

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;
    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/ws", get(api::ws_handler))
        .route("/webhook/tikfinity", post(api::webhook))
        .route("/api/test-spin", post(api::test_spin))
        .route(
            "/api/segments",
            get(api::get_segments).post(api::save_segments),
        )
        .route("/api/history", get(api::get_history))
        .route("/healthz", get(api::healthz))
        .with_state(state)
}

/// The single place animation callbacks re-enter the engine: one pump task,
/// one completion at a time, in the order the surface finished them.
fn spawn_completion_pump(
    engine: Arc<Mutex<WheelEngine<SimulatedWheel>>>,
    broadcaster: broadcast::Sender<ObserverEvent>,
    mut completions: mpsc::UnboundedReceiver<LandedSegment>,
) {
    tokio::spawn(async move {
        while let Some(landed) = completions.recv().await {
            let events = {
                let mut engine = engine.lock().unwrap();
                engine.handle_spin_complete(Some(landed))
            };
            for event in events {
                let _ = broadcaster.send(event);
            }
        }
    });
}
