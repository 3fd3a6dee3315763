use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State as AxumState;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures_util::{SinkExt, StreamExt};
use giftwheel_types::api::{ErrorBody, ObserverEvent, SpinAccepted, TestSpinRequest, WebhookPayload};
use giftwheel_types::{PartialSegment, Segment, SpinRequest};
use rand::Rng;
use tokio::sync::{broadcast, mpsc};
use tracing::{info, warn};

use crate::AppState;

const TOKEN_HEADER: &str = "x-tikfinity-token";

pub(crate) async fn healthz() -> &'static str {
    "ok"
}

pub(crate) async fn ws_handler(
    ws: WebSocketUpgrade,
    AxumState(state): AxumState<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
    let mut events = state.broadcaster.subscribe();

    // Snapshot first so a fresh observer can draw the wheel immediately.
    {
        let engine = state.engine.lock().unwrap();
        enqueue_event(
            &tx,
            &ObserverEvent::Segments {
                segments: engine.segments().to_vec(),
            },
        );
        enqueue_event(&tx, &engine.status_event());
    }

    let write_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    let broadcast_task = {
        let tx = tx.clone();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        if !enqueue_event(&tx, &event) {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "observer lagged behind broadcast");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    };

    while let Some(Ok(message)) = receiver.next().await {
        match message {
            Message::Close(_) => break,
            // Observers only listen; anything else they send is ignored.
            _ => {}
        }
    }

    write_task.abort();
    broadcast_task.abort();
}

fn enqueue_event(tx: &mpsc::UnboundedSender<Message>, event: &ObserverEvent) -> bool {
    match serde_json::to_string(event) {
        Ok(payload) => tx.send(Message::Text(payload)).is_ok(),
        Err(err) => {
            warn!(?err, "failed to encode observer event");
            true
        }
    }
}

pub(crate) async fn webhook(
    AxumState(state): AxumState<AppState>,
    headers: HeaderMap,
    Json(payload): Json<WebhookPayload>,
) -> Response {
    if !token_matches(
        state.webhook_token.as_deref(),
        &headers,
        payload.secret.as_deref(),
    ) {
        warn!("webhook rejected: bad token");
        return (
            StatusCode::UNAUTHORIZED,
            Json(ErrorBody::new("invalid token")),
        )
            .into_response();
    }
    enqueue_spin(&state, &payload, "gift")
}

pub(crate) async fn test_spin(
    AxumState(state): AxumState<AppState>,
    Json(body): Json<TestSpinRequest>,
) -> Response {
    info!(sku = ?body.sku, "test spin requested");
    let payload = WebhookPayload {
        value1: Some("operator".to_string()),
        value2: Some("Giro de prueba".to_string()),
        value3: body.sku,
        secret: None,
    };
    enqueue_spin(&state, &payload, "test")
}

fn enqueue_spin(state: &AppState, payload: &WebhookPayload, kind: &str) -> Response {
    let (events, queued) = {
        let mut engine = state.engine.lock().unwrap();
        let request =
            spin_request_from_webhook(payload, kind, engine.segments(), &mut rand::thread_rng());
        let events = engine.handle_spin_request(request);
        (events, engine.queued())
    };
    publish(&state.broadcaster, events);
    Json(SpinAccepted { ok: true, queued }).into_response()
}

pub(crate) async fn get_segments(AxumState(state): AxumState<AppState>) -> Json<Vec<Segment>> {
    let engine = state.engine.lock().unwrap();
    Json(engine.segments().to_vec())
}

pub(crate) async fn get_history(
    AxumState(state): AxumState<AppState>,
) -> Json<Vec<giftwheel_types::ResolvedOutcome>> {
    let engine = state.engine.lock().unwrap();
    Json(engine.history().outcomes().to_vec())
}

pub(crate) async fn save_segments(
    AxumState(state): AxumState<AppState>,
    Json(edited): Json<Vec<Segment>>,
) -> Response {
    let accepted = {
        let mut admin = state.admin.lock().await;
        admin.reset_from(&edited);
        match admin.commit(state.store.as_ref()).await {
            Ok(accepted) => accepted,
            Err(err) => {
                warn!(%err, "segment commit failed, staged edits kept");
                return (StatusCode::BAD_GATEWAY, Json(ErrorBody::new(err.to_string())))
                    .into_response();
            }
        }
    };
    let events = {
        let mut engine = state.engine.lock().unwrap();
        engine.handle_segments_updated(accepted.clone())
    };
    publish(&state.broadcaster, events);
    Json(accepted).into_response()
}

fn publish(broadcaster: &broadcast::Sender<ObserverEvent>, events: Vec<ObserverEvent>) {
    for event in events {
        let _ = broadcaster.send(event);
    }
}

/// With no token configured every post is accepted (local setups); once one
/// is set it must match the header or the `secret` body field.
fn token_matches(expected: Option<&str>, headers: &HeaderMap, body_secret: Option<&str>) -> bool {
    let Some(expected) = expected else {
        return true;
    };
    let provided = headers
        .get(TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .or(body_secret);
    provided == Some(expected)
}

/// Translates the relay's positional fields into a spin request: `value1` is
/// the username, `value2` free text, `value3` the gift sku. A null sku means
/// the relay asks the publisher side to pick a segment for the viewer; an
/// unknown sku leaves the target undeclared and the wheel falls back to its
/// first slot.
fn spin_request_from_webhook(
    payload: &WebhookPayload,
    kind: &str,
    segments: &[Segment],
    rng: &mut impl Rng,
) -> SpinRequest {
    let sku = payload
        .value3
        .clone()
        .filter(|value| !value.trim().is_empty());
    let target = match sku.as_deref() {
        Some(sku) => find_segment_for_sku(segments, sku),
        None if !segments.is_empty() => Some(rng.gen_range(0..segments.len())),
        None => None,
    };
    SpinRequest {
        kind: kind.to_string(),
        username: payload
            .value1
            .clone()
            .unwrap_or_else(|| "Anónimo".to_string()),
        text: payload.value2.clone().unwrap_or_default(),
        sku,
        segment_index: target.map(|index| index as u32),
        segment: target
            .and_then(|index| segments.get(index))
            .map(|segment| PartialSegment {
                id: Some(segment.id.clone()),
                text: Some(segment.text.clone()),
                color: Some(segment.color.clone()),
            }),
    }
}

fn find_segment_for_sku(segments: &[Segment], sku: &str) -> Option<usize> {
    segments.iter().position(|segment| {
        segment.id.eq_ignore_ascii_case(sku) || segment.text.eq_ignore_ascii_case(sku)
    })
}
