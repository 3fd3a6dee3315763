//! Wire messages for the HTTP and WebSocket surface.

use serde::{Deserialize, Serialize};

use crate::{ResolvedOutcome, Segment};

/// Events pushed to observer WebSocket clients.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub enum ObserverEvent {
    /// Full replacement of the segment list. No delta form exists.
    #[serde(rename = "segments")]
    Segments { segments: Vec<Segment> },
    /// Current playback flag, segment count and queue depth.
    #[serde(rename = "status")]
    Status {
        spinning: bool,
        segments: usize,
        queued: usize,
    },
    /// A spin finished and resolved to this winner.
    #[serde(rename = "winner")]
    Winner { winner: ResolvedOutcome },
}

/// Inbound webhook payload from the TikFinity relay.
///
/// Positional fields: `value1` is the username, `value2` free text, `value3`
/// the gift sku (null means the publisher picks a segment for the viewer).
/// The shared secret travels in the `x-tikfinity-token` header or the
/// `secret` body field.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub value1: Option<String>,
    #[serde(default)]
    pub value2: Option<String>,
    #[serde(default)]
    pub value3: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
}

/// Operator-initiated trigger for exercising the pipeline by hand.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TestSpinRequest {
    #[serde(default)]
    pub sku: Option<String>,
}

/// Acknowledgement for webhook and test-spin posts.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SpinAccepted {
    pub ok: bool,
    pub queued: usize,
}

/// Error body returned on rejected requests.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
