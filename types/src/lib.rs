pub mod api;


use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How many resolved outcomes the rolling history keeps.
pub const HISTORY_CAPACITY: usize = 5;

/// Fill color used when neither the wheel nor the request names one.
pub const FALLBACK_COLOR: &str = "#cccccc";

/// One slice of the prize wheel.
///
/// Ids are unique within a registry snapshot and stable across renders.
/// Order is significant: the position in the list is the wheel slot the
/// rendering surface draws it in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub id: String,
    pub text: String,
    pub color: String,
}

/// Segment metadata as it arrives from the untyped transport: any subset of
/// fields may be present.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialSegment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// An instruction to make the wheel land on a segment.
///
/// Created by the transport, immutable once enqueued, consumed exactly once.
/// `segment_index` is zero-based; when absent the wheel targets the first
/// segment. Carries no timestamp: the interesting instant is when the wheel
/// stops, not when the gift arrived.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpinRequest {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(
        rename = "segmentIndex",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub segment_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment: Option<PartialSegment>,
}

/// A completed spin: every field finalized, no partials left.
///
/// `timestamp` is the completion instant. Because requests queue behind the
/// running animation, it can be well after the request arrived.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResolvedOutcome {
    #[serde(rename = "type")]
    pub kind: String,
    pub username: String,
    pub text: String,
    pub sku: Option<String>,
    #[serde(rename = "segmentIndex")]
    pub segment_index: u32,
    pub segment: Segment,
    pub timestamp: DateTime<Utc>,
}

/// What the rendering surface reports when the animation stops: the label and
/// fill it visually landed on. The surface has no notion of segment identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandedSegment {
    pub text: String,
    #[serde(rename = "fillStyle")]
    pub fill_style: String,
}
