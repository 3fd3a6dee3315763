use chrono::Utc;
use giftwheel_types::{LandedSegment, ResolvedOutcome, Segment, SpinRequest, FALLBACK_COLOR};

/// Reconciles the wheel's completion report with the originating request.
///
/// The surface is ground truth for where the wheel visually stopped (label
/// and fill, no identity); the request is ground truth for identity and
/// metadata the surface cannot know. Each field falls back independently and
/// every chain ends in a terminal default, so resolution is total: it
/// produces an outcome for any combination of present and absent fields.
///
/// `slot` is the one-based wheel slot the animation was aimed at.
pub fn resolve_winner(
    request: &SpinRequest,
    slot: usize,
    landed: Option<&LandedSegment>,
) -> ResolvedOutcome {
    let declared = request.segment.as_ref();
    let landed_text = landed.map(|l| l.text.clone());
    let raw_text = (!request.text.is_empty()).then(|| request.text.clone());

    let segment = Segment {
        id: declared
            .and_then(|s| s.id.clone())
            .unwrap_or_else(|| format!("seg_{slot}")),
        text: landed_text
            .clone()
            .or_else(|| declared.and_then(|s| s.text.clone()))
            .or_else(|| raw_text.clone())
            .unwrap_or_else(|| format!("Segmento {slot}")),
        color: landed
            .map(|l| l.fill_style.clone())
            .or_else(|| declared.and_then(|s| s.color.clone()))
            .unwrap_or_else(|| FALLBACK_COLOR.to_string()),
    };

    // The outcome text skips the declared-segment step: what the wheel showed
    // wins, then the raw request text, then whatever the segment settled on.
    let text = landed_text
        .or(raw_text)
        .unwrap_or_else(|| segment.text.clone());

    ResolvedOutcome {
        kind: request.kind.clone(),
        username: request.username.clone(),
        text,
        sku: request.sku.clone(),
        segment_index: match request.segment_index {
            Some(index) => index,
            None => slot.saturating_sub(1) as u32,
        },
        segment,
        timestamp: Utc::now(),
    }
}
