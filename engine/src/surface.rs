use std::time::Duration;

use giftwheel_types::{LandedSegment, Segment};
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum SurfaceError {
    /// The surface has no segments configured and cannot animate.
    #[error("rendering surface not initialized")]
    NotReady,
}

/// The animation primitive that visually spins the wheel and eventually
/// reports the segment it landed on.
///
/// Owned exclusively by the playback engine; nothing else touches it. A
/// started spin produces exactly one completion, delivered out of band as a
/// [`LandedSegment`] that re-enters the engine through its completion
/// channel, after an arbitrary real-time delay.
pub trait RenderingSurface {
    /// Rebuilds the wheel for a new segment list. Replaces any previous
    /// configuration wholesale.
    fn configure(&mut self, segments: &[Segment]);

    /// Starts the stop-at-slot animation. `slot` is one-based.
    fn start_spin(&mut self, slot: usize) -> Result<(), SurfaceError>;

    /// Stops any in-progress animation and zeroes the rotation baseline so
    /// successive spins stay visually independent. Safe to call when nothing
    /// is animating.
    fn abort(&mut self);
}

/// Timer-backed surface for headless operation: waits out the configured
/// animation duration, then reports the segment at the target slot.
pub struct SimulatedWheel {
    segments: Vec<Segment>,
    duration: Duration,
    completions: mpsc::UnboundedSender<LandedSegment>,
    animation: Option<tokio::task::JoinHandle<()>>,
}

impl SimulatedWheel {
    pub fn new(duration: Duration, completions: mpsc::UnboundedSender<LandedSegment>) -> Self {
        Self {
            segments: Vec::new(),
            duration,
            completions,
            animation: None,
        }
    }
}

impl RenderingSurface for SimulatedWheel {
    fn configure(&mut self, segments: &[Segment]) {
        self.segments = segments.to_vec();
    }

    fn start_spin(&mut self, slot: usize) -> Result<(), SurfaceError> {
        if self.segments.is_empty() {
            return Err(SurfaceError::NotReady);
        }
        // A slot beyond the wheel still lands somewhere real, the same way a
        // canvas wheel clamps its stop angle.
        let index = slot.saturating_sub(1).min(self.segments.len() - 1);
        let landed = LandedSegment {
            text: self.segments[index].text.clone(),
            fill_style: self.segments[index].color.clone(),
        };
        let completions = self.completions.clone();
        let duration = self.duration;
        self.animation = Some(tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            let _ = completions.send(landed);
        }));
        Ok(())
    }

    fn abort(&mut self) {
        if let Some(animation) = self.animation.take() {
            animation.abort();
        }
    }
}
