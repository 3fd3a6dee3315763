use giftwheel_types::Segment;
use rand::Rng;
use tracing::info;
use uuid::Uuid;

use crate::store::SegmentStore;

/// Which field of a staged segment an edit targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentField {
    Text,
    Color,
}

/// Staging buffer for segment edits, independent of the live mirror until
/// committed.
///
/// A registry update that arrives mid-edit resets the staged copy and drops
/// unsaved edits (last mirror write wins). Known hazard, kept to match the
/// admin panel this replaces.
#[derive(Debug, Default)]
pub struct AdminSession {
    staged: Vec<Segment>,
}

impl AdminSession {
    pub fn new() -> Self {
        Self { staged: Vec::new() }
    }

    /// Resets the staged copy to the given mirror snapshot, discarding any
    /// unsaved edits.
    pub fn reset_from(&mut self, segments: &[Segment]) {
        self.staged = segments.to_vec();
    }

    pub fn staged(&self) -> &[Segment] {
        &self.staged
    }

    /// Appends a fresh segment with a generated unique id and a random
    /// fallback color.
    pub fn add_segment(&mut self) {
        let segment = Segment {
            id: Uuid::new_v4().to_string(),
            text: "Nuevo premio".to_string(),
            color: random_color(&mut rand::thread_rng()),
        };
        info!(id = %segment.id, "segment staged");
        self.staged.push(segment);
    }

    /// Removes the segment at `index`. Out-of-range positions are ignored.
    pub fn remove(&mut self, index: usize) -> Option<Segment> {
        if index < self.staged.len() {
            Some(self.staged.remove(index))
        } else {
            None
        }
    }

    /// Edits one field of the segment at `index`. Returns false when the
    /// position does not exist.
    pub fn update_field(&mut self, index: usize, field: SegmentField, value: String) -> bool {
        let Some(segment) = self.staged.get_mut(index) else {
            return false;
        };
        match field {
            SegmentField::Text => segment.text = value,
            SegmentField::Color => segment.color = value,
        }
        true
    }

    /// Sends the staged list to the registry. On success the accepted list
    /// becomes the new staged baseline and is returned for the caller to
    /// install as the live mirror; on failure both the staged copy and the
    /// live mirror stay as they were and the error goes to the operator.
    pub async fn commit<S: SegmentStore>(&mut self, store: &S) -> Result<Vec<Segment>, S::Error> {
        let accepted = store.save(&self.staged).await?;
        self.staged = accepted.clone();
        Ok(accepted)
    }
}

fn random_color(rng: &mut impl Rng) -> String {
    format!("#{:06x}", rng.gen_range(0u32..=0xffffff))
}
