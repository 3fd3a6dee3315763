use giftwheel_types::{ResolvedOutcome, HISTORY_CAPACITY};

/// Rolling record of resolved outcomes, most recent first.
///
/// Bounded to [`HISTORY_CAPACITY`]; the oldest entry is evicted on overflow.
/// Not persisted beyond the process lifetime.
#[derive(Debug, Default)]
pub struct SpinHistory {
    outcomes: Vec<ResolvedOutcome>,
}

impl SpinHistory {
    pub fn new() -> Self {
        Self {
            outcomes: Vec::new(),
        }
    }

    pub fn push(&mut self, outcome: ResolvedOutcome) {
        self.outcomes.insert(0, outcome);
        self.outcomes.truncate(HISTORY_CAPACITY);
    }

    pub fn latest(&self) -> Option<&ResolvedOutcome> {
        self.outcomes.first()
    }

    pub fn outcomes(&self) -> &[ResolvedOutcome] {
        &self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}
