use giftwheel_types::Segment;

/// Local cache of the authoritative segment list, as last announced by the
/// registry. The registry always announces full snapshots; there is no
/// partial merge.
#[derive(Clone, Debug, Default)]
pub struct RegistryMirror {
    segments: Vec<Segment>,
}

impl RegistryMirror {
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Replaces the whole list.
    pub fn replace(&mut self, segments: Vec<Segment>) {
        self.segments = segments;
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}
