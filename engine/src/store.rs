use giftwheel_types::Segment;

/// The registry collaborator that owns the authoritative segment list.
///
/// The engine never persists segments itself; it mirrors what the store
/// announces. `save` submits a full edited list and returns the accepted
/// (possibly normalized) list, which the caller installs as the new mirror.
pub trait SegmentStore {
    type Error: std::error::Error + Send + Sync + 'static;

    fn load(&self) -> impl std::future::Future<Output = Result<Vec<Segment>, Self::Error>> + Send;

    fn save(
        &self,
        segments: &[Segment],
    ) -> impl std::future::Future<Output = Result<Vec<Segment>, Self::Error>> + Send;
}
