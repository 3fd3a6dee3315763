use std::collections::HashSet;
use std::io;
use std::path::PathBuf;

use giftwheel_engine::SegmentStore;
use giftwheel_types::Segment;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("segment file io: {0}")]
    Io(#[from] io::Error),
    #[error("segment file parse: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate segment id: {0}")]
    DuplicateId(String),
}

/// File-backed segment registry.
///
/// The list lives as one JSON document. A missing file is seeded with a
/// default wheel so a fresh install has something to spin.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn default_segments() -> Vec<Segment> {
        [
            ("seg_1", "Premio 1", "#ff6b6b"),
            ("seg_2", "Premio 2", "#feca57"),
            ("seg_3", "Premio 3", "#48dbfb"),
            ("seg_4", "Premio 4", "#1dd1a1"),
            ("seg_5", "Premio 5", "#f368e0"),
            ("seg_6", "Premio 6", "#ff9f43"),
        ]
        .into_iter()
        .map(|(id, text, color)| Segment {
            id: id.to_string(),
            text: text.to_string(),
            color: color.to_string(),
        })
        .collect()
    }

    async fn write(&self, segments: &[Segment]) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(segments)?;
        tokio::fs::write(&self.path, bytes).await?;
        Ok(())
    }
}

impl SegmentStore for JsonFileStore {
    type Error = StoreError;

    async fn load(&self) -> Result<Vec<Segment>, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "no segment file, seeding defaults");
                let segments = Self::default_segments();
                self.write(&segments).await?;
                Ok(segments)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn save(&self, segments: &[Segment]) -> Result<Vec<Segment>, StoreError> {
        let mut seen = HashSet::new();
        for segment in segments {
            if !seen.insert(segment.id.as_str()) {
                return Err(StoreError::DuplicateId(segment.id.clone()));
            }
        }
        self.write(segments).await?;
        Ok(segments.to_vec())
    }
}
