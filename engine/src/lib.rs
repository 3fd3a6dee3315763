//! Spin sequencing and winner resolution for the giftwheel.
//!
//! Inbound spin requests can arrive far faster than the wheel can visually
//! resolve them, so the engine buffers them in arrival order and plays them
//! one at a time: at most one animation in flight, strict FIFO, no
//! preemption. When an animation completes, the winner is reconciled from
//! what the wheel visually landed on and what the originating request
//! declared, then published to observers and a small rolling history.

pub mod admin;
pub mod history;
pub mod playback;
pub mod queue;
pub mod registry;
pub mod resolve;
pub mod store;
pub mod surface;

pub use admin::{AdminSession, SegmentField};
pub use history::SpinHistory;
pub use playback::{PlaybackState, WheelEngine};
pub use queue::SpinQueue;
pub use registry::RegistryMirror;
pub use resolve::resolve_winner;
pub use store::SegmentStore;
pub use surface::{RenderingSurface, SimulatedWheel, SurfaceError};
