use giftwheel_types::api::ObserverEvent;
use giftwheel_types::{LandedSegment, Segment, SpinRequest};
use tracing::{info, warn};

use crate::history::SpinHistory;
use crate::queue::SpinQueue;
use crate::registry::RegistryMirror;
use crate::resolve::resolve_winner;
use crate::surface::{RenderingSurface, SurfaceError};

/// Whether the rendering surface is currently animating.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Spinning,
}

impl PlaybackState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaybackState::Idle => "idle",
            PlaybackState::Spinning => "spinning",
        }
    }
}

/// The animation in flight: the request being played and the one-based slot
/// the surface was told to stop at.
#[derive(Debug)]
struct ActiveSpin {
    request: SpinRequest,
    slot: usize,
}

/// The playback state machine.
///
/// Owns the rendering surface, the spin queue, the registry mirror and the
/// history. All entry points are synchronous mutations that hand back the
/// observer events the caller should publish; the caller provides the single
/// thread of control (one lock, one completion pump), so no internal
/// synchronization is needed.
///
/// Invariants: at most one animation in flight; queued requests are served
/// strictly in arrival order; a running animation is never preempted. The
/// only way out of `Spinning` is the surface's completion callback. There is
/// no timeout: a completion that never arrives stalls the queue until an
/// operator restarts the service.
pub struct WheelEngine<S> {
    mirror: RegistryMirror,
    queue: SpinQueue,
    history: SpinHistory,
    state: PlaybackState,
    surface: S,
    active: Option<ActiveSpin>,
}

impl<S: RenderingSurface> WheelEngine<S> {
    pub fn new(surface: S) -> Self {
        Self {
            mirror: RegistryMirror::new(),
            queue: SpinQueue::new(),
            history: SpinHistory::new(),
            state: PlaybackState::Idle,
            surface,
            active: None,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn segments(&self) -> &[Segment] {
        self.mirror.segments()
    }

    pub fn history(&self) -> &SpinHistory {
        &self.history
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Full-replacement registry update: reconfigures the surface and
    /// replaces the mirror.
    pub fn handle_segments_updated(&mut self, segments: Vec<Segment>) -> Vec<ObserverEvent> {
        info!(count = segments.len(), "segments updated");
        self.surface.configure(&segments);
        self.mirror.replace(segments);
        vec![
            ObserverEvent::Segments {
                segments: self.mirror.segments().to_vec(),
            },
            self.status_event(),
        ]
    }

    /// Enqueues an inbound spin request and starts playback if the wheel is
    /// idle. A request arriving mid-animation queues behind it; it never
    /// interrupts.
    pub fn handle_spin_request(&mut self, request: SpinRequest) -> Vec<ObserverEvent> {
        info!(username = %request.username, sku = ?request.sku, "spin request enqueued");
        self.queue.enqueue(request);
        self.try_start();
        vec![self.status_event()]
    }

    /// Re-entry point for the surface's completion callback: resolves the
    /// winner, publishes it, and starts the next queued request if any.
    pub fn handle_spin_complete(&mut self, landed: Option<LandedSegment>) -> Vec<ObserverEvent> {
        let Some(active) = self.active.take() else {
            warn!("completion callback with no active spin");
            return Vec::new();
        };
        self.state = PlaybackState::Idle;

        let winner = resolve_winner(&active.request, active.slot, landed.as_ref());
        info!(winner = %winner.text, username = %winner.username, slot = active.slot, "spin resolved");
        self.history.push(winner.clone());

        let mut events = vec![ObserverEvent::Winner { winner }];
        self.try_start();
        events.push(self.status_event());
        events
    }

    pub fn status_event(&self) -> ObserverEvent {
        ObserverEvent::Status {
            spinning: self.state == PlaybackState::Spinning,
            segments: self.mirror.len(),
            queued: self.queue.len(),
        }
    }

    /// Dequeues and plays the next request when idle. A request whose
    /// animation cannot start is forfeited (logged, no outcome synthesized)
    /// and the next pending one is tried.
    fn try_start(&mut self) {
        while self.state == PlaybackState::Idle {
            let Some(request) = self.queue.dequeue_front() else {
                break;
            };
            let slot = target_slot(&request);
            // Successive spins must be visually independent; stop whatever
            // the surface thinks it is doing before aiming it at a new slot.
            self.surface.abort();
            match self.surface.start_spin(slot) {
                Ok(()) => {
                    info!(slot, username = %request.username, "spin started");
                    self.state = PlaybackState::Spinning;
                    self.active = Some(ActiveSpin { request, slot });
                }
                Err(SurfaceError::NotReady) => {
                    warn!(slot, username = %request.username, "surface cannot start, request forfeited");
                }
            }
        }
    }
}

/// One-based wheel slot targeted by a request. A request that does not say
/// where to land points at the first segment; the wheel must always stop
/// somewhere.
fn target_slot(request: &SpinRequest) -> usize {
    match request.segment_index {
        Some(index) => index as usize + 1,
        None => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Records surface commands; completions are injected by the test.
    #[derive(Default)]
    struct MockSurface {
        ready: bool,
        log: Rc<RefCell<MockLog>>,
    }

    #[derive(Default)]
    struct MockLog {
        spins: Vec<usize>,
        aborts: usize,
        configures: usize,
    }

    impl MockSurface {
        fn ready(log: Rc<RefCell<MockLog>>) -> Self {
            Self { ready: true, log }
        }

        fn broken(log: Rc<RefCell<MockLog>>) -> Self {
            Self { ready: false, log }
        }
    }

    impl RenderingSurface for MockSurface {
        fn configure(&mut self, _segments: &[Segment]) {
            self.log.borrow_mut().configures += 1;
        }

        fn start_spin(&mut self, slot: usize) -> Result<(), SurfaceError> {
            if !self.ready {
                return Err(SurfaceError::NotReady);
            }
            self.log.borrow_mut().spins.push(slot);
            Ok(())
        }

        fn abort(&mut self) {
            self.log.borrow_mut().aborts += 1;
        }
    }

    fn segments(n: usize) -> Vec<Segment> {
        (1..=n)
            .map(|i| Segment {
                id: format!("s{i}"),
                text: format!("Gift{i}"),
                color: "#fff".to_string(),
            })
            .collect()
    }

    fn request(username: &str, index: Option<u32>) -> SpinRequest {
        SpinRequest {
            kind: "gift".to_string(),
            username: username.to_string(),
            text: String::new(),
            sku: None,
            segment_index: index,
            segment: None,
        }
    }

    fn landed(text: &str) -> LandedSegment {
        LandedSegment {
            text: text.to_string(),
            fill_style: "#fff".to_string(),
        }
    }

    fn winners(events: &[ObserverEvent]) -> Vec<String> {
        events
            .iter()
            .filter_map(|event| match event {
                ObserverEvent::Winner { winner } => Some(winner.username.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_idle_request_starts_immediately() {
        let log = Rc::new(RefCell::new(MockLog::default()));
        let mut engine = WheelEngine::new(MockSurface::ready(log.clone()));
        engine.handle_segments_updated(segments(5));

        engine.handle_spin_request(request("u1", Some(2)));
        assert_eq!(engine.state(), PlaybackState::Spinning);
        assert_eq!(log.borrow().spins, [3]);
        assert_eq!(engine.queued(), 0);
    }

    #[test]
    fn test_at_most_one_animation_in_flight() {
        let log = Rc::new(RefCell::new(MockLog::default()));
        let mut engine = WheelEngine::new(MockSurface::ready(log.clone()));
        engine.handle_segments_updated(segments(3));

        engine.handle_spin_request(request("u1", None));
        engine.handle_spin_request(request("u2", None));
        engine.handle_spin_request(request("u3", None));

        // Only the first request reached the surface; the rest queued.
        assert_eq!(log.borrow().spins.len(), 1);
        assert_eq!(engine.queued(), 2);

        engine.handle_spin_complete(Some(landed("Gift1")));
        assert_eq!(log.borrow().spins.len(), 2);
        assert_eq!(engine.queued(), 1);
    }

    #[test]
    fn test_fifo_order_across_completions() {
        let log = Rc::new(RefCell::new(MockLog::default()));
        let mut engine = WheelEngine::new(MockSurface::ready(log.clone()));
        engine.handle_segments_updated(segments(3));

        for name in ["u1", "u2", "u3", "u4"] {
            engine.handle_spin_request(request(name, None));
        }

        let mut resolved = Vec::new();
        for _ in 0..4 {
            let events = engine.handle_spin_complete(Some(landed("Gift1")));
            resolved.extend(winners(&events));
        }
        assert_eq!(resolved, ["u1", "u2", "u3", "u4"]);
        assert_eq!(engine.state(), PlaybackState::Idle);
        assert_eq!(engine.queued(), 0);
    }

    #[test]
    fn test_default_target_is_first_slot() {
        let log = Rc::new(RefCell::new(MockLog::default()));
        let mut engine = WheelEngine::new(MockSurface::ready(log.clone()));
        engine.handle_segments_updated(segments(5));

        engine.handle_spin_request(request("u1", None));
        assert_eq!(log.borrow().spins, [1]);

        let events = engine.handle_spin_complete(Some(landed("Gift1")));
        let ObserverEvent::Winner { winner } = &events[0] else {
            panic!("expected winner event");
        };
        assert_eq!(winner.segment_index, 0);
    }

    #[test]
    fn test_index_mapping_echoes_declared_index() {
        let log = Rc::new(RefCell::new(MockLog::default()));
        let mut engine = WheelEngine::new(MockSurface::ready(log.clone()));
        engine.handle_segments_updated(segments(5));

        engine.handle_spin_request(request("u1", Some(2)));
        assert_eq!(log.borrow().spins, [3]);

        let events = engine.handle_spin_complete(Some(landed("Gift3")));
        let ObserverEvent::Winner { winner } = &events[0] else {
            panic!("expected winner event");
        };
        assert_eq!(winner.segment_index, 2);
    }

    #[test]
    fn test_surface_is_reset_before_each_spin() {
        let log = Rc::new(RefCell::new(MockLog::default()));
        let mut engine = WheelEngine::new(MockSurface::ready(log.clone()));
        engine.handle_segments_updated(segments(3));

        engine.handle_spin_request(request("u1", None));
        engine.handle_spin_request(request("u2", None));
        engine.handle_spin_complete(Some(landed("Gift1")));

        // One abort per started spin.
        assert_eq!(log.borrow().aborts, 2);
    }

    #[test]
    fn test_broken_surface_forfeits_requests_and_stays_idle() {
        let log = Rc::new(RefCell::new(MockLog::default()));
        let mut engine = WheelEngine::new(MockSurface::broken(log.clone()));
        engine.handle_segments_updated(Vec::new());

        let events = engine.handle_spin_request(request("u1", None));
        assert_eq!(engine.state(), PlaybackState::Idle);
        assert_eq!(engine.queued(), 0);
        assert!(winners(&events).is_empty());
        assert!(engine.history().is_empty());
        assert!(log.borrow().spins.is_empty());
    }

    #[test]
    fn test_stray_completion_is_ignored() {
        let log = Rc::new(RefCell::new(MockLog::default()));
        let mut engine = WheelEngine::new(MockSurface::ready(log));
        engine.handle_segments_updated(segments(2));

        let events = engine.handle_spin_complete(Some(landed("Gift1")));
        assert!(events.is_empty());
        assert_eq!(engine.state(), PlaybackState::Idle);
        assert!(engine.history().is_empty());
    }

    #[test]
    fn test_completion_without_report_still_resolves() {
        let log = Rc::new(RefCell::new(MockLog::default()));
        let mut engine = WheelEngine::new(MockSurface::ready(log));
        engine.handle_segments_updated(segments(2));

        engine.handle_spin_request(request("u1", None));
        let events = engine.handle_spin_complete(None);
        let ObserverEvent::Winner { winner } = &events[0] else {
            panic!("expected winner event");
        };
        assert_eq!(winner.segment.text, "Segmento 1");
    }

    #[test]
    fn test_history_keeps_five_most_recent() {
        let log = Rc::new(RefCell::new(MockLog::default()));
        let mut engine = WheelEngine::new(MockSurface::ready(log));
        engine.handle_segments_updated(segments(2));

        for i in 0..7 {
            engine.handle_spin_request(request(&format!("u{i}"), None));
            engine.handle_spin_complete(Some(landed("Gift1")));
        }
        assert_eq!(engine.history().len(), 5);
        assert_eq!(engine.history().latest().unwrap().username, "u6");
    }

    #[test]
    fn test_segments_update_mid_spin_does_not_touch_playback() {
        let log = Rc::new(RefCell::new(MockLog::default()));
        let mut engine = WheelEngine::new(MockSurface::ready(log.clone()));
        engine.handle_segments_updated(segments(2));

        engine.handle_spin_request(request("u1", None));
        engine.handle_segments_updated(segments(4));
        assert_eq!(engine.state(), PlaybackState::Spinning);
        assert_eq!(log.borrow().spins.len(), 1);
    }

    #[test]
    fn test_status_event_reflects_engine() {
        let log = Rc::new(RefCell::new(MockLog::default()));
        let mut engine = WheelEngine::new(MockSurface::ready(log));
        engine.handle_segments_updated(segments(4));
        engine.handle_spin_request(request("u1", None));
        engine.handle_spin_request(request("u2", None));

        let ObserverEvent::Status {
            spinning,
            segments,
            queued,
        } = engine.status_event()
        else {
            panic!("expected status event");
        };
        assert!(spinning);
        assert_eq!(segments, 4);
        assert_eq!(queued, 1);
    }
}
