//! Cross-thread event queue
//!
//! Work generated on an OS event thread that would mutate sequencer or
//! builder state is queued here and drained only at two well-defined
//! points: the top of `begin_frame`, and inside the blocking wait used
//! while the surface is minimized. It is never applied between acquire
//! and present.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::types::Extent;

/// Events an OS event thread may post towards the frame loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformEvent {
    /// The surface was resized to the given extent.
    Resized(Extent),

    /// The user or OS requested the application to close.
    CloseRequested,

    /// The surface became invalid and the chain must be rebuilt.
    SurfaceInvalidated,
}

#[derive(Default)]
struct QueueState {
    events: Mutex<VecDeque<PlatformEvent>>,
    teardown: AtomicBool,
}

/// Sender half handed to the event thread.
#[derive(Clone)]
pub struct EventProxy {
    state: Arc<QueueState>,
}

impl EventProxy {
    pub fn post(&self, event: PlatformEvent) {
        if event == PlatformEvent::CloseRequested {
            self.state.teardown.store(true, Ordering::Release);
        }
        self.state.events.lock().push_back(event);
    }

    /// Cooperative shutdown: the frame loop observes this at the top of
    /// the next iteration and exits before destroying resources.
    pub fn request_teardown(&self) {
        self.state.teardown.store(true, Ordering::Release);
    }
}

/// Receiver half owned by the WSI.
pub struct EventQueue {
    state: Arc<QueueState>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            state: Arc::new(QueueState::default()),
        }
    }

    pub fn proxy(&self) -> EventProxy {
        EventProxy {
            state: Arc::clone(&self.state),
        }
    }

    /// Drain all queued events in post order.
    pub fn drain(&self) -> Vec<PlatformEvent> {
        let mut queue = self.state.events.lock();
        queue.drain(..).collect()
    }

    pub fn teardown_requested(&self) -> bool {
        self.state.teardown.load(Ordering::Acquire)
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
