//! Latency controller
//!
//! Bounds how many frames the CPU may queue ahead of the display. Present
//! identifiers advance only on genuine presents; duplicated frames widen
//! the effective wait window instead, so marking duplicates never
//! artificially tightens pacing.

use crate::types::ChainHandle;

/// Frames the CPU may run ahead when no low-latency intent is active.
pub const DEFAULT_FRAME_LATENCY: u64 = 1;

/// Bounded wait used for the present-wait gate.
pub const PRESENT_WAIT_TIMEOUT_NS: u64 = 1_000_000_000;

/// Bracket points of the vendor low-latency marker protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatencyMarker {
    InputSample,
    SimulationStart,
    SimulationEnd,
    RenderSubmitEnd,
    PresentStart,
    PresentEnd,
}

/// Vendor low-latency hook strategy.
///
/// A best-effort overlay on top of the present-wait mechanism, not a
/// replacement for it. The default implementation does nothing; the
/// Vulkan backend provides an NV implementation selected at construction.
pub trait LatencyHooks: Send {
    /// (Re)configure the protocol for a chain generation.
    fn configure(&mut self, _chain: ChainHandle, _low_latency: bool, _boost: bool) {}

    /// Emit a timing marker for the given present id.
    fn marker(&mut self, _chain: ChainHandle, _marker: LatencyMarker, _present_id: u64) {}

    /// Optionally block until the driver wants simulation to begin.
    fn sleep(&mut self, _chain: ChainHandle) {}
}

/// No-op hooks for platforms without a vendor protocol.
pub struct NoopLatencyHooks;

impl LatencyHooks for NoopLatencyHooks {}

/// Present-id bookkeeping and the effective wait depth.
#[derive(Debug)]
pub struct LatencyController {
    /// Monotonic, pre-incremented on every genuine present.
    next_present_id: u64,

    /// Highest id the display engine has confirmed (present-wait feedback).
    last_confirmed_present_id: u64,

    /// Frames duplicated since the last genuine present.
    frames_duplicated: u64,

    /// Total duplicates since creation, for diagnostics.
    total_duplicated: u64,

    /// Presentation-side low-latency intent: run the queue at depth zero.
    low_latency_present: bool,

    /// The next present has been declared a duplicate of the previous
    /// content.
    next_is_duplicate: bool,
}

impl LatencyController {
    pub fn new() -> Self {
        Self {
            next_present_id: 0,
            last_confirmed_present_id: 0,
            frames_duplicated: 0,
            total_duplicated: 0,
            low_latency_present: false,
            next_is_duplicate: false,
        }
    }

    pub fn set_low_latency_present(&mut self, enabled: bool) {
        self.low_latency_present = enabled;
    }

    pub fn low_latency_present(&self) -> bool {
        self.low_latency_present
    }

    /// Declare the next present a duplicate of the previous content.
    pub fn mark_next_duplicate(&mut self) {
        self.next_is_duplicate = true;
    }

    pub fn next_present_id(&self) -> u64 {
        self.next_present_id
    }

    pub fn last_confirmed_present_id(&self) -> u64 {
        self.last_confirmed_present_id
    }

    pub fn frames_duplicated(&self) -> u64 {
        self.frames_duplicated
    }

    pub fn total_duplicated(&self) -> u64 {
        self.total_duplicated
    }

    /// Configured latency plus the duplicates since the last genuine
    /// present, so duplicated frames do not tighten the window.
    pub fn effective_wait_depth(&self) -> u64 {
        let base = if self.low_latency_present {
            0
        } else {
            DEFAULT_FRAME_LATENCY
        };
        base + self.frames_duplicated
    }

    /// The present id the display must have confirmed before another image
    /// is acquired, or `None` when no wait is needed yet.
    ///
    /// When present-id feedback is unavailable the confirmed id never
    /// advances and callers must not consult this; duplicate accounting
    /// is allowed to drift in that case.
    pub fn wait_target(&self) -> Option<u64> {
        let target = self.next_present_id.saturating_sub(self.effective_wait_depth());
        if target > self.last_confirmed_present_id {
            Some(target)
        } else {
            None
        }
    }

    /// Record a confirmed present id (the present-wait gate returned).
    pub fn confirm(&mut self, present_id: u64) {
        if present_id > self.last_confirmed_present_id {
            self.last_confirmed_present_id = present_id;
        }
    }

    /// Account for a present about to be submitted. Returns the id to
    /// attach for a genuine present, `None` for a duplicate.
    pub fn register_present(&mut self) -> Option<u64> {
        if self.next_is_duplicate {
            self.next_is_duplicate = false;
            self.frames_duplicated += 1;
            self.total_duplicated += 1;
            None
        } else {
            self.next_present_id += 1;
            self.frames_duplicated = 0;
            Some(self.next_present_id)
        }
    }

    /// Reset per-chain pacing state after a rebuild. Identifiers keep
    /// rising across generations; only the confirmation watermark resets
    /// relative expectations.
    pub fn on_chain_rebuilt(&mut self) {
        self.frames_duplicated = 0;
        self.next_is_duplicate = false;
    }

    /// Rough CPU-to-photon latency estimate in seconds: one display
    /// period per queued image beyond the one being scanned out.
    pub fn estimated_video_latency(&self, image_count: u32, frame_duration: f64) -> f64 {
        let frames = image_count.saturating_sub(1);
        frame_duration * frames as f64
    }
}

impl Default for LatencyController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "latency_tests.rs"]
mod tests;
