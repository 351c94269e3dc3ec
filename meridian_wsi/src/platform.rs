//! Platform adapter seam
//!
//! The platform owns the OS window, the event pump, and the frame timer.
//! The mandatory trait surface is deliberately small; everything optional
//! (window title, refresh estimates) has a default so implementers are not
//! forced to override irrelevant hooks.

use crate::chain::ChainDescription;
use crate::types::Extent;

/// Platform adapter consumed by the WSI.
///
/// One logical render thread calls into this; the platform may pump OS
/// events on another thread and communicate through the
/// [`EventProxy`](crate::events::EventProxy) instead of mutating WSI
/// state directly.
pub trait WsiPlatform {
    /// Current drawable extent of the surface.
    fn surface_extent(&self) -> Extent;

    /// Aspect ratio of the surface as the platform understands it.
    ///
    /// On pre-rotated displays this may disagree with `surface_extent`.
    fn aspect_ratio(&self) -> f32 {
        let extent = self.surface_extent();
        if extent.height == 0 {
            1.0
        } else {
            extent.width as f32 / extent.height as f32
        }
    }

    /// Whether the application should keep running.
    fn alive(&self) -> bool;

    /// Pump input. Called once per frame, after acquire on the success
    /// path and unconditionally on failure paths, so a shutdown request
    /// is never missed.
    fn poll_input(&mut self);

    /// Whether a resize is pending. Acknowledged by the sequencer once the
    /// chain has been rebuilt.
    fn should_resize(&self) -> bool {
        false
    }

    fn acknowledge_resize(&mut self) {}

    /// Tick the platform's frame timer; returns (frame_time, elapsed_time)
    /// in seconds. Implementations typically delegate to an owned
    /// [`FrameTimer`](crate::timer::FrameTimer).
    fn tick_frame(&mut self) -> (f64, f64);

    /// Tick with an externally supplied frame time (external-frame mode).
    fn tick_frame_external(&mut self, frame_time: f64) -> (f64, f64);

    /// Restart the frame timer after the chain is (re)created.
    fn reset_frame_timer(&mut self);

    /// Estimated time one frame spends on the display, in seconds.
    /// Used for the rough video-latency estimate when the display engine
    /// offers no confirmed timing.
    fn estimated_frame_presentation_duration(&self) -> f64 {
        1.0 / 60.0
    }

    /// Optional window title pass-through.
    fn set_window_title(&mut self, _title: &str) {}
}

/// Receiver for chain lifecycle notifications.
///
/// The renderer registers one of these to rebuild framebuffers when a new
/// generation is published. `chain_destroyed` is always delivered before
/// the matching `chain_created` of the replacement generation.
pub trait ChainListener {
    fn chain_created(&mut self, description: &ChainDescription);
    fn chain_destroyed(&mut self);

    /// Per-frame tick with (frame_time, elapsed_time) in seconds.
    fn frame_tick(&mut self, _frame_time: f64, _elapsed_time: f64) {}
}
