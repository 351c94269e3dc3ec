//! WSI facade and frame sequencer
//!
//! Owns the acquire→submit→present cycle, the in-flight invariant, and the
//! rebuild-on-stale retry machine. One logical render thread drives
//! `begin_frame`/`end_frame`; an OS event thread may post into the event
//! queue concurrently. Chain state is never mutated between acquire and
//! present.

use std::collections::VecDeque;
use std::time::Duration;

use crate::chain::{self, ChainDescription, ChainGeneration};
use crate::display::{AcquireOutcome, DisplayEngine, PresentOutcome, PresentRequest};
use crate::error::{Error, Result, SwapchainError};
use crate::events::{EventProxy, EventQueue, PlatformEvent};
use crate::latency::{LatencyController, LatencyHooks, LatencyMarker, NoopLatencyHooks};
use crate::negotiate::{self, ChainRequest};
use crate::platform::{ChainListener, WsiPlatform};
use crate::types::{
    BackbufferFormat, CompressionMode, Extent, ImageUsage, NativePresentMode, PresentMode,
    SemaphoreHandle, SurfaceHandle,
};
use crate::{wsi_debug, wsi_error, wsi_info, wsi_warn};

const SOURCE: &str = "meridian::wsi";

/// Stale-surface recoveries attempted within one `begin_frame` before the
/// failure escalates to fatal.
const MAX_ACQUIRE_ATTEMPTS: u32 = 4;

/// Chain-creation retries before a hard failure is reported.
const MAX_BUILD_RETRIES: u32 = 3;

/// Poll interval while the surface is minimized.
const NO_SURFACE_POLL: Duration = Duration::from_millis(10);

/// Pairing of (image index, sync objects) handed to the render submission
/// that targets the acquired image. Taken exactly once per frame.
#[derive(Debug, Clone, Copy)]
pub struct AcquireTicket {
    pub image_index: u32,

    /// Wait this before writing the image.
    pub acquire: SemaphoreHandle,

    /// Signal this when the GPU work producing the frame completes; the
    /// present waits on it.
    pub release: SemaphoreHandle,
}

#[derive(Debug, Clone, Copy)]
struct AcquiredFrame {
    index: u32,
    ticket_taken: bool,
}

/// Swapchain lifecycle manager and frame-pacing controller.
pub struct Wsi {
    engine: Box<dyn DisplayEngine>,
    platform: Box<dyn WsiPlatform>,
    hooks: Box<dyn LatencyHooks>,
    listener: Option<Box<dyn ChainListener>>,

    events: EventQueue,
    latency: LatencyController,
    reclaimer: crate::reclaim::DeferredReclaimer,

    /// Desired configuration; the current chain may lag behind it until
    /// the next safe rebuild point.
    request: ChainRequest,

    chain: Option<ChainGeneration>,
    acquired: Option<AcquiredFrame>,

    /// A configuration setter fired while a frame was in flight.
    pending_rebuild: bool,

    /// Resize posted from the event thread, not yet applied.
    pending_resize: Option<Extent>,

    /// Last known good extent, used for stale-surface recovery.
    last_extent: Extent,

    smooth_frame_time: f64,
    smooth_elapsed_time: f64,

    /// Submission-side low-latency toggle (vendor hook protocol).
    low_latency_submit: bool,

    /// Fenceless acquire-semaphore recycling; a semaphore re-enters use
    /// only after a full chain's worth of presents has gone by.
    recycle_ring: VecDeque<SemaphoreHandle>,

    // External-frame mode
    frame_is_external: bool,
    external_index: u32,
    external_frame_time: f64,
    external_acquire: Option<SemaphoreHandle>,
    external_pending_release: Option<SemaphoreHandle>,
    external_release: Option<SemaphoreHandle>,

    torn_down: bool,
}

impl Wsi {
    pub fn new(engine: Box<dyn DisplayEngine>, platform: Box<dyn WsiPlatform>) -> Self {
        Self {
            engine,
            platform,
            hooks: Box::new(NoopLatencyHooks),
            listener: None,
            events: EventQueue::new(),
            latency: LatencyController::new(),
            reclaimer: crate::reclaim::DeferredReclaimer::new(),
            request: ChainRequest::default(),
            chain: None,
            acquired: None,
            pending_rebuild: false,
            pending_resize: None,
            last_extent: Extent::ZERO,
            smooth_frame_time: 0.0,
            smooth_elapsed_time: 0.0,
            low_latency_submit: false,
            recycle_ring: VecDeque::new(),
            frame_is_external: false,
            external_index: 0,
            external_frame_time: 0.0,
            external_acquire: None,
            external_pending_release: None,
            external_release: None,
            torn_down: false,
        }
    }

    /// Install a vendor low-latency hook strategy (selected at
    /// construction time by the backend).
    pub fn set_latency_hooks(&mut self, hooks: Box<dyn LatencyHooks>) {
        self.hooks = hooks;
    }

    /// Register the consumer of chain lifecycle notifications.
    pub fn set_chain_listener(&mut self, listener: Box<dyn ChainListener>) {
        self.listener = Some(listener);
    }

    /// Sender half for the OS event thread.
    pub fn event_proxy(&self) -> EventProxy {
        self.events.proxy()
    }

    // ===== INIT / TEARDOWN =====

    /// Validate the surface and build the first chain generation.
    ///
    /// Blocks while the surface is minimized, polling input, until a live
    /// extent arrives or the platform dies.
    pub fn init(&mut self) -> Result<()> {
        match self.engine.surface_present_supported() {
            Ok(true) => {}
            Ok(false) => {
                return Err(Error::MissingCapability(
                    "present queue cannot present to this surface".to_string(),
                ))
            }
            Err(err) => return Err(err),
        }

        let extent = self.platform.surface_extent();
        if !self.blocking_rebuild(extent) {
            return Err(Error::InitializationFailed(
                "could not create initial swapchain".to_string(),
            ));
        }
        self.platform.reset_frame_timer();
        Ok(())
    }

    /// Full teardown: cooperative drain of everything before the device
    /// goes away. Also runs on drop.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;

        self.engine.wait_idle();
        self.retire_current_generation(None);
        self.acquired = None;

        while let Some(semaphore) = self.recycle_ring.pop_front() {
            self.engine.destroy_semaphore(semaphore);
        }
        for semaphore in [
            self.external_acquire.take(),
            self.external_pending_release.take(),
            self.external_release.take(),
        ]
        .into_iter()
        .flatten()
        {
            self.engine.destroy_semaphore(semaphore);
        }

        self.reclaimer.drain_all(self.engine.as_mut());
    }

    /// Drop the surface and everything built on it while keeping the
    /// device alive (application pause).
    pub fn deinit_surface(&mut self) {
        wsi_info!(SOURCE, "Surface teardown");
        self.engine.wait_idle();
        self.retire_current_generation(None);
        self.acquired = None;
        self.reclaimer.drain_all(self.engine.as_mut());
        self.engine.release_surface();
    }

    /// Adopt a new surface after a pause and rebuild the chain.
    pub fn init_surface(&mut self, surface: SurfaceHandle) -> Result<()> {
        wsi_info!(SOURCE, "Surface re-init");
        self.engine.adopt_surface(surface);
        let extent = self.platform.surface_extent();
        if !self.blocking_rebuild(extent) {
            return Err(Error::InitializationFailed(
                "could not rebuild swapchain on new surface".to_string(),
            ));
        }
        Ok(())
    }

    // ===== FRAME LOOP =====

    pub fn begin_frame(&mut self) -> bool {
        self.drain_events();
        if self.events.teardown_requested() || !self.platform.alive() {
            return false;
        }

        if self.frame_is_external {
            return self.begin_frame_external();
        }

        let needs_rebuild = self.chain.is_none()
            || self.platform.should_resize()
            || self.pending_resize.is_some()
            || self.pending_rebuild
            || self.chain.as_ref().is_some_and(|chain| chain.needs_rebuild);
        if needs_rebuild && self.acquired.is_none() {
            let extent = self
                .pending_resize
                .take()
                .unwrap_or_else(|| self.platform.surface_extent());
            self.pending_rebuild = false;
            if !self.blocking_rebuild(extent) {
                self.platform.poll_input();
                return false;
            }
            self.platform.acknowledge_resize();
        }

        if self.chain.is_none() {
            wsi_error!(SOURCE, "Completely lost swapchain, cannot continue");
            self.platform.poll_input();
            return false;
        }

        // A frame that never touched the chain keeps its index; no second
        // acquire happens until it is presented.
        if self.acquired.is_some() {
            return true;
        }

        self.external_release = None;
        self.acquire_loop()
    }

    pub fn end_frame(&mut self) -> bool {
        if self.frame_is_external {
            return self.end_frame_external();
        }

        let acquired = match self.acquired {
            Some(acquired) => acquired,
            None => return true,
        };

        // Frame never touched the chain image: skip presentation and treat
        // the frame as a no-op. The index stays acquired.
        if !acquired.ticket_taken {
            return true;
        }

        let ok = self.present_acquired(acquired.index);
        self.acquired = None;
        self.reclaimer.drain(self.engine.as_mut());

        // Configuration drifted while the frame was in flight: rebuild at
        // the first safe point, which is right now.
        if ok && self.pending_rebuild && self.chain.is_some() {
            self.pending_rebuild = false;
            let extent = self.last_extent;
            if !self.blocking_rebuild(extent) {
                return false;
            }
        }
        ok
    }

    /// Hand the acquired image's sync pairing to the render submission.
    /// Returns `None` before a successful `begin_frame` or on a second
    /// call within the same frame; taking the ticket marks the chain
    /// image as touched.
    pub fn acquire_ticket(&mut self) -> Option<AcquireTicket> {
        let acquired = self.acquired?;
        if acquired.ticket_taken {
            return None;
        }

        if self.frame_is_external {
            let acquire = self.external_acquire.take()?;
            let release = match self.engine.create_semaphore() {
                Ok(semaphore) => semaphore,
                Err(_) => return None,
            };
            self.external_pending_release = Some(release);
            self.acquired = Some(AcquiredFrame { ticket_taken: true, ..acquired });
            return Some(AcquireTicket {
                image_index: acquired.index,
                acquire,
                release,
            });
        }

        let engine = self.engine.as_mut();
        let chain = self.chain.as_mut()?;
        let slot = chain.slots.get_mut(acquired.index as usize)?;
        let acquire = slot.acquire?;
        let release = match slot.release {
            Some(semaphore) => semaphore,
            None => {
                let semaphore = engine.create_semaphore().ok()?;
                slot.release = Some(semaphore);
                semaphore
            }
        };

        self.acquired = Some(AcquiredFrame { ticket_taken: true, ..acquired });
        Some(AcquireTicket {
            image_index: acquired.index,
            acquire,
            release,
        })
    }

    // ===== EXTERNAL-FRAME MODE =====

    /// Adopt an externally acquired image index and pre-signalled acquire
    /// semaphore; the next `begin_frame` skips the native acquire.
    pub fn set_external_frame(
        &mut self,
        index: u32,
        acquire: SemaphoreHandle,
        frame_time: f64,
    ) {
        self.external_index = index;
        self.external_acquire = Some(acquire);
        self.external_frame_time = frame_time;
        self.frame_is_external = true;
    }

    /// Take the release semaphore of the last external frame. Ownership
    /// transfers to the caller; `None` when the frame never touched the
    /// image.
    pub fn consume_external_release_semaphore(&mut self) -> Option<SemaphoreHandle> {
        self.external_release.take()
    }

    fn begin_frame_external(&mut self) -> bool {
        // Re-entry with an index still acquired has to be handled by the
        // host; it owns the pacing in this mode.
        if self.acquired.is_some() {
            return false;
        }

        let (frame_time, elapsed) = self.platform.tick_frame_external(self.external_frame_time);
        self.smooth_frame_time = frame_time;
        self.smooth_elapsed_time = elapsed;

        self.platform.poll_input();
        if let Some(listener) = self.listener.as_mut() {
            listener.frame_tick(frame_time, elapsed);
        }

        self.acquired = Some(AcquiredFrame {
            index: self.external_index,
            ticket_taken: false,
        });
        true
    }

    fn end_frame_external(&mut self) -> bool {
        // Hand the release semaphore to the host; a frame that never
        // touched the image yields none.
        self.external_release = self.external_pending_release.take();
        self.frame_is_external = false;
        self.acquired = None;
        true
    }

    // ===== CONFIGURATION SETTERS =====

    /// Change the presentation policy. A target within the negotiated
    /// compatibility group switches seamlessly; anything else rebuilds at
    /// the next safe point.
    pub fn set_present_mode(&mut self, mode: PresentMode) {
        self.request.present_mode = mode;
        if let Some(chain) = self.chain.as_mut() {
            if let Some(native) = negotiate::mode_within_group(mode, &chain.config.mode_group) {
                if chain.config.present_mode != native {
                    wsi_debug!(SOURCE, "Seamless present-mode switch to {:?}", native);
                    chain.config.present_mode = native;
                }
                return;
            }
        }
        self.schedule_rebuild();
    }

    /// Backbuffer format is a preference, not a contract: unsupported
    /// requests are downgraded during negotiation instead of failing.
    pub fn set_backbuffer_format(&mut self, format: BackbufferFormat) {
        if self.request.format != format {
            self.request.format = format;
            self.schedule_rebuild();
        }
    }

    pub fn set_extra_usage(&mut self, usage: ImageUsage) {
        if self.request.extra_usage != usage {
            self.request.extra_usage = usage;
            self.schedule_rebuild();
        }
    }

    pub fn set_compression(&mut self, compression: CompressionMode) {
        if self.request.compression != compression {
            self.request.compression = compression;
            self.schedule_rebuild();
        }
    }

    /// Presentation-side low-latency intent: run the present queue at its
    /// minimum depth.
    pub fn set_low_latency_present(&mut self, enabled: bool) {
        if self.request.low_latency_present != enabled {
            self.request.low_latency_present = enabled;
            self.latency.set_low_latency_present(enabled);
            self.schedule_rebuild();
        }
    }

    /// Submission-side low-latency toggle: engages the vendor hook
    /// protocol without touching the chain.
    pub fn set_low_latency_submit(&mut self, enabled: bool) {
        if self.low_latency_submit != enabled {
            self.low_latency_submit = enabled;
            if let Some(chain) = self.chain.as_ref() {
                self.hooks
                    .configure(chain.handle, enabled, self.latency.low_latency_present());
            }
        }
    }

    pub fn set_duplicate_aware(&mut self, enabled: bool) {
        if self.request.duplicate_aware != enabled {
            self.request.duplicate_aware = enabled;
            self.schedule_rebuild();
        }
    }

    /// Declare the next present a duplicate of the previous content; it
    /// will not advance the present identifier.
    pub fn mark_duplicate_frame(&mut self) {
        if self.request.duplicate_aware {
            self.latency.mark_next_duplicate();
        } else {
            wsi_warn!(SOURCE, "Duplicate mark ignored, duplicate-awareness is off");
        }
    }

    pub fn set_window_title(&mut self, title: &str) {
        self.platform.set_window_title(title);
    }

    // ===== QUERIES =====

    pub fn chain_description(&self) -> Option<ChainDescription> {
        self.chain
            .as_ref()
            .map(|chain| ChainDescription::of(chain, self.platform.aspect_ratio()))
    }

    pub fn smooth_frame_time(&self) -> f64 {
        self.smooth_frame_time
    }

    pub fn smooth_elapsed_time(&self) -> f64 {
        self.smooth_elapsed_time
    }

    /// Rough CPU-to-photon estimate; `None` before the first chain exists.
    pub fn estimated_video_latency(&self) -> Option<f64> {
        let chain = self.chain.as_ref()?;
        Some(self.latency.estimated_video_latency(
            chain.image_count() as u32,
            self.platform.estimated_frame_presentation_duration(),
        ))
    }

    pub fn estimated_refresh_interval(&self) -> f64 {
        self.platform.estimated_frame_presentation_duration()
    }

    pub fn present_id(&self) -> u64 {
        self.latency.next_present_id()
    }

    pub fn frames_duplicated(&self) -> u64 {
        self.latency.total_duplicated()
    }

    #[doc(hidden)]
    pub fn retired_generations(&self) -> usize {
        self.reclaimer.retired_generations()
    }

    // ===== INTERNALS =====

    fn drain_events(&mut self) {
        for event in self.events.drain() {
            match event {
                PlatformEvent::Resized(extent) => self.pending_resize = Some(extent),
                // The proxy already latched the teardown flag.
                PlatformEvent::CloseRequested => {}
                PlatformEvent::SurfaceInvalidated => {
                    if let Some(chain) = self.chain.as_mut() {
                        chain.needs_rebuild = true;
                    }
                }
            }
        }
    }

    fn acquire_loop(&mut self) -> bool {
        let mut attempts = 0;
        loop {
            let handle = match self.chain.as_ref() {
                Some(chain) => chain.handle,
                None => {
                    self.platform.poll_input();
                    return false;
                }
            };

            self.present_wait_gate();
            let upcoming_id = self.latency.next_present_id() + 1;
            self.hooks.sleep(handle);
            self.hooks.marker(handle, LatencyMarker::InputSample, upcoming_id);

            let acquire_semaphore = match self.request_acquire_semaphore() {
                Ok(semaphore) => semaphore,
                Err(_) => {
                    self.platform.poll_input();
                    return false;
                }
            };

            match self.engine.acquire(handle, acquire_semaphore) {
                AcquireOutcome::Acquired { index, suboptimal } => {
                    self.adopt_acquired(index, suboptimal, acquire_semaphore);
                    self.hooks
                        .marker(handle, LatencyMarker::SimulationStart, upcoming_id);
                    return true;
                }
                AcquireOutcome::Stale => {
                    // No signal was enqueued on a failed acquire.
                    self.engine.destroy_semaphore(acquire_semaphore);
                    attempts += 1;
                    if attempts >= MAX_ACQUIRE_ATTEMPTS {
                        wsi_error!(SOURCE, "Surface stayed stale after {} rebuilds", attempts);
                        self.platform.poll_input();
                        return false;
                    }
                    wsi_warn!(SOURCE, "Stale surface during acquire, rebuilding");
                    self.retire_current_generation(None);
                    let extent = self.last_extent;
                    if !self.blocking_rebuild(extent) {
                        self.platform.poll_input();
                        return false;
                    }
                }
                AcquireOutcome::Error => {
                    self.engine.destroy_semaphore(acquire_semaphore);
                    wsi_error!(SOURCE, "Failed to acquire swapchain image");
                    // Input is still polled once so a shutdown request is
                    // never missed.
                    self.platform.poll_input();
                    return false;
                }
            }
        }
    }

    fn adopt_acquired(&mut self, index: u32, suboptimal: bool, acquire: SemaphoreHandle) {
        if let Some(chain) = self.chain.as_mut() {
            if suboptimal {
                wsi_debug!(SOURCE, "Suboptimal acquire, flagging rebuild");
                chain.needs_rebuild = true;
            }
            if let Some(slot) = chain.slots.get_mut(index as usize) {
                // The previous semaphore of this slot was either retired at
                // present time or, having been signalled and never waited,
                // is safe to drop here.
                if let Some(stale) = slot.acquire.replace(acquire) {
                    self.engine.destroy_semaphore(stale);
                }
            }
        }
        self.acquired = Some(AcquiredFrame {
            index,
            ticket_taken: false,
        });

        let (frame_time, elapsed) = self.platform.tick_frame();
        self.smooth_frame_time = frame_time;
        self.smooth_elapsed_time = elapsed;

        // Poll after acquire for optimal latency.
        self.platform.poll_input();
        if let Some(listener) = self.listener.as_mut() {
            listener.frame_tick(frame_time, elapsed);
        }
    }

    /// Block until the display confirms enough of the queue, bounding how
    /// many frames the CPU may race ahead.
    fn present_wait_gate(&mut self) {
        let caps = self.engine.capabilities();
        if !caps.present_wait || !caps.present_id {
            return;
        }
        let handle = match self.chain.as_ref() {
            Some(chain) => {
                let vsync = matches!(
                    chain.config.present_mode,
                    NativePresentMode::Fifo | NativePresentMode::FifoRelaxed
                );
                if !vsync {
                    return;
                }
                chain.handle
            }
            None => return,
        };
        if let Some(target) = self.latency.wait_target() {
            if self
                .engine
                .wait_for_present(handle, target, crate::latency::PRESENT_WAIT_TIMEOUT_NS)
            {
                self.latency.confirm(target);
            }
        }
    }

    fn present_acquired(&mut self, index: u32) -> bool {
        let caps = self.engine.capabilities();

        let (handle, release, retired_acquire, mode_in_group) = {
            let chain = match self.chain.as_mut() {
                Some(chain) => chain,
                None => return true,
            };
            let slot = match chain.slots.get_mut(index as usize) {
                Some(slot) => slot,
                None => return true,
            };
            let release = match slot.release {
                Some(semaphore) => semaphore,
                None => {
                    wsi_error!(SOURCE, "Present without a release semaphore");
                    return false;
                }
            };
            // With present fences the consumed sync objects are retired and
            // replaced; without them the release semaphore is reused and
            // the acquire semaphore goes through the delayed recycle ring.
            let retired_acquire = slot.acquire.take();
            if caps.present_fence {
                slot.release = None;
            }
            (
                chain.handle,
                release,
                retired_acquire,
                chain.config.mode_group.len() > 1,
            )
        };

        // The identifier advances on genuine presents regardless of
        // whether the device can consume it.
        let genuine_id = self.latency.register_present();
        let present_id = if caps.present_id { genuine_id } else { None };
        let present_fence = if caps.present_fence {
            self.engine.create_fence().ok()
        } else {
            None
        };
        let present_mode = if caps.seamless_mode_switch && mode_in_group {
            self.chain.as_ref().map(|chain| chain.config.present_mode)
        } else {
            None
        };

        let marker_id = genuine_id.unwrap_or_else(|| self.latency.next_present_id());
        self.hooks
            .marker(handle, LatencyMarker::SimulationEnd, marker_id);
        self.hooks
            .marker(handle, LatencyMarker::RenderSubmitEnd, marker_id);
        self.hooks
            .marker(handle, LatencyMarker::PresentStart, marker_id);

        let outcome = self.engine.present(&PresentRequest {
            chain: handle,
            image_index: index,
            wait: release,
            present_id,
            present_fence,
            present_mode,
        });

        self.hooks
            .marker(handle, LatencyMarker::PresentEnd, marker_id);

        // Sync-object retirement. The release object may still be
        // referenced by the display engine, so it is never destroyed here.
        if caps.present_fence {
            let mut semaphores = vec![release];
            if let Some(acquire) = retired_acquire {
                semaphores.push(acquire);
            }
            self.reclaimer.retire_sync(crate::reclaim::RetiredSync {
                chain: handle,
                semaphores,
                fence: present_fence,
            });
        } else if let Some(acquire) = retired_acquire {
            self.recycle_ring.push_back(acquire);
        }

        match outcome {
            PresentOutcome::Presented { suboptimal } => {
                if suboptimal {
                    if let Some(chain) = self.chain.as_mut() {
                        chain.needs_rebuild = true;
                    }
                }
                true
            }
            PresentOutcome::Stale => {
                wsi_warn!(SOURCE, "Stale surface during present, rebuilding next frame");
                self.retire_current_generation(None);
                true
            }
            PresentOutcome::Error => {
                wsi_error!(SOURCE, "Failed to present swapchain image");
                self.retire_current_generation(None);
                false
            }
        }
    }

    fn retire_current_generation(&mut self, proof: Option<crate::types::FenceHandle>) {
        if let Some(generation) = self.chain.take() {
            if let Some(listener) = self.listener.as_mut() {
                listener.chain_destroyed();
            }
            chain::retire_generation(self.engine.as_mut(), &mut self.reclaimer, generation, proof);
        }
    }

    /// Fenceless acquire semaphores come from a delayed recycle ring
    /// instead of being created fresh each frame.
    fn request_acquire_semaphore(&mut self) -> Result<SemaphoreHandle> {
        let depth = self
            .chain
            .as_ref()
            .map(|chain| chain.image_count())
            .unwrap_or(0);
        if self.recycle_ring.len() > depth {
            if let Some(semaphore) = self.recycle_ring.pop_front() {
                return Ok(semaphore);
            }
        }
        self.engine.create_semaphore()
    }

    fn schedule_rebuild(&mut self) {
        if self.acquired.is_none() && self.chain.is_some() {
            let extent = self.last_extent;
            if !self.blocking_rebuild(extent) {
                wsi_warn!(SOURCE, "Deferred rebuild after configuration change failed");
                self.pending_rebuild = true;
            }
        } else {
            self.pending_rebuild = true;
        }
    }

    /// Build (or rebuild) the chain, blocking while the surface is
    /// minimized. Hard errors retry up to three times with an idle drain
    /// between attempts; a degenerate surface polls input at 10 ms
    /// intervals until it comes back.
    fn blocking_rebuild(&mut self, extent: Extent) -> bool {
        let mut extent = extent;
        let mut retries = 0;
        loop {
            if self.events.teardown_requested() || !self.platform.alive() {
                return false;
            }
            match self.rebuild_once(extent) {
                Ok(()) => return true,
                Err(SwapchainError::DeviceError) => {
                    retries += 1;
                    if retries > MAX_BUILD_RETRIES {
                        wsi_error!(SOURCE, "Swapchain creation failed {} times", retries);
                        return false;
                    }
                    // Try not to reuse the half-built chain.
                    self.engine.wait_idle();
                    self.retire_current_generation(None);
                }
                Err(SwapchainError::NoSurface) => {
                    // Minimized surface: block-and-poll until a live resize
                    // arrives. Events are drained here so a shutdown posted
                    // from the event thread still gets through.
                    self.drain_events();
                    self.platform.poll_input();
                    std::thread::sleep(NO_SURFACE_POLL);
                    extent = self
                        .pending_resize
                        .take()
                        .unwrap_or_else(|| self.platform.surface_extent());
                }
            }
        }
    }

    fn rebuild_once(&mut self, extent: Extent) -> std::result::Result<(), SwapchainError> {
        let mut request = self.request.clone();
        request.extent = extent;

        let config = negotiate::negotiate(self.engine.as_mut(), &request)?;

        let previous = self.chain.take();
        if previous.is_some() {
            if let Some(listener) = self.listener.as_mut() {
                listener.chain_destroyed();
            }
        }

        let generation =
            chain::build_generation(self.engine.as_mut(), &mut self.reclaimer, config, previous)?;

        self.last_extent = generation.config.extent;
        self.latency.on_chain_rebuilt();
        self.hooks.configure(
            generation.handle,
            self.low_latency_submit,
            self.latency.low_latency_present(),
        );
        if let Some(listener) = self.listener.as_mut() {
            let description = ChainDescription::of(&generation, self.platform.aspect_ratio());
            listener.chain_created(&description);
        }
        self.chain = Some(generation);
        self.acquired = None;
        // Whatever was pending is now built.
        self.pending_rebuild = false;
        Ok(())
    }
}

impl Drop for Wsi {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
#[path = "wsi_tests.rs"]
mod tests;
