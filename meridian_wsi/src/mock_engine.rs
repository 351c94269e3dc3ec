//! Mock display engine and platform for unit tests (no GPU required)
//!
//! Drives the sequencer, builder, and reclaimer state machines without a
//! native layer. Acquire/present outcomes can be scripted per call;
//! everything is recorded for assertions.

use std::collections::{HashMap, VecDeque};

use crate::caps::{DeviceCapabilities, SurfaceProperties};
use crate::chain::{ChainConfig, ChainDescription};
use crate::display::{
    AcquireOutcome, CreatedChain, DisplayEngine, PresentOutcome, PresentRequest,
};
use crate::error::{Error, Result};
use crate::platform::{ChainListener, WsiPlatform};
use crate::timer::FrameTimer;
use crate::types::{
    ChainHandle, ColorSpace, CompositeAlphaSupport, CompressionMode, Extent, FenceHandle,
    ImageHandle, ImageUsage, ModeGroup, NativePresentMode, PixelFormat, SemaphoreHandle,
    SurfaceHandle, SurfaceRotation,
};

/// Surface snapshot with sensible desktop defaults.
pub fn test_surface(extent: Extent) -> SurfaceProperties {
    SurfaceProperties {
        current_extent: Some(extent),
        min_extent: Extent::new(1, 1),
        max_extent: Extent::new(16384, 16384),
        min_images: 2,
        max_images: 8,
        current_rotation: SurfaceRotation::Identity,
        supports_identity_rotation: true,
        composite_alpha: CompositeAlphaSupport::OPAQUE,
        formats: vec![
            (PixelFormat::B8G8R8A8_SRGB, ColorSpace::SrgbNonlinear),
            (PixelFormat::B8G8R8A8_UNORM, ColorSpace::SrgbNonlinear),
            (PixelFormat::R8G8B8A8_SRGB, ColorSpace::SrgbNonlinear),
        ],
        present_modes: vec![
            NativePresentMode::Fifo,
            NativePresentMode::Mailbox,
            NativePresentMode::Immediate,
        ],
        fixed_rate_compression: false,
    }
}

pub struct MockDisplayEngine {
    pub caps: DeviceCapabilities,
    pub surface: SurfaceProperties,

    /// Degenerate (minimized) surface reported for this many queries.
    pub degenerate_queries: u32,

    /// Scripted acquire outcomes consumed before the default round-robin.
    pub scripted_acquires: VecDeque<AcquireOutcome>,

    /// Scripted present outcomes consumed before the default success.
    pub scripted_presents: VecDeque<PresentOutcome>,

    /// Fail this many chain creations before succeeding.
    pub failing_creates: u32,

    /// Compatibility groups per mode (used when seamless switch is on).
    pub compat_groups: HashMap<NativePresentMode, Vec<NativePresentMode>>,

    /// Per-mode minimum image counts (defaults to the surface minimum).
    pub mode_min_images: HashMap<NativePresentMode, u32>,

    /// Formats rejected by the feature-bit query regardless of usage.
    pub unsupported_usage_formats: Vec<PixelFormat>,

    /// Newly created fences signal immediately unless listed here.
    pub pending_fences: Vec<FenceHandle>,

    pub present_support: bool,

    // Recording
    pub created_chains: Vec<(ChainConfig, Option<ChainHandle>)>,
    pub destroyed_chains: Vec<ChainHandle>,
    pub acquire_calls: u32,
    pub presents: Vec<PresentRequest>,
    pub wait_for_present_calls: Vec<u64>,
    pub wait_idle_calls: u32,
    pub forced_fence_waits: u32,
    pub live_semaphores: u32,
    pub live_fences: u32,

    next_handle: u64,
    chain_image_count: u32,
    acquire_cursor: u32,
}

impl MockDisplayEngine {
    pub fn new() -> Self {
        Self {
            caps: DeviceCapabilities::default(),
            surface: test_surface(Extent::new(1280, 720)),
            degenerate_queries: 0,
            scripted_acquires: VecDeque::new(),
            scripted_presents: VecDeque::new(),
            failing_creates: 0,
            compat_groups: HashMap::new(),
            mode_min_images: HashMap::new(),
            unsupported_usage_formats: Vec::new(),
            pending_fences: Vec::new(),
            present_support: true,
            created_chains: Vec::new(),
            destroyed_chains: Vec::new(),
            acquire_calls: 0,
            presents: Vec::new(),
            wait_for_present_calls: Vec::new(),
            wait_idle_calls: 0,
            forced_fence_waits: 0,
            live_semaphores: 0,
            live_fences: 0,
            next_handle: 1,
            chain_image_count: 0,
            acquire_cursor: 0,
        }
    }

    fn fresh_handle(&mut self) -> u64 {
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }
}

impl Default for MockDisplayEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayEngine for MockDisplayEngine {
    fn capabilities(&self) -> DeviceCapabilities {
        self.caps
    }

    fn surface_present_supported(&self) -> Result<bool> {
        Ok(self.present_support)
    }

    fn query_surface(&mut self, _compression: CompressionMode) -> Result<SurfaceProperties> {
        if self.degenerate_queries > 0 {
            self.degenerate_queries -= 1;
            let mut degenerate = self.surface.clone();
            degenerate.max_extent = Extent::ZERO;
            return Ok(degenerate);
        }
        Ok(self.surface.clone())
    }

    fn compatible_present_modes(&mut self, mode: NativePresentMode) -> ModeGroup {
        match self.compat_groups.get(&mode) {
            Some(members) => {
                let mut group = ModeGroup::empty();
                for member in members {
                    group.push(*member);
                }
                group
            }
            None => ModeGroup::single(mode),
        }
    }

    fn min_images_for_mode(&mut self, mode: NativePresentMode) -> u32 {
        self.mode_min_images
            .get(&mode)
            .copied()
            .unwrap_or(self.surface.min_images)
    }

    fn format_supports_usage(&self, format: PixelFormat, _usage: ImageUsage) -> bool {
        !self.unsupported_usage_formats.contains(&format)
    }

    fn create_chain(
        &mut self,
        config: &ChainConfig,
        old: Option<ChainHandle>,
    ) -> Result<CreatedChain> {
        if self.failing_creates > 0 {
            self.failing_creates -= 1;
            return Err(Error::BackendError("scripted create failure".to_string()));
        }
        self.created_chains.push((config.clone(), old));
        let handle = ChainHandle(self.fresh_handle());
        let images = (0..config.image_count)
            .map(|_| ImageHandle(self.fresh_handle()))
            .collect();
        self.chain_image_count = config.image_count;
        self.acquire_cursor = 0;
        Ok(CreatedChain { handle, images })
    }

    fn destroy_chain(&mut self, chain: ChainHandle) {
        self.destroyed_chains.push(chain);
    }

    fn acquire(&mut self, _chain: ChainHandle, _signal: SemaphoreHandle) -> AcquireOutcome {
        self.acquire_calls += 1;
        if let Some(outcome) = self.scripted_acquires.pop_front() {
            return outcome;
        }
        let index = self.acquire_cursor;
        self.acquire_cursor = (self.acquire_cursor + 1) % self.chain_image_count.max(1);
        AcquireOutcome::Acquired {
            index,
            suboptimal: false,
        }
    }

    fn present(&mut self, request: &PresentRequest) -> PresentOutcome {
        self.presents.push(*request);
        self.scripted_presents
            .pop_front()
            .unwrap_or(PresentOutcome::Presented { suboptimal: false })
    }

    fn create_semaphore(&mut self) -> Result<SemaphoreHandle> {
        self.live_semaphores += 1;
        Ok(SemaphoreHandle(self.fresh_handle()))
    }

    fn destroy_semaphore(&mut self, _semaphore: SemaphoreHandle) {
        self.live_semaphores = self.live_semaphores.saturating_sub(1);
    }

    fn create_fence(&mut self) -> Result<FenceHandle> {
        self.live_fences += 1;
        Ok(FenceHandle(self.fresh_handle()))
    }

    fn destroy_fence(&mut self, _fence: FenceHandle) {
        self.live_fences = self.live_fences.saturating_sub(1);
    }

    fn fence_signalled(&mut self, fence: FenceHandle) -> bool {
        !self.pending_fences.contains(&fence)
    }

    fn wait_fence(&mut self, fence: FenceHandle, _timeout_ns: u64) -> bool {
        self.forced_fence_waits += 1;
        self.pending_fences.retain(|pending| *pending != fence);
        true
    }

    fn wait_for_present(
        &mut self,
        _chain: ChainHandle,
        present_id: u64,
        _timeout_ns: u64,
    ) -> bool {
        self.wait_for_present_calls.push(present_id);
        true
    }

    fn wait_idle(&mut self) {
        self.wait_idle_calls += 1;
    }

    fn release_surface(&mut self) {}

    fn adopt_surface(&mut self, _surface: SurfaceHandle) {}
}

// ============================================================================
// Mock platform
// ============================================================================

pub struct MockPlatform {
    pub extent: Extent,
    pub alive: bool,
    pub resize_pending: bool,
    pub poll_count: u32,
    pub timer: FrameTimer,
}

impl MockPlatform {
    pub fn new(extent: Extent) -> Self {
        Self {
            extent,
            alive: true,
            resize_pending: false,
            poll_count: 0,
            timer: FrameTimer::new(),
        }
    }
}

impl WsiPlatform for MockPlatform {
    fn surface_extent(&self) -> Extent {
        self.extent
    }

    fn alive(&self) -> bool {
        self.alive
    }

    fn poll_input(&mut self) {
        self.poll_count += 1;
    }

    fn should_resize(&self) -> bool {
        self.resize_pending
    }

    fn acknowledge_resize(&mut self) {
        self.resize_pending = false;
    }

    fn tick_frame(&mut self) -> (f64, f64) {
        let delta = self.timer.frame();
        (delta, self.timer.elapsed())
    }

    fn tick_frame_external(&mut self, frame_time: f64) -> (f64, f64) {
        let delta = self.timer.frame_external(frame_time);
        (delta, self.timer.elapsed())
    }

    fn reset_frame_timer(&mut self) {
        self.timer.reset();
    }
}

// ============================================================================
// Shared wrappers
// ============================================================================
//
// `Wsi` takes ownership of its engine and platform; tests keep a second
// handle through these delegating wrappers to script behavior and inspect
// recordings mid-run.

use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Clone)]
pub struct SharedEngine(pub Arc<Mutex<MockDisplayEngine>>);

impl SharedEngine {
    pub fn new(engine: MockDisplayEngine) -> Self {
        Self(Arc::new(Mutex::new(engine)))
    }

    pub fn lock(&self) -> parking_lot::MutexGuard<'_, MockDisplayEngine> {
        self.0.lock()
    }
}

impl DisplayEngine for SharedEngine {
    fn capabilities(&self) -> DeviceCapabilities {
        self.0.lock().capabilities()
    }

    fn surface_present_supported(&self) -> Result<bool> {
        self.0.lock().surface_present_supported()
    }

    fn query_surface(&mut self, compression: CompressionMode) -> Result<SurfaceProperties> {
        self.0.lock().query_surface(compression)
    }

    fn compatible_present_modes(&mut self, mode: NativePresentMode) -> ModeGroup {
        self.0.lock().compatible_present_modes(mode)
    }

    fn min_images_for_mode(&mut self, mode: NativePresentMode) -> u32 {
        self.0.lock().min_images_for_mode(mode)
    }

    fn format_supports_usage(&self, format: PixelFormat, usage: ImageUsage) -> bool {
        self.0.lock().format_supports_usage(format, usage)
    }

    fn create_chain(
        &mut self,
        config: &ChainConfig,
        old: Option<ChainHandle>,
    ) -> Result<CreatedChain> {
        self.0.lock().create_chain(config, old)
    }

    fn destroy_chain(&mut self, chain: ChainHandle) {
        self.0.lock().destroy_chain(chain)
    }

    fn acquire(&mut self, chain: ChainHandle, signal: SemaphoreHandle) -> AcquireOutcome {
        self.0.lock().acquire(chain, signal)
    }

    fn present(&mut self, request: &PresentRequest) -> PresentOutcome {
        self.0.lock().present(request)
    }

    fn create_semaphore(&mut self) -> Result<SemaphoreHandle> {
        self.0.lock().create_semaphore()
    }

    fn destroy_semaphore(&mut self, semaphore: SemaphoreHandle) {
        self.0.lock().destroy_semaphore(semaphore)
    }

    fn create_fence(&mut self) -> Result<FenceHandle> {
        self.0.lock().create_fence()
    }

    fn destroy_fence(&mut self, fence: FenceHandle) {
        self.0.lock().destroy_fence(fence)
    }

    fn fence_signalled(&mut self, fence: FenceHandle) -> bool {
        self.0.lock().fence_signalled(fence)
    }

    fn wait_fence(&mut self, fence: FenceHandle, timeout_ns: u64) -> bool {
        self.0.lock().wait_fence(fence, timeout_ns)
    }

    fn wait_for_present(&mut self, chain: ChainHandle, present_id: u64, timeout_ns: u64) -> bool {
        self.0.lock().wait_for_present(chain, present_id, timeout_ns)
    }

    fn wait_idle(&mut self) {
        self.0.lock().wait_idle()
    }

    fn release_surface(&mut self) {
        self.0.lock().release_surface()
    }

    fn adopt_surface(&mut self, surface: SurfaceHandle) {
        self.0.lock().adopt_surface(surface)
    }
}

#[derive(Clone)]
pub struct SharedPlatform(pub Arc<Mutex<MockPlatform>>);

impl SharedPlatform {
    pub fn new(platform: MockPlatform) -> Self {
        Self(Arc::new(Mutex::new(platform)))
    }

    pub fn lock(&self) -> parking_lot::MutexGuard<'_, MockPlatform> {
        self.0.lock()
    }
}

impl WsiPlatform for SharedPlatform {
    fn surface_extent(&self) -> Extent {
        self.0.lock().surface_extent()
    }

    fn alive(&self) -> bool {
        self.0.lock().alive()
    }

    fn poll_input(&mut self) {
        self.0.lock().poll_input()
    }

    fn should_resize(&self) -> bool {
        self.0.lock().should_resize()
    }

    fn acknowledge_resize(&mut self) {
        self.0.lock().acknowledge_resize()
    }

    fn tick_frame(&mut self) -> (f64, f64) {
        self.0.lock().tick_frame()
    }

    fn tick_frame_external(&mut self, frame_time: f64) -> (f64, f64) {
        self.0.lock().tick_frame_external(frame_time)
    }

    fn reset_frame_timer(&mut self) {
        self.0.lock().reset_frame_timer()
    }
}

// ============================================================================
// Recording chain listener
// ============================================================================

#[derive(Default)]
pub struct RecordingListener {
    pub created: Vec<ChainDescription>,
    pub destroyed: u32,
    pub ticks: u32,
}

impl ChainListener for RecordingListener {
    fn chain_created(&mut self, description: &ChainDescription) {
        self.created.push(description.clone());
    }

    fn chain_destroyed(&mut self) {
        self.destroyed += 1;
    }

    fn frame_tick(&mut self, _frame_time: f64, _elapsed_time: f64) {
        self.ticks += 1;
    }
}

#[derive(Clone, Default)]
pub struct SharedListener(pub Arc<Mutex<RecordingListener>>);

impl SharedListener {
    pub fn lock(&self) -> parking_lot::MutexGuard<'_, RecordingListener> {
        self.0.lock()
    }
}

impl ChainListener for SharedListener {
    fn chain_created(&mut self, description: &ChainDescription) {
        self.0.lock().chain_created(description)
    }

    fn chain_destroyed(&mut self) {
        self.0.lock().chain_destroyed()
    }

    fn frame_tick(&mut self, frame_time: f64, elapsed_time: f64) {
        self.0.lock().frame_tick(frame_time, elapsed_time)
    }
}
