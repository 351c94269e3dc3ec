//! Display engine seam
//!
//! `DisplayEngine` is the boundary between the backend-agnostic sequencer
//! and the native layer (instance/device handles, swapchain entry points,
//! sync primitives). The Vulkan implementation lives in the
//! `meridian_wsi_vulkan` crate; tests drive the sequencer through a mock.

use crate::caps::{DeviceCapabilities, SurfaceProperties};
use crate::chain::ChainConfig;
use crate::error::Result;
use crate::types::{
    ChainHandle, CompressionMode, FenceHandle, ImageHandle, ImageUsage, ModeGroup,
    NativePresentMode, PixelFormat, SemaphoreHandle, SurfaceHandle,
};

/// Outcome of a native acquire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// An image was handed out. `suboptimal` flags a chain that still
    /// works but should be rebuilt at the next opportunity.
    Acquired { index: u32, suboptimal: bool },

    /// The chain no longer matches the surface (out of date / surface
    /// lost). The current generation must be retired and rebuilt.
    Stale,

    /// Hard failure with no retry path.
    Error,
}

/// Outcome of a native present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentOutcome {
    Presented { suboptimal: bool },
    Stale,
    Error,
}

/// One present submission.
#[derive(Debug, Clone, Copy)]
pub struct PresentRequest {
    pub chain: ChainHandle,
    pub image_index: u32,

    /// The image's release semaphore, signalled by the GPU work that
    /// produced the frame.
    pub wait: SemaphoreHandle,

    /// Attached only when the present-id capability is available and the
    /// present genuinely advances display (never for duplicates).
    pub present_id: Option<u64>,

    /// Attached only when the present-fence capability is available;
    /// its signal proves the wait semaphore and chain may be retired.
    pub present_fence: Option<FenceHandle>,

    /// Explicit per-present mode, used to exercise a seamless mode switch
    /// within the negotiated compatibility group.
    pub present_mode: Option<NativePresentMode>,
}

/// Result of materializing a chain.
#[derive(Debug, Clone)]
pub struct CreatedChain {
    pub handle: ChainHandle,
    pub images: Vec<ImageHandle>,
}

/// The native layer as consumed by the WSI.
///
/// Everything here is synchronous. `acquire` may block for an unbounded
/// time, `wait_fence` and `wait_for_present` for the given bound; all
/// other methods are non-blocking besides `wait_idle`.
pub trait DisplayEngine: Send {
    /// Immutable capability snapshot taken at device init. Returned by
    /// value; the snapshot is a handful of booleans.
    fn capabilities(&self) -> DeviceCapabilities;

    /// Whether the present queue family can present to the surface.
    fn surface_present_supported(&self) -> Result<bool>;

    /// Snapshot the surface state for one negotiation pass.
    fn query_surface(&mut self, compression: CompressionMode) -> Result<SurfaceProperties>;

    /// Present modes that can replace `mode` without recreating the chain.
    /// Always contains `mode` itself. Meaningless (single-entry) when the
    /// seamless-mode-switch capability is absent.
    fn compatible_present_modes(&mut self, mode: NativePresentMode) -> ModeGroup;

    /// Minimum image count the surface demands for `mode`.
    fn min_images_for_mode(&mut self, mode: NativePresentMode) -> u32;

    /// Whether `format` supports the attachment-usage feature bits implied
    /// by `usage` for presentable images.
    fn format_supports_usage(&self, format: PixelFormat, usage: ImageUsage) -> bool;

    /// Materialize a chain, passing the previous generation's handle so
    /// the driver can recycle resources. The old handle stays valid for
    /// deferred destruction.
    fn create_chain(&mut self, config: &ChainConfig, old: Option<ChainHandle>)
        -> Result<CreatedChain>;

    fn destroy_chain(&mut self, chain: ChainHandle);

    /// Acquire the next image, signalling `signal` when the image is
    /// ready for GPU writes. Unbounded timeout.
    fn acquire(&mut self, chain: ChainHandle, signal: SemaphoreHandle) -> AcquireOutcome;

    fn present(&mut self, request: &PresentRequest) -> PresentOutcome;

    fn create_semaphore(&mut self) -> Result<SemaphoreHandle>;
    fn destroy_semaphore(&mut self, semaphore: SemaphoreHandle);

    fn create_fence(&mut self) -> Result<FenceHandle>;
    fn destroy_fence(&mut self, fence: FenceHandle);

    /// Non-blocking signal probe.
    fn fence_signalled(&mut self, fence: FenceHandle) -> bool;

    /// Bounded wait; returns whether the fence signalled in time.
    fn wait_fence(&mut self, fence: FenceHandle, timeout_ns: u64) -> bool;

    /// Block until the display engine confirms `present_id` (present-wait
    /// capability). Returns whether confirmation arrived within the bound.
    fn wait_for_present(&mut self, chain: ChainHandle, present_id: u64, timeout_ns: u64) -> bool;

    /// Hard device-idle drain. Teardown and fenceless-retirement paths only.
    fn wait_idle(&mut self);

    /// Drop the current surface (pause). The chain must already be retired.
    fn release_surface(&mut self);

    /// Adopt a new surface after a pause (resume).
    fn adopt_surface(&mut self, surface: SurfaceHandle);
}
