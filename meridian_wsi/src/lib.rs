/*!
# Meridian WSI

Swapchain lifecycle manager and frame-pacing/latency controller.

This crate is the backend-agnostic core: it owns the capability
negotiation, the chain build/rebuild state machine, the per-frame
acquire→submit→present cycle, presentation-latency bounding, and the
deferred reclamation of retired chain generations. The native layer is
reached exclusively through the [`DisplayEngine`] trait; the Vulkan
implementation lives in the `meridian_wsi_vulkan` crate.

## Architecture

- **[`Wsi`]**: the facade the application frame loop drives
- **[`DisplayEngine`]**: seam to the native swapchain/sync primitives
- **[`WsiPlatform`]**: seam to the OS surface, timer, and input pump
- **[`negotiate`]**: preferences + surface snapshot → chain configuration
- **[`LatencyController`]**: present-id accounting and the wait gate
- **[`DeferredReclaimer`]**: fence-proven destruction of retired objects
*/

pub mod caps;
pub mod chain;
pub mod display;
pub mod error;
pub mod events;
pub mod latency;
pub mod log;
pub mod negotiate;
pub mod platform;
pub mod reclaim;
pub mod timer;
pub mod types;
pub mod wsi;

#[cfg(test)]
pub mod mock_engine;

pub use caps::{DeviceCapabilities, SurfaceProperties};
pub use chain::{ChainConfig, ChainDescription, ChainGeneration, FrameSlot};
pub use display::{
    AcquireOutcome, CreatedChain, DisplayEngine, PresentOutcome, PresentRequest,
};
pub use error::{Error, Result, SwapchainError};
pub use events::{EventProxy, EventQueue, PlatformEvent};
pub use latency::{
    LatencyController, LatencyHooks, LatencyMarker, NoopLatencyHooks, DEFAULT_FRAME_LATENCY,
};
pub use negotiate::{negotiate, ChainRequest, IMAGE_COUNT_ENV};
pub use platform::{ChainListener, WsiPlatform};
pub use reclaim::{DeferredReclaimer, RetiredGeneration, RetiredSync, MAX_RETIRED_GENERATIONS};
pub use timer::FrameTimer;
pub use types::{
    BackbufferFormat, ChainHandle, ColorSpace, CompositeAlphaMode, CompositeAlphaSupport,
    CompressionMode, Extent, FenceHandle, ImageHandle, ImageUsage, ModeGroup, NativePresentMode,
    PixelFormat, PresentMode, SemaphoreHandle, SurfaceHandle, SurfaceRotation,
};
pub use wsi::{AcquireTicket, Wsi};
