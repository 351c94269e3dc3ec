//! Capability snapshots
//!
//! Optional-extension support is collected once at device init into an
//! immutable `DeviceCapabilities` value instead of being re-checked at each
//! call site. Surface state is snapshotted per negotiation into
//! `SurfaceProperties`.

use crate::types::{
    ColorSpace, CompositeAlphaSupport, Extent, NativePresentMode, PixelFormat, SurfaceRotation,
};

/// Immutable snapshot of the optional device capabilities the sequencer,
/// negotiator, and latency controller consult.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeviceCapabilities {
    /// Display-confirmed present completion can be waited on (present-wait)
    pub present_wait: bool,

    /// Monotonic present identifiers can be attached to presents
    pub present_id: bool,

    /// Present modes within a compatibility group can be switched without
    /// recreating the chain
    pub seamless_mode_switch: bool,

    /// A fence can be attached to a present to prove retirement of the
    /// wait semaphore and chain
    pub present_fence: bool,

    /// Fixed-rate compression of chain images can be controlled
    pub compression_control: bool,

    /// Vendor low-latency marker/sleep protocol is available
    pub low_latency_hooks: bool,

    /// Application-controlled exclusive fullscreen access is available
    pub exclusive_fullscreen_control: bool,
}

/// Snapshot of surface state taken by a single negotiation pass.
///
/// Refreshed whenever configuration changes and no frame is in flight; the
/// negotiator never queries the native layer piecemeal.
#[derive(Debug, Clone)]
pub struct SurfaceProperties {
    /// Extent the surface currently reports, or `None` when the surface
    /// lets the chain decide (special "undefined" native value)
    pub current_extent: Option<Extent>,

    pub min_extent: Extent,
    pub max_extent: Extent,

    pub min_images: u32,
    /// Zero means unbounded
    pub max_images: u32,

    /// Rotation the surface demands of presented images
    pub current_rotation: SurfaceRotation,

    /// Whether the identity transform is available at all
    pub supports_identity_rotation: bool,

    pub composite_alpha: CompositeAlphaSupport,

    /// Supported (format, color space) pairs in surface order
    pub formats: Vec<(PixelFormat, ColorSpace)>,

    /// Supported present modes, unknown native modes already dropped
    pub present_modes: Vec<NativePresentMode>,

    /// Whether the surface supports fixed-rate compression at all
    pub fixed_rate_compression: bool,
}

impl SurfaceProperties {
    /// A minimized window reports a degenerate maximum extent.
    pub fn is_degenerate(&self) -> bool {
        self.max_extent.is_degenerate()
    }
}
