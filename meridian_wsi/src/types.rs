//! Presentation vocabulary
//!
//! Backend-agnostic types shared by the negotiator, builder, and sequencer.
//! The Vulkan backend converts these to and from native `vk` values; the
//! core never sees a native enum.

use bitflags::bitflags;
use std::fmt;

// ===== EXTENT =====

/// Two-dimensional pixel extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

impl Extent {
    pub const ZERO: Extent = Extent { width: 0, height: 0 };

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when both axes are zero (a minimized surface reports this).
    pub fn is_degenerate(&self) -> bool {
        self.width == 0 && self.height == 0
    }

    /// True for a wider-than-tall extent. Square counts as landscape.
    pub fn is_landscape(&self) -> bool {
        self.width >= self.height
    }

    /// Extent with the axes exchanged.
    pub fn transposed(&self) -> Extent {
        Extent { width: self.height, height: self.width }
    }

    pub fn clamp(&self, min: Extent, max: Extent) -> Extent {
        Extent {
            width: self.width.clamp(min.width, max.width),
            height: self.height.clamp(min.height, max.height),
        }
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

// ===== FORMATS =====

/// Concrete backbuffer pixel formats the negotiator may select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum PixelFormat {
    B8G8R8A8_UNORM,
    R8G8B8A8_UNORM,
    A8B8G8R8_UNORM,
    B8G8R8A8_SRGB,
    R8G8B8A8_SRGB,
    A8B8G8R8_SRGB,
    A2B10G10R10_UNORM,
    A2R10G10B10_UNORM,
    R16G16B16A16_SFLOAT,
}

impl PixelFormat {
    /// Bits per color channel, used to order candidates by depth.
    pub fn bit_depth(&self) -> u32 {
        match self {
            PixelFormat::A2B10G10R10_UNORM | PixelFormat::A2R10G10B10_UNORM => 10,
            PixelFormat::R16G16B16A16_SFLOAT => 16,
            _ => 8,
        }
    }
}

/// Color spaces a surface may expose alongside a pixel format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorSpace {
    SrgbNonlinear,
    ExtendedSrgbLinear,
    Hdr10Pq,
    DisplayP3Nonlinear,
    PassThrough,
}

/// Desired backbuffer intent, resolved to a concrete (format, color space)
/// pair by the negotiator's candidate table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackbufferFormat {
    /// 8/10-bit UNORM view, sRGB color space (shader writes raw values)
    UnormLinear,
    /// 8-bit sRGB view, sRGB color space
    Srgb,
    /// 10-bit UNORM, ST.2084 PQ (HDR10)
    Hdr10,
    /// 16-bit float, extended linear sRGB (scRGB)
    ScRgb,
    /// Display-P3 non-linear
    DisplayP3,
    /// UNORM view with the pass-through color space (no compositor transform)
    UnormPassthrough,
    /// Explicit pair, bypassing the candidate table ordering
    Custom {
        format: PixelFormat,
        color_space: ColorSpace,
    },
}

impl BackbufferFormat {
    /// HDR-class intents fall back once to `Srgb` when unsupported.
    pub fn is_hdr_class(&self) -> bool {
        matches!(
            self,
            BackbufferFormat::Hdr10 | BackbufferFormat::ScRgb | BackbufferFormat::DisplayP3
        )
    }
}

impl Default for BackbufferFormat {
    fn default() -> Self {
        BackbufferFormat::Srgb
    }
}

// ===== PRESENT MODES =====

/// Presentation policy requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentMode {
    /// Block on vertical blank (FIFO-equivalent)
    SyncToVBlank,
    /// Unlocked rate, tearing acceptable when it lowers latency
    UnlockedMaybeTear,
    /// Unlocked rate, tearing required (benchmarking/latency probes)
    UnlockedForceTear,
    /// Unlocked rate, tearing never acceptable
    UnlockedNoTear,
}

impl PresentMode {
    pub fn is_vsync(&self) -> bool {
        matches!(self, PresentMode::SyncToVBlank)
    }
}

impl Default for PresentMode {
    fn default() -> Self {
        PresentMode::SyncToVBlank
    }
}

/// Concrete native presentation modes.
///
/// This enum is the closed whitelist of modes the sequencer understands;
/// compatibility-group members reported by the native layer that do not map
/// onto it are rejected during negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativePresentMode {
    Fifo,
    FifoRelaxed,
    Immediate,
    Mailbox,
}

/// A present-mode compatibility group: modes the native layer guarantees
/// can be switched between without recreating the chain.
///
/// Bounded inline storage: driver-reported groups are small (the four
/// whitelisted modes at most, and drivers in practice report two or three),
/// so a capacity of 8 leaves headroom without heap traffic.
#[derive(Debug, Clone, Copy)]
pub struct ModeGroup {
    modes: [NativePresentMode; Self::CAPACITY],
    len: usize,
}

impl ModeGroup {
    pub const CAPACITY: usize = 8;

    /// Group containing only the given mode (no seamless switching).
    pub fn single(mode: NativePresentMode) -> Self {
        let mut group = Self {
            modes: [mode; Self::CAPACITY],
            len: 0,
        };
        group.push(mode);
        group
    }

    pub fn empty() -> Self {
        Self {
            modes: [NativePresentMode::Fifo; Self::CAPACITY],
            len: 0,
        }
    }

    /// Append a mode if there is room and it is not already present.
    pub fn push(&mut self, mode: NativePresentMode) {
        if self.len < Self::CAPACITY && !self.contains(mode) {
            self.modes[self.len] = mode;
            self.len += 1;
        }
    }

    pub fn contains(&self, mode: NativePresentMode) -> bool {
        self.modes[..self.len].contains(&mode)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = NativePresentMode> + '_ {
        self.modes[..self.len].iter().copied()
    }

    /// Keep only modes satisfying the predicate.
    pub fn retain(&mut self, mut keep: impl FnMut(NativePresentMode) -> bool) {
        let mut out = Self::empty();
        for mode in self.iter() {
            if keep(mode) {
                out.modes[out.len] = mode;
                out.len += 1;
            }
        }
        *self = out;
    }

    pub fn as_slice(&self) -> &[NativePresentMode] {
        &self.modes[..self.len]
    }
}

// ===== USAGE, COMPRESSION, TRANSFORM, ALPHA =====

bitflags! {
    /// Image usage requested for the chain images.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ImageUsage: u32 {
        const COLOR_ATTACHMENT = 1 << 0;
        const TRANSFER_SRC = 1 << 1;
        const TRANSFER_DST = 1 << 2;
        const STORAGE = 1 << 3;
        const SAMPLED = 1 << 4;
    }
}

bitflags! {
    /// Composite-alpha modes a surface supports.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CompositeAlphaSupport: u32 {
        const OPAQUE = 1 << 0;
        const PRE_MULTIPLIED = 1 << 1;
        const POST_MULTIPLIED = 1 << 2;
        const INHERIT = 1 << 3;
    }
}

/// Composite-alpha mode selected for the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeAlphaMode {
    Opaque,
    PreMultiplied,
    PostMultiplied,
    Inherit,
}

/// Fixed-rate compression preference for chain images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMode {
    /// Driver default (implicit lossless compression allowed)
    Default,
    /// Request fixed-rate (lossy) compression at the default rate
    FixedRate,
    /// Disable all compression
    Disabled,
}

impl Default for CompressionMode {
    fn default() -> Self {
        CompressionMode::Default
    }
}

/// Surface pre-rotation the renderer must compensate in clip space.
///
/// When the surface demands a non-identity rotation the chain is created at
/// the rotated extent and the renderer applies a clip-space fix-up; geometry
/// is never re-submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceRotation {
    Identity,
    Rotate90,
    Rotate180,
    Rotate270,
}

impl SurfaceRotation {
    /// True when the rotation exchanges the output axes.
    pub fn swaps_extent(&self) -> bool {
        matches!(self, SurfaceRotation::Rotate90 | SurfaceRotation::Rotate270)
    }
}

// ===== OPAQUE HANDLES =====

/// Opaque native swapchain handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainHandle(pub u64);

/// Opaque native semaphore handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SemaphoreHandle(pub u64);

/// Opaque native fence handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FenceHandle(pub u64);

/// Opaque native image handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageHandle(pub u64);

/// Opaque native surface handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceHandle(pub u64);

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
