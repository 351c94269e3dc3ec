//! Capability negotiator
//!
//! Turns caller preferences plus a surface/device snapshot into a concrete
//! [`ChainConfig`]. Format and present-mode selection are table-driven:
//! ordered candidate rows evaluated in priority order, instead of chained
//! branching, so each row is unit-testable on its own.

use crate::caps::SurfaceProperties;
use crate::chain::ChainConfig;
use crate::display::DisplayEngine;
use crate::error::SwapchainError;
use crate::types::{
    BackbufferFormat, ColorSpace, CompositeAlphaMode, CompositeAlphaSupport, CompressionMode,
    Extent, ImageUsage, ModeGroup, NativePresentMode, PixelFormat, PresentMode, SurfaceRotation,
};
use crate::{wsi_info, wsi_warn};

/// Environment override for the desired image count. Diagnostics only.
pub const IMAGE_COUNT_ENV: &str = "MERIDIAN_WSI_IMAGES";

/// Caller preferences for the next chain generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainRequest {
    /// Desired extent; zero on an axis means "use the surface's value".
    pub extent: Extent,

    pub format: BackbufferFormat,
    pub present_mode: PresentMode,

    /// Usage on top of the always-present color-attachment bit.
    pub extra_usage: ImageUsage,

    pub compression: CompressionMode,

    /// Presentation-side low-latency intent: shrink the queue ahead of
    /// the display to its minimum.
    pub low_latency_present: bool,

    /// Caller will mark duplicate frames; deepens the chain so genuine
    /// frames are not starved by duplicates.
    pub duplicate_aware: bool,
}

impl Default for ChainRequest {
    fn default() -> Self {
        Self {
            extent: Extent::ZERO,
            format: BackbufferFormat::default(),
            present_mode: PresentMode::default(),
            extra_usage: ImageUsage::empty(),
            compression: CompressionMode::default(),
            low_latency_present: false,
            duplicate_aware: false,
        }
    }
}

/// Derive a concrete configuration from preferences and surface state.
pub fn negotiate(
    engine: &mut dyn DisplayEngine,
    request: &ChainRequest,
) -> Result<ChainConfig, SwapchainError> {
    let properties = engine
        .query_surface(request.compression)
        .map_err(|_| SwapchainError::DeviceError)?;

    // Happens on some drivers when the window is minimized.
    if properties.is_degenerate() {
        return Err(SwapchainError::NoSurface);
    }

    let usage = ImageUsage::COLOR_ATTACHMENT | request.extra_usage;
    let (format, color_space) = select_format(engine, &properties, request.format, usage)
        .ok_or(SwapchainError::DeviceError)?;

    let present_mode = select_present_mode(request.present_mode, &properties.present_modes);
    let image_count = select_image_count(engine, &properties, request);
    let mode_group = select_mode_group(engine, present_mode, image_count);
    let (extent, rotation) = select_extent(&properties, request.extent);
    let composite_alpha = select_composite_alpha(properties.composite_alpha);

    let compression = if engine.capabilities().compression_control
        && properties.fixed_rate_compression
    {
        request.compression
    } else {
        if request.compression != CompressionMode::Default {
            wsi_warn!(
                "meridian::wsi",
                "Compression control not available, using driver default"
            );
        }
        CompressionMode::Default
    };

    Ok(ChainConfig {
        extent,
        format,
        color_space,
        rotation,
        present_mode,
        mode_group,
        image_count,
        usage,
        compression,
        composite_alpha,
    })
}

// ===== FORMAT SELECTION =====

/// Candidate (format, color space) rows per intent, highest bit depth
/// first. The first row the surface supports whose format also carries the
/// required usage feature bits wins.
fn candidate_rows(intent: BackbufferFormat) -> &'static [(PixelFormat, ColorSpace)] {
    use ColorSpace::*;
    use PixelFormat::*;
    match intent {
        BackbufferFormat::UnormLinear => &[
            (A2B10G10R10_UNORM, SrgbNonlinear),
            (A2R10G10B10_UNORM, SrgbNonlinear),
            (B8G8R8A8_UNORM, SrgbNonlinear),
            (R8G8B8A8_UNORM, SrgbNonlinear),
            (A8B8G8R8_UNORM, SrgbNonlinear),
        ],
        BackbufferFormat::Srgb => &[
            (B8G8R8A8_SRGB, SrgbNonlinear),
            (R8G8B8A8_SRGB, SrgbNonlinear),
            (A8B8G8R8_SRGB, SrgbNonlinear),
        ],
        BackbufferFormat::Hdr10 => &[
            (A2B10G10R10_UNORM, Hdr10Pq),
            (A2R10G10B10_UNORM, Hdr10Pq),
        ],
        BackbufferFormat::ScRgb => &[(R16G16B16A16_SFLOAT, ExtendedSrgbLinear)],
        BackbufferFormat::DisplayP3 => &[
            (A2B10G10R10_UNORM, DisplayP3Nonlinear),
            (A2R10G10B10_UNORM, DisplayP3Nonlinear),
            (B8G8R8A8_UNORM, DisplayP3Nonlinear),
        ],
        BackbufferFormat::UnormPassthrough => &[
            (B8G8R8A8_UNORM, PassThrough),
            (R8G8B8A8_UNORM, PassThrough),
            (A8B8G8R8_UNORM, PassThrough),
        ],
        // Handled before the table is consulted.
        BackbufferFormat::Custom { .. } => &[],
    }
}

fn scan_rows(
    engine: &dyn DisplayEngine,
    properties: &SurfaceProperties,
    rows: &[(PixelFormat, ColorSpace)],
    usage: ImageUsage,
) -> Option<(PixelFormat, ColorSpace)> {
    rows.iter()
        .copied()
        .find(|&(format, color_space)| {
            properties.formats.contains(&(format, color_space))
                && engine.format_supports_usage(format, usage)
        })
}

fn select_format(
    engine: &dyn DisplayEngine,
    properties: &SurfaceProperties,
    intent: BackbufferFormat,
    usage: ImageUsage,
) -> Option<(PixelFormat, ColorSpace)> {
    if let BackbufferFormat::Custom { format, color_space } = intent {
        if properties.formats.contains(&(format, color_space))
            && engine.format_supports_usage(format, usage)
        {
            return Some((format, color_space));
        }
        wsi_warn!(
            "meridian::wsi",
            "Custom backbuffer format {:?}/{:?} unsupported, falling back",
            format,
            color_space
        );
        return select_format(engine, properties, BackbufferFormat::Srgb, usage);
    }

    if let Some(pair) = scan_rows(engine, properties, candidate_rows(intent), usage) {
        return Some(pair);
    }

    // HDR-class intents fall back exactly once to the SDR default.
    if intent.is_hdr_class() {
        wsi_warn!(
            "meridian::wsi",
            "{:?} backbuffer unsupported by surface, falling back to sRGB",
            intent
        );
        if let Some(pair) =
            scan_rows(engine, properties, candidate_rows(BackbufferFormat::Srgb), usage)
        {
            return Some(pair);
        }
    }

    // Last resort: take whatever the surface offers first that still
    // carries the required usage bits.
    properties
        .formats
        .iter()
        .copied()
        .find(|&(format, _)| engine.format_supports_usage(format, usage))
}

// ===== PRESENT MODE SELECTION =====

/// Ordered native-mode preference per policy; first supported entry wins,
/// FIFO is the unconditional fallback (always supported).
fn mode_preference(policy: PresentMode) -> &'static [NativePresentMode] {
    use NativePresentMode::*;
    match policy {
        PresentMode::SyncToVBlank => &[Fifo],
        PresentMode::UnlockedMaybeTear => &[Immediate, Mailbox],
        PresentMode::UnlockedForceTear => &[Immediate],
        PresentMode::UnlockedNoTear => &[Mailbox],
    }
}

pub(crate) fn select_present_mode(
    policy: PresentMode,
    supported: &[NativePresentMode],
) -> NativePresentMode {
    mode_preference(policy)
        .iter()
        .copied()
        .find(|mode| supported.contains(mode))
        .unwrap_or(NativePresentMode::Fifo)
}

/// Pick the policy's favorite among the members of a compatibility group,
/// for seamless switches that skip renegotiation entirely.
pub(crate) fn mode_within_group(
    policy: PresentMode,
    group: &ModeGroup,
) -> Option<NativePresentMode> {
    mode_preference(policy)
        .iter()
        .copied()
        .find(|&mode| group.contains(mode))
        .or_else(|| {
            if policy.is_vsync() && group.contains(NativePresentMode::Fifo) {
                Some(NativePresentMode::Fifo)
            } else {
                None
            }
        })
}

fn select_mode_group(
    engine: &mut dyn DisplayEngine,
    mode: NativePresentMode,
    image_count: u32,
) -> ModeGroup {
    if !engine.capabilities().seamless_mode_switch {
        return ModeGroup::single(mode);
    }

    // The native conversion layer already dropped modes outside the known
    // whitelist; what remains is filtered against image-count inflation.
    let mut group = engine.compatible_present_modes(mode);
    let present_wait = engine.capabilities().present_wait;
    let mut inflated = Vec::new();
    for member in group.as_slice().iter().copied().collect::<Vec<_>>() {
        if member != mode && engine.min_images_for_mode(member) > image_count && !present_wait {
            inflated.push(member);
        }
    }
    group.retain(|member| !inflated.contains(&member));
    if !group.contains(mode) {
        group.push(mode);
    }
    group
}

// ===== IMAGE COUNT POLICY =====

fn baseline_image_count(engine: &dyn DisplayEngine, request: &ChainRequest) -> u32 {
    if request.low_latency_present && request.present_mode.is_vsync() {
        2
    } else if request.duplicate_aware && engine.capabilities().present_wait {
        5
    } else {
        3
    }
}

fn select_image_count(
    engine: &dyn DisplayEngine,
    properties: &SurfaceProperties,
    request: &ChainRequest,
) -> u32 {
    let mut desired = baseline_image_count(engine, request).max(properties.min_images);

    if let Ok(value) = std::env::var(IMAGE_COUNT_ENV) {
        if let Ok(count) = value.parse::<u32>() {
            wsi_info!("meridian::wsi", "Image count overridden to {} by env", count);
            desired = count;
        }
    }

    desired = desired.max(properties.min_images);
    if properties.max_images > 0 {
        desired = desired.min(properties.max_images);
    }
    desired
}

// ===== EXTENT POLICY =====

fn select_extent(properties: &SurfaceProperties, requested: Extent) -> (Extent, SurfaceRotation) {
    let surface_extent = properties.current_extent.unwrap_or(requested);

    let mut extent = Extent {
        width: if requested.width == 0 { surface_extent.width } else { requested.width },
        height: if requested.height == 0 { surface_extent.height } else { requested.height },
    };

    // A caller extent that crosses the landscape/portrait boundary against
    // the surface's current orientation gets its axes exchanged before
    // clamping, so rotated displays don't clamp to a sliver.
    if !surface_extent.is_degenerate() && extent.is_landscape() != surface_extent.is_landscape() {
        extent = extent.transposed();
    }

    extent = extent.clamp(properties.min_extent, properties.max_extent);

    // A surface demanding a 90/270 pre-rotation presents transposed; build
    // the chain at the rotated extent and let the renderer compensate in
    // clip space.
    let rotation = if properties.supports_identity_rotation {
        SurfaceRotation::Identity
    } else {
        properties.current_rotation
    };
    if rotation.swaps_extent() {
        extent = extent.transposed();
    }

    (extent, rotation)
}

// ===== COMPOSITE ALPHA =====

/// Each supported mode in inherit < opaque < post-multiplied <
/// pre-multiplied order overrides the previous pick.
fn select_composite_alpha(support: CompositeAlphaSupport) -> CompositeAlphaMode {
    let mut mode = CompositeAlphaMode::Opaque;
    if support.contains(CompositeAlphaSupport::INHERIT) {
        mode = CompositeAlphaMode::Inherit;
    }
    if support.contains(CompositeAlphaSupport::OPAQUE) {
        mode = CompositeAlphaMode::Opaque;
    }
    if support.contains(CompositeAlphaSupport::POST_MULTIPLIED) {
        mode = CompositeAlphaMode::PostMultiplied;
    }
    if support.contains(CompositeAlphaSupport::PRE_MULTIPLIED) {
        mode = CompositeAlphaMode::PreMultiplied;
    }
    mode
}

#[cfg(test)]
#[path = "negotiate_tests.rs"]
mod tests;
