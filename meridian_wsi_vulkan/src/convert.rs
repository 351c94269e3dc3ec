//! Conversions between the core presentation vocabulary and `vk` values
//!
//! `from_vk_*` conversions return `Option` and drop values outside the
//! core's closed whitelists; the negotiator never sees a native enum it
//! does not understand.

use ash::vk;
use meridian_wsi::{
    ColorSpace, CompositeAlphaMode, CompositeAlphaSupport, CompressionMode, ImageUsage,
    NativePresentMode, PixelFormat, SurfaceRotation,
};

pub fn pixel_format_to_vk(format: PixelFormat) -> vk::Format {
    match format {
        PixelFormat::B8G8R8A8_UNORM => vk::Format::B8G8R8A8_UNORM,
        PixelFormat::R8G8B8A8_UNORM => vk::Format::R8G8B8A8_UNORM,
        PixelFormat::A8B8G8R8_UNORM => vk::Format::A8B8G8R8_UNORM_PACK32,
        PixelFormat::B8G8R8A8_SRGB => vk::Format::B8G8R8A8_SRGB,
        PixelFormat::R8G8B8A8_SRGB => vk::Format::R8G8B8A8_SRGB,
        PixelFormat::A8B8G8R8_SRGB => vk::Format::A8B8G8R8_SRGB_PACK32,
        PixelFormat::A2B10G10R10_UNORM => vk::Format::A2B10G10R10_UNORM_PACK32,
        PixelFormat::A2R10G10B10_UNORM => vk::Format::A2R10G10B10_UNORM_PACK32,
        PixelFormat::R16G16B16A16_SFLOAT => vk::Format::R16G16B16A16_SFLOAT,
    }
}

pub fn pixel_format_from_vk(format: vk::Format) -> Option<PixelFormat> {
    match format {
        vk::Format::B8G8R8A8_UNORM => Some(PixelFormat::B8G8R8A8_UNORM),
        vk::Format::R8G8B8A8_UNORM => Some(PixelFormat::R8G8B8A8_UNORM),
        vk::Format::A8B8G8R8_UNORM_PACK32 => Some(PixelFormat::A8B8G8R8_UNORM),
        vk::Format::B8G8R8A8_SRGB => Some(PixelFormat::B8G8R8A8_SRGB),
        vk::Format::R8G8B8A8_SRGB => Some(PixelFormat::R8G8B8A8_SRGB),
        vk::Format::A8B8G8R8_SRGB_PACK32 => Some(PixelFormat::A8B8G8R8_SRGB),
        vk::Format::A2B10G10R10_UNORM_PACK32 => Some(PixelFormat::A2B10G10R10_UNORM),
        vk::Format::A2R10G10B10_UNORM_PACK32 => Some(PixelFormat::A2R10G10B10_UNORM),
        vk::Format::R16G16B16A16_SFLOAT => Some(PixelFormat::R16G16B16A16_SFLOAT),
        _ => None,
    }
}

pub fn color_space_to_vk(color_space: ColorSpace) -> vk::ColorSpaceKHR {
    match color_space {
        ColorSpace::SrgbNonlinear => vk::ColorSpaceKHR::SRGB_NONLINEAR,
        ColorSpace::ExtendedSrgbLinear => vk::ColorSpaceKHR::EXTENDED_SRGB_LINEAR_EXT,
        ColorSpace::Hdr10Pq => vk::ColorSpaceKHR::HDR10_ST2084_EXT,
        ColorSpace::DisplayP3Nonlinear => vk::ColorSpaceKHR::DISPLAY_P3_NONLINEAR_EXT,
        ColorSpace::PassThrough => vk::ColorSpaceKHR::PASS_THROUGH_EXT,
    }
}

pub fn color_space_from_vk(color_space: vk::ColorSpaceKHR) -> Option<ColorSpace> {
    match color_space {
        vk::ColorSpaceKHR::SRGB_NONLINEAR => Some(ColorSpace::SrgbNonlinear),
        vk::ColorSpaceKHR::EXTENDED_SRGB_LINEAR_EXT => Some(ColorSpace::ExtendedSrgbLinear),
        vk::ColorSpaceKHR::HDR10_ST2084_EXT => Some(ColorSpace::Hdr10Pq),
        vk::ColorSpaceKHR::DISPLAY_P3_NONLINEAR_EXT => Some(ColorSpace::DisplayP3Nonlinear),
        vk::ColorSpaceKHR::PASS_THROUGH_EXT => Some(ColorSpace::PassThrough),
        _ => None,
    }
}

pub fn present_mode_to_vk(mode: NativePresentMode) -> vk::PresentModeKHR {
    match mode {
        NativePresentMode::Fifo => vk::PresentModeKHR::FIFO,
        NativePresentMode::FifoRelaxed => vk::PresentModeKHR::FIFO_RELAXED,
        NativePresentMode::Immediate => vk::PresentModeKHR::IMMEDIATE,
        NativePresentMode::Mailbox => vk::PresentModeKHR::MAILBOX,
    }
}

pub fn present_mode_from_vk(mode: vk::PresentModeKHR) -> Option<NativePresentMode> {
    match mode {
        vk::PresentModeKHR::FIFO => Some(NativePresentMode::Fifo),
        vk::PresentModeKHR::FIFO_RELAXED => Some(NativePresentMode::FifoRelaxed),
        vk::PresentModeKHR::IMMEDIATE => Some(NativePresentMode::Immediate),
        vk::PresentModeKHR::MAILBOX => Some(NativePresentMode::Mailbox),
        _ => None,
    }
}

pub fn usage_to_vk(usage: ImageUsage) -> vk::ImageUsageFlags {
    let mut flags = vk::ImageUsageFlags::empty();
    if usage.contains(ImageUsage::COLOR_ATTACHMENT) {
        flags |= vk::ImageUsageFlags::COLOR_ATTACHMENT;
    }
    if usage.contains(ImageUsage::TRANSFER_SRC) {
        flags |= vk::ImageUsageFlags::TRANSFER_SRC;
    }
    if usage.contains(ImageUsage::TRANSFER_DST) {
        flags |= vk::ImageUsageFlags::TRANSFER_DST;
    }
    if usage.contains(ImageUsage::STORAGE) {
        flags |= vk::ImageUsageFlags::STORAGE;
    }
    if usage.contains(ImageUsage::SAMPLED) {
        flags |= vk::ImageUsageFlags::SAMPLED;
    }
    flags
}

/// Format feature bits a presentable image must carry for the usage.
pub fn required_format_features(usage: ImageUsage) -> vk::FormatFeatureFlags {
    let mut features = vk::FormatFeatureFlags::empty();
    if usage.contains(ImageUsage::COLOR_ATTACHMENT) {
        features |= vk::FormatFeatureFlags::COLOR_ATTACHMENT;
    }
    if usage.contains(ImageUsage::STORAGE) {
        features |= vk::FormatFeatureFlags::STORAGE_IMAGE;
    }
    if usage.contains(ImageUsage::SAMPLED) {
        features |= vk::FormatFeatureFlags::SAMPLED_IMAGE;
    }
    features
}

pub fn rotation_to_vk(rotation: SurfaceRotation) -> vk::SurfaceTransformFlagsKHR {
    match rotation {
        SurfaceRotation::Identity => vk::SurfaceTransformFlagsKHR::IDENTITY,
        SurfaceRotation::Rotate90 => vk::SurfaceTransformFlagsKHR::ROTATE_90,
        SurfaceRotation::Rotate180 => vk::SurfaceTransformFlagsKHR::ROTATE_180,
        SurfaceRotation::Rotate270 => vk::SurfaceTransformFlagsKHR::ROTATE_270,
    }
}

pub fn rotation_from_vk(transform: vk::SurfaceTransformFlagsKHR) -> SurfaceRotation {
    if transform.contains(vk::SurfaceTransformFlagsKHR::ROTATE_90) {
        SurfaceRotation::Rotate90
    } else if transform.contains(vk::SurfaceTransformFlagsKHR::ROTATE_180) {
        SurfaceRotation::Rotate180
    } else if transform.contains(vk::SurfaceTransformFlagsKHR::ROTATE_270) {
        SurfaceRotation::Rotate270
    } else {
        SurfaceRotation::Identity
    }
}

pub fn composite_alpha_to_vk(mode: CompositeAlphaMode) -> vk::CompositeAlphaFlagsKHR {
    match mode {
        CompositeAlphaMode::Opaque => vk::CompositeAlphaFlagsKHR::OPAQUE,
        CompositeAlphaMode::PreMultiplied => vk::CompositeAlphaFlagsKHR::PRE_MULTIPLIED,
        CompositeAlphaMode::PostMultiplied => vk::CompositeAlphaFlagsKHR::POST_MULTIPLIED,
        CompositeAlphaMode::Inherit => vk::CompositeAlphaFlagsKHR::INHERIT,
    }
}

pub fn composite_alpha_support_from_vk(
    flags: vk::CompositeAlphaFlagsKHR,
) -> CompositeAlphaSupport {
    let mut support = CompositeAlphaSupport::empty();
    if flags.contains(vk::CompositeAlphaFlagsKHR::OPAQUE) {
        support |= CompositeAlphaSupport::OPAQUE;
    }
    if flags.contains(vk::CompositeAlphaFlagsKHR::PRE_MULTIPLIED) {
        support |= CompositeAlphaSupport::PRE_MULTIPLIED;
    }
    if flags.contains(vk::CompositeAlphaFlagsKHR::POST_MULTIPLIED) {
        support |= CompositeAlphaSupport::POST_MULTIPLIED;
    }
    if flags.contains(vk::CompositeAlphaFlagsKHR::INHERIT) {
        support |= CompositeAlphaSupport::INHERIT;
    }
    support
}

pub fn compression_to_vk(mode: CompressionMode) -> vk::ImageCompressionFlagsEXT {
    match mode {
        CompressionMode::Default => vk::ImageCompressionFlagsEXT::DEFAULT,
        CompressionMode::FixedRate => vk::ImageCompressionFlagsEXT::FIXED_RATE_DEFAULT,
        CompressionMode::Disabled => vk::ImageCompressionFlagsEXT::DISABLED,
    }
}

#[cfg(test)]
#[path = "convert_tests.rs"]
mod tests;
