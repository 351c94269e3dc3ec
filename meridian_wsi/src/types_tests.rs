use super::*;

// ============================================================================
// Extent
// ============================================================================

#[test]
fn test_extent_degenerate_requires_both_axes() {
    assert!(Extent::ZERO.is_degenerate());
    assert!(!Extent::new(0, 720).is_degenerate());
    assert!(!Extent::new(1280, 0).is_degenerate());
}

#[test]
fn test_extent_orientation() {
    assert!(Extent::new(1280, 720).is_landscape());
    assert!(!Extent::new(720, 1280).is_landscape());
    // Square counts as landscape.
    assert!(Extent::new(512, 512).is_landscape());
}

#[test]
fn test_extent_transpose_and_clamp() {
    let extent = Extent::new(4000, 100);
    assert_eq!(extent.transposed(), Extent::new(100, 4000));
    let clamped = extent.clamp(Extent::new(200, 200), Extent::new(2000, 2000));
    assert_eq!(clamped, Extent::new(2000, 200));
}

// ============================================================================
// ModeGroup
// ============================================================================

#[test]
fn test_mode_group_single() {
    let group = ModeGroup::single(NativePresentMode::Fifo);
    assert_eq!(group.len(), 1);
    assert!(group.contains(NativePresentMode::Fifo));
    assert!(!group.contains(NativePresentMode::Mailbox));
}

#[test]
fn test_mode_group_push_deduplicates() {
    let mut group = ModeGroup::single(NativePresentMode::Fifo);
    group.push(NativePresentMode::Mailbox);
    group.push(NativePresentMode::Mailbox);
    group.push(NativePresentMode::Fifo);
    assert_eq!(group.len(), 2);
}

#[test]
fn test_mode_group_retain() {
    let mut group = ModeGroup::single(NativePresentMode::Fifo);
    group.push(NativePresentMode::Mailbox);
    group.push(NativePresentMode::Immediate);
    group.retain(|mode| mode != NativePresentMode::Mailbox);
    assert_eq!(group.len(), 2);
    assert!(group.contains(NativePresentMode::Fifo));
    assert!(group.contains(NativePresentMode::Immediate));
    assert!(!group.contains(NativePresentMode::Mailbox));
}

#[test]
fn test_mode_group_capacity_is_bounded() {
    let mut group = ModeGroup::empty();
    for _ in 0..ModeGroup::CAPACITY + 4 {
        group.push(NativePresentMode::Fifo);
    }
    assert_eq!(group.len(), 1);
}

// ============================================================================
// Rotation, formats, intents
// ============================================================================

#[test]
fn test_rotation_extent_swap() {
    assert!(!SurfaceRotation::Identity.swaps_extent());
    assert!(SurfaceRotation::Rotate90.swaps_extent());
    assert!(!SurfaceRotation::Rotate180.swaps_extent());
    assert!(SurfaceRotation::Rotate270.swaps_extent());
}

#[test]
fn test_pixel_format_bit_depth() {
    assert_eq!(PixelFormat::B8G8R8A8_SRGB.bit_depth(), 8);
    assert_eq!(PixelFormat::A2B10G10R10_UNORM.bit_depth(), 10);
    assert_eq!(PixelFormat::R16G16B16A16_SFLOAT.bit_depth(), 16);
}

#[test]
fn test_hdr_class_intents() {
    assert!(BackbufferFormat::Hdr10.is_hdr_class());
    assert!(BackbufferFormat::ScRgb.is_hdr_class());
    assert!(BackbufferFormat::DisplayP3.is_hdr_class());
    assert!(!BackbufferFormat::Srgb.is_hdr_class());
    assert!(!BackbufferFormat::UnormPassthrough.is_hdr_class());
}

#[test]
fn test_present_mode_vsync() {
    assert!(PresentMode::SyncToVBlank.is_vsync());
    assert!(!PresentMode::UnlockedMaybeTear.is_vsync());
}
