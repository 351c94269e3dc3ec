//! Chain generations and the swapchain builder
//!
//! A `ChainGeneration` is one complete, currently-valid set of presentable
//! images plus their negotiated configuration. Exactly one generation is
//! current at any time; a prior generation may still be retiring inside
//! the deferred reclaimer.

use crate::display::{CreatedChain, DisplayEngine};
use crate::error::SwapchainError;
use crate::reclaim::{DeferredReclaimer, RetiredGeneration};
use crate::types::{
    ChainHandle, ColorSpace, CompositeAlphaMode, CompressionMode, Extent, FenceHandle,
    ImageHandle, ImageUsage, ModeGroup, NativePresentMode, PixelFormat, SemaphoreHandle,
    SurfaceRotation,
};
use crate::wsi_info;

/// Fully negotiated chain configuration produced by the negotiator and
/// consumed by the builder.
#[derive(Debug, Clone)]
pub struct ChainConfig {
    pub extent: Extent,
    pub format: PixelFormat,
    pub color_space: ColorSpace,

    /// Pre-rotation the renderer compensates via a clip-space fix-up.
    pub rotation: SurfaceRotation,

    pub present_mode: NativePresentMode,

    /// Modes reachable from `present_mode` without a rebuild.
    pub mode_group: ModeGroup,

    pub image_count: u32,
    pub usage: ImageUsage,
    pub compression: CompressionMode,
    pub composite_alpha: CompositeAlphaMode,
}

/// Per-image synchronization slot. Indexed by acquired-image index; lives
/// for the lifetime of the owning generation.
#[derive(Debug)]
pub struct FrameSlot {
    pub image: ImageHandle,

    /// Signalled when the image is ready for GPU writes. Created lazily on
    /// first acquire of this index, reused afterwards.
    pub acquire: Option<SemaphoreHandle>,

    /// Signalled by the GPU work that produced the frame; waited on by the
    /// present. Replaced per present when present fences prove retirement,
    /// reused otherwise.
    pub release: Option<SemaphoreHandle>,
}

impl FrameSlot {
    fn new(image: ImageHandle) -> Self {
        Self {
            image,
            acquire: None,
            release: None,
        }
    }
}

/// One live chain generation.
#[derive(Debug)]
pub struct ChainGeneration {
    pub handle: ChainHandle,
    pub config: ChainConfig,
    pub slots: Vec<FrameSlot>,

    /// Set when acquire or present reported "suboptimal"; the sequencer
    /// rebuilds at the next opportunity.
    pub needs_rebuild: bool,
}

impl ChainGeneration {
    pub fn image_count(&self) -> usize {
        self.slots.len()
    }

    /// Collect every semaphore still owned by the slots, for retirement.
    fn drain_semaphores(&mut self) -> Vec<SemaphoreHandle> {
        let mut semaphores = Vec::new();
        for slot in &mut self.slots {
            if let Some(sem) = slot.acquire.take() {
                semaphores.push(sem);
            }
            if let Some(sem) = slot.release.take() {
                semaphores.push(sem);
            }
        }
        semaphores
    }
}

/// Snapshot of the chain published to [`ChainListener`]s so dependent
/// state (framebuffers) can be rebuilt.
///
/// [`ChainListener`]: crate::platform::ChainListener
#[derive(Debug, Clone)]
pub struct ChainDescription {
    pub extent: Extent,
    pub format: PixelFormat,
    pub color_space: ColorSpace,
    pub image_count: u32,
    pub rotation: SurfaceRotation,
    pub aspect_ratio: f32,
}

impl ChainDescription {
    pub fn of(generation: &ChainGeneration, aspect_ratio: f32) -> Self {
        Self {
            extent: generation.config.extent,
            format: generation.config.format,
            color_space: generation.config.color_space,
            image_count: generation.image_count() as u32,
            rotation: generation.config.rotation,
            aspect_ratio,
        }
    }
}

/// Materialize a new generation from a negotiated configuration.
///
/// The previous generation's native handle is always chained into the
/// creation call when available; its destruction is handed to the
/// reclaimer, never performed synchronously. Without present fences there
/// is no proof of retirement, so the fenceless path drains the device
/// before retiring.
pub fn build_generation(
    engine: &mut dyn DisplayEngine,
    reclaimer: &mut DeferredReclaimer,
    config: ChainConfig,
    previous: Option<ChainGeneration>,
) -> std::result::Result<ChainGeneration, SwapchainError> {
    let old_handle = previous.as_ref().map(|generation| generation.handle);

    let created = match engine.create_chain(&config, old_handle) {
        Ok(created) => created,
        Err(_) => {
            // The old handle may have been consumed by the failed creation
            // attempt; the caller owns the retry policy.
            if let Some(generation) = previous {
                retire_generation(engine, reclaimer, generation, None);
            }
            return Err(SwapchainError::DeviceError);
        }
    };

    if let Some(generation) = previous {
        retire_generation(engine, reclaimer, generation, None);
    }

    let generation = realize(created, config);
    wsi_info!(
        "meridian::wsi",
        "Created swapchain {} ({:?}/{:?}, {} images, {:?})",
        generation.config.extent,
        generation.config.format,
        generation.config.color_space,
        generation.image_count(),
        generation.config.present_mode
    );
    Ok(generation)
}

/// Hand a generation to the reclaimer.
///
/// `proof` is the fence whose signal shows the display engine no longer
/// references the chain (the latest present fence). With no proof and no
/// present-fence capability the device is drained first, which makes the
/// retirement trivially safe.
pub fn retire_generation(
    engine: &mut dyn DisplayEngine,
    reclaimer: &mut DeferredReclaimer,
    mut generation: ChainGeneration,
    proof: Option<FenceHandle>,
) {
    let semaphores = generation.drain_semaphores();
    if proof.is_none() && !engine.capabilities().present_fence {
        engine.wait_idle();
    }
    reclaimer.retire_generation(RetiredGeneration {
        handle: generation.handle,
        semaphores,
        fence: proof,
    });
}

fn realize(created: CreatedChain, config: ChainConfig) -> ChainGeneration {
    let slots = created.images.into_iter().map(FrameSlot::new).collect();
    ChainGeneration {
        handle: created.handle,
        config,
        slots,
        needs_rebuild: false,
    }
}

#[cfg(test)]
#[path = "chain_tests.rs"]
mod tests;
