/*!
# Meridian WSI - Vulkan Backend

ash-based implementation of the `meridian_wsi` display engine seam.

The backend owns the surface/swapchain loaders and translates the core's
presentation vocabulary to native calls. Optional-extension support
(present-wait, present-id, swapchain maintenance, compression control,
NV low latency, exclusive fullscreen) is detected once from the enabled
extension lists and baked into the capability snapshot.

```ignore
use meridian_wsi::Wsi;
use meridian_wsi_vulkan::{detect_capabilities, VulkanDisplayEngine, VulkanWsiContext};

let capabilities = detect_capabilities(&instance_extensions, &device_extensions);
let engine = VulkanDisplayEngine::new(&VulkanWsiContext {
    entry: &entry,
    instance: &instance,
    physical_device,
    device: &device,
    present_queue,
    present_queue_family,
    surface,
    capabilities,
    exclusive_fullscreen: false,
});
let mut wsi = Wsi::new(Box::new(engine), Box::new(platform));
wsi.init()?;
```
*/

mod convert;
mod engine;
mod fullscreen;
mod low_latency;
mod surface;

pub use convert::{pixel_format_from_vk, pixel_format_to_vk};
pub use engine::{detect_capabilities, VulkanDisplayEngine, VulkanWsiContext};
pub use fullscreen::{AppControlledExclusive, FullscreenStrategy, Windowed};
pub use low_latency::NvLowLatency;
pub use surface::{create_surface, destroy_surface};
