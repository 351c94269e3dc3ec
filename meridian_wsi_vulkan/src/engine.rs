//! ash implementation of the display engine seam
//!
//! Thin translation layer: every method maps one core operation onto the
//! corresponding native entry points. All policy lives in the core crate.

use std::ffi::CStr;

use ash::vk;
use ash::vk::Handle;
use meridian_wsi::{
    wsi_err, wsi_error, AcquireOutcome, ChainConfig, ChainHandle, CompressionMode, CreatedChain,
    DeviceCapabilities, DisplayEngine, FenceHandle, ImageHandle, ImageUsage, ModeGroup,
    NativePresentMode, PixelFormat, PresentOutcome, PresentRequest, Result, SemaphoreHandle,
    SurfaceHandle, SurfaceProperties,
};

use crate::convert;
use crate::fullscreen::{AppControlledExclusive, FullscreenStrategy, Windowed};

const SOURCE: &str = "meridian::vulkan";

/// Everything the display engine borrows from the graphics context.
pub struct VulkanWsiContext<'a> {
    pub entry: &'a ash::Entry,
    pub instance: &'a ash::Instance,
    pub physical_device: vk::PhysicalDevice,
    pub device: &'a ash::Device,
    pub present_queue: vk::Queue,
    pub present_queue_family: u32,
    pub surface: SurfaceHandle,
    pub capabilities: DeviceCapabilities,

    /// Request application-controlled exclusive fullscreen. Ignored when
    /// the capability is absent.
    pub exclusive_fullscreen: bool,
}

/// Populate the capability snapshot from the extension lists the context
/// actually enabled. Done once; the snapshot is immutable afterwards.
pub fn detect_capabilities(
    instance_extensions: &[&CStr],
    device_extensions: &[&CStr],
) -> DeviceCapabilities {
    let instance_has = |name: &CStr| instance_extensions.contains(&name);
    let device_has = |name: &CStr| device_extensions.contains(&name);

    let surface_maintenance = instance_has(ash::ext::surface_maintenance1::NAME);
    let swapchain_maintenance = device_has(ash::ext::swapchain_maintenance1::NAME);

    DeviceCapabilities {
        present_wait: device_has(ash::khr::present_wait::NAME),
        present_id: device_has(ash::khr::present_id::NAME),
        seamless_mode_switch: surface_maintenance && swapchain_maintenance,
        present_fence: swapchain_maintenance,
        compression_control: device_has(ash::ext::image_compression_control::NAME)
            && device_has(ash::ext::image_compression_control_swapchain::NAME),
        low_latency_hooks: device_has(ash::nv::low_latency2::NAME),
        exclusive_fullscreen_control: device_has(ash::ext::full_screen_exclusive::NAME),
    }
}

pub struct VulkanDisplayEngine {
    device: ash::Device,
    physical_device: vk::PhysicalDevice,
    present_queue: vk::Queue,
    present_queue_family: u32,

    surface: vk::SurfaceKHR,
    surface_loader: ash::khr::surface::Instance,
    surface_caps2_loader: Option<ash::khr::get_surface_capabilities2::Instance>,
    swapchain_loader: ash::khr::swapchain::Device,
    present_wait_loader: Option<ash::khr::present_wait::Device>,

    instance: ash::Instance,
    fullscreen: Box<dyn FullscreenStrategy>,
    caps: DeviceCapabilities,
}

impl VulkanDisplayEngine {
    pub fn new(context: &VulkanWsiContext<'_>) -> Self {
        let caps = context.capabilities;

        let fullscreen: Box<dyn FullscreenStrategy> =
            if context.exclusive_fullscreen && caps.exclusive_fullscreen_control {
                Box::new(AppControlledExclusive::new(context.instance, context.device))
            } else {
                Box::new(Windowed)
            };

        Self {
            device: context.device.clone(),
            physical_device: context.physical_device,
            present_queue: context.present_queue,
            present_queue_family: context.present_queue_family,
            surface: vk::SurfaceKHR::from_raw(context.surface.0),
            surface_loader: ash::khr::surface::Instance::new(context.entry, context.instance),
            surface_caps2_loader: caps.seamless_mode_switch.then(|| {
                ash::khr::get_surface_capabilities2::Instance::new(context.entry, context.instance)
            }),
            swapchain_loader: ash::khr::swapchain::Device::new(context.instance, context.device),
            present_wait_loader: caps
                .present_wait
                .then(|| ash::khr::present_wait::Device::new(context.instance, context.device)),
            instance: context.instance.clone(),
            fullscreen,
            caps,
        }
    }

    fn surface_capabilities(&self) -> Result<vk::SurfaceCapabilitiesKHR> {
        unsafe {
            self.surface_loader
                .get_physical_device_surface_capabilities(self.physical_device, self.surface)
                .map_err(|e| {
                    wsi_err!(SOURCE, "Failed to get surface capabilities: {:?}", e)
                })
        }
    }

    /// Surface capabilities scoped to one present mode, via the
    /// surface-maintenance query path.
    fn capabilities_for_mode(
        &self,
        mode: NativePresentMode,
    ) -> Option<(vk::SurfaceCapabilitiesKHR, Vec<NativePresentMode>)> {
        let loader = self.surface_caps2_loader.as_ref()?;
        let vk_mode = convert::present_mode_to_vk(mode);

        // First pass: capabilities plus the compatible-mode count.
        let mut count_probe = vk::SurfacePresentModeCompatibilityEXT::default();
        let mut mode_info = vk::SurfacePresentModeEXT::default().present_mode(vk_mode);
        let surface_info = vk::PhysicalDeviceSurfaceInfo2KHR::default()
            .surface(self.surface)
            .push_next(&mut mode_info);
        let mut caps2 = vk::SurfaceCapabilities2KHR::default().push_next(&mut count_probe);
        unsafe {
            loader
                .get_physical_device_surface_capabilities2(
                    self.physical_device,
                    &surface_info,
                    &mut caps2,
                )
                .ok()?;
        }
        let capabilities = caps2.surface_capabilities;
        let count = count_probe.present_mode_count as usize;
        if count == 0 {
            return Some((capabilities, vec![mode]));
        }

        // Second pass: fetch the group itself.
        let mut modes = vec![vk::PresentModeKHR::default(); count];
        let mut compat = vk::SurfacePresentModeCompatibilityEXT::default().present_modes(&mut modes);
        let mut mode_info = vk::SurfacePresentModeEXT::default().present_mode(vk_mode);
        let surface_info = vk::PhysicalDeviceSurfaceInfo2KHR::default()
            .surface(self.surface)
            .push_next(&mut mode_info);
        let mut caps2 = vk::SurfaceCapabilities2KHR::default().push_next(&mut compat);
        unsafe {
            loader
                .get_physical_device_surface_capabilities2(
                    self.physical_device,
                    &surface_info,
                    &mut caps2,
                )
                .ok()?;
        }

        // Unknown members fall off the whitelist here.
        let group = modes
            .iter()
            .filter_map(|&m| convert::present_mode_from_vk(m))
            .collect();
        Some((capabilities, group))
    }
}

impl DisplayEngine for VulkanDisplayEngine {
    fn capabilities(&self) -> DeviceCapabilities {
        self.caps
    }

    fn surface_present_supported(&self) -> Result<bool> {
        unsafe {
            self.surface_loader
                .get_physical_device_surface_support(
                    self.physical_device,
                    self.present_queue_family,
                    self.surface,
                )
                .map_err(|e| wsi_err!(SOURCE, "Surface support query failed: {:?}", e))
        }
    }

    fn query_surface(&mut self, _compression: CompressionMode) -> Result<SurfaceProperties> {
        let capabilities = self.surface_capabilities()?;

        let formats = unsafe {
            self.surface_loader
                .get_physical_device_surface_formats(self.physical_device, self.surface)
                .map_err(|e| wsi_err!(SOURCE, "Failed to query surface formats: {:?}", e))?
        };
        let present_modes = unsafe {
            self.surface_loader
                .get_physical_device_surface_present_modes(self.physical_device, self.surface)
                .map_err(|e| wsi_err!(SOURCE, "Failed to query present modes: {:?}", e))?
        };

        let current_extent = if capabilities.current_extent.width == u32::MAX {
            None
        } else {
            Some(meridian_wsi::Extent::new(
                capabilities.current_extent.width,
                capabilities.current_extent.height,
            ))
        };

        Ok(SurfaceProperties {
            current_extent,
            min_extent: meridian_wsi::Extent::new(
                capabilities.min_image_extent.width,
                capabilities.min_image_extent.height,
            ),
            max_extent: meridian_wsi::Extent::new(
                capabilities.max_image_extent.width,
                capabilities.max_image_extent.height,
            ),
            min_images: capabilities.min_image_count,
            max_images: capabilities.max_image_count,
            current_rotation: convert::rotation_from_vk(capabilities.current_transform),
            supports_identity_rotation: capabilities
                .supported_transforms
                .contains(vk::SurfaceTransformFlagsKHR::IDENTITY),
            composite_alpha: convert::composite_alpha_support_from_vk(
                capabilities.supported_composite_alpha,
            ),
            formats: formats
                .iter()
                .filter_map(|f| {
                    let format = convert::pixel_format_from_vk(f.format)?;
                    let color_space = convert::color_space_from_vk(f.color_space)?;
                    Some((format, color_space))
                })
                .collect(),
            present_modes: present_modes
                .iter()
                .filter_map(|&m| convert::present_mode_from_vk(m))
                .collect(),
            fixed_rate_compression: self.caps.compression_control,
        })
    }

    fn compatible_present_modes(&mut self, mode: NativePresentMode) -> ModeGroup {
        match self.capabilities_for_mode(mode) {
            Some((_, members)) => {
                let mut group = ModeGroup::empty();
                for member in members {
                    group.push(member);
                }
                if !group.contains(mode) {
                    group.push(mode);
                }
                group
            }
            None => ModeGroup::single(mode),
        }
    }

    fn min_images_for_mode(&mut self, mode: NativePresentMode) -> u32 {
        match self.capabilities_for_mode(mode) {
            Some((capabilities, _)) => capabilities.min_image_count,
            None => self
                .surface_capabilities()
                .map(|capabilities| capabilities.min_image_count)
                .unwrap_or(1),
        }
    }

    fn format_supports_usage(&self, format: PixelFormat, usage: ImageUsage) -> bool {
        let properties = unsafe {
            self.instance.get_physical_device_format_properties(
                self.physical_device,
                convert::pixel_format_to_vk(format),
            )
        };
        properties
            .optimal_tiling_features
            .contains(convert::required_format_features(usage))
    }

    fn create_chain(
        &mut self,
        config: &ChainConfig,
        old: Option<ChainHandle>,
    ) -> Result<CreatedChain> {
        let group_modes: Vec<vk::PresentModeKHR> = config
            .mode_group
            .iter()
            .map(convert::present_mode_to_vk)
            .collect();

        let mut info = vk::SwapchainCreateInfoKHR::default()
            .surface(self.surface)
            .min_image_count(config.image_count)
            .image_format(convert::pixel_format_to_vk(config.format))
            .image_color_space(convert::color_space_to_vk(config.color_space))
            .image_extent(vk::Extent2D {
                width: config.extent.width,
                height: config.extent.height,
            })
            .image_array_layers(1)
            .image_usage(convert::usage_to_vk(config.usage))
            .image_sharing_mode(vk::SharingMode::EXCLUSIVE)
            .pre_transform(convert::rotation_to_vk(config.rotation))
            .composite_alpha(convert::composite_alpha_to_vk(config.composite_alpha))
            .present_mode(convert::present_mode_to_vk(config.present_mode))
            .clipped(true)
            .old_swapchain(
                old.map(|handle| vk::SwapchainKHR::from_raw(handle.0))
                    .unwrap_or(vk::SwapchainKHR::null()),
            );

        // Declare the whole compatibility group so later mode changes skip
        // the rebuild.
        let mut modes_info = vk::SwapchainPresentModesCreateInfoEXT::default()
            .present_modes(&group_modes);
        if self.caps.seamless_mode_switch && config.mode_group.len() > 1 {
            info = info.push_next(&mut modes_info);
        }

        let mut compression_info = vk::ImageCompressionControlEXT::default()
            .flags(convert::compression_to_vk(config.compression));
        if self.caps.compression_control && config.compression != CompressionMode::Default {
            info = info.push_next(&mut compression_info);
        }

        let info = self.fullscreen.augment(info);

        let swapchain = unsafe {
            self.swapchain_loader
                .create_swapchain(&info, None)
                .map_err(|e| {
                    wsi_err!(SOURCE, "Failed to create swapchain: {:?}", e)
                })?
        };

        self.fullscreen.after_create(swapchain);

        let images = unsafe {
            match self.swapchain_loader.get_swapchain_images(swapchain) {
                Ok(images) => images,
                Err(e) => {
                    self.swapchain_loader.destroy_swapchain(swapchain, None);
                    return Err(wsi_err!(SOURCE, "Failed to get swapchain images: {:?}", e));
                }
            }
        };

        Ok(CreatedChain {
            handle: ChainHandle(swapchain.as_raw()),
            images: images
                .into_iter()
                .map(|image| ImageHandle(image.as_raw()))
                .collect(),
        })
    }

    fn destroy_chain(&mut self, chain: ChainHandle) {
        let swapchain = vk::SwapchainKHR::from_raw(chain.0);
        self.fullscreen.before_destroy(swapchain);
        unsafe { self.swapchain_loader.destroy_swapchain(swapchain, None) };
    }

    fn acquire(&mut self, chain: ChainHandle, signal: SemaphoreHandle) -> AcquireOutcome {
        let result = unsafe {
            self.swapchain_loader.acquire_next_image(
                vk::SwapchainKHR::from_raw(chain.0),
                u64::MAX,
                vk::Semaphore::from_raw(signal.0),
                vk::Fence::null(),
            )
        };
        match result {
            Ok((index, suboptimal)) => AcquireOutcome::Acquired { index, suboptimal },
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) | Err(vk::Result::ERROR_SURFACE_LOST_KHR) => {
                AcquireOutcome::Stale
            }
            Err(vk::Result::ERROR_FULL_SCREEN_EXCLUSIVE_MODE_LOST_EXT) => AcquireOutcome::Stale,
            Err(e) => {
                wsi_error!(SOURCE, "vkAcquireNextImageKHR failed: {:?}", e);
                AcquireOutcome::Error
            }
        }
    }

    fn present(&mut self, request: &PresentRequest) -> PresentOutcome {
        let wait_semaphores = [vk::Semaphore::from_raw(request.wait.0)];
        let swapchains = [vk::SwapchainKHR::from_raw(request.chain.0)];
        let image_indices = [request.image_index];

        let mut info = vk::PresentInfoKHR::default()
            .wait_semaphores(&wait_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        let present_ids = [request.present_id.unwrap_or(0)];
        let mut id_info = vk::PresentIdKHR::default().present_ids(&present_ids);
        if request.present_id.is_some() {
            info = info.push_next(&mut id_info);
        }

        let fences = [request
            .present_fence
            .map(|fence| vk::Fence::from_raw(fence.0))
            .unwrap_or(vk::Fence::null())];
        let mut fence_info = vk::SwapchainPresentFenceInfoEXT::default().fences(&fences);
        if request.present_fence.is_some() {
            info = info.push_next(&mut fence_info);
        }

        let modes = [request
            .present_mode
            .map(convert::present_mode_to_vk)
            .unwrap_or(vk::PresentModeKHR::FIFO)];
        let mut mode_info = vk::SwapchainPresentModeInfoEXT::default().present_modes(&modes);
        if request.present_mode.is_some() {
            info = info.push_next(&mut mode_info);
        }

        let result = unsafe {
            self.swapchain_loader
                .queue_present(self.present_queue, &info)
        };
        match result {
            Ok(suboptimal) => PresentOutcome::Presented { suboptimal },
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR)
            | Err(vk::Result::ERROR_SURFACE_LOST_KHR)
            | Err(vk::Result::ERROR_FULL_SCREEN_EXCLUSIVE_MODE_LOST_EXT) => PresentOutcome::Stale,
            Err(e) => {
                wsi_error!(SOURCE, "vkQueuePresentKHR failed: {:?}", e);
                PresentOutcome::Error
            }
        }
    }

    fn create_semaphore(&mut self) -> Result<SemaphoreHandle> {
        let info = vk::SemaphoreCreateInfo::default();
        unsafe {
            self.device
                .create_semaphore(&info, None)
                .map(|semaphore| SemaphoreHandle(semaphore.as_raw()))
                .map_err(|e| wsi_err!(SOURCE, "Failed to create semaphore: {:?}", e))
        }
    }

    fn destroy_semaphore(&mut self, semaphore: SemaphoreHandle) {
        unsafe {
            self.device
                .destroy_semaphore(vk::Semaphore::from_raw(semaphore.0), None)
        };
    }

    fn create_fence(&mut self) -> Result<FenceHandle> {
        let info = vk::FenceCreateInfo::default();
        unsafe {
            self.device
                .create_fence(&info, None)
                .map(|fence| FenceHandle(fence.as_raw()))
                .map_err(|e| wsi_err!(SOURCE, "Failed to create fence: {:?}", e))
        }
    }

    fn destroy_fence(&mut self, fence: FenceHandle) {
        unsafe {
            self.device
                .destroy_fence(vk::Fence::from_raw(fence.0), None)
        };
    }

    fn fence_signalled(&mut self, fence: FenceHandle) -> bool {
        unsafe {
            self.device
                .get_fence_status(vk::Fence::from_raw(fence.0))
                .unwrap_or(false)
        }
    }

    fn wait_fence(&mut self, fence: FenceHandle, timeout_ns: u64) -> bool {
        let fences = [vk::Fence::from_raw(fence.0)];
        unsafe {
            self.device
                .wait_for_fences(&fences, true, timeout_ns)
                .is_ok()
        }
    }

    fn wait_for_present(&mut self, chain: ChainHandle, present_id: u64, timeout_ns: u64) -> bool {
        let loader = match self.present_wait_loader.as_ref() {
            Some(loader) => loader,
            None => return false,
        };
        unsafe {
            loader
                .wait_for_present(vk::SwapchainKHR::from_raw(chain.0), present_id, timeout_ns)
                .is_ok()
        }
    }

    fn wait_idle(&mut self) {
        unsafe {
            let _ = self.device.device_wait_idle();
        }
    }

    fn release_surface(&mut self) {
        if self.surface != vk::SurfaceKHR::null() {
            unsafe { self.surface_loader.destroy_surface(self.surface, None) };
            self.surface = vk::SurfaceKHR::null();
        }
    }

    fn adopt_surface(&mut self, surface: SurfaceHandle) {
        debug_assert_eq!(self.surface, vk::SurfaceKHR::null());
        self.surface = vk::SurfaceKHR::from_raw(surface.0);
    }
}
