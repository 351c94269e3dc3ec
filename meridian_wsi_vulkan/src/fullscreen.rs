//! Exclusive-fullscreen strategies
//!
//! Selected at display-engine construction; the core state machine never
//! branches on the OS. `Windowed` is the portable default;
//! `AppControlledExclusive` requests application-controlled exclusive
//! access and treats failure as non-fatal (compositor fallback).

use ash::vk;
use meridian_wsi::wsi_warn;

/// Strategy hook around swapchain creation.
pub trait FullscreenStrategy: Send {
    /// Chance to extend the creation info (pNext) before the native call.
    fn augment<'a>(
        &'a mut self,
        info: vk::SwapchainCreateInfoKHR<'a>,
    ) -> vk::SwapchainCreateInfoKHR<'a>;

    /// Called after a successful creation.
    fn after_create(&mut self, swapchain: vk::SwapchainKHR);

    /// Called before the chain is retired.
    fn before_destroy(&mut self, _swapchain: vk::SwapchainKHR) {}
}

/// Windowed/borderless compositing; no exclusive access requested.
pub struct Windowed;

impl FullscreenStrategy for Windowed {
    fn augment<'a>(
        &'a mut self,
        info: vk::SwapchainCreateInfoKHR<'a>,
    ) -> vk::SwapchainCreateInfoKHR<'a> {
        info
    }

    fn after_create(&mut self, _swapchain: vk::SwapchainKHR) {}
}

/// Application-controlled exclusive fullscreen.
pub struct AppControlledExclusive {
    loader: ash::ext::full_screen_exclusive::Device,
    info: vk::SurfaceFullScreenExclusiveInfoEXT<'static>,
    acquired: bool,
}

impl AppControlledExclusive {
    pub fn new(instance: &ash::Instance, device: &ash::Device) -> Self {
        Self {
            loader: ash::ext::full_screen_exclusive::Device::new(instance, device),
            info: vk::SurfaceFullScreenExclusiveInfoEXT::default()
                .full_screen_exclusive(vk::FullScreenExclusiveEXT::APPLICATION_CONTROLLED),
            acquired: false,
        }
    }
}

impl FullscreenStrategy for AppControlledExclusive {
    fn augment<'a>(
        &'a mut self,
        info: vk::SwapchainCreateInfoKHR<'a>,
    ) -> vk::SwapchainCreateInfoKHR<'a> {
        info.push_next(&mut self.info)
    }

    fn after_create(&mut self, swapchain: vk::SwapchainKHR) {
        match unsafe { self.loader.acquire_full_screen_exclusive_mode(swapchain) } {
            Ok(()) => self.acquired = true,
            Err(e) => {
                // Falls back to windowed/borderless compositing.
                wsi_warn!(
                    "meridian::vulkan",
                    "Exclusive fullscreen not acquired ({:?}), staying composited",
                    e
                );
                self.acquired = false;
            }
        }
    }

    fn before_destroy(&mut self, swapchain: vk::SwapchainKHR) {
        if self.acquired {
            unsafe {
                let _ = self.loader.release_full_screen_exclusive_mode(swapchain);
            }
            self.acquired = false;
        }
    }
}
