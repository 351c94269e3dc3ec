//! Surface creation helper
//!
//! The platform adapter owns the window; this helper turns its raw
//! handles into a `VkSurfaceKHR` for the display engine to adopt.

use ash::vk;
use meridian_wsi::{wsi_err, Result, SurfaceHandle};
use raw_window_handle::{RawDisplayHandle, RawWindowHandle};

use ash::vk::Handle;

/// Create a surface from raw display/window handles.
pub fn create_surface(
    entry: &ash::Entry,
    instance: &ash::Instance,
    display_handle: RawDisplayHandle,
    window_handle: RawWindowHandle,
) -> Result<SurfaceHandle> {
    let surface = unsafe {
        ash_window::create_surface(entry, instance, display_handle, window_handle, None)
            .map_err(|e| wsi_err!("meridian::vulkan", "Failed to create surface: {:?}", e))?
    };
    Ok(SurfaceHandle(surface.as_raw()))
}

/// Destroy a surface previously created with [`create_surface`] (or
/// released from a display engine at teardown).
pub fn destroy_surface(entry: &ash::Entry, instance: &ash::Instance, surface: SurfaceHandle) {
    let loader = ash::khr::surface::Instance::new(entry, instance);
    let surface = vk::SurfaceKHR::from_raw(surface.0);
    if surface != vk::SurfaceKHR::null() {
        unsafe { loader.destroy_surface(surface, None) };
    }
}
