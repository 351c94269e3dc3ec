//! NV low-latency hook strategy
//!
//! Implements the vendor marker/sleep protocol over `VK_NV_low_latency2`.
//! Best-effort: every native failure is swallowed, the generic
//! present-wait gate stays authoritative for pacing.

use ash::vk;
use ash::vk::Handle;
use meridian_wsi::{ChainHandle, LatencyHooks, LatencyMarker};

pub struct NvLowLatency {
    loader: ash::nv::low_latency2::Device,
    device: ash::Device,

    /// Timeline semaphore the driver signals when simulation may begin.
    timeline: vk::Semaphore,
    sleep_value: u64,
    enabled: bool,
}

impl NvLowLatency {
    pub fn new(instance: &ash::Instance, device: &ash::Device) -> Self {
        let timeline = unsafe {
            let mut type_info = vk::SemaphoreTypeCreateInfo::default()
                .semaphore_type(vk::SemaphoreType::TIMELINE)
                .initial_value(0);
            let create_info = vk::SemaphoreCreateInfo::default().push_next(&mut type_info);
            device
                .create_semaphore(&create_info, None)
                .unwrap_or(vk::Semaphore::null())
        };
        Self {
            loader: ash::nv::low_latency2::Device::new(instance, device),
            device: device.clone(),
            timeline,
            sleep_value: 0,
            enabled: false,
        }
    }

    fn marker_to_vk(marker: LatencyMarker) -> vk::LatencyMarkerNV {
        match marker {
            LatencyMarker::InputSample => vk::LatencyMarkerNV::INPUT_SAMPLE,
            LatencyMarker::SimulationStart => vk::LatencyMarkerNV::SIMULATION_START,
            LatencyMarker::SimulationEnd => vk::LatencyMarkerNV::SIMULATION_END,
            LatencyMarker::RenderSubmitEnd => vk::LatencyMarkerNV::RENDERSUBMIT_END,
            LatencyMarker::PresentStart => vk::LatencyMarkerNV::PRESENT_START,
            LatencyMarker::PresentEnd => vk::LatencyMarkerNV::PRESENT_END,
        }
    }
}

impl LatencyHooks for NvLowLatency {
    fn configure(&mut self, chain: ChainHandle, low_latency: bool, boost: bool) {
        self.enabled = low_latency;
        let info = vk::LatencySleepModeInfoNV::default()
            .low_latency_mode(low_latency)
            .low_latency_boost(boost)
            .minimum_interval_us(0);
        unsafe {
            let _ = self
                .loader
                .set_latency_sleep_mode(vk::SwapchainKHR::from_raw(chain.0), Some(&info));
        }
    }

    fn marker(&mut self, chain: ChainHandle, marker: LatencyMarker, present_id: u64) {
        if !self.enabled {
            return;
        }
        let info = vk::SetLatencyMarkerInfoNV::default()
            .present_id(present_id)
            .marker(Self::marker_to_vk(marker));
        unsafe {
            self.loader
                .set_latency_marker(vk::SwapchainKHR::from_raw(chain.0), &info);
        }
    }

    fn sleep(&mut self, chain: ChainHandle) {
        if !self.enabled || self.timeline == vk::Semaphore::null() {
            return;
        }
        self.sleep_value += 1;
        let info = vk::LatencySleepInfoNV::default()
            .signal_semaphore(self.timeline)
            .value(self.sleep_value);
        let slept = unsafe {
            self.loader
                .latency_sleep(vk::SwapchainKHR::from_raw(chain.0), &info)
                .is_ok()
        };
        if !slept {
            return;
        }

        let semaphores = [self.timeline];
        let values = [self.sleep_value];
        let wait_info = vk::SemaphoreWaitInfo::default()
            .semaphores(&semaphores)
            .values(&values);
        unsafe {
            // One second bound; a driver that never signals must not hang
            // the frame loop.
            let _ = self.device.wait_semaphores(&wait_info, 1_000_000_000);
        }
    }
}

impl Drop for NvLowLatency {
    fn drop(&mut self) {
        if self.timeline != vk::Semaphore::null() {
            unsafe { self.device.destroy_semaphore(self.timeline, None) };
        }
    }
}
