// Synchronization primitives
//
// A single fence covers the whole run: submit once, block until the GPU
// signals completion.

use anyhow::{Context, Result};
use ash::vk;
use std::sync::Arc;

use super::{CommandBuffer, VulkanDevice};

/// Generous upper bound for one dispatch; a hung driver still times out.
const SUBMIT_TIMEOUT_NS: u64 = 1_000_000_000_000;

pub struct Fence {
    device: Arc<VulkanDevice>,
    pub fence: vk::Fence,
}

impl Fence {
    /// Create an unsignaled fence.
    pub fn new(device: Arc<VulkanDevice>) -> Result<Self> {
        let fence_info = vk::FenceCreateInfo::builder();

        let fence = unsafe {
            device
                .device
                .create_fence(&fence_info, None)
                .context("Failed to create fence")?
        };

        Ok(Self { device, fence })
    }

    /// Submit the command buffer to the compute queue, signaling this
    /// fence on completion.
    pub fn submit(&self, command_buffer: &CommandBuffer) -> Result<()> {
        let buffers = [command_buffer.buffer];
        let submit_info = vk::SubmitInfo::builder().command_buffers(&buffers);

        unsafe {
            self.device
                .device
                .queue_submit(
                    self.device.compute_queue,
                    &[submit_info.build()],
                    self.fence,
                )
                .context("Failed to submit command buffer")?;
        }

        Ok(())
    }

    /// Block the host until the fence is signaled.
    pub fn wait(&self) -> Result<()> {
        unsafe {
            self.device
                .device
                .wait_for_fences(&[self.fence], true, SUBMIT_TIMEOUT_NS)
                .context("Timed out waiting for compute dispatch")?;
        }
        Ok(())
    }
}

impl Drop for Fence {
    fn drop(&mut self) {
        unsafe {
            self.device.device.destroy_fence(self.fence, None);
        }
    }
}
