// Command recording
//
// One transient pool on the compute queue family and a single primary
// command buffer, pre-recorded for a one-time submit: bind pipeline,
// bind descriptor set, dispatch the work-group grid.

use anyhow::{Context, Result};
use ash::vk;
use std::sync::Arc;

use super::{ComputePipeline, DescriptorSet, VulkanDevice};

pub struct CommandBuffer {
    device: Arc<VulkanDevice>,
    pub pool: vk::CommandPool,
    pub buffer: vk::CommandBuffer,
}

impl CommandBuffer {
    pub fn record(
        device: Arc<VulkanDevice>,
        pipeline: &ComputePipeline,
        descriptor: &DescriptorSet,
        group_counts: [u32; 3],
    ) -> Result<Self> {
        let pool_info = vk::CommandPoolCreateInfo::builder()
            .queue_family_index(device.compute_queue_family)
            .flags(vk::CommandPoolCreateFlags::TRANSIENT);

        let pool = unsafe {
            device
                .device
                .create_command_pool(&pool_info, None)
                .context("Failed to create command pool")?
        };

        let alloc_info = vk::CommandBufferAllocateInfo::builder()
            .command_pool(pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(1);

        let buffer = unsafe {
            device
                .device
                .allocate_command_buffers(&alloc_info)
                .context("Failed to allocate command buffer")?[0]
        };

        log::info!(
            "Dispatching {}x{}x{} work groups",
            group_counts[0],
            group_counts[1],
            group_counts[2]
        );

        unsafe {
            let begin_info = vk::CommandBufferBeginInfo::builder()
                .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
            device
                .device
                .begin_command_buffer(buffer, &begin_info)
                .context("Failed to begin command buffer")?;

            device.device.cmd_bind_pipeline(
                buffer,
                vk::PipelineBindPoint::COMPUTE,
                pipeline.pipeline,
            );
            device.device.cmd_bind_descriptor_sets(
                buffer,
                vk::PipelineBindPoint::COMPUTE,
                pipeline.layout,
                0,
                &[descriptor.set],
                &[],
            );
            device
                .device
                .cmd_dispatch(buffer, group_counts[0], group_counts[1], group_counts[2]);

            device
                .device
                .end_command_buffer(buffer)
                .context("Failed to end command buffer")?;
        }

        Ok(Self {
            device,
            pool,
            buffer,
        })
    }
}

impl Drop for CommandBuffer {
    fn drop(&mut self) {
        unsafe {
            self.device
                .device
                .free_command_buffers(self.pool, &[self.buffer]);
            self.device.device.destroy_command_pool(self.pool, None);
        }
    }
}

/// Work groups needed to cover `extent` pixels with groups of `local_size`.
pub fn group_count(extent: u32, local_size: u32) -> u32 {
    extent.div_ceil(local_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_multiple_needs_no_extra_group() {
        assert_eq!(group_count(3200, 32), 100);
        assert_eq!(group_count(2400, 32), 75);
    }

    #[test]
    fn remainder_rounds_up() {
        assert_eq!(group_count(33, 32), 2);
        assert_eq!(group_count(1, 32), 1);
    }

    #[test]
    fn zero_extent_dispatches_nothing() {
        assert_eq!(group_count(0, 32), 0);
    }
}
