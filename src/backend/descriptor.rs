// Descriptor set wiring
//
// One layout with a single STORAGE_BUFFER binding at binding 0 for the
// compute stage, a pool sized for exactly one set, and the set itself
// pointing at the whole pixel buffer.

use anyhow::{Context, Result};
use ash::vk;
use std::sync::Arc;

use super::{StorageBuffer, VulkanDevice};

pub struct DescriptorSet {
    device: Arc<VulkanDevice>,
    pub layout: vk::DescriptorSetLayout,
    pub pool: vk::DescriptorPool,
    pub set: vk::DescriptorSet,
}

impl DescriptorSet {
    pub fn new(device: Arc<VulkanDevice>, buffer: &StorageBuffer) -> Result<Self> {
        let binding = vk::DescriptorSetLayoutBinding::builder()
            .binding(0)
            .descriptor_type(vk::DescriptorType::STORAGE_BUFFER)
            .descriptor_count(1)
            .stage_flags(vk::ShaderStageFlags::COMPUTE)
            .build();

        let layout_info =
            vk::DescriptorSetLayoutCreateInfo::builder().bindings(std::slice::from_ref(&binding));

        let layout = unsafe {
            device
                .device
                .create_descriptor_set_layout(&layout_info, None)
                .context("Failed to create descriptor set layout")?
        };

        let pool_size = vk::DescriptorPoolSize::builder()
            .ty(vk::DescriptorType::STORAGE_BUFFER)
            .descriptor_count(1)
            .build();

        let pool_info = vk::DescriptorPoolCreateInfo::builder()
            .max_sets(1)
            .pool_sizes(std::slice::from_ref(&pool_size));

        let pool = unsafe {
            device
                .device
                .create_descriptor_pool(&pool_info, None)
                .context("Failed to create descriptor pool")?
        };

        let alloc_info = vk::DescriptorSetAllocateInfo::builder()
            .descriptor_pool(pool)
            .set_layouts(std::slice::from_ref(&layout));

        let set = unsafe {
            device
                .device
                .allocate_descriptor_sets(&alloc_info)
                .context("Failed to allocate descriptor set")?[0]
        };

        // Point binding 0 at the whole buffer
        let buffer_info = vk::DescriptorBufferInfo::builder()
            .buffer(buffer.buffer)
            .offset(0)
            .range(buffer.size)
            .build();

        let write = vk::WriteDescriptorSet::builder()
            .dst_set(set)
            .dst_binding(0)
            .descriptor_type(vk::DescriptorType::STORAGE_BUFFER)
            .buffer_info(std::slice::from_ref(&buffer_info))
            .build();

        unsafe {
            device.device.update_descriptor_sets(&[write], &[]);
        }

        Ok(Self {
            device,
            layout,
            pool,
            set,
        })
    }
}

impl Drop for DescriptorSet {
    fn drop(&mut self) {
        unsafe {
            // Freeing the pool releases the set allocated from it
            self.device.device.destroy_descriptor_pool(self.pool, None);
            self.device
                .device
                .destroy_descriptor_set_layout(self.layout, None);
        }
    }
}
