// Storage buffer utilities
//
// A single host-visible buffer backs the whole run: the shader writes
// pixels into it and the host maps it afterwards to read them back.

use anyhow::{Context, Result};
use ash::vk;
use bytemuck::Zeroable;
use std::sync::Arc;

use super::VulkanDevice;

/// A storage buffer with its backing allocation.
///
/// Memory is HOST_VISIBLE | HOST_COHERENT so the results can be mapped
/// directly without a staging copy.
pub struct StorageBuffer {
    device: Arc<VulkanDevice>,
    pub buffer: vk::Buffer,
    pub memory: vk::DeviceMemory,
    pub size: vk::DeviceSize,
}

impl StorageBuffer {
    pub fn new(device: Arc<VulkanDevice>, size: vk::DeviceSize) -> Result<Self> {
        let buffer_info = vk::BufferCreateInfo::builder()
            .size(size)
            .usage(vk::BufferUsageFlags::STORAGE_BUFFER)
            .sharing_mode(vk::SharingMode::EXCLUSIVE);

        let buffer = unsafe {
            device
                .device
                .create_buffer(&buffer_info, None)
                .context("Failed to create storage buffer")?
        };

        let mem_requirements = unsafe { device.device.get_buffer_memory_requirements(buffer) };

        let memory_type_index = find_memory_type(
            &device,
            mem_requirements.memory_type_bits,
            vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
        )?;

        let alloc_info = vk::MemoryAllocateInfo::builder()
            .allocation_size(mem_requirements.size)
            .memory_type_index(memory_type_index);

        let memory = unsafe {
            device
                .device
                .allocate_memory(&alloc_info, None)
                .context("Failed to allocate buffer memory")?
        };

        unsafe {
            device
                .device
                .bind_buffer_memory(buffer, memory, 0)
                .context("Failed to bind buffer memory")?;
        }

        log::debug!("Allocated storage buffer of {} bytes", size);

        Ok(Self {
            device,
            buffer,
            memory,
            size,
        })
    }

    /// Map the buffer and copy its contents out as `count` elements of `T`.
    ///
    /// Only valid once the GPU work writing the buffer has completed
    /// (the caller waits on the submit fence first).
    pub fn read_back<T: bytemuck::Pod>(&self, count: usize) -> Result<Vec<T>> {
        let byte_len = std::mem::size_of::<T>() * count;
        anyhow::ensure!(
            byte_len as vk::DeviceSize <= self.size,
            "Readback of {} bytes exceeds buffer size {}",
            byte_len,
            self.size
        );

        let mut out = vec![T::zeroed(); count];

        unsafe {
            let ptr = self
                .device
                .device
                .map_memory(self.memory, 0, self.size, vk::MemoryMapFlags::empty())
                .context("Failed to map buffer memory")? as *const T;

            std::ptr::copy_nonoverlapping(ptr, out.as_mut_ptr(), count);
            self.device.device.unmap_memory(self.memory);
        }

        Ok(out)
    }
}

impl Drop for StorageBuffer {
    fn drop(&mut self) {
        unsafe {
            self.device.device.free_memory(self.memory, None);
            self.device.device.destroy_buffer(self.buffer, None);
        }
    }
}

/// Find a suitable memory type index
fn find_memory_type(
    device: &VulkanDevice,
    type_filter: u32,
    properties: vk::MemoryPropertyFlags,
) -> Result<u32> {
    let mem_properties = &device.memory_properties;

    for i in 0..mem_properties.memory_type_count {
        let has_type = (type_filter & (1 << i)) != 0;
        let has_properties = mem_properties.memory_types[i as usize]
            .property_flags
            .contains(properties);

        if has_type && has_properties {
            return Ok(i);
        }
    }

    anyhow::bail!("Failed to find suitable memory type")
}
