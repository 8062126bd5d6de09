// Compute pipeline creation
//
// Shader module + pipeline layout (one descriptor set layout, no push
// constants) + the compute pipeline itself, entry point "main".

use anyhow::{Context, Result};
use ash::vk;
use std::ffi::CStr;
use std::path::Path;
use std::sync::Arc;

use super::{shader, DescriptorSet, VulkanDevice};

const ENTRY_POINT: &CStr = c"main";

pub struct ComputePipeline {
    device: Arc<VulkanDevice>,
    pub shader_module: vk::ShaderModule,
    pub layout: vk::PipelineLayout,
    pub pipeline: vk::Pipeline,
}

impl ComputePipeline {
    pub fn new<P: AsRef<Path>>(
        device: Arc<VulkanDevice>,
        descriptor: &DescriptorSet,
        shader_path: P,
    ) -> Result<Self> {
        let shader_module = shader::load_shader_module(&device, shader_path)?;

        let stage = vk::PipelineShaderStageCreateInfo::builder()
            .stage(vk::ShaderStageFlags::COMPUTE)
            .module(shader_module)
            .name(ENTRY_POINT)
            .build();

        let layout_info = vk::PipelineLayoutCreateInfo::builder()
            .set_layouts(std::slice::from_ref(&descriptor.layout));

        let layout = unsafe {
            device
                .device
                .create_pipeline_layout(&layout_info, None)
                .context("Failed to create pipeline layout")?
        };

        let pipeline_info = vk::ComputePipelineCreateInfo::builder()
            .stage(stage)
            .layout(layout)
            .build();

        let pipelines = unsafe {
            device
                .device
                .create_compute_pipelines(vk::PipelineCache::null(), &[pipeline_info], None)
                .map_err(|(_, e)| e)
                .context("Failed to create compute pipeline")?
        };

        Ok(Self {
            device,
            shader_module,
            layout,
            pipeline: pipelines[0],
        })
    }
}

impl Drop for ComputePipeline {
    fn drop(&mut self) {
        unsafe {
            self.device.device.destroy_pipeline(self.pipeline, None);
            self.device.device.destroy_pipeline_layout(self.layout, None);
            self.device
                .device
                .destroy_shader_module(self.shader_module, None);
        }
    }
}
