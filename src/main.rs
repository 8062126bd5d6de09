// =============================================================================
// HEADLESS VULKAN COMPUTE RUNNER
// =============================================================================
//
// Single-shot GPU compute: a storage buffer of RGBA-f32 pixels is bound to
// a compute pipeline loaded from an external SPIR-V binary, a 2D grid of
// work groups is dispatched once, and the result is read back and saved
// as a PNG.
//
// RUN FLOW:
// 1. Load config.toml (image size, shader path, output path)
// 2. Create Vulkan device (instance -> physical device -> logical device)
// 3. Allocate host-visible storage buffer
// 4. Bind it through a descriptor set to the compute pipeline
// 5. Record + submit one command buffer, wait on a fence
// 6. Map the buffer, convert pixels to bytes, encode PNG
//
// Resources are torn down in reverse creation order via Drop.
//
// =============================================================================

mod backend;
mod config;

use anyhow::{Context, Result};
use ash::vk;
use backend::{command, CommandBuffer, ComputePipeline, DescriptorSet, Fence, StorageBuffer};
use bytemuck::{Pod, Zeroable};
use config::Config;
use image::{ImageBuffer, Rgba};

/// One pixel as the shader writes it: four f32 channels in 0..1.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
struct Pixel {
    r: f32,
    g: f32,
    b: f32,
    a: f32,
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let config = Config::load();
    log::info!("Starting compute run");
    log::info!("Image: {}x{}", config.image.width, config.image.height);
    log::info!("Shader: {}", config.compute.shader);

    run(&config)
}

fn run(config: &Config) -> Result<()> {
    let width = config.image.width;
    let height = config.image.height;
    let pixel_count = width as u64 * height as u64;
    let buffer_size = pixel_count * std::mem::size_of::<Pixel>() as u64;

    let enable_validation = cfg!(debug_assertions) && config.debug.validation_layers;
    let device = backend::VulkanDevice::new("Compute Runner", enable_validation)?;

    let buffer = StorageBuffer::new(device.clone(), buffer_size as vk::DeviceSize)?;
    let descriptor = DescriptorSet::new(device.clone(), &buffer)?;
    let pipeline = ComputePipeline::new(device.clone(), &descriptor, &config.compute.shader)?;

    let local_size = config.compute.workgroup_size;
    let command_buffer = CommandBuffer::record(
        device.clone(),
        &pipeline,
        &descriptor,
        [
            command::group_count(width, local_size),
            command::group_count(height, local_size),
            1,
        ],
    )?;

    let fence = Fence::new(device.clone())?;
    fence.submit(&command_buffer)?;
    fence.wait()?;
    log::info!("Compute dispatch complete");

    let pixels: Vec<Pixel> = buffer.read_back(pixel_count as usize)?;
    save_image(&pixels, width, height, &config.image.output)?;

    log::info!("Wrote {}", config.image.output);
    Ok(())
}

/// Encode the shader's f32 pixels as an RGBA8 PNG.
fn save_image(pixels: &[Pixel], width: u32, height: u32, path: &str) -> Result<()> {
    let bytes = pixels_to_rgba8(pixels);

    let image: ImageBuffer<Rgba<u8>, _> = ImageBuffer::from_raw(width, height, bytes)
        .context("Pixel data does not match image dimensions")?;

    image
        .save(path)
        .with_context(|| format!("Failed to write image to {}", path))?;

    Ok(())
}

fn pixels_to_rgba8(pixels: &[Pixel]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(pixels.len() * 4);
    for p in pixels {
        bytes.push(channel_to_u8(p.r));
        bytes.push(channel_to_u8(p.g));
        bytes.push(channel_to_u8(p.b));
        bytes.push(channel_to_u8(p.a));
    }
    bytes
}

fn channel_to_u8(value: f32) -> u8 {
    (255.0 * value.clamp(0.0, 1.0)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_conversion_clamps_out_of_range() {
        assert_eq!(channel_to_u8(0.0), 0);
        assert_eq!(channel_to_u8(1.0), 255);
        assert_eq!(channel_to_u8(-0.5), 0);
        assert_eq!(channel_to_u8(2.0), 255);
    }

    #[test]
    fn channel_conversion_is_monotonic() {
        assert_eq!(channel_to_u8(0.5), 127);
        assert!(channel_to_u8(0.25) < channel_to_u8(0.75));
    }

    #[test]
    fn pixels_interleave_in_rgba_order() {
        let pixels = [
            Pixel {
                r: 1.0,
                g: 0.0,
                b: 0.0,
                a: 1.0,
            },
            Pixel {
                r: 0.0,
                g: 1.0,
                b: 0.0,
                a: 1.0,
            },
        ];
        let bytes = pixels_to_rgba8(&pixels);
        assert_eq!(bytes, vec![255, 0, 0, 255, 0, 255, 0, 255]);
    }

    #[test]
    fn pixel_layout_matches_shader_struct() {
        // The shader writes vec4 floats; the host struct must be 16 bytes
        // with no padding for the mapped readback to line up.
        assert_eq!(std::mem::size_of::<Pixel>(), 16);
    }
}
