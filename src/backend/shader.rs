// Shader module loading
//
// Vulkan consumes SPIR-V bytecode as 32-bit words. This module reads a
// compiled shader from disk and creates a shader module from it.

use anyhow::{Context, Result};
use ash::vk;
use std::path::Path;

use super::VulkanDevice;

/// Load a SPIR-V binary from disk and create a shader module.
pub fn load_shader_module<P: AsRef<Path>>(
    device: &VulkanDevice,
    path: P,
) -> Result<vk::ShaderModule> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read shader file: {:?}", path))?;

    let code = decode_spirv(&bytes)
        .with_context(|| format!("Invalid SPIR-V in {:?}", path))?;

    let create_info = vk::ShaderModuleCreateInfo::builder().code(&code);

    unsafe {
        device
            .device
            .create_shader_module(&create_info, None)
            .context("Failed to create shader module")
    }
}

/// Convert raw bytes to SPIR-V words, zero-padding a trailing partial word.
fn decode_spirv(bytes: &[u8]) -> Result<Vec<u32>> {
    anyhow::ensure!(!bytes.is_empty(), "shader binary is empty");

    let mut words = Vec::with_capacity(bytes.len().div_ceil(4));
    for chunk in bytes.chunks(4) {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        words.push(u32::from_le_bytes(word));
    }

    anyhow::ensure!(
        words[0] == SPIRV_MAGIC,
        "bad SPIR-V magic number {:#010x}",
        words[0]
    );

    Ok(words)
}

const SPIRV_MAGIC: u32 = 0x0723_0203;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_little_endian_words() {
        let bytes = [0x03, 0x02, 0x23, 0x07, 0xaa, 0xbb, 0xcc, 0xdd];
        let words = decode_spirv(&bytes).unwrap();
        assert_eq!(words, vec![SPIRV_MAGIC, 0xddcc_bbaa]);
    }

    #[test]
    fn pads_trailing_partial_word_with_zeros() {
        let bytes = [0x03, 0x02, 0x23, 0x07, 0xaa, 0xbb];
        let words = decode_spirv(&bytes).unwrap();
        assert_eq!(words, vec![SPIRV_MAGIC, 0x0000_bbaa]);
    }

    #[test]
    fn rejects_empty_input() {
        assert!(decode_spirv(&[]).is_err());
    }

    #[test]
    fn rejects_wrong_magic() {
        let bytes = [0xde, 0xad, 0xbe, 0xef];
        assert!(decode_spirv(&bytes).is_err());
    }
}
