// Backend module - Vulkan abstraction layer
//
// Design: Thin wrappers around ash handles, each owning its resources
// and releasing them in Drop so teardown stays in reverse creation order.

pub mod buffer;
pub mod command;
pub mod descriptor;
pub mod device;
pub mod pipeline;
pub mod shader;
pub mod sync;

pub use buffer::StorageBuffer;
pub use command::CommandBuffer;
pub use descriptor::DescriptorSet;
pub use device::VulkanDevice;
pub use pipeline::ComputePipeline;
pub use sync::Fence;
