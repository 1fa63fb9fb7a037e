//! Buffer management for vertex data and uniforms

use std::ffi::c_void;

use ash::{vk, Device};

use crate::render::vulkan::VulkanContext;
use crate::render::{RenderError, RenderResult};

/// Round `instance_size` up to a multiple of `min_offset_alignment` (a power of two, or 0)
pub fn aligned_size(instance_size: vk::DeviceSize, min_offset_alignment: vk::DeviceSize) -> vk::DeviceSize {
    if min_offset_alignment > 0 {
        (instance_size + min_offset_alignment - 1) & !(min_offset_alignment - 1)
    } else {
        instance_size
    }
}

/// Number of whole `instance_size` instances in `len` bytes
fn whole_instances(len: usize, instance_size: vk::DeviceSize) -> RenderResult<u32> {
    let len_bytes = len as vk::DeviceSize;
    if instance_size == 0 || len_bytes % instance_size != 0 {
        return Err(RenderError::PartialInstance { len, instance_size });
    }
    u32::try_from(len_bytes / instance_size).map_err(|_| RenderError::PartialInstance { len, instance_size })
}

/// Buffer wrapper with memory management.
///
/// Holds `instance_count` instances of `instance_size` bytes, each starting
/// at a multiple of the alignment the buffer was created with.
pub struct Buffer {
    device: Device,
    buffer: vk::Buffer,
    memory: vk::DeviceMemory,
    mapped: *mut c_void,
    buffer_size: vk::DeviceSize,
}

impl Buffer {
    /// Create a buffer with its own memory allocation
    pub fn new(
        context: &VulkanContext,
        instance_size: vk::DeviceSize,
        instance_count: u32,
        usage: vk::BufferUsageFlags,
        properties: vk::MemoryPropertyFlags,
        min_offset_alignment: vk::DeviceSize,
    ) -> RenderResult<Self> {
        let device = context.device().clone();
        let alignment_size = aligned_size(instance_size, min_offset_alignment);
        let buffer_size = alignment_size * vk::DeviceSize::from(instance_count);

        let buffer_info = vk::BufferCreateInfo::builder()
            .size(buffer_size)
            .usage(usage)
            .sharing_mode(vk::SharingMode::EXCLUSIVE);
        let buffer = unsafe { device.create_buffer(&buffer_info, None)? };

        let mem_requirements = unsafe { device.get_buffer_memory_requirements(buffer) };
        let memory = context
            .physical_device()
            .find_memory_type(mem_requirements.memory_type_bits, properties)
            .and_then(|memory_type_index| {
                let alloc_info = vk::MemoryAllocateInfo::builder()
                    .allocation_size(mem_requirements.size)
                    .memory_type_index(memory_type_index);
                Ok(unsafe { device.allocate_memory(&alloc_info, None)? })
            });
        let memory = match memory {
            Ok(memory) => memory,
            Err(e) => {
                unsafe { device.destroy_buffer(buffer, None) };
                return Err(e);
            }
        };

        let buffer = Self {
            device,
            buffer,
            memory,
            mapped: std::ptr::null_mut(),
            buffer_size,
        };
        unsafe { buffer.device.bind_buffer_memory(buffer.buffer, buffer.memory, 0)? };

        Ok(buffer)
    }

    /// Create a device-local buffer filled with `bytes` through a staging copy
    ///
    /// `bytes` must hold a whole number of `instance_size` instances.
    pub fn device_local_with_data(
        context: &VulkanContext,
        bytes: &[u8],
        instance_size: vk::DeviceSize,
        usage: vk::BufferUsageFlags,
    ) -> RenderResult<Self> {
        let instance_count = whole_instances(bytes.len(), instance_size)?;

        let mut staging = Self::new(
            context,
            instance_size,
            instance_count,
            vk::BufferUsageFlags::TRANSFER_SRC,
            vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
            1,
        )?;
        staging.map()?;
        staging.write_to_buffer(bytes, 0);

        let buffer = Self::new(
            context,
            instance_size,
            instance_count,
            usage | vk::BufferUsageFlags::TRANSFER_DST,
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
            1,
        )?;

        let region = vk::BufferCopy {
            src_offset: 0,
            dst_offset: 0,
            size: buffer.buffer_size,
        };
        context
            .command_pool()
            .submit_single_time(context.graphics_queue(), |device, cmd| unsafe {
                device.cmd_copy_buffer(cmd, staging.handle(), buffer.handle(), &[region]);
            })?;

        Ok(buffer)
    }

    /// Map the whole buffer into host memory
    pub fn map(&mut self) -> RenderResult<()> {
        if self.mapped.is_null() {
            self.mapped = unsafe {
                self.device
                    .map_memory(self.memory, 0, vk::WHOLE_SIZE, vk::MemoryMapFlags::empty())?
            };
        }
        Ok(())
    }

    /// Unmap the buffer if it is mapped
    pub fn unmap(&mut self) {
        if !self.mapped.is_null() {
            unsafe { self.device.unmap_memory(self.memory) };
            self.mapped = std::ptr::null_mut();
        }
    }

    /// Copy `bytes` into the mapped buffer at `offset`
    ///
    /// # Panics
    /// If the buffer is not mapped or the write does not fit.
    pub fn write_to_buffer(&mut self, bytes: &[u8], offset: vk::DeviceSize) {
        assert!(!self.mapped.is_null(), "Cannot copy to unmapped buffer");
        assert!(
            offset + bytes.len() as vk::DeviceSize <= self.buffer_size,
            "Write of {} bytes at {} overflows buffer of {} bytes",
            bytes.len(),
            offset,
            self.buffer_size
        );

        unsafe {
            let dst = self.mapped.cast::<u8>().add(offset as usize);
            std::ptr::copy_nonoverlapping(bytes.as_ptr(), dst, bytes.len());
        }
    }

    /// Make host writes to the whole buffer visible to the device
    pub fn flush(&self) -> RenderResult<()> {
        let range = vk::MappedMemoryRange::builder()
            .memory(self.memory)
            .offset(0)
            .size(vk::WHOLE_SIZE)
            .build();
        unsafe { self.device.flush_mapped_memory_ranges(&[range])? };
        Ok(())
    }

    /// Descriptor info covering the whole buffer
    pub fn descriptor_info(&self) -> vk::DescriptorBufferInfo {
        vk::DescriptorBufferInfo {
            buffer: self.buffer,
            offset: 0,
            range: vk::WHOLE_SIZE,
        }
    }

    /// Get buffer handle
    pub fn handle(&self) -> vk::Buffer {
        self.buffer
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        self.unmap();
        unsafe {
            self.device.destroy_buffer(self.buffer, None);
            self.device.free_memory(self.memory, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aligned_size_rounds_up() {
        assert_eq!(aligned_size(544, 256), 768);
        assert_eq!(aligned_size(512, 256), 512);
        assert_eq!(aligned_size(36, 1), 36);
        assert_eq!(aligned_size(36, 0), 36);
    }

    #[test]
    fn test_whole_instances_counts_vertices() {
        assert_eq!(whole_instances(44 * 3, 44).unwrap(), 3);
        assert_eq!(whole_instances(0, 4).unwrap(), 0);
    }

    #[test]
    fn test_partial_instance_rejected() {
        assert!(matches!(
            whole_instances(44 * 3 + 2, 44),
            Err(RenderError::PartialInstance { len: 134, instance_size: 44 })
        ));
        assert!(whole_instances(8, 0).is_err());
    }
}
