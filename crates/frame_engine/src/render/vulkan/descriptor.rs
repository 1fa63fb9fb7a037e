//! Vulkan descriptor set and resource binding management
//!
//! Builders for set layouts and pools, plus [`DescriptorWriter`] which
//! allocates a set from a pool and fills it in one step.

use std::collections::BTreeMap;

use ash::{vk, Device};

use crate::render::RenderResult;

/// Descriptor set layout builder for creating reusable layouts
#[derive(Default)]
pub struct DescriptorSetLayoutBuilder {
    bindings: BTreeMap<u32, vk::DescriptorSetLayoutBinding>,
}

impl DescriptorSetLayoutBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a binding
    ///
    /// # Panics
    /// If `binding` is already in use.
    pub fn add_binding(
        mut self,
        binding: u32,
        descriptor_type: vk::DescriptorType,
        stage_flags: vk::ShaderStageFlags,
        count: u32,
    ) -> Self {
        assert!(!self.bindings.contains_key(&binding), "Binding {} already in use", binding);
        self.bindings.insert(
            binding,
            vk::DescriptorSetLayoutBinding::builder()
                .binding(binding)
                .descriptor_type(descriptor_type)
                .descriptor_count(count)
                .stage_flags(stage_flags)
                .build(),
        );
        self
    }

    /// Add a single uniform buffer binding
    pub fn add_uniform_buffer(self, binding: u32, stage_flags: vk::ShaderStageFlags) -> Self {
        self.add_binding(binding, vk::DescriptorType::UNIFORM_BUFFER, stage_flags, 1)
    }

    /// Build the descriptor set layout
    pub fn build(self, device: &Device) -> RenderResult<DescriptorSetLayout> {
        let bindings: Vec<_> = self.bindings.into_values().collect();
        let layout_info = vk::DescriptorSetLayoutCreateInfo::builder().bindings(&bindings);
        let layout = unsafe { device.create_descriptor_set_layout(&layout_info, None)? };

        Ok(DescriptorSetLayout {
            layout,
            device: device.clone(),
            bindings,
        })
    }
}

/// Descriptor set layout wrapper with automatic cleanup
pub struct DescriptorSetLayout {
    layout: vk::DescriptorSetLayout,
    device: Device,
    bindings: Vec<vk::DescriptorSetLayoutBinding>,
}

impl DescriptorSetLayout {
    /// Get the Vulkan descriptor set layout handle
    pub fn handle(&self) -> vk::DescriptorSetLayout {
        self.layout
    }

    fn binding(&self, binding: u32) -> Option<&vk::DescriptorSetLayoutBinding> {
        self.bindings.iter().find(|b| b.binding == binding)
    }
}

impl Drop for DescriptorSetLayout {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_descriptor_set_layout(self.layout, None);
        }
    }
}

/// Builder for [`DescriptorPool`]
pub struct DescriptorPoolBuilder {
    pool_sizes: Vec<vk::DescriptorPoolSize>,
    max_sets: u32,
}

impl Default for DescriptorPoolBuilder {
    fn default() -> Self {
        Self {
            pool_sizes: Vec::new(),
            max_sets: 1000,
        }
    }
}

impl DescriptorPoolBuilder {
    /// Create a builder with room for 1000 sets and no descriptors
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve `count` descriptors of `descriptor_type`
    pub fn add_pool_size(mut self, descriptor_type: vk::DescriptorType, count: u32) -> Self {
        self.pool_sizes.push(vk::DescriptorPoolSize {
            ty: descriptor_type,
            descriptor_count: count,
        });
        self
    }

    /// Maximum number of sets allocated at once
    pub fn max_sets(mut self, count: u32) -> Self {
        self.max_sets = count;
        self
    }

    /// Build the pool
    pub fn build(self, device: &Device) -> RenderResult<DescriptorPool> {
        let pool_info = vk::DescriptorPoolCreateInfo::builder()
            .pool_sizes(&self.pool_sizes)
            .max_sets(self.max_sets);
        let pool = unsafe { device.create_descriptor_pool(&pool_info, None)? };

        Ok(DescriptorPool {
            pool,
            device: device.clone(),
        })
    }
}

/// Descriptor pool for allocating descriptor sets
pub struct DescriptorPool {
    pool: vk::DescriptorPool,
    device: Device,
}

impl DescriptorPool {
    /// Allocate one set with `layout`
    pub fn allocate_descriptor(&self, layout: &DescriptorSetLayout) -> RenderResult<vk::DescriptorSet> {
        let layouts = [layout.handle()];
        let alloc_info = vk::DescriptorSetAllocateInfo::builder()
            .descriptor_pool(self.pool)
            .set_layouts(&layouts);
        let sets = unsafe { self.device.allocate_descriptor_sets(&alloc_info)? };
        Ok(sets[0])
    }

    /// Get the pool handle
    pub fn handle(&self) -> vk::DescriptorPool {
        self.pool
    }
}

impl Drop for DescriptorPool {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_descriptor_pool(self.pool, None);
        }
    }
}

/// Allocates a descriptor set and writes buffer bindings into it
pub struct DescriptorWriter<'a> {
    layout: &'a DescriptorSetLayout,
    pool: &'a DescriptorPool,
    buffer_writes: Vec<(u32, vk::DescriptorBufferInfo)>,
}

impl<'a> DescriptorWriter<'a> {
    /// Start writing a set of `layout` allocated from `pool`
    pub fn new(layout: &'a DescriptorSetLayout, pool: &'a DescriptorPool) -> Self {
        Self {
            layout,
            pool,
            buffer_writes: Vec::new(),
        }
    }

    /// Bind `buffer_info` at `binding`
    ///
    /// # Panics
    /// If the layout has no single-descriptor binding at `binding`.
    pub fn write_buffer(mut self, binding: u32, buffer_info: vk::DescriptorBufferInfo) -> Self {
        let description = self
            .layout
            .binding(binding)
            .unwrap_or_else(|| panic!("Layout does not contain binding {}", binding));
        assert_eq!(
            description.descriptor_count, 1,
            "Binding {} expects multiple descriptors",
            binding
        );
        self.buffer_writes.push((binding, buffer_info));
        self
    }

    /// Allocate the set and apply the writes
    pub fn build(self) -> RenderResult<vk::DescriptorSet> {
        let set = self.pool.allocate_descriptor(self.layout)?;
        self.overwrite(set);
        Ok(set)
    }

    /// Apply the writes to an existing set
    pub fn overwrite(&self, set: vk::DescriptorSet) {
        let infos: Vec<[vk::DescriptorBufferInfo; 1]> = self.buffer_writes.iter().map(|(_, info)| [*info]).collect();
        let writes: Vec<vk::WriteDescriptorSet> = self
            .buffer_writes
            .iter()
            .zip(infos.iter())
            .filter_map(|((binding, _), info)| {
                let description = self.layout.binding(*binding)?;
                Some(
                    vk::WriteDescriptorSet::builder()
                        .dst_set(set)
                        .dst_binding(*binding)
                        .descriptor_type(description.descriptor_type)
                        .buffer_info(info)
                        .build(),
                )
            })
            .collect();

        unsafe { self.pool.device.update_descriptor_sets(&writes, &[]) };
    }
}
