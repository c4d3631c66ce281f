//! wgpu compute implementation of the transfer dispatch.
//!
//! Storage-buffer upload plus one compute pass per frame; workgroups
//! cover the maps in 8x8 texel tiles, which is why both map dimensions
//! must be multiples of 8.

use std::sync::Arc;

use glam::Mat4;

use super::map_layout::{validate_map_set, MapLayout};
use super::transfer::{TransferDispatch, TransferFrame};
use crate::error::{BakerError, BakerResult};

/// Uniform parameters for the transfer kernel. Layout must match
/// `TransferParams` in `shaders/transfer.wgsl`.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct TransferParams {
    transform: [[f32; 4]; 4],
    old_transform: [[f32; 4]; 4],
    element_count: u32,
    frame_rate: f32,
    _padding: [u32; 2],
}

/// Resources sized to one map layout; rebuilt on structural invalidation.
struct TransferResources {
    layout: MapLayout,
    position_buffer: wgpu::Buffer,
    old_position_buffer: wgpu::Buffer,
    normal_buffer: wgpu::Buffer,
    params_buffer: wgpu::Buffer,
    position_map: wgpu::Texture,
    velocity_map: wgpu::Texture,
    normal_map: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

pub struct GpuTransferDispatch {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    resources: Option<TransferResources>,
}

impl GpuTransferDispatch {
    pub fn new(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Transfer Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/transfer.wgsl").into()),
        });

        let storage_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only: true },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };
        let map_entry = |binding: u32, format: wgpu::TextureFormat| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::StorageTexture {
                access: wgpu::StorageTextureAccess::WriteOnly,
                format,
                view_dimension: wgpu::TextureViewDimension::D2,
            },
            count: None,
        };

        let bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Transfer Bind Group Layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    storage_entry(1),
                    storage_entry(2),
                    storage_entry(3),
                    map_entry(4, wgpu::TextureFormat::Rgba32Float),
                    map_entry(5, wgpu::TextureFormat::Rgba16Float),
                    map_entry(6, wgpu::TextureFormat::Rgba16Float),
                ],
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Transfer Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Transfer Pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: "transfer",
        });

        Self {
            device,
            queue,
            pipeline,
            bind_group_layout,
            resources: None,
        }
    }

    /// Position map texture, full precision (`Rgba32Float`).
    pub fn position_map(&self) -> Option<&wgpu::Texture> {
        self.resources.as_ref().map(|r| &r.position_map)
    }

    /// Velocity map texture, half precision (`Rgba16Float`).
    pub fn velocity_map(&self) -> Option<&wgpu::Texture> {
        self.resources.as_ref().map(|r| &r.velocity_map)
    }

    /// Normal map texture, half precision (`Rgba16Float`).
    pub fn normal_map(&self) -> Option<&wgpu::Texture> {
        self.resources.as_ref().map(|r| &r.normal_map)
    }

    fn create_map(&self, label: &str, layout: MapLayout, format: wgpu::TextureFormat) -> wgpu::Texture {
        self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: layout.width,
                height: layout.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::STORAGE_BINDING
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        })
    }

    fn create_position_buffer(&self, label: &str, texels: usize) -> wgpu::Buffer {
        self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: (texels * 3 * std::mem::size_of::<f32>()) as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }
}

impl TransferDispatch for GpuTransferDispatch {
    fn prepare(&mut self, layout: MapLayout) -> BakerResult<()> {
        layout.validate()?;
        let texels = layout.texel_count();

        let position_buffer = self.create_position_buffer("Transfer Position Buffer", texels);
        let old_position_buffer =
            self.create_position_buffer("Transfer Old Position Buffer", texels);
        let normal_buffer = self.create_position_buffer("Transfer Normal Buffer", texels);

        let params_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Transfer Params"),
            size: std::mem::size_of::<TransferParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let position_map =
            self.create_map("Position Map", layout, wgpu::TextureFormat::Rgba32Float);
        let velocity_map =
            self.create_map("Velocity Map", layout, wgpu::TextureFormat::Rgba16Float);
        let normal_map = self.create_map("Normal Map", layout, wgpu::TextureFormat::Rgba16Float);

        // Check the maps as allocated, not the layout they were asked
        // for: a mismatched set must fail here, before any dispatch.
        let layout_of = |texture: &wgpu::Texture| MapLayout {
            width: texture.width(),
            height: texture.height(),
        };
        validate_map_set(
            layout_of(&position_map),
            layout_of(&velocity_map),
            layout_of(&normal_map),
        )?;

        let position_view = position_map.create_view(&wgpu::TextureViewDescriptor::default());
        let velocity_view = velocity_map.create_view(&wgpu::TextureViewDescriptor::default());
        let normal_view = normal_map.create_view(&wgpu::TextureViewDescriptor::default());

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Transfer Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: params_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: position_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: old_position_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: normal_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::TextureView(&position_view),
                },
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: wgpu::BindingResource::TextureView(&velocity_view),
                },
                wgpu::BindGroupEntry {
                    binding: 6,
                    resource: wgpu::BindingResource::TextureView(&normal_view),
                },
            ],
        });

        log::info!(
            "[GpuTransferDispatch::prepare] allocated {}x{} maps ({} texels)",
            layout.width,
            layout.height,
            texels
        );

        self.resources = Some(TransferResources {
            layout,
            position_buffer,
            old_position_buffer,
            normal_buffer,
            params_buffer,
            position_map,
            velocity_map,
            normal_map,
            bind_group,
        });
        Ok(())
    }

    fn layout(&self) -> Option<MapLayout> {
        self.resources.as_ref().map(|r| r.layout)
    }

    fn transfer(&mut self, frame: &TransferFrame<'_>) -> BakerResult<()> {
        let resources = self.resources.as_ref().ok_or(BakerError::GpuOperationFailed {
            operation: "transfer".to_string(),
            error: "dispatch not prepared".to_string(),
        })?;

        if frame.element_count > resources.layout.texel_count() {
            return Err(BakerError::BufferSizeMismatch {
                buffer: "destination maps",
                expected: frame.element_count,
                found: resources.layout.texel_count(),
            });
        }
        for (name, buffer) in [
            ("positions", frame.positions),
            ("previous positions", frame.previous_positions),
            ("normals", frame.normals),
        ] {
            if buffer.len() != frame.element_count {
                return Err(BakerError::BufferSizeMismatch {
                    buffer: name,
                    expected: frame.element_count,
                    found: buffer.len(),
                });
            }
        }

        let params = TransferParams {
            transform: mat4_to_cols(frame.transform),
            old_transform: mat4_to_cols(frame.old_transform),
            element_count: frame.element_count as u32,
            frame_rate: frame.frame_rate,
            _padding: [0; 2],
        };

        self.queue
            .write_buffer(&resources.params_buffer, 0, bytemuck::bytes_of(&params));
        self.queue.write_buffer(
            &resources.position_buffer,
            0,
            bytemuck::cast_slice(frame.positions),
        );
        self.queue.write_buffer(
            &resources.old_position_buffer,
            0,
            bytemuck::cast_slice(frame.previous_positions),
        );
        self.queue.write_buffer(
            &resources.normal_buffer,
            0,
            bytemuck::cast_slice(frame.normals),
        );

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Transfer Encoder"),
            });

        {
            let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Transfer Pass"),
                timestamp_writes: None,
            });
            compute_pass.set_pipeline(&self.pipeline);
            compute_pass.set_bind_group(0, &resources.bind_group, &[]);
            // One 8x8 workgroup per texel tile; the layout validator
            // guarantees both dimensions divide evenly.
            compute_pass.dispatch_workgroups(
                resources.layout.width / 8,
                resources.layout.height / 8,
                1,
            );
        }

        // Submission order is the bake -> transfer barrier: map reads
        // queued after this see the whole frame or none of it.
        self.queue.submit(std::iter::once(encoder.finish()));

        log::debug!(
            "[GpuTransferDispatch::transfer] dispatched {} elements into {}x{} maps",
            frame.element_count,
            resources.layout.width,
            resources.layout.height
        );

        Ok(())
    }
}

fn mat4_to_cols(m: Mat4) -> [[f32; 4]; 4] {
    m.to_cols_array_2d()
}
