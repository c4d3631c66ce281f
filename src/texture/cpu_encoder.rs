//! CPU reference implementation of the transfer dispatch.
//!
//! Produces the same texel data as the compute kernel, into plain Vecs:
//! full-precision RGBA position texels, half-precision RGBA velocity
//! and normal texels. Always available; the test suite runs against it.

use glam::Vec3;
use half::f16;
use rayon::prelude::*;

use super::map_layout::MapLayout;
use super::transfer::{TransferDispatch, TransferFrame};
use crate::error::{BakerError, BakerResult};

pub struct CpuTransferEncoder {
    layout: Option<MapLayout>,
    position_map: Vec<[f32; 4]>,
    velocity_map: Vec<[f16; 4]>,
    normal_map: Vec<[f16; 4]>,
    transfer_count: u64,
}

impl CpuTransferEncoder {
    pub fn new() -> Self {
        Self {
            layout: None,
            position_map: Vec::new(),
            velocity_map: Vec::new(),
            normal_map: Vec::new(),
            transfer_count: 0,
        }
    }

    pub fn position_map(&self) -> &[[f32; 4]] {
        &self.position_map
    }

    pub fn velocity_map(&self) -> &[[f16; 4]] {
        &self.velocity_map
    }

    pub fn normal_map(&self) -> &[[f16; 4]] {
        &self.normal_map
    }

    /// Completed transfers since creation. Zero after a rejected
    /// configuration means the pipeline really did stay inert.
    pub fn transfer_count(&self) -> u64 {
        self.transfer_count
    }

    fn texel_index(&self, x: u32, y: u32) -> Option<usize> {
        let layout = self.layout?;
        if x >= layout.width || y >= layout.height {
            return None;
        }
        Some((y * layout.width + x) as usize)
    }

    /// Decoded world-space position at a texel.
    pub fn position_at(&self, x: u32, y: u32) -> Option<Vec3> {
        let texel = self.position_map[self.texel_index(x, y)?];
        Some(Vec3::new(texel[0], texel[1], texel[2]))
    }

    /// Decoded world-space velocity at a texel.
    pub fn velocity_at(&self, x: u32, y: u32) -> Option<Vec3> {
        let texel = self.velocity_map[self.texel_index(x, y)?];
        Some(Vec3::new(
            texel[0].to_f32(),
            texel[1].to_f32(),
            texel[2].to_f32(),
        ))
    }

    /// Decoded world-space normal at a texel.
    pub fn normal_at(&self, x: u32, y: u32) -> Option<Vec3> {
        let texel = self.normal_map[self.texel_index(x, y)?];
        Some(Vec3::new(
            texel[0].to_f32(),
            texel[1].to_f32(),
            texel[2].to_f32(),
        ))
    }
}

impl Default for CpuTransferEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl TransferDispatch for CpuTransferEncoder {
    fn prepare(&mut self, layout: MapLayout) -> BakerResult<()> {
        layout.validate()?;
        let texels = layout.texel_count();
        self.position_map = vec![[0.0; 4]; texels];
        self.velocity_map = vec![[f16::ZERO; 4]; texels];
        self.normal_map = vec![[f16::ZERO; 4]; texels];
        self.layout = Some(layout);
        log::debug!(
            "[CpuTransferEncoder::prepare] allocated {}x{} maps",
            layout.width,
            layout.height
        );
        Ok(())
    }

    fn layout(&self) -> Option<MapLayout> {
        self.layout
    }

    fn transfer(&mut self, frame: &TransferFrame<'_>) -> BakerResult<()> {
        let layout = self.layout.ok_or(BakerError::Internal {
            message: "transfer before prepare".to_string(),
        })?;

        // All preconditions are checked before the first texel write;
        // after this point the transfer cannot fail, so a frame is
        // always committed whole or not at all.
        if frame.element_count > layout.texel_count() {
            return Err(BakerError::BufferSizeMismatch {
                buffer: "destination maps",
                expected: frame.element_count,
                found: layout.texel_count(),
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

        let transform = frame.transform;
        let old_transform = frame.old_transform;
        let count = frame.element_count;
        let frame_rate = frame.frame_rate;

        self.position_map
            .par_iter_mut()
            .zip(self.velocity_map.par_iter_mut())
            .zip(self.normal_map.par_iter_mut())
            .enumerate()
            .for_each(|(i, ((position_texel, velocity_texel), normal_texel))| {
                if i >= count {
                    *position_texel = [0.0; 4];
                    *velocity_texel = [f16::ZERO; 4];
                    *normal_texel = [f16::ZERO; 4];
                    return;
                }

                let position = transform.transform_point3(Vec3::from_array(frame.positions[i]));
                let old_position =
                    old_transform.transform_point3(Vec3::from_array(frame.previous_positions[i]));
                let velocity = (position - old_position) * frame_rate;
                // transform_vector3 drops the translation, which is the
                // rotation-only handling normals need.
                let normal = transform
                    .transform_vector3(Vec3::from_array(frame.normals[i]))
                    .normalize_or_zero();

                *position_texel = [position.x, position.y, position.z, 1.0];
                *velocity_texel = encode_half(velocity, 0.0);
                *normal_texel = encode_half(normal, 0.0);
            });

        self.transfer_count += 1;
        Ok(())
    }
}

fn encode_half(v: Vec3, w: f32) -> [f16; 4] {
    [
        f16::from_f32(v.x),
        f16::from_f32(v.y),
        f16::from_f32(v.z),
        f16::from_f32(w),
    ]
}
