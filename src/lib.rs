//! mesh-vfx - bakes deforming (skinned) mesh surfaces into position,
//! velocity and normal maps for GPU-driven particle systems.
//!
//! The pipeline aggregates any number of mesh sources into one flat
//! vertex space, optionally resamples the surface with area-weighted
//! stochastic sample points, and re-projects every frame's vertex
//! snapshot into a fixed 256-wide texel grid with a two-frame position
//! history, so per-texel velocity falls out of a finite difference.
//!
//! Layout follows a data/operations split: `*_data` modules hold plain
//! structs, `*_operations` modules hold the pure functions that
//! transform them.

// Constants module
pub mod constants;

// Core modules
pub mod error;
pub mod mesh;
pub mod pipeline;
pub mod sampling;
pub mod texture;

use anyhow::Result;

pub use error::{BakerError, BakerResult};
pub use mesh::{combine_sources, CombinedMeshData, MeshSnapshot, MeshSource};
pub use pipeline::{create_baker, element_count, invalidate, tick, Aabb, BakerData, BakerState};
pub use sampling::{generate_plan, total_area, SamplePoint, SamplingPlan};
pub use texture::{
    validate_map_set, CpuTransferEncoder, GpuTransferDispatch, MapLayout, TransferDispatch,
    TransferFrame,
};

// Re-export wgpu so consumers can wire the GPU dispatch without pinning
// their own copy of the crate.
pub use wgpu;

/// How elements map to texels: one per source vertex, or one per
/// area-weighted sample point decoupled from the vertex count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BakeMode {
    Direct,
    Resampled,
}

/// Baker configuration. Structural fields (mode, point count) are
/// watched by the pipeline; changing them between ticks triggers a full
/// plan rebuild rather than an error.
#[derive(Debug, Clone)]
pub struct BakerConfig {
    pub mode: BakeMode,
    /// Requested sample point count (resampled mode). Values below the
    /// minimum of 64 are clamped up, not rejected.
    pub point_count: usize,
    /// Bias subtracted from the point count when spacing samples.
    /// Empirical; see `constants::sampling::SPACING_BIAS`.
    pub spacing_bias: f32,
    /// Seed for the placement RNG. Fixed seed + fixed topology gives a
    /// byte-identical sampling plan on every rebuild.
    pub sample_seed: u64,
    /// Apply each source's own transform to its slice of the flat
    /// buffer during the bake (multi-source rigs). When off, snapshots
    /// are written as baked.
    pub apply_source_transforms: bool,
}

impl Default for BakerConfig {
    fn default() -> Self {
        Self {
            mode: BakeMode::Resampled,
            point_count: constants::sampling::DEFAULT_POINT_COUNT,
            spacing_bias: constants::sampling::SPACING_BIAS,
            sample_seed: constants::sampling::SAMPLE_SEED,
            apply_source_transforms: true,
        }
    }
}

impl BakerConfig {
    /// Point count after the minimum clamp.
    pub fn effective_point_count(&self) -> usize {
        self.point_count.max(constants::sampling::MIN_POINT_COUNT)
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<()> {
        if self.point_count < constants::sampling::MIN_POINT_COUNT {
            log::warn!(
                "[BakerConfig] point_count {} below minimum, clamping to {}",
                self.point_count,
                constants::sampling::MIN_POINT_COUNT
            );
        }

        if !self.spacing_bias.is_finite() || !(0.0..1.0).contains(&self.spacing_bias) {
            return Err(BakerError::InvalidConfig {
                field: "spacing_bias".to_string(),
                value: self.spacing_bias.to_string(),
                reason: "must lie in [0, 1)".to_string(),
            }
            .into());
        }

        Ok(())
    }
}
