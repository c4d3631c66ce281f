//! Baker Data - Pure DOP
//!
//! NO METHODS. Just data.
//! All transformations happen in baker_operations.rs

use glam::{Mat4, Vec3};

use crate::mesh::CombinedMeshData;
use crate::sampling::SamplingPlan;
use crate::{BakeMode, BakerConfig};

/// Pipeline lifecycle. Structural invalidation drops back to
/// `Uninitialized`; the next tick lazily rebuilds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BakerState {
    Uninitialized,
    Running,
}

/// Two-slot ring of element-space positions. Roles swap every tick:
/// after a swap, `previous` holds what was `current` one frame prior,
/// which is what makes per-texel finite-difference velocity possible.
pub struct PositionHistoryData {
    pub current: Vec<[f32; 3]>,
    pub previous: Vec<[f32; 3]>,
}

/// Two-slot ring for the root transform, same swap discipline as the
/// position history.
pub struct RootTransformHistory {
    pub current: Mat4,
    pub previous: Mat4,
}

/// World-space axis-aligned bounding box of the most recent bake.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

/// All pipeline state for one active configuration.
pub struct BakerData {
    pub config: BakerConfig,
    pub state: BakerState,

    // Static sampling plan, rebuilt on structural invalidation.
    pub combined: Option<CombinedMeshData>,
    pub plan: Option<SamplingPlan>,
    /// Mode and element count the current plan was built for, used to
    /// detect configuration changes between ticks.
    pub planned: Option<(BakeMode, usize)>,
    /// Per-source vertex counts at plan build time.
    pub source_vertex_counts: Vec<usize>,

    // Per-frame scratch in flat vertex space, same layout the
    // aggregator produced.
    pub vertex_positions: Vec<[f32; 3]>,
    pub vertex_normals: Vec<[f32; 3]>,

    // Element space (vertex count in direct mode, point count in
    // resampled mode).
    pub history: PositionHistoryData,
    pub element_normals: Vec<[f32; 3]>,

    pub root: RootTransformHistory,
    pub bounds: Option<Aabb>,

    /// Frames transferred since the last (re)build.
    pub frame: u64,
    /// Set once an invalid configuration has been surfaced, so the
    /// pipeline stays a silent no-op until the configuration changes.
    pub config_error_reported: bool,
    /// Fingerprint (mode, point count, per-source vertex counts) of the
    /// configuration that was reported invalid; a differing fingerprint
    /// re-arms error reporting.
    pub invalid_fingerprint: Option<Vec<usize>>,
}
