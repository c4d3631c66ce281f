//! Mesh source interface - the contract between the baker and whatever
//! engine layer owns the actual deforming meshes.

use glam::Mat4;

use crate::error::BakerResult;

/// One frame's deformed geometry, captured in the source's local space.
///
/// Positions and normals are index-aligned; their length equals the
/// source's vertex count.
#[derive(Debug, Clone, Default)]
pub struct MeshSnapshot {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
}

/// A deforming mesh the baker can snapshot every frame.
///
/// The vertex count and submesh topology are fixed for the source's
/// lifetime; changing either invalidates the sampling plan and forces a
/// full rebuild.
pub trait MeshSource {
    /// Vertex count, constant across the source's lifetime.
    fn vertex_count(&self) -> usize;

    /// Rest-pose vertex positions, one per vertex, local space.
    fn rest_positions(&self) -> Vec<[f32; 3]>;

    /// Rest-pose normals, index-aligned with `rest_positions`.
    fn rest_normals(&self) -> Vec<[f32; 3]>;

    /// Triangle index lists per submesh, in submesh order, using
    /// source-local vertex indices.
    fn submesh_indices(&self) -> Vec<Vec<u32>>;

    /// Capture the current deformed geometry in local space.
    ///
    /// Fails when the underlying mesh object is gone (destroyed
    /// mid-frame); the pipeline treats that as fatal to the frame and
    /// retries on the next tick.
    fn bake(&self) -> BakerResult<MeshSnapshot>;

    /// Current local-to-world transform of the source.
    fn local_to_world(&self) -> Mat4;
}
