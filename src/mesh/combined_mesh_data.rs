//! Combined Mesh Data - Pure DOP
//!
//! NO METHODS. Just data.
//! All transformations happen in combined_mesh_operations.rs

/// Flat aggregation of every source mesh: one contiguous vertex array,
/// one contiguous normal array, one contiguous triangle index array.
///
/// Indices reference the combined vertex space (source order, then
/// submesh order, then original local order). Built once at setup and
/// immutable afterward; a source-set change rebuilds the whole thing.
pub struct CombinedMeshData {
    pub vertices: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    /// Running vertex offset of each source, plus the total as the
    /// final entry. `vertex_offsets[i]..vertex_offsets[i + 1]` is
    /// source i's slice of the flat arrays.
    pub vertex_offsets: Vec<usize>,
}

/// Memory statistics for a combined mesh.
#[derive(Debug, Clone)]
pub struct CombinedMeshStats {
    pub source_count: usize,
    pub vertex_count: usize,
    pub index_count: usize,
    pub triangle_count: usize,
    pub total_size: usize,
}

impl std::fmt::Display for CombinedMeshStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CombinedMesh: {} sources, {} vertices, {} triangles, {} bytes",
            self.source_count, self.vertex_count, self.triangle_count, self.total_size
        )
    }
}
