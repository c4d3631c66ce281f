//! Combined Mesh Operations - Pure DOP Functions
//!
//! All functions are pure: take data, return results, no side effects.
//! No methods, no self, just transformations.

use super::combined_mesh_data::{CombinedMeshData, CombinedMeshStats};
use super::source::MeshSource;
use crate::error::{BakerError, BakerResult};

/// Merge an ordered list of sources into one flat vertex/index space.
///
/// Output order is strictly: input source order, then submesh order,
/// then original local vertex/index order. Each source's local indices
/// are offset by the running vertex count of the sources before it, so
/// the same layout can be reproduced every frame by the bake loop. A
/// zero-vertex source contributes nothing and advances the offset by
/// exactly zero.
pub fn combine_sources(sources: &[&dyn MeshSource]) -> BakerResult<CombinedMeshData> {
    if sources.is_empty() {
        return Err(BakerError::EmptySourceList);
    }

    // Size everything up front so the fill loop never reallocates.
    let vertex_total: usize = sources.iter().map(|s| s.vertex_count()).sum();
    let index_total: usize = sources
        .iter()
        .map(|s| s.submesh_indices().iter().map(Vec::len).sum::<usize>())
        .sum();

    let mut vertices = Vec::with_capacity(vertex_total);
    let mut normals = Vec::with_capacity(vertex_total);
    let mut indices = Vec::with_capacity(index_total);
    let mut vertex_offsets = Vec::with_capacity(sources.len() + 1);

    let mut vertex_offset = 0usize;

    for (source_index, source) in sources.iter().enumerate() {
        vertex_offsets.push(vertex_offset);

        let positions = source.rest_positions();
        let source_normals = source.rest_normals();
        let vcount = source.vertex_count();

        if positions.len() != vcount || source_normals.len() != vcount {
            return Err(BakerError::BufferSizeMismatch {
                buffer: "rest pose",
                expected: vcount,
                found: positions.len().min(source_normals.len()),
            });
        }

        vertices.extend_from_slice(&positions);
        normals.extend_from_slice(&source_normals);

        for submesh in source.submesh_indices() {
            for local_index in submesh {
                if local_index as usize >= vcount {
                    return Err(BakerError::IndexOutOfRange {
                        index: local_index,
                        vertex_count: vcount,
                    });
                }
                indices.push(local_index + vertex_offset as u32);
            }
        }

        log::debug!(
            "[combine_sources] source {}: {} vertices at offset {}",
            source_index,
            vcount,
            vertex_offset
        );

        vertex_offset += vcount;
    }

    vertex_offsets.push(vertex_offset);

    log::info!(
        "[combine_sources] combined {} sources into {} vertices, {} indices",
        sources.len(),
        vertices.len(),
        indices.len()
    );

    Ok(CombinedMeshData {
        vertices,
        normals,
        indices,
        vertex_offsets,
    })
}

/// Number of triangles in the combined topology.
pub fn triangle_count(data: &CombinedMeshData) -> usize {
    data.indices.len() / 3
}

/// Verify every index lies in the combined vertex space.
pub fn validate_indices(data: &CombinedMeshData) -> BakerResult<()> {
    let vertex_count = data.vertices.len();
    for &index in &data.indices {
        if index as usize >= vertex_count {
            return Err(BakerError::IndexOutOfRange {
                index,
                vertex_count,
            });
        }
    }
    Ok(())
}

/// Get memory statistics.
pub fn memory_stats(data: &CombinedMeshData) -> CombinedMeshStats {
    let vertices_size = data.vertices.len() * std::mem::size_of::<[f32; 3]>();
    let normals_size = data.normals.len() * std::mem::size_of::<[f32; 3]>();
    let indices_size = data.indices.len() * std::mem::size_of::<u32>();

    CombinedMeshStats {
        source_count: data.vertex_offsets.len().saturating_sub(1),
        vertex_count: data.vertices.len(),
        index_count: data.indices.len(),
        triangle_count: triangle_count(data),
        total_size: vertices_size + normals_size + indices_size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BakerResult;
    use crate::mesh::source::{MeshSnapshot, MeshSource};
    use glam::Mat4;

    struct TestSource {
        positions: Vec<[f32; 3]>,
        submeshes: Vec<Vec<u32>>,
    }

    impl TestSource {
        fn with_vertices(count: usize, submeshes: Vec<Vec<u32>>) -> Self {
            let positions = (0..count).map(|i| [i as f32, 0.0, 0.0]).collect();
            Self {
                positions,
                submeshes,
            }
        }
    }

    impl MeshSource for TestSource {
        fn vertex_count(&self) -> usize {
            self.positions.len()
        }
        fn rest_positions(&self) -> Vec<[f32; 3]> {
            self.positions.clone()
        }
        fn rest_normals(&self) -> Vec<[f32; 3]> {
            vec![[0.0, 1.0, 0.0]; self.positions.len()]
        }
        fn submesh_indices(&self) -> Vec<Vec<u32>> {
            self.submeshes.clone()
        }
        fn bake(&self) -> BakerResult<MeshSnapshot> {
            Ok(MeshSnapshot {
                positions: self.rest_positions(),
                normals: self.rest_normals(),
            })
        }
        fn local_to_world(&self) -> Mat4 {
            Mat4::IDENTITY
        }
    }

    #[test]
    fn test_two_sources_offset_remap() {
        let a = TestSource::with_vertices(10, vec![vec![0, 1, 2, 2, 1, 3]]);
        let b = TestSource::with_vertices(5, vec![vec![0, 1, 2]]);

        let combined =
            combine_sources(&[&a, &b]).expect("combine should succeed for valid sources");

        assert_eq!(combined.vertices.len(), 15);
        assert_eq!(combined.normals.len(), 15);
        assert_eq!(combined.indices[..6], [0, 1, 2, 2, 1, 3]);
        // Source 2's indices are offset by source 1's vertex count.
        assert_eq!(combined.indices[6..], [10, 11, 12]);
        assert_eq!(combined.vertex_offsets, vec![0, 10, 15]);
        validate_indices(&combined).expect("all indices in range");
    }

    #[test]
    fn test_submesh_order_preserved() {
        let a = TestSource::with_vertices(4, vec![vec![0, 1, 2], vec![1, 2, 3]]);
        let combined = combine_sources(&[&a]).expect("combine should succeed");
        assert_eq!(combined.indices, vec![0, 1, 2, 1, 2, 3]);
    }

    #[test]
    fn test_zero_vertex_source_does_not_shift_offsets() {
        let a = TestSource::with_vertices(3, vec![vec![0, 1, 2]]);
        let empty = TestSource::with_vertices(0, vec![]);
        let b = TestSource::with_vertices(3, vec![vec![0, 1, 2]]);

        let combined = combine_sources(&[&a, &empty, &b]).expect("combine should succeed");
        assert_eq!(combined.vertices.len(), 6);
        assert_eq!(combined.indices, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(combined.vertex_offsets, vec![0, 3, 3, 6]);
    }

    #[test]
    fn test_empty_source_list_rejected() {
        let result = combine_sources(&[]);
        assert!(matches!(result, Err(BakerError::EmptySourceList)));
    }

    #[test]
    fn test_out_of_range_local_index_rejected() {
        let a = TestSource::with_vertices(3, vec![vec![0, 1, 7]]);
        let result = combine_sources(&[&a]);
        assert!(matches!(result, Err(BakerError::IndexOutOfRange { .. })));
    }

    #[test]
    fn test_memory_stats_display() {
        let a = TestSource::with_vertices(3, vec![vec![0, 1, 2]]);
        let combined = combine_sources(&[&a]).expect("combine should succeed");
        let stats = memory_stats(&combined);
        assert_eq!(stats.vertex_count, 3);
        assert_eq!(stats.triangle_count, 1);
        assert!(stats.to_string().contains("1 sources"));
    }
}
