//! Mesh aggregation - combines source meshes into one flat vertex space.

pub mod combined_mesh_data;
pub mod combined_mesh_operations;
pub mod source;

pub use combined_mesh_data::{CombinedMeshData, CombinedMeshStats};
pub use combined_mesh_operations::{combine_sources, memory_stats, triangle_count, validate_indices};
pub use source::{MeshSnapshot, MeshSource};
