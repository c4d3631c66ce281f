//! Sample Point Operations - Pure DOP Functions
//!
//! Two passes over the combined topology: an area accumulation pass
//! (data-parallel, one independent result per triangle) and a serial
//! placement walk that spends the accumulated area on sample points.

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use super::sample_point_data::{SamplePoint, SamplingPlan};
use crate::constants::sampling::MIN_POINT_COUNT;
use crate::error::{BakerError, BakerResult};
use crate::mesh::CombinedMeshData;

/// Area of one triangle. Degenerate triangles contribute exactly zero,
/// never NaN or a negative value.
pub fn triangle_area(v1: Vec3, v2: Vec3, v3: Vec3) -> f32 {
    let area = 0.5 * (v2 - v1).cross(v3 - v1).length();
    if area.is_finite() {
        area.max(0.0)
    } else {
        0.0
    }
}

/// Total rest-pose surface area of the combined topology.
///
/// Each triangle is independent, so the accumulation is dispatched
/// across the rayon pool. The reduction order differs from a serial
/// walk; the result is identical within floating tolerance.
pub fn total_area(mesh: &CombinedMeshData) -> f32 {
    mesh.indices
        .par_chunks_exact(3)
        .map(|tri| {
            let v1 = Vec3::from_array(mesh.vertices[tri[0] as usize]);
            let v2 = Vec3::from_array(mesh.vertices[tri[1] as usize]);
            let v3 = Vec3::from_array(mesh.vertices[tri[2] as usize]);
            triangle_area(v1, v2, v3)
        })
        .sum()
}

/// Generate the sampling plan: exactly `point_count` sample points
/// (floor-clamped to the minimum) distributed across the surface in
/// proportion to triangle area.
///
/// The walk is seeded and serial, so the same seed and topology always
/// produce a byte-identical plan. Placement targets
/// `total_area / (n - spacing_bias)` area per sample; the bias keeps
/// the walk landing on n points in expectation instead of n±1.
pub fn generate_plan(
    mesh: &CombinedMeshData,
    point_count: usize,
    spacing_bias: f32,
    seed: u64,
) -> BakerResult<SamplingPlan> {
    if mesh.indices.len() < 3 {
        return Err(BakerError::EmptyTopology);
    }

    let n = point_count.max(MIN_POINT_COUNT);
    let total = total_area(mesh);
    let area_per_sample = total / (n as f32 - spacing_bias);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut points = Vec::with_capacity(n);
    let mut acc = 0.0f32;

    // Fallback triangle for the padding pass: the last one with
    // positive area, or the first triangle of a fully degenerate mesh.
    let mut last_live: Option<[u32; 3]> = None;

    'walk: for tri in mesh.indices.chunks_exact(3) {
        let (i1, i2, i3) = (tri[0], tri[1], tri[2]);
        let v1 = Vec3::from_array(mesh.vertices[i1 as usize]);
        let v2 = Vec3::from_array(mesh.vertices[i2 as usize]);
        let v3 = Vec3::from_array(mesh.vertices[i3 as usize]);

        let area = triangle_area(v1, v2, v3);
        if area > 0.0 {
            last_live = Some([i1, i2, i3]);
        }
        acc += area;

        while acc > area_per_sample {
            acc -= area_per_sample;
            points.push(emit_point(&mut rng, i1, i2, i3));
            // Floating rounding on the last triangles can overshoot n;
            // writes beyond the fixed length are rejected.
            if points.len() == n {
                break 'walk;
            }
        }
    }

    // Rounding can also undershoot; keep emitting on the last usable
    // triangle until the fixed length is reached.
    let pad = last_live.unwrap_or([mesh.indices[0], mesh.indices[1], mesh.indices[2]]);
    if points.len() < n {
        log::debug!(
            "[generate_plan] padding {} of {} points on the final triangle",
            n - points.len(),
            n
        );
    }
    while points.len() < n {
        if last_live.is_some() {
            points.push(emit_point(&mut rng, pad[0], pad[1], pad[2]));
        } else {
            points.push(SamplePoint::new(pad[0], 1.0, pad[1], 0.0, pad[2], 0.0));
        }
    }

    log::info!(
        "[generate_plan] {} points over {} triangles, total area {}",
        n,
        mesh.indices.len() / 3,
        total
    );

    Ok(SamplingPlan {
        points,
        total_area: total,
    })
}

/// Draw one point on a triangle: two uniforms folded from the unit
/// square into the barycentric domain.
fn emit_point(rng: &mut StdRng, i1: u32, i2: u32, i3: u32) -> SamplePoint {
    let mut rx: f32 = rng.gen();
    let mut ry: f32 = rng.gen();
    if rx + ry > 1.0 {
        rx = 1.0 - rx;
        ry = 1.0 - ry;
    }
    SamplePoint::new(i1, (1.0 - rx - ry).max(0.0), i2, rx, i3, ry)
}
