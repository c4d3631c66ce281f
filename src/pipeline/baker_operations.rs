//! Baker Operations - Pure DOP Functions
//!
//! The per-tick orchestration: lazy plan rebuild, the bake loop over
//! sources, element resolution (direct copy or barycentric resample),
//! the transfer handoff, and the history rotation. Nothing here blocks;
//! the whole tick is designed to fit inside one frame budget.

use glam::{Mat4, Vec3};
use rayon::prelude::*;

use super::baker_data::{
    Aabb, BakerData, BakerState, PositionHistoryData, RootTransformHistory,
};
use crate::error::{BakerError, BakerResult};
use crate::mesh::{combine_sources, MeshSource};
use crate::sampling::generate_plan;
use crate::texture::{MapLayout, TransferDispatch, TransferFrame};
use crate::{BakeMode, BakerConfig};

/// Create a baker in the Uninitialized state. The first `tick` with a
/// non-empty source list builds the plan and allocates everything.
pub fn create_baker(config: BakerConfig) -> BakerData {
    BakerData {
        config,
        state: BakerState::Uninitialized,
        combined: None,
        plan: None,
        planned: None,
        source_vertex_counts: Vec::new(),
        vertex_positions: Vec::new(),
        vertex_normals: Vec::new(),
        history: PositionHistoryData {
            current: Vec::new(),
            previous: Vec::new(),
        },
        element_normals: Vec::new(),
        root: RootTransformHistory {
            current: Mat4::IDENTITY,
            previous: Mat4::IDENTITY,
        },
        bounds: None,
        frame: 0,
        config_error_reported: false,
        invalid_fingerprint: None,
    }
}

/// Number of texels the pipeline writes per frame: vertex count in
/// direct mode, sample point count in resampled mode. Zero while
/// Uninitialized.
pub fn element_count(data: &BakerData) -> usize {
    data.planned.map(|(_, count)| count).unwrap_or(0)
}

/// Dispose the plan and all derived buffers and return to
/// Uninitialized. Not an error path: any structural configuration
/// change funnels through here and the next tick rebuilds.
pub fn invalidate(data: &mut BakerData) {
    log::info!("[invalidate] disposing sampling plan and history buffers");
    data.state = BakerState::Uninitialized;
    data.combined = None;
    data.plan = None;
    data.planned = None;
    data.source_vertex_counts.clear();
    data.vertex_positions = Vec::new();
    data.vertex_normals = Vec::new();
    data.history.current = Vec::new();
    data.history.previous = Vec::new();
    data.element_normals = Vec::new();
    data.bounds = None;
    data.frame = 0;
}

/// Run one frame: capture the root transform, re-bake every source,
/// resolve element buffers, hand the frame to the dispatch, rotate the
/// histories.
///
/// `delta_time` must be positive; `frame_rate = 1 / delta_time` feeds
/// the finite-difference velocity. A transient bake failure skips the
/// frame (nothing is committed, histories stay put) and the next tick
/// retries.
pub fn tick(
    data: &mut BakerData,
    sources: &[&dyn MeshSource],
    external_root: Option<Mat4>,
    delta_time: f32,
    dispatch: &mut dyn TransferDispatch,
) -> BakerResult<()> {
    debug_assert!(delta_time > 0.0, "delta_time must be positive");

    let fingerprint = config_fingerprint(&data.config, sources);

    if sources.is_empty() {
        return report_config_error_once(data, fingerprint, BakerError::EmptySourceList);
    }

    let root = external_root.unwrap_or_else(|| sources[0].local_to_world());

    if data.state == BakerState::Running && structural_change(data, sources, dispatch) {
        log::info!("[tick] structural change detected, invalidating plan");
        invalidate(data);
    }

    if data.state == BakerState::Uninitialized {
        if data.config_error_reported && data.invalid_fingerprint.as_ref() == Some(&fingerprint) {
            // Already surfaced for this exact configuration; stay inert.
            return Ok(());
        }
        if let Err(error) = rebuild(data, sources, root, dispatch) {
            return report_config_error_once(data, fingerprint, error);
        }
        data.config_error_reported = false;
        data.invalid_fingerprint = None;
    }

    // (1) capture the root transform for this frame.
    data.root.current = root;

    // (2) re-bake every source into the flat vertex buffer. Fatal to
    // the frame only: histories are untouched on failure.
    bake_sources(data, sources)?;

    // (3) resolve element-space buffers (copy or resample).
    resolve_elements(data)?;

    if data.frame == 0 {
        // First frame after (re)activation: previous starts equal to
        // current so velocity is zero, not a spurious jump.
        let PositionHistoryData { current, previous } = &mut data.history;
        previous.copy_from_slice(current);
        data.root.previous = data.root.current;
    }

    // (4) transfer the whole frame into the destination maps.
    let frame = TransferFrame {
        element_count: element_count(data),
        positions: &data.history.current,
        previous_positions: &data.history.previous,
        normals: &data.element_normals,
        transform: data.root.current,
        old_transform: data.root.previous,
        frame_rate: 1.0 / delta_time,
    };
    dispatch.transfer(&frame)?;

    data.bounds = compute_bounds(&data.history.current, data.root.current);

    // (5) rotate histories: current becomes previous.
    std::mem::swap(&mut data.history.current, &mut data.history.previous);
    data.root.previous = data.root.current;
    data.frame += 1;

    Ok(())
}

/// Surface a configuration error exactly once, then stay a no-op until
/// the configuration fingerprint changes.
fn report_config_error_once(
    data: &mut BakerData,
    fingerprint: Vec<usize>,
    error: BakerError,
) -> BakerResult<()> {
    if data.config_error_reported && data.invalid_fingerprint.as_ref() == Some(&fingerprint) {
        return Ok(());
    }
    log::error!("[tick] configuration rejected: {}", error);
    data.config_error_reported = true;
    data.invalid_fingerprint = Some(fingerprint);
    Err(error)
}

fn config_fingerprint(config: &BakerConfig, sources: &[&dyn MeshSource]) -> Vec<usize> {
    let mut fingerprint = Vec::with_capacity(sources.len() + 2);
    fingerprint.push(match config.mode {
        BakeMode::Direct => 0,
        BakeMode::Resampled => 1,
    });
    fingerprint.push(config.effective_point_count());
    fingerprint.extend(sources.iter().map(|s| s.vertex_count()));
    fingerprint
}

/// True when the running plan no longer matches the live configuration:
/// source set changed, a vertex count changed, the mode or point count
/// changed, or the dispatch maps no longer match the required layout.
fn structural_change(
    data: &BakerData,
    sources: &[&dyn MeshSource],
    dispatch: &dyn TransferDispatch,
) -> bool {
    if data.source_vertex_counts.len() != sources.len()
        || data
            .source_vertex_counts
            .iter()
            .zip(sources.iter())
            .any(|(&count, source)| count != source.vertex_count())
    {
        return true;
    }

    let total_vertices: usize = sources.iter().map(|s| s.vertex_count()).sum();
    let required = required_element_count(&data.config, total_vertices);
    if data.planned != Some((data.config.mode, required)) {
        return true;
    }

    dispatch.layout() != Some(MapLayout::for_count(required))
}

fn required_element_count(config: &BakerConfig, total_vertices: usize) -> usize {
    match config.mode {
        BakeMode::Direct => total_vertices,
        BakeMode::Resampled => config.effective_point_count(),
    }
}

/// Build the static sampling plan and size every buffer for it.
fn rebuild(
    data: &mut BakerData,
    sources: &[&dyn MeshSource],
    root: Mat4,
    dispatch: &mut dyn TransferDispatch,
) -> BakerResult<()> {
    let combined = combine_sources(sources)?;
    let total_vertices = combined.vertices.len();
    let count = required_element_count(&data.config, total_vertices);

    let plan = match data.config.mode {
        BakeMode::Direct => None,
        BakeMode::Resampled => Some(generate_plan(
            &combined,
            data.config.effective_point_count(),
            data.config.spacing_bias,
            data.config.sample_seed,
        )?),
    };

    let layout = MapLayout::for_count(count);
    dispatch.prepare(layout)?;

    data.vertex_positions = vec![[0.0; 3]; total_vertices];
    data.vertex_normals = vec![[0.0; 3]; total_vertices];
    data.history.current = vec![[0.0; 3]; count];
    data.history.previous = vec![[0.0; 3]; count];
    data.element_normals = vec![[0.0; 3]; count];

    data.source_vertex_counts = sources.iter().map(|s| s.vertex_count()).collect();
    data.planned = Some((data.config.mode, count));
    data.combined = Some(combined);
    data.plan = plan;
    data.root = RootTransformHistory {
        current: root,
        previous: root,
    };
    data.bounds = None;
    data.frame = 0;
    data.state = BakerState::Running;

    log::info!(
        "[rebuild] plan ready: {} sources, {} vertices, {} elements, {}x{} maps",
        sources.len(),
        total_vertices,
        count,
        layout.width,
        layout.height
    );

    Ok(())
}

/// Re-bake every source into the flat vertex buffers at its running
/// offset (the same offsetting rule the aggregator used). Per-vertex
/// transform work is data-parallel; each source writes a disjoint
/// slice.
fn bake_sources(data: &mut BakerData, sources: &[&dyn MeshSource]) -> BakerResult<()> {
    let BakerData {
        combined,
        vertex_positions,
        vertex_normals,
        config,
        root,
        ..
    } = data;
    let combined = combined.as_ref().ok_or(BakerError::Internal {
        message: "bake without a plan".to_string(),
    })?;

    let root_inverse = root.current.inverse();

    for (source_index, source) in sources.iter().enumerate() {
        let vcount = source.vertex_count();
        let offset = combined.vertex_offsets[source_index];

        let snapshot = source.bake().map_err(|error| BakerError::SnapshotFailed {
            source_index,
            error: error.to_string(),
        })?;
        if snapshot.positions.len() != vcount || snapshot.normals.len() != vcount {
            return Err(BakerError::SnapshotFailed {
                source_index,
                error: format!(
                    "snapshot holds {} positions / {} normals for {} vertices",
                    snapshot.positions.len(),
                    snapshot.normals.len(),
                    vcount
                ),
            });
        }

        let position_slice = &mut vertex_positions[offset..offset + vcount];
        let normal_slice = &mut vertex_normals[offset..offset + vcount];

        if config.apply_source_transforms {
            // Positions are stored root-relative so the encoder can
            // re-project the previous frame with the previous root
            // transform and get back exactly last frame's world space.
            let to_root = root_inverse * source.local_to_world();
            position_slice
                .par_iter_mut()
                .zip(snapshot.positions.par_iter())
                .for_each(|(dst, src)| {
                    *dst = to_root.transform_point3(Vec3::from_array(*src)).to_array();
                });
            normal_slice
                .par_iter_mut()
                .zip(snapshot.normals.par_iter())
                .for_each(|(dst, src)| {
                    *dst = to_root.transform_vector3(Vec3::from_array(*src)).to_array();
                });
        } else {
            position_slice.copy_from_slice(&snapshot.positions);
            normal_slice.copy_from_slice(&snapshot.normals);
        }
    }

    Ok(())
}

/// Fill the element-space buffers for this frame: a straight copy in
/// direct mode, barycentric interpolation through the sampling plan in
/// resampled mode. Every unit of work writes one disjoint output slot.
fn resolve_elements(data: &mut BakerData) -> BakerResult<()> {
    let BakerData {
        config,
        plan,
        vertex_positions,
        vertex_normals,
        history,
        element_normals,
        ..
    } = data;

    match config.mode {
        BakeMode::Direct => {
            history.current.copy_from_slice(vertex_positions);
            element_normals.copy_from_slice(vertex_normals);
        }
        BakeMode::Resampled => {
            let plan = plan.as_ref().ok_or(BakerError::Internal {
                message: "resampled mode without a sampling plan".to_string(),
            })?;
            history
                .current
                .par_iter_mut()
                .zip(element_normals.par_iter_mut())
                .zip(plan.points.par_iter())
                .for_each(|((position, normal), point)| {
                    let (i1, i2, i3) = (
                        point.index1 as usize,
                        point.index2 as usize,
                        point.index3 as usize,
                    );
                    let p = Vec3::from_array(vertex_positions[i1]) * point.weight1
                        + Vec3::from_array(vertex_positions[i2]) * point.weight2
                        + Vec3::from_array(vertex_positions[i3]) * point.weight3;
                    let n = Vec3::from_array(vertex_normals[i1]) * point.weight1
                        + Vec3::from_array(vertex_normals[i2]) * point.weight2
                        + Vec3::from_array(vertex_normals[i3]) * point.weight3;
                    *position = p.to_array();
                    *normal = n.normalize_or_zero().to_array();
                });
        }
    }

    Ok(())
}

/// World-space bounds of this frame's elements: fold a local AABB, then
/// push its eight corners through the root transform.
fn compute_bounds(positions: &[[f32; 3]], root: Mat4) -> Option<Aabb> {
    if positions.is_empty() {
        return None;
    }

    let (min, max) = positions.iter().fold(
        (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
        |(min, max), p| {
            let v = Vec3::from_array(*p);
            (min.min(v), max.max(v))
        },
    );

    let mut world_min = Vec3::splat(f32::INFINITY);
    let mut world_max = Vec3::splat(f32::NEG_INFINITY);
    for i in 0..8 {
        let corner = Vec3::new(
            if i & 1 == 0 { min.x } else { max.x },
            if i & 2 == 0 { min.y } else { max.y },
            if i & 4 == 0 { min.z } else { max.z },
        );
        let world = root.transform_point3(corner);
        world_min = world_min.min(world);
        world_max = world_max.max(world);
    }

    Some(Aabb {
        min: world_min,
        max: world_max,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::MeshSnapshot;
    use crate::texture::CpuTransferEncoder;
    use std::cell::Cell;

    /// Configurable test source: a rest-pose mesh whose bake adds a
    /// controllable Y shift, with an optional failure switch.
    struct TestSource {
        rest: Vec<[f32; 3]>,
        submeshes: Vec<Vec<u32>>,
        transform: Mat4,
        shift_y: Cell<f32>,
        fail_bake: Cell<bool>,
    }

    impl TestSource {
        fn quad() -> Self {
            Self {
                rest: vec![
                    [0.0, 0.0, 0.0],
                    [1.0, 0.0, 0.0],
                    [1.0, 1.0, 0.0],
                    [0.0, 1.0, 0.0],
                ],
                submeshes: vec![vec![0, 1, 2, 0, 2, 3]],
                transform: Mat4::IDENTITY,
                shift_y: Cell::new(0.0),
                fail_bake: Cell::new(false),
            }
        }

        fn strip(vertex_count: usize) -> Self {
            let rest = (0..vertex_count).map(|i| [i as f32, 0.0, 0.0]).collect();
            let mut indices = Vec::new();
            for i in 0..vertex_count.saturating_sub(2) as u32 {
                indices.extend_from_slice(&[i, i + 1, i + 2]);
            }
            Self {
                rest,
                submeshes: vec![indices],
                transform: Mat4::IDENTITY,
                shift_y: Cell::new(0.0),
                fail_bake: Cell::new(false),
            }
        }
    }

    impl MeshSource for TestSource {
        fn vertex_count(&self) -> usize {
            self.rest.len()
        }
        fn rest_positions(&self) -> Vec<[f32; 3]> {
            self.rest.clone()
        }
        fn rest_normals(&self) -> Vec<[f32; 3]> {
            vec![[0.0, 0.0, 1.0]; self.rest.len()]
        }
        fn submesh_indices(&self) -> Vec<Vec<u32>> {
            self.submeshes.clone()
        }
        fn bake(&self) -> BakerResult<MeshSnapshot> {
            if self.fail_bake.get() {
                return Err(BakerError::Internal {
                    message: "source destroyed".to_string(),
                });
            }
            let shift = self.shift_y.get();
            Ok(MeshSnapshot {
                positions: self
                    .rest
                    .iter()
                    .map(|p| [p[0], p[1] + shift, p[2]])
                    .collect(),
                normals: vec![[0.0, 0.0, 1.0]; self.rest.len()],
            })
        }
        fn local_to_world(&self) -> Mat4 {
            self.transform
        }
    }

    fn direct_config() -> BakerConfig {
        BakerConfig {
            mode: BakeMode::Direct,
            apply_source_transforms: false,
            ..BakerConfig::default()
        }
    }

    #[test]
    fn test_end_to_end_direct_two_sources() {
        let a = TestSource::strip(10);
        let b = TestSource::strip(5);
        let mut data = create_baker(direct_config());
        let mut encoder = CpuTransferEncoder::new();

        tick(&mut data, &[&a, &b], None, 1.0 / 60.0, &mut encoder).expect("tick");

        assert_eq!(element_count(&data), 15);
        let combined = data.combined.as_ref().expect("plan built");
        assert_eq!(combined.vertices.len(), 15);
        assert_eq!(combined.normals.len(), 15);
        // Source 1 contributes 8 strip triangles (24 indices); source
        // 2's triangles reference the +10 offset range.
        assert!(combined.indices[24..].iter().all(|&i| (10..15).contains(&i)));
        assert_eq!(encoder.layout(), Some(MapLayout::for_count(15)));
        // Texel 10 is source 2's first vertex.
        assert_eq!(
            encoder.position_at(10, 0),
            Some(Vec3::new(0.0, 0.0, 0.0))
        );
    }

    #[test]
    fn test_first_tick_velocity_is_zero() {
        let quad = TestSource::quad();
        let mut data = create_baker(BakerConfig {
            point_count: 64,
            ..BakerConfig::default()
        });
        let mut encoder = CpuTransferEncoder::new();

        tick(&mut data, &[&quad], None, 1.0 / 60.0, &mut encoder).expect("tick");

        let layout = encoder.layout().expect("prepared");
        for y in 0..layout.height {
            for x in 0..layout.width {
                assert_eq!(encoder.velocity_at(x, y), Some(Vec3::ZERO));
            }
        }
    }

    #[test]
    fn test_motion_produces_velocity() {
        let quad = TestSource::quad();
        let mut data = create_baker(direct_config());
        let mut encoder = CpuTransferEncoder::new();

        tick(&mut data, &[&quad], None, 1.0 / 60.0, &mut encoder).expect("tick 1");
        quad.shift_y.set(1.0);
        tick(&mut data, &[&quad], None, 1.0 / 60.0, &mut encoder).expect("tick 2");

        // +1 in Y over a 60 Hz frame.
        let velocity = encoder.velocity_at(0, 0).expect("in bounds");
        assert!((velocity.y - 60.0).abs() < 0.5, "velocity {:?}", velocity);
    }

    /// Records the buffers every transfer sees, so the history law can
    /// be observed at the dispatch boundary instead of post-swap.
    struct RecordingDispatch {
        inner: CpuTransferEncoder,
        frames: Vec<(Vec<[f32; 3]>, Vec<[f32; 3]>)>,
    }

    impl TransferDispatch for RecordingDispatch {
        fn prepare(&mut self, layout: MapLayout) -> BakerResult<()> {
            self.inner.prepare(layout)
        }
        fn layout(&self) -> Option<MapLayout> {
            self.inner.layout()
        }
        fn transfer(&mut self, frame: &TransferFrame<'_>) -> BakerResult<()> {
            self.frames
                .push((frame.positions.to_vec(), frame.previous_positions.to_vec()));
            self.inner.transfer(frame)
        }
    }

    #[test]
    fn test_history_rotation_law() {
        let quad = TestSource::quad();
        let mut data = create_baker(direct_config());
        let mut dispatch = RecordingDispatch {
            inner: CpuTransferEncoder::new(),
            frames: Vec::new(),
        };

        tick(&mut data, &[&quad], None, 1.0 / 60.0, &mut dispatch).expect("tick 1");
        quad.shift_y.set(0.5);
        tick(&mut data, &[&quad], None, 1.0 / 60.0, &mut dispatch).expect("tick 2");

        // Tick 2's previous is exactly tick 1's current.
        assert_eq!(dispatch.frames[1].1, dispatch.frames[0].0);
        // And tick 1 saw previous == current (first-frame zero velocity).
        assert_eq!(dispatch.frames[0].1, dispatch.frames[0].0);
        assert_eq!(dispatch.frames[1].0[0][1], 0.5);
    }

    #[test]
    fn test_point_count_clamps_to_minimum() {
        let quad = TestSource::quad();
        let mut data = create_baker(BakerConfig {
            point_count: 10,
            ..BakerConfig::default()
        });
        let mut encoder = CpuTransferEncoder::new();

        tick(&mut data, &[&quad], None, 1.0 / 60.0, &mut encoder).expect("tick");
        assert_eq!(element_count(&data), 64);
        assert_eq!(data.plan.as_ref().expect("plan").points.len(), 64);
    }

    #[test]
    fn test_empty_source_list_reported_once_then_inert() {
        let mut data = create_baker(BakerConfig::default());
        let mut encoder = CpuTransferEncoder::new();

        let first = tick(&mut data, &[], None, 1.0 / 60.0, &mut encoder);
        assert!(matches!(first, Err(BakerError::EmptySourceList)));
        // Second tick with the same invalid configuration is a silent no-op.
        let second = tick(&mut data, &[], None, 1.0 / 60.0, &mut encoder);
        assert!(second.is_ok());
        assert_eq!(encoder.transfer_count(), 0);

        // A corrected configuration recovers.
        let quad = TestSource::quad();
        tick(&mut data, &[&quad], None, 1.0 / 60.0, &mut encoder).expect("recovered");
        assert_eq!(encoder.transfer_count(), 1);
    }

    #[test]
    fn test_structural_invalidation_rebuilds() {
        let a = TestSource::strip(10);
        let mut data = create_baker(direct_config());
        let mut encoder = CpuTransferEncoder::new();

        tick(&mut data, &[&a], None, 1.0 / 60.0, &mut encoder).expect("tick 1");
        assert_eq!(element_count(&data), 10);
        let frame_before = data.frame;
        assert_eq!(frame_before, 1);

        // Swapping in a source with a different vertex count is a
        // structural change: full rebuild, fresh (zero-velocity) history.
        let b = TestSource::strip(20);
        tick(&mut data, &[&b], None, 1.0 / 60.0, &mut encoder).expect("tick 2");
        assert_eq!(element_count(&data), 20);
        assert_eq!(data.frame, 1);
        assert_eq!(encoder.layout(), Some(MapLayout::for_count(20)));
    }

    #[test]
    fn test_point_count_change_invalidates() {
        let quad = TestSource::quad();
        let mut data = create_baker(BakerConfig {
            point_count: 64,
            ..BakerConfig::default()
        });
        let mut encoder = CpuTransferEncoder::new();

        tick(&mut data, &[&quad], None, 1.0 / 60.0, &mut encoder).expect("tick 1");
        assert_eq!(element_count(&data), 64);

        data.config.point_count = 4096;
        tick(&mut data, &[&quad], None, 1.0 / 60.0, &mut encoder).expect("tick 2");
        assert_eq!(element_count(&data), 4096);
        assert_eq!(data.plan.as_ref().expect("plan").points.len(), 4096);
    }

    #[test]
    fn test_transient_bake_failure_skips_frame() {
        let quad = TestSource::quad();
        let mut data = create_baker(direct_config());
        let mut encoder = CpuTransferEncoder::new();

        tick(&mut data, &[&quad], None, 1.0 / 60.0, &mut encoder).expect("tick 1");
        let previous_before = data.history.previous.clone();

        quad.fail_bake.set(true);
        quad.shift_y.set(3.0);
        let failed = tick(&mut data, &[&quad], None, 1.0 / 60.0, &mut encoder);
        assert!(matches!(failed, Err(BakerError::SnapshotFailed { .. })));
        // Nothing committed, history not rotated.
        assert_eq!(encoder.transfer_count(), 1);
        assert_eq!(data.history.previous, previous_before);
        assert_eq!(data.state, BakerState::Running);

        // Next tick retries and succeeds.
        quad.fail_bake.set(false);
        tick(&mut data, &[&quad], None, 1.0 / 60.0, &mut encoder).expect("tick 3");
        assert_eq!(encoder.transfer_count(), 2);
    }

    #[test]
    fn test_source_transform_applied_to_slice() {
        let mut quad = TestSource::quad();
        quad.transform = Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0));
        let mut data = create_baker(BakerConfig {
            mode: BakeMode::Direct,
            apply_source_transforms: true,
            ..BakerConfig::default()
        });
        let mut encoder = CpuTransferEncoder::new();

        // Root defaults to the first source's transform, so positions
        // are stored root-relative and re-projected to world by the
        // encoder: world == source transform applied once.
        tick(&mut data, &[&quad], None, 1.0 / 60.0, &mut encoder).expect("tick");
        assert_eq!(
            encoder.position_at(0, 0),
            Some(Vec3::new(5.0, 0.0, 0.0))
        );
    }

    #[test]
    fn test_external_root_overrides_first_source() {
        let quad = TestSource::quad();
        let mut data = create_baker(direct_config());
        let mut encoder = CpuTransferEncoder::new();
        let root = Mat4::from_translation(Vec3::new(0.0, 0.0, 7.0));

        tick(&mut data, &[&quad], Some(root), 1.0 / 60.0, &mut encoder).expect("tick");
        assert_eq!(
            encoder.position_at(0, 0),
            Some(Vec3::new(0.0, 0.0, 7.0))
        );
        let bounds = data.bounds.expect("bounds tracked");
        assert_eq!(bounds.min.z, 7.0);
        assert_eq!(bounds.max.z, 7.0);
    }

    #[test]
    fn test_bounds_track_world_extent() {
        let quad = TestSource::quad();
        let mut data = create_baker(direct_config());
        let mut encoder = CpuTransferEncoder::new();

        tick(&mut data, &[&quad], None, 1.0 / 60.0, &mut encoder).expect("tick");
        let bounds = data.bounds.expect("bounds tracked");
        assert_eq!(bounds.min, Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_resampled_positions_stay_on_surface() {
        let quad = TestSource::quad();
        let mut data = create_baker(BakerConfig {
            point_count: 100,
            ..BakerConfig::default()
        });
        let mut encoder = CpuTransferEncoder::new();

        tick(&mut data, &[&quad], None, 1.0 / 60.0, &mut encoder).expect("tick");

        // Every resampled element is a convex combination of quad
        // vertices, so it lies inside the unit square at z == 0.
        let count = element_count(&data);
        // history.current was swapped into previous after the tick.
        for p in data.history.previous.iter().take(count) {
            assert!((0.0..=1.0).contains(&p[0]), "x {}", p[0]);
            assert!((0.0..=1.0).contains(&p[1]), "y {}", p[1]);
            assert_eq!(p[2], 0.0);
        }
    }
}
