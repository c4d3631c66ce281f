//! The transfer contract: one frame's flat buffers in, three fully
//! written maps out. Either a frame transfers completely or nothing is
//! committed.

use glam::Mat4;

use super::map_layout::MapLayout;
use crate::error::BakerResult;

/// Borrowed view of everything one transfer needs. Buffers are
/// index-aligned and `element_count` long; element i maps to texel i.
pub struct TransferFrame<'a> {
    pub element_count: usize,
    /// This frame's local-space positions.
    pub positions: &'a [[f32; 3]],
    /// Last frame's local-space positions (equal to `positions` on the
    /// first frame after activation, so velocity starts at zero).
    pub previous_positions: &'a [[f32; 3]],
    pub normals: &'a [[f32; 3]],
    /// Root transform for this frame's positions and normals.
    pub transform: Mat4,
    /// Root transform the previous positions were captured under.
    pub old_transform: Mat4,
    /// 1 / delta_time of the tick. The caller guarantees delta_time is
    /// positive; zero or unavailable delta is a precondition violation.
    pub frame_rate: f32,
}

/// The GPU dispatch capability the pipeline delegates texel writes to.
///
/// `prepare` is called at activation and after every structural
/// invalidation; `transfer` once per tick. Implementations must write
/// element i to the row-major texel i so that texel (x, y) refers to
/// the same physical point across frames and across all three maps.
pub trait TransferDispatch {
    /// Allocate (or reallocate) the destination maps for a new layout.
    fn prepare(&mut self, layout: MapLayout) -> BakerResult<()>;

    /// Layout of the currently allocated maps.
    fn layout(&self) -> Option<MapLayout>;

    /// Write position, velocity and normal texels for one frame.
    fn transfer(&mut self, frame: &TransferFrame<'_>) -> BakerResult<()>;
}
