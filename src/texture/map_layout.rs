//! Destination map layout: a fixed 256-texel-wide grid whose height is
//! the minimal multiple of 8 covering the required element count.

use crate::constants::texture::{MAP_ALIGNMENT, MAP_WIDTH};
use crate::error::{BakerError, BakerResult};

/// Dimensions shared by all three destination maps. Element i lands at
/// texel i in row-major raster order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapLayout {
    pub width: u32,
    pub height: u32,
}

impl MapLayout {
    /// Smallest valid layout covering `count` elements.
    pub fn for_count(count: usize) -> Self {
        let width = MAP_WIDTH;
        let rows = (count as u32 + width - 1) / width;
        let height = ((rows + MAP_ALIGNMENT - 1) / MAP_ALIGNMENT) * MAP_ALIGNMENT;
        Self { width, height }
    }

    pub fn texel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Setup-time check: both dimensions must be non-zero multiples of 8.
    pub fn validate(&self) -> BakerResult<()> {
        if self.width == 0
            || self.height == 0
            || self.width % MAP_ALIGNMENT != 0
            || self.height % MAP_ALIGNMENT != 0
        {
            return Err(BakerError::MapNotAligned {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

/// Verify the three maps share one valid layout. Violations are setup
/// errors: the pipeline reports them once and performs zero dispatches.
/// `GpuTransferDispatch::prepare` runs this over the maps it allocated;
/// callers binding externally supplied maps should run it themselves.
pub fn validate_map_set(
    position: MapLayout,
    velocity: MapLayout,
    normal: MapLayout,
) -> BakerResult<()> {
    for (name, layout) in [("velocity", velocity), ("normal", normal)] {
        if layout != position {
            return Err(BakerError::MapDimensionMismatch {
                map: name,
                expected: (position.width, position.height),
                found: (layout.width, layout.height),
            });
        }
    }
    position.validate()
}
