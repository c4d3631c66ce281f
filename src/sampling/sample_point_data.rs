//! Sample Point Data - Pure DOP
//!
//! NO METHODS. Just data.
//! All transformations happen in sample_point_operations.rs

use bytemuck::{Pod, Zeroable};

/// One stochastically placed surface location: a triangle reference
/// into the combined vertex space plus barycentric weights.
///
/// Layout is GPU-friendly (32 bytes, 16-byte aligned halves) so the
/// whole sequence can be uploaded as a storage buffer unchanged.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SamplePoint {
    pub index1: u32,
    pub index2: u32,
    pub index3: u32,
    pub _pad0: u32,
    pub weight1: f32,
    pub weight2: f32,
    pub weight3: f32,
    pub _pad1: f32,
}

impl SamplePoint {
    pub fn new(i1: u32, w1: f32, i2: u32, w2: f32, i3: u32, w3: f32) -> Self {
        Self {
            index1: i1,
            index2: i2,
            index3: i3,
            _pad0: 0,
            weight1: w1,
            weight2: w2,
            weight3: w3,
            _pad1: 0.0,
        }
    }
}

/// The immutable output of sample generation: a fixed-length, fixed-order
/// point sequence plus the rest-pose surface area it was derived from.
///
/// Order has no semantic meaning but must stay stable across frames
/// because it defines which texel each point maps to.
pub struct SamplingPlan {
    pub points: Vec<SamplePoint>,
    pub total_area: f32,
}
