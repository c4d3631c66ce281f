//! Surface sampling - area-weighted stochastic point placement over the
//! combined topology.

pub mod sample_point_data;
pub mod sample_point_operations;

pub use sample_point_data::{SamplePoint, SamplingPlan};
pub use sample_point_operations::{generate_plan, total_area, triangle_area};
