//! Bake/Transfer pipeline - the per-frame state machine that turns live
//! mesh snapshots plus the static sampling plan into texture writes.

pub mod baker_data;
pub mod baker_operations;

pub use baker_data::{Aabb, BakerData, BakerState, PositionHistoryData, RootTransformHistory};
pub use baker_operations::{create_baker, element_count, invalidate, tick};
