//! Texture encoding - projects flat buffers into the fixed texel grids.

pub mod cpu_encoder;
pub mod gpu_dispatch;
pub mod map_layout;
pub mod transfer;

pub use cpu_encoder::CpuTransferEncoder;
pub use gpu_dispatch::GpuTransferDispatch;
pub use map_layout::{validate_map_set, MapLayout};
pub use transfer::{TransferDispatch, TransferFrame};
