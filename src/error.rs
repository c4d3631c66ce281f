//! Unified error handling for the baking pipeline.
//!
//! Configuration errors are detected at setup/validate time and leave
//! the pipeline inert; transient errors are fatal to a single frame
//! only. Structural invalidation is not an error and never appears
//! here.

use std::error::Error as StdError;
use std::fmt;

/// Main error type for the baker.
#[derive(Debug)]
pub enum BakerError {
    // Configuration errors
    InvalidConfig {
        field: String,
        value: String,
        reason: String,
    },
    EmptySourceList,
    MapNotAligned {
        width: u32,
        height: u32,
    },
    MapDimensionMismatch {
        map: &'static str,
        expected: (u32, u32),
        found: (u32, u32),
    },

    // Plan build errors
    EmptyTopology,
    IndexOutOfRange {
        index: u32,
        vertex_count: usize,
    },

    // Per-frame errors
    SnapshotFailed {
        source_index: usize,
        error: String,
    },
    BufferSizeMismatch {
        buffer: &'static str,
        expected: usize,
        found: usize,
    },

    // GPU errors
    GpuOperationFailed {
        operation: String,
        error: String,
    },

    // Generic fallback
    Internal {
        message: String,
    },
}

impl fmt::Display for BakerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BakerError::InvalidConfig {
                field,
                value,
                reason,
            } => write!(f, "Invalid config: {} = {} ({})", field, value, reason),
            BakerError::EmptySourceList => {
                write!(f, "Source list is empty; at least one mesh source is required")
            }
            BakerError::MapNotAligned { width, height } => write!(
                f,
                "Map size {}x{} is not a multiple of 8 in both dimensions",
                width, height
            ),
            BakerError::MapDimensionMismatch {
                map,
                expected,
                found,
            } => write!(
                f,
                "{} map is {}x{}, expected {}x{}",
                map, found.0, found.1, expected.0, expected.1
            ),

            BakerError::EmptyTopology => {
                write!(f, "Combined topology has no triangles to sample")
            }
            BakerError::IndexOutOfRange {
                index,
                vertex_count,
            } => write!(
                f,
                "Triangle index {} out of range for {} vertices",
                index, vertex_count
            ),

            BakerError::SnapshotFailed {
                source_index,
                error,
            } => write!(f, "Source {} failed to bake: {}", source_index, error),
            BakerError::BufferSizeMismatch {
                buffer,
                expected,
                found,
            } => write!(
                f,
                "{} buffer holds {} elements, expected {}",
                buffer, found, expected
            ),

            BakerError::GpuOperationFailed { operation, error } => {
                write!(f, "GPU operation '{}' failed: {}", operation, error)
            }

            BakerError::Internal { message } => write!(f, "Internal error: {}", message),
        }
    }
}

impl StdError for BakerError {}

/// Type alias for Results in the baker.
pub type BakerResult<T> = Result<T, BakerError>;
