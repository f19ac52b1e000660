use thiserror::Error;

/// Precondition violations. All of them are raised before any generator state
/// is touched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerateError {
    #[error("Seed must be an integer, received {0:?}")]
    InvalidSeed(String),

    #[error("Bound must be positive")]
    InvalidBound,

    #[error("choice requires a non-empty sequence")]
    EmptyInput,

    #[error("min ({min}) cannot exceed max ({max})")]
    InvalidRange { min: usize, max: usize },

    #[error("--n must be a positive integer, received {0}")]
    InvalidCount(i64),

    #[error("--k must be a non-negative integer, received {0}")]
    InvalidDegree(i64),

    #[error("{facet} range is inverted: min ({min}) exceeds max ({max})")]
    InvalidFacetRange {
        facet: &'static str,
        min: usize,
        max: usize,
    },

    #[error("Timestamp for record {0} is out of range")]
    TimestampOverflow(usize),
}
