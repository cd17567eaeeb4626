//! Construction errors. Partitioning and naming cannot fail.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("only one unnamed parameter allowed, got {count}")]
    TooManyUnnamed { count: usize },

    #[error("`{key}` is reserved and cannot be given as a setting")]
    ReservedKey { key: String },

    #[error("a nested collection must be the only item, got {count} items")]
    NestedCollectionNotAlone { count: usize },

    #[error("unsupported collection item of type {kind}")]
    UnsupportedItem { kind: &'static str },
}

#[derive(Debug, Error, PartialEq)]
pub enum SetupError {
    #[error("rank-deficient observation noise not supported (rank {rank} of {m})")]
    RankDeficientObsNoise { rank: usize, m: usize },

    #[error("time step must be positive, got {dt}")]
    NonPositiveStep { dt: f64 },

    #[error("observation interval must be at least one step")]
    ZeroObsInterval,

    #[error("covariance rank {rank} exceeds dimension {m}")]
    RankExceedsDimension { rank: usize, m: usize },
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("malformed report: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported report version {0}")]
    Version(String),

    #[error("inconsistent report: {0}")]
    Shape(String),
}
