//! Error types for geometry, configuration and generation.

use thiserror::Error;

use crate::picker::NodeId;

/// Geometry construction errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeomError {
    #[error("rectangle size must be non-negative, got {width}x{height}")]
    NegativeSize { width: i32, height: i32 },
}

/// Invalid chain configuration, reported before any search starts
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("node {node}: repeat count must be at least 1")]
    ZeroCount { node: NodeId },

    #[error("node {node}: {what} size must be positive, got {width}x{height}")]
    EmptySize {
        node: NodeId,
        what: &'static str,
        width: i32,
        height: i32,
    },

    #[error("node {node}: a branch needs 1 to {max} sub-chains, got {count}")]
    BranchCount { node: NodeId, count: usize, max: usize },

    #[error("node {node}: a branch is placed exactly once, got count {count}")]
    BranchRepeat { node: NodeId, count: u32 },

    #[error("node {node}: a branch cannot be followed by another node; continue inside a sub-chain")]
    BranchFollowedBy { node: NodeId },
}

/// Failure of a whole generation run
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("no arrangement found for seed '{seed}'")]
    NoArrangement { seed: String },

    #[error("search for seed '{seed}' gave up after {steps} steps")]
    StepLimit { seed: String, steps: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GenError::NoArrangement {
            seed: "abc".to_string(),
        };
        assert!(err.to_string().contains("abc"));

        let err: GenError = ConfigError::ZeroCount { node: 3 }.into();
        assert!(err.to_string().contains("node 3"));
    }
}
