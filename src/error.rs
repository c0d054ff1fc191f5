//! Error types for ingestion and path planning.
//!
//! Nothing in this crate panics on degenerate input; every failure is one of
//! these values, and [`crate::planner::plan_path`] folds [`PlanError`] into the
//! `reason` field of a [`crate::planner::PathResult`].

use crate::planner::moves::{BlockedBy, Direction};
use crate::types::Column;
use std::fmt;

/// Errors raised while decoding block records from their wire form.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum IngestError {
    #[error("block record {index} is not an object")]
    NotAnObject { index: usize },

    #[error("block record {index} is missing coordinate '{axis}'")]
    MissingCoordinate { index: usize, axis: &'static str },

    #[error("block record {index} has non-finite or out-of-range coordinate '{axis}'")]
    InvalidCoordinate { index: usize, axis: &'static str },

    #[error("block record {index} has invalid field: {message}")]
    InvalidField { index: usize, message: String },

    #[error("invalid block JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why a single cardinal move from the resolved start was rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockedDirection {
    pub direction: Direction,
    pub reason: BlockedBy,
}

impl fmt::Display for BlockedDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.direction, self.reason)
    }
}

/// Path planning failures, one per failure class.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum PlanError {
    /// The scan contained no blocks at all.
    #[error("No block data provided")]
    NoBlockData,

    /// A block record could not be decoded.
    #[error("Invalid block data: {0}")]
    InvalidInput(String),

    /// The agent or target position is non-finite or outside the world bounds.
    #[error("Invalid {0} position: coordinates must be finite and within the world bounds")]
    InvalidPosition(&'static str),

    /// Blocks were supplied but none forms a walkable surface.
    #[error("No walkable surfaces found in block data")]
    NoWalkableSurface,

    /// The target is outside the scan and nothing reachable advances toward it.
    #[error("Cannot determine path toward target: no reachable column advances toward it")]
    NoSubstituteGoal,

    /// Both the reversible search and the drop fallback failed.
    #[error("No safe path found{}", describe_exhaustion(.start, .blocked))]
    SearchExhausted {
        /// Resolved start column, `None` if no surface near the agent matched.
        start: Option<Column>,
        /// Moves out of the start and the rule that rejected each.
        blocked: Vec<BlockedDirection>,
    },
}

fn describe_exhaustion(start: &Option<Column>, blocked: &[BlockedDirection]) -> String {
    match *start {
        None => " (no walkable surface near the agent's position)".to_string(),
        Some((x, z)) if blocked.is_empty() => format!(
            " from ({}, {}): every adjacent move is open, the route is cut off further out",
            x, z
        ),
        Some((x, z)) => {
            let parts: Vec<String> = blocked.iter().map(|b| b.to_string()).collect();
            format!(" from ({}, {}): {}", x, z, parts.join("; "))
        }
    }
}

impl From<IngestError> for PlanError {
    fn from(err: IngestError) -> Self {
        PlanError::InvalidInput(err.to_string())
    }
}
