//! Terrain reasoning over sparse voxel block scans.
//!
//! Three pure, synchronous pieces share one input type, [`BlockSample`]:
//!
//! - [`terrain`] classifies samples and derives a walkable surface per column.
//! - [`planner`] runs A* over that surface with step, hazard and
//!   reversibility rules, producing waypoints an agent can walk one by one.
//! - [`visibility`] keeps the blocks an observer can actually see.
//!
//! Each call builds everything from the snapshot it is given. Nothing is
//! cached between calls.

pub mod block;
pub mod classify;
pub mod config;
pub mod error;
pub mod ingest;
pub mod planner;
pub mod terrain;
pub mod types;
pub mod visibility;

pub use block::BlockSample;
pub use classify::{Classification, Classifier};
pub use config::{PlannerConfig, VisibilityConfig};
pub use error::{IngestError, PlanError};
pub use ingest::{parse_blocks, parse_blocks_json};
pub use planner::{plan_path, try_plan_path, PathPlan, PathResult, SearchPhase};
pub use terrain::TerrainModel;
pub use types::{BlockPos, Column, Position, Waypoint};
pub use visibility::{filter_visible, filter_visible_surface, VisibilityFilter};
