//! Safe-path planning over a [`TerrainModel`].
//!
//! The planner searches the 4-connected column graph with A*. It first allows
//! only reversible moves (climb or drop at most one block). If that fails it
//! retries allowing a single 2-block drop, but only onto landings from which
//! a bounded search finds a way back up to higher ground.
//!
//! Targets outside the scanned area are replaced by an *edge goal*: the
//! reachable column that advances furthest toward the target. The caller is
//! expected to walk the partial path and plan again from its new position.
//!
//! ```
//! use terrasight::planner::plan_path;
//! use terrasight::{BlockSample, PlannerConfig, Position};
//!
//! let mut blocks = Vec::new();
//! for x in -5..=5 {
//!     for z in -5..=5 {
//!         blocks.push(BlockSample::solid((x, 100, z), "game:soil"));
//!     }
//! }
//!
//! let result = plan_path(
//!     Position::new(0.5, 101.0, 0.5),
//!     Position::new(3.5, 101.0, 0.5),
//!     &blocks,
//!     &PlannerConfig::default(),
//! );
//! assert!(result.success && result.reached_target);
//! assert_eq!(result.waypoints.last().map(|w| (w.x, w.y, w.z)), Some((3, 101, 0)));
//! ```

pub mod moves;
mod search;

use crate::block::BlockSample;
use crate::config::PlannerConfig;
use crate::error::PlanError;
use crate::ingest::parse_blocks;
use crate::terrain::TerrainModel;
use crate::types::{horizontal_distance, BlockPos, Column, Position, Waypoint};
use moves::{MoveMode, MoveRules};
use search::Search;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

/// Where to look for the start surface around the agent's column:
/// exact, then cardinal, then diagonal.
pub const START_SEARCH_OFFSETS: [(i32, i32); 9] = [
    (0, 0),
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

/// Max difference between a start surface and the agent's foot-level y.
pub const START_ELEVATION_TOLERANCE: i32 = 2;

/// Wire-format planning result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathResult {
    pub success: bool,
    pub waypoints: Vec<Waypoint>,
    pub reached_target: bool,
    /// Horizontal distance from the last waypoint (or the agent, on failure)
    /// to the target. Serialized as `null` when infinite.
    #[serde(deserialize_with = "infinite_when_null")]
    pub distance_to_target: f64,
    pub reason: String,
}

impl PathResult {
    pub fn failure(error: &PlanError, distance_to_target: f64) -> Self {
        PathResult {
            success: false,
            waypoints: Vec::new(),
            reached_target: false,
            distance_to_target,
            reason: error.to_string(),
        }
    }
}

fn infinite_when_null<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
}

impl From<PathPlan> for PathResult {
    fn from(plan: PathPlan) -> Self {
        PathResult {
            success: true,
            waypoints: plan.waypoints,
            reached_target: plan.reached_target,
            distance_to_target: plan.distance_to_target,
            reason: String::new(),
        }
    }
}

/// Which search pass produced a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchPhase {
    Reversible,
    DropFallback,
}

/// A successful plan with the details the wire format leaves out.
#[derive(Debug, Clone, PartialEq)]
pub struct PathPlan {
    pub waypoints: Vec<Waypoint>,
    pub reached_target: bool,
    pub distance_to_target: f64,
    pub phase: SearchPhase,
    /// Start column after snapping the agent's position to the terrain.
    pub start: Column,
    /// Literal target column, or the edge goal substituted for it.
    pub goal: Column,
}

impl PathPlan {
    /// True when the goal was substituted because the target lies outside
    /// the scan.
    pub fn is_partial(&self) -> bool {
        !self.reached_target
    }
}

/// Plans from `current` toward `target`, folding failures into the result.
pub fn plan_path(
    current: Position,
    target: Position,
    blocks: &[BlockSample],
    config: &PlannerConfig,
) -> PathResult {
    match try_plan_path(current, target, blocks, config) {
        Ok(plan) => plan.into(),
        Err(err) => PathResult::failure(&err, failure_distance(&err, current, target)),
    }
}

/// Like [`plan_path`], decoding raw wire records first.
pub fn plan_path_records(
    current: Position,
    target: Position,
    records: &[Value],
    config: &PlannerConfig,
) -> PathResult {
    match parse_blocks(records) {
        Ok(blocks) => plan_path(current, target, &blocks, config),
        Err(err) => {
            let err = PlanError::from(err);
            PathResult::failure(&err, failure_distance(&err, current, target))
        }
    }
}

/// Builds a terrain model from `blocks` (preferring surfaces near the
/// agent's elevation) and plans on it.
pub fn try_plan_path(
    current: Position,
    target: Position,
    blocks: &[BlockSample],
    config: &PlannerConfig,
) -> Result<PathPlan, PlanError> {
    if blocks.is_empty() {
        return Err(PlanError::NoBlockData);
    }
    check_positions(current, target)?;
    let (_, agent_y, _) = current.to_block_pos();
    let terrain = TerrainModel::build(blocks, Some(agent_y));
    plan_on_terrain(current, target, &terrain, config)
}

/// Plans on an already-built terrain model.
pub fn plan_on_terrain(
    current: Position,
    target: Position,
    terrain: &TerrainModel,
    config: &PlannerConfig,
) -> Result<PathPlan, PlanError> {
    check_positions(current, target)?;
    if terrain.is_empty() {
        return Err(PlanError::NoWalkableSurface);
    }

    let agent = current.to_block_pos();
    let target_column = target.column();

    let start = resolve_start(terrain, agent).ok_or(PlanError::SearchExhausted {
        start: None,
        blocked: Vec::new(),
    })?;
    debug!(agent = ?agent, start = ?start, "resolved start column");

    let rules = MoveRules::new(terrain, config.footprint_clearance);
    let mut search = Search::new(
        rules,
        config.node_budget(terrain.column_count()),
        config.escape_search_budget,
    );

    let literal = terrain.has_column(target_column);
    let goal = if literal {
        target_column
    } else {
        let goal = edge_goal(&mut search, start, (agent.0, agent.2), target_column, config)?;
        debug!(target = ?target_column, edge_goal = ?goal, "target outside scan");
        goal
    };

    let mut phase = SearchPhase::Reversible;
    let mut path = search.astar(start, goal, MoveMode::Reversible);
    if path.is_none() && config.allow_drop_fallback {
        debug!(?goal, "no reversible path, retrying with drop fallback");
        phase = SearchPhase::DropFallback;
        path = search.astar(start, goal, MoveMode::DropFallback);
    }

    let Some(path) = path else {
        let mode = if config.allow_drop_fallback {
            MoveMode::DropFallback
        } else {
            MoveMode::Reversible
        };
        return Err(PlanError::SearchExhausted {
            start: Some(start.0),
            blocked: search.diagnose(start, mode),
        });
    };

    let waypoints: Vec<Waypoint> = path
        .iter()
        .map(|&(column, surface)| Waypoint::standing_on(column, surface))
        .collect();
    let end = path.last().map(|p| p.0).unwrap_or(start.0);

    debug!(waypoints = waypoints.len(), ?phase, ?goal, "path found");

    Ok(PathPlan {
        reached_target: literal && end == target_column,
        distance_to_target: horizontal_distance(end, target_column),
        waypoints,
        phase,
        start: start.0,
        goal,
    })
}

fn check_positions(current: Position, target: Position) -> Result<(), PlanError> {
    if !current.is_in_world() {
        return Err(PlanError::InvalidPosition("agent"));
    }
    if !target.is_in_world() {
        return Err(PlanError::InvalidPosition("target"));
    }
    Ok(())
}

/// Snaps the agent's block position to a walkable column: the exact column,
/// then the 4 cardinal, then the 4 diagonal neighbours, taking the first
/// whose surface is within [`START_ELEVATION_TOLERANCE`] of the agent's y.
pub fn resolve_start(terrain: &TerrainModel, agent: BlockPos) -> Option<(Column, i32)> {
    let (x, y, z) = agent;
    START_SEARCH_OFFSETS.iter().find_map(|&(dx, dz)| {
        let column = (x.saturating_add(dx), z.saturating_add(dz));
        terrain
            .surface(column)
            .filter(|&surface| surface.abs_diff(y) <= START_ELEVATION_TOLERANCE.unsigned_abs())
            .map(|surface| (column, surface))
    })
}

/// Picks the reachable column with the largest projection onto the
/// `origin -> target` direction.
fn edge_goal(
    search: &mut Search<'_>,
    start: (Column, i32),
    origin: Column,
    target: Column,
    config: &PlannerConfig,
) -> Result<Column, PlanError> {
    let dx = (target.0 - origin.0) as f64;
    let dz = (target.1 - origin.1) as f64;
    let length = (dx * dx + dz * dz).sqrt();
    if length == 0.0 {
        // the target is straight above or below the agent
        return Ok(start.0);
    }
    let (ux, uz) = (dx / length, dz / length);
    let projection =
        |c: Column| ((c.0 - origin.0) as f64) * ux + ((c.1 - origin.1) as f64) * uz;
    let start_score = projection(start.0);

    let mut modes = vec![MoveMode::Reversible];
    if config.allow_drop_fallback {
        modes.push(MoveMode::DropFallback);
    }

    for mode in modes {
        let best = search
            .reachable(start, mode)
            .into_iter()
            .map(|c| (projection(c), c))
            .max_by(|(sa, ca), (sb, cb)| {
                // ties go to the column nearer the target, then the lower (x, z)
                sa.total_cmp(sb)
                    .then_with(|| {
                        horizontal_distance(*cb, target).total_cmp(&horizontal_distance(*ca, target))
                    })
                    .then_with(|| cb.cmp(ca))
            });
        if let Some((score, column)) = best {
            if score > start_score {
                return Ok(column);
            }
        }
    }

    Err(PlanError::NoSubstituteGoal)
}

fn failure_distance(err: &PlanError, current: Position, target: Position) -> f64 {
    match err {
        PlanError::SearchExhausted { .. } => horizontal_distance(current.column(), target.column()),
        _ => f64::INFINITY,
    }
}
