//! Adjacency rules for the column graph.
//!
//! A move goes from one column's surface to a cardinal neighbour's surface.
//! The rules encode what the agent can physically do: climb one block, drop
//! one block (or two, when the fallback allows it), and only enter cells
//! where its two-block-tall body fits.

use crate::terrain::TerrainModel;
use crate::types::Column;
use std::fmt;

pub const MAX_STEP_UP: i32 = 1;
pub const MAX_REVERSIBLE_DROP: i32 = 1;
pub const MAX_FALLBACK_DROP: i32 = 2;

pub const LEVEL_COST: f64 = 1.0;
pub const STEP_UP_COST: f64 = 1.0;
pub const DROP_COST: f64 = 1.1;
pub const FALLBACK_DROP_COST: f64 = 1.3;

/// Cardinal directions. +z is south, -z is north.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    East,
    West,
    South,
    North,
}

impl Direction {
    /// Fixed expansion order.
    pub const ALL: [Direction; 4] = [
        Direction::East,
        Direction::West,
        Direction::South,
        Direction::North,
    ];

    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
            Direction::South => (0, 1),
            Direction::North => (0, -1),
        }
    }

    pub fn step(self, column: Column) -> Column {
        let (dx, dz) = self.offset();
        (column.0 + dx, column.1 + dz)
    }

    /// The two columns beside `column`, perpendicular to this direction.
    pub fn flanks(self, column: Column) -> [Column; 2] {
        let (dx, dz) = self.offset();
        [(column.0 + dz, column.1 + dx), (column.0 - dz, column.1 - dx)]
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::East => "east (+x)",
            Direction::West => "west (-x)",
            Direction::South => "south (+z)",
            Direction::North => "north (-z)",
        };
        f.write_str(name)
    }
}

/// Whether irreversible drops are allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveMode {
    Reversible,
    DropFallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    Level,
    StepUp,
    Drop,
    /// Two-block drop, only produced in [`MoveMode::DropFallback`].
    FallbackDrop,
}

impl StepKind {
    pub fn cost(self) -> f64 {
        match self {
            StepKind::Level => LEVEL_COST,
            StepKind::StepUp => STEP_UP_COST,
            StepKind::Drop => DROP_COST,
            StepKind::FallbackDrop => FALLBACK_DROP_COST,
        }
    }

    pub fn is_reversible(self) -> bool {
        self != StepKind::FallbackDrop
    }
}

/// An accepted move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub to: Column,
    pub surface: i32,
    pub kind: StepKind,
}

impl Step {
    pub fn cost(&self) -> f64 {
        self.kind.cost()
    }
}

/// The adjacency rule that rejected a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockedBy {
    /// The neighbour column has no known walkable surface.
    NoSurface,
    /// Climb of more than one block.
    ClimbTooHigh(i32),
    /// Two-block drop while only reversible moves are allowed.
    IrreversibleDrop(i32),
    /// Drop deeper than the fallback permits.
    DropTooDeep(i32),
    /// Liquid in the neighbour's body or head cell.
    Liquid,
    /// Solid block where the agent's feet would be.
    BodyBlocked,
    /// Solid block where the agent's head would be.
    HeadBlocked,
    /// A flanking column's body or head cell is obstructed.
    FlankBlocked,
    /// Solid block above the agent's head when stepping up.
    NoHeadroom,
    /// The neighbour column is obstructed at the height the agent enters it.
    NoDropClearance,
    /// Two-block drop into a pit with no reversible way back to higher ground.
    NoEscape,
}

impl fmt::Display for BlockedBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockedBy::NoSurface => write!(f, "no walkable surface"),
            BlockedBy::ClimbTooHigh(dh) => write!(f, "climb of {} blocks (max {})", dh, MAX_STEP_UP),
            BlockedBy::IrreversibleDrop(depth) => {
                write!(f, "drop of {} blocks is not reversible", depth)
            }
            BlockedBy::DropTooDeep(depth) => {
                write!(f, "drop of {} blocks (max {})", depth, MAX_FALLBACK_DROP)
            }
            BlockedBy::Liquid => write!(f, "liquid at body or head level"),
            BlockedBy::BodyBlocked => write!(f, "body cell is solid"),
            BlockedBy::HeadBlocked => write!(f, "head cell is solid"),
            BlockedBy::FlankBlocked => write!(f, "too narrow, side columns are obstructed"),
            BlockedBy::NoHeadroom => write!(f, "no headroom to step up"),
            BlockedBy::NoDropClearance => write!(f, "no clearance to step off the ledge"),
            BlockedBy::NoEscape => write!(f, "drop lands in a pit with no way back up"),
        }
    }
}

/// Read-only view of the terrain with the movement rules applied.
#[derive(Debug, Clone, Copy)]
pub struct MoveRules<'a> {
    terrain: &'a TerrainModel,
    footprint_clearance: bool,
}

impl<'a> MoveRules<'a> {
    pub fn new(terrain: &'a TerrainModel, footprint_clearance: bool) -> Self {
        MoveRules {
            terrain,
            footprint_clearance,
        }
    }

    /// Checks one move from `from` (standing on `from_surface`) toward `direction`.
    pub fn evaluate(
        &self,
        from: Column,
        from_surface: i32,
        direction: Direction,
        mode: MoveMode,
    ) -> Result<Step, BlockedBy> {
        let to = direction.step(from);
        let surface = self.terrain.surface(to).ok_or(BlockedBy::NoSurface)?;
        let dh = surface - from_surface;

        let kind = if dh > MAX_STEP_UP {
            return Err(BlockedBy::ClimbTooHigh(dh));
        } else if dh == MAX_STEP_UP {
            StepKind::StepUp
        } else if dh == 0 {
            StepKind::Level
        } else if -dh <= MAX_REVERSIBLE_DROP {
            StepKind::Drop
        } else if -dh > MAX_FALLBACK_DROP {
            return Err(BlockedBy::DropTooDeep(-dh));
        } else if mode == MoveMode::Reversible {
            return Err(BlockedBy::IrreversibleDrop(-dh));
        } else {
            StepKind::FallbackDrop
        };

        let (tx, tz) = to;
        let body = (tx, surface + 1, tz);
        let head = (tx, surface + 2, tz);
        if self.terrain.is_liquid(body) || self.terrain.is_liquid(head) {
            return Err(BlockedBy::Liquid);
        }
        if self.terrain.is_solid(body) {
            return Err(BlockedBy::BodyBlocked);
        }
        if self.terrain.is_solid(head) {
            return Err(BlockedBy::HeadBlocked);
        }

        match kind {
            StepKind::Level if self.footprint_clearance => {
                for (fx, fz) in direction.flanks(to) {
                    if self.terrain.is_obstructed((fx, surface + 1, fz))
                        || self.terrain.is_obstructed((fx, surface + 2, fz))
                    {
                        return Err(BlockedBy::FlankBlocked);
                    }
                }
            }
            StepKind::StepUp => {
                if self.terrain.is_obstructed((from.0, from_surface + 2, from.1)) {
                    return Err(BlockedBy::NoHeadroom);
                }
            }
            StepKind::Drop | StepKind::FallbackDrop => {
                // the agent walks in at its current height before falling
                for y in (surface + 3)..=(from_surface + 2) {
                    if self.terrain.is_obstructed((tx, y, tz)) {
                        return Err(BlockedBy::NoDropClearance);
                    }
                }
            }
            StepKind::Level => {}
        }

        Ok(Step { to, surface, kind })
    }

    /// All accepted moves out of `from`, in [`Direction::ALL`] order.
    pub fn successors(
        &self,
        from: Column,
        from_surface: i32,
        mode: MoveMode,
    ) -> impl Iterator<Item = Step> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(move |dir| self.evaluate(from, from_surface, dir, mode).ok())
    }
}
