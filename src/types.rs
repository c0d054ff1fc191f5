use serde::{Deserialize, Serialize};
use std::fmt;

/// Integer block coordinate `(x, y, z)`.
pub type BlockPos = (i32, i32, i32);

/// Horizontal column coordinate `(x, z)`.
pub type Column = (i32, i32);

/// Block coordinates stay inside `-WORLD_LIMIT..WORLD_LIMIT` on every axis
/// so neighbour and clearance offsets never overflow.
pub const WORLD_LIMIT: i32 = 1 << 30;

pub fn in_world(pos: BlockPos) -> bool {
    let (x, y, z) = pos;
    [x, y, z]
        .iter()
        .all(|v| (-WORLD_LIMIT..WORLD_LIMIT).contains(v))
}

/// Whether `value` floors to a coordinate inside the world bounds.
pub fn is_world_coordinate(value: f64) -> bool {
    let limit = f64::from(WORLD_LIMIT);
    value.is_finite() && value >= -limit && value < limit
}

/// Real-valued world position, as reported by the game for the agent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Position { x, y, z }
    }

    /// True when every axis is finite and inside the world bounds.
    pub fn is_in_world(&self) -> bool {
        [self.x, self.y, self.z].into_iter().all(is_world_coordinate)
    }

    /// The block cell containing this position.
    pub fn to_block_pos(&self) -> BlockPos {
        (
            self.x.floor() as i32,
            self.y.floor() as i32,
            self.z.floor() as i32,
        )
    }

    pub fn column(&self) -> Column {
        (self.x.floor() as i32, self.z.floor() as i32)
    }

    pub fn offset_y(&self, dy: f64) -> Self {
        Position::new(self.x, self.y + dy, self.z)
    }

    /// Center of the given block cell.
    pub fn block_center(pos: BlockPos) -> Self {
        Position::new(
            pos.0 as f64 + 0.5,
            pos.1 as f64 + 0.5,
            pos.2 as f64 + 0.5,
        )
    }

    pub fn distance_to(&self, other: &Position) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        let dz = other.z - self.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

/// A point the agent should walk to. `y` is foot level, one above the
/// surface block it stands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Waypoint {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Waypoint {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Waypoint { x, y, z }
    }

    /// Waypoint for standing on the surface block at `surface_y` in `column`.
    pub fn standing_on(column: Column, surface_y: i32) -> Self {
        Waypoint::new(column.0, surface_y + 1, column.1)
    }

    pub fn column(&self) -> Column {
        (self.x, self.z)
    }

    /// The surface block under the agent's feet.
    pub fn surface_y(&self) -> i32 {
        self.y - 1
    }
}

/// Euclidean distance between two columns in the horizontal plane.
pub fn horizontal_distance(a: Column, b: Column) -> f64 {
    let dx = f64::from(b.0) - f64::from(a.0);
    let dz = f64::from(b.1) - f64::from(a.1);
    (dx * dx + dz * dz).sqrt()
}
