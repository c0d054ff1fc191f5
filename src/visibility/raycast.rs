//! Voxel ray traversal (Amanatides & Woo).
//!
//! [`VoxelRay`] walks every unit cell a segment passes through, yielding each
//! cell with the distance along the ray at which it is entered. Cells are
//! unit cubes with integer minimum corners, matching [`BlockPos`].

use crate::types::{BlockPos, Position};

/// Iterator over the cells crossed by a ray.
#[derive(Debug, Clone)]
pub struct VoxelRay {
    current: [i32; 3],
    step: [i32; 3],
    /// Distance to the next cell boundary on each axis.
    t_max: [f64; 3],
    /// Distance between boundaries on each axis.
    t_delta: [f64; 3],
    first: bool,
}

impl VoxelRay {
    /// Starts a traversal at `origin` heading along `direction`.
    ///
    /// `direction` is normalized here, so yielded distances are in blocks.
    /// A zero direction yields only the origin cell.
    pub fn new(origin: Position, direction: [f64; 3]) -> Self {
        let length = direction.iter().map(|d| d * d).sum::<f64>().sqrt();
        let dir = if length > 0.0 {
            direction.map(|d| d / length)
        } else {
            [0.0; 3]
        };
        let pos = [origin.x, origin.y, origin.z];
        let current = pos.map(|p| p.floor() as i32);

        let mut step = [0i32; 3];
        let mut t_max = [f64::INFINITY; 3];
        let mut t_delta = [f64::INFINITY; 3];

        for axis in 0..3 {
            if dir[axis] == 0.0 {
                continue;
            }
            let cell = f64::from(current[axis]);
            if dir[axis] > 0.0 {
                step[axis] = 1;
                t_max[axis] = (cell + 1.0 - pos[axis]) / dir[axis];
            } else {
                step[axis] = -1;
                t_max[axis] = (pos[axis] - cell) / -dir[axis];
            }
            t_delta[axis] = (1.0 / dir[axis]).abs();
        }

        VoxelRay {
            current,
            step,
            t_max,
            t_delta,
            first: true,
        }
    }

    /// A ray from `origin` toward the center of `target`, plus the distance
    /// to that center.
    pub fn toward(origin: Position, target: BlockPos) -> (Self, f64) {
        let center = Position::block_center(target);
        let direction = [center.x - origin.x, center.y - origin.y, center.z - origin.z];
        (VoxelRay::new(origin, direction), origin.distance_to(&center))
    }
}

impl Iterator for VoxelRay {
    type Item = (BlockPos, f64);

    fn next(&mut self) -> Option<Self::Item> {
        let [x, y, z] = self.current;
        if self.first {
            self.first = false;
            return Some(((x, y, z), 0.0));
        }

        let axis = if self.t_max[0] < self.t_max[1] {
            if self.t_max[0] < self.t_max[2] {
                0
            } else {
                2
            }
        } else if self.t_max[1] < self.t_max[2] {
            1
        } else {
            2
        };

        let entered = self.t_max[axis];
        if !entered.is_finite() {
            return None;
        }
        self.current[axis] += self.step[axis];
        self.t_max[axis] += self.t_delta[axis];

        let [x, y, z] = self.current;
        Some(((x, y, z), entered))
    }
}

/// Whether the center of `target` can be seen from `eye`.
///
/// Any cell the ray enters before reaching `target` blocks the view if
/// `is_opaque` says so. The cell containing `eye` never blocks. An eye
/// placed exactly at the target's center sees it.
pub fn line_of_sight<F>(eye: Position, target: BlockPos, max_distance: f64, is_opaque: F) -> bool
where
    F: Fn(BlockPos) -> bool,
{
    let (ray, distance) = VoxelRay::toward(eye, target);
    if distance == 0.0 {
        return true;
    }
    if distance > max_distance {
        return false;
    }

    for (index, (cell, entered)) in ray.enumerate() {
        if entered >= distance {
            return cell == target;
        }
        if cell == target {
            return true;
        }
        if index > 0 && is_opaque(cell) {
            return false;
        }
    }
    false
}
