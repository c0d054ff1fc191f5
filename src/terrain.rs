//! Terrain model: classified block sets plus a per-column walkable surface.

use crate::block::BlockSample;
use crate::classify::{Classification, Classifier};
use crate::types::{BlockPos, Column};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use tracing::{debug, trace};

/// How many samples fell into each class during a build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClassificationCounts {
    pub liquid: usize,
    pub passable: usize,
    pub hidden_collision: usize,
    pub solid: usize,
    pub open: usize,
}

impl ClassificationCounts {
    fn record(&mut self, class: Classification) {
        match class {
            Classification::Liquid => self.liquid += 1,
            Classification::PassableDespiteSolid => self.passable += 1,
            Classification::HiddenCollision => self.hidden_collision += 1,
            Classification::Solid => self.solid += 1,
            Classification::Open => self.open += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.liquid + self.passable + self.hidden_collision + self.solid + self.open
    }
}

/// Immutable terrain snapshot derived from one block scan.
#[derive(Debug, Clone, Default)]
pub struct TerrainModel {
    heightmap: FxHashMap<Column, i32>,
    solid: FxHashSet<BlockPos>,
    liquid: FxHashSet<BlockPos>,
    counts: ClassificationCounts,
}

impl TerrainModel {
    /// Builds the model with the default classification table.
    ///
    /// `reference_y` is the agent's foot-level block y. When a column has
    /// several candidate surfaces (overhangs, floors under roofs), the one
    /// closest to `reference_y - 1` wins; without it the highest wins.
    pub fn build(samples: &[BlockSample], reference_y: Option<i32>) -> Self {
        Self::build_with(samples, reference_y, &Classifier::default())
    }

    pub fn build_with(
        samples: &[BlockSample],
        reference_y: Option<i32>,
        classifier: &Classifier,
    ) -> Self {
        let mut solid = FxHashSet::default();
        let mut liquid = FxHashSet::default();
        let mut surface_blocks = Vec::new();
        let mut counts = ClassificationCounts::default();

        for sample in samples {
            if !sample.is_in_world() {
                trace!(block = %sample, "outside world bounds, skipped");
                continue;
            }
            let verdict = classifier.explain(sample);
            counts.record(verdict.class);
            let pos = sample.position();

            match verdict.class {
                Classification::Liquid => {
                    liquid.insert(pos);
                }
                Classification::HiddenCollision => {
                    trace!(block = %sample, family = ?verdict.family, "hidden collision");
                    solid.insert(pos);
                }
                Classification::Solid => {
                    solid.insert(pos);
                    surface_blocks.push(pos);
                }
                Classification::PassableDespiteSolid | Classification::Open => {}
            }
        }

        let mut heightmap: FxHashMap<Column, i32> = FxHashMap::default();
        for &(x, y, z) in &surface_blocks {
            if solid.contains(&(x, y + 1, z)) {
                continue;
            }
            heightmap
                .entry((x, z))
                .and_modify(|current| {
                    if prefer_surface(y, *current, reference_y) {
                        *current = y;
                    }
                })
                .or_insert(y);
        }

        debug!(
            samples = samples.len(),
            solid = solid.len(),
            liquid = liquid.len(),
            columns = heightmap.len(),
            hidden_collision = counts.hidden_collision,
            passable = counts.passable,
            "built terrain model"
        );

        TerrainModel {
            heightmap,
            solid,
            liquid,
            counts,
        }
    }

    /// Walkable surface y for a column (the block the agent stands on).
    pub fn surface(&self, column: Column) -> Option<i32> {
        self.heightmap.get(&column).copied()
    }

    pub fn has_column(&self, column: Column) -> bool {
        self.heightmap.contains_key(&column)
    }

    pub fn is_solid(&self, pos: BlockPos) -> bool {
        self.solid.contains(&pos)
    }

    pub fn is_liquid(&self, pos: BlockPos) -> bool {
        self.liquid.contains(&pos)
    }

    /// Solid or liquid: the agent's body may not occupy this cell.
    pub fn is_obstructed(&self, pos: BlockPos) -> bool {
        self.is_solid(pos) || self.is_liquid(pos)
    }

    pub fn heightmap(&self) -> &FxHashMap<Column, i32> {
        &self.heightmap
    }

    pub fn solid_blocks(&self) -> &FxHashSet<BlockPos> {
        &self.solid
    }

    pub fn liquid_blocks(&self) -> &FxHashSet<BlockPos> {
        &self.liquid
    }

    pub fn columns(&self) -> impl Iterator<Item = (Column, i32)> + '_ {
        self.heightmap.iter().map(|(&c, &y)| (c, y))
    }

    pub fn column_count(&self) -> usize {
        self.heightmap.len()
    }

    /// True when no column has a walkable surface.
    pub fn is_empty(&self) -> bool {
        self.heightmap.is_empty()
    }

    pub fn classification_counts(&self) -> ClassificationCounts {
        self.counts
    }
}

/// Whether `candidate` should replace `current` as a column's surface.
fn prefer_surface(candidate: i32, current: i32, reference_y: Option<i32>) -> bool {
    match reference_y {
        Some(reference) => {
            let target = reference.saturating_sub(1);
            let candidate_dist = (i64::from(candidate) - i64::from(target)).abs();
            let current_dist = (i64::from(current) - i64::from(target)).abs();
            candidate_dist < current_dist || (candidate_dist == current_dist && candidate > current)
        }
        None => candidate > current,
    }
}
