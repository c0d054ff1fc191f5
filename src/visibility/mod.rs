//! Line-of-sight filtering of a block scan.
//!
//! A block is visible when a voxel ray from the observer's eye to the
//! block's center enters no opaque cell first. Opaque cells are the scan's
//! reported-solid, non-liquid blocks. The surface variant further drops
//! solid blocks buried on all six sides.
//!
//! Every output preserves the input order.

pub mod raycast;

use crate::block::BlockSample;
use crate::config::VisibilityConfig;
use crate::error::IngestError;
use crate::ingest::parse_blocks;
use crate::types::{BlockPos, Position};
use raycast::line_of_sight;
use rustc_hash::FxHashSet;
use serde_json::Value;
use tracing::debug;

const FACE_OFFSETS: [(i32, i32, i32); 6] = [
    (1, 0, 0),
    (-1, 0, 0),
    (0, 1, 0),
    (0, -1, 0),
    (0, 0, 1),
    (0, 0, -1),
];

/// Visibility queries over one scan.
#[derive(Debug, Clone)]
pub struct VisibilityFilter<'a> {
    samples: &'a [BlockSample],
    opaque: FxHashSet<BlockPos>,
    config: VisibilityConfig,
}

impl<'a> VisibilityFilter<'a> {
    pub fn new(samples: &'a [BlockSample], config: VisibilityConfig) -> Self {
        let opaque = samples
            .iter()
            .filter(|s| s.solid && !s.liquid && s.is_in_world())
            .map(BlockSample::position)
            .collect();
        VisibilityFilter {
            samples,
            opaque,
            config,
        }
    }

    pub fn config(&self) -> &VisibilityConfig {
        &self.config
    }

    /// Ray origin for an observer standing at `observer`.
    pub fn eye(&self, observer: Position) -> Position {
        observer.offset_y(self.config.eye_height)
    }

    pub fn is_opaque(&self, pos: BlockPos) -> bool {
        self.opaque.contains(&pos)
    }

    /// Loose items and plants only count when something solid holds them up.
    fn is_candidate(&self, sample: &BlockSample) -> bool {
        if !sample.is_in_world() {
            return false;
        }
        sample.solid || sample.liquid || self.is_opaque(sample.below())
    }

    /// True when at least one face of `pos` touches a non-opaque cell.
    pub fn is_exposed(&self, pos: BlockPos) -> bool {
        let (x, y, z) = pos;
        FACE_OFFSETS
            .iter()
            .any(|&(dx, dy, dz)| {
                !self.is_opaque((x.saturating_add(dx), y.saturating_add(dy), z.saturating_add(dz)))
            })
    }

    fn sees(&self, eye: Position, sample: &BlockSample) -> bool {
        let max_distance = self.config.max_distance.unwrap_or(f64::INFINITY);
        line_of_sight(eye, sample.position(), max_distance, |cell| self.is_opaque(cell))
    }

    /// Whether the block has a face the agent could interact with.
    fn is_surface(&self, sample: &BlockSample) -> bool {
        if sample.liquid {
            return self.config.include_liquids;
        }
        // supported non-solid blocks already passed the candidate check
        !sample.solid || self.is_exposed(sample.position())
    }

    /// Indices into the scan of the visible blocks.
    pub fn visible_indices(&self, observer: Position) -> Vec<usize> {
        let eye = self.eye(observer);
        if !eye.is_in_world() {
            debug!(%eye, "eye outside world bounds, nothing visible");
            return Vec::new();
        }
        let indices: Vec<usize> = self
            .samples
            .iter()
            .enumerate()
            .filter(|(_, sample)| self.is_candidate(sample) && self.sees(eye, sample))
            .map(|(index, _)| index)
            .collect();
        debug!(
            %eye,
            scanned = self.samples.len(),
            visible = indices.len(),
            "visibility pass"
        );
        indices
    }

    /// Indices of the visible blocks that also have an exposed face.
    pub fn visible_surface_indices(&self, observer: Position) -> Vec<usize> {
        let visible = self.visible_indices(observer);
        let before = visible.len();
        let surface: Vec<usize> = visible
            .into_iter()
            .filter(|&index| self.is_surface(&self.samples[index]))
            .collect();
        debug!(visible = before, surface = surface.len(), "exposure pass");
        surface
    }

    pub fn visible(&self, observer: Position) -> Vec<&'a BlockSample> {
        let samples = self.samples;
        self.visible_indices(observer)
            .into_iter()
            .map(|index| &samples[index])
            .collect()
    }

    pub fn visible_surface(&self, observer: Position) -> Vec<&'a BlockSample> {
        let samples = self.samples;
        self.visible_surface_indices(observer)
            .into_iter()
            .map(|index| &samples[index])
            .collect()
    }
}

/// Visible blocks of `samples`, seen by an observer at `observer`.
pub fn filter_visible(
    observer: Position,
    samples: &[BlockSample],
    config: &VisibilityConfig,
) -> Vec<BlockSample> {
    VisibilityFilter::new(samples, *config)
        .visible(observer)
        .into_iter()
        .cloned()
        .collect()
}

/// Visible blocks with at least one exposed face.
pub fn filter_visible_surface(
    observer: Position,
    samples: &[BlockSample],
    config: &VisibilityConfig,
) -> Vec<BlockSample> {
    VisibilityFilter::new(samples, *config)
        .visible_surface(observer)
        .into_iter()
        .cloned()
        .collect()
}

/// [`filter_visible`] over raw wire records. Returns the original records.
pub fn filter_visible_records(
    observer: Position,
    records: &[Value],
    config: &VisibilityConfig,
) -> Result<Vec<Value>, IngestError> {
    let samples = parse_blocks(records)?;
    let filter = VisibilityFilter::new(&samples, *config);
    Ok(pick(records, filter.visible_indices(observer)))
}

/// [`filter_visible_surface`] over raw wire records.
pub fn filter_visible_surface_records(
    observer: Position,
    records: &[Value],
    config: &VisibilityConfig,
) -> Result<Vec<Value>, IngestError> {
    let samples = parse_blocks(records)?;
    let filter = VisibilityFilter::new(&samples, *config);
    Ok(pick(records, filter.visible_surface_indices(observer)))
}

fn pick(records: &[Value], indices: Vec<usize>) -> Vec<Value> {
    indices.into_iter().map(|i| records[i].clone()).collect()
}

/// Case-insensitive keyword match on block codes, from a comma-separated
/// list such as `"ore, quartz"`. An empty list matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeFilter {
    keywords: Vec<String>,
}

impl CodeFilter {
    pub fn parse(list: &str) -> Self {
        let keywords = list
            .split(',')
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        CodeFilter { keywords }
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn matches(&self, code: &str) -> bool {
        if self.keywords.is_empty() {
            return true;
        }
        let code = code.to_lowercase();
        self.keywords.iter().any(|k| code.contains(k.as_str()))
    }

    /// Matches a wire record by its `code` field. Records without one never
    /// match a non-empty filter.
    pub fn matches_record(&self, record: &Value) -> bool {
        match record.get("code").and_then(Value::as_str) {
            Some(code) => self.matches(code),
            None => self.is_empty(),
        }
    }
}

/// Keeps the samples whose code contains one of the comma-separated
/// `keywords`.
pub fn retain_matching_codes(samples: &mut Vec<BlockSample>, keywords: &str) {
    let filter = CodeFilter::parse(keywords);
    samples.retain(|sample| filter.matches(&sample.code));
}
