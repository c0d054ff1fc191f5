use serde::{Deserialize, Serialize};

/// Settings for [`crate::planner::plan_path`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Radius the block scan covered. Bounds the search effort.
    pub scan_radius: i32,
    /// Columns the escape check may expand from a drop landing.
    pub escape_search_budget: usize,
    /// Retry with 2-block drops when no reversible path exists.
    pub allow_drop_fallback: bool,
    /// For same-level moves, also require the flanking columns' body and
    /// head cells to be clear.
    pub footprint_clearance: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            scan_radius: 16,
            escape_search_budget: 64,
            allow_drop_fallback: true,
            footprint_clearance: true,
        }
    }
}

impl PlannerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scan_radius(mut self, radius: i32) -> Self {
        self.scan_radius = radius.max(0);
        self
    }

    pub fn with_escape_search_budget(mut self, budget: usize) -> Self {
        self.escape_search_budget = budget;
        self
    }

    pub fn with_drop_fallback(mut self, enabled: bool) -> Self {
        self.allow_drop_fallback = enabled;
        self
    }

    pub fn with_footprint_clearance(mut self, enabled: bool) -> Self {
        self.footprint_clearance = enabled;
        self
    }

    /// Upper bound on A* expansions for a model with `columns` surfaces.
    /// Each column can be expanded once per drop state.
    pub fn node_budget(&self, columns: usize) -> usize {
        let side = (self.scan_radius.max(0) as usize)
            .saturating_mul(2)
            .saturating_add(1);
        columns.max(side.saturating_mul(side)).saturating_mul(2)
    }
}

/// Settings for the visibility filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilityConfig {
    /// Added to the observer's y to get the ray origin.
    pub eye_height: f64,
    /// Keep liquid blocks in the surface-filtered output.
    pub include_liquids: bool,
    /// Blocks whose center is farther than this from the eye are dropped.
    pub max_distance: Option<f64>,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            eye_height: 1.5,
            include_liquids: true,
            max_distance: None,
        }
    }
}

impl VisibilityConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_eye_height(mut self, eye_height: f64) -> Self {
        self.eye_height = eye_height;
        self
    }

    pub fn with_liquids(mut self, include: bool) -> Self {
        self.include_liquids = include;
        self
    }

    pub fn with_max_distance(mut self, distance: f64) -> Self {
        self.max_distance = Some(distance);
        self
    }
}
