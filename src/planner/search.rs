//! A* over the column graph, plus the bounded searches that support it.

use super::moves::{BlockedBy, Direction, MoveMode, MoveRules, Step, StepKind};
use crate::error::BlockedDirection;
use crate::types::Column;
use rustc_hash::{FxHashMap, FxHashSet};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};
use tracing::trace;

/// Search state: a column, and whether the path has spent its one
/// irreversible drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Node {
    column: Column,
    dropped: bool,
}

#[derive(Debug, Clone, Copy)]
struct OpenEntry {
    f: f64,
    g: f64,
    seq: u64,
    node: Node,
    surface: i32,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    // BinaryHeap is a max-heap: lowest f first, then earliest insertion.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

fn manhattan(a: Column, b: Column) -> f64 {
    ((a.0 - b.0).abs() + (a.1 - b.1).abs()) as f64
}

/// One planning request's search context. Escape-check verdicts are cached
/// per landing column for the lifetime of the request.
pub(crate) struct Search<'a> {
    rules: MoveRules<'a>,
    node_budget: usize,
    escape_budget: usize,
    escape_cache: FxHashMap<Column, bool>,
}

impl<'a> Search<'a> {
    pub(crate) fn new(rules: MoveRules<'a>, node_budget: usize, escape_budget: usize) -> Self {
        Search {
            rules,
            node_budget,
            escape_budget,
            escape_cache: FxHashMap::default(),
        }
    }

    /// Moves out of a node. In fallback mode a 2-block drop is offered only
    /// if the path has not dropped yet and the landing can be escaped.
    fn expand(&mut self, node: Node, surface: i32, mode: MoveMode) -> Vec<(Step, Node)> {
        let steps: Vec<Step> = self.rules.successors(node.column, surface, mode).collect();
        let mut out = Vec::with_capacity(steps.len());
        for step in steps {
            let dropped = if step.kind.is_reversible() {
                node.dropped
            } else if node.dropped || !self.has_escape(step.to, step.surface) {
                continue;
            } else {
                true
            };
            out.push((
                step,
                Node {
                    column: step.to,
                    dropped,
                },
            ));
        }
        out
    }

    /// A* from `start` to `goal`. Returns `(column, surface)` pairs from start
    /// to goal inclusive, or `None` when the goal is unreachable within the
    /// node budget.
    pub(crate) fn astar(
        &mut self,
        start: (Column, i32),
        goal: Column,
        mode: MoveMode,
    ) -> Option<Vec<(Column, i32)>> {
        let start_node = Node {
            column: start.0,
            dropped: false,
        };

        let mut open = BinaryHeap::new();
        let mut g_score: FxHashMap<Node, f64> = FxHashMap::default();
        let mut came_from: FxHashMap<Node, (Node, i32)> = FxHashMap::default();
        let mut seq = 0u64;

        g_score.insert(start_node, 0.0);
        open.push(OpenEntry {
            f: manhattan(start.0, goal),
            g: 0.0,
            seq,
            node: start_node,
            surface: start.1,
        });

        let mut expanded = 0usize;
        while let Some(entry) = open.pop() {
            let best = g_score.get(&entry.node).copied().unwrap_or(f64::INFINITY);
            if entry.g > best {
                continue;
            }

            if entry.node.column == goal {
                trace!(expanded, ?mode, "goal reached");
                return Some(reconstruct(entry.node, entry.surface, &came_from));
            }

            expanded += 1;
            if expanded > self.node_budget {
                trace!(expanded, ?mode, "node budget exhausted");
                return None;
            }

            for (step, next) in self.expand(entry.node, entry.surface, mode) {
                let tentative = entry.g + step.cost();
                let known = g_score.get(&next).copied().unwrap_or(f64::INFINITY);
                if tentative < known {
                    g_score.insert(next, tentative);
                    came_from.insert(next, (entry.node, entry.surface));
                    seq += 1;
                    open.push(OpenEntry {
                        f: tentative + manhattan(step.to, goal),
                        g: tentative,
                        seq,
                        node: next,
                        surface: step.surface,
                    });
                }
            }
        }

        None
    }

    /// Whether a drop landing connects, through reversible moves, to any
    /// column higher than the landing itself.
    pub(crate) fn has_escape(&mut self, landing: Column, surface: i32) -> bool {
        if let Some(&cached) = self.escape_cache.get(&landing) {
            return cached;
        }

        let mut visited: FxHashSet<Column> = FxHashSet::default();
        let mut queue = VecDeque::new();
        visited.insert(landing);
        queue.push_back((landing, surface));

        let mut expanded = 0usize;
        let mut escaped = false;
        'bfs: while let Some((column, y)) = queue.pop_front() {
            if expanded >= self.escape_budget {
                break;
            }
            expanded += 1;
            for step in self.rules.successors(column, y, MoveMode::Reversible) {
                if step.surface > surface {
                    escaped = true;
                    break 'bfs;
                }
                if visited.insert(step.to) {
                    queue.push_back((step.to, step.surface));
                }
            }
        }

        trace!(?landing, surface, expanded, escaped, "escape check");
        self.escape_cache.insert(landing, escaped);
        escaped
    }

    /// Columns reachable from `start`, in breadth-first order.
    pub(crate) fn reachable(&mut self, start: (Column, i32), mode: MoveMode) -> Vec<Column> {
        let start_node = Node {
            column: start.0,
            dropped: false,
        };
        let mut seen_nodes: FxHashSet<Node> = FxHashSet::default();
        let mut seen_columns: FxHashSet<Column> = FxHashSet::default();
        let mut order = Vec::new();
        let mut queue = VecDeque::new();

        seen_nodes.insert(start_node);
        seen_columns.insert(start.0);
        order.push(start.0);
        queue.push_back((start_node, start.1));

        let mut expanded = 0usize;
        while let Some((node, surface)) = queue.pop_front() {
            expanded += 1;
            if expanded > self.node_budget {
                break;
            }
            for (step, next) in self.expand(node, surface, mode) {
                if seen_nodes.insert(next) {
                    if seen_columns.insert(next.column) {
                        order.push(next.column);
                    }
                    queue.push_back((next, step.surface));
                }
            }
        }

        order
    }

    /// Which rule blocks each move out of `start`, in [`Direction::ALL`] order.
    /// Open directions are left out.
    pub(crate) fn diagnose(&mut self, start: (Column, i32), mode: MoveMode) -> Vec<BlockedDirection> {
        let mut blocked = Vec::new();
        for direction in Direction::ALL {
            let reason = match self.rules.evaluate(start.0, start.1, direction, mode) {
                Err(reason) => Some(reason),
                Ok(step) if step.kind == StepKind::FallbackDrop => {
                    if self.has_escape(step.to, step.surface) {
                        None
                    } else {
                        Some(BlockedBy::NoEscape)
                    }
                }
                Ok(_) => None,
            };
            if let Some(reason) = reason {
                blocked.push(BlockedDirection { direction, reason });
            }
        }
        blocked
    }
}

fn reconstruct(
    goal: Node,
    goal_surface: i32,
    came_from: &FxHashMap<Node, (Node, i32)>,
) -> Vec<(Column, i32)> {
    let mut path = vec![(goal.column, goal_surface)];
    let mut current = goal;
    while let Some(&(prev, surface)) = came_from.get(&current) {
        path.push((prev.column, surface));
        current = prev;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockSample;
    use crate::terrain::TerrainModel;

    fn platform(blocks: &mut Vec<BlockSample>, xs: std::ops::RangeInclusive<i32>, zs: std::ops::RangeInclusive<i32>, y: i32) {
        for x in xs {
            for z in zs.clone() {
                blocks.push(BlockSample::solid((x, y, z), "game:soil"));
            }
        }
    }

    #[test]
    fn test_heap_orders_by_f_then_insertion() {
        let node = Node {
            column: (0, 0),
            dropped: false,
        };
        let mut heap = BinaryHeap::new();
        for (f, seq) in [(3.0, 0), (2.0, 1), (2.0, 2), (5.0, 3)] {
            heap.push(OpenEntry {
                f,
                g: 0.0,
                seq,
                node,
                surface: 0,
            });
        }
        let order: Vec<u64> = std::iter::from_fn(|| heap.pop().map(|e| e.seq)).collect();
        assert_eq!(order, vec![1, 2, 0, 3]);
    }

    #[test]
    fn test_astar_straight_line() {
        let mut blocks = Vec::new();
        platform(&mut blocks, -3..=3, -3..=3, 100);
        let terrain = TerrainModel::build(&blocks, None);
        let mut search = Search::new(MoveRules::new(&terrain, true), 1000, 64);

        let path = search
            .astar(((0, 0), 100), (3, 0), MoveMode::Reversible)
            .unwrap();
        let columns: Vec<Column> = path.iter().map(|p| p.0).collect();
        assert_eq!(columns, vec![(0, 0), (1, 0), (2, 0), (3, 0)]);
    }

    #[test]
    fn test_escape_check() {
        let mut blocks = Vec::new();
        // closed pit floor at 98
        platform(&mut blocks, 0..=2, 0..=2, 98);
        let terrain = TerrainModel::build(&blocks, None);
        let mut search = Search::new(MoveRules::new(&terrain, false), 1000, 64);
        assert!(!search.has_escape((1, 1), 98));

        // add a stair back up at one edge
        blocks.push(BlockSample::solid((2, 99, 2), "game:soil"));
        let terrain = TerrainModel::build(&blocks, None);
        let mut search = Search::new(MoveRules::new(&terrain, false), 1000, 64);
        assert!(search.has_escape((0, 0), 98));
    }

    #[test]
    fn test_escape_budget_limits_search() {
        let mut blocks = Vec::new();
        // long corridor with the only exit at the far end
        platform(&mut blocks, 0..=20, 0..=0, 98);
        blocks.push(BlockSample::solid((20, 99, 0), "game:soil"));
        let terrain = TerrainModel::build(&blocks, None);

        let mut generous = Search::new(MoveRules::new(&terrain, false), 1000, 64);
        assert!(generous.has_escape((0, 0), 98));
        let mut stingy = Search::new(MoveRules::new(&terrain, false), 1000, 5);
        assert!(!stingy.has_escape((0, 0), 98));
    }

    #[test]
    fn test_reachable_is_breadth_first() {
        let mut blocks = Vec::new();
        platform(&mut blocks, 0..=2, 0..=0, 100);
        platform(&mut blocks, 5..=6, 0..=0, 100);
        let terrain = TerrainModel::build(&blocks, None);
        let mut search = Search::new(MoveRules::new(&terrain, false), 1000, 64);
        let reach = search.reachable(((0, 0), 100), MoveMode::Reversible);
        assert_eq!(reach, vec![(0, 0), (1, 0), (2, 0)]);
    }
}
