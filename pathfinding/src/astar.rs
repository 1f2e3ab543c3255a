use std::cmp::Ordering;
use std::collections::BinaryHeap;

use common::position::Position;
use containers::{ContainerResult, SparseSet};
use fxhash::FxHashMap;

use crate::error::{PathError, PathResult};
use crate::heuristic::{Heuristic, HeuristicFn};
use crate::weight::Weight;

/// Sentinel parent index for nodes the search has not reached.
pub const NO_PARENT: u32 = u32::MAX;

/// Min-heap entry ordered by f-score.
struct OpenEntry {
    f_score: f32,
    node: u32,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so the BinaryHeap pops the smallest f-score first.
        other
            .f_score
            .total_cmp(&self.f_score)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Single-source shortest path with a pluggable heuristic over a fixed
/// vertex count.
///
/// The search keeps explicit per-node arrays (g-score, parent, closed
/// bitset) instead of hash maps and never re-opens a closed node, so an
/// inadmissible heuristic trades optimality for speed. Node positions feed
/// the built-in heuristics; a node without a position estimates 0.
pub struct AStar<W> {
    adjacency: Vec<Vec<(u32, W)>>,
    positions: SparseSet<u32, Position>,
    heuristic: Heuristic,
    custom_heuristic: Option<HeuristicFn>,
    id_to_index: FxHashMap<u32, u32>,
    index_to_id: SparseSet<u32, u32>,
}

impl<W: Weight> AStar<W> {
    pub fn new(size: usize) -> Self {
        let mut adjacency = Vec::with_capacity(size);
        adjacency.resize_with(size, Vec::new);
        Self {
            adjacency,
            positions: SparseSet::new(size, size),
            heuristic: Heuristic::default(),
            custom_heuristic: None,
            id_to_index: FxHashMap::default(),
            index_to_id: SparseSet::new(size, size),
        }
    }

    pub fn size(&self) -> usize {
        self.adjacency.len()
    }

    /// Select a built-in heuristic, dropping any custom function.
    pub fn set_heuristic(&mut self, heuristic: Heuristic) {
        self.heuristic = heuristic;
        self.custom_heuristic = None;
    }

    /// A custom estimator overrides the built-in selection until
    /// `set_heuristic` is called again.
    pub fn set_custom_heuristic(&mut self, heuristic: HeuristicFn) {
        self.custom_heuristic = Some(heuristic);
    }

    /// Add the directed edge `from -> to`. Out-of-range endpoints are
    /// ignored.
    pub fn add_edge(&mut self, from: u32, to: u32, weight: W) {
        let size = self.adjacency.len();
        if (from as usize) >= size || (to as usize) >= size {
            return;
        }
        self.adjacency[from as usize].push((to, weight));
    }

    pub fn set_position(&mut self, node: u32, position: Position) -> ContainerResult<()> {
        self.positions.put(node, position)
    }

    /// Internal index for an entity id, allocating the next free index for
    /// ids seen for the first time.
    pub fn map_entity(&mut self, id: u32) -> PathResult<u32> {
        if let Some(index) = self.id_to_index.get(&id) {
            return Ok(*index);
        }
        let index = self.id_to_index.len();
        if index >= self.adjacency.len() {
            return Err(PathError::SizeOverflow {
                size: self.adjacency.len(),
            });
        }
        let index = index as u32;
        self.id_to_index.insert(id, index);
        let _ = self.index_to_id.put(index, id);
        Ok(index)
    }

    pub fn add_edge_with_mapping(&mut self, from_id: u32, to_id: u32, weight: W) -> PathResult<()> {
        let from = self.map_entity(from_id)?;
        let to = self.map_entity(to_id)?;
        self.add_edge(from, to, weight);
        Ok(())
    }

    /// Store a position under the entity's internal index.
    pub fn set_position_with_mapping(&mut self, id: u32, position: Position) -> PathResult<()> {
        let index = self.map_entity(id)?;
        let _ = self.positions.put(index, position);
        Ok(())
    }

    fn estimate(&self, from: u32, to: u32) -> f32 {
        let (a, b) = match (self.positions.get(from), self.positions.get(to)) {
            (Some(a), Some(b)) => (*a, *b),
            _ => return 0.0,
        };
        match self.custom_heuristic {
            Some(heuristic) => heuristic(a, b),
            None => self.heuristic.evaluate(a, b),
        }
    }

    /// Search for the cheapest path `source -> dest`. On success the
    /// inclusive node sequence is written to `out_path` and the total cost
    /// returned; otherwise `out_path` is left empty.
    pub fn find_path(&self, source: u32, dest: u32, out_path: &mut Vec<u32>) -> Option<W> {
        out_path.clear();
        let size = self.adjacency.len();
        if (source as usize) >= size || (dest as usize) >= size {
            return None;
        }
        if source == dest {
            out_path.push(source);
            return Some(W::ZERO);
        }

        let mut g_score = vec![W::INF; size];
        let mut came_from = vec![NO_PARENT; size];
        let mut closed = vec![0u64; (size + 63) / 64];
        let mut open = BinaryHeap::new();

        g_score[source as usize] = W::ZERO;
        open.push(OpenEntry {
            f_score: self.estimate(source, dest),
            node: source,
        });

        while let Some(OpenEntry { node, .. }) = open.pop() {
            if node == dest {
                let mut current = dest;
                while current != NO_PARENT {
                    out_path.push(current);
                    current = came_from[current as usize];
                }
                out_path.reverse();
                return Some(g_score[dest as usize]);
            }
            let word = (node / 64) as usize;
            let bit = 1u64 << (node % 64);
            if closed[word] & bit != 0 {
                continue;
            }
            closed[word] |= bit;

            for &(neighbor, weight) in &self.adjacency[node as usize] {
                if closed[(neighbor / 64) as usize] & (1u64 << (neighbor % 64)) != 0 {
                    continue;
                }
                let tentative = g_score[node as usize].saturating_add(weight);
                if tentative < g_score[neighbor as usize] {
                    came_from[neighbor as usize] = node;
                    g_score[neighbor as usize] = tentative;
                    open.push(OpenEntry {
                        f_score: tentative.to_f32() + self.estimate(neighbor, dest),
                        node: neighbor,
                    });
                }
            }
        }
        None
    }

    /// `find_path` in entity-id space; both endpoints must have been mapped.
    pub fn find_path_with_mapping(
        &self,
        source_id: u32,
        dest_id: u32,
        out_path: &mut Vec<u32>,
    ) -> Option<W> {
        out_path.clear();
        let source = *self.id_to_index.get(&source_id)?;
        let dest = *self.id_to_index.get(&dest_id)?;
        let cost = self.find_path(source, dest, out_path)?;
        for i in 0..out_path.len() {
            match self.index_to_id.get(out_path[i]) {
                Some(id) => out_path[i] = *id,
                None => {
                    out_path.clear();
                    return None;
                }
            }
        }
        Some(cost)
    }
}
