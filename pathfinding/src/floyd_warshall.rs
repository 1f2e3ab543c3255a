use containers::SparseSet;
use fxhash::FxHashMap;

use crate::error::{PathError, PathResult};
use crate::weight::Weight;

/// Dense all-pairs shortest path over unsigned integer weights.
///
/// Distances and first hops live in row-major `size * size` matrices that
/// only reallocate when the graph outgrows them; `clean` re-initializes the
/// active prefix so a solver can be reused across graph generations.
/// `W::INF` is the "no path" sentinel and all path sums saturate there.
///
/// Lifecycle: `new` → `resize(n)` → `clean` → `add_edge*` → `generate` →
/// queries, then `clean` again to start over.
pub struct FloydWarshall<W> {
    size: usize,
    dist: Vec<W>,
    next: Vec<u32>,
    id_to_index: FxHashMap<u32, u32>,
    index_to_id: SparseSet<u32, u32>,
}

impl<W: Weight> FloydWarshall<W> {
    pub fn new() -> Self {
        Self {
            size: 0,
            dist: Vec::new(),
            next: Vec::new(),
            id_to_index: FxHashMap::default(),
            index_to_id: SparseSet::new(0, 0),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Set the vertex count. Matrix storage grows on demand but is never
    /// shrunk; the entity mapping is rebuilt for the new size.
    pub fn resize(&mut self, size: usize) {
        self.size = size;
        self.id_to_index.clear();
        self.index_to_id = SparseSet::new(size, size);
    }

    /// Reset the matrices: zero diagonal, `INF` everywhere else, and
    /// `next[i][j] = j`. Clears the entity mapping.
    pub fn clean(&mut self) {
        let n = self.size;
        let cells = n * n;
        if self.dist.len() < cells {
            self.dist.resize(cells, W::INF);
            self.next.resize(cells, 0);
        }
        self.dist[..cells].fill(W::INF);
        for i in 0..n {
            self.dist[i * n + i] = W::ZERO;
            for j in 0..n {
                self.next[i * n + j] = j as u32;
            }
        }
        self.id_to_index.clear();
        self.index_to_id.clear();
    }

    /// Set the weight of edge `u -> v`. Out-of-range endpoints are ignored.
    pub fn add_edge(&mut self, u: usize, v: usize, weight: W) {
        if u >= self.size || v >= self.size {
            return;
        }
        self.dist[u * self.size + v] = weight;
    }

    /// Internal index for an entity id, allocating the next free index for
    /// ids seen for the first time.
    pub fn map_entity(&mut self, id: u32) -> PathResult<u32> {
        if let Some(index) = self.id_to_index.get(&id) {
            return Ok(*index);
        }
        let index = self.id_to_index.len();
        if index >= self.size {
            return Err(PathError::SizeOverflow { size: self.size });
        }
        let index = index as u32;
        self.id_to_index.insert(id, index);
        let _ = self.index_to_id.put(index, id);
        Ok(index)
    }

    pub fn add_edge_with_mapping(&mut self, from_id: u32, to_id: u32, weight: W) -> PathResult<()> {
        let u = self.map_entity(from_id)?;
        let v = self.map_entity(to_id)?;
        self.add_edge(u as usize, v as usize, weight);
        Ok(())
    }

    /// The triple loop. Rows with no connection through `k` are skipped on
    /// both sides before the inner loop runs; ties keep the existing hop.
    pub fn generate(&mut self) {
        let n = self.size;
        for k in 0..n {
            for i in 0..n {
                let dist_ik = self.dist[i * n + k];
                if dist_ik == W::INF {
                    continue;
                }
                let next_ik = self.next[i * n + k];
                for j in 0..n {
                    let dist_kj = self.dist[k * n + j];
                    if dist_kj == W::INF {
                        continue;
                    }
                    let candidate = dist_ik.saturating_add(dist_kj);
                    if candidate < self.dist[i * n + j] {
                        self.dist[i * n + j] = candidate;
                        self.next[i * n + j] = next_ik;
                    }
                }
            }
        }
    }

    /// Shortest distance, or None when out of range or unreachable.
    pub fn dist(&self, u: usize, v: usize) -> Option<W> {
        if u >= self.size || v >= self.size {
            return None;
        }
        let d = self.dist[u * self.size + v];
        if d == W::INF {
            None
        } else {
            Some(d)
        }
    }

    /// First hop of the shortest path `u -> v`, or None when unreachable.
    pub fn next_hop(&self, u: usize, v: usize) -> Option<u32> {
        self.dist(u, v)?;
        Some(self.next[u * self.size + v])
    }

    pub fn dist_with_mapping(&self, from_id: u32, to_id: u32) -> Option<W> {
        let u = *self.id_to_index.get(&from_id)?;
        let v = *self.id_to_index.get(&to_id)?;
        self.dist(u as usize, v as usize)
    }

    /// First hop as an entity id, through the O(1) reverse mapping.
    pub fn next_with_mapping(&self, from_id: u32, to_id: u32) -> Option<u32> {
        let u = *self.id_to_index.get(&from_id)?;
        let v = *self.id_to_index.get(&to_id)?;
        let hop = self.next_hop(u as usize, v as usize)?;
        self.index_to_id.get(hop).copied()
    }

    /// Append the inclusive index sequence `u, .., v` to `buf`. On failure
    /// `buf` is restored to its pre-call length.
    pub fn set_path(&self, buf: &mut Vec<u32>, u: usize, v: usize) -> PathResult<()> {
        let mark = buf.len();
        if self.dist(u, v).is_none() {
            return Err(PathError::PathNotFound {
                from: u as u32,
                to: v as u32,
            });
        }
        let mut current = u;
        buf.push(current as u32);
        while current != v {
            match self.next_hop(current, v) {
                Some(hop) => current = hop as usize,
                None => {
                    buf.truncate(mark);
                    return Err(PathError::PathNotFound {
                        from: u as u32,
                        to: v as u32,
                    });
                }
            }
            buf.push(current as u32);
        }
        Ok(())
    }

    /// Append the inclusive id sequence `from_id, .., to_id` to `buf`. On
    /// failure `buf` is restored to its pre-call length.
    pub fn set_path_with_mapping(
        &self,
        buf: &mut Vec<u32>,
        from_id: u32,
        to_id: u32,
    ) -> PathResult<()> {
        let mark = buf.len();
        let not_found = PathError::PathNotFound {
            from: from_id,
            to: to_id,
        };
        let (u, v) = match (self.id_to_index.get(&from_id), self.id_to_index.get(&to_id)) {
            (Some(u), Some(v)) => (*u as usize, *v as usize),
            _ => return Err(not_found),
        };
        if self.dist(u, v).is_none() {
            return Err(not_found);
        }
        buf.push(from_id);
        let mut current = u;
        while current != v {
            let hop = match self.next_hop(current, v) {
                Some(hop) => hop,
                None => {
                    buf.truncate(mark);
                    return Err(not_found);
                }
            };
            match self.index_to_id.get(hop) {
                Some(id) => {
                    buf.push(*id);
                    current = hop as usize;
                }
                None => {
                    buf.truncate(mark);
                    return Err(not_found);
                }
            }
        }
        Ok(())
    }
}

impl<W: Weight> Default for FloydWarshall<W> {
    fn default() -> Self {
        Self::new()
    }
}
