use common::position::Position;
use common::shapes::{Aabb, CollisionPair};

struct Entry<Id> {
    id: Id,
    aabb: Aabb,
}

/// Sweep-and-prune broad phase over axis-aligned boxes.
///
/// Entities live in an unordered array; `find_collisions` sorts an index
/// scratch buffer by min-x each call and sweeps it, so membership updates
/// stay O(n) and pair discovery is O(n log n + k). Overlap is the strict
/// AABB test: boxes that merely touch are not a collision.
pub struct SweepAndPrune<Id> {
    entities: Vec<Entry<Id>>,
    sorted_indices: Vec<u32>,
}

impl<Id: Copy + Eq + Ord> SweepAndPrune<Id> {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            sorted_indices: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entities: Vec::with_capacity(capacity),
            sorted_indices: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn add(&mut self, id: Id, center: Position, half_width: f32, half_height: f32) {
        self.entities.push(Entry {
            id,
            aabb: Aabb::new(center, half_width, half_height),
        });
    }

    pub fn remove(&mut self, id: Id) -> bool {
        match self.entities.iter().position(|e| e.id == id) {
            Some(index) => {
                self.entities.swap_remove(index);
                true
            }
            None => false,
        }
    }

    pub fn update_position(&mut self, id: Id, center: Position) -> bool {
        match self.entities.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                entry.aabb.center = center;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.entities.clear();
    }

    /// Append every overlapping pair, canonical (min, max) id order per
    /// pair, in sweep order. The sweep visits entities by ascending min-x
    /// and stops scanning a candidate run as soon as the next min-x reaches
    /// the current max-x, so no pair is produced twice.
    pub fn find_collisions(&mut self, out: &mut Vec<CollisionPair<Id>>) {
        let count = self.entities.len();
        self.sorted_indices.clear();
        self.sorted_indices.extend(0..count as u32);
        let entities = &self.entities;
        self.sorted_indices
            .sort_unstable_by(|&a, &b| {
                entities[a as usize]
                    .aabb
                    .min_x()
                    .total_cmp(&entities[b as usize].aabb.min_x())
            });

        for i in 0..count {
            let a = &self.entities[self.sorted_indices[i] as usize];
            let a_max_x = a.aabb.max_x();
            for j in (i + 1)..count {
                let b = &self.entities[self.sorted_indices[j] as usize];
                if b.aabb.min_x() >= a_max_x {
                    break;
                }
                if a.aabb.overlaps(&b.aabb) {
                    out.push(CollisionPair::new(a.id, b.id));
                }
            }
        }
    }

    /// Ids of entities whose boxes overlap the query box.
    pub fn query_rect(
        &self,
        center: Position,
        half_width: f32,
        half_height: f32,
        out: &mut Vec<Id>,
    ) {
        let query = Aabb::new(center, half_width, half_height);
        for entry in &self.entities {
            if entry.aabb.overlaps(&query) {
                out.push(entry.id);
            }
        }
    }

    /// Ids of entities whose boxes come within `radius` of `center`:
    /// a rough AABB reject, then the clamped squared distance.
    pub fn query_radius(&self, center: Position, radius: f32, out: &mut Vec<Id>) {
        let query = Aabb::new(center, radius, radius);
        let radius_sq = radius * radius;
        for entry in &self.entities {
            if !entry.aabb.overlaps(&query) {
                continue;
            }
            if entry.aabb.distance_sq_to_point(center.x, center.y) <= radius_sq {
                out.push(entry.id);
            }
        }
    }
}

impl<Id: Copy + Eq + Ord> Default for SweepAndPrune<Id> {
    fn default() -> Self {
        Self::new()
    }
}
