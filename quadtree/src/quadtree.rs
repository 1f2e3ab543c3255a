use std::hash::Hash;

use common::position::Position;
use common::shapes::{EntityPoint, Rectangle};
use fxhash::FxHashMap;
use smallvec::SmallVec;

/// Points stored inline per node before it subdivides.
pub const NODE_CAPACITY: usize = 4;

/// Padding added around the computed extrema when deriving root bounds.
pub const GUTTER: f32 = 120.0;

struct QuadNode<Id> {
    boundary: Rectangle,
    points: SmallVec<[EntityPoint<Id>; NODE_CAPACITY]>,
    divided: bool,
    nw: u32,
    ne: u32,
    sw: u32,
    se: u32,
}

impl<Id> QuadNode<Id> {
    fn new(boundary: Rectangle) -> Self {
        Self {
            boundary,
            points: SmallVec::new(),
            divided: false,
            nw: 0,
            ne: 0,
            sw: 0,
            se: 0,
        }
    }

    fn children(&self) -> [u32; 4] {
        [self.nw, self.ne, self.sw, self.se]
    }
}

/// Point quadtree over a flat node pool.
///
/// Nodes hold up to [`NODE_CAPACITY`] points inline and keep them when they
/// subdivide: a point stays at the highest node whose boundary accepted it,
/// so every query visits a node's own points before descending. Children are
/// u32 indices into the pool; `divided` only ever goes from false to true.
///
/// Boundary containment is half-open, which is what guarantees a point fits
/// exactly one child of a subdivided node.
pub struct QuadTree<Id> {
    nodes: Vec<QuadNode<Id>>,
    root: u32,
    owner_map: FxHashMap<Id, u32>,
    point_extrema: Option<Rectangle>,
}

impl<Id: Copy + Eq + Hash> QuadTree<Id> {
    pub fn new(bounds: Rectangle) -> Self {
        Self {
            nodes: vec![QuadNode::new(bounds)],
            root: 0,
            owner_map: FxHashMap::default(),
            point_extrema: None,
        }
    }

    pub fn boundary(&self) -> Rectangle {
        self.nodes[self.root as usize].boundary
    }

    /// Tight bounds of every point successfully inserted since the last
    /// reset, before the gutter is applied.
    pub fn point_extrema(&self) -> Option<Rectangle> {
        self.point_extrema
    }

    /// Drop all points and children but keep the node pool allocation.
    pub fn clear(&mut self) {
        let boundary = self.nodes[self.root as usize].boundary;
        self.nodes.truncate(1);
        self.nodes[self.root as usize] = QuadNode::new(boundary);
        self.owner_map.clear();
        self.point_extrema = None;
    }

    /// Clear and rebuild the root boundary as the positions' bounding box
    /// inflated by [`GUTTER`] on every side. An empty slice yields a
    /// gutter-sized square around the origin.
    pub fn reset_with_boundaries(&mut self, positions: &[Position]) {
        let mut min_x = f32::MAX;
        let mut min_y = f32::MAX;
        let mut max_x = f32::MIN;
        let mut max_y = f32::MIN;
        for p in positions {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        if positions.is_empty() {
            min_x = 0.0;
            min_y = 0.0;
            max_x = 0.0;
            max_y = 0.0;
        }
        let boundary = Rectangle::from_extents(
            min_x - GUTTER,
            min_y - GUTTER,
            max_x + GUTTER,
            max_y + GUTTER,
        );
        self.nodes.truncate(1);
        self.nodes[self.root as usize] = QuadNode::new(boundary);
        self.owner_map.clear();
        self.point_extrema = None;
    }

    /// Insert a point. Returns false (and changes nothing) when the point
    /// lies outside the root boundary. Reinserting a live id relocates it.
    pub fn insert(&mut self, id: Id, position: Position) -> bool {
        if !self.nodes[self.root as usize].boundary.contains(&position) {
            return false;
        }
        if self.owner_map.contains_key(&id) {
            self.remove(id);
        }
        let point_rect = Rectangle::new(position.x, position.y, 0.0, 0.0);
        match &mut self.point_extrema {
            Some(extrema) => extrema.expand_to_include(&point_rect),
            None => self.point_extrema = Some(point_rect),
        }
        let node = self.insert_into(self.root, EntityPoint::new(id, position));
        self.owner_map.insert(id, node);
        true
    }

    fn insert_into(&mut self, mut node: u32, point: EntityPoint<Id>) -> u32 {
        loop {
            let node_ref = &self.nodes[node as usize];
            if !node_ref.divided && node_ref.points.len() < NODE_CAPACITY {
                self.nodes[node as usize].points.push(point);
                return node;
            }

            if !node_ref.divided {
                self.subdivide(node);
            }

            // Half-open containment puts the point in exactly one child;
            // first match wins. Existing points are never pushed down.
            let mut destination = None;
            for child in self.nodes[node as usize].children() {
                if self.nodes[child as usize].boundary.contains(&point.position) {
                    destination = Some(child);
                    break;
                }
            }
            match destination {
                Some(child) => node = child,
                None => {
                    self.nodes[node as usize].points.push(point);
                    return node;
                }
            }
        }
    }

    fn subdivide(&mut self, node: u32) {
        let boundary = self.nodes[node as usize].boundary;
        let left = boundary.left();
        let right = boundary.right();
        let top = boundary.top();
        let bottom = boundary.bottom();
        let mid_x = left + boundary.width * 0.5;
        let mid_y = top + boundary.height * 0.5;

        // Children share the parent's exact edges so the 2x2 tiling covers
        // the parent's half-open region with no seam.
        let nw = self.alloc_node(Rectangle::from_extents(left, top, mid_x, mid_y));
        let ne = self.alloc_node(Rectangle::from_extents(mid_x, top, right, mid_y));
        let sw = self.alloc_node(Rectangle::from_extents(left, mid_y, mid_x, bottom));
        let se = self.alloc_node(Rectangle::from_extents(mid_x, mid_y, right, bottom));

        let node_ref = &mut self.nodes[node as usize];
        node_ref.nw = nw;
        node_ref.ne = ne;
        node_ref.sw = sw;
        node_ref.se = se;
        node_ref.divided = true;
    }

    fn alloc_node(&mut self, boundary: Rectangle) -> u32 {
        self.nodes.push(QuadNode::new(boundary));
        (self.nodes.len() - 1) as u32
    }

    /// Remove a point by id. O(1) via the owner map plus a scan of one
    /// node's inline points.
    pub fn remove(&mut self, id: Id) -> bool {
        let node = match self.owner_map.remove(&id) {
            Some(node) => node,
            None => return false,
        };
        let points = &mut self.nodes[node as usize].points;
        match points.iter().position(|p| p.id == id) {
            Some(index) => {
                points.swap_remove(index);
                true
            }
            None => false,
        }
    }

    /// Move a point. Fails without mutating when the id is absent or the
    /// new position lies outside the root boundary.
    pub fn update(&mut self, id: Id, new_position: Position) -> bool {
        if !self.owner_map.contains_key(&id) {
            return false;
        }
        if !self.nodes[self.root as usize]
            .boundary
            .contains(&new_position)
        {
            return false;
        }
        self.remove(id);
        self.insert(id, new_position)
    }

    /// Append every point contained in `range`, parents before children,
    /// NW NE SW SE among siblings.
    pub fn query_rect(&self, range: &Rectangle, out: &mut Vec<EntityPoint<Id>>) {
        let mut stack: SmallVec<[u32; 64]> = SmallVec::new();
        stack.push(self.root);
        while let Some(node) = stack.pop() {
            let node_ref = &self.nodes[node as usize];
            if !node_ref.boundary.intersects(range) {
                continue;
            }
            for point in &node_ref.points {
                if range.contains(&point.position) {
                    out.push(*point);
                }
            }
            if node_ref.divided {
                // Reversed so NW pops first.
                stack.push(node_ref.se);
                stack.push(node_ref.sw);
                stack.push(node_ref.ne);
                stack.push(node_ref.nw);
            }
        }
    }

    /// Rect query over the circle's enclosing square, rejecting per point
    /// on squared distance.
    pub fn query_radius(&self, center: Position, radius: f32, out: &mut Vec<EntityPoint<Id>>) {
        let square = Rectangle::from_extents(
            center.x - radius,
            center.y - radius,
            center.x + radius,
            center.y + radius,
        );
        let radius_sq = radius * radius;
        let mut stack: SmallVec<[u32; 64]> = SmallVec::new();
        stack.push(self.root);
        while let Some(node) = stack.pop() {
            let node_ref = &self.nodes[node as usize];
            if !node_ref.boundary.intersects(&square) {
                continue;
            }
            for point in &node_ref.points {
                if square.contains(&point.position)
                    && point.position.distance_squared(&center) <= radius_sq
                {
                    out.push(*point);
                }
            }
            if node_ref.divided {
                stack.push(node_ref.se);
                stack.push(node_ref.sw);
                stack.push(node_ref.ne);
                stack.push(node_ref.nw);
            }
        }
    }

    /// Nearest point within `max_distance` of `pos`, or None. Subtrees are
    /// pruned on the clamped squared distance from `pos` to their boundary.
    pub fn query_nearest(&self, pos: Position, max_distance: f32) -> Option<EntityPoint<Id>> {
        let mut best = None;
        let mut best_dist_sq = max_distance * max_distance;
        self.nearest_into(self.root, pos, &mut best, &mut best_dist_sq);
        best
    }

    fn nearest_into(
        &self,
        node: u32,
        pos: Position,
        best: &mut Option<EntityPoint<Id>>,
        best_dist_sq: &mut f32,
    ) {
        let node_ref = &self.nodes[node as usize];
        for point in &node_ref.points {
            let dist_sq = point.position.distance_squared(&pos);
            if dist_sq < *best_dist_sq || (dist_sq == *best_dist_sq && best.is_none()) {
                *best = Some(*point);
                *best_dist_sq = dist_sq;
            }
        }
        if node_ref.divided {
            for child in node_ref.children() {
                let child_boundary = self.nodes[child as usize].boundary;
                if child_boundary.distance_sq_to_point(pos.x, pos.y) < *best_dist_sq {
                    self.nearest_into(child, pos, best, best_dist_sq);
                }
            }
        }
    }

    /// Short-circuiting variant of `query_rect`.
    pub fn has_point_in_rect(&self, range: &Rectangle) -> bool {
        let mut stack: SmallVec<[u32; 64]> = SmallVec::new();
        stack.push(self.root);
        while let Some(node) = stack.pop() {
            let node_ref = &self.nodes[node as usize];
            if !node_ref.boundary.intersects(range) {
                continue;
            }
            if node_ref
                .points
                .iter()
                .any(|point| range.contains(&point.position))
            {
                return true;
            }
            if node_ref.divided {
                stack.push(node_ref.se);
                stack.push(node_ref.sw);
                stack.push(node_ref.ne);
                stack.push(node_ref.nw);
            }
        }
        false
    }

    /// Full traversal; the tree keeps no cached length.
    pub fn count(&self) -> usize {
        let mut count = 0;
        let mut stack: SmallVec<[u32; 64]> = SmallVec::new();
        stack.push(self.root);
        while let Some(node) = stack.pop() {
            let node_ref = &self.nodes[node as usize];
            count += node_ref.points.len();
            if node_ref.divided {
                for child in node_ref.children() {
                    stack.push(child);
                }
            }
        }
        count
    }

    pub fn all_node_boundaries(&self, boundaries: &mut Vec<Rectangle>) {
        let mut stack: SmallVec<[u32; 64]> = SmallVec::new();
        stack.push(self.root);
        while let Some(node) = stack.pop() {
            let node_ref = &self.nodes[node as usize];
            boundaries.push(node_ref.boundary);
            if node_ref.divided {
                stack.push(node_ref.se);
                stack.push(node_ref.sw);
                stack.push(node_ref.ne);
                stack.push(node_ref.nw);
            }
        }
    }

    pub fn all_points(&self, points: &mut Vec<EntityPoint<Id>>) {
        let mut stack: SmallVec<[u32; 64]> = SmallVec::new();
        stack.push(self.root);
        while let Some(node) = stack.pop() {
            let node_ref = &self.nodes[node as usize];
            points.extend_from_slice(&node_ref.points);
            if node_ref.divided {
                stack.push(node_ref.se);
                stack.push(node_ref.sw);
                stack.push(node_ref.ne);
                stack.push(node_ref.nw);
            }
        }
    }
}
