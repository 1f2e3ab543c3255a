use std::sync::atomic::{AtomicU32, Ordering};
use std::thread;

use containers::SparseSet;
use fxhash::FxHashMap;

use crate::error::{PathError, PathResult};

/// "No path" sentinel of the optimized solver's u32 weights.
pub const INF: u32 = u32::MAX;

/// Vertex count above which the parallel path is worth its thread setup.
const PARALLEL_THRESHOLD: usize = 64;

/// Spin iterations between scheduler yields while waiting on a row barrier.
const SPIN_BURST: u32 = 100;

/// Solver strategy. Compile-time in spirit: pick once at construction,
/// `generate` branches on it.
#[derive(Debug, Clone, Copy)]
pub struct SolveConfig {
    pub parallel: bool,
    pub simd: bool,
}

impl Default for SolveConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            simd: true,
        }
    }
}

/// All-pairs shortest path over u32 weights with a vectorized inner loop
/// and an optional row-parallel solve.
///
/// Matrices, entity mapping, queries and path reconstruction behave exactly
/// like [`crate::FloydWarshall`]; all three `generate` strategies produce
/// identical `dist` and `next` matrices because every path keeps the
/// existing entry on ties.
pub struct FloydWarshallOptimized {
    size: usize,
    dist: Vec<u32>,
    next: Vec<u32>,
    config: SolveConfig,
    id_to_index: FxHashMap<u32, u32>,
    index_to_id: SparseSet<u32, u32>,
}

impl FloydWarshallOptimized {
    pub fn new() -> Self {
        Self::with_config(SolveConfig::default())
    }

    pub fn with_config(config: SolveConfig) -> Self {
        Self {
            size: 0,
            dist: Vec::new(),
            next: Vec::new(),
            config,
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
            self.dist.resize(cells, INF);
            self.next.resize(cells, 0);
        }
        self.dist[..cells].fill(INF);
        for i in 0..n {
            self.dist[i * n + i] = 0;
            for j in 0..n {
                self.next[i * n + j] = j as u32;
            }
        }
        self.id_to_index.clear();
        self.index_to_id.clear();
    }

    /// Set the weight of edge `u -> v`. Out-of-range endpoints are ignored.
    pub fn add_edge(&mut self, u: usize, v: usize, weight: u32) {
        if u >= self.size || v >= self.size {
            return;
        }
        self.dist[u * self.size + v] = weight;
    }

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

    pub fn add_edge_with_mapping(&mut self, from_id: u32, to_id: u32, weight: u32) -> PathResult<()> {
        let u = self.map_entity(from_id)?;
        let v = self.map_entity(to_id)?;
        self.add_edge(u as usize, v as usize, weight);
        Ok(())
    }

    pub fn generate(&mut self) {
        if self.size == 0 {
            return;
        }
        if self.size > PARALLEL_THRESHOLD && self.config.parallel {
            self.generate_parallel();
        } else if self.config.simd {
            self.generate_simd();
        } else {
            self.generate_scalar();
        }
    }

    fn generate_scalar(&mut self) {
        let n = self.size;
        for k in 0..n {
            for i in 0..n {
                let dist_ik = self.dist[i * n + k];
                if dist_ik == INF {
                    continue;
                }
                let next_ik = self.next[i * n + k];
                for j in 0..n {
                    let dist_kj = self.dist[k * n + j];
                    if dist_kj == INF {
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

    fn generate_simd(&mut self) {
        let n = self.size;
        let dist = self.dist.as_mut_ptr();
        let next = self.next.as_mut_ptr();
        for k in 0..n {
            for i in 0..n {
                // Relaxing a row through itself can never improve it.
                if i == k {
                    continue;
                }
                // Safety: rows i and k are disjoint (i != k) and both live
                // inside the `n * n` prefix of the matrices.
                unsafe {
                    let dist_ik = *dist.add(i * n + k);
                    if dist_ik == INF {
                        continue;
                    }
                    let next_ik = *next.add(i * n + k);
                    relax_row(
                        dist.add(i * n),
                        next.add(i * n),
                        dist.add(k * n) as *const u32,
                        dist_ik,
                        next_ik,
                        n,
                    );
                }
            }
        }
    }

    fn generate_parallel(&mut self) {
        let n = self.size;
        let threads = thread::available_parallelism()
            .map(|count| count.get())
            .unwrap_or(1)
            .min(n);
        if threads <= 1 {
            return self.generate_simd();
        }

        // counter[k] reaching `threads` opens step k: every thread adds 1
        // to counter[k + 1] once its rows for step k are done.
        let mut counters = Vec::with_capacity(n + 1);
        counters.resize_with(n + 1, || AtomicU32::new(0));
        counters[0].store(threads as u32, Ordering::Release);
        let gate = StartGate::new();

        let view = MatrixView {
            dist: self.dist.as_mut_ptr(),
            next: self.next.as_mut_ptr(),
        };

        let rows_base = n / threads;
        let rows_extra = n % threads;

        let spawned = thread::scope(|scope| {
            let mut row_start = 0usize;
            for worker in 0..threads {
                let rows = rows_base + usize::from(worker < rows_extra);
                let range = row_start..row_start + rows;
                row_start += rows;
                let counters = &counters;
                let gate = &gate;
                let view = &view;
                let spawn = thread::Builder::new()
                    .name(format!("floyd-warshall-{worker}"))
                    .spawn_scoped(scope, move || {
                        solve_rows(view, counters, gate, range, threads as u32, n)
                    });
                if spawn.is_err() {
                    // Workers already running exit at the gate without
                    // having touched the matrices.
                    gate.abort();
                    return false;
                }
            }
            gate.open();
            true
        });

        if !spawned {
            self.generate_simd();
        }
    }

    /// Shortest distance, or None when out of range or unreachable.
    pub fn dist(&self, u: usize, v: usize) -> Option<u32> {
        if u >= self.size || v >= self.size {
            return None;
        }
        let d = self.dist[u * self.size + v];
        if d == INF {
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

    pub fn dist_with_mapping(&self, from_id: u32, to_id: u32) -> Option<u32> {
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

impl Default for FloydWarshallOptimized {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared view of the two matrices for the worker threads.
///
/// Safety: rows are partitioned between workers and only a row's owner ever
/// writes it. `counter[k]` reaches the thread count only after every worker
/// released its step k - 1 writes, so by the time any worker reads row k as
/// the through row, no write to it can be in flight; workers also skip the
/// `i == k` self-relaxation, which keeps the through row untouched for the
/// whole step.
struct MatrixView {
    dist: *mut u32,
    next: *mut u32,
}

unsafe impl Sync for MatrixView {}

const GATE_PENDING: u32 = 0;
const GATE_RUN: u32 = 1;
const GATE_ABORT: u32 = 2;

/// Holds workers until every spawn has succeeded, so a failed spawn can
/// cancel the solve before any matrix write.
struct StartGate(AtomicU32);

impl StartGate {
    fn new() -> Self {
        Self(AtomicU32::new(GATE_PENDING))
    }

    fn open(&self) {
        self.0.store(GATE_RUN, Ordering::Release);
    }

    fn abort(&self) {
        self.0.store(GATE_ABORT, Ordering::Release);
    }

    /// Returns false when the solve was aborted.
    fn wait(&self) -> bool {
        let mut spins = 0u32;
        loop {
            match self.0.load(Ordering::Acquire) {
                GATE_RUN => return true,
                GATE_ABORT => return false,
                _ => {
                    spins += 1;
                    if spins % SPIN_BURST == 0 {
                        thread::yield_now();
                    } else {
                        std::hint::spin_loop();
                    }
                }
            }
        }
    }
}

fn wait_for_row(counter: &AtomicU32, total: u32) {
    let mut spins = 0u32;
    while counter.load(Ordering::Acquire) < total {
        spins += 1;
        if spins % SPIN_BURST == 0 {
            thread::yield_now();
        } else {
            std::hint::spin_loop();
        }
    }
}

fn solve_rows(
    view: &MatrixView,
    counters: &[AtomicU32],
    gate: &StartGate,
    rows: std::ops::Range<usize>,
    total: u32,
    n: usize,
) {
    if !gate.wait() {
        return;
    }
    for k in 0..n {
        wait_for_row(&counters[k], total);
        for i in rows.clone() {
            if i == k {
                continue;
            }
            // Safety: see MatrixView. dist[i][k] belongs to this worker's
            // rows and row k is settled once the barrier opened.
            unsafe {
                let dist_ik = *view.dist.add(i * n + k);
                if dist_ik == INF {
                    continue;
                }
                let next_ik = *view.next.add(i * n + k);
                relax_row(
                    view.dist.add(i * n),
                    view.next.add(i * n),
                    view.dist.add(k * n) as *const u32,
                    dist_ik,
                    next_ik,
                    n,
                );
            }
        }
        counters[k + 1].fetch_add(1, Ordering::Release);
    }
}

/// Relax one row against the through row: for every j,
/// `dist_i[j] = min(dist_i[j], dist_ik (+) dist_k[j])`, taking the through
/// hop's `next` on strict improvement only.
///
/// Four u32 lanes on x86_64; the saturating add is emulated by detecting
/// wrap-around with a sign-flipped unsigned compare and forcing wrapped
/// lanes to `INF` (all ones).
///
/// Safety: both rows must be valid for `n` elements and either disjoint or
/// identical.
#[inline(always)]
unsafe fn relax_row(
    dist_i: *mut u32,
    next_i: *mut u32,
    dist_k: *const u32,
    dist_ik: u32,
    next_ik: u32,
    n: usize,
) {
    let mut j = 0usize;

    #[cfg(target_arch = "x86_64")]
    {
        use std::arch::x86_64::*;

        let sign = _mm_set1_epi32(i32::MIN);
        let broadcast_dist = _mm_set1_epi32(dist_ik as i32);
        let broadcast_next = _mm_set1_epi32(next_ik as i32);
        let dist_signed = _mm_xor_si128(broadcast_dist, sign);

        while j + 4 <= n {
            let through = _mm_loadu_si128(dist_k.add(j) as *const __m128i);
            let sum = _mm_add_epi32(broadcast_dist, through);
            // Unsigned wrap check: sum < dist_ik means the lane overflowed.
            let wrapped = _mm_cmpgt_epi32(dist_signed, _mm_xor_si128(sum, sign));
            let saturated = _mm_or_si128(sum, wrapped);

            let current = _mm_loadu_si128(dist_i.add(j) as *const __m128i);
            // Unsigned saturated < current; equal lanes keep the old entry.
            let improved = _mm_cmpgt_epi32(
                _mm_xor_si128(current, sign),
                _mm_xor_si128(saturated, sign),
            );

            let new_dist = _mm_or_si128(
                _mm_and_si128(improved, saturated),
                _mm_andnot_si128(improved, current),
            );
            _mm_storeu_si128(dist_i.add(j) as *mut __m128i, new_dist);

            let current_next = _mm_loadu_si128(next_i.add(j) as *const __m128i);
            let new_next = _mm_or_si128(
                _mm_and_si128(improved, broadcast_next),
                _mm_andnot_si128(improved, current_next),
            );
            _mm_storeu_si128(next_i.add(j) as *mut __m128i, new_next);

            j += 4;
        }
    }

    while j < n {
        let candidate = dist_ik.saturating_add(*dist_k.add(j));
        if candidate < *dist_i.add(j) {
            *dist_i.add(j) = candidate;
            *next_i.add(j) = next_ik;
        }
        j += 1;
    }
}
