//! # Projectile Collision
//!
//! Point-in-rectangle detection between two populations: targets
//! (rectangles anchored at their position) and projectiles (points).
//!
//! ## Contract
//!
//! - Containment is strict: a point on an edge does not hit
//! - Each projectile hits at most one target per scan, the lowest matching row
//! - Every strategy returns the same pairs, ordered by projectile row
//!
//! ## Strategies
//!
//! | Strategy      | Cost                      | Notes |
//! |---------------|---------------------------|-------|
//! | `Naive`       | O(targets × projectiles)  | reference scan |
//! | `SpatialHash` | O(targets + projectiles)  | uniform grid over the combined bounds |
//! | `Parallel`    | naive / threads           | rayon fan-out over projectile chunks |

use std::ops::Range;

use parking_lot::Mutex;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tessera_core::{Rect, Slot};

use crate::components::{Damage, Health, Position2, Size2};

/// Projectiles handled per rayon task.
pub const PARALLEL_CHUNK: usize = 256;

/// Grid cells per axis, at most.
pub const MAX_GRID_DIM: usize = 256;

/// Target side of a collision scan.
#[derive(Clone, Debug)]
pub struct TargetColumns<'a> {
    /// Rectangle origins.
    pub position: &'a [Position2],
    /// Rectangle extents.
    pub size: &'a [Size2],
    /// Rows to test.
    pub rows: Range<usize>,
}

impl TargetColumns<'_> {
    #[inline]
    fn rect(&self, s: usize) -> Rect {
        let p = self.position[s];
        let z = self.size[s];
        Rect::new(p.x, p.y, z.w, z.h)
    }
}

/// Projectile side of a collision scan.
#[derive(Clone, Debug)]
pub struct ProjectileColumns<'a> {
    /// Points.
    pub position: &'a [Position2],
    /// Rows to test.
    pub rows: Range<usize>,
}

/// Matched (target, projectile) pairs, stored as two parallel lists.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Collisions {
    /// Target row of each pair.
    pub targets: Vec<Slot>,
    /// Projectile row of each pair.
    pub projectiles: Vec<Slot>,
}

impl Collisions {
    /// Creates an empty list with room for `capacity` pairs.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            targets: Vec::with_capacity(capacity),
            projectiles: Vec::with_capacity(capacity),
        }
    }

    /// Drops every pair, keeping the allocation.
    pub fn clear(&mut self) {
        self.targets.clear();
        self.projectiles.clear();
    }

    /// Number of pairs.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Checks if no pair was found.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Appends one pair.
    #[inline]
    pub fn push(&mut self, target: Slot, projectile: Slot) {
        self.targets.push(target);
        self.projectiles.push(projectile);
    }

    /// Iterates over `(target, projectile)` pairs.
    pub fn pairs(&self) -> impl Iterator<Item = (Slot, Slot)> + '_ {
        self.targets.iter().copied().zip(self.projectiles.iter().copied())
    }

    /// Keeps only the pairs whose projectile satisfies `keep`, in order.
    pub fn retain_projectiles(&mut self, mut keep: impl FnMut(Slot) -> bool) {
        let mut kept = 0;
        for i in 0..self.len() {
            if keep(self.projectiles[i]) {
                self.targets[kept] = self.targets[i];
                self.projectiles[kept] = self.projectiles[i];
                kept += 1;
            }
        }
        self.targets.truncate(kept);
        self.projectiles.truncate(kept);
    }

    fn extend_from(&mut self, other: &Self) {
        self.targets.extend_from_slice(&other.targets);
        self.projectiles.extend_from_slice(&other.projectiles);
    }

    fn sort_by_projectile(&mut self) {
        let mut pairs: Vec<(Slot, Slot)> = self
            .projectiles
            .iter()
            .copied()
            .zip(self.targets.iter().copied())
            .collect();
        pairs.sort_unstable();
        self.clear();
        for (projectile, target) in pairs {
            self.push(target, projectile);
        }
    }
}

/// Collision scan selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionStrategy {
    /// Nested scan.
    Naive,
    /// Uniform grid.
    #[default]
    SpatialHash,
    /// Nested scan fanned out over rayon.
    Parallel,
}

// =============================================================================
// NAIVE
// =============================================================================

/// Nested scan of every projectile against every target.
pub fn detect_collisions(
    targets: TargetColumns<'_>,
    projectiles: ProjectileColumns<'_>,
    out: &mut Collisions,
) {
    out.clear();
    scan_range(&targets, projectiles.position, projectiles.rows, out);
}

fn scan_range(
    targets: &TargetColumns<'_>,
    projectile_position: &[Position2],
    rows: Range<usize>,
    out: &mut Collisions,
) {
    for b in rows {
        let point = projectile_position[b].to_vec2();
        for s in targets.rows.clone() {
            if targets.rect(s).contains_strict(point) {
                out.push(Slot::new(s as u32), Slot::new(b as u32));
                break;
            }
        }
    }
}

// =============================================================================
// PARALLEL
// =============================================================================

/// Nested scan split into projectile chunks on the rayon pool.
///
/// Each task fills a private buffer; buffers are merged under one lock and
/// then ordered by projectile row.
pub fn detect_collisions_parallel(
    targets: TargetColumns<'_>,
    projectiles: ProjectileColumns<'_>,
    out: &mut Collisions,
) {
    out.clear();
    let start = projectiles.rows.start;
    let end = projectiles.rows.end;
    if start >= end || targets.rows.is_empty() {
        return;
    }

    let merged = Mutex::new(std::mem::take(out));
    let chunks = (end - start).div_ceil(PARALLEL_CHUNK);

    (0..chunks).into_par_iter().for_each(|chunk| {
        let lo = start + chunk * PARALLEL_CHUNK;
        let hi = (lo + PARALLEL_CHUNK).min(end);
        let mut local = Collisions::default();
        scan_range(&targets, projectiles.position, lo..hi, &mut local);
        if !local.is_empty() {
            merged.lock().extend_from(&local);
        }
    });

    *out = merged.into_inner();
    out.sort_by_projectile();
}

// =============================================================================
// SPATIAL HASH
// =============================================================================

/// Uniform grid over the combined bounds of both populations.
///
/// Targets are bucketed into every cell their rectangle touches, in
/// ascending row order (compressed sparse rows). Each projectile then tests
/// only the targets of its own cell. Buffers are kept between scans.
#[derive(Clone, Debug, Default)]
pub struct SpatialHash {
    cell_size: Option<f32>,
    cell_starts: Vec<u32>,
    cell_items: Vec<u32>,
    cursor: Vec<u32>,
}

#[derive(Clone, Copy, Debug)]
struct Grid {
    min_x: f32,
    min_y: f32,
    cell_w: f32,
    cell_h: f32,
    cols: usize,
    rows: usize,
}

impl Grid {
    #[inline]
    fn axis(v: f32, min: f32, cell: f32, dim: usize) -> usize {
        let c = ((v - min) / cell).floor();
        if c <= 0.0 {
            0
        } else {
            (c as usize).min(dim - 1)
        }
    }

    #[inline]
    fn cell_x(&self, x: f32) -> usize {
        Self::axis(x, self.min_x, self.cell_w, self.cols)
    }

    #[inline]
    fn cell_y(&self, y: f32) -> usize {
        Self::axis(y, self.min_y, self.cell_h, self.rows)
    }

    #[inline]
    fn cell_count(&self) -> usize {
        self.cols * self.rows
    }
}

impl SpatialHash {
    /// Creates a hash that sizes its cells from the average target.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a hash with a fixed cell size (still capped at
    /// [`MAX_GRID_DIM`] cells per axis).
    #[must_use]
    pub fn with_cell_size(cell_size: f32) -> Self {
        Self {
            cell_size: (cell_size > 0.0).then_some(cell_size),
            ..Self::default()
        }
    }

    /// Detects collisions; same result as [`detect_collisions`].
    pub fn detect(
        &mut self,
        targets: TargetColumns<'_>,
        projectiles: ProjectileColumns<'_>,
        out: &mut Collisions,
    ) {
        out.clear();
        if projectiles.rows.is_empty() {
            return;
        }
        let Some(grid) = self.build(&targets, &projectiles) else {
            return;
        };

        for b in projectiles.rows {
            let point = projectiles.position[b].to_vec2();
            if !(point.x.is_finite() && point.y.is_finite()) {
                continue;
            }
            let cell = grid.cell_y(point.y) * grid.cols + grid.cell_x(point.x);
            let lo = self.cell_starts[cell] as usize;
            let hi = self.cell_starts[cell + 1] as usize;
            for &s in &self.cell_items[lo..hi] {
                if targets.rect(s as usize).contains_strict(point) {
                    out.push(Slot::new(s), Slot::new(b as u32));
                    break;
                }
            }
        }
    }

    /// Buckets the targets. Returns `None` when no target can be hit.
    fn build(
        &mut self,
        targets: &TargetColumns<'_>,
        projectiles: &ProjectileColumns<'_>,
    ) -> Option<Grid> {
        let mut min_x = f32::INFINITY;
        let mut min_y = f32::INFINITY;
        let mut max_x = f32::NEG_INFINITY;
        let mut max_y = f32::NEG_INFINITY;
        let mut sum_w = 0.0_f32;
        let mut sum_h = 0.0_f32;
        let mut sized = 0usize;
        let mut hittable = 0usize;

        // Non-finite coordinates stay out of the bounds; the clamped cell
        // mapping still buckets such targets at the grid border.
        for s in targets.rows.clone() {
            let r = targets.rect(s);
            if r.is_degenerate() {
                continue;
            }
            hittable += 1;
            for x in [r.x, r.x + r.w] {
                if x.is_finite() {
                    min_x = min_x.min(x);
                    max_x = max_x.max(x);
                }
            }
            for y in [r.y, r.y + r.h] {
                if y.is_finite() {
                    min_y = min_y.min(y);
                    max_y = max_y.max(y);
                }
            }
            if r.w.is_finite() && r.h.is_finite() {
                sum_w += r.w;
                sum_h += r.h;
                sized += 1;
            }
        }
        if hittable == 0 {
            return None;
        }
        for b in projectiles.rows.clone() {
            let p = projectiles.position[b];
            if p.x.is_finite() && p.y.is_finite() {
                min_x = min_x.min(p.x);
                min_y = min_y.min(p.y);
                max_x = max_x.max(p.x);
                max_y = max_y.max(p.y);
            }
        }
        if min_x > max_x {
            (min_x, max_x) = (0.0, 0.0);
        }
        if min_y > max_y {
            (min_y, max_y) = (0.0, 0.0);
        }

        let extent_w = (max_x - min_x).max(f32::MIN_POSITIVE);
        let extent_h = (max_y - min_y).max(f32::MIN_POSITIVE);
        let (base_w, base_h) = match self.cell_size {
            Some(size) => (size, size),
            None if sized > 0 => (sum_w / sized as f32, sum_h / sized as f32),
            None => (extent_w, extent_h),
        };
        let cell_w = base_w.max(extent_w / MAX_GRID_DIM as f32);
        let cell_h = base_h.max(extent_h / MAX_GRID_DIM as f32);
        let grid = Grid {
            min_x,
            min_y,
            cell_w,
            cell_h,
            cols: ((extent_w / cell_w).ceil() as usize).clamp(1, MAX_GRID_DIM),
            rows: ((extent_h / cell_h).ceil() as usize).clamp(1, MAX_GRID_DIM),
        };

        let cells = grid.cell_count();
        self.cell_starts.clear();
        self.cell_starts.resize(cells + 1, 0);

        // Count, exclusive prefix-sum, then fill in ascending target order.
        for s in targets.rows.clone() {
            let r = targets.rect(s);
            if r.is_degenerate() {
                continue;
            }
            for cy in grid.cell_y(r.y)..=grid.cell_y(r.y + r.h) {
                for cx in grid.cell_x(r.x)..=grid.cell_x(r.x + r.w) {
                    self.cell_starts[cy * grid.cols + cx] += 1;
                }
            }
        }
        let mut running = 0;
        for start in &mut self.cell_starts {
            let n = *start;
            *start = running;
            running += n;
        }

        let total = self.cell_starts[cells] as usize;
        self.cell_items.clear();
        self.cell_items.resize(total, 0);
        self.cursor.clear();
        self.cursor.extend_from_slice(&self.cell_starts[..cells]);

        for s in targets.rows.clone() {
            let r = targets.rect(s);
            if r.is_degenerate() {
                continue;
            }
            for cy in grid.cell_y(r.y)..=grid.cell_y(r.y + r.h) {
                for cx in grid.cell_x(r.x)..=grid.cell_x(r.x + r.w) {
                    let cell = cy * grid.cols + cx;
                    self.cell_items[self.cursor[cell] as usize] = s as u32;
                    self.cursor[cell] += 1;
                }
            }
        }

        Some(grid)
    }
}

// =============================================================================
// DISPATCH AND DAMAGE
// =============================================================================

/// A strategy plus the buffers it reuses between ticks.
#[derive(Clone, Debug, Default)]
pub struct CollisionDetector {
    strategy: CollisionStrategy,
    hash: SpatialHash,
}

impl CollisionDetector {
    /// Creates a detector for a strategy.
    #[must_use]
    pub fn new(strategy: CollisionStrategy) -> Self {
        Self {
            strategy,
            hash: SpatialHash::new(),
        }
    }

    /// Active strategy.
    #[must_use]
    pub const fn strategy(&self) -> CollisionStrategy {
        self.strategy
    }

    /// Runs the configured scan.
    pub fn detect(
        &mut self,
        targets: TargetColumns<'_>,
        projectiles: ProjectileColumns<'_>,
        out: &mut Collisions,
    ) {
        match self.strategy {
            CollisionStrategy::Naive => detect_collisions(targets, projectiles, out),
            CollisionStrategy::SpatialHash => self.hash.detect(targets, projectiles, out),
            CollisionStrategy::Parallel => detect_collisions_parallel(targets, projectiles, out),
        }
    }
}

/// Subtracts each matched projectile's damage from its matched target.
/// Health is not clamped.
pub fn apply_damage(health: &mut [Health], damage: &[Damage], collisions: &Collisions) {
    for (target, projectile) in collisions.pairs() {
        if let (Some(h), Some(d)) =
            (health.get_mut(target.index()), damage.get(projectile.index()))
        {
            h.val -= d.val;
        }
    }
}
