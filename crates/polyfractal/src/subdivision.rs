//! Recursive subdivision engine.
//!
//! Walks the implicit tree of one build. Each node either emits a leaf shape
//! to the aggregator, spawns `C` children one level down, or (inverse kinds)
//! both. The tree is never materialized: a node is just a `SubdivisionTask`
//! value, and shared state (offset table, aggregator) is borrowed from the
//! build.
//!
//! ```text
//! depth 0            [root]                 inverse: emits   regular: spawns only
//!                   /  |  |  \
//! depth 1        [0] [1] [2] [3]            inverse: emits   regular: spawns only
//!                 ...
//! depth n       leaves                      both kinds emit
//! ```
//!
//! # Leaf ranks
//!
//! Every emitting node gets its pre-order index among emitting nodes, derived
//! from its path: child `j` of a node with rank `r` starts at
//! `r + emits_self + j * subtree(depth + 1)`. Ranks are dense in
//! `0..expected`, so merging in rank order gives the same mesh for any
//! scheduling.

use glam::{Affine3A, Vec3};
use rayon::prelude::*;

use crate::aggregator::Aggregator;
use crate::geometry::build_leaf_at_level;
use crate::kind::FractalKind;
use crate::offsets::OffsetTable;

/// How sibling subtrees are executed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Scheduling {
  /// Depth-first on the calling thread.
  Sequential,
  /// Sibling subtrees run on rayon's pool.
  #[default]
  Parallel,
}

/// One node of the subdivision tree.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SubdivisionTask {
  /// Start point of this node's bounding shape.
  pub origin: Vec3,
  /// Side length of this node's bounding shape.
  pub edge_length: f32,
  pub current_depth: u32,
  /// Pre-order rank among emitting nodes (see module docs).
  pub rank: u64,
}

impl SubdivisionTask {
  /// The root node of a build.
  pub fn root(origin: Vec3, edge_length: f32) -> Self {
    Self {
      origin,
      edge_length,
      current_depth: 0,
      rank: 0,
    }
  }
}

/// Per-build driver borrowing the build's offset table and aggregator.
pub struct Subdivider<'a> {
  kind: FractalKind,
  max_depth: u32,
  scheduling: Scheduling,
  offsets: &'a OffsetTable,
  aggregator: &'a Aggregator,
  /// Shapes emitted by a whole subtree rooted at each depth.
  subtree_sizes: Vec<u64>,
}

impl<'a> Subdivider<'a> {
  pub fn new(offsets: &'a OffsetTable, aggregator: &'a Aggregator, scheduling: Scheduling) -> Self {
    let kind = offsets.kind();
    let max_depth = offsets.max_depth();
    Self {
      kind,
      max_depth,
      scheduling,
      offsets,
      aggregator,
      subtree_sizes: subtree_sizes(kind, max_depth),
    }
  }

  /// Shapes emitted by a subtree rooted at `depth`.
  #[inline]
  pub fn subtree_size(&self, depth: u32) -> u64 {
    self.subtree_sizes[depth as usize]
  }

  /// Process one node and, recursively, everything below it.
  pub fn subdivide(&self, task: SubdivisionTask) {
    let depth = task.current_depth;
    assert!(
      depth <= self.max_depth,
      "subdivision reached depth {depth} past max depth {}",
      self.max_depth
    );
    debug_assert_eq!(
      task.edge_length,
      self.offsets.side_length(depth),
      "task edge length disagrees with level {depth} side length"
    );

    let emits = self.kind.emits_at(depth, self.max_depth);
    if emits {
      // Leaf geometry is level-local; the origin goes into the placement.
      let leaf = build_leaf_at_level(self.offsets, Vec3::ZERO, depth);
      self
        .aggregator
        .post(task.rank, leaf, Affine3A::from_translation(task.origin));
    }

    if depth == self.max_depth {
      return;
    }

    let child_edge = self.offsets.side_length(depth + 1);
    let stride = self.subtree_size(depth + 1);
    let first_rank = task.rank + u64::from(emits);
    let child = |j: usize, offset: Vec3| SubdivisionTask {
      origin: task.origin + offset,
      edge_length: child_edge,
      current_depth: depth + 1,
      rank: first_rank + j as u64 * stride,
    };

    let offsets = self.offsets.child_offsets(depth);
    match self.scheduling {
      Scheduling::Sequential => {
        for (j, &offset) in offsets.iter().enumerate() {
          self.subdivide(child(j, offset));
        }
      }
      Scheduling::Parallel => {
        offsets
          .par_iter()
          .enumerate()
          .for_each(|(j, &offset)| self.subdivide(child(j, offset)));
      }
    }
  }
}

/// `size[d] = emits(d) + C * size[d + 1]`, with `size[n] = 1`.
fn subtree_sizes(kind: FractalKind, max_depth: u32) -> Vec<u64> {
  let fan_out = kind.fan_out() as u64;
  let mut sizes = vec![1u64; max_depth as usize + 1];
  for depth in (0..max_depth).rev() {
    let below = sizes[depth as usize + 1].saturating_mul(fan_out);
    sizes[depth as usize] = below.saturating_add(u64::from(kind.emits_at(depth, max_depth)));
  }
  sizes
}

#[cfg(test)]
#[path = "subdivision_test.rs"]
mod subdivision_test;
