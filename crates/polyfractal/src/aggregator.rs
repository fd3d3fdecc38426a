//! Aggregator - combine barrier for one build.
//!
//! ```text
//!  leaf task ──post──►┌────────────────────────────┐
//!  leaf task ──post──►│ buffer: Mutex<Vec<Placed>> │
//!  leaf task ──post──►│ completed: AtomicU32       │──(completed == expected)──► combine_all
//!        ...          │ expected:  closed form     │                             (exactly once)
//!                     └────────────────────────────┘
//! ```
//!
//! A task appends its leaf under the lock, then increments the counter. The
//! task whose increment reaches `expected` takes the whole buffer and merges
//! it; every earlier append happened before its increment, so nothing is
//! missed. Posting after that point, or firing twice, is a defect and
//! panics.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard, OnceLock};

use glam::Affine3A;

use crate::types::{CombinedMesh, LeafMesh};

/// A leaf waiting to be merged.
#[derive(Clone, Debug)]
pub struct PlacedLeaf {
  /// Pre-order position of the emitting node; fixes merge order.
  pub rank: u64,
  /// Leaf geometry in its local space.
  pub mesh: LeafMesh,
  /// Local-to-world placement applied at merge time.
  pub transform: Affine3A,
}

/// Collects every leaf of one build and merges them once.
pub struct Aggregator {
  expected: u32,
  completed: AtomicU32,
  buffer: Mutex<Vec<PlacedLeaf>>,
  combined: OnceLock<CombinedMesh>,
}

impl Aggregator {
  /// Barrier that fires after `expected` posts.
  pub fn new(expected: u32) -> Self {
    assert!(expected > 0, "a build always emits at least one shape");
    Self {
      expected,
      completed: AtomicU32::new(0),
      buffer: Mutex::new(Vec::with_capacity(expected.min(1 << 16) as usize)),
      combined: OnceLock::new(),
    }
  }

  #[inline]
  pub fn expected(&self) -> u32 {
    self.expected
  }

  /// Posts counted so far.
  #[inline]
  pub fn completed(&self) -> u32 {
    self.completed.load(Ordering::Acquire)
  }

  /// True once the combined mesh exists.
  #[inline]
  pub fn is_finalized(&self) -> bool {
    self.combined.get().is_some()
  }

  /// Add one leaf. Returns `true` if this post fired the combine.
  pub fn post(&self, rank: u64, mesh: LeafMesh, transform: Affine3A) -> bool {
    assert!(
      !self.is_finalized(),
      "leaf {rank} posted after the combine barrier fired"
    );

    self.lock_buffer().push(PlacedLeaf {
      rank,
      mesh,
      transform,
    });

    let done = self.completed.fetch_add(1, Ordering::AcqRel) + 1;
    assert!(
      done <= self.expected,
      "completed count {done} overran expected count {}",
      self.expected
    );
    if done < self.expected {
      return false;
    }

    let leaves = std::mem::take(&mut *self.lock_buffer());
    let mesh = combine_all(leaves);
    tracing::info!(
      leaves = done,
      vertices = mesh.vertex_count(),
      triangles = mesh.triangle_count(),
      "combine barrier fired"
    );
    assert!(
      self.combined.set(mesh).is_ok(),
      "combine barrier fired twice"
    );
    true
  }

  /// Consume the barrier, yielding the mesh if it fired.
  pub fn into_combined(self) -> Option<CombinedMesh> {
    self.combined.into_inner()
  }

  fn lock_buffer(&self) -> MutexGuard<'_, Vec<PlacedLeaf>> {
    self
      .buffer
      .lock()
      .expect("aggregator buffer poisoned by a panicking leaf task")
  }
}

impl std::fmt::Debug for Aggregator {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Aggregator")
      .field("expected", &self.expected)
      .field("completed", &self.completed())
      .field("finalized", &self.is_finalized())
      .finish()
  }
}

/// Merge placed leaves into one indexed mesh.
///
/// Leaves are merged in rank order, each transform is applied to its
/// vertices, and indices are rebased onto the shared `u32` vertex buffer.
/// Ranks must be unique.
pub fn combine_all(mut leaves: Vec<PlacedLeaf>) -> CombinedMesh {
  leaves.sort_unstable_by_key(|leaf| leaf.rank);
  assert!(
    leaves.windows(2).all(|pair| pair[0].rank < pair[1].rank),
    "two leaves posted with the same rank"
  );

  let vertex_total: usize = leaves.iter().map(|leaf| leaf.mesh.vertices.len()).sum();
  let index_total: usize = leaves.iter().map(|leaf| leaf.mesh.indices.len()).sum();
  assert!(
    vertex_total <= u32::MAX as usize,
    "{vertex_total} vertices exceed the 32-bit index range"
  );

  let mut mesh = CombinedMesh {
    positions: Vec::with_capacity(vertex_total),
    indices: Vec::with_capacity(index_total),
    ..Default::default()
  };

  for leaf in &leaves {
    let base = mesh.positions.len() as u32;
    mesh.positions.extend(
      leaf
        .mesh
        .vertices
        .iter()
        .map(|&v| leaf.transform.transform_point3(v)),
    );
    mesh
      .indices
      .extend(leaf.mesh.indices.iter().map(|&i| base + i));
  }

  mesh.recalculate();
  mesh
}

#[cfg(test)]
#[path = "aggregator_test.rs"]
mod aggregator_test;
