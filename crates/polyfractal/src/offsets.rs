//! OffsetTable - per-build memo of level-relative offsets.
//!
//! Every node at a given level shares the same side length, child start
//! offsets and leaf vertex offsets; only its absolute origin differs. The
//! table computes each entry the first time any task asks for it and hands
//! out the same slice afterwards.
//!
//! ```text
//! level:        0        1        2     ...   max_depth
//! side:         a       a/2      a/4          a/2^n
//! child:      [C]      [C]      [C]            [C]
//! vertex:     [V]      [V]      [V]            [V]
//! ```
//!
//! Each cell is a `OnceLock`: the first task to reach a level computes it,
//! concurrent readers block until it is published. A table lives exactly as
//! long as its build, so a new build with a different depth always starts
//! from a fresh, correctly sized table.

use std::sync::OnceLock;

use glam::Vec3;

use crate::kind::{ChildOffsets, FractalKind, VertexOffsets};

#[derive(Default)]
struct LevelSlot {
  side_length: OnceLock<f32>,
  child_offsets: OnceLock<ChildOffsets>,
  vertex_offsets: OnceLock<VertexOffsets>,
}

/// Memoized offsets for one kind, one base length, levels `0..=max_depth`.
pub struct OffsetTable {
  kind: FractalKind,
  base_length: f32,
  levels: Vec<LevelSlot>,
}

impl OffsetTable {
  /// Empty table sized to `max_depth + 1` levels.
  pub fn new(kind: FractalKind, base_length: f32, max_depth: u32) -> Self {
    let levels = (0..=max_depth).map(|_| LevelSlot::default()).collect();
    Self {
      kind,
      base_length,
      levels,
    }
  }

  #[inline]
  pub fn kind(&self) -> FractalKind {
    self.kind
  }

  #[inline]
  pub fn base_length(&self) -> f32 {
    self.base_length
  }

  #[inline]
  pub fn max_depth(&self) -> u32 {
    (self.levels.len() - 1) as u32
  }

  /// Side length at `level`: `base_length / 2^level`.
  pub fn side_length(&self, level: u32) -> f32 {
    *self
      .slot(level)
      .side_length
      .get_or_init(|| self.base_length / 2f32.powi(level as i32))
  }

  /// Child start offsets for a node at `level`.
  pub fn child_offsets(&self, level: u32) -> &[Vec3] {
    let side = self.side_length(level);
    self.slot(level).child_offsets.get_or_init(|| {
      tracing::trace!(kind = %self.kind, level, side, "computing child offsets");
      self.kind.child_offsets(side)
    })
  }

  /// Local vertex offsets of a leaf shape at `level`.
  pub fn vertex_offsets(&self, level: u32) -> &[Vec3] {
    let side = self.side_length(level);
    self.slot(level).vertex_offsets.get_or_init(|| {
      tracing::trace!(kind = %self.kind, level, side, "computing vertex offsets");
      self.kind.vertex_offsets(side)
    })
  }

  /// Number of levels whose side length has been derived so far.
  pub fn computed_levels(&self) -> usize {
    self
      .levels
      .iter()
      .filter(|slot| slot.side_length.get().is_some())
      .count()
  }

  fn slot(&self, level: u32) -> &LevelSlot {
    assert!(
      level <= self.max_depth(),
      "offset level {level} is deeper than the build's max depth {}",
      self.max_depth()
    );
    &self.levels[level as usize]
  }
}

impl std::fmt::Debug for OffsetTable {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("OffsetTable")
      .field("kind", &self.kind)
      .field("base_length", &self.base_length)
      .field("levels", &self.levels.len())
      .field("computed_levels", &self.computed_levels())
      .finish()
  }
}

#[cfg(test)]
#[path = "offsets_test.rs"]
mod offsets_test;
