//! Leaf shape construction.
//!
//! A leaf is one primitive polyhedron: the kind's vertex offsets shifted to
//! an origin, plus the kind's fixed triangle table.

use glam::Vec3;

use crate::error::{FractalError, Result};
use crate::kind::FractalKind;
use crate::offsets::OffsetTable;
use crate::types::LeafMesh;

/// Build one leaf of `kind` with side length `edge_length` at `origin`.
///
/// Offsets are derived directly from the kind's formulas. Fails with
/// `InvalidParameter` for non-positive or non-finite lengths.
pub fn build_leaf(kind: FractalKind, origin: Vec3, edge_length: f32) -> Result<LeafMesh> {
  validate_edge_length(edge_length)?;
  Ok(assemble(kind, origin, &kind.vertex_offsets(edge_length)))
}

/// Build one leaf at `level` of a running build, reading the memoized
/// vertex offsets of that level.
pub fn build_leaf_at_level(table: &OffsetTable, origin: Vec3, level: u32) -> LeafMesh {
  assemble(table.kind(), origin, table.vertex_offsets(level))
}

/// Reject lengths that cannot produce a shape.
pub fn validate_edge_length(edge_length: f32) -> Result<()> {
  if edge_length.is_finite() && edge_length > 0.0 {
    Ok(())
  } else {
    Err(FractalError::InvalidParameter(format!(
      "edge length must be positive and finite, got {edge_length}"
    )))
  }
}

fn assemble(kind: FractalKind, origin: Vec3, offsets: &[Vec3]) -> LeafMesh {
  LeafMesh {
    vertices: offsets.iter().map(|&offset| origin + offset).collect(),
    indices: kind.triangles().to_vec(),
  }
}

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;
