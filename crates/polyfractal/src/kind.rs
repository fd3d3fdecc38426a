//! FractalKind - closed set of fractal families and their geometry tables.
//!
//! Every formula is parameterized by `l`, the side length of the bounding
//! shape at the level being evaluated (`base_length / 2^level`).
//!
//! ```text
//!                  fan-out C   leaf V   leaf tris   leaves emitted
//! Tetrahedron          4         4          4        C^n
//! InverseTetrahedron   4         6          8        (4^(n+1) - 1) / 3
//! Pyramid              5         5          6        C^n
//! InversePyramid       5         9         14        (5^(n+1) - 1) / 4
//! ```
//!
//! Regular kinds only emit at the deepest level. Inverse kinds emit one
//! shape at every level and also spawn children below it.

use std::fmt;
use std::str::FromStr;

use glam::Vec3;
use smallvec::SmallVec;

use crate::error::FractalError;

/// Largest child fan-out of any kind.
pub const MAX_FAN_OUT: usize = 5;

/// Largest leaf vertex count of any kind.
pub const MAX_LEAF_VERTICES: usize = 9;

/// Child start offsets for one level.
pub type ChildOffsets = SmallVec<[Vec3; MAX_FAN_OUT]>;

/// Local vertex offsets of one leaf shape.
pub type VertexOffsets = SmallVec<[Vec3; MAX_LEAF_VERTICES]>;

const SQRT_2: f32 = std::f32::consts::SQRT_2;
const SQRT_3: f32 = 1.732_050_8;
const SQRT_6: f32 = 2.449_489_7;
/// tan(pi / 6)
const TAN_30: f32 = 0.577_350_26;

#[rustfmt::skip]
const TETRAHEDRON_TRIANGLES: [u32; 12] = [
  0, 1, 2,
  0, 2, 3,
  2, 1, 3,
  0, 3, 1,
];

#[rustfmt::skip]
const OCTAHEDRON_TRIANGLES: [u32; 24] = [
  0, 2, 1,
  0, 1, 3,
  1, 2, 4,
  2, 0, 5,
  0, 3, 5,
  1, 4, 3,
  2, 5, 4,
  3, 4, 5,
];

#[rustfmt::skip]
const PYRAMID_TRIANGLES: [u32; 18] = [
  3, 1, 0,
  3, 2, 1,
  0, 1, 4,
  1, 2, 4,
  2, 3, 4,
  3, 0, 4,
];

#[rustfmt::skip]
const TRIDECAHEDRON_TRIANGLES: [u32; 42] = [
  // lower band
  0, 1, 5,
  1, 2, 5,
  2, 1, 6,
  1, 3, 6,
  3, 1, 7,
  1, 4, 7,
  4, 1, 8,
  1, 0, 8,
  // corner wedges
  0, 5, 8,
  2, 6, 5,
  3, 7, 6,
  4, 8, 7,
  // top
  5, 6, 8,
  6, 7, 8,
];

/// Fractal family selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FractalKind {
  /// Sierpinski tetrahedron: tetrahedra at the deepest level.
  Tetrahedron,
  /// Octahedra at every level, placed in the gaps of a tetrahedron.
  InverseTetrahedron,
  /// Square pyramids at the deepest level.
  Pyramid,
  /// Tridecahedra at every level, placed in the gaps of a pyramid.
  InversePyramid,
}

impl FractalKind {
  /// All kinds in selector order.
  pub const ALL: [FractalKind; 4] = [
    FractalKind::Tetrahedron,
    FractalKind::InverseTetrahedron,
    FractalKind::Pyramid,
    FractalKind::InversePyramid,
  ];

  /// Number of children spawned per subdividing node.
  #[inline]
  pub const fn fan_out(self) -> usize {
    match self {
      FractalKind::Tetrahedron | FractalKind::InverseTetrahedron => 4,
      FractalKind::Pyramid | FractalKind::InversePyramid => 5,
    }
  }

  /// Vertices in one leaf shape.
  #[inline]
  pub const fn leaf_vertex_count(self) -> usize {
    match self {
      FractalKind::Tetrahedron => 4,
      FractalKind::InverseTetrahedron => 6,
      FractalKind::Pyramid => 5,
      FractalKind::InversePyramid => 9,
    }
  }

  /// Triangle index table of the leaf shape (3 indices per triangle).
  #[inline]
  pub const fn triangles(self) -> &'static [u32] {
    match self {
      FractalKind::Tetrahedron => &TETRAHEDRON_TRIANGLES,
      FractalKind::InverseTetrahedron => &OCTAHEDRON_TRIANGLES,
      FractalKind::Pyramid => &PYRAMID_TRIANGLES,
      FractalKind::InversePyramid => &TRIDECAHEDRON_TRIANGLES,
    }
  }

  #[inline]
  pub const fn leaf_triangle_count(self) -> usize {
    self.triangles().len() / 3
  }

  /// Inverse kinds render a shape at every level.
  #[inline]
  pub const fn is_inverse(self) -> bool {
    matches!(
      self,
      FractalKind::InverseTetrahedron | FractalKind::InversePyramid
    )
  }

  /// Whether a node at `depth` of a build with `max_depth` emits a shape.
  #[inline]
  pub const fn emits_at(self, depth: u32, max_depth: u32) -> bool {
    self.is_inverse() || depth == max_depth
  }

  pub const fn display_name(self) -> &'static str {
    match self {
      FractalKind::Tetrahedron => "Tetrahedron",
      FractalKind::InverseTetrahedron => "Inverse Tetrahedron",
      FractalKind::Pyramid => "Pyramid",
      FractalKind::InversePyramid => "Inverse Pyramid",
    }
  }

  /// Name of the primitive drawn at each leaf.
  pub const fn leaf_shape_name(self) -> &'static str {
    match self {
      FractalKind::Tetrahedron => "tetrahedron",
      FractalKind::InverseTetrahedron => "octahedron",
      FractalKind::Pyramid => "pyramid",
      FractalKind::InversePyramid => "tridecahedron",
    }
  }

  /// Number of shapes a build of depth `max_depth` emits, or `None` on
  /// overflow.
  pub fn expected_count(self, max_depth: u32) -> Option<u64> {
    let c = self.fan_out() as u64;
    if self.is_inverse() {
      // Geometric series 1 + C + C^2 + ... + C^n
      let top = c.checked_pow(max_depth.checked_add(1)?)?;
      Some((top - 1) / (c - 1))
    } else {
      c.checked_pow(max_depth)
    }
  }

  /// Vertex total of the combined mesh, or `None` on overflow.
  pub fn vertex_total(self, max_depth: u32) -> Option<u64> {
    self
      .expected_count(max_depth)?
      .checked_mul(self.leaf_vertex_count() as u64)
  }

  /// Start points of the children of a node whose side length is `l`,
  /// relative to the node's own start point.
  pub fn child_offsets(self, l: f32) -> ChildOffsets {
    match self {
      FractalKind::Tetrahedron => [
        Vec3::ZERO,
        Vec3::new(l / 2.0, 0.0, 0.0),
        Vec3::new(l / 4.0, 0.0, l * (SQRT_3 / 4.0)),
        Vec3::new(l / 4.0, l * (SQRT_6 / 6.0), (l / 4.0) * TAN_30),
      ]
      .into_iter()
      .collect(),
      FractalKind::InverseTetrahedron => [
        Vec3::ZERO,
        Vec3::new(l / 4.0, 0.0, l * (SQRT_3 / 4.0)),
        Vec3::new(l / 2.0, 0.0, 0.0),
        Vec3::new(l / 4.0, l * (SQRT_6 / 6.0), (l / 4.0) * TAN_30),
      ]
      .into_iter()
      .collect(),
      // Children sit on the half-size pyramid's corners.
      FractalKind::Pyramid | FractalKind::InversePyramid => pyramid_corners(l / 2.0),
    }
  }

  /// Vertex positions of one leaf shape in a bounding shape of side `l`,
  /// relative to the leaf's start point.
  pub fn vertex_offsets(self, l: f32) -> VertexOffsets {
    match self {
      FractalKind::Tetrahedron => [
        Vec3::ZERO,
        Vec3::new(l, 0.0, 0.0),
        Vec3::new(l / 2.0, 0.0, l * (SQRT_3 / 2.0)),
        Vec3::new(l / 2.0, l * (SQRT_6 / 3.0), (l / 2.0) * TAN_30),
      ]
      .into_iter()
      .collect(),
      // Octahedron spanning the edge midpoints of the tetrahedron.
      FractalKind::InverseTetrahedron => {
        let h = l * (SQRT_6 / 6.0);
        let t = (l / 4.0) * TAN_30;
        [
          Vec3::new(l / 2.0, 0.0, 0.0),
          Vec3::new(l / 4.0, 0.0, l * (SQRT_3 / 4.0)),
          Vec3::new(l * (3.0 / 4.0), 0.0, l * (SQRT_3 / 4.0)),
          Vec3::new(l / 4.0, h, t),
          Vec3::new(l / 2.0, h, l * (SQRT_3 / 4.0) + t),
          Vec3::new(l * (3.0 / 4.0), h, t),
        ]
        .into_iter()
        .collect()
      }
      FractalKind::Pyramid => pyramid_corners(l).into_iter().collect(),
      FractalKind::InversePyramid => {
        let h = l * (SQRT_2 / 4.0);
        [
          Vec3::new(l / 2.0, 0.0, 0.0),
          Vec3::new(l / 2.0, 0.0, l / 2.0),
          Vec3::new(0.0, 0.0, l / 2.0),
          Vec3::new(l / 2.0, 0.0, l),
          Vec3::new(l, 0.0, l / 2.0),
          Vec3::new(l / 4.0, h, l / 4.0),
          Vec3::new(l / 4.0, h, l * (3.0 / 4.0)),
          Vec3::new(l * (3.0 / 4.0), h, l * (3.0 / 4.0)),
          Vec3::new(l * (3.0 / 4.0), h, l / 4.0),
        ]
        .into_iter()
        .collect()
      }
    }
  }

  /// Centroid of the root shape's corners for a build of side `edge_length`,
  /// relative to the build origin.
  ///
  /// Child offsets at twice the side length land on the corners of the full
  /// shape, so their average is the pivot target.
  pub fn midpoint(self, edge_length: f32) -> Vec3 {
    let corners = self.child_offsets(edge_length * 2.0);
    corners.iter().copied().sum::<Vec3>() / corners.len() as f32
  }
}

/// Square pyramid with all edges `l`: base corners then apex.
fn pyramid_corners(l: f32) -> ChildOffsets {
  [
    Vec3::ZERO,
    Vec3::new(0.0, 0.0, l),
    Vec3::new(l, 0.0, l),
    Vec3::new(l, 0.0, 0.0),
    Vec3::new(l / 2.0, l * (SQRT_2 / 2.0), l / 2.0),
  ]
  .into_iter()
  .collect()
}

impl fmt::Display for FractalKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.display_name())
  }
}

impl FromStr for FractalKind {
  type Err = FractalError;

  /// Accepts display names and common spellings, ignoring case, spaces,
  /// dashes and underscores ("inverse-pyramid", "InversePyramid", ...).
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let key: String = s
      .chars()
      .filter(|c| !matches!(c, ' ' | '-' | '_'))
      .flat_map(char::to_lowercase)
      .collect();
    match key.as_str() {
      "tetrahedron" => Ok(FractalKind::Tetrahedron),
      "inversetetrahedron" | "octahedron" => Ok(FractalKind::InverseTetrahedron),
      "pyramid" => Ok(FractalKind::Pyramid),
      "inversepyramid" | "tridecahedron" => Ok(FractalKind::InversePyramid),
      _ => Err(FractalError::InvalidParameter(format!(
        "unsupported fractal kind '{s}'"
      ))),
    }
  }
}

#[cfg(test)]
#[path = "kind_test.rs"]
mod kind_test;
