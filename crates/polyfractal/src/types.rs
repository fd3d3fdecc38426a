//! Core data types for leaf and combined fractal meshes.

use glam::Vec3;

/// Linear RGBA color used as the instance material.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
  pub r: f32,
  pub g: f32,
  pub b: f32,
  pub a: f32,
}

impl Color {
  pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);

  /// Opaque color from RGB components.
  pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
    Self { r, g, b, a: 1.0 }
  }

  pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
    Self { r, g, b, a }
  }

  pub fn to_array(self) -> [f32; 4] {
    [self.r, self.g, self.b, self.a]
  }
}

impl Default for Color {
  fn default() -> Self {
    Self::WHITE
  }
}

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MinMaxAABB {
  pub min: Vec3,
  pub max: Vec3,
}

impl MinMaxAABB {
  /// Create AABB with inverted extents (ready for encapsulation).
  pub fn empty() -> Self {
    Self {
      min: Vec3::splat(f32::INFINITY),
      max: Vec3::splat(f32::NEG_INFINITY),
    }
  }

  /// Create AABB from min/max corners.
  pub fn new(min: Vec3, max: Vec3) -> Self {
    Self { min, max }
  }

  /// Expand AABB to include a point.
  #[inline]
  pub fn encapsulate(&mut self, point: Vec3) {
    self.min = self.min.min(point);
    self.max = self.max.max(point);
  }

  /// Check if AABB is valid (min <= max on all axes).
  pub fn is_valid(&self) -> bool {
    self.min.cmple(self.max).all()
  }

  pub fn center(&self) -> Vec3 {
    (self.min + self.max) * 0.5
  }

  pub fn size(&self) -> Vec3 {
    self.max - self.min
  }

  /// Shift both corners by `delta`.
  pub fn translate(&mut self, delta: Vec3) {
    if self.is_valid() {
      self.min += delta;
      self.max += delta;
    }
  }
}

impl Default for MinMaxAABB {
  fn default() -> Self {
    Self::empty()
  }
}

/// Geometry of a single leaf polyhedron.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LeafMesh {
  /// Vertex positions.
  pub vertices: Vec<Vec3>,

  /// Triangle indices (3 per triangle) into `vertices`.
  pub indices: Vec<u32>,
}

impl LeafMesh {
  pub fn triangle_count(&self) -> usize {
    self.indices.len() / 3
  }
}

/// Every leaf of one build merged into a single indexed mesh.
///
/// Indices are `u32` since deep builds exceed 65,535 vertices.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CombinedMesh {
  pub positions: Vec<Vec3>,

  /// Area-weighted vertex normals (parallel to `positions`).
  pub normals: Vec<Vec3>,

  pub indices: Vec<u32>,

  pub bounds: MinMaxAABB,
}

impl CombinedMesh {
  pub fn new() -> Self {
    Self::default()
  }

  /// Returns true if no geometry was generated.
  pub fn is_empty(&self) -> bool {
    self.positions.is_empty()
  }

  pub fn vertex_count(&self) -> usize {
    self.positions.len()
  }

  /// Number of triangles in the mesh.
  pub fn triangle_count(&self) -> usize {
    self.indices.len() / 3
  }

  /// Move every vertex by `delta`. Normals are unaffected.
  pub fn translate(&mut self, delta: Vec3) {
    for position in &mut self.positions {
      *position += delta;
    }
    self.bounds.translate(delta);
  }

  /// Recompute normals and bounds from positions and indices.
  pub fn recalculate(&mut self) {
    self.recalculate_normals();
    self.recalculate_bounds();
  }

  /// Accumulate unnormalized face normals (length = 2 * area) per vertex.
  pub fn recalculate_normals(&mut self) {
    let mut normals = vec![Vec3::ZERO; self.positions.len()];
    for tri in self.indices.chunks_exact(3) {
      let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
      let face = (self.positions[b] - self.positions[a]).cross(self.positions[c] - self.positions[a]);
      normals[a] += face;
      normals[b] += face;
      normals[c] += face;
    }
    for normal in &mut normals {
      *normal = normal.normalize_or(Vec3::Y);
    }
    self.normals = normals;
  }

  pub fn recalculate_bounds(&mut self) {
    let mut bounds = MinMaxAABB::empty();
    for &position in &self.positions {
      bounds.encapsulate(position);
    }
    self.bounds = bounds;
  }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
