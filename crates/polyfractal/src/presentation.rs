//! Byte-level mesh data for renderers.
//!
//! ```text
//! MeshData:
//!   - vertices: Vec<u8>   // Vertex { position, normal } as raw bytes
//!   - indices:  Vec<u8>   // u32 indices as raw bytes
//!   - vertex_count: u32
//!   - index_count:  u32
//!   - bounds: MinMaxAABB
//!   - color:  Color       // one color for the whole instance
//! ```
//!
//! All values are written in native byte order.

use crate::types::{Color, CombinedMesh, MinMaxAABB};

/// Interleaved vertex layout of `MeshData::vertices`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vertex {
  pub position: [f32; 3],
  pub normal: [f32; 3],
}

impl Vertex {
  pub const SIZE: usize = std::mem::size_of::<Vertex>();

  fn write_to(&self, bytes: &mut Vec<u8>) {
    for value in self.position.iter().chain(&self.normal) {
      bytes.extend_from_slice(&value.to_ne_bytes());
    }
  }
}

/// A combined mesh flattened into upload-ready buffers.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
  pub vertices: Vec<u8>,
  pub indices: Vec<u8>,
  pub vertex_count: u32,
  pub index_count: u32,
  pub bounds: MinMaxAABB,
  pub color: Color,
}

impl MeshData {
  pub fn from_mesh(mesh: &CombinedMesh, color: Color) -> Self {
    let mut vertices = Vec::with_capacity(mesh.vertex_count() * Vertex::SIZE);
    for vertex in interleave(mesh) {
      vertex.write_to(&mut vertices);
    }

    let mut indices = Vec::with_capacity(mesh.indices.len() * 4);
    for index in &mesh.indices {
      indices.extend_from_slice(&index.to_ne_bytes());
    }

    Self {
      vertices,
      indices,
      vertex_count: mesh.vertex_count() as u32,
      index_count: mesh.indices.len() as u32,
      bounds: mesh.bounds,
      color,
    }
  }
}

/// Pair every position with its normal.
pub fn interleave(mesh: &CombinedMesh) -> impl Iterator<Item = Vertex> + '_ {
  mesh.positions.iter().zip(&mesh.normals).map(|(p, n)| Vertex {
    position: p.to_array(),
    normal: n.to_array(),
  })
}

#[cfg(test)]
#[path = "presentation_test.rs"]
mod presentation_test;
