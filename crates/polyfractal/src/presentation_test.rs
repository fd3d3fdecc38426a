use glam::{Affine3A, Vec3};

use super::*;
use crate::aggregator::{combine_all, PlacedLeaf};
use crate::geometry::build_leaf;
use crate::kind::FractalKind;

fn tetra_mesh() -> CombinedMesh {
  combine_all(vec![PlacedLeaf {
    rank: 0,
    mesh: build_leaf(FractalKind::Tetrahedron, Vec3::ZERO, 2.0).unwrap(),
    transform: Affine3A::IDENTITY,
  }])
}

fn read_f32(bytes: &[u8], at: usize) -> f32 {
  f32::from_ne_bytes(bytes[at..at + 4].try_into().unwrap())
}

#[test]
fn test_vertex_layout_is_six_floats() {
  assert_eq!(Vertex::SIZE, 24);
}

#[test]
fn test_buffer_sizes_match_counts() {
  let mesh = tetra_mesh();
  let data = MeshData::from_mesh(&mesh, Color::WHITE);
  assert_eq!(data.vertex_count, 4);
  assert_eq!(data.index_count, 12);
  assert_eq!(data.vertices.len(), 4 * Vertex::SIZE);
  assert_eq!(data.indices.len(), 12 * 4);
  assert_eq!(data.bounds, mesh.bounds);
}

#[test]
fn test_bytes_round_trip_positions_and_indices() {
  let mesh = tetra_mesh();
  let data = MeshData::from_mesh(&mesh, Color::rgb(1.0, 0.0, 0.0));
  assert_eq!(data.color, Color::rgb(1.0, 0.0, 0.0));

  for (i, position) in mesh.positions.iter().enumerate() {
    let base = i * Vertex::SIZE;
    assert_eq!(read_f32(&data.vertices, base), position.x);
    assert_eq!(read_f32(&data.vertices, base + 4), position.y);
    assert_eq!(read_f32(&data.vertices, base + 8), position.z);
    assert_eq!(read_f32(&data.vertices, base + 12), mesh.normals[i].x);
  }

  let indices: Vec<u32> = data
    .indices
    .chunks_exact(4)
    .map(|b| u32::from_ne_bytes(b.try_into().unwrap()))
    .collect();
  assert_eq!(indices, mesh.indices);
}

#[test]
fn test_empty_mesh_gives_empty_buffers() {
  let data = MeshData::from_mesh(&CombinedMesh::new(), Color::WHITE);
  assert!(data.vertices.is_empty());
  assert!(data.indices.is_empty());
  assert_eq!(data.vertex_count, 0);
}
