use glam::Vec3;

use super::*;

#[test]
fn test_aabb_encapsulate() {
  let mut aabb = MinMaxAABB::empty();
  assert!(!aabb.is_valid());

  aabb.encapsulate(Vec3::new(1.0, 2.0, 3.0));
  aabb.encapsulate(Vec3::new(-1.0, -2.0, -3.0));

  assert_eq!(aabb.min, Vec3::new(-1.0, -2.0, -3.0));
  assert_eq!(aabb.max, Vec3::new(1.0, 2.0, 3.0));
  assert_eq!(aabb.center(), Vec3::ZERO);
  assert_eq!(aabb.size(), Vec3::new(2.0, 4.0, 6.0));
  assert!(aabb.is_valid());
}

#[test]
fn test_empty_aabb_ignores_translation() {
  let mut aabb = MinMaxAABB::empty();
  aabb.translate(Vec3::ONE);
  assert_eq!(aabb.min, Vec3::splat(f32::INFINITY));
}

#[test]
fn test_normals_point_away_from_ccw_face() {
  // Single triangle in the XZ plane wound so the normal faces +Y.
  let mut mesh = CombinedMesh {
    positions: vec![Vec3::ZERO, Vec3::Z, Vec3::X],
    indices: vec![0, 1, 2],
    ..Default::default()
  };
  mesh.recalculate();

  for normal in &mesh.normals {
    assert!((*normal - Vec3::Y).length() < 1e-6);
  }
  assert_eq!(mesh.bounds.min, Vec3::ZERO);
  assert_eq!(mesh.bounds.max, Vec3::new(1.0, 0.0, 1.0));
}

#[test]
fn test_unreferenced_vertex_gets_fallback_normal() {
  let mut mesh = CombinedMesh {
    positions: vec![Vec3::ZERO],
    ..Default::default()
  };
  mesh.recalculate_normals();
  assert_eq!(mesh.normals, vec![Vec3::Y]);
}

#[test]
fn test_translate_moves_positions_and_bounds() {
  let mut mesh = CombinedMesh {
    positions: vec![Vec3::ZERO, Vec3::ONE],
    ..Default::default()
  };
  mesh.recalculate_bounds();
  mesh.translate(Vec3::new(10.0, 0.0, -5.0));

  assert_eq!(mesh.positions[1], Vec3::new(11.0, 1.0, -4.0));
  assert_eq!(mesh.bounds.min, Vec3::new(10.0, 0.0, -5.0));
  assert_eq!(mesh.bounds.max, Vec3::new(11.0, 1.0, -4.0));
}

#[test]
fn test_empty_mesh_counts() {
  let mesh = CombinedMesh::new();
  assert!(mesh.is_empty());
  assert_eq!(mesh.vertex_count(), 0);
  assert_eq!(mesh.triangle_count(), 0);
}

#[test]
fn test_default_color_is_opaque_white() {
  assert_eq!(Color::default().to_array(), [1.0, 1.0, 1.0, 1.0]);
  assert_eq!(Color::rgb(0.5, 0.25, 0.0).a, 1.0);
}
