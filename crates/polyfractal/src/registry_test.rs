use super::*;
use crate::subdivision::Scheduling;

fn registry() -> FractalRegistry {
  FractalRegistry::new().with_config(BuildConfig::default().with_scheduling(Scheduling::Sequential))
}

fn small(kind: FractalKind) -> BuildRequest {
  BuildRequest::default().with_kind(kind).with_edge_length(8.0).with_max_depth(1)
}

#[test]
fn test_request_build_registers_instance() {
  let mut registry = registry();
  let id = registry.request_build(small(FractalKind::Pyramid)).unwrap();

  let instance = registry.get(id).unwrap();
  assert_eq!(instance.id(), id);
  assert_eq!(instance.name, "Pyramid");
  assert_eq!(instance.kind(), FractalKind::Pyramid);
  assert_eq!(instance.edge_length(), 8.0);
  assert_eq!(instance.max_depth(), 1);
  assert_eq!(instance.color(), Color::WHITE);
  assert_eq!(instance.stats().leaves, 5);
  assert_eq!(instance.mesh().vertex_count(), 25);
  assert_eq!(registry.len(), 1);
}

#[test]
fn test_ids_are_unique_and_ordered() {
  let mut registry = registry();
  let a = registry.request_build(small(FractalKind::Tetrahedron)).unwrap();
  let b = registry.request_build(small(FractalKind::Tetrahedron)).unwrap();
  assert_ne!(a, b);
  assert_eq!(registry.ids(), vec![a, b]);
}

#[test]
fn test_rejected_request_registers_nothing() {
  let mut registry = registry();
  let result = registry.request_build(small(FractalKind::Tetrahedron).with_edge_length(0.0));
  assert!(matches!(result, Err(FractalError::InvalidParameter(_))));
  assert!(registry.is_empty());
}

#[test]
fn test_set_origin_moves_mesh_and_pivot() {
  let mut registry = registry();
  let id = registry.request_build(small(FractalKind::InverseTetrahedron)).unwrap();
  let before = registry.mesh(id).unwrap().clone();
  let midpoint = registry.midpoint(id).unwrap();

  let target = Vec3::new(10.0, 0.0, -4.0);
  registry.set_origin(id, target).unwrap();

  let instance = registry.get(id).unwrap();
  assert_eq!(instance.origin(), target);
  assert_eq!(instance.midpoint(), midpoint, "midpoint is fixed at build time");
  assert_eq!(registry.pivot(id).unwrap(), target + midpoint);
  for (a, b) in before.positions.iter().zip(&instance.mesh().positions) {
    assert!((*a + target - *b).length() < 1e-4);
  }
  assert_eq!(before.indices, instance.mesh().indices);
  assert_eq!(before.normals, instance.mesh().normals);
}

#[test]
fn test_non_finite_origin_is_rejected_and_mesh_kept() {
  let mut registry = registry();
  let id = registry.request_build(small(FractalKind::Pyramid)).unwrap();
  let before = registry.mesh(id).unwrap().clone();

  for bad in [
    Vec3::new(f32::NAN, 0.0, 0.0),
    Vec3::new(0.0, f32::INFINITY, 0.0),
    Vec3::new(0.0, 0.0, f32::NEG_INFINITY),
  ] {
    assert!(matches!(
      registry.set_origin(id, bad),
      Err(FractalError::InvalidParameter(_))
    ));
    assert_eq!(registry.get(id).unwrap().origin(), Vec3::ZERO);
    assert_eq!(registry.mesh(id).unwrap(), &before);
  }

  // A later valid move still lands exactly where asked.
  let target = Vec3::new(2.0, 4.0, 6.0);
  registry.set_origin(id, target).unwrap();
  let instance = registry.get(id).unwrap();
  assert!(instance.mesh().positions.iter().all(|p| p.is_finite()));
  assert!((instance.mesh().positions[0] - (before.positions[0] + target)).length() < 1e-4);
  assert!(instance.mesh().bounds.is_valid());
}

#[test]
fn test_set_color_only_touches_material() {
  let mut registry = registry();
  let id = registry.request_build(small(FractalKind::Tetrahedron)).unwrap();
  let mesh = registry.mesh(id).unwrap().clone();

  let red = Color::rgb(1.0, 0.0, 0.0);
  registry.set_color(id, red).unwrap();
  assert_eq!(registry.get(id).unwrap().color(), red);
  assert_eq!(registry.mesh(id).unwrap(), &mesh);
  assert_eq!(registry.get(id).unwrap().mesh_data().color, red);
}

#[test]
fn test_delete_then_lookups_are_not_found() {
  let mut registry = registry();
  let id = registry.request_build(small(FractalKind::Pyramid)).unwrap();
  registry.delete(id).unwrap();

  assert!(!registry.contains(id));
  assert_eq!(registry.get(id).err(), Some(FractalError::NotFound(id)));
  assert_eq!(registry.set_origin(id, Vec3::ONE), Err(FractalError::NotFound(id)));
  assert_eq!(registry.delete(id), Err(FractalError::NotFound(id)));
}

#[test]
fn test_rebuild_keeps_origin_name_and_color() {
  let mut registry = registry();
  let id = registry.request_build(small(FractalKind::Tetrahedron)).unwrap();
  registry.get_mut(id).unwrap().name = "spire".to_string();
  registry.set_origin(id, Vec3::new(1.0, 2.0, 3.0)).unwrap();
  registry.set_color(id, Color::rgb(0.0, 1.0, 0.0)).unwrap();

  let new_id = registry.rebuild(id, 16.0, 2).unwrap();
  assert_ne!(new_id, id);
  assert!(!registry.contains(id));

  let rebuilt = registry.get(new_id).unwrap();
  assert_eq!(rebuilt.name, "spire");
  assert_eq!(rebuilt.origin(), Vec3::new(1.0, 2.0, 3.0));
  assert_eq!(rebuilt.color(), Color::rgb(0.0, 1.0, 0.0));
  assert_eq!(rebuilt.edge_length(), 16.0);
  assert_eq!(rebuilt.max_depth(), 2);
  assert_eq!(rebuilt.stats().leaves, 16);
  assert_eq!(rebuilt.midpoint(), FractalKind::Tetrahedron.midpoint(16.0));
}

#[test]
fn test_failed_rebuild_keeps_old_instance() {
  let mut registry = registry();
  let id = registry.request_build(small(FractalKind::Tetrahedron)).unwrap();
  assert!(matches!(
    registry.rebuild(id, 8.0, 40),
    Err(FractalError::DepthTooLarge { .. })
  ));
  assert!(registry.contains(id));
  assert_eq!(registry.get(id).unwrap().max_depth(), 1);
}

#[test]
fn test_submit_then_register() {
  let mut registry = registry();
  let handle = registry.submit(small(FractalKind::InversePyramid)).unwrap();
  let built = handle.wait().unwrap();
  let id = registry.register_with(built, "bg", Color::WHITE);

  assert_eq!(registry.get(id).unwrap().stats().leaves, 6);
  assert_eq!(registry.get(id).unwrap().name, "bg");
}

#[test]
fn test_submit_rejects_before_spawning() {
  let mut registry = registry();
  assert!(matches!(
    registry.submit(small(FractalKind::Pyramid).with_edge_length(-1.0)),
    Err(FractalError::InvalidParameter(_))
  ));
}

#[cfg(feature = "metrics")]
#[test]
fn test_metrics_track_builds_and_deletes() {
  let mut registry = registry();
  let id = registry.request_build(small(FractalKind::Pyramid)).unwrap();
  let _ = registry.request_build(small(FractalKind::Pyramid).with_max_depth(99));
  registry.delete(id).unwrap();

  let metrics = registry.metrics();
  assert_eq!(metrics.builds_completed, 1);
  assert_eq!(metrics.builds_rejected, 1);
  assert_eq!(metrics.instances_deleted, 1);
  assert_eq!(metrics.leaves_emitted, 5);
  assert_eq!(metrics.vertices_emitted, 25);
}
