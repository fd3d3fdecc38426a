//! FractalRegistry - live top-level fractal instances.
//!
//! A registry owns every finished build's combined mesh together with the
//! parameters it was built from. Placement and color are edited in place on
//! the combined mesh; a new edge length or depth always means a full new
//! build (`rebuild`), since there is no incremental re-subdivision.
//!
//! ```text
//! request_build ──► build ──► register ──► FractalId
//! submit        ──► BuildHandle ──wait/poll──► register
//!
//! set_origin / set_color ──► edit instance in place
//! rebuild(id, edge, depth) ──► new build at same origin/color, old id removed
//! delete(id)               ──► mesh dropped, later lookups are NotFound
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use glam::Vec3;

use crate::build::{BuildConfig, BuildPlan, BuildRequest, BuildStats, BuiltFractal};
use crate::error::{FractalError, Result};
use crate::kind::FractalKind;
#[cfg(feature = "metrics")]
use crate::metrics::BuildMetrics;
use crate::presentation::MeshData;
use crate::threading::{BuildExecutor, BuildHandle};
use crate::types::{Color, CombinedMesh};

// =============================================================================
// FractalId - unique identifier
// =============================================================================

/// Atomic counter for generating unique FractalIds.
static FRACTAL_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Opaque instance identifier, unique within the process lifetime.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct FractalId(u64);

impl FractalId {
  fn next() -> Self {
    Self(FRACTAL_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
  }

  pub fn raw(&self) -> u64 {
    self.0
  }
}

impl std::fmt::Display for FractalId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "#{}", self.0)
  }
}

// =============================================================================
// FractalInstance
// =============================================================================

/// One finished fractal and its editable presentation state.
#[derive(Clone, Debug)]
pub struct FractalInstance {
  id: FractalId,
  pub name: String,
  kind: FractalKind,
  origin: Vec3,
  edge_length: f32,
  max_depth: u32,
  color: Color,
  mesh: CombinedMesh,
  midpoint: Vec3,
  stats: BuildStats,
}

impl FractalInstance {
  fn from_built(built: BuiltFractal, name: String, color: Color) -> Self {
    Self {
      id: FractalId::next(),
      name,
      kind: built.kind,
      origin: built.origin,
      edge_length: built.edge_length,
      max_depth: built.max_depth,
      color,
      mesh: built.mesh,
      midpoint: built.midpoint,
      stats: built.stats,
    }
  }

  pub fn id(&self) -> FractalId {
    self.id
  }

  pub fn kind(&self) -> FractalKind {
    self.kind
  }

  pub fn origin(&self) -> Vec3 {
    self.origin
  }

  pub fn edge_length(&self) -> f32 {
    self.edge_length
  }

  pub fn max_depth(&self) -> u32 {
    self.max_depth
  }

  pub fn color(&self) -> Color {
    self.color
  }

  /// Combined mesh in world space.
  pub fn mesh(&self) -> &CombinedMesh {
    &self.mesh
  }

  /// Root-shape centroid relative to `origin`. Fixed at build time.
  pub fn midpoint(&self) -> Vec3 {
    self.midpoint
  }

  /// World-space point the camera orbits for this instance.
  pub fn pivot(&self) -> Vec3 {
    self.origin + self.midpoint
  }

  pub fn stats(&self) -> &BuildStats {
    &self.stats
  }

  /// Move the instance so its start point lands on `origin`.
  ///
  /// A non-finite origin is rejected and leaves the mesh untouched.
  pub fn set_origin(&mut self, origin: Vec3) -> Result<()> {
    if !origin.is_finite() {
      return Err(FractalError::InvalidParameter(format!(
        "origin must be finite, got {origin}"
      )));
    }
    let delta = origin - self.origin;
    if delta != Vec3::ZERO {
      self.mesh.translate(delta);
    }
    self.origin = origin;
    Ok(())
  }

  pub fn set_color(&mut self, color: Color) {
    self.color = color;
  }

  /// Upload-ready buffers for a renderer.
  pub fn mesh_data(&self) -> MeshData {
    MeshData::from_mesh(&self.mesh, self.color)
  }

  /// Parameters that would rebuild this instance as it is now.
  pub fn request(&self) -> BuildRequest {
    BuildRequest::new(self.kind, self.origin, self.edge_length, self.max_depth)
  }
}

// =============================================================================
// FractalRegistry
// =============================================================================

/// Owner of every live fractal instance.
#[derive(Default)]
pub struct FractalRegistry {
  config: BuildConfig,
  instances: HashMap<FractalId, FractalInstance>,
  executor: BuildExecutor,
  #[cfg(feature = "metrics")]
  metrics: BuildMetrics,
}

impl FractalRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_config(mut self, config: BuildConfig) -> Self {
    self.config = config;
    self
  }

  pub fn config(&self) -> &BuildConfig {
    &self.config
  }

  /// Build `request` synchronously and register the result.
  pub fn request_build(&mut self, request: BuildRequest) -> Result<FractalId> {
    let built = self.run(request)?;
    Ok(self.register(built))
  }

  /// Start `request` in the background. Validation errors are returned
  /// immediately; pass the finished build to `register`.
  pub fn submit(&mut self, request: BuildRequest) -> Result<BuildHandle> {
    let plan = self.plan(request)?;
    Ok(self.executor.spawn(plan))
  }

  /// Builds submitted and not yet finished.
  pub fn pending_builds(&self) -> usize {
    self.executor.pending_count()
  }

  /// Register a finished build under its kind's display name.
  pub fn register(&mut self, built: BuiltFractal) -> FractalId {
    let name = built.kind.display_name().to_string();
    self.register_with(built, name, Color::WHITE)
  }

  /// Register a finished build with an explicit name and color.
  pub fn register_with(&mut self, built: BuiltFractal, name: impl Into<String>, color: Color) -> FractalId {
    #[cfg(feature = "metrics")]
    self.metrics.record_build(&built.stats, built.mesh.vertex_count());

    let instance = FractalInstance::from_built(built, name.into(), color);
    let id = instance.id;
    tracing::info!(
      %id,
      name = %instance.name,
      kind = %instance.kind,
      max_depth = instance.max_depth,
      vertices = instance.mesh.vertex_count(),
      "fractal registered"
    );
    self.instances.insert(id, instance);
    id
  }

  /// Remove an instance from the registry and hand it back.
  pub fn unregister(&mut self, id: FractalId) -> Result<FractalInstance> {
    let instance = self.instances.remove(&id).ok_or(FractalError::NotFound(id))?;
    #[cfg(feature = "metrics")]
    self.metrics.record_delete();
    tracing::debug!(%id, "fractal unregistered");
    Ok(instance)
  }

  /// Remove an instance and release its mesh.
  pub fn delete(&mut self, id: FractalId) -> Result<()> {
    self.unregister(id).map(drop)
  }

  pub fn get(&self, id: FractalId) -> Result<&FractalInstance> {
    self.instances.get(&id).ok_or(FractalError::NotFound(id))
  }

  pub fn get_mut(&mut self, id: FractalId) -> Result<&mut FractalInstance> {
    self.instances.get_mut(&id).ok_or(FractalError::NotFound(id))
  }

  pub fn contains(&self, id: FractalId) -> bool {
    self.instances.contains_key(&id)
  }

  pub fn mesh(&self, id: FractalId) -> Result<&CombinedMesh> {
    self.get(id).map(FractalInstance::mesh)
  }

  pub fn midpoint(&self, id: FractalId) -> Result<Vec3> {
    self.get(id).map(FractalInstance::midpoint)
  }

  pub fn pivot(&self, id: FractalId) -> Result<Vec3> {
    self.get(id).map(FractalInstance::pivot)
  }

  pub fn set_origin(&mut self, id: FractalId, origin: Vec3) -> Result<()> {
    self.get_mut(id)?.set_origin(origin)
  }

  pub fn set_color(&mut self, id: FractalId, color: Color) -> Result<()> {
    self.get_mut(id)?.set_color(color);
    Ok(())
  }

  /// Replace an instance with a full new build at a new edge length and
  /// depth. Origin, name and color carry over; the new instance gets a new
  /// id. On error the old instance is left untouched.
  pub fn rebuild(&mut self, id: FractalId, edge_length: f32, max_depth: u32) -> Result<FractalId> {
    let old = self.get(id)?;
    let request = old
      .request()
      .with_edge_length(edge_length)
      .with_max_depth(max_depth);
    let (name, color) = (old.name.clone(), old.color);

    let built = self.run(request)?;
    self.unregister(id)?;
    let new_id = self.register_with(built, name, color);
    tracing::debug!(old = %id, new = %new_id, edge_length, max_depth, "fractal rebuilt");
    Ok(new_id)
  }

  pub fn len(&self) -> usize {
    self.instances.len()
  }

  pub fn is_empty(&self) -> bool {
    self.instances.is_empty()
  }

  /// Live ids in creation order.
  pub fn ids(&self) -> Vec<FractalId> {
    let mut ids: Vec<_> = self.instances.keys().copied().collect();
    ids.sort_unstable();
    ids
  }

  pub fn iter(&self) -> impl Iterator<Item = &FractalInstance> {
    self.instances.values()
  }

  #[cfg(feature = "metrics")]
  pub fn metrics(&self) -> &BuildMetrics {
    &self.metrics
  }

  fn plan(&mut self, request: BuildRequest) -> Result<BuildPlan> {
    let plan = BuildPlan::new(request, &self.config);
    #[cfg(feature = "metrics")]
    if plan.is_err() {
      self.metrics.record_rejected();
    }
    plan
  }

  fn run(&mut self, request: BuildRequest) -> Result<BuiltFractal> {
    Ok(self.plan(request)?.run())
  }
}

impl std::fmt::Debug for FractalRegistry {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("FractalRegistry")
      .field("config", &self.config)
      .field("instances", &self.instances.len())
      .field("pending_builds", &self.pending_builds())
      .finish()
  }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod registry_test;
