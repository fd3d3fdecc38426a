//! Build requests, validation and the synchronous build driver.
//!
//! ```text
//! BuildRequest ──plan──► BuildPlan ──run──► BuiltFractal
//!   (inputs)      │       (validated,        (combined mesh,
//!                 │        expected count)    midpoint, stats)
//!                 └─► InvalidParameter / DepthTooLarge, before any work
//! ```
//!
//! A plan owns nothing shared: `run` creates the build's offset table and
//! aggregator, drives the subdivision and drops both when the mesh is out.

use glam::Vec3;
use web_time::Instant;

use crate::aggregator::Aggregator;
use crate::error::{FractalError, Result};
use crate::geometry::validate_edge_length;
use crate::kind::FractalKind;
use crate::offsets::OffsetTable;
use crate::subdivision::{Scheduling, Subdivider, SubdivisionTask};
use crate::types::CombinedMesh;

/// Inputs of one fractal build.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BuildRequest {
  pub kind: FractalKind,
  /// World position of the root shape's start point.
  pub origin: Vec3,
  /// Side length of the root bounding shape.
  pub edge_length: f32,
  /// Recursion depth, `0` builds a single shape.
  pub max_depth: u32,
}

impl Default for BuildRequest {
  fn default() -> Self {
    Self {
      kind: FractalKind::Tetrahedron,
      origin: Vec3::ZERO,
      edge_length: 50.0,
      max_depth: 2,
    }
  }
}

impl BuildRequest {
  pub fn new(kind: FractalKind, origin: Vec3, edge_length: f32, max_depth: u32) -> Self {
    Self {
      kind,
      origin,
      edge_length,
      max_depth,
    }
  }

  pub fn with_kind(mut self, kind: FractalKind) -> Self {
    self.kind = kind;
    self
  }

  pub fn with_origin(mut self, origin: Vec3) -> Self {
    self.origin = origin;
    self
  }

  pub fn with_edge_length(mut self, edge_length: f32) -> Self {
    self.edge_length = edge_length;
    self
  }

  pub fn with_max_depth(mut self, max_depth: u32) -> Self {
    self.max_depth = max_depth;
    self
  }
}

/// Settings shared by every build of a registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuildConfig {
  pub scheduling: Scheduling,
  /// Largest combined vertex count accepted; capped at `u32::MAX`.
  pub vertex_limit: u64,
}

impl Default for BuildConfig {
  fn default() -> Self {
    Self {
      scheduling: Scheduling::Parallel,
      vertex_limit: u32::MAX as u64,
    }
  }
}

impl BuildConfig {
  pub fn with_scheduling(mut self, scheduling: Scheduling) -> Self {
    self.scheduling = scheduling;
    self
  }

  pub fn with_vertex_limit(mut self, vertex_limit: u64) -> Self {
    self.vertex_limit = vertex_limit;
    self
  }

  /// The limit actually enforced.
  pub fn effective_vertex_limit(&self) -> u64 {
    self.vertex_limit.min(u32::MAX as u64)
  }
}

/// Per-build counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuildStats {
  /// Shapes merged into the combined mesh.
  pub leaves: u32,
  /// Offset levels computed by the build.
  pub offset_levels: usize,
  /// Wall time from first task to combined mesh.
  pub build_time_us: u64,
}

/// Output of a finished build.
#[derive(Clone, Debug)]
pub struct BuiltFractal {
  pub kind: FractalKind,
  pub origin: Vec3,
  pub edge_length: f32,
  pub max_depth: u32,
  pub mesh: CombinedMesh,
  /// Centroid of the root shape relative to `origin`.
  pub midpoint: Vec3,
  pub stats: BuildStats,
}

/// A validated build, ready to run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BuildPlan {
  request: BuildRequest,
  scheduling: Scheduling,
  expected: u32,
}

impl BuildPlan {
  /// Validate `request` against `config`.
  pub fn new(request: BuildRequest, config: &BuildConfig) -> Result<Self> {
    let plan = Self::validate(request, config);
    match &plan {
      Ok(plan) => tracing::debug!(
        kind = %request.kind,
        max_depth = request.max_depth,
        edge_length = request.edge_length,
        expected = plan.expected,
        "build planned"
      ),
      Err(err) => tracing::warn!(kind = %request.kind, max_depth = request.max_depth, %err, "build rejected"),
    }
    plan
  }

  fn validate(request: BuildRequest, config: &BuildConfig) -> Result<Self> {
    validate_edge_length(request.edge_length)?;
    if !request.origin.is_finite() {
      return Err(FractalError::InvalidParameter(format!(
        "origin must be finite, got {}",
        request.origin
      )));
    }

    let too_large = |vertices: u64| FractalError::DepthTooLarge {
      kind: request.kind,
      max_depth: request.max_depth,
      vertices,
    };
    let vertices = request
      .kind
      .vertex_total(request.max_depth)
      .ok_or_else(|| too_large(u64::MAX))?;
    if vertices > config.effective_vertex_limit() {
      return Err(too_large(vertices));
    }

    // vertices fit u32, so the shape count does too.
    let expected = request
      .kind
      .expected_count(request.max_depth)
      .and_then(|count| u32::try_from(count).ok())
      .ok_or_else(|| too_large(vertices))?;

    Ok(Self {
      request,
      scheduling: config.scheduling,
      expected,
    })
  }

  #[inline]
  pub fn request(&self) -> &BuildRequest {
    &self.request
  }

  /// Shapes the build will emit.
  #[inline]
  pub fn expected_count(&self) -> u32 {
    self.expected
  }

  /// Force a wrong leaf count so the combine barrier misbehaves.
  #[cfg(test)]
  pub(crate) fn with_expected_count(mut self, expected: u32) -> Self {
    self.expected = expected;
    self
  }

  /// Run the build to completion on the calling thread (plus rayon workers
  /// under parallel scheduling).
  pub fn run(self) -> BuiltFractal {
    let BuildRequest {
      kind,
      origin,
      edge_length,
      max_depth,
    } = self.request;
    let _span = tracing::info_span!("fractal_build", %kind, max_depth, expected = self.expected).entered();
    let start = Instant::now();

    let table = OffsetTable::new(kind, edge_length, max_depth);
    let aggregator = Aggregator::new(self.expected);
    Subdivider::new(&table, &aggregator, self.scheduling).subdivide(SubdivisionTask::root(origin, edge_length));

    let leaves = aggregator.completed();
    let offset_levels = table.computed_levels();
    drop(table);
    let mesh = aggregator
      .into_combined()
      .unwrap_or_else(|| panic!("combine barrier never fired: {leaves} of {} leaves posted", self.expected));

    let build_time_us = start.elapsed().as_micros() as u64;
    tracing::debug!(
      leaves,
      vertices = mesh.vertex_count(),
      build_time_us,
      "fractal build complete"
    );

    BuiltFractal {
      kind,
      origin,
      edge_length,
      max_depth,
      mesh,
      midpoint: kind.midpoint(edge_length),
      stats: BuildStats {
        leaves,
        offset_levels,
        build_time_us,
      },
    }
  }
}

/// Validate and run one build synchronously.
pub fn build(request: BuildRequest, config: &BuildConfig) -> Result<BuiltFractal> {
  Ok(BuildPlan::new(request, config)?.run())
}

#[cfg(test)]
#[path = "build_test.rs"]
mod build_test;
