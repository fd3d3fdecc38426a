//! Error types surfaced to callers of the build and registry APIs.
//!
//! Only recoverable, caller-facing conditions live here. Broken internal
//! invariants (a task deeper than its build, a second combine, a post after
//! the barrier fired) are defects and panic instead.

use thiserror::Error;

use crate::kind::FractalKind;
use crate::registry::FractalId;

/// Errors returned by build requests and registry lookups.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FractalError {
  /// Rejected before any work began (non-positive length, unknown kind, ...).
  #[error("invalid parameter: {0}")]
  InvalidParameter(String),

  /// The requested depth would overflow the 32-bit index range.
  #[error("depth {max_depth} is too large for {kind}: {vertices} vertices exceed the index limit")]
  DepthTooLarge {
    /// Kind that was requested.
    kind: FractalKind,
    /// Requested recursion depth.
    max_depth: u32,
    /// Vertex total the build would have produced (saturated).
    vertices: u64,
  },

  /// No live instance with this id.
  #[error("fractal {0:?} not found")]
  NotFound(FractalId),

  /// A background build ended without delivering a result.
  #[error("build aborted before producing a mesh")]
  BuildAborted,
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, FractalError>;
