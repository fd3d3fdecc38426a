//! polyfractal - recursive polyhedral fractal meshes
//!
//! Builds Sierpinski-style fractals out of tetrahedra, octahedra, square
//! pyramids and tridecahedra. A build recursively halves a root shape,
//! emits one primitive per leaf (or per node, for inverse kinds) and merges
//! every primitive into a single 32-bit indexed mesh exactly once.
//!
//! # Features
//!
//! - **Four kinds**: Tetrahedron, InverseTetrahedron, Pyramid, InversePyramid
//! - **Per-level offset memo**: placement vectors computed once per level
//! - **Combine barrier**: closed-form expected count, single merge
//! - **Sequential or rayon-parallel** subdivision with identical output
//! - **Instance registry**: move, recolor, rebuild and delete finished meshes
//!
//! # Example
//!
//! ```ignore
//! use polyfractal::{BuildRequest, FractalKind, FractalRegistry};
//!
//! let mut registry = FractalRegistry::new();
//! let id = registry.request_build(
//!   BuildRequest::default()
//!     .with_kind(FractalKind::Pyramid)
//!     .with_max_depth(3),
//! )?;
//!
//! let instance = registry.get(id)?;
//! println!("{} triangles", instance.mesh().triangle_count());
//! ```

pub mod error;
pub mod types;
pub use error::{FractalError, Result};
pub use types::{Color, CombinedMesh, LeafMesh, MinMaxAABB};

// Kinds, formulas and triangle tables
pub mod kind;
pub use kind::FractalKind;

pub mod offsets;
pub use offsets::OffsetTable;

pub mod geometry;
pub use geometry::{build_leaf, build_leaf_at_level};

// Combine barrier
pub mod aggregator;
pub use aggregator::{combine_all, Aggregator, PlacedLeaf};

pub mod subdivision;
pub use subdivision::{Scheduling, Subdivider, SubdivisionTask};

pub mod build;
pub use build::{build, BuildConfig, BuildPlan, BuildRequest, BuildStats, BuiltFractal};

// Background builds on rayon
pub mod threading;
pub use threading::{BuildExecutor, BuildHandle, BuildId};

pub mod registry;
pub use registry::{FractalId, FractalInstance, FractalRegistry};

pub mod presentation;
pub use presentation::{MeshData, Vertex};

// Build metrics (feature-gated)
pub mod metrics;
