//! Registry-wide build metrics.
//!
//! Counting compiles out without the `metrics` feature and can be paused at
//! runtime through [`COLLECT_METRICS`].
//!
//! ```ignore
//! use polyfractal::metrics::COLLECT_METRICS;
//!
//! // Compile with --features metrics (on by default)
//! COLLECT_METRICS.store(false, Ordering::Relaxed);
//!
//! let metrics = registry.metrics();
//! println!("avg build: {:.0}us", metrics.build_time_us.average());
//! ```

use std::collections::VecDeque;
use std::sync::atomic::AtomicBool;
#[cfg(feature = "metrics")]
use std::sync::atomic::Ordering;

use crate::build::BuildStats;

/// Runtime toggle for metrics collection.
pub static COLLECT_METRICS: AtomicBool = AtomicBool::new(true);

/// Check if metrics collection is enabled (both compile-time and runtime).
#[inline]
pub fn is_enabled() -> bool {
  #[cfg(feature = "metrics")]
  {
    COLLECT_METRICS.load(Ordering::Relaxed)
  }
  #[cfg(not(feature = "metrics"))]
  {
    false
  }
}

/// Fixed-capacity window over the most recent samples, with a running total.
#[derive(Debug, Clone)]
pub struct RollingWindow {
  samples: VecDeque<u64>,
  capacity: usize,
  total: u64,
}

impl RollingWindow {
  pub fn new(capacity: usize) -> Self {
    Self {
      samples: VecDeque::with_capacity(capacity),
      capacity,
      total: 0,
    }
  }

  /// Record a sample, dropping the oldest once full.
  pub fn push(&mut self, sample: u64) {
    if self.capacity == 0 {
      return;
    }
    if self.samples.len() == self.capacity {
      if let Some(evicted) = self.samples.pop_front() {
        self.total = self.total.saturating_sub(evicted);
      }
    }
    self.samples.push_back(sample);
    self.total = self.total.saturating_add(sample);
  }

  pub fn len(&self) -> usize {
    self.samples.len()
  }

  pub fn is_empty(&self) -> bool {
    self.samples.is_empty()
  }

  pub fn sum(&self) -> u64 {
    self.total
  }

  pub fn average(&self) -> f64 {
    if self.samples.is_empty() {
      0.0
    } else {
      self.total as f64 / self.samples.len() as f64
    }
  }
}

impl Default for RollingWindow {
  fn default() -> Self {
    Self::new(64)
  }
}

/// Totals and recent timings across every build a registry ran.
#[derive(Debug, Clone, Default)]
pub struct BuildMetrics {
  /// Builds that produced a registered instance.
  pub builds_completed: u64,
  /// Requests rejected by validation.
  pub builds_rejected: u64,
  pub instances_deleted: u64,
  /// Leaf shapes emitted, summed over completed builds.
  pub leaves_emitted: u64,
  pub vertices_emitted: u64,
  /// Recent build wall times.
  pub build_time_us: RollingWindow,
}

impl BuildMetrics {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn record_build(&mut self, stats: &BuildStats, vertices: usize) {
    if !is_enabled() {
      return;
    }
    self.builds_completed += 1;
    self.leaves_emitted += u64::from(stats.leaves);
    self.vertices_emitted += vertices as u64;
    self.build_time_us.push(stats.build_time_us);
  }

  pub fn record_rejected(&mut self) {
    if is_enabled() {
      self.builds_rejected += 1;
    }
  }

  pub fn record_delete(&mut self) {
    if is_enabled() {
      self.instances_deleted += 1;
    }
  }

  pub fn reset(&mut self) {
    *self = Self::default();
  }
}

#[cfg(test)]
#[path = "metrics_test.rs"]
mod metrics_test;
