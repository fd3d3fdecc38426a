//! Background builds on rayon's pool.
//!
//! `BuildExecutor::spawn` hands a validated plan to `rayon::spawn` and
//! returns a `BuildHandle` immediately. The build sends its result over a
//! one-shot crossbeam channel; the caller polls or blocks on the handle.
//!
//! ```ignore
//! let executor = BuildExecutor::new();
//! let mut handle = executor.spawn(plan);
//!
//! // Poll once per frame
//! if let Some(result) = handle.poll() {
//!   let built = result?;
//! }
//! ```
//!
//! A build that panics drops its sender without sending. The handle sees a
//! disconnected channel and reports `FractalError::BuildAborted`.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use crossbeam_channel::{Receiver, TryRecvError};

use crate::build::{BuildPlan, BuildRequest, BuiltFractal};
use crate::error::{FractalError, Result};

/// Unique identifier for a spawned build.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BuildId(u64);

impl BuildId {
  fn next() -> Self {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    Self(COUNTER.fetch_add(1, Ordering::Relaxed))
  }

  pub fn raw(&self) -> u64 {
    self.0
  }
}

/// Spawns builds on rayon's thread pool.
#[derive(Clone, Default)]
pub struct BuildExecutor {
  pending: Arc<AtomicUsize>,
}

impl BuildExecutor {
  pub fn new() -> Self {
    Self::default()
  }

  /// Start `plan` in the background (non-blocking).
  pub fn spawn(&self, plan: BuildPlan) -> BuildHandle {
    let id = BuildId::next();
    let request = *plan.request();
    let (sender, receiver) = crossbeam_channel::bounded(1);

    self.pending.fetch_add(1, Ordering::AcqRel);
    let pending = Arc::clone(&self.pending);

    rayon::spawn(move || {
      // Unwinding out of a rayon::spawn job aborts the process.
      match panic::catch_unwind(AssertUnwindSafe(|| plan.run())) {
        Ok(built) => {
          // The handle may already be gone; nobody wants the mesh then.
          let _ = sender.send(built);
        }
        Err(payload) => {
          tracing::error!(build = id.raw(), reason = panic_message(&*payload), "build panicked");
          drop(sender);
        }
      }
      pending.fetch_sub(1, Ordering::AcqRel);
    });

    tracing::debug!(build = id.raw(), kind = %request.kind, max_depth = request.max_depth, "build spawned");
    BuildHandle {
      id,
      request,
      receiver,
      consumed: false,
    }
  }

  /// Builds queued or running.
  pub fn pending_count(&self) -> usize {
    self.pending.load(Ordering::Acquire)
  }

  /// Worker threads in rayon's pool.
  pub fn num_threads(&self) -> usize {
    rayon::current_num_threads()
  }
}

/// Caller's side of one background build.
pub struct BuildHandle {
  id: BuildId,
  request: BuildRequest,
  receiver: Receiver<BuiltFractal>,
  consumed: bool,
}

impl BuildHandle {
  pub fn id(&self) -> BuildId {
    self.id
  }

  pub fn request(&self) -> &BuildRequest {
    &self.request
  }

  /// Non-blocking check for the result.
  ///
  /// Returns `None` while the build runs and after the result was taken.
  pub fn poll(&mut self) -> Option<Result<BuiltFractal>> {
    if self.consumed {
      return None;
    }
    let result = match self.receiver.try_recv() {
      Ok(built) => Ok(built),
      Err(TryRecvError::Empty) => return None,
      Err(TryRecvError::Disconnected) => Err(FractalError::BuildAborted),
    };
    self.consumed = true;
    Some(result)
  }

  /// Block until the build finishes.
  pub fn wait(self) -> Result<BuiltFractal> {
    if self.consumed {
      return Err(FractalError::BuildAborted);
    }
    self.receiver.recv().map_err(|_| FractalError::BuildAborted)
  }

  /// True once the mesh is waiting to be taken. An aborted build is only
  /// reported through `poll` and `wait`.
  pub fn is_finished(&self) -> bool {
    !self.consumed && !self.receiver.is_empty()
  }
}

impl std::fmt::Debug for BuildHandle {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("BuildHandle")
      .field("id", &self.id)
      .field("request", &self.request)
      .field("consumed", &self.consumed)
      .finish()
  }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
  payload
    .downcast_ref::<&str>()
    .copied()
    .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
    .unwrap_or("unknown panic")
}

#[cfg(test)]
#[path = "threading_test.rs"]
mod threading_test;
