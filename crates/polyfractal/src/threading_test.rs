use std::time::Duration;

use super::*;
use crate::build::BuildConfig;
use crate::kind::FractalKind;

fn plan(kind: FractalKind, max_depth: u32) -> BuildPlan {
  let request = BuildRequest::default().with_kind(kind).with_max_depth(max_depth);
  BuildPlan::new(request, &BuildConfig::default()).unwrap()
}

fn handle_with(receiver: Receiver<BuiltFractal>) -> BuildHandle {
  BuildHandle {
    id: BuildId::next(),
    request: BuildRequest::default(),
    receiver,
    consumed: false,
  }
}

#[test]
fn test_spawn_and_poll() {
  let executor = BuildExecutor::new();
  let mut handle = executor.spawn(plan(FractalKind::Pyramid, 2));

  let mut result = None;
  for _ in 0..5000 {
    if let Some(r) = handle.poll() {
      result = Some(r);
      break;
    }
    std::thread::sleep(Duration::from_millis(1));
  }

  let built = result.expect("build did not finish in time").unwrap();
  assert_eq!(built.stats.leaves, 25);
  assert!(handle.poll().is_none(), "result is handed out once");
}

#[test]
fn test_wait_blocks_for_result() {
  let executor = BuildExecutor::new();
  let handle = executor.spawn(plan(FractalKind::InverseTetrahedron, 3));
  assert_eq!(handle.request().kind, FractalKind::InverseTetrahedron);

  let built = handle.wait().unwrap();
  assert_eq!(built.stats.leaves, 85);
}

#[test]
fn test_many_builds_keep_their_own_results() {
  let executor = BuildExecutor::new();
  let handles: Vec<_> = (0..6u32)
    .map(|depth| executor.spawn(plan(FractalKind::Tetrahedron, depth)))
    .collect();

  for (depth, handle) in handles.into_iter().enumerate() {
    let built = handle.wait().unwrap();
    assert_eq!(built.max_depth, depth as u32);
    assert_eq!(built.stats.leaves, 4u32.pow(depth as u32));
  }
}

#[test]
fn test_dropped_sender_is_an_abort() {
  let (sender, receiver) = crossbeam_channel::bounded(1);
  let mut handle = handle_with(receiver);
  assert!(handle.poll().is_none());
  assert!(!handle.is_finished());

  drop(sender);
  assert!(matches!(handle.poll(), Some(Err(FractalError::BuildAborted))));
  assert!(handle.poll().is_none());
}

#[test]
fn test_wait_on_dropped_sender_is_an_abort() {
  let (sender, receiver) = crossbeam_channel::bounded::<BuiltFractal>(1);
  drop(sender);
  assert!(matches!(handle_with(receiver).wait(), Err(FractalError::BuildAborted)));
}

fn wait_until_idle(executor: &BuildExecutor) {
  for _ in 0..5000 {
    if executor.pending_count() == 0 {
      return;
    }
    std::thread::sleep(Duration::from_millis(1));
  }
  panic!("{} builds still pending", executor.pending_count());
}

#[test]
fn test_barrier_that_never_fires_aborts_build() {
  let executor = BuildExecutor::new();
  // Four leaves are posted, five are awaited.
  let handle = executor.spawn(plan(FractalKind::Tetrahedron, 1).with_expected_count(5));
  assert!(matches!(handle.wait(), Err(FractalError::BuildAborted)));
  wait_until_idle(&executor);
}

#[test]
fn test_post_after_barrier_aborts_build() {
  let executor = BuildExecutor::new();
  // The barrier fires on the third leaf; the fourth post is a defect.
  let mut handle = executor.spawn(plan(FractalKind::Tetrahedron, 1).with_expected_count(3));

  let mut result = None;
  for _ in 0..5000 {
    if let Some(r) = handle.poll() {
      result = Some(r);
      break;
    }
    std::thread::sleep(Duration::from_millis(1));
  }
  assert!(matches!(result, Some(Err(FractalError::BuildAborted))));
  wait_until_idle(&executor);

  // The pool survives and keeps serving builds.
  let built = executor.spawn(plan(FractalKind::Tetrahedron, 1)).wait().unwrap();
  assert_eq!(built.stats.leaves, 4);
}

#[test]
fn test_build_ids_are_unique() {
  let a = BuildId::next();
  let b = BuildId::next();
  assert_ne!(a, b);
  assert!(b.raw() > a.raw());
}

#[test]
fn test_default_threads() {
  assert!(BuildExecutor::new().num_threads() >= 1);
}
