use super::*;
use crate::mock_engine::MockDisplayEngine;
use crate::types::{ChainHandle, SemaphoreHandle};

fn retired_chain(engine: &mut MockDisplayEngine, signalled: bool) -> RetiredGeneration {
    let fence = engine.create_fence().expect("fence");
    if !signalled {
        engine.pending_fences.push(fence);
    }
    RetiredGeneration {
        handle: ChainHandle(1000 + engine.pending_fences.len() as u64),
        semaphores: vec![engine.create_semaphore().expect("semaphore")],
        fence: Some(fence),
    }
}

#[test]
fn test_signalled_entries_are_destroyed_on_drain() {
    let mut engine = MockDisplayEngine::new();
    let mut reclaimer = DeferredReclaimer::new();

    let generation = retired_chain(&mut engine, true);
    let handle = generation.handle;
    reclaimer.retire_generation(generation);

    reclaimer.drain(&mut engine);
    assert_eq!(reclaimer.retired_generations(), 0);
    assert_eq!(engine.destroyed_chains, vec![handle]);
    assert_eq!(engine.live_semaphores, 0);
    assert_eq!(engine.live_fences, 0);
    assert_eq!(engine.forced_fence_waits, 0);
}

#[test]
fn test_unsignalled_entries_are_kept() {
    let mut engine = MockDisplayEngine::new();
    let mut reclaimer = DeferredReclaimer::new();

    reclaimer.retire_generation(retired_chain(&mut engine, false));
    reclaimer.drain(&mut engine);

    assert_eq!(reclaimer.retired_generations(), 1);
    assert!(engine.destroyed_chains.is_empty());
}

#[test]
fn test_backlog_beyond_two_forces_a_wait() {
    let mut engine = MockDisplayEngine::new();
    let mut reclaimer = DeferredReclaimer::new();

    for _ in 0..MAX_RETIRED_GENERATIONS + 1 {
        reclaimer.retire_generation(retired_chain(&mut engine, false));
    }
    reclaimer.drain(&mut engine);

    // The oldest was force-waited and destroyed; the bound holds.
    assert!(engine.forced_fence_waits >= 1);
    assert_eq!(reclaimer.retired_generations(), MAX_RETIRED_GENERATIONS);
    assert_eq!(engine.destroyed_chains.len(), 1);
}

#[test]
fn test_generation_waits_for_referencing_syncs() {
    let mut engine = MockDisplayEngine::new();
    let mut reclaimer = DeferredReclaimer::new();

    let chain = ChainHandle(7);
    let pending = engine.create_fence().expect("fence");
    engine.pending_fences.push(pending);
    reclaimer.retire_sync(RetiredSync {
        chain,
        semaphores: vec![engine.create_semaphore().expect("semaphore")],
        fence: Some(pending),
    });
    reclaimer.retire_generation(RetiredGeneration {
        handle: chain,
        semaphores: Vec::new(),
        fence: None,
    });

    // The sync entry still references the chain: the generation must stay.
    reclaimer.drain(&mut engine);
    assert_eq!(reclaimer.retired_generations(), 1);
    assert!(engine.destroyed_chains.is_empty());

    // Once the present fence signals, both go.
    engine.pending_fences.clear();
    reclaimer.drain(&mut engine);
    assert_eq!(reclaimer.retired_generations(), 0);
    assert_eq!(reclaimer.retired_syncs(), 0);
    assert_eq!(engine.destroyed_chains, vec![chain]);
}

#[test]
fn test_fenceless_entries_are_immediately_reclaimable() {
    let mut engine = MockDisplayEngine::new();
    let mut reclaimer = DeferredReclaimer::new();

    reclaimer.retire_sync(RetiredSync {
        chain: ChainHandle(3),
        semaphores: vec![SemaphoreHandle(11), SemaphoreHandle(12)],
        fence: None,
    });
    reclaimer.drain(&mut engine);
    assert_eq!(reclaimer.retired_syncs(), 0);
}

#[test]
fn test_teardown_drains_everything_unconditionally() {
    let mut engine = MockDisplayEngine::new();
    let mut reclaimer = DeferredReclaimer::new();

    reclaimer.retire_generation(retired_chain(&mut engine, false));
    reclaimer.retire_generation(retired_chain(&mut engine, false));
    let pending = engine.create_fence().expect("fence");
    engine.pending_fences.push(pending);
    reclaimer.retire_sync(RetiredSync {
        chain: ChainHandle(1),
        semaphores: vec![engine.create_semaphore().expect("semaphore")],
        fence: Some(pending),
    });

    reclaimer.drain_all(&mut engine);
    assert_eq!(reclaimer.retired_generations(), 0);
    assert_eq!(reclaimer.retired_syncs(), 0);
    assert_eq!(engine.live_semaphores, 0);
    assert_eq!(engine.live_fences, 0);
    assert_eq!(engine.destroyed_chains.len(), 2);
}
