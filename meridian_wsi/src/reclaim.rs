//! Deferred reclaimer
//!
//! Retired chain generations and synchronization objects are destroyed
//! only after a fence proves the display engine no longer references
//! them, never speculatively. Draining is opportunistic (zero-timeout
//! probes after every frame); only an unbounded backlog forces a wait.

use std::collections::VecDeque;

use crate::display::DisplayEngine;
use crate::types::{ChainHandle, FenceHandle, SemaphoreHandle};
use crate::wsi_warn;

/// Retired generations allowed to pile up before the oldest is
/// force-waited rather than probed.
pub const MAX_RETIRED_GENERATIONS: usize = 2;

/// Bound for a forced wait. A fence that misses this is logged and left
/// queued; only teardown waits unconditionally.
pub const FORCED_WAIT_TIMEOUT_NS: u64 = 1_000_000_000;

/// A retired chain generation. `fence` is the proof-of-retirement; `None`
/// means the retirement was preceded by an idle drain and the entry is
/// immediately destroyable, gated only by sync entries that still
/// reference the chain.
#[derive(Debug)]
pub struct RetiredGeneration {
    pub handle: ChainHandle,
    pub semaphores: Vec<SemaphoreHandle>,
    pub fence: Option<FenceHandle>,
}

/// Per-present retired synchronization objects (the consumed release
/// semaphore, and the acquire semaphore whose wait completed before it),
/// bundled with the present fence that proves both are unreferenced.
#[derive(Debug)]
pub struct RetiredSync {
    pub chain: ChainHandle,
    pub semaphores: Vec<SemaphoreHandle>,
    pub fence: Option<FenceHandle>,
}

/// Two queues: retired generations and retired per-present sync objects.
pub struct DeferredReclaimer {
    generations: VecDeque<RetiredGeneration>,
    syncs: VecDeque<RetiredSync>,
}

impl DeferredReclaimer {
    pub fn new() -> Self {
        Self {
            generations: VecDeque::new(),
            syncs: VecDeque::new(),
        }
    }

    pub fn retire_generation(&mut self, generation: RetiredGeneration) {
        self.generations.push_back(generation);
    }

    pub fn retire_sync(&mut self, sync: RetiredSync) {
        self.syncs.push_back(sync);
    }

    pub fn retired_generations(&self) -> usize {
        self.generations.len()
    }

    pub fn retired_syncs(&self) -> usize {
        self.syncs.len()
    }

    /// Opportunistic drain, called after every frame. Entries whose fence
    /// has signalled (zero-timeout probe) are destroyed immediately;
    /// others are kept, except that a backlog beyond
    /// [`MAX_RETIRED_GENERATIONS`] forces a bounded wait on the oldest.
    pub fn drain(&mut self, engine: &mut dyn DisplayEngine) {
        self.drain_syncs(engine);
        self.drain_generations(engine);

        while self.generations.len() > MAX_RETIRED_GENERATIONS {
            let oldest = match self.generations.pop_front() {
                Some(generation) => generation,
                None => break,
            };
            self.force_destroy_generation(engine, oldest);
        }
    }

    /// Teardown drain: every entry is waited on and destroyed before the
    /// owning device goes away.
    pub fn drain_all(&mut self, engine: &mut dyn DisplayEngine) {
        while let Some(sync) = self.syncs.pop_front() {
            wait_and_destroy_fence(engine, sync.fence);
            for semaphore in sync.semaphores {
                engine.destroy_semaphore(semaphore);
            }
        }
        while let Some(generation) = self.generations.pop_front() {
            wait_and_destroy_fence(engine, generation.fence);
            for semaphore in generation.semaphores {
                engine.destroy_semaphore(semaphore);
            }
            engine.destroy_chain(generation.handle);
        }
    }

    fn drain_syncs(&mut self, engine: &mut dyn DisplayEngine) {
        let mut remaining = VecDeque::new();
        while let Some(sync) = self.syncs.pop_front() {
            let ready = match sync.fence {
                Some(fence) => engine.fence_signalled(fence),
                None => true,
            };
            if ready {
                if let Some(fence) = sync.fence {
                    engine.destroy_fence(fence);
                }
                for semaphore in sync.semaphores {
                    engine.destroy_semaphore(semaphore);
                }
            } else {
                remaining.push_back(sync);
            }
        }
        self.syncs = remaining;
    }

    fn drain_generations(&mut self, engine: &mut dyn DisplayEngine) {
        let mut remaining = VecDeque::new();
        while let Some(generation) = self.generations.pop_front() {
            let fence_ready = match generation.fence {
                Some(fence) => engine.fence_signalled(fence),
                None => true,
            };
            // A chain is still referenced while any per-present sync entry
            // points at it; destroying it early would rip the semaphore out
            // from under the display engine.
            let referenced = self
                .syncs
                .iter()
                .any(|sync| sync.chain == generation.handle);
            if fence_ready && !referenced {
                if let Some(fence) = generation.fence {
                    engine.destroy_fence(fence);
                }
                for semaphore in generation.semaphores {
                    engine.destroy_semaphore(semaphore);
                }
                engine.destroy_chain(generation.handle);
            } else {
                remaining.push_back(generation);
            }
        }
        self.generations = remaining;
    }

    /// Bounded forced reclamation of one generation and every sync entry
    /// referencing it.
    fn force_destroy_generation(
        &mut self,
        engine: &mut dyn DisplayEngine,
        generation: RetiredGeneration,
    ) {
        let mut remaining = VecDeque::new();
        while let Some(sync) = self.syncs.pop_front() {
            if sync.chain != generation.handle {
                remaining.push_back(sync);
                continue;
            }
            wait_and_destroy_fence(engine, sync.fence);
            for semaphore in sync.semaphores {
                engine.destroy_semaphore(semaphore);
            }
        }
        self.syncs = remaining;

        wait_and_destroy_fence(engine, generation.fence);
        for semaphore in generation.semaphores {
            engine.destroy_semaphore(semaphore);
        }
        engine.destroy_chain(generation.handle);
    }
}

impl Default for DeferredReclaimer {
    fn default() -> Self {
        Self::new()
    }
}

fn wait_and_destroy_fence(engine: &mut dyn DisplayEngine, fence: Option<FenceHandle>) {
    if let Some(fence) = fence {
        if !engine.wait_fence(fence, FORCED_WAIT_TIMEOUT_NS) {
            wsi_warn!(
                "meridian::wsi",
                "Retired fence did not signal within the forced-wait bound"
            );
        }
        engine.destroy_fence(fence);
    }
}

#[cfg(test)]
#[path = "reclaim_tests.rs"]
mod tests;
