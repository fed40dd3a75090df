//! Lager resource: the idle/pending/success/failure lifecycle.
//!
//! One `Resource<T>` per asynchronously loaded thing (auth session, bulk
//! inventory load, demo fetch). Instances are independent and never share
//! state. A start signal moves any settled phase to pending and clears the
//! stale error; only a completion moves pending to success or failure.
//!
//! By default completions are applied in completion order: a slow response
//! landing after a newer start overwrites it, exactly like the reference
//! behavior. `with_stale_guard` tags each start with a generation and
//! discards completions from superseded starts instead.

#![forbid(unsafe_code)]

use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Pending,
    Success,
    Failure,
}

/// Opaque token handed out by `begin` and checked (only under the stale
/// guard) when the matching completion arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generation(u64);

#[derive(Debug)]
pub struct Resource<T> {
    phase: Phase,
    data: Option<T>,
    error: Option<String>,
    generation: u64,
    stale_guard: bool,
}

impl<T> Default for Resource<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Resource<T> {
    pub fn new() -> Self {
        Self { phase: Phase::Idle, data: None, error: None, generation: 0, stale_guard: false }
    }

    /// Discard completions whose start was superseded by a newer `begin`.
    pub fn with_stale_guard() -> Self {
        Self { stale_guard: true, ..Self::new() }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_pending(&self) -> bool {
        self.phase == Phase::Pending
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Start signal: idle, success and failure all move to pending (retry
    /// needs no reset), clearing any stale error. Beginning while already
    /// pending supersedes the in-flight start; callers are expected to
    /// disable their triggering control instead of relying on this.
    pub fn begin(&mut self) -> Generation {
        self.phase = Phase::Pending;
        self.error = None;
        self.generation += 1;
        Generation(self.generation)
    }

    /// Completion: pending → success. Ignored (returns false) when the
    /// resource is not pending, or when the stale guard rejects a
    /// superseded generation.
    pub fn succeed(&mut self, gen: Generation, payload: T) -> bool {
        if !self.accepts(gen) {
            return false;
        }
        self.phase = Phase::Success;
        self.data = Some(payload);
        self.error = None;
        true
    }

    /// Completion: pending → failure with an error message.
    pub fn fail(&mut self, gen: Generation, error: impl Into<String>) -> bool {
        if !self.accepts(gen) {
            return false;
        }
        self.phase = Phase::Failure;
        self.error = Some(error.into());
        true
    }

    /// Back to idle, dropping payload and error (e.g. logout).
    pub fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.data = None;
        self.error = None;
    }

    fn accepts(&self, gen: Generation) -> bool {
        if self.phase != Phase::Pending {
            debug!(phase = ?self.phase, "resource: completion ignored, not pending");
            return false;
        }
        if self.stale_guard && gen.0 != self.generation {
            debug!(got = gen.0, current = self.generation, "resource: stale completion discarded");
            return false;
        }
        true
    }
}
