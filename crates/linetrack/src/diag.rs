//! Diagnostic observer hooks.
//!
//! Observability only: the engine notifies the observer at strategy changes,
//! fit failures, and merge decisions, and places no contract on what the
//! observer does with them. Methods take `&self`; observers that accumulate
//! use interior mutability.

use crate::candidate::SeedCandidate;
use crate::linefit::LineFitError;
use crate::strategy::SeedStrategy;

/// Observer of pattern-recognition decisions.
#[allow(unused_variables)]
pub trait Diagnostics {
    /// A new strategy pass is starting.
    fn strategy_started(&self, strategy: &SeedStrategy) {}

    /// A candidate fit failed; the branch is being discarded.
    fn fit_failed(&self, candidate: &SeedCandidate, error: &LineFitError) {}

    /// A candidate survived merge resolution; `removed` lists the inferior
    /// duplicates it displaced.
    fn merge_accepted(&self, candidate: &SeedCandidate, removed: &[SeedCandidate]) {}

    /// A candidate was rejected by merge resolution in favor of `kept`.
    fn merge_rejected(&self, candidate: &SeedCandidate, kept: &SeedCandidate) {}
}

/// No-op observer.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDiagnostics;

impl Diagnostics for NullDiagnostics {}
