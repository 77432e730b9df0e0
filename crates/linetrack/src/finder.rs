//! High-level track-finding API.
//!
//! [`TrackFinder`] is the primary entry point: it owns the fit adapter, the
//! merge policy, and an ordered list of validated strategies, and runs them
//! all against one event. Create once, find on many events.

use crate::adapter::{FitAdapter, MaterialModel, NoMaterial};
use crate::candidate::SeedCandidate;
use crate::diag::{Diagnostics, NullDiagnostics};
use crate::event::EventHits;
use crate::linefit::{LineFitter, WeightedLineFitter};
use crate::merge::Merger;
use crate::seeder::{SeedFilter, SeedFinder};
use crate::strategy::{SeedStrategy, StrategyError};

/// Primary track-finding interface.
///
/// Strategies are validated once at construction; a malformed strategy is a
/// configuration error and fails loudly before any event is processed.
pub struct TrackFinder<F = WeightedLineFitter, M = NoMaterial> {
    adapter: FitAdapter<F, M>,
    merger: Merger,
    strategies: Vec<SeedStrategy>,
}

impl TrackFinder<WeightedLineFitter, NoMaterial> {
    /// Create a finder with the default least-squares fitter and no material.
    pub fn new(strategies: Vec<SeedStrategy>) -> Result<Self, StrategyError> {
        Self::with_fitter(WeightedLineFitter, NoMaterial, strategies)
    }
}

impl<F: LineFitter, M: MaterialModel> TrackFinder<F, M> {
    /// Create a finder with a custom fitter and material model.
    pub fn with_fitter(
        fitter: F,
        material: M,
        strategies: Vec<SeedStrategy>,
    ) -> Result<Self, StrategyError> {
        for strategy in &strategies {
            strategy.validate()?;
        }
        Ok(Self {
            adapter: FitAdapter::new(fitter, material),
            merger: Merger::default(),
            strategies,
        })
    }

    /// Override the merge overlap threshold (default 1).
    pub fn set_max_overlap(&mut self, max_overlap: usize) {
        self.merger = Merger::new(max_overlap);
    }

    /// Configured strategies, in execution order.
    pub fn strategies(&self) -> &[SeedStrategy] {
        &self.strategies
    }

    /// Find track candidates in one event.
    ///
    /// Runs every strategy in order against a fresh running list, so each
    /// call starts from a clean per-event state. The returned candidates are
    /// the survivors of merge resolution, ready for an external track sink.
    pub fn find(&self, event: &EventHits, field: f64) -> Vec<SeedCandidate> {
        self.find_with_hooks(event, field, None, &NullDiagnostics)
    }

    /// [`find`](Self::find) with an optional seed pre-filter and a
    /// diagnostics observer.
    pub fn find_with_hooks(
        &self,
        event: &EventHits,
        field: f64,
        filter: Option<&dyn SeedFilter>,
        diag: &dyn Diagnostics,
    ) -> Vec<SeedCandidate> {
        let mut found: Vec<SeedCandidate> = Vec::new();
        for strategy in &self.strategies {
            tracing::debug!(strategy = %strategy.name, "starting strategy pass");
            diag.strategy_started(strategy);
            let seeder = SeedFinder::new(event, &self.adapter, &self.merger, filter, diag);
            let accepted = seeder.find_tracks(strategy, field, &mut found);
            tracing::debug!(
                strategy = %strategy.name,
                accepted,
                n_candidates = found.len(),
                "strategy pass finished"
            );
        }
        found
    }
}
