//! Seed generation: triplet enumeration over the three Seed-role layers.
//!
//! The enumeration is the full O(n1*n2*n3) triple-nested loop; cheap external
//! pre-filters run in increasing cost order (pair check before the full
//! triple) to prune combinations before any numerical fit is attempted.

use crate::adapter::{FitAdapter, FitBudget, MaterialModel};
use crate::candidate::SeedCandidate;
use crate::diag::Diagnostics;
use crate::event::EventHits;
use crate::growth::GrowthSearch;
use crate::hit::Hit;
use crate::linefit::LineFitter;
use crate::merge::Merger;
use crate::strategy::SeedStrategy;

/// Cheap compatibility pre-filter, called before expensive fits.
///
/// Both checks default to accepting everything.
#[allow(unused_variables)]
pub trait SeedFilter {
    /// Pairwise compatibility of two seed hits; called before the third loop.
    fn check_pair(&self, h1: &Hit, h2: &Hit) -> bool {
        true
    }

    /// Full-triple check on the assembled (unfitted) seed candidate.
    fn check_seed(&self, candidate: &SeedCandidate) -> bool {
        true
    }
}

/// Seed generator for one event and strategy pass.
pub struct SeedFinder<'a, F, M> {
    hits: &'a EventHits,
    adapter: &'a FitAdapter<F, M>,
    merger: &'a Merger,
    filter: Option<&'a dyn SeedFilter>,
    diag: &'a dyn Diagnostics,
}

impl<'a, F: LineFitter, M: MaterialModel> SeedFinder<'a, F, M> {
    /// Create a seed finder over the event's hits.
    pub fn new(
        hits: &'a EventHits,
        adapter: &'a FitAdapter<F, M>,
        merger: &'a Merger,
        filter: Option<&'a dyn SeedFilter>,
        diag: &'a dyn Diagnostics,
    ) -> Self {
        Self {
            hits,
            adapter,
            merger,
            filter,
            diag,
        }
    }

    /// Run one strategy pass.
    ///
    /// Accepted candidates are merged into `found`, which is owned by the
    /// caller for the whole event so later seed triples and later strategies
    /// compete against candidates already accepted. Returns true iff at least
    /// one candidate was accepted during this call.
    ///
    /// The strategy must have been validated at load time; an invalid one is
    /// skipped with an error log.
    pub fn find_tracks(
        &self,
        strategy: &SeedStrategy,
        field: f64,
        found: &mut Vec<SeedCandidate>,
    ) -> bool {
        let Some([l1, l2, l3]) = strategy.seed_layers() else {
            tracing::error!(
                strategy = %strategy.name,
                "strategy lacks three seed layers; validate strategies at load time"
            );
            return false;
        };

        let growth = GrowthSearch::new(self.hits, self.adapter, self.merger, self.diag);
        let mut budget = FitBudget::new(strategy.max_fits);
        let mut confirmed: Vec<SeedCandidate> = Vec::new();
        let mut accepted = false;

        for h1 in self.hits.hits_for_layer(l1.layer) {
            for h2 in self.hits.hits_for_layer(l2.layer) {
                if let Some(filter) = self.filter {
                    if !filter.check_pair(h1, h2) {
                        continue;
                    }
                }
                for h3 in self.hits.hits_for_layer(l3.layer) {
                    let mut seed = SeedCandidate::from_seed(h1.clone(), h2.clone(), h3.clone());
                    if let Some(filter) = self.filter {
                        if !filter.check_seed(&seed) {
                            continue;
                        }
                    }
                    if !budget.try_consume() {
                        continue;
                    }
                    if let Err(err) = self.adapter.fit_candidate(&mut seed, strategy, field) {
                        tracing::trace!(error = %err, "seed fit failed");
                        self.diag.fit_failed(&seed, &err);
                        continue;
                    }

                    confirmed.clear();
                    if growth.confirm(seed, strategy, field, &mut budget, &mut confirmed) {
                        for variant in confirmed.drain(..) {
                            accepted |=
                                growth.extend(variant, strategy, field, &mut budget, found);
                        }
                    }
                }
            }
        }
        accepted
    }
}
