//! Confirm/extend growth search.
//!
//! One worklist algorithm serves both phases. Confirm requires at least
//! `min_confirm` hits from a small designated layer set on top of the three
//! seed hits and collects every qualifying variant; Extend sweeps the
//! remaining layers and resolves each finished candidate against the running
//! list through the [`Merger`].
//!
//! The search is an explicit LIFO worklist, not recursion: working-set memory
//! is bounded by the number of in-flight partial candidates, not call depth.

use crate::adapter::{FitAdapter, FitBudget, MaterialModel};
use crate::candidate::SeedCandidate;
use crate::diag::Diagnostics;
use crate::event::EventHits;
use crate::hit::Hit;
use crate::linefit::LineFitter;
use crate::merge::Merger;
use crate::strategy::{LayerRole, SeedLayer, SeedStrategy};

/// Growth phase selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Task {
    Confirm,
    Extend,
}

/// Running quality bound: (hit count, total chi-square) of the best terminal
/// candidate that shares hits with the search's input seed.
type Bound = (usize, f64);

/// Generic confirm/extend engine over one event.
pub struct GrowthSearch<'a, F, M> {
    hits: &'a EventHits,
    adapter: &'a FitAdapter<F, M>,
    merger: &'a Merger,
    diag: &'a dyn Diagnostics,
}

impl<'a, F: LineFitter, M: MaterialModel> GrowthSearch<'a, F, M> {
    /// Create a growth engine over the event's hits.
    pub fn new(
        hits: &'a EventHits,
        adapter: &'a FitAdapter<F, M>,
        merger: &'a Merger,
        diag: &'a dyn Diagnostics,
    ) -> Self {
        Self {
            hits,
            adapter,
            merger,
            diag,
        }
    }

    /// Try to confirm a fitted seed.
    ///
    /// Qualifying variants (at least `min_confirm` Confirm-role hits added)
    /// are appended to `confirmed`. Returns whether any variant qualified.
    pub fn confirm(
        &self,
        mut seed: SeedCandidate,
        strategy: &SeedStrategy,
        field: f64,
        budget: &mut FitBudget,
        confirmed: &mut Vec<SeedCandidate>,
    ) -> bool {
        seed.set_unchecked_layers(strategy.layers_for(LayerRole::Confirm));
        self.run(seed, Task::Confirm, strategy, field, budget, confirmed)
    }

    /// Grow a confirmed seed across the Extend-role layers.
    ///
    /// Finished candidates are resolved against `found` in place; `found` is
    /// single-writer for the whole pass. Returns whether any candidate
    /// survived merge resolution.
    pub fn extend(
        &self,
        mut seed: SeedCandidate,
        strategy: &SeedStrategy,
        field: f64,
        budget: &mut FitBudget,
        found: &mut Vec<SeedCandidate>,
    ) -> bool {
        seed.set_unchecked_layers(strategy.layers_for(LayerRole::Extend));
        self.run(seed, Task::Extend, strategy, field, budget, found)
    }

    fn run(
        &self,
        seed: SeedCandidate,
        task: Task,
        strategy: &SeedStrategy,
        field: f64,
        budget: &mut FitBudget,
        result: &mut Vec<SeedCandidate>,
    ) -> bool {
        let min_hits = match task {
            Task::Confirm => strategy.min_confirm + 3,
            Task::Extend => strategy.min_hits,
        };

        // Seed the quality bound from already-found candidates that share
        // hits with the input seed.
        let mut best: Option<Bound> = None;
        for entry in result.iter() {
            if self.merger.is_duplicate(&seed, entry) {
                best = Self::better_bound(best, (entry.n_hits(), entry.chisq_total()));
            }
        }

        // Explore sparse layers first so the bound tightens early.
        let mut layers: Vec<SeedLayer> = seed.unchecked_layers().collect();
        layers.sort_by_key(|l| self.hits.layer_hit_count(l.layer));
        let mut seed = seed;
        seed.set_unchecked_layers(layers);

        let mut accepted = false;
        let mut worklist: Vec<SeedCandidate> = vec![seed];
        while let Some(mut cand) = worklist.pop() {
            let possible = cand.max_achievable_hits();
            if possible < min_hits {
                continue;
            }

            if let Some((best_hits, best_chisq)) = best {
                let chisq = cand.chisq_total();
                if possible + 1 < best_hits {
                    continue;
                }
                if possible == best_hits && chisq >= best_chisq {
                    continue;
                }
                // One layer short of the bound is tolerable only if the fit
                // is markedly better.
                if possible + 1 == best_hits && chisq > best_chisq - strategy.bad_hit_chisq {
                    continue;
                }
            }

            let Some(layer) = cand.next_layer() else {
                // No layers left: the minimum-hit test already passed above.
                match task {
                    Task::Confirm => {
                        result.push(cand);
                        accepted = true;
                    }
                    Task::Extend => {
                        let stats = (cand.n_hits(), cand.chisq_total());
                        if self.merger.merge(result, cand, self.diag) {
                            accepted = true;
                            best = Self::better_bound(best, stats);
                        }
                    }
                }
                continue;
            };

            let parent_chisq = cand.chisq_total();
            let mut best_child_chisq = f64::INFINITY;

            // Closest hits first: good branches surface sooner.
            let mut layer_hits: Vec<&Hit> = self.hits.hits_for_layer(layer.layer).iter().collect();
            if let Some(fit) = cand.fit() {
                layer_hits.sort_by(|a, b| {
                    let da = fit.transverse_distance(a.position.x, a.position.y, a.position.z);
                    let db = fit.transverse_distance(b.position.x, b.position.y, b.position.z);
                    da.total_cmp(&db)
                });
            }

            for hit in layer_hits {
                let mut child = cand.clone();
                if !child.add_hit(hit.clone()) {
                    continue;
                }
                if !budget.try_consume() {
                    break;
                }
                match self.adapter.fit_candidate(&mut child, strategy, field) {
                    Ok(()) => {
                        best_child_chisq = best_child_chisq.min(child.chisq_total());
                        worklist.push(child);
                    }
                    Err(err) => {
                        tracing::trace!(error = %err, layer = layer.layer.0, "growth fit failed");
                        self.diag.fit_failed(&child, &err);
                    }
                }
            }

            // If no hit on this layer improved the fit by more than
            // bad_hit_chisq, keep the parent alive without the layer: one
            // missing or bad hit is forgiven.
            if best_child_chisq - parent_chisq > strategy.bad_hit_chisq {
                worklist.push(cand);
            }
        }
        accepted
    }

    fn better_bound(current: Option<Bound>, trial: Bound) -> Option<Bound> {
        match current {
            None => Some(trial),
            Some(cur) => {
                let better = trial.0 > cur.0 || (trial.0 == cur.0 && trial.1 < cur.1);
                Some(if better { trial } else { cur })
            }
        }
    }
}
