//! Duplicate resolution between hit-sharing track candidates.
//!
//! Two candidates are duplicates when they share strictly more than
//! `max_overlap` hits by identity key. Of two duplicates only the better one
//! survives: hit count dominates, equal hit counts resolve by strictly lower
//! total chi-square.

use crate::candidate::SeedCandidate;
use crate::diag::Diagnostics;

/// Merge policy for the running candidate list.
#[derive(Debug, Clone, Copy)]
pub struct Merger {
    /// Largest tolerated shared-hit count; sharing more makes a duplicate.
    pub max_overlap: usize,
}

impl Default for Merger {
    fn default() -> Self {
        Self { max_overlap: 1 }
    }
}

impl Merger {
    /// Create a merger with the given overlap threshold.
    pub fn new(max_overlap: usize) -> Self {
        Self { max_overlap }
    }

    /// Number of hits present in both candidates, by identity key.
    pub fn shared_hits(a: &SeedCandidate, b: &SeedCandidate) -> usize {
        a.hits().iter().filter(|h| b.has_hit(h.id)).count()
    }

    /// Whether the candidates share strictly more than `max_overlap` hits.
    pub fn is_duplicate(&self, a: &SeedCandidate, b: &SeedCandidate) -> bool {
        Self::shared_hits(a, b) > self.max_overlap
    }

    /// Whether `new` beats `old`: more hits always wins; equal hit counts
    /// resolve by strictly lower total chi-square; fewer hits never wins.
    pub fn is_better(new: &SeedCandidate, old: &SeedCandidate) -> bool {
        match new.n_hits().cmp(&old.n_hits()) {
            std::cmp::Ordering::Greater => true,
            std::cmp::Ordering::Less => false,
            std::cmp::Ordering::Equal => new.chisq_total() < old.chisq_total(),
        }
    }

    /// Resolve `candidate` against the running list.
    ///
    /// Scans the list; the first duplicate that `candidate` does not beat
    /// rejects it outright and stops the scan, even if a later entry is
    /// inferior and would have been removable. This short-circuit is
    /// deliberately kept order-dependent; downstream consumers rely on the
    /// observed behavior. If no duplicate rejects it, all inferior duplicates
    /// are removed and `candidate` is inserted. Returns whether it survived.
    pub fn merge(
        &self,
        list: &mut Vec<SeedCandidate>,
        candidate: SeedCandidate,
        diag: &dyn Diagnostics,
    ) -> bool {
        let mut marked: Vec<usize> = Vec::new();
        for (index, entry) in list.iter().enumerate() {
            if !self.is_duplicate(&candidate, entry) {
                continue;
            }
            if Self::is_better(&candidate, entry) {
                marked.push(index);
            } else {
                tracing::debug!(
                    cand_hits = candidate.n_hits(),
                    cand_chisq = candidate.chisq_total(),
                    kept_hits = entry.n_hits(),
                    kept_chisq = entry.chisq_total(),
                    "candidate rejected by merge"
                );
                diag.merge_rejected(&candidate, entry);
                return false;
            }
        }

        let mut removed: Vec<SeedCandidate> = Vec::with_capacity(marked.len());
        for index in marked.into_iter().rev() {
            removed.push(list.remove(index));
        }
        if !removed.is_empty() {
            tracing::debug!(
                n_removed = removed.len(),
                cand_hits = candidate.n_hits(),
                "candidate displaced inferior duplicates"
            );
        }
        diag.merge_accepted(&candidate, &removed);
        list.push(candidate);
        true
    }
}
