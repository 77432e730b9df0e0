//! Track candidate aggregate grown by the pattern recognition.

use std::collections::{HashMap, VecDeque};

use crate::hit::{Hit, HitId};
use crate::linefit::LineFit;
use crate::strategy::SeedLayer;

/// A track candidate: an ordered, duplicate-free set of hits, the queue of
/// layers still to be explored, the latest fit, and per-hit scattering-angle
/// annotations.
///
/// Candidates are cloned on growth (copy-on-add children), so all state is
/// by value. The unchecked-layer queue only shrinks once loaded for a search;
/// a popped layer is never reconsidered for that candidate.
#[derive(Debug, Clone)]
pub struct SeedCandidate {
    hits: Vec<Hit>,
    unchecked: VecDeque<SeedLayer>,
    fit: Option<LineFit>,
    scatter_angles: HashMap<HitId, f64>,
}

impl SeedCandidate {
    /// Create a candidate from the three seed hits.
    pub fn from_seed(h1: Hit, h2: Hit, h3: Hit) -> Self {
        Self {
            hits: vec![h1, h2, h3],
            unchecked: VecDeque::new(),
            fit: None,
            scatter_angles: HashMap::new(),
        }
    }

    /// Attached hits in attachment order.
    pub fn hits(&self) -> &[Hit] {
        &self.hits
    }

    /// Number of attached hits.
    pub fn n_hits(&self) -> usize {
        self.hits.len()
    }

    /// Whether a hit with this identity key is attached.
    pub fn has_hit(&self, id: HitId) -> bool {
        self.hits.iter().any(|h| h.id == id)
    }

    /// Attach a hit; duplicate identities are ignored. Returns whether the
    /// hit was added.
    pub fn add_hit(&mut self, hit: Hit) -> bool {
        if self.has_hit(hit.id) {
            return false;
        }
        self.hits.push(hit);
        true
    }

    /// Replace the queue of layers still to be explored.
    pub fn set_unchecked_layers<I: IntoIterator<Item = SeedLayer>>(&mut self, layers: I) {
        self.unchecked = layers.into_iter().collect();
    }

    /// Layers still to be explored, in exploration order.
    pub fn unchecked_layers(&self) -> impl Iterator<Item = SeedLayer> + '_ {
        self.unchecked.iter().copied()
    }

    /// Number of layers still to be explored.
    pub fn n_unchecked(&self) -> usize {
        self.unchecked.len()
    }

    /// Pop the next layer to explore.
    pub fn next_layer(&mut self) -> Option<SeedLayer> {
        self.unchecked.pop_front()
    }

    /// Upper bound on the hit count this candidate can still reach.
    pub fn max_achievable_hits(&self) -> usize {
        self.hits.len() + self.unchecked.len()
    }

    /// Most recent fit, if any.
    pub fn fit(&self) -> Option<&LineFit> {
        self.fit.as_ref()
    }

    /// Attach a fit, replacing any previous one wholesale.
    pub fn set_fit(&mut self, fit: LineFit) {
        self.fit = Some(fit);
    }

    /// Total chi-square of the latest fit; infinite when unfitted so an
    /// unfitted candidate never wins a quality comparison.
    pub fn chisq_total(&self) -> f64 {
        self.fit.as_ref().map_or(f64::INFINITY, LineFit::chisq_total)
    }

    /// Stored scattering-angle annotation for a hit.
    pub fn scatter_angle(&self, id: HitId) -> Option<f64> {
        self.scatter_angles.get(&id).copied()
    }

    /// Store a scattering-angle annotation for a hit.
    pub fn set_scatter_angle(&mut self, id: HitId, angle: f64) {
        self.scatter_angles.insert(id, angle);
    }

    /// Whether any scattering annotations have been computed yet; false only
    /// before the first successful fit.
    pub fn has_scatter_angles(&self) -> bool {
        !self.scatter_angles.is_empty()
    }
}
