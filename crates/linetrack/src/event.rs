//! Per-event hit source, queryable by layer.
//!
//! [`EventHits`] owns the hits of one event keyed by layer. The engine keeps
//! no per-event state of its own; callers fill a fresh `EventHits` (or
//! [`clear`](EventHits::clear) a reused one) before each pass.

use std::collections::HashMap;

use crate::hit::{Hit, LayerId};

/// Hits of a single event, grouped by detector layer.
///
/// Within a layer, hits keep their insertion order.
#[derive(Debug, Clone, Default)]
pub struct EventHits {
    layers: HashMap<LayerId, Vec<Hit>>,
}

impl EventHits {
    /// Create an empty event.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one hit to its owning layer.
    pub fn add_hit(&mut self, hit: Hit) {
        self.layers.entry(hit.layer).or_default().push(hit);
    }

    /// Hits recorded on `layer`, empty if the layer saw none.
    pub fn hits_for_layer(&self, layer: LayerId) -> &[Hit] {
        self.layers.get(&layer).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of hits on `layer`.
    pub fn layer_hit_count(&self, layer: LayerId) -> usize {
        self.hits_for_layer(layer).len()
    }

    /// Total number of hits in the event.
    pub fn n_hits(&self) -> usize {
        self.layers.values().map(Vec::len).sum()
    }

    /// Drop all hits; reuse the allocation for the next event.
    pub fn clear(&mut self) {
        self.layers.clear();
    }
}
