//! Shared helpers for end-to-end track-finding tests.

use linetrack::{EventHits, Hit, HitId, LayerId, LayerRole, SeedLayer, SeedStrategy};
use nalgebra::Point3;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

/// Measurement uncertainty assigned to generated hits.
pub const SIGMA: f64 = 0.01;

/// z position of a layer: 10, 20, ... along the beam axis.
pub fn layer_z(layer: u32) -> f64 {
    10.0 * (layer + 1) as f64
}

/// True trajectory used throughout: x = 2z + 1, y = -0.5z + 3.
pub fn truth_at(z: f64) -> (f64, f64) {
    (2.0 * z + 1.0, -0.5 * z + 3.0)
}

/// Six-layer strategy: seed on layers 0-2, confirm on 3, extend on 4-5.
pub fn six_layer_strategy() -> SeedStrategy {
    SeedStrategy::new(
        "six-layer",
        vec![
            SeedLayer::new(LayerId(0), LayerRole::Seed),
            SeedLayer::new(LayerId(1), LayerRole::Seed),
            SeedLayer::new(LayerId(2), LayerRole::Seed),
            SeedLayer::new(LayerId(3), LayerRole::Confirm),
            SeedLayer::new(LayerId(4), LayerRole::Extend),
            SeedLayer::new(LayerId(5), LayerRole::Extend),
        ],
    )
}

/// One hit per layer on the true line, displaced by the given (dx, dy) per
/// layer.
pub fn line_event_with_offsets(offsets: &[(f64, f64)]) -> EventHits {
    let mut event = EventHits::new();
    for (layer, &(dx, dy)) in offsets.iter().enumerate() {
        let z = layer_z(layer as u32);
        let (x, y) = truth_at(z);
        event.add_hit(Hit::with_sigma(
            HitId(layer as u64 + 1),
            LayerId(layer as u32),
            Point3::new(x + dx, y + dy, z),
            SIGMA,
        ));
    }
    event
}

/// One hit per layer on the true line, smeared with Gaussian noise of width
/// `noise` in x and y. `rng_seed` makes the event reproducible.
pub fn noisy_line_event(n_layers: u32, noise: f64, rng_seed: u64) -> EventHits {
    let mut rng = StdRng::seed_from_u64(rng_seed);
    let smear = Normal::new(0.0, noise).expect("valid normal");
    let mut event = EventHits::new();
    for layer in 0..n_layers {
        let z = layer_z(layer);
        let (x, y) = truth_at(z);
        event.add_hit(Hit::with_sigma(
            HitId(layer as u64 + 1),
            LayerId(layer),
            Point3::new(x + smear.sample(&mut rng), y + smear.sample(&mut rng), z),
            SIGMA,
        ));
    }
    event
}
