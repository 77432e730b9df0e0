//! End-to-end track-finding scenarios.

mod common;

use std::cell::Cell;
use std::rc::Rc;

use common::{layer_z, line_event_with_offsets, noisy_line_event, six_layer_strategy, SIGMA};
use linetrack::{
    FitPoint, Hit, HitId, LayerId, LineFit, LineFitError, LineFitter, NoMaterial, TrackFinder,
    WeightedLineFitter,
};

/// One recorded draw of Gaussian noise with sigma 0.01, per layer (dx, dy).
const SMEAR: [(f64, f64); 6] = [
    (-0.005652, -0.011753),
    (-0.000914, 0.007863),
    (-0.007402, 0.002499),
    (-0.007041, 0.005640),
    (-0.009766, -0.001707),
    (-0.000462, -0.002985),
];

#[test]
fn single_noisy_track_is_found_exactly_once() {
    let event = line_event_with_offsets(&SMEAR);
    let finder = TrackFinder::new(vec![six_layer_strategy()]).expect("valid strategy");

    let found = finder.find(&event, 0.0);
    assert_eq!(found.len(), 1, "exactly one candidate must be accepted");

    let track = &found[0];
    assert_eq!(track.n_hits(), 6, "all six hits belong to the track");
    let fit = track.fit().expect("accepted candidate carries a fit");
    let chisq_per_dof = fit.chisq_total() / fit.ndf_total() as f64;
    assert!(
        chisq_per_dof < 2.0,
        "chi-square/dof must be reasonable, got {}",
        chisq_per_dof
    );
    // Fitted slopes close to truth.
    assert!((fit.dxdz - 2.0).abs() < 0.01, "dxdz = {}", fit.dxdz);
    assert!((fit.dydz + 0.5).abs() < 0.01, "dydz = {}", fit.dydz);
}

#[test]
fn background_hits_do_not_contaminate_the_track() {
    let mut event = noisy_line_event(6, 0.01, 7);
    // Off-track background on three layers.
    for (k, layer) in [1u32, 3, 4].iter().enumerate() {
        event.add_hit(Hit::with_sigma(
            HitId(900 + k as u64),
            LayerId(*layer),
            nalgebra::Point3::new(-40.0 - k as f64, 25.0, layer_z(*layer)),
            SIGMA,
        ));
    }
    let finder = TrackFinder::new(vec![six_layer_strategy()]).expect("valid strategy");

    let found = finder.find(&event, 0.0);
    assert_eq!(found.len(), 1);
    let track = &found[0];
    assert_eq!(track.n_hits(), 6);
    for k in 0..3u64 {
        assert!(
            !track.has_hit(HitId(900 + k)),
            "background hit {} must not be attached",
            900 + k
        );
    }
}

#[test]
fn dead_layer_still_yields_a_five_hit_track() {
    let mut event = noisy_line_event(6, 0.0, 1);
    // Kill layer 4 (id 5 was assigned to layer index 4).
    let mut stripped = linetrack::EventHits::new();
    for layer in [0u32, 1, 2, 3, 5] {
        for hit in event.hits_for_layer(LayerId(layer)) {
            stripped.add_hit(hit.clone());
        }
    }
    event = stripped;

    let strategy = six_layer_strategy();
    let bad_hit_chisq = strategy.bad_hit_chisq;
    let finder = TrackFinder::new(vec![strategy]).expect("valid strategy");

    let found = finder.find(&event, 0.0);
    assert_eq!(found.len(), 1);
    let track = &found[0];
    assert_eq!(track.n_hits(), 5, "no hit may be fabricated for the dead layer");
    assert!(
        track.chisq_total() <= bad_hit_chisq,
        "five noise-free hits must fit essentially perfectly, chisq = {}",
        track.chisq_total()
    );
}

/// Delegates to [`WeightedLineFitter`] while counting fit calls.
#[derive(Clone)]
struct CountingFitter {
    calls: Rc<Cell<usize>>,
}

impl LineFitter for CountingFitter {
    fn fit(&self, points: &[FitPoint]) -> Result<LineFit, LineFitError> {
        self.calls.set(self.calls.get() + 1);
        WeightedLineFitter.fit(points)
    }
}

#[test]
fn exhausted_fit_budget_returns_seed_only_results() {
    // One hit per layer: exactly one seed triple, hence one seed fit.
    let event = noisy_line_event(6, 0.0, 3);
    let mut strategy = six_layer_strategy();
    strategy.min_hits = 3;
    strategy.min_confirm = 0;
    strategy.max_fits = 1; // covers the single seed fit, nothing more
    let calls = Rc::new(Cell::new(0));
    let fitter = CountingFitter {
        calls: Rc::clone(&calls),
    };
    let finder =
        TrackFinder::with_fitter(fitter, NoMaterial, vec![strategy]).expect("valid strategy");

    let found = finder.find(&event, 0.0);
    assert_eq!(found.len(), 1, "the bare seed is the best-effort result");
    assert_eq!(
        found[0].n_hits(),
        3,
        "no growth fit may be attempted once the budget is spent"
    );
    assert_eq!(
        calls.get(),
        1,
        "only the single budgeted seed fit may reach the fitter"
    );
}

#[test]
fn two_events_in_sequence_are_independent() {
    let finder = TrackFinder::new(vec![six_layer_strategy()]).expect("valid strategy");
    let first = finder.find(&noisy_line_event(6, 0.01, 10), 0.0);
    let second = finder.find(&noisy_line_event(6, 0.01, 11), 0.0);
    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
}
