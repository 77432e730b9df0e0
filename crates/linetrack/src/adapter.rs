//! Trajectory fit adapter: two-pass scattering-correction policy around the
//! numerical line fit.
//!
//! The first fit of a fresh candidate is unweighted and ignores
//! multiple-scattering broadening; it only establishes an approximate
//! trajectory. From that trajectory, per-hit scattering angles are computed
//! via the [`MaterialModel`] and stored on the candidate. Every later fit of
//! the same candidate (including every copy-on-add child produced during
//! growth) uses positions corrected against the previous trajectory and
//! uncertainties broadened by the stored scattering angles.

use nalgebra::Point3;

use crate::candidate::SeedCandidate;
use crate::hit::Hit;
use crate::linefit::{FitPoint, LineFit, LineFitError, LineFitter};
use crate::strategy::SeedStrategy;

/// Detector material and multiple-scattering model.
///
/// External collaborator: the core only consumes the estimated scattering
/// angle and the trajectory-dependent position correction (stereo/cross hits
/// have a position ambiguity that resolves once an approximate direction is
/// known).
pub trait MaterialModel {
    /// Estimated multiple-scattering angle for a hit, given the current
    /// trajectory. `field` is the ambient field magnitude, carried for
    /// momentum estimation in field-on configurations.
    fn scatter_angle(&self, hit: &Hit, fit: &LineFit, field: f64) -> f64;

    /// Hit position corrected against the current trajectory estimate.
    ///
    /// Defaults to the nominal position.
    fn corrected_position(&self, hit: &Hit, _fit: &LineFit) -> Point3<f64> {
        hit.position
    }
}

/// Material model for negligible scattering (thin detectors, test beams).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMaterial;

impl MaterialModel for NoMaterial {
    fn scatter_angle(&self, _hit: &Hit, _fit: &LineFit, _field: f64) -> f64 {
        0.0
    }
}

/// Material model assigning every hit the same scattering angle.
#[derive(Debug, Clone, Copy)]
pub struct UniformMaterial {
    /// Scattering angle applied to every hit.
    pub angle: f64,
}

impl MaterialModel for UniformMaterial {
    fn scatter_angle(&self, _hit: &Hit, _fit: &LineFit, _field: f64) -> f64 {
        self.angle
    }
}

/// Shared budget of fit attempts for one track-finding call.
///
/// Exhaustion is a soft degradation: the first refused attempt logs a
/// warning, every later attempt is silently refused and the search drains
/// with whatever it has accumulated.
#[derive(Debug)]
pub struct FitBudget {
    limit: usize,
    used: usize,
    warned: bool,
}

impl FitBudget {
    /// Create a budget of `limit` fit attempts.
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            used: 0,
            warned: false,
        }
    }

    /// Claim one fit attempt. Returns false once the budget is exhausted.
    pub fn try_consume(&mut self) -> bool {
        if self.used >= self.limit {
            if !self.warned {
                tracing::warn!(
                    limit = self.limit,
                    "fit budget exhausted; returning best-effort result"
                );
                self.warned = true;
            }
            return false;
        }
        self.used += 1;
        true
    }

    /// Number of fit attempts performed so far.
    pub fn used(&self) -> usize {
        self.used
    }

    /// Whether the budget is spent.
    pub fn exhausted(&self) -> bool {
        self.used >= self.limit
    }
}

/// Wraps the numerical fitter and the material model with the two-pass
/// scattering-correction policy.
#[derive(Debug, Clone)]
pub struct FitAdapter<F, M> {
    fitter: F,
    material: M,
}

impl<F: LineFitter, M: MaterialModel> FitAdapter<F, M> {
    /// Create an adapter from a fitter and a material model.
    pub fn new(fitter: F, material: M) -> Self {
        Self { fitter, material }
    }

    /// Fit a candidate in place.
    ///
    /// On success the new fit replaces the candidate's previous one and any
    /// hits without a scattering annotation are annotated from the new
    /// trajectory. On failure the candidate is left untouched so the caller
    /// can discard the branch.
    pub fn fit_candidate(
        &self,
        cand: &mut SeedCandidate,
        strategy: &SeedStrategy,
        field: f64,
    ) -> Result<(), LineFitError> {
        let points = self.prepare_points(cand);
        let fit = self.fitter.fit(&points)?;
        if fit.chisq_total() > strategy.max_chisq {
            return Err(LineFitError::ChisqCut {
                chisq: fit.chisq_total(),
                cut: strategy.max_chisq,
            });
        }

        let missing: Vec<Hit> = cand
            .hits()
            .iter()
            .filter(|h| cand.scatter_angle(h.id).is_none())
            .cloned()
            .collect();
        for hit in missing {
            let angle = self.material.scatter_angle(&hit, &fit, field);
            cand.set_scatter_angle(hit.id, angle);
        }
        cand.set_fit(fit);
        Ok(())
    }

    fn prepare_points(&self, cand: &SeedCandidate) -> Vec<FitPoint> {
        match cand.fit().filter(|_| cand.has_scatter_angles()) {
            None => {
                // Pass 1: unweighted, nominal positions.
                cand.hits()
                    .iter()
                    .map(|h| FitPoint {
                        z: h.position.z,
                        x: h.position.x,
                        y: h.position.y,
                        sigma_x: 1.0,
                        sigma_y: 1.0,
                    })
                    .collect()
            }
            Some(prev) => {
                let z_ref = cand
                    .hits()
                    .iter()
                    .map(|h| h.position.z)
                    .fold(f64::INFINITY, f64::min);
                cand.hits()
                    .iter()
                    .map(|h| {
                        let pos = self.material.corrected_position(h, prev);
                        let theta = cand.scatter_angle(h.id).unwrap_or(0.0);
                        let broadening = theta * (pos.z - z_ref).abs();
                        FitPoint {
                            z: pos.z,
                            x: pos.x,
                            y: pos.y,
                            sigma_x: h.sigma_x.hypot(broadening),
                            sigma_y: h.sigma_y.hypot(broadening),
                        }
                    })
                    .collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hit::{HitId, LayerId};
    use crate::linefit::WeightedLineFitter;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    fn line_hit(id: u64, layer: u32, z: f64) -> Hit {
        Hit::with_sigma(
            HitId(id),
            LayerId(layer),
            Point3::new(2.0 * z + 1.0, -0.5 * z + 3.0, z),
            0.01,
        )
    }

    fn seed() -> SeedCandidate {
        SeedCandidate::from_seed(
            line_hit(1, 0, 10.0),
            line_hit(2, 1, 20.0),
            line_hit(3, 2, 30.0),
        )
    }

    #[test]
    fn first_fit_annotates_scatter_angles() {
        let adapter = FitAdapter::new(WeightedLineFitter, UniformMaterial { angle: 1e-3 });
        let strategy = SeedStrategy::default();
        let mut cand = seed();
        adapter
            .fit_candidate(&mut cand, &strategy, 0.0)
            .expect("seed fit succeeds");
        assert!(cand.fit().is_some());
        for hit in cand.hits() {
            assert_relative_eq!(cand.scatter_angle(hit.id).expect("annotated"), 1e-3);
        }
    }

    #[test]
    fn second_fit_uses_measurement_weights() {
        let adapter = FitAdapter::new(WeightedLineFitter, NoMaterial);
        let strategy = SeedStrategy::default();
        let mut cand = seed();
        adapter
            .fit_candidate(&mut cand, &strategy, 0.0)
            .expect("pass-1 fit");
        let mut grown = cand.clone();
        grown.add_hit(line_hit(4, 3, 40.0));
        adapter
            .fit_candidate(&mut grown, &strategy, 0.0)
            .expect("pass-2 fit");
        // Perfect hits: weighted chi-square stays ~0, parameters exact.
        let fit = grown.fit().expect("fit attached");
        assert!(fit.chisq_total() < 1e-9);
        assert_relative_eq!(fit.dxdz, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn chisq_cut_failure_leaves_candidate_untouched() {
        let adapter = FitAdapter::new(WeightedLineFitter, NoMaterial);
        let mut strategy = SeedStrategy::default();
        let mut cand = seed();
        adapter
            .fit_candidate(&mut cand, &strategy, 0.0)
            .expect("pass-1 fit");
        let before = *cand.fit().expect("fit attached");

        // An off-line hit with tight sigmas blows up the weighted chi-square.
        let mut grown = cand.clone();
        grown.add_hit(Hit::with_sigma(
            HitId(9),
            LayerId(3),
            Point3::new(1000.0, 1000.0, 40.0),
            0.01,
        ));
        strategy.max_chisq = 1.0;
        let err = adapter
            .fit_candidate(&mut grown, &strategy, 0.0)
            .expect_err("cut must fail");
        assert!(matches!(err, LineFitError::ChisqCut { .. }));
        let after = grown.fit().expect("previous fit kept");
        assert_relative_eq!(after.x0, before.x0);
        assert_relative_eq!(after.chisq_total(), before.chisq_total());
    }

    #[test]
    fn budget_refuses_after_limit_and_reports_usage() {
        let mut budget = FitBudget::new(2);
        assert!(budget.try_consume());
        assert!(budget.try_consume());
        assert!(!budget.try_consume(), "third attempt exceeds the budget");
        assert!(budget.exhausted());
        assert_eq!(budget.used(), 2);
    }
}
