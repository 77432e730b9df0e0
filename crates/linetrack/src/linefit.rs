//! Weighted least-squares straight-line fit in three dimensions.
//!
//! With no magnetic field a trajectory is a straight line, parametrized at
//! z = 0 as `x(z) = x0 + dxdz * z`, `y(z) = y0 + dydz * z`. The two
//! projections are statistically independent, so the fit is two weighted 2x2
//! normal-equation solves: the primary (zx) fit and the secondary (zy) fit.
//!
//! Fit failures are finite, expected outcomes of noisy combinatorics and are
//! returned as [`LineFitError`] variants; callers discard the branch and
//! continue the search.

use nalgebra::{Matrix2, Vector2};

/// Index of the zx sub-fit in [`LineFit::chisq`] / [`LineFit::ndf`].
pub const SUBFIT_ZX: usize = 0;
/// Index of the zy sub-fit in [`LineFit::chisq`] / [`LineFit::ndf`].
pub const SUBFIT_ZY: usize = 1;

/// One measurement prepared for the fit: position plus effective weights.
#[derive(Debug, Clone, Copy)]
pub struct FitPoint {
    /// Position along the detector axis.
    pub z: f64,
    /// Measured x.
    pub x: f64,
    /// Measured y.
    pub y: f64,
    /// Effective x uncertainty (measurement, possibly scattering-broadened).
    pub sigma_x: f64,
    /// Effective y uncertainty.
    pub sigma_y: f64,
}

/// Fitted straight-line trajectory with its quality breakdown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFit {
    /// x intercept at z = 0.
    pub x0: f64,
    /// Slope dx/dz.
    pub dxdz: f64,
    /// y intercept at z = 0.
    pub y0: f64,
    /// Slope dy/dz.
    pub dydz: f64,
    /// Chi-square of the [zx, zy] sub-fits.
    pub chisq: [f64; 2],
    /// Degrees of freedom of the [zx, zy] sub-fits.
    pub ndf: [usize; 2],
}

impl LineFit {
    /// Total chi-square over both sub-fits.
    pub fn chisq_total(&self) -> f64 {
        self.chisq[SUBFIT_ZX] + self.chisq[SUBFIT_ZY]
    }

    /// Total degrees of freedom over both sub-fits.
    pub fn ndf_total(&self) -> usize {
        self.ndf[SUBFIT_ZX] + self.ndf[SUBFIT_ZY]
    }

    /// Predicted (x, y) at the given z.
    pub fn point_at(&self, z: f64) -> (f64, f64) {
        (self.x0 + self.dxdz * z, self.y0 + self.dydz * z)
    }

    /// Transverse distance from the line to a measured point, evaluated at
    /// the measurement's z plane.
    pub fn transverse_distance(&self, x: f64, y: f64, z: f64) -> f64 {
        let (px, py) = self.point_at(z);
        (x - px).hypot(y - py)
    }
}

/// Finite, recoverable fit outcomes.
#[derive(Debug, Clone, PartialEq)]
pub enum LineFitError {
    /// The hit set cannot constrain a line (too few points, or no z spread).
    InconsistentSeed,
    /// The zx normal equations are degenerate.
    PrimaryFitFailed,
    /// The zy normal equations are degenerate.
    SecondaryFitFailed,
    /// The fit converged but failed the strategy chi-square cut.
    ChisqCut {
        /// Total chi-square of the fit.
        chisq: f64,
        /// Strategy cut that was exceeded.
        cut: f64,
    },
}

impl std::fmt::Display for LineFitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InconsistentSeed => write!(f, "hit set cannot constrain a line"),
            Self::PrimaryFitFailed => write!(f, "zx line fit is degenerate"),
            Self::SecondaryFitFailed => write!(f, "zy line fit is degenerate"),
            Self::ChisqCut { chisq, cut } => {
                write!(f, "chi-square {:.3} exceeds cut {:.3}", chisq, cut)
            }
        }
    }
}

impl std::error::Error for LineFitError {}

/// Numerical straight-line fit routine.
///
/// The pattern recognition is generic over this seam so an external fitter
/// (e.g. one with full covariance propagation) can be plugged in.
pub trait LineFitter {
    /// Fit a line to the prepared points.
    fn fit(&self, points: &[FitPoint]) -> Result<LineFit, LineFitError>;
}

/// Default weighted least-squares fitter.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedLineFitter;

const MIN_DET: f64 = 1e-12;

impl WeightedLineFitter {
    /// Solve one weighted 1-D line projection `u(z) = u0 + slope * z`.
    ///
    /// Returns `(u0, slope, chisq)` or `None` when the normal equations are
    /// degenerate.
    fn fit_projection(samples: &[(f64, f64, f64)]) -> Option<(f64, f64, f64)> {
        let mut s = 0.0;
        let mut sz = 0.0;
        let mut szz = 0.0;
        let mut su = 0.0;
        let mut szu = 0.0;
        for &(z, u, sigma) in samples {
            let w = 1.0 / (sigma * sigma);
            s += w;
            sz += w * z;
            szz += w * z * z;
            su += w * u;
            szu += w * z * u;
        }

        let m = Matrix2::new(s, sz, sz, szz);
        // Scale-invariant degeneracy check on the normal matrix.
        if m.determinant().abs() <= MIN_DET * s * szz.max(1.0) {
            return None;
        }
        let sol = m.try_inverse()? * Vector2::new(su, szu);
        let (u0, slope) = (sol[0], sol[1]);

        let mut chisq = 0.0;
        for &(z, u, sigma) in samples {
            let r = (u - u0 - slope * z) / sigma;
            chisq += r * r;
        }
        Some((u0, slope, chisq))
    }
}

impl LineFitter for WeightedLineFitter {
    fn fit(&self, points: &[FitPoint]) -> Result<LineFit, LineFitError> {
        if points.len() < 2 {
            return Err(LineFitError::InconsistentSeed);
        }
        let z0 = points[0].z;
        if points.iter().all(|p| (p.z - z0).abs() < 1e-9) {
            return Err(LineFitError::InconsistentSeed);
        }
        if points
            .iter()
            .any(|p| p.sigma_x <= 0.0 || p.sigma_y <= 0.0 || !p.z.is_finite())
        {
            return Err(LineFitError::InconsistentSeed);
        }

        let zx: Vec<(f64, f64, f64)> = points.iter().map(|p| (p.z, p.x, p.sigma_x)).collect();
        let (x0, dxdz, chisq_zx) =
            Self::fit_projection(&zx).ok_or(LineFitError::PrimaryFitFailed)?;

        let zy: Vec<(f64, f64, f64)> = points.iter().map(|p| (p.z, p.y, p.sigma_y)).collect();
        let (y0, dydz, chisq_zy) =
            Self::fit_projection(&zy).ok_or(LineFitError::SecondaryFitFailed)?;

        let ndf = points.len().saturating_sub(2);
        Ok(LineFit {
            x0,
            dxdz,
            y0,
            dydz,
            chisq: [chisq_zx, chisq_zy],
            ndf: [ndf, ndf],
        })
    }
}
