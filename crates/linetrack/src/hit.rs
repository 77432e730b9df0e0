//! Hit and layer identity types.
//!
//! Hits are produced upstream by digitization and are read-only to the
//! pattern recognition. Duplicate detection between track candidates relies
//! on the stable [`HitId`] key assigned at digitization time, never on
//! floating-point coordinate comparison: two logically identical hits may
//! diverge numerically, and two distinct hits may coincide.

use nalgebra::Point3;

/// Opaque stable identity key of a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct HitId(pub u64);

/// Identity of a detector layer. Layers are ordered along the beam axis by
/// ascending id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct LayerId(pub u32);

/// A single position measurement on a detector layer.
#[derive(Debug, Clone)]
pub struct Hit {
    /// Stable identity key (digitization-assigned).
    pub id: HitId,
    /// Owning detector layer.
    pub layer: LayerId,
    /// Measured position in global coordinates.
    pub position: Point3<f64>,
    /// Measurement uncertainty on x.
    pub sigma_x: f64,
    /// Measurement uncertainty on y.
    pub sigma_y: f64,
}

impl Hit {
    /// Create a hit with per-axis uncertainties.
    pub fn new(id: HitId, layer: LayerId, position: Point3<f64>, sigma_x: f64, sigma_y: f64) -> Self {
        Self {
            id,
            layer,
            position,
            sigma_x,
            sigma_y,
        }
    }

    /// Create a hit with an isotropic transverse uncertainty.
    pub fn with_sigma(id: HitId, layer: LayerId, position: Point3<f64>, sigma: f64) -> Self {
        Self::new(id, layer, position, sigma, sigma)
    }
}
