//! Seed strategy: layer roles and quality cuts for one pattern-recognition pass.
//!
//! A strategy names the three layers used to form seed triplets, the layers
//! used to confirm a seed, the layers used to extend it, and the numeric cuts
//! governing the search. Strategies are immutable during a pass and are
//! validated once at load time; a malformed strategy is a configuration error
//! and is rejected before any event is processed.

use std::path::Path;

use crate::hit::LayerId;

/// Role of a layer within one strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerRole {
    /// One of the three layers enumerated for seed triplets.
    Seed,
    /// Layer checked to validate a seed before full growth.
    Confirm,
    /// Layer swept during full track growth.
    Extend,
}

/// A (layer, role) assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SeedLayer {
    /// Detector layer identity.
    pub layer: LayerId,
    /// Role of the layer in this strategy.
    pub role: LayerRole,
}

impl SeedLayer {
    /// Create a layer-role assignment.
    pub fn new(layer: LayerId, role: LayerRole) -> Self {
        Self { layer, role }
    }
}

/// Errors detected when validating a strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyError {
    /// A strategy must assign exactly three layers the Seed role.
    SeedLayerCount {
        /// Number of Seed-role layers found.
        got: usize,
    },
    /// The same layer is assigned more than once.
    DuplicateLayer {
        /// Offending layer.
        layer: LayerId,
    },
    /// Layers within a role group must be listed in ascending order.
    NonMonotonicLayers {
        /// Role group with out-of-order layers.
        role: LayerRole,
    },
    /// `min_hits` below the three seed hits.
    MinHitsTooLow {
        /// Configured value.
        got: usize,
    },
    /// A chi-square cut that must be positive is not.
    NonPositiveCut {
        /// Name of the offending cut.
        name: &'static str,
    },
}

impl std::fmt::Display for StrategyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SeedLayerCount { got } => {
                write!(f, "strategy needs exactly 3 seed layers, got {}", got)
            }
            Self::DuplicateLayer { layer } => {
                write!(f, "layer {} assigned more than once", layer.0)
            }
            Self::NonMonotonicLayers { role } => {
                write!(f, "{:?}-role layers are not in ascending order", role)
            }
            Self::MinHitsTooLow { got } => {
                write!(f, "min_hits must be at least 3, got {}", got)
            }
            Self::NonPositiveCut { name } => write!(f, "cut {} must be positive", name),
        }
    }
}

impl std::error::Error for StrategyError {}

/// A named seed/confirm/extend configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SeedStrategy {
    /// Strategy name for logs and diagnostics.
    pub name: String,
    /// Layer-role assignments.
    pub layers: Vec<SeedLayer>,
    /// Minimum number of hits for a finished track candidate.
    pub min_hits: usize,
    /// Minimum number of Confirm-role hits that must be attached on top of
    /// the three seed hits for a seed to be confirmed.
    pub min_confirm: usize,
    /// Maximum total chi-square for a successful fit.
    pub max_chisq: f64,
    /// Maximum chi-square degradation tolerated when a layer contributes no
    /// usable hit.
    pub bad_hit_chisq: f64,
    /// Budget of fit attempts for one `find_tracks` call (seed fits plus
    /// growth fits). Exhaustion degrades the search, it does not fail it.
    pub max_fits: usize,
}

impl Default for SeedStrategy {
    fn default() -> Self {
        Self {
            name: String::new(),
            layers: Vec::new(),
            min_hits: 5,
            min_confirm: 1,
            max_chisq: 100.0,
            bad_hit_chisq: 10.0,
            max_fits: 1_000_000_000,
        }
    }
}

impl SeedStrategy {
    /// Create a named strategy with the given layer assignments and default cuts.
    pub fn new(name: impl Into<String>, layers: Vec<SeedLayer>) -> Self {
        Self {
            name: name.into(),
            layers,
            ..Default::default()
        }
    }

    /// Layers assigned `role`, in strategy order.
    pub fn layers_for(&self, role: LayerRole) -> Vec<SeedLayer> {
        self.layers.iter().copied().filter(|l| l.role == role).collect()
    }

    /// The three Seed-role layers.
    ///
    /// Only meaningful on a validated strategy; returns `None` when the
    /// strategy does not carry exactly three seed layers.
    pub fn seed_layers(&self) -> Option<[SeedLayer; 3]> {
        let seeds = self.layers_for(LayerRole::Seed);
        <[SeedLayer; 3]>::try_from(seeds).ok()
    }

    /// Check the strategy for configuration errors.
    pub fn validate(&self) -> Result<(), StrategyError> {
        let n_seed = self.layers_for(LayerRole::Seed).len();
        if n_seed != 3 {
            return Err(StrategyError::SeedLayerCount { got: n_seed });
        }
        let mut seen = std::collections::HashSet::new();
        for l in &self.layers {
            if !seen.insert(l.layer) {
                return Err(StrategyError::DuplicateLayer { layer: l.layer });
            }
        }
        for role in [LayerRole::Seed, LayerRole::Confirm, LayerRole::Extend] {
            let group = self.layers_for(role);
            if group.windows(2).any(|w| w[0].layer >= w[1].layer) {
                return Err(StrategyError::NonMonotonicLayers { role });
            }
        }
        if self.min_hits < 3 {
            return Err(StrategyError::MinHitsTooLow { got: self.min_hits });
        }
        if self.max_chisq <= 0.0 {
            return Err(StrategyError::NonPositiveCut { name: "max_chisq" });
        }
        if self.bad_hit_chisq <= 0.0 {
            return Err(StrategyError::NonPositiveCut {
                name: "bad_hit_chisq",
            });
        }
        Ok(())
    }

    /// Load a strategy from a JSON file and validate it.
    pub fn from_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let data = std::fs::read_to_string(path)?;
        let strategy: Self = serde_json::from_str(&data)?;
        strategy.validate()?;
        Ok(strategy)
    }
}
