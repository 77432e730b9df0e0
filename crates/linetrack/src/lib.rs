//! linetrack — straight-line track pattern recognition for field-off
//! tracking detectors.
//!
//! Reconstructs straight-line particle trajectories from unassociated hits
//! on an ordered set of detector layers. The stages are:
//!
//! 1. **Seed** – full triplet enumeration over three designated layers,
//!    pruned by cheap pre-filters before any numerical fit.
//! 2. **Confirm** – a seed must pick up hits from a small designated layer
//!    set before full growth is attempted.
//! 3. **Extend** – worklist-driven growth across the remaining layers under
//!    chi-square discipline, with one missing or bad hit per layer forgiven.
//! 4. **Merge** – duplicate resolution keeps only the best of two candidates
//!    sharing hits beyond the overlap threshold.
//!
//! The numerical line fit sits behind [`LineFitter`] and the detector
//! material model behind [`MaterialModel`]; defaults for both ship with the
//! crate. Geometry, digitization, and persistence stay outside.
//!
//! # Public API
//! - [`TrackFinder`] as the primary entry point
//! - [`SeedStrategy`] layer roles and cuts, JSON-loadable
//! - [`EventHits`] per-event hit source
//! - [`SeedFilter`] and [`Diagnostics`] hooks

mod adapter;
mod candidate;
mod diag;
mod event;
mod finder;
mod growth;
mod hit;
mod linefit;
mod merge;
mod seeder;
mod strategy;

pub use adapter::{FitAdapter, FitBudget, MaterialModel, NoMaterial, UniformMaterial};
pub use candidate::SeedCandidate;
pub use diag::{Diagnostics, NullDiagnostics};
pub use event::EventHits;
pub use finder::TrackFinder;
pub use growth::GrowthSearch;
pub use hit::{Hit, HitId, LayerId};
pub use linefit::{
    FitPoint, LineFit, LineFitError, LineFitter, WeightedLineFitter, SUBFIT_ZX, SUBFIT_ZY,
};
pub use merge::Merger;
pub use seeder::{SeedFilter, SeedFinder};
pub use strategy::{LayerRole, SeedLayer, SeedStrategy, StrategyError};
