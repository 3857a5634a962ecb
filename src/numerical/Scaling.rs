//! # Variable and constraint scaling
//!
//! Two levels:
//! - [`BasisScaling`]: created once from the finalized bounds, one `(scale, shift)`
//!   pair per OCP-level slot, mapping `[lower, upper]` onto `[-0.5, 0.5]`
//! - [`IterationScaling`]: created for every mesh iteration, expands the basis onto the
//!   current mesh and derives the objective and constraint scales at the guess,
//!   optionally blended with the [`ScalingHistory`] of earlier iterations
pub mod basis_scaling;
pub mod bounds;
pub mod evaluators;
pub mod history;
pub mod iteration_scaling;

pub use basis_scaling::BasisScaling;
pub use bounds::{BoundPair, Bounds, PhaseBounds, PhaseLayout, ProblemLayout};
pub use evaluators::{ClosureEvaluator, ScalingEvaluator};
pub use history::{IterationRecord, ScalingHistory, blend_weights};
pub use iteration_scaling::IterationScaling;
