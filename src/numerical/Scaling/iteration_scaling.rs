//! Scaling actually applied to the NLP of one mesh iteration.
//!
//! Variables: `x̃ = (x - r) / V` with `V`, `r` expanded from the basis onto the mesh.
//! Objective: `J̃ = w J` with `w = 1 / ‖∇J ⊙ V‖₂` at the guess, so the gradient seen by
//! the solver has unit norm. Constraints: `c̃ = W c`, defect and integral rows with
//! `W = 1 / V` of their variable, path and endpoint rows with the reciprocal Euclidean
//! norm of their row of `∂c/∂x̃ = G diag(V)`.
//!
//! From the second iteration on, with `update_scaling` enabled, `V`, `r` and `w` are
//! blended with the records of the earlier iterations using exponentially decaying
//! weights (see [`blend_weights`]).
use crate::numerical::Scaling::basis_scaling::BasisScaling;
use crate::numerical::Scaling::bounds::ProblemLayout;
use crate::numerical::Scaling::evaluators::{ScalingEvaluator, sparse_jacobian};
use crate::numerical::Scaling::history::{IterationRecord, ScalingHistory, blend_weights};
use crate::numerical::errors::{CollocationError, CollocationResult, check_len};
use crate::numerical::mesh::Mesh;
use crate::numerical::settings::{ScalingMethod, ScalingSettings};
use log::{debug, info, warn};
use nalgebra::DVector;

#[derive(Debug, Clone)]
pub struct IterationScaling {
    pub iteration: usize,
    layout: ProblemLayout,
    mesh: Mesh,
    x_scale_unexpanded: DVector<f64>,
    x_shift_unexpanded: DVector<f64>,
    x_scale: DVector<f64>,
    x_shift: DVector<f64>,
    x_stretch: DVector<f64>,
    objective_scale: f64,
    c_scale: DVector<f64>,
}

/// Candidate of the current iteration before blending
struct Candidate {
    x_scale: DVector<f64>,
    x_shift: DVector<f64>,
}

impl IterationScaling {
    pub fn new(
        basis: &BasisScaling,
        mesh: &Mesh,
        guess: &DVector<f64>,
        evaluator: &dyn ScalingEvaluator,
        settings: &ScalingSettings,
        history: &ScalingHistory,
    ) -> CollocationResult<IterationScaling> {
        settings.validate()?;
        let layout = basis.layout().clone();
        let num_x = layout.num_x(mesh)?;
        check_len("guess", num_x, guess.len())?;
        let iteration = history.len() + 1;
        let mut scaling = IterationScaling {
            iteration,
            layout,
            mesh: mesh.clone(),
            x_scale_unexpanded: basis.scale().clone(),
            x_shift_unexpanded: basis.shift().clone(),
            x_scale: DVector::from_element(num_x, 1.0),
            x_shift: DVector::zeros(num_x),
            x_stretch: DVector::from_element(num_x, 1.0),
            objective_scale: 1.0,
            c_scale: DVector::zeros(0),
        };

        if basis.method() == ScalingMethod::None {
            scaling.c_scale = DVector::from_element(scaling.layout.num_c(mesh)?, 1.0);
            info!("iteration {}: scaling disabled", iteration);
            return Ok(scaling);
        }

        if settings.update_scaling && iteration >= 2 {
            scaling.generate_from_previous(basis, guess, evaluator, settings.update_weight, history)?;
        } else {
            scaling.generate_from_base(basis, guess, evaluator)?;
        }
        info!(
            "iteration {}: objective scale {:e}, {} variables, {} constraints",
            iteration,
            scaling.objective_scale,
            scaling.x_scale.len(),
            scaling.c_scale.len()
        );
        Ok(scaling)
    }

    fn set_variable_scaling(&mut self, x_scale: DVector<f64>, x_shift: DVector<f64>) -> CollocationResult<()> {
        self.x_scale = self.expand_to_mesh(&x_scale)?;
        self.x_shift = self.expand_to_mesh(&x_shift)?;
        self.x_stretch = self.x_scale.map(|v| 1.0 / v);
        self.x_scale_unexpanded = x_scale;
        self.x_shift_unexpanded = x_shift;
        Ok(())
    }

    fn generate_from_base(
        &mut self,
        basis: &BasisScaling,
        guess: &DVector<f64>,
        evaluator: &dyn ScalingEvaluator,
    ) -> CollocationResult<()> {
        self.set_variable_scaling(basis.scale().clone(), basis.shift().clone())?;
        self.objective_scale = self.objective_scale_at(guess, evaluator)?;

        let mut c_scale = self.constraint_row_scales(guess, evaluator)?;
        let base = self
            .layout
            .expand_constraints_to_mesh(&self.mesh, basis.constraint_scale())?;
        for (row, _) in self.layout.constraint_variable_links(&self.mesh)? {
            c_scale[row] = 1.0 / base[row];
        }
        self.c_scale = c_scale;
        Ok(())
    }

    fn generate_from_previous(
        &mut self,
        basis: &BasisScaling,
        guess: &DVector<f64>,
        evaluator: &dyn ScalingEvaluator,
        alpha: f64,
        history: &ScalingHistory,
    ) -> CollocationResult<()> {
        let candidate = self.candidate_from_guess(basis, guess)?;
        let weights = blend_weights(history.len() + 1, alpha);
        debug!("iteration {}: blending weights {:?}", self.iteration, weights);

        let n = candidate.x_scale.len();
        let last = weights[history.len()];
        let mut x_scale = candidate.x_scale * last;
        let mut x_shift = candidate.x_shift * last;
        for (record, &w) in history.records().iter().zip(weights.iter()) {
            check_len("history scale", n, record.x_scale.len())?;
            check_len("history shift", n, record.x_shift.len())?;
            x_scale += &record.x_scale * w;
            x_shift += &record.x_shift * w;
        }
        self.set_variable_scaling(x_scale, x_shift)?;

        let objective_scale = self.objective_scale_at(guess, evaluator)?;
        self.objective_scale = history
            .records()
            .iter()
            .zip(weights.iter())
            .map(|(record, &w)| w * record.objective_scale)
            .sum::<f64>()
            + last * objective_scale;

        let mut c_scale = self.constraint_row_scales(guess, evaluator)?;
        for (row, x_index) in self.layout.constraint_variable_links(&self.mesh)? {
            c_scale[row] = self.x_stretch[x_index];
        }
        self.c_scale = c_scale;
        Ok(())
    }

    /// Scale and shift suggested by the guess itself: node range and midpoint for
    /// states and controls, magnitude for scalar slots. Slots where the guess gives
    /// no usable extent keep the basis values.
    fn candidate_from_guess(&self, basis: &BasisScaling, guess: &DVector<f64>) -> CollocationResult<Candidate> {
        let mut x_scale = basis.scale().clone();
        let mut x_shift = basis.shift().clone();
        for block in self.layout.variable_blocks(&self.mesh)? {
            let values = guess.rows(block.start, block.len);
            if block.nodal {
                let (min, max) = (values.min(), values.max());
                let range = max - min;
                if range > 0.0 && range.is_finite() {
                    x_scale[block.slot] = range;
                    x_shift[block.slot] = 0.5 * (max + min);
                }
            } else {
                let magnitude = values[0].abs();
                if magnitude > 0.0 && magnitude.is_finite() {
                    x_scale[block.slot] = magnitude;
                    x_shift[block.slot] = 0.0;
                }
            }
        }
        Ok(Candidate { x_scale, x_shift })
    }

    fn objective_scale_at(&self, guess: &DVector<f64>, evaluator: &dyn ScalingEvaluator) -> CollocationResult<f64> {
        let gradient = evaluator.gradient(guess);
        check_len("objective gradient", self.x_scale.len(), gradient.len())?;
        let norm = gradient.component_mul(&self.x_scale).norm();
        if norm == 0.0 || !norm.is_finite() {
            return Err(CollocationError::DegenerateGradient(norm));
        }
        Ok(1.0 / norm)
    }

    /// `1 / ‖row_i(G diag(V))‖₂` for every constraint row; rows without finite
    /// nonzero entries keep 1
    fn constraint_row_scales(
        &self,
        guess: &DVector<f64>,
        evaluator: &dyn ScalingEvaluator,
    ) -> CollocationResult<DVector<f64>> {
        let num_c = self.layout.num_c(&self.mesh)?;
        let (rows, cols) = evaluator.jacobian_structure();
        let values = evaluator.jacobian_values(guess);
        let G = sparse_jacobian(values, rows, cols, (num_c, self.x_scale.len()))?;
        let mut c_scale = DVector::from_element(num_c, 1.0);
        for (i, row) in G.outer_iterator().enumerate() {
            let norm = row
                .iter()
                .map(|(j, &g)| (g * self.x_scale[j]).powi(2))
                .sum::<f64>()
                .sqrt();
            if norm > 0.0 && norm.is_finite() {
                c_scale[i] = 1.0 / norm;
            } else if !norm.is_finite() {
                warn!("constraint row {} has a non-finite Jacobian norm, left unscaled", i);
            } else {
                debug!("constraint row {} has an empty Jacobian row, left unscaled", i);
            }
        }
        Ok(c_scale)
    }

    /// Random-sample variable scaling is declared but not available
    pub fn sample_variable_scaling(&self, num_samples: usize) -> CollocationResult<DVector<f64>> {
        debug!("random-sample scaling requested with {} samples", num_samples);
        Err(CollocationError::NotSupported("random-sample variable scaling"))
    }

    pub fn expand_to_mesh(&self, basis_vector: &DVector<f64>) -> CollocationResult<DVector<f64>> {
        self.layout.expand_to_mesh(&self.mesh, basis_vector)
    }

    pub fn x_scale(&self) -> &DVector<f64> {
        &self.x_scale
    }

    pub fn x_shift(&self) -> &DVector<f64> {
        &self.x_shift
    }

    /// `1 / x_scale`
    pub fn x_stretch(&self) -> &DVector<f64> {
        &self.x_stretch
    }

    pub fn objective_scale(&self) -> f64 {
        self.objective_scale
    }

    pub fn constraint_scale(&self) -> &DVector<f64> {
        &self.c_scale
    }

    pub fn scale_x(&self, x: &DVector<f64>) -> CollocationResult<DVector<f64>> {
        check_len("decision vector", self.x_scale.len(), x.len())?;
        Ok((x - &self.x_shift).component_mul(&self.x_stretch))
    }

    pub fn unscale_x(&self, x_scaled: &DVector<f64>) -> CollocationResult<DVector<f64>> {
        check_len("scaled decision vector", self.x_scale.len(), x_scaled.len())?;
        Ok(x_scaled.component_mul(&self.x_scale) + &self.x_shift)
    }

    pub fn scale_x_bounds(
        &self,
        lower: &DVector<f64>,
        upper: &DVector<f64>,
    ) -> CollocationResult<(DVector<f64>, DVector<f64>)> {
        Ok((self.scale_x(lower)?, self.scale_x(upper)?))
    }

    pub fn scale_objective(&self, objective: f64) -> f64 {
        self.objective_scale * objective
    }

    /// Gradient with respect to the scaled variables, `w ∇J ⊙ V`
    pub fn scale_gradient(&self, gradient: &DVector<f64>) -> CollocationResult<DVector<f64>> {
        check_len("objective gradient", self.x_scale.len(), gradient.len())?;
        Ok(gradient.component_mul(&self.x_scale) * self.objective_scale)
    }

    pub fn scale_constraints(&self, c: &DVector<f64>) -> CollocationResult<DVector<f64>> {
        check_len("constraint vector", self.c_scale.len(), c.len())?;
        Ok(c.component_mul(&self.c_scale))
    }

    pub fn unscale_constraints(&self, c_scaled: &DVector<f64>) -> CollocationResult<DVector<f64>> {
        check_len("scaled constraint vector", self.c_scale.len(), c_scaled.len())?;
        Ok(c_scaled.component_div(&self.c_scale))
    }

    /// Jacobian nonzeros of the scaled problem, `W_i G_ij V_j`, in the given pattern order
    pub fn scale_constraint_jacobian(
        &self,
        values: &[f64],
        rows: &[usize],
        cols: &[usize],
    ) -> CollocationResult<Vec<f64>> {
        check_len("Jacobian rows", values.len(), rows.len())?;
        check_len("Jacobian cols", values.len(), cols.len())?;
        values
            .iter()
            .zip(rows.iter().zip(cols.iter()))
            .map(|(&g, (&i, &j))| {
                let w = self
                    .c_scale
                    .get(i)
                    .ok_or_else(|| CollocationError::dimension("Jacobian row index", self.c_scale.len(), i + 1))?;
                let v = self
                    .x_scale
                    .get(j)
                    .ok_or_else(|| CollocationError::dimension("Jacobian column index", self.x_scale.len(), j + 1))?;
                Ok(w * g * v)
            })
            .collect()
    }

    /// What the refinement loop appends to the history once this iteration is solved
    pub fn record(&self) -> IterationRecord {
        IterationRecord {
            iteration: self.iteration,
            objective_scale: self.objective_scale,
            x_scale: self.x_scale_unexpanded.clone(),
            x_shift: self.x_shift_unexpanded.clone(),
        }
    }
}
