use crate::numerical::Scaling::bounds::{Bounds, ProblemLayout, validate_pair};
use crate::numerical::errors::{CollocationError, CollocationResult, check_len};
use crate::numerical::settings::{ScalingMethod, ScalingSettings};
use log::{info, warn};
use nalgebra::DVector;

const NONE_SCALE: f64 = 1.0;
const NONE_SHIFT: f64 = 0.0;

/// OCP-level affine normalization `x̃ = (x - shift) / scale`, derived once from the
/// finalized bounds. Every mesh iteration expands from it.
#[derive(Debug, Clone)]
pub struct BasisScaling {
    method: ScalingMethod,
    layout: ProblemLayout,
    scale: DVector<f64>,
    shift: DVector<f64>,
    constraint_scale: DVector<f64>,
    degenerate_slots: Vec<usize>,
}

impl BasisScaling {
    pub fn generate(bounds: &Bounds, settings: &ScalingSettings) -> CollocationResult<BasisScaling> {
        let layout = bounds.layout();
        let variable_bounds = bounds.variable_bounds();
        for (slot, &pair) in variable_bounds.iter().enumerate() {
            validate_pair(slot, pair)?;
        }
        let n = variable_bounds.len();
        let (scale, shift, degenerate_slots) = match settings.method {
            ScalingMethod::Bounds => from_bounds(&variable_bounds, settings.strict_bounds)?,
            ScalingMethod::None => (
                DVector::from_element(n, NONE_SCALE),
                DVector::from_element(n, NONE_SHIFT),
                Vec::new(),
            ),
            ScalingMethod::Guess | ScalingMethod::User => {
                return Err(CollocationError::UnsupportedMethod(settings.method.to_string()));
            }
        };
        let constraint_scale = base_constraint_scale(&layout, &scale);
        info!(
            "basis scaling generated with method {}: {} variable slots, {} constraint slots, {} degenerate",
            settings.method,
            n,
            constraint_scale.len(),
            degenerate_slots.len()
        );
        Ok(BasisScaling {
            method: settings.method,
            layout,
            scale,
            shift,
            constraint_scale,
            degenerate_slots,
        })
    }

    pub fn method(&self) -> ScalingMethod {
        self.method
    }

    pub fn layout(&self) -> &ProblemLayout {
        &self.layout
    }

    pub fn scale(&self) -> &DVector<f64> {
        &self.scale
    }

    pub fn shift(&self) -> &DVector<f64> {
        &self.shift
    }

    /// Per phase: defect entries (state scales), path entries (1), integral entries
    /// (integral variable scales); then endpoint entries (1)
    pub fn constraint_scale(&self) -> &DVector<f64> {
        &self.constraint_scale
    }

    /// Slots whose bounds had zero width and received the unit fallback
    pub fn degenerate_slots(&self) -> &[usize] {
        &self.degenerate_slots
    }

    pub fn scale_x_unexpanded(&self, x: &DVector<f64>) -> CollocationResult<DVector<f64>> {
        check_len("OCP-level variable vector", self.scale.len(), x.len())?;
        Ok((x - &self.shift).component_div(&self.scale))
    }

    pub fn unscale_x_unexpanded(&self, x_scaled: &DVector<f64>) -> CollocationResult<DVector<f64>> {
        check_len("OCP-level variable vector", self.scale.len(), x_scaled.len())?;
        Ok(x_scaled.component_mul(&self.scale) + &self.shift)
    }
}

fn from_bounds(
    bounds: &[(f64, f64)],
    strict: bool,
) -> CollocationResult<(DVector<f64>, DVector<f64>, Vec<usize>)> {
    let mut scale = Vec::with_capacity(bounds.len());
    let mut shift = Vec::with_capacity(bounds.len());
    let mut degenerate = Vec::new();
    for (slot, &(lower, upper)) in bounds.iter().enumerate() {
        let width = upper - lower;
        if !width.is_finite() {
            return Err(CollocationError::InvalidBounds { slot, lower, upper });
        }
        if width == 0.0 {
            if strict {
                return Err(CollocationError::DegenerateBounds { slot, value: lower });
            }
            warn!(
                "zero-width bounds [{}, {}] for slot {}, using scale {} and shift {}",
                lower, upper, slot, NONE_SCALE, NONE_SHIFT
            );
            scale.push(NONE_SCALE);
            shift.push(NONE_SHIFT);
            degenerate.push(slot);
        } else {
            scale.push(width);
            shift.push(upper - width / 2.0);
        }
    }
    Ok((DVector::from_vec(scale), DVector::from_vec(shift), degenerate))
}

fn base_constraint_scale(layout: &ProblemLayout, scale: &DVector<f64>) -> DVector<f64> {
    let mut out = Vec::with_capacity(layout.num_c_unexpanded());
    let mut offset = 0;
    for phase in &layout.phases {
        out.extend(scale.rows(offset, phase.num_y).iter());
        out.extend(std::iter::repeat_n(1.0, phase.num_c_path));
        out.extend(scale.rows(offset + phase.num_yu(), phase.num_q).iter());
        offset += phase.num_x_unexpanded();
    }
    out.extend(std::iter::repeat_n(1.0, layout.num_c_endpoint));
    DVector::from_vec(out)
}
