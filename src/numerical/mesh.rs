//! Mesh of a multi-phase problem as handed over by the refinement loop.
//!
//! Each phase horizon is split into sections (mesh intervals). Section `k` carries a
//! length fraction of the normalized horizon [0, 1] and a collocation point count
//! `N_k`, which is also the quadrature order used on that section.
use crate::numerical::Quadrature::{QuadratureCache, QuadratureMethod};
use crate::numerical::errors::{CollocationError, CollocationResult};
use nalgebra::DVector;

const FRACTION_TOL: f64 = 1e-10;

#[derive(Debug, Clone, PartialEq)]
pub struct PhaseMesh {
    pub collocation_points: Vec<usize>,
    pub section_fractions: Vec<f64>,
}

impl PhaseMesh {
    pub fn new(collocation_points: Vec<usize>, section_fractions: Vec<f64>) -> CollocationResult<Self> {
        if collocation_points.is_empty() {
            return Err(CollocationError::InvalidMesh("phase mesh has no sections".to_string()));
        }
        if collocation_points.len() != section_fractions.len() {
            return Err(CollocationError::InvalidMesh(format!(
                "{} point counts for {} section fractions",
                collocation_points.len(),
                section_fractions.len()
            )));
        }
        if let Some(n) = collocation_points.iter().find(|&&n| n < 2) {
            return Err(CollocationError::InvalidMesh(format!(
                "section with {} collocation points, at least 2 required",
                n
            )));
        }
        if section_fractions.iter().any(|&f| f <= 0.0 || !f.is_finite()) {
            return Err(CollocationError::InvalidMesh(
                "section fractions must be positive".to_string(),
            ));
        }
        let total: f64 = section_fractions.iter().sum();
        if (total - 1.0).abs() > FRACTION_TOL {
            return Err(CollocationError::InvalidMesh(format!(
                "section fractions sum to {}, expected 1",
                total
            )));
        }
        Ok(PhaseMesh {
            collocation_points,
            section_fractions,
        })
    }

    /// `num_sections` equal sections with `points` collocation points each
    pub fn uniform(num_sections: usize, points: usize) -> CollocationResult<Self> {
        Self::uniform_with_points(vec![points; num_sections])
    }

    /// Equal sections with the given point counts
    pub fn uniform_with_points(collocation_points: Vec<usize>) -> CollocationResult<Self> {
        let k = collocation_points.len().max(1);
        let fractions = vec![1.0 / k as f64; collocation_points.len()];
        Self::new(collocation_points, fractions)
    }

    pub fn num_sections(&self) -> usize {
        self.collocation_points.len()
    }

    /// Number of discretization nodes of the phase, `Σ N_k`
    pub fn num_nodes(&self) -> usize {
        self.collocation_points.iter().sum()
    }

    /// Section boundaries on [0, 1]
    pub fn section_boundaries(&self) -> Vec<f64> {
        let mut boundaries = Vec::with_capacity(self.num_sections() + 1);
        boundaries.push(0.0);
        let mut acc = 0.0;
        for f in &self.section_fractions {
            acc += f;
            boundaries.push(acc);
        }
        // pin the last boundary against summation drift
        if let Some(last) = boundaries.last_mut() {
            *last = 1.0;
        }
        boundaries
    }

    /// Quadrature nodes of every section mapped onto the normalized horizon, in mesh order
    pub fn node_times(
        &self,
        cache: &mut QuadratureCache,
        method: QuadratureMethod,
    ) -> CollocationResult<DVector<f64>> {
        let boundaries = self.section_boundaries();
        let mut times = Vec::with_capacity(self.num_nodes());
        for (k, &n) in self.collocation_points.iter().enumerate() {
            let set = cache.get(n, method)?;
            times.extend(set.nodes_on(boundaries[k], boundaries[k + 1]).iter());
        }
        Ok(DVector::from_vec(times))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub phases: Vec<PhaseMesh>,
}

impl Mesh {
    pub fn new(phases: Vec<PhaseMesh>) -> CollocationResult<Self> {
        if phases.is_empty() {
            return Err(CollocationError::InvalidMesh("mesh has no phases".to_string()));
        }
        Ok(Mesh { phases })
    }

    pub fn num_phases(&self) -> usize {
        self.phases.len()
    }

    /// Node count per phase
    pub fn N(&self) -> Vec<usize> {
        self.phases.iter().map(PhaseMesh::num_nodes).collect()
    }
}
