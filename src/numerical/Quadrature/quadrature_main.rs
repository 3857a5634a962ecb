use crate::numerical::Quadrature::legendre::{
    gauss_roots, legendre, legendre_all, legendre_integrals, lobatto_interior_roots,
    radau_interior_roots,
};
use crate::numerical::errors::{CollocationError, CollocationResult, check_len};
use log::{debug, info};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;
use strum_macros::{EnumIter, EnumString};

/// Collocation node families
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, strum_macros::Display,
    Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum QuadratureMethod {
    /// Legendre-Gauss: interior roots of P_n, no endpoint
    Gauss,
    /// Legendre-Gauss-Radau, collocated at -1, with +1 as terminal support node
    Radau,
    /// Legendre-Gauss-Lobatto: both endpoints
    Lobatto,
}

impl QuadratureMethod {
    pub fn parse(name: &str) -> CollocationResult<Self> {
        QuadratureMethod::from_str(name.trim())
            .map_err(|_| CollocationError::UnsupportedScheme(name.to_string()))
    }
}

/// Nodes, weights and the collocation matrices for one `(order, method)` pair.
///
/// Everything lives on the reference interval [-1, 1]; the weights sum to 2.
#[derive(Debug, Clone)]
pub struct QuadratureSet {
    pub method: QuadratureMethod,
    pub order: usize,
    pub nodes: DVector<f64>,
    pub weights: DVector<f64>,
    /// `D[(i, j)] = L_j'(nodes[i])`
    pub D: DMatrix<f64>,
    /// `A[(i, j)] = ∫_{-1}^{nodes[i]} L_j(s) ds`
    pub A: DMatrix<f64>,
}

impl Display for QuadratureSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "QuadratureSet {{ method: {}, order: {}, nodes: {:?} }}",
            self.method,
            self.order,
            self.nodes.as_slice()
        )
    }
}

impl QuadratureSet {
    pub fn generate(order: usize, method: QuadratureMethod) -> CollocationResult<QuadratureSet> {
        if order < 2 {
            return Err(CollocationError::InvalidOrder(order));
        }
        let (nodes, weights) = match method {
            QuadratureMethod::Gauss => gauss_nodes_weights(order)?,
            QuadratureMethod::Radau => radau_nodes_weights(order)?,
            QuadratureMethod::Lobatto => lobatto_nodes_weights(order)?,
        };
        let D = differentiation_matrix(&nodes);
        let A = integration_matrix(&nodes)?;
        debug!(
            "generated {} quadrature of order {}: nodes {:?}",
            method,
            order,
            nodes.as_slice()
        );
        Ok(QuadratureSet {
            method,
            order,
            nodes,
            weights,
            D,
            A,
        })
    }

    /// Number of nodes at which the dynamics are enforced. For Radau the terminal
    /// support node is not collocated.
    pub fn num_collocation_points(&self) -> usize {
        match self.method {
            QuadratureMethod::Radau => self.order - 1,
            QuadratureMethod::Gauss | QuadratureMethod::Lobatto => self.order,
        }
    }

    /// Weights normalized to the unit interval [0, 1] (sum 1)
    pub fn unit_weights(&self) -> DVector<f64> {
        &self.weights / 2.0
    }

    /// Nodes mapped affinely from [-1, 1] onto [t0, tf]
    pub fn nodes_on(&self, t0: f64, tf: f64) -> DVector<f64> {
        let half = 0.5 * (tf - t0);
        self.nodes.map(|tau| t0 + half * (tau + 1.0))
    }

    /// Weighted sum of nodal values over [-1, 1]
    pub fn integrate(&self, values: &DVector<f64>) -> CollocationResult<f64> {
        check_len("quadrature values", self.order, values.len())?;
        Ok(self.weights.dot(values))
    }
}

fn gauss_nodes_weights(n: usize) -> CollocationResult<(DVector<f64>, DVector<f64>)> {
    let nodes = gauss_roots(n)?;
    let weights: Vec<f64> = nodes
        .iter()
        .map(|&x| {
            let dp = legendre(n, x).dp;
            2.0 / ((1.0 - x * x) * dp * dp)
        })
        .collect();
    Ok((DVector::from_vec(nodes), DVector::from_vec(weights)))
}

fn radau_nodes_weights(order: usize) -> CollocationResult<(DVector<f64>, DVector<f64>)> {
    let m = order - 1;
    let mf = m as f64;
    let mut nodes = Vec::with_capacity(order);
    let mut weights = Vec::with_capacity(order);
    nodes.push(-1.0);
    weights.push(2.0 / (mf * mf));
    for x in radau_interior_roots(m)? {
        let p_prev = legendre(m, x).p_prev;
        nodes.push(x);
        weights.push((1.0 - x) / (mf * mf * p_prev * p_prev));
    }
    nodes.push(1.0);
    weights.push(0.0);
    Ok((DVector::from_vec(nodes), DVector::from_vec(weights)))
}

fn lobatto_nodes_weights(order: usize) -> CollocationResult<(DVector<f64>, DVector<f64>)> {
    let n = order - 1;
    let scale = 2.0 / (order as f64 * n as f64);
    let mut nodes = Vec::with_capacity(order);
    nodes.push(-1.0);
    nodes.extend(lobatto_interior_roots(n)?);
    nodes.push(1.0);
    let weights: Vec<f64> = nodes
        .iter()
        .map(|&x| {
            let p = legendre(n, x).p;
            scale / (p * p)
        })
        .collect();
    Ok((DVector::from_vec(nodes), DVector::from_vec(weights)))
}

fn barycentric_weights(nodes: &DVector<f64>) -> Vec<f64> {
    let n = nodes.len();
    (0..n)
        .map(|j| {
            let prod: f64 = (0..n)
                .filter(|&k| k != j)
                .map(|k| nodes[j] - nodes[k])
                .product();
            1.0 / prod
        })
        .collect()
}

/// Lagrange differentiation matrix on the given nodes
pub fn differentiation_matrix(nodes: &DVector<f64>) -> DMatrix<f64> {
    let n = nodes.len();
    let w = barycentric_weights(nodes);
    let mut D = DMatrix::zeros(n, n);
    for i in 0..n {
        let mut diag = 0.0;
        for j in 0..n {
            if i != j {
                let value = (w[j] / w[i]) / (nodes[i] - nodes[j]);
                D[(i, j)] = value;
                diag -= value;
            }
        }
        // rows sum to zero so constants differentiate to zero
        D[(i, i)] = diag;
    }
    D
}

/// Lagrange integration matrix on the given nodes, computed in the Legendre basis:
/// `A = Q V⁻¹` with `V[(i, k)] = P_k(x_i)` and `Q[(i, k)] = ∫_{-1}^{x_i} P_k`.
pub fn integration_matrix(nodes: &DVector<f64>) -> CollocationResult<DMatrix<f64>> {
    let n = nodes.len();
    let mut V = DMatrix::zeros(n, n);
    let mut Q = DMatrix::zeros(n, n);
    for (i, &x) in nodes.iter().enumerate() {
        let p = legendre_all(n - 1, x);
        let q = legendre_integrals(n - 1, x);
        for k in 0..n {
            V[(i, k)] = p[k];
            Q[(i, k)] = q[k];
        }
    }
    // A V = Q  <=>  Vᵀ Aᵀ = Qᵀ
    let At = V
        .transpose()
        .lu()
        .solve(&Q.transpose())
        .ok_or(CollocationError::SingularMatrix("Legendre-Vandermonde"))?;
    Ok(At.transpose())
}

/// Memo of quadrature sets. Phases and mesh intervals ask for the same
/// `(order, method)` pairs over and over during one solve.
#[derive(Debug, Default)]
pub struct QuadratureCache {
    sets: HashMap<(usize, QuadratureMethod), Arc<QuadratureSet>>,
}

impl QuadratureCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(
        &mut self,
        order: usize,
        method: QuadratureMethod,
    ) -> CollocationResult<Arc<QuadratureSet>> {
        if let Some(set) = self.sets.get(&(order, method)) {
            return Ok(Arc::clone(set));
        }
        let set = Arc::new(QuadratureSet::generate(order, method)?);
        self.sets.insert((order, method), Arc::clone(&set));
        info!("cached {} quadrature of order {}", method, order);
        Ok(set)
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn clear(&mut self) {
        self.sets.clear();
    }
}
