#![allow(non_snake_case)]
//! Hypersensitive problem
//! ```text
//! min J = q,  q = ∫ ½(y² + u²) dt
//! dy/dt = -y³ + u,  y(0) = 1.5,  y(tF) = 1,  tF = 10000
//! ```
//! transcribed on a piecewise collocation mesh. `x = [y; N], [u; N], q, t0, tF`,
//! constraints `[defects; N], integral, y(t0), y(tF)`.
use crate::Utils::logger::{init_logger, save_vectors_to_csv};
use crate::numerical::Quadrature::{QuadratureCache, QuadratureMethod, QuadratureSet};
use crate::numerical::Scaling::{
    BasisScaling, Bounds, IterationScaling, PhaseBounds, ScalingEvaluator, ScalingHistory,
};
use crate::numerical::errors::CollocationResult;
use crate::numerical::mesh::{Mesh, PhaseMesh};
use crate::numerical::settings::CollocationSettings;
use log::info;
use nalgebra::DVector;
use std::sync::Arc;
use strum::IntoEnumIterator;

pub fn hypersensitive_bounds() -> Bounds {
    Bounds {
        phases: vec![PhaseBounds {
            initial_time: Some((0.0, 0.0)),
            final_time: Some((10000.0, 10000.0)),
            state_variables: vec![(0.0, 2.0)],
            control_variables: vec![(-1.0, 8.0)],
            integral_variables: vec![(0.0, 2000.0)],
            path_constraints: vec![],
        }],
        parameter_variables: vec![],
        endpoint_constraints: vec![(1.5, 1.5), (1.0, 1.0)],
    }
}

/// Values and sparsity of the transcribed hypersensitive NLP on one mesh
pub struct HypersensitiveProblem {
    sets: Vec<Arc<QuadratureSet>>,
    fractions: Vec<f64>,
    num_nodes: usize,
}

impl HypersensitiveProblem {
    pub fn new(
        mesh: &PhaseMesh,
        cache: &mut QuadratureCache,
        method: QuadratureMethod,
    ) -> CollocationResult<Self> {
        let sets = mesh
            .collocation_points
            .iter()
            .map(|&n| cache.get(n, method))
            .collect::<CollocationResult<Vec<_>>>()?;
        Ok(HypersensitiveProblem {
            sets,
            fractions: mesh.section_fractions.clone(),
            num_nodes: mesh.num_nodes(),
        })
    }

    fn num_x(&self) -> usize {
        2 * self.num_nodes + 3
    }

    /// section number, offset of its first node and its quadrature set
    fn sections(&self) -> impl Iterator<Item = (usize, usize, &QuadratureSet)> {
        let mut offset = 0;
        self.sets.iter().enumerate().map(move |(s, set)| {
            let start = offset;
            offset += set.order;
            (s, start, set.as_ref())
        })
    }

    /// Linear state guess from y(0) to y(tF), control zero
    pub fn initial_guess(&self, node_times: &DVector<f64>) -> DVector<f64> {
        let n = self.num_nodes;
        let mut x = DVector::zeros(self.num_x());
        for (i, &tau) in node_times.iter().enumerate() {
            x[i] = 1.5 - 0.5 * tau;
            x[n + i] = 0.1 * (1.0 - tau);
        }
        x[2 * n] = 100.0;
        x[2 * n + 1] = 0.0;
        x[2 * n + 2] = 10000.0;
        x
    }
}

fn dynamics(y: f64, u: f64) -> f64 {
    -y.powi(3) + u
}

impl ScalingEvaluator for HypersensitiveProblem {
    fn gradient(&self, _x: &DVector<f64>) -> DVector<f64> {
        let mut g = DVector::zeros(self.num_x());
        g[2 * self.num_nodes] = 1.0;
        g
    }

    fn jacobian_values(&self, x: &DVector<f64>) -> Vec<f64> {
        let n = self.num_nodes;
        let (t0, tF) = (x[2 * n + 1], x[2 * n + 2]);
        let mut values = Vec::new();
        // defects Σ_j D_kj y_j - c_s f(y_k, u_k),  c_s = (tF - t0) h_s / 2
        for (s, start, set) in self.sections() {
            let half = 0.5 * self.fractions[s];
            let c = (tF - t0) * half;
            for k in 0..set.order {
                let (y, u) = (x[start + k], x[n + start + k]);
                for j in 0..set.order {
                    let mut d = set.D[(k, j)];
                    if j == k {
                        d += c * 3.0 * y * y;
                    }
                    values.push(d);
                }
                values.push(-c);
                let f = dynamics(y, u);
                values.extend([half * f, -half * f]);
            }
        }
        // integral q - Σ_s c_s Σ_k w_k ½(y_k² + u_k²)
        let mut dy = vec![0.0; n];
        let mut du = vec![0.0; n];
        let mut dt = 0.0;
        for (s, start, set) in self.sections() {
            let half = 0.5 * self.fractions[s];
            let c = (tF - t0) * half;
            for k in 0..set.order {
                let (y, u) = (x[start + k], x[n + start + k]);
                let w = set.weights[k];
                dy[start + k] = -c * w * y;
                du[start + k] = -c * w * u;
                dt += half * w * 0.5 * (y * y + u * u);
            }
        }
        values.extend(dy);
        values.extend(du);
        values.extend([1.0, dt, -dt]);
        // y(t0), y(tF)
        values.extend([1.0, 1.0]);
        values
    }

    fn jacobian_structure(&self) -> (Vec<usize>, Vec<usize>) {
        let n = self.num_nodes;
        let mut rows = Vec::new();
        let mut cols = Vec::new();
        for (_, start, set) in self.sections() {
            for k in 0..set.order {
                let row = start + k;
                for j in 0..set.order {
                    rows.push(row);
                    cols.push(start + j);
                }
                rows.extend([row; 3]);
                cols.extend([n + row, 2 * n + 1, 2 * n + 2]);
            }
        }
        rows.extend(std::iter::repeat_n(n, 2 * n + 3));
        cols.extend(0..2 * n + 3);
        rows.extend([n + 1, n + 2]);
        cols.extend([0, n - 1]);
        (rows, cols)
    }
}

/// Two mesh iterations of the scaling pipeline; the second refines every section
/// and blends with the first
pub fn hypersensitive_scaling(settings: &CollocationSettings, save: bool) -> CollocationResult<ScalingHistory> {
    let method = settings.quadrature_method;
    let bounds = hypersensitive_bounds();
    let basis = BasisScaling::generate(&bounds, &settings.scaling)?;
    let mut cache = QuadratureCache::new();
    let mut history = ScalingHistory::new();
    let meshes = [PhaseMesh::uniform(10, 4)?, PhaseMesh::uniform(20, 5)?];
    for phase_mesh in meshes {
        let problem = HypersensitiveProblem::new(&phase_mesh, &mut cache, method)?;
        let guess = problem.initial_guess(&phase_mesh.node_times(&mut cache, method)?);
        let mesh = Mesh::new(vec![phase_mesh])?;
        let scaling = IterationScaling::new(&basis, &mesh, &guess, &problem, &settings.scaling, &history)?;
        let x_scaled = scaling.scale_x(&guess)?;
        info!(
            "iteration {}: {} nodes, objective scale {:e}, scaled guess in [{:.3}, {:.3}]",
            scaling.iteration,
            mesh.N()[0],
            scaling.objective_scale(),
            x_scaled.min(),
            x_scaled.max()
        );
        if save {
            let filename = format!("hypersensitive_scaling_{}.csv", scaling.iteration);
            save_vectors_to_csv(
                &["x_scale", "x_shift", "x_scaled"],
                &[scaling.x_scale(), scaling.x_shift(), &x_scaled],
                filename,
            )?;
        }
        history.push(scaling.record())?;
    }
    Ok(history)
}

pub fn scaling_examples(example: usize) -> CollocationResult<()> {
    match example {
        0 => {
            // default settings, blending on
            let settings = CollocationSettings::default();
            init_logger(settings.log_level_filter()?, None)?;
            let history = hypersensitive_scaling(&settings, true)?;
            for record in history.records() {
                println!(
                    "iteration {}: objective scale {:e}, basis scale {}",
                    record.iteration,
                    record.objective_scale,
                    record.x_scale.transpose()
                );
            }
        }
        1 => {
            // quadrature tables of every scheme
            let mut cache = QuadratureCache::new();
            for method in QuadratureMethod::iter() {
                for order in 2..=5 {
                    println!("{}", cache.get(order, method)?);
                }
            }
        }
        2 => {
            // settings from TOML
            let input = r#"
                quadrature_method = "radau"
                log_level = "debug"

                [scaling]
                update_weight = 0.5
            "#;
            let settings = CollocationSettings::from_toml_str(input)?;
            init_logger(settings.log_level_filter()?, None)?;
            let history = hypersensitive_scaling(&settings, false)?;
            println!("{} iterations recorded", history.len());
        }
        _ => {
            println!("example {} is not defined", example);
        }
    }
    Ok(())
}
