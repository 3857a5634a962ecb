//! Variable/constraint bounds of an OCP and the layout of its decision vector.
//!
//! OCP-level slot ordering, per phase: states, controls, integrals, then the
//! initial/final time when they are decision variables. Static parameters follow
//! the last phase. The mesh-expanded ordering repeats every state and control entry
//! once per mesh node (entry-major) and keeps the other slots scalar.
use crate::numerical::errors::{CollocationError, CollocationResult, check_len};
use crate::numerical::mesh::Mesh;
use nalgebra::DVector;

/// `(lower, upper)`
pub type BoundPair = (f64, f64);

#[derive(Debug, Clone, Default)]
pub struct PhaseBounds {
    pub initial_time: Option<BoundPair>,
    pub final_time: Option<BoundPair>,
    pub state_variables: Vec<BoundPair>,
    pub control_variables: Vec<BoundPair>,
    pub integral_variables: Vec<BoundPair>,
    pub path_constraints: Vec<BoundPair>,
}

impl PhaseBounds {
    pub fn layout(&self) -> PhaseLayout {
        PhaseLayout {
            num_y: self.state_variables.len(),
            num_u: self.control_variables.len(),
            num_q: self.integral_variables.len(),
            num_t: self.initial_time.iter().count() + self.final_time.iter().count(),
            num_c_path: self.path_constraints.len(),
        }
    }

    fn variable_bounds(&self) -> impl Iterator<Item = BoundPair> + '_ {
        self.state_variables
            .iter()
            .chain(self.control_variables.iter())
            .chain(self.integral_variables.iter())
            .chain(self.initial_time.iter())
            .chain(self.final_time.iter())
            .copied()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Bounds {
    pub phases: Vec<PhaseBounds>,
    pub parameter_variables: Vec<BoundPair>,
    pub endpoint_constraints: Vec<BoundPair>,
}

impl Bounds {
    pub fn layout(&self) -> ProblemLayout {
        ProblemLayout {
            phases: self.phases.iter().map(PhaseBounds::layout).collect(),
            num_s: self.parameter_variables.len(),
            num_c_endpoint: self.endpoint_constraints.len(),
        }
    }

    /// Variable bounds in the global OCP-level ordering
    pub fn variable_bounds(&self) -> Vec<BoundPair> {
        self.phases
            .iter()
            .flat_map(PhaseBounds::variable_bounds)
            .chain(self.parameter_variables.iter().copied())
            .collect()
    }
}

/// Slot counts of one phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PhaseLayout {
    pub num_y: usize,
    pub num_u: usize,
    pub num_q: usize,
    pub num_t: usize,
    pub num_c_path: usize,
}

impl PhaseLayout {
    pub fn num_yu(&self) -> usize {
        self.num_y + self.num_u
    }

    pub fn num_qt(&self) -> usize {
        self.num_q + self.num_t
    }

    pub fn num_x_unexpanded(&self) -> usize {
        self.num_yu() + self.num_qt()
    }

    pub fn num_x(&self, num_nodes: usize) -> usize {
        self.num_yu() * num_nodes + self.num_qt()
    }

    /// OCP-level constraint entries: defect per state, path, integral
    pub fn num_c_unexpanded(&self) -> usize {
        self.num_y + self.num_c_path + self.num_q
    }

    pub fn num_c(&self, num_nodes: usize) -> usize {
        (self.num_y + self.num_c_path) * num_nodes + self.num_q
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProblemLayout {
    pub phases: Vec<PhaseLayout>,
    pub num_s: usize,
    pub num_c_endpoint: usize,
}

impl ProblemLayout {
    pub fn num_x_unexpanded(&self) -> usize {
        self.phases.iter().map(PhaseLayout::num_x_unexpanded).sum::<usize>() + self.num_s
    }

    pub fn num_c_unexpanded(&self) -> usize {
        self.phases.iter().map(PhaseLayout::num_c_unexpanded).sum::<usize>() + self.num_c_endpoint
    }

    fn check_mesh(&self, mesh: &Mesh) -> CollocationResult<()> {
        check_len("mesh phases", self.phases.len(), mesh.num_phases())
    }

    pub fn num_x(&self, mesh: &Mesh) -> CollocationResult<usize> {
        self.check_mesh(mesh)?;
        Ok(self
            .phases
            .iter()
            .zip(mesh.phases.iter())
            .map(|(p, m)| p.num_x(m.num_nodes()))
            .sum::<usize>()
            + self.num_s)
    }

    pub fn num_c(&self, mesh: &Mesh) -> CollocationResult<usize> {
        self.check_mesh(mesh)?;
        Ok(self
            .phases
            .iter()
            .zip(mesh.phases.iter())
            .map(|(p, m)| p.num_c(m.num_nodes()))
            .sum::<usize>()
            + self.num_c_endpoint)
    }

    /// Broadcast an OCP-level variable vector (scale or shift) onto the mesh
    pub fn expand_to_mesh(&self, mesh: &Mesh, basis: &DVector<f64>) -> CollocationResult<DVector<f64>> {
        check_len("OCP-level variable vector", self.num_x_unexpanded(), basis.len())?;
        let num_x = self.num_x(mesh)?;
        let mut out = Vec::with_capacity(num_x);
        let mut offset = 0;
        for (phase, phase_mesh) in self.phases.iter().zip(mesh.phases.iter()) {
            let n = phase_mesh.num_nodes();
            for i in 0..phase.num_yu() {
                out.extend(std::iter::repeat_n(basis[offset + i], n));
            }
            offset += phase.num_yu();
            out.extend(basis.rows(offset, phase.num_qt()).iter());
            offset += phase.num_qt();
        }
        out.extend(basis.rows(offset, self.num_s).iter());
        check_len("mesh-expanded variable vector", num_x, out.len())?;
        Ok(DVector::from_vec(out))
    }

    /// Broadcast an OCP-level constraint vector onto the mesh: defect and path
    /// entries once per node, integral and endpoint entries once
    pub fn expand_constraints_to_mesh(
        &self,
        mesh: &Mesh,
        basis: &DVector<f64>,
    ) -> CollocationResult<DVector<f64>> {
        check_len("OCP-level constraint vector", self.num_c_unexpanded(), basis.len())?;
        let num_c = self.num_c(mesh)?;
        let mut out = Vec::with_capacity(num_c);
        let mut offset = 0;
        for (phase, phase_mesh) in self.phases.iter().zip(mesh.phases.iter()) {
            let n = phase_mesh.num_nodes();
            let per_node = phase.num_y + phase.num_c_path;
            for i in 0..per_node {
                out.extend(std::iter::repeat_n(basis[offset + i], n));
            }
            offset += per_node;
            out.extend(basis.rows(offset, phase.num_q).iter());
            offset += phase.num_q;
        }
        out.extend(basis.rows(offset, self.num_c_endpoint).iter());
        check_len("mesh-expanded constraint vector", num_c, out.len())?;
        Ok(DVector::from_vec(out))
    }

    /// `(constraint row, variable index)` pairs tying each defect row to its state
    /// node and each integral row to its integral variable
    pub fn constraint_variable_links(&self, mesh: &Mesh) -> CollocationResult<Vec<(usize, usize)>> {
        self.check_mesh(mesh)?;
        let mut links = Vec::new();
        let (mut x_offset, mut c_offset) = (0, 0);
        for (phase, phase_mesh) in self.phases.iter().zip(mesh.phases.iter()) {
            let n = phase_mesh.num_nodes();
            let num_defect = phase.num_y * n;
            links.extend((0..num_defect).map(|k| (c_offset + k, x_offset + k)));
            let c_integral = c_offset + num_defect + phase.num_c_path * n;
            let x_integral = x_offset + phase.num_yu() * n;
            links.extend((0..phase.num_q).map(|k| (c_integral + k, x_integral + k)));
            x_offset += phase.num_x(n);
            c_offset += phase.num_c(n);
        }
        Ok(links)
    }

    /// Index ranges of the state/control node blocks of every variable, as
    /// `(OCP-level slot, first expanded index, count)`, followed by the scalar slots
    /// with a count of 1
    pub fn variable_blocks(&self, mesh: &Mesh) -> CollocationResult<Vec<VariableBlock>> {
        self.check_mesh(mesh)?;
        let mut blocks = Vec::with_capacity(self.num_x_unexpanded());
        let (mut slot, mut index) = (0, 0);
        for (phase, phase_mesh) in self.phases.iter().zip(mesh.phases.iter()) {
            let n = phase_mesh.num_nodes();
            for _ in 0..phase.num_yu() {
                blocks.push(VariableBlock { slot, start: index, len: n, nodal: true });
                slot += 1;
                index += n;
            }
            for _ in 0..phase.num_qt() {
                blocks.push(VariableBlock { slot, start: index, len: 1, nodal: false });
                slot += 1;
                index += 1;
            }
        }
        for _ in 0..self.num_s {
            blocks.push(VariableBlock { slot, start: index, len: 1, nodal: false });
            slot += 1;
            index += 1;
        }
        Ok(blocks)
    }
}

/// Where one OCP-level slot lives in the mesh-expanded vector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableBlock {
    pub slot: usize,
    pub start: usize,
    pub len: usize,
    /// state or control, repeated per node
    pub nodal: bool,
}

/// Reject reversed or non-finite pairs
pub fn validate_pair(slot: usize, (lower, upper): BoundPair) -> CollocationResult<()> {
    if !lower.is_finite() || !upper.is_finite() || lower > upper {
        return Err(CollocationError::InvalidBounds { slot, lower, upper });
    }
    Ok(())
}
