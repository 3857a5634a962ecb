//! Numeric callables the scaling needs from the NLP backend: the objective gradient
//! and the sparse constraint Jacobian with its sparsity pattern.
use crate::numerical::errors::{CollocationError, CollocationResult, check_len};
use nalgebra::DVector;
use sprs::{CsMat, TriMat};

pub trait ScalingEvaluator {
    /// `∇J(x)`, one entry per decision variable
    fn gradient(&self, x: &DVector<f64>) -> DVector<f64>;
    /// Nonzero values of `∂c/∂x` in the order of [`ScalingEvaluator::jacobian_structure`]
    fn jacobian_values(&self, x: &DVector<f64>) -> Vec<f64>;
    /// `(rows, cols)` of the Jacobian nonzeros
    fn jacobian_structure(&self) -> (Vec<usize>, Vec<usize>);
}

type GradientFn = Box<dyn Fn(&DVector<f64>) -> DVector<f64>>;
type JacobianFn = Box<dyn Fn(&DVector<f64>) -> Vec<f64>>;

/// Evaluator assembled from closures, e.g. lambdified problem functions
pub struct ClosureEvaluator {
    gradient: GradientFn,
    jacobian: JacobianFn,
    rows: Vec<usize>,
    cols: Vec<usize>,
}

impl ClosureEvaluator {
    pub fn new(
        gradient: GradientFn,
        jacobian: JacobianFn,
        rows: Vec<usize>,
        cols: Vec<usize>,
    ) -> CollocationResult<Self> {
        check_len("Jacobian sparsity pattern", rows.len(), cols.len())?;
        Ok(ClosureEvaluator {
            gradient,
            jacobian,
            rows,
            cols,
        })
    }
}

impl ScalingEvaluator for ClosureEvaluator {
    fn gradient(&self, x: &DVector<f64>) -> DVector<f64> {
        (self.gradient)(x)
    }

    fn jacobian_values(&self, x: &DVector<f64>) -> Vec<f64> {
        (self.jacobian)(x)
    }

    fn jacobian_structure(&self) -> (Vec<usize>, Vec<usize>) {
        (self.rows.clone(), self.cols.clone())
    }
}

/// Assemble triplets into CSR, summing duplicate entries
pub fn sparse_jacobian(
    values: Vec<f64>,
    rows: Vec<usize>,
    cols: Vec<usize>,
    shape: (usize, usize),
) -> CollocationResult<CsMat<f64>> {
    check_len("Jacobian rows", values.len(), rows.len())?;
    check_len("Jacobian cols", values.len(), cols.len())?;
    if let Some(&r) = rows.iter().find(|&&r| r >= shape.0) {
        return Err(CollocationError::dimension("Jacobian row index", shape.0, r + 1));
    }
    if let Some(&c) = cols.iter().find(|&&c| c >= shape.1) {
        return Err(CollocationError::dimension("Jacobian column index", shape.1, c + 1));
    }
    let triplets = TriMat::from_triplets(shape, rows, cols, values);
    Ok(triplets.to_csr())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparse_jacobian_assembly() {
        let m = sparse_jacobian(vec![1.0, 2.0, 3.0, 4.0], vec![0, 1, 1, 0], vec![0, 2, 2, 1], (2, 3)).unwrap();
        assert_eq!(m.rows(), 2);
        assert_eq!(m.cols(), 3);
        // duplicates summed
        assert_eq!(m.get(1, 2), Some(&5.0));
        assert_eq!(m.get(0, 1), Some(&4.0));
        assert_eq!(m.get(1, 0), None);
    }

    #[test]
    fn test_sparse_jacobian_checks() {
        assert!(sparse_jacobian(vec![1.0], vec![0, 1], vec![0], (2, 2)).is_err());
        assert!(sparse_jacobian(vec![1.0], vec![2], vec![0], (2, 2)).is_err());
        assert!(sparse_jacobian(vec![1.0], vec![0], vec![5], (2, 2)).is_err());
    }

    #[test]
    fn test_closure_evaluator() {
        let ev = ClosureEvaluator::new(
            Box::new(|x: &DVector<f64>| x * 2.0),
            Box::new(|x: &DVector<f64>| vec![x[0], x[1]]),
            vec![0, 0],
            vec![0, 1],
        )
        .unwrap();
        let x = DVector::from_vec(vec![1.0, 3.0]);
        assert_eq!(ev.gradient(&x)[1], 6.0);
        assert_eq!(ev.jacobian_values(&x), vec![1.0, 3.0]);
        assert_eq!(ev.jacobian_structure().1, vec![0, 1]);
        assert!(ClosureEvaluator::new(Box::new(|x: &DVector<f64>| x.clone()), Box::new(|_: &DVector<f64>| vec![]), vec![0], vec![]).is_err());
    }
}
