//! # Collocation quadrature
//!
//! Node sets, quadrature weights and the Lagrange differentiation/integration
//! matrices for the three Legendre collocation families:
//!
//! - [`QuadratureMethod::Gauss`] (LG): `order` roots of `P_order`, no endpoint
//! - [`QuadratureMethod::Radau`] (LGR): `order - 1` collocation points starting at -1,
//!   followed by the non-collocated terminal node +1 (weight 0)
//! - [`QuadratureMethod::Lobatto`] (LGL): -1, the roots of `P'_{order-1}`, and +1
//!
//! Sets are pure functions of `(order, method)`, so [`QuadratureCache`] hands out
//! shared [`std::sync::Arc`] copies.
pub mod legendre;
pub mod quadrature_main;
mod quadrature_tests;

pub use quadrature_main::{QuadratureCache, QuadratureMethod, QuadratureSet};
