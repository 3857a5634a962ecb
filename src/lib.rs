// Copyright (c)  by Gleb E. Zaslavkiy
//MIT License
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
//! Collocation quadrature and NLP scaling for direct transcription of multi-phase
//! optimal control problems.
//!
//! ```
//! use RustedCollo::numerical::Quadrature::{QuadratureMethod, QuadratureSet};
//! let set = QuadratureSet::generate(3, QuadratureMethod::Lobatto).unwrap();
//! assert_eq!(set.nodes.len(), 3);
//! assert_eq!(set.nodes[0], -1.0);
//! assert!((set.weights.sum() - 2.0).abs() < 1e-14);
//! ```
pub mod Examples;
pub mod Utils;
pub mod numerical;
