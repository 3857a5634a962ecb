/// error type shared by every numerical module
pub mod errors;
/// Gauss, Radau and Lobatto collocation node sets with their weights and matrices
pub mod Quadrature;
/// basis and per-iteration scaling of NLP variables, objective and constraints
pub mod Scaling;
/// piecewise collocation mesh of each phase
pub mod mesh;
/// configuration, loadable from TOML
pub mod settings;
