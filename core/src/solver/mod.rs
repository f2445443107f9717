//! Numerical mate solver.
//!
//! Resolves each mate's references to geometry, scores every mate with its
//! error metric and runs damped gradient descent on the poses of the movable
//! components. The best poses seen are returned even when the iteration
//! budget runs out.

pub mod config;
pub mod engine;
pub mod metrics;
pub mod resolve;
pub mod result;


pub use config::SolverConfig;
pub use engine::{solve_assembly, MateSolver};
pub use resolve::{GeometryResolver, PlaceholderResolver, RegistryResolver};
pub use result::{SolveResult, SolveStatus};
