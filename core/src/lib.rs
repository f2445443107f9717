//! Assembly mate-constraint solving.
//!
//! Components are rigid bodies with a [`ComponentTransform`](geometry::ComponentTransform).
//! Mates declare relationships between features on two components. The
//! [`MateSolver`](solver::MateSolver) moves the non-fixed components until the
//! mates hold as closely as gradient descent can get them.

pub mod assembly;
pub mod error;
pub mod geometry;
pub mod ids;
pub mod mates;
pub mod solver;

pub use assembly::{Assembly, Component};
pub use error::{MateError, MateResult};
pub use ids::{ComponentId, MateId};
pub use mates::{Mate, MateManager, MateReference, MateType};
pub use solver::{solve_assembly, MateSolver, SolveResult, SolveStatus, SolverConfig};

pub fn version() -> &'static str {
    "0.1.0"
}
