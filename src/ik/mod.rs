//! Inverse Kinematics module
//!
//! Bone chains, the iterative tip-first solver, and the manager that picks
//! targets, moves carried balls and mirrors bones into the entity store.

pub mod bone;
pub mod chain;
pub mod manager;
pub mod solver;
pub mod targeting;

pub use bone::Bone;
pub use chain::Chain;
pub use manager::{ChainId, ChainManager, TickReport, Transition};
pub use solver::{IkSolver, SolveResult, SolverConfig, StepResult};
pub use targeting::{select_target, Selection};
