//! Ball physics
//!
//! Explicit Euler integration inside an axis-aligned world box, with
//! sphere-sphere and sphere-box contact response.

mod contact;
mod world;

pub use contact::{BodyState, ContactSolver};
pub use world::{PhysicsConfig, PhysicsWorld, Steering, StepReport};
