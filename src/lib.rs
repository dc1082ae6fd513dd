//! # ik-sim
//!
//! Iterative inverse kinematics for bone chains plus a small ball physics
//! world, stepped together once per frame.
//!
//! ## Features
//! - Tip-first rotational IK solver with gradual slerp blending
//! - Chain manager that picks up balls and drops them off by sort key
//! - Euler ball physics with world bounds, ball-ball and ball-box contacts
//! - Statically typed entity store shared by both systems
//! - Flat instance data for any renderer
//!
//! ## Example
//! ```rust,ignore
//! use ik_sim::{Entity, Simulation, SimulationConfig};
//! use glam::Vec3;
//!
//! let mut sim = Simulation::new(SimulationConfig::default())?;
//! let (scene, chains) = sim.parts_mut();
//! let arm = chains.create_chain();
//! chains.add_bone(scene, arm, 0.3, Some(Vec3::new(0.0, 0.5, 0.0)))?;
//! chains.add_bone(scene, arm, 0.3, None)?;
//!
//! sim.scene_mut()
//!     .spawn(Entity::ball(Vec3::new(0.3, 0.1, 0.2), 0.1, Vec3::ZERO))?;
//!
//! let report = sim.tick(1.0 / 60.0);
//! println!("pick-ups this frame: {}", report.ik.pick_ups());
//! ```

pub mod demo;
pub mod error;
pub mod ik;
pub mod instance;
pub mod math;
pub mod physics;
pub mod scene;
pub mod simulation;

pub use error::{Result, SimError};
pub use ik::{
    Bone, Chain, ChainId, ChainManager, IkSolver, SolveResult, SolverConfig, TickReport,
    Transition,
};
pub use instance::{collect_instances, InstanceRaw};
pub use math::{Aabb, Transform};
pub use physics::{ContactSolver, PhysicsConfig, PhysicsWorld, Steering, StepReport};
pub use scene::{ComponentKind, Entity, EntityId, EntityStore, Flag, Scene};
pub use simulation::{FrameReport, Simulation, SimulationConfig};
