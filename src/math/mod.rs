//! Math utilities module
//!
//! Provides convenient re-exports from glam plus the transform and box types
//! shared by the IK and physics code.

mod aabb;
mod transform;

pub use aabb::Aabb;
pub use transform::Transform;

// Re-export commonly used glam types
pub use glam::{Mat4, Quat, Vec3};
