//! Entity storage
//!
//! A small, statically typed entity store. The IK and physics code only talk
//! to it through the [`EntityStore`] trait.

mod entity;
mod store;

pub use entity::{BoneLink, ComponentKind, Entity, EntityId, Flag};
pub use store::{EntityStore, Scene};
