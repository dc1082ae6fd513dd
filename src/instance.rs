//! Render hand-off
//!
//! Flattens the scene into per-instance model matrices a renderer can upload
//! as-is. Nothing here feeds back into the simulation.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::math::Transform;
use crate::scene::{ComponentKind, EntityStore};

pub const KIND_BONE: u32 = 0;
pub const KIND_BALL: u32 = 1;
pub const KIND_BOX: u32 = 2;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4],
    pub kind: u32,
    /// Sort key of balls, 0 otherwise.
    pub tag: i32,
    pub _pad: [u32; 2],
}

impl InstanceRaw {
    pub fn new(transform: &Transform, kind: u32, tag: i32) -> Self {
        Self {
            model: transform.to_matrix().to_cols_array_2d(),
            kind,
            tag,
            _pad: [0; 2],
        }
    }
}

/// Bones first, then balls, then static boxes, each in store order.
///
/// Bone instances carry no scale, the renderer sizes bone meshes itself.
/// Balls are scaled by their radius and boxes by their extents.
pub fn collect_instances<S: EntityStore + ?Sized>(store: &S) -> Vec<InstanceRaw> {
    let mut out = Vec::new();

    for id in store.query(ComponentKind::Bone) {
        if let (Some(position), Some(rotation)) = (store.position(id), store.rotation(id)) {
            let transform = Transform::from_position_rotation(position, rotation);
            out.push(InstanceRaw::new(&transform, KIND_BONE, 0));
        }
    }

    for id in store.query(ComponentKind::Ball) {
        if let (Some(position), Some(radius)) = (store.position(id), store.ball_radius(id)) {
            let transform = Transform::from_position(position).with_scale(Vec3::splat(radius));
            let tag = store.sort_key(id).unwrap_or(0);
            out.push(InstanceRaw::new(&transform, KIND_BALL, tag));
        }
    }

    for id in store.query(ComponentKind::Aabb) {
        if store.ball_radius(id).is_some() {
            continue;
        }
        if let (Some(position), Some(local)) = (store.position(id), store.aabb(id)) {
            let bounds = local.translated(position);
            let transform =
                Transform::from_position(bounds.center()).with_scale(bounds.half_extents() * 2.0);
            out.push(InstanceRaw::new(&transform, KIND_BOX, 0));
        }
    }

    out
}

pub fn as_bytes(instances: &[InstanceRaw]) -> &[u8] {
    bytemuck::cast_slice(instances)
}
