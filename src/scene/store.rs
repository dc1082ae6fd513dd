use glam::{Quat, Vec3};

use super::entity::{BoneLink, ComponentKind, Entity, EntityId, Flag};
use crate::error::{Result, SimError};
use crate::math::Aabb;

/// What the IK and physics code need from an entity store.
///
/// Lookups on an unknown entity return `None`/`false` and writes to one are
/// ignored; a missing component means the entity sits out that subsystem.
pub trait EntityStore {
    /// Entities having `kind`, in stable ascending id order.
    fn query(&self, kind: ComponentKind) -> Vec<EntityId>;

    fn contains(&self, id: EntityId) -> bool;

    fn position(&self, id: EntityId) -> Option<Vec3>;
    fn set_position(&mut self, id: EntityId, position: Vec3);

    fn velocity(&self, id: EntityId) -> Option<Vec3>;
    /// `None` removes the velocity component, taking the body out of
    /// integration.
    fn set_velocity(&mut self, id: EntityId, velocity: Option<Vec3>);

    fn aabb(&self, id: EntityId) -> Option<Aabb>;
    fn ball_radius(&self, id: EntityId) -> Option<f32>;

    fn rotation(&self, id: EntityId) -> Option<Quat>;
    fn set_rotation(&mut self, id: EntityId, rotation: Quat);

    fn flag(&self, id: EntityId, flag: Flag) -> bool;
    fn set_flag(&mut self, id: EntityId, flag: Flag, value: bool);

    fn sort_key(&self, id: EntityId) -> Option<i32>;
    fn bone_link(&self, id: EntityId) -> Option<BoneLink>;
}

/// In-memory entity store. Entities are kept in creation order, which is
/// also ascending id order.
#[derive(Debug, Clone)]
pub struct Scene {
    entities: Vec<(EntityId, Entity)>,
    next_id: u32,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            next_id: 1,
        }
    }

    /// Adds an entity after checking its shape components.
    pub fn spawn(&mut self, entity: Entity) -> Result<EntityId> {
        if let Some(radius) = entity.ball_radius {
            if !radius.is_finite() || radius <= 0.0 {
                return Err(SimError::InvalidRadius(radius));
            }
        }
        if let Some(aabb) = entity.aabb {
            if !aabb.is_valid() {
                return Err(SimError::InvalidAabb);
            }
        }

        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.entities.push((id, entity));
        Ok(id)
    }

    pub fn despawn(&mut self, id: EntityId) -> Result<Entity> {
        let index = self.index_of(id).ok_or(SimError::UnknownEntity(id))?;
        Ok(self.entities.remove(index).1)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.index_of(id).map(|i| &self.entities[i].1)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.index_of(id).map(move |i| &mut self.entities[i].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> + '_ {
        self.entities.iter().map(|(id, e)| (*id, e))
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    fn index_of(&self, id: EntityId) -> Option<usize> {
        self.entities.binary_search_by_key(&id, |(eid, _)| *eid).ok()
    }
}

impl EntityStore for Scene {
    fn query(&self, kind: ComponentKind) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|(_, e)| e.has(kind))
            .map(|(id, _)| *id)
            .collect()
    }

    fn contains(&self, id: EntityId) -> bool {
        self.index_of(id).is_some()
    }

    fn position(&self, id: EntityId) -> Option<Vec3> {
        self.get(id).map(|e| e.position)
    }

    fn set_position(&mut self, id: EntityId, position: Vec3) {
        if let Some(e) = self.get_mut(id) {
            e.position = position;
        }
    }

    fn velocity(&self, id: EntityId) -> Option<Vec3> {
        self.get(id).and_then(|e| e.velocity)
    }

    fn set_velocity(&mut self, id: EntityId, velocity: Option<Vec3>) {
        if let Some(e) = self.get_mut(id) {
            e.velocity = velocity;
        }
    }

    fn aabb(&self, id: EntityId) -> Option<Aabb> {
        self.get(id).and_then(|e| e.aabb)
    }

    fn ball_radius(&self, id: EntityId) -> Option<f32> {
        self.get(id).and_then(|e| e.ball_radius)
    }

    fn rotation(&self, id: EntityId) -> Option<Quat> {
        self.get(id).and_then(|e| e.rotation)
    }

    fn set_rotation(&mut self, id: EntityId, rotation: Quat) {
        if let Some(e) = self.get_mut(id) {
            e.rotation = Some(rotation);
        }
    }

    fn flag(&self, id: EntityId, flag: Flag) -> bool {
        self.get(id).is_some_and(|e| e.flag(flag))
    }

    fn set_flag(&mut self, id: EntityId, flag: Flag, value: bool) {
        if let Some(e) = self.get_mut(id) {
            e.set_flag(flag, value);
        }
    }

    fn sort_key(&self, id: EntityId) -> Option<i32> {
        self.get(id).and_then(|e| e.sort_key)
    }

    fn bone_link(&self, id: EntityId) -> Option<BoneLink> {
        self.get(id).and_then(|e| e.bone)
    }
}
