use glam::{Quat, Vec3};

use crate::ik::ChainId;
use crate::math::Aabb;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(pub u32);

/// The closed set of components the simulation ever looks up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    Position,
    Velocity,
    Aabb,
    Ball,
    Rotation,
    Bone,
    SortKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    /// Excluded from target selection and ball-ball contacts.
    IkIgnore,
    /// Currently carried by a chain tip.
    Held,
}

/// Ties an entity to one bone of one chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoneLink {
    pub chain: ChainId,
    pub bone: usize,
}

/// One entity and its optional components. Every entity has a position.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub position: Vec3,
    pub velocity: Option<Vec3>,
    pub aabb: Option<Aabb>,
    pub ball_radius: Option<f32>,
    pub rotation: Option<Quat>,
    pub bone: Option<BoneLink>,
    pub sort_key: Option<i32>,
    pub ik_ignore: bool,
    pub held: bool,
}

impl Entity {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            velocity: None,
            aabb: None,
            ball_radius: None,
            rotation: None,
            bone: None,
            sort_key: None,
            ik_ignore: false,
            held: false,
        }
    }

    /// A ball body: velocity, radius and a matching local bounding box.
    pub fn ball(position: Vec3, radius: f32, velocity: Vec3) -> Self {
        Self::new(position)
            .with_velocity(velocity)
            .with_ball(radius)
            .with_aabb(Aabb::around_sphere(radius))
    }

    /// A static box given in world coordinates.
    pub fn static_box(bounds: Aabb) -> Self {
        Self::new(Vec3::ZERO).with_aabb(bounds)
    }

    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = Some(velocity);
        self
    }

    pub fn with_aabb(mut self, aabb: Aabb) -> Self {
        self.aabb = Some(aabb);
        self
    }

    pub fn with_ball(mut self, radius: f32) -> Self {
        self.ball_radius = Some(radius);
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = Some(rotation);
        self
    }

    pub fn with_bone(mut self, link: BoneLink) -> Self {
        self.bone = Some(link);
        self
    }

    pub fn with_sort_key(mut self, key: i32) -> Self {
        self.sort_key = Some(key);
        self
    }

    pub fn has(&self, kind: ComponentKind) -> bool {
        match kind {
            ComponentKind::Position => true,
            ComponentKind::Velocity => self.velocity.is_some(),
            ComponentKind::Aabb => self.aabb.is_some(),
            ComponentKind::Ball => self.ball_radius.is_some(),
            ComponentKind::Rotation => self.rotation.is_some(),
            ComponentKind::Bone => self.bone.is_some(),
            ComponentKind::SortKey => self.sort_key.is_some(),
        }
    }

    pub fn flag(&self, flag: Flag) -> bool {
        match flag {
            Flag::IkIgnore => self.ik_ignore,
            Flag::Held => self.held,
        }
    }

    pub fn set_flag(&mut self, flag: Flag, value: bool) {
        match flag {
            Flag::IkIgnore => self.ik_ignore = value,
            Flag::Held => self.held = value,
        }
    }

    /// World-space bounding box, if the entity has one.
    pub fn world_aabb(&self) -> Option<Aabb> {
        self.aabb.map(|b| b.translated(self.position))
    }
}
