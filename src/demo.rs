//! Ball-sorting scene
//!
//! Three arms on a stool pick balls off a conveyor and drop them into one of
//! two containers depending on each ball's color.

use glam::{Quat, Vec3};
use rand::Rng;

use crate::error::Result;
use crate::ik::ChainId;
use crate::math::Aabb;
use crate::physics::PhysicsConfig;
use crate::scene::{Entity, EntityId, Scene};
use crate::simulation::{Simulation, SimulationConfig};

pub const ARM_ANCHOR: Vec3 = Vec3::new(0.0, 0.5, 0.0);
pub const ARM_BONES: usize = 6;
pub const BONE_LENGTH: f32 = 0.3;
pub const RED_DROP: Vec3 = Vec3::new(-0.9, 1.1, 0.8);
pub const WHITE_DROP: Vec3 = Vec3::new(0.9, 1.1, 0.8);

/// Physics settings for the sorting room.
pub fn room_physics() -> PhysicsConfig {
    PhysicsConfig::default()
        .with_bounds(Vec3::new(-5.0, 0.0, -5.0), Vec3::splat(5.0))
        .with_damping(0.1)
        .with_restitution(0.6)
}

/// Builds the full scene: stool, containers, conveyor and three arms.
pub fn build_sorting_scene(config: SimulationConfig) -> Result<Simulation> {
    let mut sim = Simulation::new(config)?;
    let (scene, chains) = sim.parts_mut();

    // Stool the arms stand on.
    scene.spawn(Entity::static_box(Aabb::from_center_half_extents(
        Vec3::new(0.0, 0.25, 0.0),
        Vec3::new(0.15, 0.25, 0.15),
    )))?;
    spawn_container(scene, Vec3::new(-0.9, 0.0, 1.0))?;
    spawn_container(scene, Vec3::new(0.9, 0.0, 1.0))?;
    spawn_conveyor(scene)?;

    for degrees in [0.0f32, 30.0, -30.0] {
        let chain = chains.create_chain();
        chains.add_bone(scene, chain, BONE_LENGTH, Some(ARM_ANCHOR))?;
        for _ in 1..ARM_BONES {
            chains.add_bone(scene, chain, BONE_LENGTH, None)?;
        }
        chains.set_base_rotation(chain, 0, Quat::from_rotation_z(degrees.to_radians()))?;
        chains.set_drop_positions(chain, RED_DROP, WHITE_DROP)?;
        log::debug!("arm {:?} leaning {} degrees", chain, degrees);
    }

    log::info!(
        "sorting scene ready: {} entities, {} arms",
        sim.scene().len(),
        sim.chains().chains().len()
    );
    Ok(sim)
}

/// Arm handles in creation order.
pub fn arms(sim: &Simulation) -> Vec<ChainId> {
    (0..sim.chains().chains().len()).map(ChainId).collect()
}

/// Open-top box: four walls and a floor.
fn spawn_container(scene: &mut Scene, base: Vec3) -> Result<()> {
    let size = 0.8;
    let height = 0.5;
    let thickness = 0.1;

    let up = 0.5 * height * Vec3::Y;
    let walls = [
        (base + 0.5 * size * Vec3::Z + up, Vec3::new(size, height, thickness)),
        (base + 0.5 * size * Vec3::X + up, Vec3::new(thickness, height, size)),
        (base - 0.5 * size * Vec3::Z + up, Vec3::new(size, height, thickness)),
        (base - 0.5 * size * Vec3::X + up, Vec3::new(thickness, height, size)),
        (
            base + (-0.5 * thickness + 0.01) * Vec3::Y,
            Vec3::new(size, thickness, size),
        ),
    ];
    spawn_boxes(scene, &walls)
}

/// Belt the balls arrive on, with a rim on every side.
fn spawn_conveyor(scene: &mut Scene) -> Result<()> {
    let width = 0.6;
    let length = 6.0;
    let height = 0.1;
    let thickness = 0.1;
    let pos = Vec3::new(2.0, 0.5, -1.0);

    let up = 0.5 * height * Vec3::Y;
    let parts = [
        (pos + 0.5 * width * Vec3::Z + up, Vec3::new(length, height, thickness)),
        (pos + 0.5 * length * Vec3::X + up, Vec3::new(thickness, height, width)),
        (pos - 0.5 * width * Vec3::Z + up, Vec3::new(length, height, thickness)),
        (pos - 0.5 * length * Vec3::X + up, Vec3::new(thickness, height, width)),
        (
            pos + (-0.5 * pos.y + 0.01) * Vec3::Y,
            Vec3::new(length, pos.y, width),
        ),
    ];
    spawn_boxes(scene, &parts)
}

fn spawn_boxes(scene: &mut Scene, parts: &[(Vec3, Vec3)]) -> Result<()> {
    for &(center, size) in parts {
        scene.spawn(Entity::static_box(Aabb::from_center_half_extents(
            center,
            size * 0.5,
        )))?;
    }
    Ok(())
}

/// Drops balls onto the far end of the conveyor at a fixed rate.
#[derive(Debug, Clone)]
pub struct BallSpawner {
    pub origin: Vec3,
    pub radius: f32,
    pub interval: f32,
    pub limit: usize,
    spawned: usize,
    timer: f32,
}

impl Default for BallSpawner {
    fn default() -> Self {
        Self {
            origin: Vec3::new(4.8, 0.7, -1.0),
            radius: 0.1,
            interval: 0.2,
            limit: 5 * 15,
            spawned: 0,
            timer: 0.0,
        }
    }
}

impl BallSpawner {
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn spawned(&self) -> usize {
        self.spawned
    }

    pub fn is_done(&self) -> bool {
        self.spawned >= self.limit
    }

    /// Spawns at most one ball per call once the interval has elapsed.
    pub fn update<R: Rng>(
        &mut self,
        scene: &mut Scene,
        dt: f32,
        rng: &mut R,
    ) -> Result<Option<EntityId>> {
        self.timer -= dt;
        if self.is_done() || self.timer >= 0.0 {
            return Ok(None);
        }

        let velocity = Vec3::new(
            -3.0 - rng.gen::<f32>(),
            rng.gen::<f32>() - 1.4,
            (rng.gen::<f32>() - 0.5) * 0.5,
        );
        let sort_key = rng.gen_range(0..2);

        let id = scene.spawn(
            Entity::ball(self.origin, self.radius, velocity).with_sort_key(sort_key),
        )?;

        self.timer = self.interval;
        self.spawned += 1;
        log::trace!("spawned ball {:?} (key {})", id, sort_key);
        Ok(Some(id))
    }
}
