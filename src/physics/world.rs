use glam::Vec3;

use super::contact::{BodyState, ContactSolver};
use crate::error::{Result, SimError};
use crate::math::Aabb;
use crate::scene::{ComponentKind, EntityId, EntityStore, Flag};

/// Height-dependent drift for free bodies. Not part of the contact model;
/// scenes use it to herd balls around.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Steering {
    pub height: f32,
    /// Acceleration while above `height`.
    pub above: Vec3,
    /// Acceleration while at or below `height`.
    pub below: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsConfig {
    pub bounds: Aabb,
    pub gravity: Vec3,
    /// Linear drag per second.
    pub damping: f32,
    /// Fraction of normal speed kept after hitting a wall or a box.
    pub restitution: f32,
    pub steering: Option<Steering>,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            bounds: Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0)),
            gravity: Vec3::new(0.0, -9.82, 0.0),
            damping: 0.0,
            restitution: 1.0,
            steering: None,
        }
    }
}

impl PhysicsConfig {
    pub fn with_bounds(mut self, min: Vec3, max: Vec3) -> Self {
        self.bounds = Aabb::new(min, max);
        self
    }

    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = damping;
        self
    }

    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    pub fn with_steering(mut self, steering: Steering) -> Self {
        self.steering = Some(steering);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.bounds.is_valid() {
            return Err(SimError::InvalidBounds);
        }
        if !self.gravity.is_finite() {
            return Err(SimError::InvalidConfiguration("gravity must be finite"));
        }
        if !self.damping.is_finite() || self.damping < 0.0 {
            return Err(SimError::InvalidConfiguration("damping must be >= 0"));
        }
        if !(0.0..=1.0).contains(&self.restitution) {
            return Err(SimError::InvalidConfiguration("restitution must be in [0, 1]"));
        }
        Ok(())
    }
}

/// Counters from one [`PhysicsWorld::step`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    pub integrated: usize,
    pub wall_hits: u32,
    pub ball_contacts: u32,
    pub box_contacts: u32,
}

/// Integrates every body that has a velocity and resolves its contacts.
#[derive(Debug, Clone)]
pub struct PhysicsWorld {
    config: PhysicsConfig,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self {
            config: PhysicsConfig::default(),
        }
    }
}

impl PhysicsWorld {
    pub fn new(config: PhysicsConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    pub fn bounds(&self) -> Aabb {
        self.config.bounds
    }

    pub fn set_bounds(&mut self, min: Vec3, max: Vec3) -> Result<()> {
        let bounds = Aabb::new(min, max);
        if !bounds.is_valid() {
            return Err(SimError::InvalidBounds);
        }
        self.config.bounds = bounds;
        Ok(())
    }

    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.config.gravity = gravity;
    }

    /// Advances every body by `dt`.
    ///
    /// Bodies are visited in store order. Each one is integrated, contained,
    /// then collided against balls with a higher id and against every static
    /// box, before the next body moves.
    pub fn step<S: EntityStore + ?Sized>(&self, store: &mut S, dt: f32) -> StepReport {
        let mut report = StepReport::default();

        for id in store.query(ComponentKind::Velocity) {
            let (Some(position), Some(velocity)) = (store.position(id), store.velocity(id)) else {
                continue;
            };

            let mut body = self.integrate(&*store, id, BodyState::new(position, velocity), dt);

            if let Some(local) = store.aabb(id) {
                let (contained, hits) = ContactSolver::contain(
                    body,
                    &local,
                    &self.config.bounds,
                    self.config.restitution,
                );
                body = contained;
                report.wall_hits += hits;
            }

            store.set_position(id, body.position);
            store.set_velocity(id, Some(body.velocity));
            report.integrated += 1;

            if store.ball_radius(id).is_some() {
                report.ball_contacts += self.collide_balls(store, id);
                report.box_contacts += self.collide_boxes(store, id);
            }
        }

        log::trace!("physics step: {:?}", report);
        report
    }

    fn integrate<S: EntityStore + ?Sized>(
        &self,
        store: &S,
        id: EntityId,
        body: BodyState,
        dt: f32,
    ) -> BodyState {
        let BodyState {
            mut position,
            mut velocity,
        } = body;

        if let Some(steering) = self.config.steering {
            if !store.flag(id, Flag::IkIgnore) {
                let push = if position.y > steering.height {
                    steering.above
                } else {
                    steering.below
                };
                velocity += dt * push;
            }
        }

        velocity += dt * self.config.gravity;
        velocity -= self.config.damping * velocity * dt;
        position += dt * velocity;

        BodyState::new(position, velocity)
    }

    fn collide_balls<S: EntityStore + ?Sized>(&self, store: &mut S, id: EntityId) -> u32 {
        if store.flag(id, Flag::IkIgnore) {
            return 0;
        }
        let mut contacts = 0;

        for other in store.query(ComponentKind::Ball) {
            if other <= id || store.flag(other, Flag::IkIgnore) {
                continue;
            }
            let (Some(a), Some(b)) = (body_of(&*store, id), body_of(&*store, other)) else {
                continue;
            };
            let (Some(ra), Some(rb)) = (store.ball_radius(id), store.ball_radius(other)) else {
                continue;
            };

            if let Some((a, b)) = ContactSolver::ball_ball(a, ra, b, rb) {
                write_body(store, id, a);
                write_body(store, other, b);
                contacts += 1;
            }
        }

        contacts
    }

    fn collide_boxes<S: EntityStore + ?Sized>(&self, store: &mut S, id: EntityId) -> u32 {
        let Some(radius) = store.ball_radius(id) else {
            return 0;
        };
        let mut contacts = 0;

        for other in store.query(ComponentKind::Aabb) {
            if other == id || store.ball_radius(other).is_some() {
                continue;
            }
            let (Some(local), Some(offset)) = (store.aabb(other), store.position(other)) else {
                continue;
            };
            let Some(ball) = body_of(&*store, id) else {
                break;
            };

            let bounds = local.translated(offset);
            if let Some(ball) =
                ContactSolver::ball_box(ball, radius, &bounds, self.config.restitution)
            {
                write_body(store, id, ball);
                contacts += 1;
            }
        }

        contacts
    }
}

fn body_of<S: EntityStore + ?Sized>(store: &S, id: EntityId) -> Option<BodyState> {
    Some(BodyState::new(store.position(id)?, store.velocity(id)?))
}

fn write_body<S: EntityStore + ?Sized>(store: &mut S, id: EntityId, body: BodyState) {
    store.set_position(id, body.position);
    store.set_velocity(id, Some(body.velocity));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Entity, Scene};

    fn still_world(restitution: f32) -> PhysicsWorld {
        PhysicsWorld::new(
            PhysicsConfig::default()
                .with_bounds(Vec3::new(-5.0, 0.0, -5.0), Vec3::splat(5.0))
                .with_gravity(Vec3::ZERO)
                .with_restitution(restitution),
        )
        .unwrap()
    }

    #[test]
    fn rejects_bad_configuration() {
        let inverted = PhysicsConfig::default().with_bounds(Vec3::ONE, Vec3::ZERO);
        assert_eq!(PhysicsWorld::new(inverted).unwrap_err(), SimError::InvalidBounds);
        assert!(PhysicsWorld::new(PhysicsConfig::default().with_restitution(1.5)).is_err());
        assert!(PhysicsWorld::new(PhysicsConfig::default().with_damping(-1.0)).is_err());

        let mut world = PhysicsWorld::default();
        assert_eq!(
            world.set_bounds(Vec3::ONE, Vec3::ZERO),
            Err(SimError::InvalidBounds)
        );
        assert!(world.set_bounds(Vec3::ZERO, Vec3::ONE).is_ok());
    }

    #[test]
    fn gravity_and_damping_integrate_explicitly() {
        let world = PhysicsWorld::new(
            PhysicsConfig::default()
                .with_bounds(Vec3::splat(-100.0), Vec3::splat(100.0))
                .with_gravity(Vec3::new(0.0, -10.0, 0.0))
                .with_damping(0.5),
        )
        .unwrap();
        let mut scene = Scene::new();
        let id = scene
            .spawn(Entity::new(Vec3::ZERO).with_velocity(Vec3::new(2.0, 0.0, 0.0)))
            .unwrap();

        world.step(&mut scene, 0.1);

        // v = (2, -1, 0) then drag removes 5%.
        let v = scene.velocity(id).unwrap();
        assert!((v - Vec3::new(1.9, -0.95, 0.0)).length() < 1e-5);
        let p = scene.position(id).unwrap();
        assert!((p - v * 0.1).length() < 1e-6);
    }

    #[test]
    fn bodies_without_velocity_stay_put() {
        let world = PhysicsWorld::default();
        let mut scene = Scene::new();
        let id = scene
            .spawn(Entity::static_box(Aabb::new(Vec3::ZERO, Vec3::ONE)))
            .unwrap();
        let report = world.step(&mut scene, 0.1);
        assert_eq!(report.integrated, 0);
        assert_eq!(scene.position(id), Some(Vec3::ZERO));
    }

    #[test]
    fn outward_body_on_floor_bounces_and_touches() {
        let world = still_world(0.5);
        let mut scene = Scene::new();
        let id = scene
            .spawn(Entity::ball(Vec3::new(0.0, 0.1, 0.0), 0.1, Vec3::new(0.0, -2.0, 0.0)))
            .unwrap();

        let report = world.step(&mut scene, 0.01);

        assert_eq!(report.wall_hits, 1);
        assert_eq!(scene.velocity(id).unwrap().y, 1.0);
        assert_eq!(scene.position(id).unwrap().y, 0.1);
    }

    #[test]
    fn steering_skips_ignored_bodies() {
        let world = PhysicsWorld::new(
            PhysicsConfig::default()
                .with_bounds(Vec3::splat(-10.0), Vec3::splat(10.0))
                .with_gravity(Vec3::ZERO)
                .with_steering(Steering {
                    height: 1.0,
                    above: Vec3::new(-1.0, 0.0, 0.0),
                    below: Vec3::new(1.0, 0.0, 0.0),
                }),
        )
        .unwrap();
        let mut scene = Scene::new();
        let high = scene.spawn(Entity::new(Vec3::new(0.0, 2.0, 0.0)).with_velocity(Vec3::ZERO)).unwrap();
        let low = scene.spawn(Entity::new(Vec3::ZERO).with_velocity(Vec3::ZERO)).unwrap();
        let ignored = scene.spawn(Entity::new(Vec3::ZERO).with_velocity(Vec3::ZERO)).unwrap();
        scene.set_flag(ignored, Flag::IkIgnore, true);

        world.step(&mut scene, 0.5);

        assert_eq!(scene.velocity(high), Some(Vec3::new(-0.5, 0.0, 0.0)));
        assert_eq!(scene.velocity(low), Some(Vec3::new(0.5, 0.0, 0.0)));
        assert_eq!(scene.velocity(ignored), Some(Vec3::ZERO));
    }

    #[test]
    fn approaching_balls_collide_once_per_pair() {
        let world = still_world(1.0);
        let mut scene = Scene::new();
        let a = scene
            .spawn(Entity::ball(Vec3::new(0.0, 1.0, 0.0), 0.1, Vec3::new(1.0, 0.0, 0.0)))
            .unwrap();
        let b = scene
            .spawn(Entity::ball(Vec3::new(0.19, 1.0, 0.0), 0.1, Vec3::new(-1.0, 0.0, 0.0)))
            .unwrap();

        let report = world.step(&mut scene, 0.01);

        assert_eq!(report.ball_contacts, 1);
        assert!(scene.velocity(a).unwrap().x < 0.0);
        assert!(scene.velocity(b).unwrap().x > 0.0);
    }

    #[test]
    fn held_balls_are_not_pushed() {
        let world = still_world(1.0);
        let mut scene = Scene::new();
        let free = scene
            .spawn(Entity::ball(Vec3::new(0.0, 1.0, 0.0), 0.1, Vec3::new(1.0, 0.0, 0.0)))
            .unwrap();
        let held = scene
            .spawn(Entity::ball(Vec3::new(0.15, 1.0, 0.0), 0.1, Vec3::ZERO))
            .unwrap();
        scene.set_velocity(held, None);
        scene.set_flag(held, Flag::IkIgnore, true);

        let report = world.step(&mut scene, 0.01);

        assert_eq!(report.ball_contacts, 0);
        assert_eq!(scene.position(held), Some(Vec3::new(0.15, 1.0, 0.0)));
        assert!(scene.velocity(free).unwrap().x > 0.0);
    }

    #[test]
    fn ball_settles_on_box() {
        let world = PhysicsWorld::new(
            PhysicsConfig::default()
                .with_bounds(Vec3::new(-5.0, 0.0, -5.0), Vec3::splat(5.0))
                .with_restitution(0.0),
        )
        .unwrap();
        let mut scene = Scene::new();
        scene
            .spawn(Entity::static_box(Aabb::new(
                Vec3::new(-1.0, 0.0, -1.0),
                Vec3::new(1.0, 1.0, 1.0),
            )))
            .unwrap();
        let ball = scene
            .spawn(Entity::ball(Vec3::new(0.0, 1.5, 0.0), 0.1, Vec3::ZERO))
            .unwrap();

        for _ in 0..600 {
            world.step(&mut scene, 1.0 / 60.0);
        }

        let p = scene.position(ball).unwrap();
        let v = scene.velocity(ball).unwrap();
        assert!((p.y - 1.1).abs() < 1e-4, "resting at {p}");
        assert!(v.length() < 1e-3, "still moving {v}");
    }
}
