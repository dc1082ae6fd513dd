use glam::Vec3;

use crate::math::Aabb;

/// Position and velocity of one moving body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    pub position: Vec3,
    pub velocity: Vec3,
}

impl BodyState {
    pub fn new(position: Vec3, velocity: Vec3) -> Self {
        Self { position, velocity }
    }
}

pub struct ContactSolver;

impl ContactSolver {
    /// Sphere-sphere contact between two equal-mass balls.
    ///
    /// Returns the corrected pair, or `None` when the balls do not overlap or
    /// are already moving apart along the contact normal.
    pub fn ball_ball(
        a: BodyState,
        radius_a: f32,
        b: BodyState,
        radius_b: f32,
    ) -> Option<(BodyState, BodyState)> {
        let delta = b.position - a.position;
        let min_dist = radius_a + radius_b;
        let dist_sq = delta.length_squared();

        if dist_sq >= min_dist * min_dist {
            return None;
        }

        let dist = dist_sq.sqrt();
        let normal = if dist > f32::EPSILON {
            delta / dist
        } else {
            Vec3::Y
        };

        let approach = (b.velocity - a.velocity).dot(normal);
        if approach >= 0.0 {
            return None;
        }

        // Penetration is split evenly. Each ball takes half of twice the
        // closing speed, which swaps their normal components.
        let correction = normal * ((min_dist - dist) * 0.5);
        let impulse = normal * approach;

        Some((
            BodyState::new(a.position - correction, a.velocity + impulse),
            BodyState::new(b.position + correction, b.velocity - impulse),
        ))
    }

    /// Sphere against a static world-space box.
    ///
    /// Reflects the normal velocity scaled by `1 + restitution` and pushes the
    /// ball out by its penetration depth. `None` when there is no contact, the
    /// ball is already leaving the surface, or its center is inside the box.
    pub fn ball_box(
        ball: BodyState,
        radius: f32,
        bounds: &Aabb,
        restitution: f32,
    ) -> Option<BodyState> {
        let closest = bounds.closest_point(ball.position);
        let offset = ball.position - closest;
        let dist_sq = offset.length_squared();

        if dist_sq >= radius * radius {
            return None;
        }

        let dist = dist_sq.sqrt();
        if dist <= f32::EPSILON {
            return None;
        }
        let normal = offset / dist;

        let normal_speed = ball.velocity.dot(normal);
        if normal_speed >= 0.0 {
            return None;
        }

        Some(BodyState::new(
            ball.position + normal * (radius - dist),
            ball.velocity - normal * ((1.0 + restitution) * normal_speed),
        ))
    }

    /// Keeps a body's box inside `bounds`, one face at a time.
    ///
    /// A crossing face is snapped back onto the boundary plane and the
    /// velocity along that axis, if it points outward, is reversed and scaled
    /// by `restitution`. Returns the new state and the number of faces hit.
    pub fn contain(
        body: BodyState,
        local: &Aabb,
        bounds: &Aabb,
        restitution: f32,
    ) -> (BodyState, u32) {
        let BodyState {
            mut position,
            mut velocity,
        } = body;
        let mut hits = 0;

        for axis in 0..3 {
            if position[axis] + local.min[axis] < bounds.min[axis] {
                position[axis] = bounds.min[axis] - local.min[axis];
                if velocity[axis] < 0.0 {
                    velocity[axis] = -velocity[axis] * restitution;
                }
                hits += 1;
            }

            if position[axis] + local.max[axis] > bounds.max[axis] {
                position[axis] = bounds.max[axis] - local.max[axis];
                if velocity[axis] > 0.0 {
                    velocity[axis] = -velocity[axis] * restitution;
                }
                hits += 1;
            }
        }

        (BodyState::new(position, velocity), hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn head_on_balls_separate_and_swap() {
        let r = 0.1;
        let a = BodyState::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0));
        let b = BodyState::new(Vec3::new(2.0 * r - 0.01, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0));

        let (a, b) = ContactSolver::ball_ball(a, r, b, r).unwrap();

        let box_a = Aabb::around_sphere(r).translated(a.position);
        let box_b = Aabb::around_sphere(r).translated(b.position);
        assert!(box_b.min.x - box_a.max.x > -1e-6);
        assert!(((b.position - a.position).length() - 2.0 * r).abs() < 1e-6);
        assert!((a.velocity.x + 1.0).abs() < 1e-6);
        assert!((b.velocity.x - 1.0).abs() < 1e-6);
    }

    #[test]
    fn separating_balls_are_left_alone() {
        let a = BodyState::new(Vec3::ZERO, Vec3::new(-1.0, 0.0, 0.0));
        let b = BodyState::new(Vec3::new(0.15, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        assert!(ContactSolver::ball_ball(a, 0.1, b, 0.1).is_none());
    }

    #[test]
    fn distant_balls_do_not_touch() {
        let a = BodyState::new(Vec3::ZERO, Vec3::X);
        let b = BodyState::new(Vec3::new(0.2, 0.0, 0.0), -Vec3::X);
        assert!(ContactSolver::ball_ball(a, 0.1, b, 0.1).is_none());
    }

    #[test]
    fn coincident_balls_push_apart_vertically() {
        let a = BodyState::new(Vec3::ZERO, Vec3::Y);
        let b = BodyState::new(Vec3::ZERO, -Vec3::Y);
        let (a, b) = ContactSolver::ball_ball(a, 0.1, b, 0.1).unwrap();
        assert!((a.position.y + 0.1).abs() < 1e-6);
        assert!((b.position.y - 0.1).abs() < 1e-6);
    }

    #[test]
    fn ball_bounces_off_box_top() {
        let floor = Aabb::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 0.0, 1.0));
        let ball = BodyState::new(Vec3::new(0.0, 0.05, 0.0), Vec3::new(0.5, -2.0, 0.0));

        let out = ContactSolver::ball_box(ball, 0.1, &floor, 1.0).unwrap();

        assert!((out.position.y - 0.1).abs() < 1e-6);
        assert!((out.velocity.y - 2.0).abs() < 1e-6);
        assert!((out.velocity.x - 0.5).abs() < 1e-6);
    }

    #[test]
    fn inelastic_box_contact_kills_normal_speed() {
        let floor = Aabb::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 0.0, 1.0));
        let ball = BodyState::new(Vec3::new(0.0, 0.05, 0.0), Vec3::new(0.0, -2.0, 0.0));
        let out = ContactSolver::ball_box(ball, 0.1, &floor, 0.0).unwrap();
        assert!(out.velocity.y.abs() < 1e-6);
    }

    #[test]
    fn ball_leaving_box_is_not_touched() {
        let floor = Aabb::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 0.0, 1.0));
        let ball = BodyState::new(Vec3::new(0.0, 0.05, 0.0), Vec3::new(0.0, 1.0, 0.0));
        assert!(ContactSolver::ball_box(ball, 0.1, &floor, 1.0).is_none());
    }

    #[test]
    fn ball_hits_box_edge_diagonally() {
        let block = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let ball = BodyState::new(Vec3::new(1.05, 1.05, 0.5), Vec3::new(-1.0, -1.0, 0.0));

        let out = ContactSolver::ball_box(ball, 0.1, &block, 1.0).unwrap();

        let n = Vec3::new(1.0, 1.0, 0.0).normalize();
        assert!(out.velocity.dot(n) > 0.0);
        assert!(((out.position - Vec3::new(1.0, 1.0, 0.5)).length() - 0.1).abs() < 1e-5);
    }

    #[test]
    fn containment_reflects_outgoing_face() {
        let bounds = Aabb::new(Vec3::ZERO, Vec3::splat(5.0));
        let local = Aabb::around_sphere(0.1);
        let body = BodyState::new(Vec3::new(2.0, 0.05, 2.0), Vec3::new(0.0, -3.0, 0.0));

        let (out, hits) = ContactSolver::contain(body, &local, &bounds, 0.5);

        assert_eq!(hits, 1);
        assert_eq!(out.position.y, 0.1);
        assert_eq!(out.velocity.y, 1.5);
    }

    #[test]
    fn containment_handles_corners() {
        let bounds = Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        let local = Aabb::around_sphere(0.1);
        let body = BodyState::new(Vec3::new(0.95, -0.95, 0.0), Vec3::new(2.0, -1.0, 0.3));

        let (out, hits) = ContactSolver::contain(body, &local, &bounds, 1.0);

        assert_eq!(hits, 2);
        assert_eq!(out.velocity, Vec3::new(-2.0, 1.0, 0.3));
        assert!((out.position.x - 0.9).abs() < 1e-6);
        assert!((out.position.y + 0.9).abs() < 1e-6);
    }
}
