use glam::{Quat, Vec3};

use super::chain::Chain;

/// Tuning for the iterative chain solver.
#[derive(Debug, Clone, Copy)]
pub struct SolverConfig {
    /// Backward passes per tick.
    pub sub_steps: u32,
    /// Each pass blends by `sub_step_scale * dt`.
    pub sub_step_scale: f32,
    /// Tip-to-target distance that counts as reached.
    pub reach_tolerance: f32,
    /// Below this rotation-axis length a bone is left alone for the pass.
    pub axis_epsilon: f32,
    /// Extra curl, in radians, added when the target sits inside a bone.
    pub overreach_bias: f32,
    /// Factor applied to every compensation angle each pass.
    pub compensation_decay: f32,
    /// Rest bend per bone; bone `i` aims for `(i + 1) * angle_step`.
    pub angle_step: f32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            sub_steps: 10,
            sub_step_scale: 0.1,
            reach_tolerance: 0.1,
            axis_epsilon: 0.001,
            overreach_bias: 10f32.to_radians(),
            compensation_decay: 0.5,
            angle_step: 0.4,
        }
    }
}

impl SolverConfig {
    pub fn with_sub_steps(mut self, sub_steps: u32) -> Self {
        self.sub_steps = sub_steps;
        self
    }

    pub fn with_reach_tolerance(mut self, tolerance: f32) -> Self {
        self.reach_tolerance = tolerance;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepResult {
    /// Tip was within tolerance of the target when the pass started.
    pub reached: bool,
    /// Bones whose rotation changed this pass.
    pub updated: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveResult {
    pub reached: bool,
    /// Sub-step at which the tip first reached the target.
    pub first_reach: Option<u32>,
    pub iterations: u32,
    pub final_distance: f32,
}

pub struct IkSolver;

impl IkSolver {
    /// Runs `config.sub_steps` backward passes, each blending by
    /// `config.sub_step_scale * dt`.
    pub fn solve(chain: &mut Chain, dt: f32, config: &SolverConfig) -> SolveResult {
        if chain.is_empty() {
            return SolveResult {
                reached: false,
                first_reach: None,
                iterations: 0,
                final_distance: 0.0,
            };
        }

        let blend = config.sub_step_scale * dt;
        let mut first_reach = None;

        for iteration in 0..config.sub_steps {
            let step = Self::step_solve(chain, blend, config);
            if step.reached && first_reach.is_none() {
                first_reach = Some(iteration);
            }
        }

        let final_distance = chain
            .tip()
            .map(|tip| (chain.target - tip).length())
            .unwrap_or(0.0);

        SolveResult {
            reached: first_reach.is_some(),
            first_reach,
            iterations: config.sub_steps,
            final_distance,
        }
    }

    /// One backward pass from tip to root.
    ///
    /// Every bone is rotated toward the target about `cross(a, b)`, where `a`
    /// points along the bone and `b` from the bone's start to the target. The
    /// axis is not normalized, so its length scales the applied angle down as
    /// the bone lines up with the target. `blend` is a slerp factor, not a
    /// time; values above 1 overshoot.
    pub fn step_solve(chain: &mut Chain, blend: f32, config: &SolverConfig) -> StepResult {
        let count = chain.bones.len();
        let target = chain.target;
        let mut reached = false;
        let mut updated = 0;

        for i in (0..count).rev() {
            let p0 = chain.start_position(i);
            let p1 = chain.final_position(i);

            if i == count - 1 && (target - p1).length() < config.reach_tolerance {
                reached = true;
            }

            let a = p1 - p0;
            let b = target - p0;
            let a_len = a.length();
            let b_len = b.length();

            if a_len <= f32::EPSILON || b_len <= f32::EPSILON {
                continue;
            }

            let a = a / a_len;
            let b = b / b_len;

            let axis = a.cross(b);
            if axis.length() < config.axis_epsilon {
                continue;
            }

            let theta = a.dot(b).clamp(-1.0, 1.0).acos();

            let bone = &mut chain.bones[i];
            if b_len < a_len {
                bone.compensation += (config.overreach_bias + theta) * (a_len / b_len - 1.0);
            }
            bone.compensation *= config.compensation_decay;

            let lever: f32 = chain.bones[i..]
                .iter()
                .zip(1..)
                .map(|(bone, weight)| bone.compensation * weight as f32)
                .sum();

            let angle = (i + 1) as f32 * config.angle_step - lever;
            let goal = raw_axis_angle(axis, angle);

            let bone = &mut chain.bones[i];
            bone.rotation = bone.rotation.slerp(goal, blend).normalize();
            updated += 1;
        }

        StepResult { reached, updated }
    }
}

/// Axis-angle quaternion built from an axis of any length, then normalized as
/// a quaternion. A short axis yields a smaller effective angle.
fn raw_axis_angle(axis: Vec3, angle: f32) -> Quat {
    let (s, c) = (angle * 0.5).sin_cos();
    Quat::from_xyzw(axis.x * s, axis.y * s, axis.z * s, c).normalize()
}
