use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::{Result, SimError};
use crate::ik::{ChainManager, SolverConfig, TickReport};
use crate::physics::{PhysicsConfig, PhysicsWorld, StepReport};
use crate::scene::Scene;

#[derive(Debug, Clone, Copy)]
pub struct SimulationConfig {
    /// Each frame is split into this many equal ticks.
    pub sub_ticks: u32,
    /// Seed for release kicks and anything else random.
    pub seed: u64,
    pub solver: SolverConfig,
    pub physics: PhysicsConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            sub_ticks: 2,
            seed: 0x1c_5eed,
            solver: SolverConfig::default(),
            physics: PhysicsConfig::default(),
        }
    }
}

impl SimulationConfig {
    pub fn with_sub_ticks(mut self, sub_ticks: u32) -> Self {
        self.sub_ticks = sub_ticks;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    pub fn with_physics(mut self, physics: PhysicsConfig) -> Self {
        self.physics = physics;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    pub ik: TickReport,
    pub physics: StepReport,
}

/// Scene, chains and world stepped together in a fixed order: every chain,
/// then every body.
#[derive(Debug)]
pub struct Simulation {
    scene: Scene,
    chains: ChainManager,
    world: PhysicsWorld,
    sub_ticks: u32,
    rng: StdRng,
    elapsed: f32,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Result<Self> {
        if config.sub_ticks == 0 {
            return Err(SimError::InvalidConfiguration("sub_ticks must be at least 1"));
        }
        if config.solver.sub_steps == 0 {
            return Err(SimError::InvalidConfiguration("solver sub_steps must be at least 1"));
        }

        Ok(Self {
            scene: Scene::new(),
            chains: ChainManager::new(config.solver),
            world: PhysicsWorld::new(config.physics)?,
            sub_ticks: config.sub_ticks,
            rng: StdRng::seed_from_u64(config.seed),
            elapsed: 0.0,
        })
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn chains(&self) -> &ChainManager {
        &self.chains
    }

    pub fn chains_mut(&mut self) -> &mut ChainManager {
        &mut self.chains
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.world
    }

    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Scene and chains together, for building both at once.
    pub fn parts_mut(&mut self) -> (&mut Scene, &mut ChainManager) {
        (&mut self.scene, &mut self.chains)
    }

    /// Scene and the shared generator, for spawning between frames.
    pub fn scene_and_rng_mut(&mut self) -> (&mut Scene, &mut StdRng) {
        (&mut self.scene, &mut self.rng)
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Advances one frame of `dt` seconds. Non-positive or non-finite `dt`
    /// does nothing.
    pub fn tick(&mut self, dt: f32) -> FrameReport {
        let mut report = FrameReport::default();
        if !dt.is_finite() || dt <= 0.0 {
            log::warn!("skipping frame with dt = {}", dt);
            return report;
        }

        let sub_dt = dt / self.sub_ticks as f32;
        for _ in 0..self.sub_ticks {
            let ik = self.chains.update(&mut self.scene, sub_dt, &mut self.rng);
            report.ik.reached += ik.reached;
            report.ik.transitions.extend(ik.transitions);

            let physics = self.world.step(&mut self.scene, sub_dt);
            report.physics.integrated += physics.integrated;
            report.physics.wall_hits += physics.wall_hits;
            report.physics.ball_contacts += physics.ball_contacts;
            report.physics.box_contacts += physics.box_contacts;
        }

        self.elapsed += dt;
        report
    }
}
