use glam::{Quat, Vec3};
use rand::Rng;

use super::chain::Chain;
use super::solver::{IkSolver, SolverConfig};
use super::targeting::select_target;
use crate::error::{Result, SimError};
use crate::scene::{BoneLink, ComponentKind, Entity, EntityId, EntityStore, Flag, Scene};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChainId(pub usize);

/// Pick-up or drop-off decided while solving and applied afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    PickUp(EntityId),
    Release(EntityId),
}

/// Per-tick summary, mostly for logging.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub transitions: Vec<(ChainId, Transition)>,
    pub reached: usize,
}

impl TickReport {
    pub fn pick_ups(&self) -> usize {
        self.transitions
            .iter()
            .filter(|(_, t)| matches!(t, Transition::PickUp(_)))
            .count()
    }

    pub fn releases(&self) -> usize {
        self.transitions
            .iter()
            .filter(|(_, t)| matches!(t, Transition::Release(_)))
            .count()
    }
}

/// Owns every chain and drives them once per tick, in creation order.
#[derive(Debug, Clone, Default)]
pub struct ChainManager {
    chains: Vec<Chain>,
    config: SolverConfig,
}

impl ChainManager {
    pub fn new(config: SolverConfig) -> Self {
        Self {
            chains: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn create_chain(&mut self) -> ChainId {
        self.chains.push(Chain::new());
        let id = ChainId(self.chains.len() - 1);
        log::debug!("created chain {:?}", id);
        id
    }

    pub fn chain(&self, id: ChainId) -> Result<&Chain> {
        self.chains.get(id.0).ok_or(SimError::UnknownChain(id))
    }

    pub fn chain_mut(&mut self, id: ChainId) -> Result<&mut Chain> {
        self.chains.get_mut(id.0).ok_or(SimError::UnknownChain(id))
    }

    pub fn chains(&self) -> &[Chain] {
        &self.chains
    }

    /// Appends a bone to `chain` and spawns the entity that mirrors it.
    pub fn add_bone(
        &mut self,
        scene: &mut Scene,
        chain: ChainId,
        length: f32,
        anchor: Option<Vec3>,
    ) -> Result<EntityId> {
        let target = self.chain_mut(chain)?;
        let bone = target.add_bone(length, anchor)?;
        let position = target.start_position(bone);
        let rotation = target.final_rotation(bone);

        let entity = scene.spawn(
            Entity::new(position)
                .with_rotation(rotation)
                .with_bone(BoneLink { chain, bone }),
        )?;
        log::debug!("chain {:?}: bone {} ({} long) -> {:?}", chain, bone, length, entity);
        Ok(entity)
    }

    pub fn set_drop_positions(&mut self, chain: ChainId, a: Vec3, b: Vec3) -> Result<()> {
        self.chain_mut(chain)?.set_drop_positions(a, b);
        Ok(())
    }

    pub fn set_base_rotation(&mut self, chain: ChainId, bone: usize, rotation: Quat) -> Result<()> {
        self.chain_mut(chain)?.set_base_rotation(bone, rotation)
    }

    /// One tick: for each chain pick a target, solve, apply any pick-up or
    /// release, carry the held ball. Then mirror every bone into the store.
    pub fn update<S, R>(&mut self, store: &mut S, dt: f32, rng: &mut R) -> TickReport
    where
        S: EntityStore + ?Sized,
        R: Rng,
    {
        let mut report = TickReport::default();

        for (index, chain) in self.chains.iter_mut().enumerate() {
            if chain.is_empty() {
                continue;
            }
            let id = ChainId(index);

            // Read phase.
            if let Some(held) = chain.held {
                if !store.contains(held) {
                    log::warn!("chain {:?}: held entity {:?} is gone", id, held);
                    chain.held = None;
                }
            }
            let selection = select_target(chain, &*store);
            let result = IkSolver::solve(chain, dt, &self.config);

            let transition = if result.reached {
                report.reached += 1;
                decide(chain, selection.best, &*store)
            } else {
                None
            };

            // Write phase.
            if let Some(transition) = transition {
                apply(chain, transition, store, rng);
                log::debug!("chain {:?}: {:?}", id, transition);
                report.transitions.push((id, transition));
            }

            if let (Some(held), Some(tip)) = (chain.held, chain.tip()) {
                store.set_position(held, tip);
            }
        }

        self.write_back(store);

        log::trace!(
            "ik tick: {} chains, {} reached, {} transitions",
            self.chains.len(),
            report.reached,
            report.transitions.len()
        );
        report
    }

    /// Copies bone placement into every bone-linked entity. A bone entity sits
    /// at its bone's start (the parent's end, or the anchor for the root).
    pub fn write_back<S: EntityStore + ?Sized>(&self, store: &mut S) {
        for entity in store.query(ComponentKind::Bone) {
            let Some(link) = store.bone_link(entity) else {
                continue;
            };
            let Some(chain) = self.chains.get(link.chain.0) else {
                log::warn!("{:?} links to unknown chain {:?}", entity, link.chain);
                continue;
            };
            if link.bone >= chain.len() {
                log::warn!("{:?} links to missing bone {}", entity, link.bone);
                continue;
            }

            store.set_position(entity, chain.start_position(link.bone));
            store.set_rotation(entity, chain.final_rotation(link.bone));
        }
    }
}

fn decide<S: EntityStore + ?Sized>(
    chain: &Chain,
    best: Option<EntityId>,
    store: &S,
) -> Option<Transition> {
    match chain.held {
        Some(held) if store.velocity(held).is_none() => Some(Transition::Release(held)),
        Some(_) => None,
        None => best.map(Transition::PickUp),
    }
}

fn apply<S, R>(chain: &mut Chain, transition: Transition, store: &mut S, rng: &mut R)
where
    S: EntityStore + ?Sized,
    R: Rng,
{
    match transition {
        Transition::PickUp(ball) => {
            store.set_velocity(ball, None);
            store.set_flag(ball, Flag::IkIgnore, true);
            store.set_flag(ball, Flag::Held, true);
            chain.held = Some(ball);
        }
        Transition::Release(ball) => {
            let kick: f32 = rng.gen_range(-0.25..0.25);
            store.set_velocity(ball, Some(Vec3::ONE * kick));
            store.set_flag(ball, Flag::IkIgnore, false);
            store.set_flag(ball, Flag::Held, false);
            chain.held = None;
        }
    }
}
