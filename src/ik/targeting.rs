use glam::Vec3;

use super::chain::Chain;
use crate::scene::{ComponentKind, EntityStore, EntityId, Flag};

/// Outcome of one chain's target pick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    /// Closest trackable ball to the chain's root, if any.
    pub best: Option<EntityId>,
    pub target: Vec3,
}

/// Picks this tick's target for `chain` and stores it on the chain.
///
/// While carrying a ball the chain heads for a drop position chosen by the
/// ball's sort key (0 goes to the first, anything else to the second).
/// Otherwise it follows the nearest ball that is not flagged
/// [`Flag::IkIgnore`]. With nothing to track the target is left as is.
pub fn select_target<S: EntityStore + ?Sized>(chain: &mut Chain, store: &S) -> Selection {
    let origin = chain.root_anchor().unwrap_or(Vec3::ZERO);

    let best = store
        .query(ComponentKind::Ball)
        .into_iter()
        .filter(|&id| !store.flag(id, Flag::IkIgnore))
        .filter_map(|id| store.position(id).map(|p| (id, (p - origin).length_squared())))
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(id, _)| id);

    if let Some(held) = chain.held {
        let [first, second] = chain.drop_positions;
        chain.target = match store.sort_key(held) {
            Some(0) => first,
            _ => second,
        };
    } else if let Some(position) = best.and_then(|id| store.position(id)) {
        chain.target = position;
    }

    Selection {
        best,
        target: chain.target,
    }
}
