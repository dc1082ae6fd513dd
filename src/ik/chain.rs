use glam::{Quat, Vec3};

use super::bone::Bone;
use crate::error::{Result, SimError};
use crate::scene::EntityId;

/// Ordered bones, root first, solved together toward one target.
///
/// A bone's parent is always the bone just before it, so the chain is a
/// simple path and the recursive position/rotation definitions reduce to a
/// walk from the root.
#[derive(Debug, Clone, Default)]
pub struct Chain {
    pub(crate) bones: Vec<Bone>,
    pub(crate) target: Vec3,
    pub(crate) drop_positions: [Vec3; 2],
    pub(crate) held: Option<EntityId>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a bone and returns its index.
    ///
    /// The first bone must be given an anchor; every later bone hangs off the
    /// previous one and must not.
    pub fn add_bone(&mut self, length: f32, anchor: Option<Vec3>) -> Result<usize> {
        if !length.is_finite() || length <= 0.0 {
            return Err(SimError::InvalidBoneLength(length));
        }

        let bone = match (self.bones.len(), anchor) {
            (0, Some(anchor)) => Bone::root(length, anchor),
            (0, None) => return Err(SimError::MissingAnchor),
            (_, Some(_)) => return Err(SimError::AnchorOnChildBone),
            (n, None) => Bone::child(length, n - 1),
        };

        self.bones.push(bone);
        Ok(self.bones.len() - 1)
    }

    pub fn set_base_rotation(&mut self, bone: usize, rotation: Quat) -> Result<()> {
        let bone = self
            .bones
            .get_mut(bone)
            .ok_or(SimError::InvalidConfiguration("bone index out of range"))?;
        bone.base_rotation = rotation.normalize();
        Ok(())
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    pub fn bone(&self, index: usize) -> Option<&Bone> {
        self.bones.get(index)
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    pub fn total_length(&self) -> f32 {
        self.bones.iter().map(|b| b.length).sum()
    }

    pub fn root_anchor(&self) -> Option<Vec3> {
        self.bones.first().and_then(|b| b.anchor)
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn set_target(&mut self, target: Vec3) {
        self.target = target;
    }

    pub fn drop_positions(&self) -> [Vec3; 2] {
        self.drop_positions
    }

    pub fn set_drop_positions(&mut self, a: Vec3, b: Vec3) {
        self.drop_positions = [a, b];
    }

    /// The body currently carried by the tip.
    pub fn held(&self) -> Option<EntityId> {
        self.held
    }

    /// World orientation of bone `index`: its own `base * rotation`
    /// composed with every ancestor's, tip-side factor first.
    ///
    /// Panics if `index` is out of range.
    pub fn final_rotation(&self, index: usize) -> Quat {
        let mut rotation = self.bones[0].local_rotation();
        for bone in &self.bones[1..=index] {
            rotation = bone.local_rotation() * rotation;
        }
        rotation
    }

    /// World position of the far end of bone `index`.
    ///
    /// Panics if `index` is out of range.
    pub fn final_position(&self, index: usize) -> Vec3 {
        let mut position = self.bones[0].anchor.unwrap_or(Vec3::ZERO);
        let mut rotation = Quat::IDENTITY;
        for (i, bone) in self.bones[..=index].iter().enumerate() {
            rotation = if i == 0 {
                bone.local_rotation()
            } else {
                bone.local_rotation() * rotation
            };
            position += bone.length * (rotation * Vec3::Y);
        }
        position
    }

    /// Where bone `index` starts: the root anchor or the parent's end.
    pub fn start_position(&self, index: usize) -> Vec3 {
        match self.bones[index].parent {
            Some(parent) => self.final_position(parent),
            None => self.bones[index].anchor.unwrap_or(Vec3::ZERO),
        }
    }

    pub fn tip(&self) -> Option<Vec3> {
        if self.bones.is_empty() {
            None
        } else {
            Some(self.final_position(self.bones.len() - 1))
        }
    }

    /// Every bone's end point in one pass, root first.
    pub fn final_positions(&self) -> Vec<Vec3> {
        let mut out = Vec::with_capacity(self.bones.len());
        let mut position = self.root_anchor().unwrap_or(Vec3::ZERO);
        let mut rotation = Quat::IDENTITY;
        for (i, bone) in self.bones.iter().enumerate() {
            rotation = if i == 0 {
                bone.local_rotation()
            } else {
                bone.local_rotation() * rotation
            };
            position += bone.length * (rotation * Vec3::Y);
            out.push(position);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn straight_chain(count: usize, length: f32, anchor: Vec3) -> Chain {
        let mut chain = Chain::new();
        chain.add_bone(length, Some(anchor)).unwrap();
        for _ in 1..count {
            chain.add_bone(length, None).unwrap();
        }
        chain
    }

    #[test]
    fn add_bone_validates_configuration() {
        let mut chain = Chain::new();
        assert_eq!(chain.add_bone(0.3, None), Err(SimError::MissingAnchor));
        assert_eq!(
            chain.add_bone(0.0, Some(Vec3::ZERO)),
            Err(SimError::InvalidBoneLength(0.0))
        );
        assert_eq!(chain.add_bone(0.3, Some(Vec3::ZERO)), Ok(0));
        assert_eq!(
            chain.add_bone(0.3, Some(Vec3::ONE)),
            Err(SimError::AnchorOnChildBone)
        );
        assert_eq!(chain.add_bone(0.3, None), Ok(1));
        assert_eq!(chain.bone(1).unwrap().parent(), Some(0));
        assert!(chain.bone(0).unwrap().is_root());
    }

    #[test]
    fn root_end_is_anchor_plus_rotated_segment() {
        let anchor = Vec3::new(0.0, 0.5, 0.0);
        let mut chain = straight_chain(3, 0.3, anchor);
        chain.bones[0].rotation = Quat::from_rotation_z(FRAC_PI_2);

        let end = chain.final_position(0);
        let expected = anchor + 0.3 * (Quat::from_rotation_z(FRAC_PI_2) * Vec3::Y);
        assert!((end - expected).length() < 1e-6);
        assert!((chain.start_position(0) - anchor).length() < 1e-6);
    }

    #[test]
    fn straight_chain_points_up() {
        let chain = straight_chain(4, 0.25, Vec3::ZERO);
        let tip = chain.tip().unwrap();
        assert!((tip - Vec3::new(0.0, 1.0, 0.0)).length() < 1e-6);
        assert!((chain.total_length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn child_rotation_stacks_on_parent() {
        let mut chain = straight_chain(2, 1.0, Vec3::ZERO);
        let quarter = Quat::from_rotation_z(FRAC_PI_2);
        chain.bones[0].rotation = quarter;
        chain.bones[1].rotation = quarter;

        // Root points along -X, the child turns a further quarter to -Y.
        let root_end = chain.final_position(0);
        let tip = chain.final_position(1);
        assert!((root_end - Vec3::new(-1.0, 0.0, 0.0)).length() < 1e-5);
        assert!((tip - Vec3::new(-1.0, -1.0, 0.0)).length() < 1e-5);
        assert!(chain.final_rotation(1).is_normalized());
    }

    #[test]
    fn base_rotation_offsets_the_whole_chain() {
        let mut chain = straight_chain(3, 0.3, Vec3::ZERO);
        chain
            .set_base_rotation(0, Quat::from_rotation_z(30f32.to_radians()))
            .unwrap();
        let tip = chain.tip().unwrap();
        assert!((tip.length() - 0.9).abs() < 1e-5);
        assert!(tip.x < 0.0);
        assert!(chain.set_base_rotation(7, Quat::IDENTITY).is_err());
    }

    #[test]
    fn final_positions_match_per_bone_queries() {
        let mut chain = straight_chain(4, 0.3, Vec3::new(1.0, 0.0, -1.0));
        for (i, bone) in chain.bones.iter_mut().enumerate() {
            bone.rotation = Quat::from_rotation_x(0.2 * i as f32);
        }
        let all = chain.final_positions();
        for (i, p) in all.iter().enumerate() {
            assert!((*p - chain.final_position(i)).length() < 1e-5);
        }
    }
}
