use glam::{Quat, Vec3};

/// One rigid segment of a chain. Grows along its local +Y axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    pub length: f32,
    /// Orientation driven by the solver.
    pub rotation: Quat,
    /// Fixed offset composed in front of `rotation`.
    pub base_rotation: Quat,
    /// Curl accumulator, raised when the target is closer than the bone
    /// reaches and halved every pass.
    pub compensation: f32,
    pub(crate) anchor: Option<Vec3>,
    pub(crate) parent: Option<usize>,
}

impl Bone {
    pub(crate) fn root(length: f32, anchor: Vec3) -> Self {
        Self {
            length,
            rotation: Quat::IDENTITY,
            base_rotation: Quat::IDENTITY,
            compensation: 0.0,
            anchor: Some(anchor),
            parent: None,
        }
    }

    pub(crate) fn child(length: f32, parent: usize) -> Self {
        Self {
            length,
            rotation: Quat::IDENTITY,
            base_rotation: Quat::IDENTITY,
            compensation: 0.0,
            anchor: None,
            parent: Some(parent),
        }
    }

    /// Origin of the chain; only the root bone has one.
    pub fn anchor(&self) -> Option<Vec3> {
        self.anchor
    }

    /// Index of the previous bone in the same chain.
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub(crate) fn local_rotation(&self) -> Quat {
        self.base_rotation * self.rotation
    }
}
