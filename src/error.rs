use thiserror::Error;

use crate::ik::ChainId;
use crate::scene::EntityId;

/// Configuration errors rejected when chains, bodies or worlds are built.
///
/// Nothing on the per-tick path returns one of these; a tick always runs to
/// completion.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("bone length must be finite and positive, got {0}")]
    InvalidBoneLength(f32),

    #[error("the first bone of a chain needs an anchor position")]
    MissingAnchor,

    #[error("only the root bone of a chain may carry an anchor position")]
    AnchorOnChildBone,

    #[error("unknown chain {0:?}")]
    UnknownChain(ChainId),

    #[error("unknown entity {0:?}")]
    UnknownEntity(EntityId),

    #[error("ball radius must be finite and positive, got {0}")]
    InvalidRadius(f32),

    #[error("bounding box min must not exceed max")]
    InvalidAabb,

    #[error("world bounds min must not exceed max")]
    InvalidBounds,

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(&'static str),
}

pub type Result<T> = std::result::Result<T, SimError>;
