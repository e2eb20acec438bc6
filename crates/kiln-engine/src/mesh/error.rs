use thiserror::Error;

use super::DrawMode;

/// Build-protocol violations reported by [`MeshBuilder`](super::MeshBuilder).
///
/// All variants are invalid-state failures: the builder is left unchanged and
/// recovery is up to the caller.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Error)]
pub enum MeshError {
    #[error("begin() called while already building")]
    AlreadyBuilding,

    #[error("{op}() called while not building")]
    NotBuilding { op: &'static str },

    #[error("{op}() is not valid for a {mode:?} mesh")]
    WrongDrawMode { op: &'static str, mode: DrawMode },
}
