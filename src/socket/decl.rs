use glam::Affine3A;
use serde::{Deserialize, Serialize};

use crate::skeleton::LocalTransform;

/// Named attachment point: a bone plus a local offset.
///
/// `world` is the last resolved world matrix. It is kept when a tick
/// cannot resolve the socket, and read directly by consumers that do not
/// go through the per-entity socket map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocketDecl {
    pub name: String,
    pub bone: String,
    pub offset: LocalTransform,
    #[serde(skip)]
    pub world: Affine3A,
    #[serde(skip)]
    pub(crate) missing_logged: bool,
}

impl SocketDecl {
    #[must_use]
    pub fn new(name: impl Into<String>, bone: impl Into<String>, offset: LocalTransform) -> Self {
        Self {
            name: name.into(),
            bone: bone.into(),
            offset,
            world: Affine3A::IDENTITY,
            missing_logged: false,
        }
    }
}

/// Per-driver socket redirection: the socket follows `bone` with `offset`
/// instead of its declared bone and offset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocketBinding {
    pub bone: String,
    pub offset: LocalTransform,
}

impl SocketBinding {
    #[must_use]
    pub fn new(bone: impl Into<String>, offset: LocalTransform) -> Self {
        Self {
            bone: bone.into(),
            offset,
        }
    }
}
