//! Socket Pose Aggregator
//!
//! Resolves every declared socket to a world matrix. Sources are consulted
//! in priority order (advanced animator, single clip player, state
//! machine) and the first driving source that knows the bone wins:
//!
//! - a source's socket override (matched by socket name) before the
//!   socket's declared parent bone;
//! - with no source driving, the static fallback `entity_world * offset`;
//! - with a source driving but the bone unknown to the skeleton, the
//!   socket keeps its last value.

use glam::Affine3A;
use rustc_hash::FxHashMap;

use crate::runtime::RigCache;
use crate::socket::decl::{SocketBinding, SocketDecl};

/// Something that can pose the skeleton this tick.
pub trait PoseSource {
    /// True when this source evaluated a pose this tick.
    fn is_driving(&self) -> bool;

    /// Model-space transform of `node` from this source's last pose.
    fn node_global(&self, node: usize) -> Option<Affine3A>;

    /// Socket redirection owned by this source, matched by socket name.
    fn socket_override(&self, _socket: &str) -> Option<&SocketBinding> {
        None
    }
}

/// How a socket was resolved this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketResolution {
    /// Index of the winning source in priority order.
    Source(usize),
    Fallback,
    /// Kept its previous value.
    Stale,
}

fn resolve_from(
    source: &dyn PoseSource,
    rig: &RigCache,
    entity_world: Affine3A,
    socket: &SocketDecl,
) -> Option<Affine3A> {
    let candidates = source
        .socket_override(&socket.name)
        .map(|b| (b.bone.as_str(), b.offset))
        .into_iter()
        .chain(Some((socket.bone.as_str(), socket.offset)));

    for (bone, offset) in candidates {
        let Some(global) = rig.node(bone).and_then(|n| source.node_global(n)) else {
            continue;
        };
        return Some(entity_world * global * offset.to_affine());
    }
    None
}

/// Resolves one socket. `rig` is `None` when the entity has no usable mesh.
pub fn resolve_socket(
    socket: &mut SocketDecl,
    sources: &[&dyn PoseSource],
    rig: Option<&RigCache>,
    entity_world: Affine3A,
) -> SocketResolution {
    let mut driven = false;
    if let Some(rig) = rig {
        for (i, source) in sources.iter().enumerate() {
            if !source.is_driving() {
                continue;
            }
            driven = true;
            if let Some(world) = resolve_from(*source, rig, entity_world, socket) {
                socket.world = world;
                socket.missing_logged = false;
                return SocketResolution::Source(i);
            }
        }
    }

    if driven {
        if !socket.missing_logged {
            log::warn!(
                "Socket '{}' bone '{}' not found on the skeleton, keeping last transform",
                socket.name,
                socket.bone
            );
            socket.missing_logged = true;
        }
        return SocketResolution::Stale;
    }

    socket.world = entity_world * socket.offset.to_affine();
    SocketResolution::Fallback
}

/// Resolves every socket of one entity into `out`, keyed by socket name.
pub fn aggregate_sockets(
    sockets: &mut [SocketDecl],
    sources: &[&dyn PoseSource],
    rig: Option<&RigCache>,
    entity_world: Affine3A,
    out: &mut FxHashMap<String, Affine3A>,
) {
    out.clear();
    for socket in sockets.iter_mut() {
        resolve_socket(socket, sources, rig, entity_world);
        out.insert(socket.name.clone(), socket.world);
    }
}
