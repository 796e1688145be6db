//! Sockets: named bone attachment points resolved to world matrices.

pub mod aggregator;
pub mod decl;

pub use aggregator::{PoseSource, SocketResolution, aggregate_sockets, resolve_socket};
pub use decl::{SocketBinding, SocketDecl};
