use glam::Affine3A;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::errors::{AnimationError, Result};
use crate::skeleton::transform::LocalTransform;

/// One node of the skeleton hierarchy.
///
/// Not every node is a skinned bone: helper and end-site nodes take part
/// in the hierarchy walk but never appear in the palette.
#[derive(Debug, Clone)]
pub struct SkeletonNode {
    pub name: String,
    /// `None` for roots. Always smaller than this node's own index.
    pub parent: Option<usize>,
    /// Rest transform, used wherever a clip has no data.
    pub bind_local: LocalTransform,
}

impl SkeletonNode {
    #[must_use]
    pub fn new(name: impl Into<String>, parent: Option<usize>, bind_local: LocalTransform) -> Self {
        Self {
            name: name.into(),
            parent,
            bind_local,
        }
    }
}

/// A skinned bone: a named node plus its inverse bind matrix.
#[derive(Debug, Clone)]
pub struct Bone {
    pub name: String,
    pub node: usize,
    /// Transforms vertices from mesh space into bone space.
    pub inverse_bind: Affine3A,
}

/// Immutable per-mesh skeleton, produced by the external importer.
///
/// # Invariants
///
/// Nodes are topologically sorted (`parent < child`), which lets the
/// resolver compute every global transform in a single forward pass.
#[derive(Debug, Clone)]
pub struct Skeleton {
    pub name: String,
    nodes: Vec<SkeletonNode>,
    bones: Vec<Bone>,
    /// Inverse of the importer's root transform, applied to every palette entry.
    global_inverse_root: Affine3A,
}

impl Skeleton {
    pub fn new(
        name: &str,
        nodes: Vec<SkeletonNode>,
        bones: Vec<Bone>,
        global_inverse_root: Affine3A,
    ) -> Result<Self> {
        let mut seen = FxHashSet::default();
        for (index, node) in nodes.iter().enumerate() {
            if let Some(parent) = node.parent {
                if parent >= index {
                    return Err(AnimationError::UnsortedHierarchy {
                        node: node.name.clone(),
                        index,
                        parent,
                    });
                }
            }
            if !seen.insert(node.name.as_str()) {
                return Err(AnimationError::DuplicateNodeName(node.name.clone()));
            }
        }

        if let Some(bone) = bones.iter().find(|b| b.node >= nodes.len()) {
            return Err(AnimationError::BoneNodeOutOfRange {
                bone: bone.name.clone(),
                node: bone.node,
                node_count: nodes.len(),
            });
        }

        Ok(Self {
            name: name.to_string(),
            nodes,
            bones,
            global_inverse_root,
        })
    }

    #[inline]
    #[must_use]
    pub fn nodes(&self) -> &[SkeletonNode] {
        &self.nodes
    }

    #[inline]
    #[must_use]
    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    #[must_use]
    pub fn global_inverse_root(&self) -> Affine3A {
        self.global_inverse_root
    }

    /// Linear search by node name. Hot paths go through the runtime cache map.
    #[must_use]
    pub fn find_node(&self, name: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.name == name)
    }

    /// Builds the name → node index map owned by the runtime cache.
    #[must_use]
    pub fn node_lookup(&self) -> FxHashMap<String, usize> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.name.clone(), i))
            .collect()
    }

    #[must_use]
    pub fn parent_indices(&self) -> Vec<Option<usize>> {
        self.nodes.iter().map(|n| n.parent).collect()
    }
}
