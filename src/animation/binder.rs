use rustc_hash::FxHashMap;

use crate::animation::clip::AnimationClip;

/// Resolved channel → node mapping for one clip on one skeleton.
///
/// `nodes[i]` is the skeleton node animated by `clip.channels[i]`, or
/// `None` when the skeleton has no node with that name.
#[derive(Debug, Clone, Default)]
pub struct ClipBinding {
    pub nodes: Vec<Option<usize>>,
}

impl ClipBinding {
    #[must_use]
    pub fn bound_count(&self) -> usize {
        self.nodes.iter().flatten().count()
    }
}

pub struct Binder;

impl Binder {
    /// Binds every channel of `clip` to a node index through `lookup`.
    #[must_use]
    pub fn bind(lookup: &FxHashMap<String, usize>, clip: &AnimationClip) -> ClipBinding {
        let nodes: Vec<Option<usize>> = clip
            .channels
            .iter()
            .map(|channel| lookup.get(&channel.node_name).copied())
            .collect();

        let unbound = nodes.iter().filter(|n| n.is_none()).count();
        if unbound > 0 {
            log::debug!(
                "Clip '{}': {unbound} of {} channels target nodes missing from the skeleton",
                clip.name,
                nodes.len()
            );
        }

        ClipBinding { nodes }
    }
}
