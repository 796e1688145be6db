use smallvec::SmallVec;

use crate::skeleton::hierarchy::Skeleton;

/// Keyword-based bone classification.
///
/// A node belongs to the class when its lowercase name contains any of
/// the keywords. Used for the upper-body mask, the noise layer and the
/// aim spine selection.
#[derive(Debug, Clone, Default)]
pub struct BoneClassifier {
    keywords: Vec<String>,
}

impl BoneClassifier {
    #[must_use]
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().to_ascii_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        let name = name.to_ascii_lowercase();
        self.keywords.iter().any(|k| name.contains(k.as_str()))
    }

    /// Builds a binary mask over every node of `skeleton`.
    #[must_use]
    pub fn mask(&self, skeleton: &Skeleton) -> BoneMask {
        BoneMask {
            weights: skeleton
                .nodes()
                .iter()
                .map(|n| if self.matches(&n.name) { 1.0 } else { 0.0 })
                .collect(),
        }
    }

    /// First `limit` matching nodes in hierarchy order.
    #[must_use]
    pub fn select(&self, skeleton: &Skeleton, limit: usize) -> SmallVec<[usize; 4]> {
        skeleton
            .nodes()
            .iter()
            .enumerate()
            .filter(|(_, n)| self.matches(&n.name))
            .map(|(i, _)| i)
            .take(limit)
            .collect()
    }
}

/// Per-node blend weight in `[0, 1]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoneMask {
    weights: Vec<f32>,
}

impl BoneMask {
    #[must_use]
    pub fn full(node_count: usize) -> Self {
        Self {
            weights: vec![1.0; node_count],
        }
    }

    #[must_use]
    pub fn empty(node_count: usize) -> Self {
        Self {
            weights: vec![0.0; node_count],
        }
    }

    #[inline]
    #[must_use]
    pub fn weight(&self, node: usize) -> f32 {
        self.weights.get(node).copied().unwrap_or(0.0)
    }

    pub fn set_weight(&mut self, node: usize, weight: f32) {
        if let Some(w) = self.weights.get_mut(node) {
            *w = weight.clamp(0.0, 1.0);
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Indices of nodes with a non-zero weight.
    pub fn active_nodes(&self) -> impl Iterator<Item = usize> + '_ {
        self.weights
            .iter()
            .enumerate()
            .filter(|(_, w)| **w > 0.0)
            .map(|(i, _)| i)
    }
}
