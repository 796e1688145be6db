use std::sync::Arc;

use uuid::Uuid;

use crate::animation::AnimationClip;
use crate::skeleton::Skeleton;

/// Importer output for one logical mesh asset path: skeleton plus clips.
///
/// `id` changes whenever the asset is (re)imported, which is what the
/// runtime cache compares to decide on a rebuild.
#[derive(Debug)]
pub struct MeshAsset {
    pub id: Uuid,
    pub path: String,
    pub skeleton: Arc<Skeleton>,
    pub clips: Vec<Arc<AnimationClip>>,
}

impl MeshAsset {
    #[must_use]
    pub fn new(path: impl Into<String>, skeleton: Skeleton, clips: Vec<AnimationClip>) -> Self {
        Self {
            id: Uuid::new_v4(),
            path: path.into(),
            skeleton: Arc::new(skeleton),
            clips: clips.into_iter().map(Arc::new).collect(),
        }
    }

    #[must_use]
    pub fn clip(&self, name: &str) -> Option<&Arc<AnimationClip>> {
        self.clips.iter().find(|c| c.name == name)
    }
}
