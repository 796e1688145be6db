use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::animation::AnimationClip;
use crate::assets::mesh_asset::MeshAsset;
use crate::skeleton::Skeleton;

/// Immutable skeleton/clip data keyed by logical mesh asset path.
///
/// Entries are shared read-only (`Arc`) with every entity runtime cache
/// built from them; replacing a path leaves existing caches valid until
/// their next tick, when the changed asset id triggers a rebuild.
#[derive(Default)]
pub struct AssetLibrary {
    by_path: FxHashMap<String, Arc<MeshAsset>>,
}

impl AssetLibrary {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the asset stored at `path`.
    pub fn insert(
        &mut self,
        path: &str,
        skeleton: Skeleton,
        clips: Vec<AnimationClip>,
    ) -> Arc<MeshAsset> {
        let asset = Arc::new(MeshAsset::new(path, skeleton, clips));
        if self.by_path.insert(path.to_string(), asset.clone()).is_some() {
            log::debug!("Mesh asset '{path}' replaced, dependent runtime caches will rebuild");
        }
        asset
    }

    #[must_use]
    pub fn get(&self, path: &str) -> Option<Arc<MeshAsset>> {
        self.by_path.get(path).cloned()
    }

    pub fn remove(&mut self, path: &str) -> Option<Arc<MeshAsset>> {
        self.by_path.remove(path)
    }

    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.by_path.contains_key(path)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }
}
