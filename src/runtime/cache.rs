//! Per-entity runtime cache
//!
//! Everything derived from a mesh asset that an entity needs every tick:
//! name lookups, parent indices, the bind pose, bone masks, clip bindings
//! and the precomputed sample tables. Built lazily on first evaluation and
//! rebuilt from scratch whenever the entity's asset id changes.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use slotmap::SecondaryMap;
use smallvec::SmallVec;
use uuid::Uuid;

use crate::animation::{
    AnimationClip, Binder, ClipBinding, ClipCursors, LocalPose, PrecomputedClip, sample_clip_into,
};
use crate::assets::MeshAsset;
use crate::config::AnimationConfig;
use crate::runtime::EntityKey;
use crate::runtime::resolver::ResolvedPose;
use crate::skeleton::{BoneMask, Skeleton};

pub struct RigCache {
    asset: Arc<MeshAsset>,
    node_lookup: FxHashMap<String, usize>,
    parents: Vec<Option<usize>>,
    bind_pose: LocalPose,
    upper_body: BoneMask,
    spine_nodes: SmallVec<[usize; 4]>,
    clip_lookup: FxHashMap<String, usize>,
    bindings: Vec<ClipBinding>,
    precomputed: Vec<Option<PrecomputedClip>>,
    /// Published output of the last tick.
    pub(crate) last: ResolvedPose,
}

impl RigCache {
    #[must_use]
    pub fn build(asset: Arc<MeshAsset>, config: &AnimationConfig) -> Self {
        let skeleton = &asset.skeleton;
        let node_lookup = skeleton.node_lookup();
        let bind_pose = LocalPose::bind(skeleton);

        let classification = &config.classification;
        let upper_body = classification.upper_body().mask(skeleton);
        let spine_nodes = classification
            .spine()
            .select(skeleton, classification.aim_spine_count);

        let mut clip_lookup = FxHashMap::default();
        for (i, clip) in asset.clips.iter().enumerate() {
            if clip_lookup.insert(clip.name.clone(), i).is_some() {
                log::warn!(
                    "Mesh asset '{}' has more than one clip named '{}', using the last",
                    asset.path,
                    clip.name
                );
            }
        }

        let bindings: Vec<ClipBinding> = asset
            .clips
            .iter()
            .map(|clip| Binder::bind(&node_lookup, clip))
            .collect();

        let precomputed = if config.sampling.precompute {
            asset
                .clips
                .iter()
                .zip(&bindings)
                .map(|(clip, binding)| {
                    if clip.has_step_tracks() {
                        log::debug!("Clip '{}' has stepped tracks, sampled on the fly", clip.name);
                        return None;
                    }
                    match PrecomputedClip::build(clip, binding, &bind_pose, config.sampling.sample_rate) {
                        Ok(table) => Some(table),
                        Err(e) => {
                            log::warn!("Clip '{}' sampled on the fly: {e}", clip.name);
                            None
                        }
                    }
                })
                .collect()
        } else {
            vec![None; asset.clips.len()]
        };

        log::debug!(
            "Runtime cache built for '{}': {} nodes, {} clips ({} precomputed)",
            asset.path,
            skeleton.node_count(),
            asset.clips.len(),
            precomputed.iter().filter(|p| p.is_some()).count()
        );

        Self {
            parents: skeleton.parent_indices(),
            node_lookup,
            bind_pose,
            upper_body,
            spine_nodes,
            clip_lookup,
            bindings,
            precomputed,
            last: ResolvedPose::default(),
            asset,
        }
    }

    #[inline]
    #[must_use]
    pub fn asset_id(&self) -> Uuid {
        self.asset.id
    }

    #[inline]
    #[must_use]
    pub fn asset(&self) -> &Arc<MeshAsset> {
        &self.asset
    }

    #[inline]
    #[must_use]
    pub fn skeleton(&self) -> &Skeleton {
        &self.asset.skeleton
    }

    #[inline]
    #[must_use]
    pub fn node(&self, name: &str) -> Option<usize> {
        self.node_lookup.get(name).copied()
    }

    #[inline]
    #[must_use]
    pub fn parents(&self) -> &[Option<usize>] {
        &self.parents
    }

    #[inline]
    #[must_use]
    pub fn bind_pose(&self) -> &LocalPose {
        &self.bind_pose
    }

    #[inline]
    #[must_use]
    pub fn upper_body(&self) -> &BoneMask {
        &self.upper_body
    }

    #[inline]
    #[must_use]
    pub fn spine_nodes(&self) -> &[usize] {
        &self.spine_nodes
    }

    #[inline]
    #[must_use]
    pub fn clip_index(&self, name: &str) -> Option<usize> {
        self.clip_lookup.get(name).copied()
    }

    #[must_use]
    pub fn clip(&self, index: usize) -> Option<&AnimationClip> {
        self.asset.clips.get(index).map(AsRef::as_ref)
    }

    /// Clip duration in seconds, looked up by name.
    #[must_use]
    pub fn clip_duration(&self, name: &str) -> Option<f32> {
        self.clip_index(name)
            .and_then(|i| self.clip(i))
            .map(AnimationClip::duration_seconds)
    }

    #[must_use]
    pub fn is_precomputed(&self, index: usize) -> bool {
        matches!(self.precomputed.get(index), Some(Some(_)))
    }

    /// Samples clip `index` at `time_seconds` into `out`.
    ///
    /// Uses the precomputed table when one exists, otherwise evaluates the
    /// keyframe tracks directly. Returns `false` for an unknown index, in
    /// which case `out` is left untouched.
    pub fn sample_into(
        &self,
        index: usize,
        time_seconds: f32,
        looping: bool,
        cursors: &mut ClipCursors,
        out: &mut LocalPose,
    ) -> bool {
        if let Some(Some(table)) = self.precomputed.get(index) {
            table.sample_into(time_seconds, looping, out);
            return true;
        }
        let (Some(clip), Some(binding)) = (self.asset.clips.get(index), self.bindings.get(index))
        else {
            return false;
        };
        sample_clip_into(
            clip,
            binding,
            &self.bind_pose,
            time_seconds,
            looping,
            cursors,
            out,
        );
        true
    }

    /// Globals and palette published by the last tick.
    #[inline]
    #[must_use]
    pub fn last_resolved(&self) -> &ResolvedPose {
        &self.last
    }
}

/// Runtime caches keyed by entity.
#[derive(Default)]
pub struct RuntimeCache {
    entries: SecondaryMap<EntityKey, RigCache>,
}

impl RuntimeCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cache for `key`, building or rebuilding it when the
    /// entity has no cache yet or its asset changed.
    pub fn ensure(
        &mut self,
        key: EntityKey,
        asset: &Arc<MeshAsset>,
        config: &AnimationConfig,
    ) -> Option<&mut RigCache> {
        let stale = self
            .entries
            .get(key)
            .is_none_or(|cache| cache.asset_id() != asset.id);
        if stale {
            if self.entries.contains_key(key) {
                log::debug!("Mesh asset changed for entity {key:?}, rebuilding runtime cache");
            }
            self.entries
                .insert(key, RigCache::build(asset.clone(), config));
        }
        self.entries.get_mut(key)
    }

    #[must_use]
    pub fn get(&self, key: EntityKey) -> Option<&RigCache> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: EntityKey) -> Option<&mut RigCache> {
        self.entries.get_mut(key)
    }

    pub fn remove(&mut self, key: EntityKey) -> Option<RigCache> {
        self.entries.remove(key)
    }

    /// Drops every cache so they rebuild with new settings.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
