//! Pose Blend Graph
//!
//! Fixed layer order, evaluated once per entity per tick:
//!
//! 1. **Base**: clip A blended toward clip B by `blend` (or by the
//!    cross-fade timer). A missing base clip yields the bind pose and
//!    skips everything below.
//! 2. **Upper body**: same A/B evaluation, blended in through the
//!    upper-body mask scaled by the layer weight.
//! 3. **Additive**: `clip - reference` layered on top.
//! 4. **Noise**: hash-driven jitter on upper-body nodes.
//! 5. **Aim**: yaw spread across the spine nodes.
//!
//! Slot times are advanced here, so gameplay code only writes clip names,
//! speeds, loop flags and weights.

use crate::animation::{ClipCursors, ClipSlot, LocalPose};
use crate::graph::crossfade::CrossFadeState;
use crate::graph::layers::{AdditiveMask, CrossFadeConfig, LayerParams};
use crate::graph::procedural::{apply_aim, apply_noise};
use crate::runtime::RigCache;

/// Result of one graph evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphOutcome {
    /// No base clip: the output is the bind pose and IK must be skipped.
    BindPose,
    Evaluated,
}

/// Remembers the last unresolved clip name so it is logged once per
/// assignment instead of every tick.
#[derive(Debug, Clone, Default)]
struct MissingClip(Option<String>);

impl MissingClip {
    fn resolve(&mut self, cache: &RigCache, name: Option<&str>, layer: &str) -> Option<usize> {
        let name = name?;
        if let Some(index) = cache.clip_index(name) {
            self.0 = None;
            return Some(index);
        }
        if self.0.as_deref() != Some(name) {
            log::warn!(
                "{layer} clip '{name}' not found on mesh asset '{}'",
                cache.asset().path
            );
            self.0 = Some(name.to_string());
        }
        None
    }
}

/// Runtime state of one A/B clip pair.
#[derive(Debug, Clone, Default)]
struct PairState {
    cursors_a: ClipCursors,
    cursors_b: ClipCursors,
    missing_a: MissingClip,
    missing_b: MissingClip,
    fade: CrossFadeState,
}

struct PairInput<'a> {
    a: &'a mut ClipSlot,
    b: &'a mut ClipSlot,
    blend: &'a mut f32,
    cross_fade: &'a CrossFadeConfig,
}

impl PairState {
    /// Advances and samples the pair into `out`. Returns `false` when clip
    /// A cannot be resolved, leaving `out` untouched.
    fn evaluate(
        &mut self,
        layer: &str,
        cache: &RigCache,
        input: PairInput<'_>,
        dt: f32,
        out: &mut LocalPose,
        scratch: &mut LocalPose,
    ) -> bool {
        let PairInput {
            a,
            b,
            blend,
            cross_fade,
        } = input;

        let Some(index_a) = self.missing_a.resolve(cache, a.clip_name(), layer) else {
            return false;
        };
        let duration_a = cache.clip(index_a).map_or(0.0, |c| c.duration_seconds());
        a.advance(dt, duration_a);

        let index_b = self.missing_b.resolve(cache, b.clip_name(), layer);
        let duration_b = index_b
            .and_then(|i| cache.clip(i))
            .map_or(0.0, |c| c.duration_seconds());

        // a re-seeded B starts at its entry point this tick
        let mut reseeded = false;
        if cross_fade.enabled {
            reseeded = self.fade.assignment_changed(a, b);
            *blend = self
                .fade
                .update(cross_fade, a, b, duration_a, duration_b, dt);
        } else {
            self.fade.reset();
        }

        cache.sample_into(index_a, a.time, a.looping, &mut self.cursors_a, out);

        if let Some(index_b) = index_b {
            if !reseeded {
                b.advance(dt, duration_b);
            }
            let weight = blend.clamp(0.0, 1.0);
            if weight > 0.0 {
                cache.sample_into(index_b, b.time, b.looping, &mut self.cursors_b, scratch);
                out.blend_with(scratch, weight);
            }
        }
        true
    }
}

#[derive(Debug, Clone, Default)]
pub struct PoseBlendGraph {
    base: PairState,
    upper: PairState,
    additive_cursors: ClipCursors,
    reference_cursors: ClipCursors,
    missing_additive: MissingClip,
    missing_reference: MissingClip,
    noise_time: f32,
    scratch: LocalPose,
    layer_pose: LocalPose,
    reference_pose: LocalPose,
}

impl PoseBlendGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets cursors, fade timers and warnings, e.g. after a mesh switch.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Base-layer cross-fade timer, for inspection.
    #[must_use]
    pub fn base_fade(&self) -> &CrossFadeState {
        &self.base.fade
    }

    pub fn evaluate(
        &mut self,
        params: &mut LayerParams,
        cache: &RigCache,
        dt: f32,
        out: &mut LocalPose,
    ) -> GraphOutcome {
        let base = &mut params.base;
        let evaluated = self.base.evaluate(
            "Base",
            cache,
            PairInput {
                a: &mut base.a,
                b: &mut base.b,
                blend: &mut base.blend,
                cross_fade: &base.cross_fade,
            },
            dt,
            out,
            &mut self.scratch,
        );
        if !evaluated {
            out.copy_from(cache.bind_pose());
            return GraphOutcome::BindPose;
        }

        let upper = &mut params.upper_body;
        if upper.enabled && upper.weight > 0.0 {
            let evaluated = self.upper.evaluate(
                "Upper-body",
                cache,
                PairInput {
                    a: &mut upper.a,
                    b: &mut upper.b,
                    blend: &mut upper.blend,
                    cross_fade: &upper.cross_fade,
                },
                dt,
                &mut self.layer_pose,
                &mut self.scratch,
            );
            if evaluated {
                out.blend_masked(&self.layer_pose, cache.upper_body(), upper.weight.min(1.0));
            }
        }

        self.apply_additive(params, cache, dt, out);

        if params.noise.enabled {
            self.noise_time += dt;
            apply_noise(out, cache.upper_body(), &params.noise, self.noise_time);
        }

        if params.aim.enabled {
            apply_aim(out, cache.spine_nodes(), &params.aim);
        }

        GraphOutcome::Evaluated
    }

    fn apply_additive(
        &mut self,
        params: &mut LayerParams,
        cache: &RigCache,
        dt: f32,
        out: &mut LocalPose,
    ) {
        let layer = &mut params.additive;
        if !layer.enabled || layer.weight <= 0.0 {
            return;
        }
        let Some(index) = self
            .missing_additive
            .resolve(cache, layer.clip.clip_name(), "Additive")
        else {
            return;
        };
        let duration = cache.clip(index).map_or(0.0, |c| c.duration_seconds());
        layer.clip.advance(dt, duration);

        let reference_index = match layer.reference_clip.as_deref() {
            Some(name) => {
                let Some(i) = self
                    .missing_reference
                    .resolve(cache, Some(name), "Additive reference")
                else {
                    return;
                };
                i
            }
            None => index,
        };

        cache.sample_into(
            index,
            layer.clip.time,
            layer.clip.looping,
            &mut self.additive_cursors,
            &mut self.layer_pose,
        );
        cache.sample_into(
            reference_index,
            layer.reference_time,
            false,
            &mut self.reference_cursors,
            &mut self.reference_pose,
        );

        let mask = match layer.mask {
            AdditiveMask::All => None,
            AdditiveMask::UpperBody => Some(cache.upper_body()),
        };
        out.apply_additive(&self.layer_pose, &self.reference_pose, mask, layer.weight);
    }
}
