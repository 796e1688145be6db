use crate::notify::Playbacks;
use crate::runtime::world::AnimationWorld;

/// Animation system.
///
/// Drives every animated entity once per tick:
/// cache validation → drivers (sample → blend → IK → resolve) → publish →
/// notify observation → socket aggregation.
///
/// Uses the `std::mem::take` technique to avoid borrow conflicts between
/// the entity map and the rest of the world.
pub struct AnimationSystem;

impl AnimationSystem {
    /// Updates all animated entities.
    ///
    /// # Arguments
    /// * `world` - Animation world
    /// * `dt` - Delta time per frame (in seconds)
    pub fn update(world: &mut AnimationWorld, dt: f32) {
        // Temporarily take the entities out to avoid borrow conflicts
        let mut entities = std::mem::take(&mut world.entities);

        world.notifies.prune(|key| entities.contains_key(key));

        for (key, entity) in &mut entities {
            if !entity.enabled {
                entity.idle();
                world.tracker.observe(key, &[], &mut world.notifies);
                entity.resolve_sockets(None);
                continue;
            }

            let Some(asset) = world.assets.get(&entity.mesh) else {
                entity.warn_missing_mesh();
                entity.idle();
                world.cache.remove(key);
                world.tracker.observe(key, &[], &mut world.notifies);
                entity.resolve_sockets(None);
                continue;
            };
            entity.mesh_found();

            let Some(rig) = world.cache.ensure(key, &asset, &world.config) else {
                continue;
            };

            entity.evaluate_drivers(rig, &world.config, dt);
            entity.publish(rig);

            {
                let mut playbacks = Playbacks::new();
                entity.playbacks(rig, &mut playbacks);
                world.tracker.observe(key, &playbacks, &mut world.notifies);
            }

            entity.resolve_sockets(Some(&*rig));
        }

        // Return entities after update
        world.entities = entities;
    }
}
