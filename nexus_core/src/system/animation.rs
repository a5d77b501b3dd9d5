use log::trace;

use nexus_ecs::{QueryMut, World};

use crate::animation::AnimationMapComponent;
use crate::component::BonesComponent;

use super::System;

/// Advances every animation map and writes the resulting joint matrices into the entity's bones buffer.
#[derive(Debug, Default)]
pub struct AnimationSystem;

impl System for AnimationSystem {
    fn run(&mut self, world: &mut World, dt: f32) {
        for (entity, (mut animation_map, mut bones)) in <(AnimationMapComponent, BonesComponent)>::query_mut(world) {
            bones.joints = animation_map.update(dt);
            trace!("entity {} skinned with {} joints", entity, bones.joints.len());
        }
    }
}
