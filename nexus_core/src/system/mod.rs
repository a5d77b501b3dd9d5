use nexus_ecs::World;

pub mod animation;

/// Per-frame logic over a world.
pub trait System {
    fn run(&mut self, world: &mut World, dt: f32);
}
