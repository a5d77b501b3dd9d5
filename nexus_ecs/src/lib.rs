use std::fmt;

use serde::{Deserialize, Serialize};

pub use nexus_ecs_proc::Component;
pub use typetag;

pub use world::query::{Query, QueryMut};
pub use world::{EntityEditor, NoSuchEntity, World};

// Lets `#[derive(Component)]` expand to `::nexus_ecs::...` paths inside this crate too
extern crate self as nexus_ecs;

mod pool;
pub mod world;

type ID = usize;
type Version = u32;

/// Handle to an entity living in a [`World`].
///
/// The version is bumped every time the slot is recycled, so a handle to a destroyed entity never aliases the
/// entity that later takes its place.
#[derive(Eq, PartialEq, Hash, Copy, Clone, Debug, Serialize, Deserialize)]
pub struct Entity {
    id: ID,
    version: Version,
}

impl Entity {
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn version(&self) -> u32 {
        self.version
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.id, self.version)
    }
}

#[typetag::serde]
pub trait Component: 'static {
    /// Attaches the boxed component to `e`. Used when rebuilding a world from its serialized form, where the
    /// concrete type is only known to typetag.
    fn inject(self: Box<Self>, w: &mut World, e: Entity);
}
