pub use glam;

pub use crate::animation::{Animation, AnimationMapComponent};
pub use crate::assets::{Asset, AssetKind};
pub use crate::config::EngineConfig;
pub use crate::error::{LoadError, SceneError};
pub use crate::registry::{AssetRegistry, Registry};
pub use crate::scene::{Placement, SceneBuilder};

pub mod ecs {
    pub use nexus_ecs::*;
}

pub mod animation;
pub mod assets;
pub mod component;
pub mod config;
pub mod error;
pub mod io;
pub mod path;
pub mod registry;
pub mod resource;
pub mod scene;
pub mod system;
