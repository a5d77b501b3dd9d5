use std::path::PathBuf;

use thiserror::Error;

use nexus_ecs::Entity;

use crate::assets::AssetKind;

/// Failures of scene assembly requests. None of them leave a partially built entity behind.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("no {kind} asset named `{reference}`")]
    AssetNotFound { reference: String, kind: AssetKind },
    #[error("asset `{reference}` is registered but has not been loaded")]
    AssetNotLoaded { reference: String },
    #[error("malformed asset reference `{reference}`, expected `<pack>:<name>`")]
    InvalidReference { reference: String },
    #[error("entity {entity} has no {component} component")]
    MissingComponent { entity: Entity, component: &'static str },
    #[error("no animation named `{name}`")]
    AnimationNotFound { name: String },
    #[error("entity {entity} does not exist")]
    EntityNotFound { entity: Entity },
    #[error("placement contains a non-finite component")]
    NonFinitePlacement,
}

impl From<nexus_ecs::NoSuchEntity> for SceneError {
    fn from(err: nexus_ecs::NoSuchEntity) -> Self {
        SceneError::EntityNotFound { entity: err.0 }
    }
}

/// Failures while reading assets or configuration from disk.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("{}: {source}", .path.display())]
    Io { path: PathBuf, source: std::io::Error },
    #[error("{}: {source}", .path.display())]
    Bincode { path: PathBuf, source: bincode::Error },
    #[error("{}: {source}", .path.display())]
    Json { path: PathBuf, source: serde_json::Error },
    #[error("{}: {source}", .path.display())]
    Image { path: PathBuf, source: image::ImageError },
    #[error("{}: {source}", .path.display())]
    Obj { path: PathBuf, source: tobj::LoadError },
}

pub type Result<T, E = SceneError> = std::result::Result<T, E>;
