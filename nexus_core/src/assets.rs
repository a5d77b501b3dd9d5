use std::fmt;
use std::path::Path;
use std::sync::Arc;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::animation::{Animation, AnimationFile, AnimationMapComponent};
use crate::component::{MeshComponent, TextureComponent};
use crate::error::LoadError;
use crate::io::Serializable;
use crate::resource::{Mesh, Texture, Vertex};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssetKind {
    Mesh,
    Image,
    Animation,
}

impl AssetKind {
    pub const ALL: [AssetKind; 3] = [AssetKind::Mesh, AssetKind::Image, AssetKind::Animation];

    /// Kind of asset stored in a file with the given extension, if the registry knows how to load it.
    pub fn from_extension(ext: &str) -> Option<AssetKind> {
        match ext.to_ascii_lowercase().as_str() {
            "png" | "jpg" | "jpeg" => Some(AssetKind::Image),
            "obj" | "mesh" => Some(AssetKind::Mesh),
            "anim" => Some(AssetKind::Animation),
            _ => None,
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AssetKind::Mesh => "mesh",
            AssetKind::Image => "image",
            AssetKind::Animation => "animation",
        })
    }
}

#[derive(Clone, Debug)]
pub enum Asset {
    Mesh(MeshAsset),
    Image(ImageAsset),
    Animation(AnimationAsset),
}

impl Asset {
    pub fn kind(&self) -> AssetKind {
        match self {
            Asset::Mesh(_) => AssetKind::Mesh,
            Asset::Image(_) => AssetKind::Image,
            Asset::Animation(_) => AssetKind::Animation,
        }
    }

    /// Reads the asset of the given kind stored at `path`. `reference` is the qualified name it is registered under.
    pub fn load(kind: AssetKind, reference: &str, path: &Path) -> Result<Asset, LoadError> {
        Ok(match kind {
            AssetKind::Mesh => Asset::Mesh(MeshAsset::load(reference, path)?),
            AssetKind::Image => Asset::Image(ImageAsset::load(reference, path)?),
            AssetKind::Animation => Asset::Animation(AnimationAsset::load(reference, path)?),
        })
    }
}

/// Geometry shared by every entity drawn with it.
#[derive(Clone, Debug)]
pub struct MeshAsset {
    reference: String,
    mesh: Arc<Mesh>,
}

impl MeshAsset {
    pub fn new(reference: impl Into<String>, mesh: Mesh) -> MeshAsset {
        MeshAsset {
            reference: reference.into(),
            mesh: Arc::new(mesh),
        }
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn to_component(&self) -> MeshComponent {
        MeshComponent::new(self.reference.clone(), Arc::clone(&self.mesh))
    }

    fn load(reference: &str, path: &Path) -> Result<MeshAsset, LoadError> {
        let is_obj = path.extension().map_or(false, |ext| ext.eq_ignore_ascii_case("obj"));
        let mesh = if is_obj {
            load_obj(path)?
        } else {
            Mesh::load(path)?
        };

        Ok(MeshAsset::new(reference, mesh))
    }
}

/// Merges every model of an OBJ file into a single indexed mesh.
fn load_obj(path: &Path) -> Result<Mesh, LoadError> {
    let (models, _) = tobj::load_obj(path, &tobj::LoadOptions {
        single_index: true,
        triangulate: true,
        ..Default::default()
    }).map_err(|source| LoadError::Obj { path: path.to_path_buf(), source })?;

    let mut out = Mesh::default();

    for model in models {
        let mesh = model.mesh;
        let base = out.vertices.len() as u32;

        for (i, position) in mesh.positions.chunks_exact(3).enumerate() {
            let normal = mesh.normals
                .get(i * 3..i * 3 + 3)
                .map_or(Vec3::ZERO, Vec3::from_slice);
            let uv = mesh.texcoords
                .get(i * 2..i * 2 + 2)
                .map(Vec2::from_slice);

            out.vertices.push(Vertex {
                position: Vec3::from_slice(position),
                normal,
                uv,
            });
        }

        out.indices.extend(mesh.indices.iter().map(|idx| base + idx));
    }

    Ok(out)
}

#[derive(Clone, Debug)]
pub struct ImageAsset {
    reference: String,
    texture: Arc<Texture>,
}

impl ImageAsset {
    pub fn new(reference: impl Into<String>, texture: Texture) -> ImageAsset {
        ImageAsset {
            reference: reference.into(),
            texture: Arc::new(texture),
        }
    }

    pub fn texture(&self) -> &Texture {
        &self.texture
    }

    pub fn to_component(&self) -> TextureComponent {
        TextureComponent::new(self.reference.clone(), Arc::clone(&self.texture))
    }

    fn load(reference: &str, path: &Path) -> Result<ImageAsset, LoadError> {
        let img = image::open(path)
            .map_err(|source| LoadError::Image { path: path.to_path_buf(), source })?
            .into_rgba8();

        Ok(ImageAsset::new(reference, Texture {
            width: img.width(),
            height: img.height(),
            raw: img.into_raw(),
        }))
    }
}

/// Clips loaded from one animation file. Each entity gets its own copy of them, since playback state lives in the
/// clips.
#[derive(Clone, Debug)]
pub struct AnimationAsset {
    animations: Vec<Animation>,
}

impl AnimationAsset {
    pub fn new(animations: Vec<Animation>) -> AnimationAsset {
        AnimationAsset { animations }
    }

    pub fn animations(&self) -> &[Animation] {
        &self.animations
    }

    pub fn to_component(&self) -> AnimationMapComponent {
        AnimationMapComponent::from_animations(self.animations.iter().cloned())
    }

    fn load(reference: &str, path: &Path) -> Result<AnimationAsset, LoadError> {
        let name = crate::scene::resolve_animation_name(reference);
        Ok(AnimationAsset::new(AnimationFile::load(path)?.into_animations(name)))
    }
}
