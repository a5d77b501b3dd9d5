use std::sync::Arc;

use glam::{Mat4, Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use nexus_ecs::Component;

use crate::resource::{Mesh, Texture};

/// Position, Euler rotation (radians, applied X then Y then Z) and scale of an entity.
#[derive(Component, Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct TransformComponent {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for TransformComponent {
    fn default() -> Self {
        TransformComponent {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl TransformComponent {
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_translation(self.position)
            * Mat4::from_rotation_x(self.rotation.x)
            * Mat4::from_rotation_y(self.rotation.y)
            * Mat4::from_rotation_z(self.rotation.z)
            * Mat4::from_scale(self.scale)
    }
}

#[derive(Component, Serialize, Deserialize, Clone, Debug)]
pub struct MeshComponent {
    /// Qualified reference of the mesh asset this component was made from
    pub mesh: String,

    #[serde(skip)]
    pub data: Option<Arc<Mesh>>,
}

impl MeshComponent {
    pub fn new(mesh: impl Into<String>, data: Arc<Mesh>) -> MeshComponent {
        MeshComponent {
            mesh: mesh.into(),
            data: Some(data),
        }
    }
}

#[derive(Component, Serialize, Deserialize, Clone, Debug)]
pub struct TextureComponent {
    pub image: String,

    #[serde(skip)]
    pub data: Option<Arc<Texture>>,
}

impl TextureComponent {
    pub fn new(image: impl Into<String>, data: Arc<Texture>) -> TextureComponent {
        TextureComponent {
            image: image.into(),
            data: Some(data),
        }
    }
}

/// Joint matrices for skinning. Starts out empty and is filled by the animation system.
#[derive(Component, Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct BonesComponent {
    pub joints: Vec<Mat4>,
}

/// Screen-facing marker drawn at `offset` from the entity.
#[derive(Component, Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct BillboardComponent {
    pub offset: Vec3,
    /// RGBA, an RGB color gets an opaque alpha
    pub color: Vec4,
    pub size: Vec2,
    pub text: Option<String>,
    /// Keeps a constant on-screen size regardless of distance
    pub fixed: bool,
}

impl BillboardComponent {
    pub fn new(offset: Vec3, color: impl Into<Color>, size: Vec2) -> BillboardComponent {
        BillboardComponent {
            offset,
            color: color.into().0,
            size,
            text: None,
            fixed: false,
        }
    }
}

/// Accepts both RGB and RGBA colors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color(pub Vec4);

impl From<Vec3> for Color {
    fn from(rgb: Vec3) -> Self {
        Color(rgb.extend(1.0))
    }
}

impl From<Vec4> for Color {
    fn from(rgba: Vec4) -> Self {
        Color(rgba)
    }
}
