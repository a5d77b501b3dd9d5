//! Turns "put this model here" requests into entities in a [`World`].

use glam::{Vec2, Vec3};
use log::debug;

use nexus_ecs::{Entity, World};

use crate::animation::AnimationMapComponent;
use crate::component::{BillboardComponent, BonesComponent, Color, TransformComponent};
use crate::error::{Result, SceneError};
use crate::path::PACK_SEPARATOR;
use crate::registry::AssetRegistry;

/// Where an entity goes. Every component is guaranteed to be finite.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    position: Vec3,
    rotation: Vec3,
    scale: Vec3,
}

impl Placement {
    pub fn new(position: Vec3, rotation: Vec3, scale: Vec3) -> Result<Placement> {
        if !(position.is_finite() && rotation.is_finite() && scale.is_finite()) {
            return Err(SceneError::NonFinitePlacement);
        }

        Ok(Placement { position, rotation, scale })
    }

    /// Unrotated placement at `position` with a uniform `scale`.
    pub fn at(position: Vec3, scale: f32) -> Result<Placement> {
        Placement::new(position, Vec3::ZERO, Vec3::splat(scale))
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }
}

/// Reduces a qualified animation reference to the bare clip name, i.e. its last segment.
///
/// `core:animations:Jazz Dancing` becomes `Jazz Dancing`, a name without separators is returned as is.
pub fn resolve_animation_name(qualified: &str) -> &str {
    qualified.rsplit(PACK_SEPARATOR).next().unwrap_or(qualified)
}

pub fn create_transform(position: Vec3, rotation: Vec3, scale: Vec3) -> TransformComponent {
    TransformComponent { position, rotation, scale }
}

/// Assembles entities from assets. Holds nothing but the registry it reads from and the world it writes to.
pub struct SceneBuilder<'a, R: AssetRegistry + ?Sized> {
    registry: &'a R,
    world: &'a mut World,
}

impl<'a, R: AssetRegistry + ?Sized> SceneBuilder<'a, R> {
    pub fn new(registry: &'a R, world: &'a mut World) -> Self {
        SceneBuilder { registry, world }
    }

    pub fn world(&self) -> &World {
        &*self.world
    }

    fn transform_of(placement: &Placement) -> TransformComponent {
        create_transform(placement.position, placement.rotation, placement.scale)
    }

    /// Creates a skinned entity with a transform, mesh, texture, empty bones buffer and the clips of `animation`.
    ///
    /// All three assets are resolved before the entity is created, so a failed lookup leaves the world untouched.
    pub fn add_animated_entity(
        &mut self,
        placement: Placement,
        model: &str,
        image: &str,
        animation: &str,
    ) -> Result<Entity> {
        let mesh = self.registry.mesh(model)?;
        let texture = self.registry.texture(image)?;
        let animation_map = self.registry.animation_map(animation)?;

        let entity = self.world.create();
        self.world
            .edit(entity)?
            .add(Self::transform_of(&placement))
            .add(mesh)
            .add(BonesComponent::default())
            .add(texture)
            .add(animation_map);

        debug!("created animated entity {} from {}", entity, model);
        Ok(entity)
    }

    /// Creates a static entity with a transform, mesh and texture.
    pub fn add_entity(&mut self, placement: Placement, model: &str, image: &str) -> Result<Entity> {
        let mesh = self.registry.mesh(model)?;
        let texture = self.registry.texture(image)?;

        let entity = self.world.create();
        self.world
            .edit(entity)?
            .add(Self::transform_of(&placement))
            .add(mesh)
            .add(texture);

        debug!("created static entity {} from {}", entity, model);
        Ok(entity)
    }

    /// Starts the clip called `animation` on `entity` at full weight.
    pub fn play_animation(&mut self, entity: Entity, animation: &str) -> Result<()> {
        if !self.world.contains(entity) {
            return Err(SceneError::EntityNotFound { entity });
        }

        let mut map = self.world
            .get_one_mut::<AnimationMapComponent>(entity)
            .ok_or(SceneError::MissingComponent { entity, component: "AnimationMap" })?;

        map.play(animation, 1.0)?;

        debug!("entity {} plays {}", entity, animation);
        Ok(())
    }

    /// Attaches a billboard to any live entity, replacing a previous one.
    pub fn add_billboard(&mut self, entity: Entity, offset: Vec3, color: impl Into<Color>, size: Vec2) -> Result<()> {
        self.world.attach(entity, BillboardComponent::new(offset, color, size))?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use glam::Vec4;

    use crate::animation::test::slide;
    use crate::animation::Animation;
    use crate::assets::{AnimationAsset, Asset, AssetKind, ImageAsset, MeshAsset};
    use crate::component::{MeshComponent, TextureComponent};
    use crate::registry::Registry;
    use crate::resource::{Mesh, Texture};

    use super::*;

    const MODEL: &str = "core:models:Jazz Dancing";
    const IMAGE: &str = "core:images:lola_diffuse";
    const ANIMATION: &str = "core:animations:Jazz Dancing";

    fn registry() -> Registry {
        let mut r = Registry::new();
        r.put("core:models", "Jazz Dancing", Asset::Mesh(MeshAsset::new(MODEL, Mesh::default())));
        r.put("core:images", "lola_diffuse", Asset::Image(ImageAsset::new(IMAGE, Texture {
            width: 1,
            height: 1,
            raw: vec![255; 4],
        })));
        r.put("core:animations", "Jazz Dancing", Asset::Animation(AnimationAsset::new(vec![
            slide("Jazz Dancing", Vec3::Y),
            Animation::new("Idle", 1.0, Vec::new()),
        ])));
        r
    }

    fn placement() -> Placement {
        Placement::at(Vec3::ZERO, 0.5).unwrap()
    }

    #[test]
    fn resolve_names() {
        assert_eq!(resolve_animation_name("core:animations:Jazz Dancing"), "Jazz Dancing");
        assert_eq!(resolve_animation_name("Idle"), "Idle");
        assert_eq!(resolve_animation_name(""), "");
        assert_eq!(resolve_animation_name("core:"), "");
    }

    #[test]
    fn create_transform_is_pure() {
        let a = create_transform(Vec3::X, Vec3::Y, Vec3::ZERO);
        let b = create_transform(Vec3::X, Vec3::Y, Vec3::ZERO);

        assert_eq!(a, b);
        assert_eq!(a.position, Vec3::X);
        assert_eq!(a.rotation, Vec3::Y);
        assert_eq!(a.scale, Vec3::ZERO);
    }

    #[test]
    fn non_finite_placement() {
        assert_eq!(
            Placement::new(Vec3::new(f32::NAN, 0.0, 0.0), Vec3::ZERO, Vec3::ONE),
            Err(SceneError::NonFinitePlacement),
        );
        assert_eq!(Placement::at(Vec3::ZERO, f32::INFINITY), Err(SceneError::NonFinitePlacement));
    }

    #[test]
    fn animated_entity_has_five_components() {
        let r = registry();
        let mut w = World::default();
        let mut scene = SceneBuilder::new(&r, &mut w);

        let e = scene.add_animated_entity(placement(), MODEL, IMAGE, ANIMATION).unwrap();

        assert_eq!(scene.world().component_names(e), vec![
            "AnimationMapComponent",
            "BonesComponent",
            "MeshComponent",
            "TextureComponent",
            "TransformComponent",
        ]);
        assert!(w.get_one::<BonesComponent>(e).unwrap().joints.is_empty());
        assert_eq!(w.get_one::<TransformComponent>(e).unwrap().scale, Vec3::splat(0.5));
        assert_eq!(w.get_one::<MeshComponent>(e).unwrap().mesh, MODEL);
        assert_eq!(w.get_one::<TextureComponent>(e).unwrap().image, IMAGE);
    }

    #[test]
    fn static_entity_has_three_components() {
        let r = registry();
        let mut w = World::default();
        let mut scene = SceneBuilder::new(&r, &mut w);

        let e = scene.add_entity(placement(), MODEL, IMAGE).unwrap();

        assert_eq!(scene.world().component_names(e), vec![
            "MeshComponent",
            "TextureComponent",
            "TransformComponent",
        ]);
        assert!(!w.has::<AnimationMapComponent>(e));
    }

    #[test]
    fn unknown_model_creates_nothing() {
        let r = registry();
        let mut w = World::default();
        let mut scene = SceneBuilder::new(&r, &mut w);

        let err = scene.add_animated_entity(placement(), "core:models:Nope", IMAGE, ANIMATION).unwrap_err();

        assert_eq!(err, SceneError::AssetNotFound {
            reference: "core:models:Nope".to_string(),
            kind: AssetKind::Mesh,
        });
        assert!(w.is_empty());
    }

    #[test]
    fn unknown_animation_creates_nothing() {
        let r = registry();
        let mut w = World::default();
        let mut scene = SceneBuilder::new(&r, &mut w);

        assert_eq!(
            scene.add_animated_entity(placement(), MODEL, IMAGE, "core:animations:Nope").unwrap_err(),
            SceneError::AssetNotFound { reference: "core:animations:Nope".to_string(), kind: AssetKind::Animation },
        );
        assert!(w.is_empty());
    }

    #[test]
    fn unknown_image_creates_nothing() {
        let r = registry();
        let mut w = World::default();
        let mut scene = SceneBuilder::new(&r, &mut w);

        assert_eq!(
            scene.add_entity(placement(), MODEL, "core:images:Nope").unwrap_err(),
            SceneError::AssetNotFound { reference: "core:images:Nope".to_string(), kind: AssetKind::Image },
        );
        assert!(w.is_empty());
    }

    #[test]
    fn malformed_reference() {
        let r = registry();
        let mut w = World::default();
        let mut scene = SceneBuilder::new(&r, &mut w);

        assert_eq!(
            scene.add_entity(placement(), "Jazz Dancing", IMAGE).unwrap_err(),
            SceneError::InvalidReference { reference: "Jazz Dancing".to_string() },
        );
        assert!(w.is_empty());
    }

    #[test]
    fn play_on_static_entity() {
        let r = registry();
        let mut w = World::default();
        let mut scene = SceneBuilder::new(&r, &mut w);

        let e = scene.add_entity(placement(), MODEL, IMAGE).unwrap();
        let before = scene.world().component_names(e);

        assert_eq!(
            scene.play_animation(e, "Jazz Dancing"),
            Err(SceneError::MissingComponent { entity: e, component: "AnimationMap" }),
        );
        assert_eq!(scene.world().component_names(e), before);
    }

    #[test]
    fn play_unknown_animation() {
        let r = registry();
        let mut w = World::default();
        let mut scene = SceneBuilder::new(&r, &mut w);

        let e = scene.add_animated_entity(placement(), MODEL, IMAGE, ANIMATION).unwrap();

        assert_eq!(
            scene.play_animation(e, "Breakdance"),
            Err(SceneError::AnimationNotFound { name: "Breakdance".to_string() }),
        );
    }

    #[test]
    fn play_on_destroyed_entity() {
        let r = registry();
        let mut w = World::default();

        let e = SceneBuilder::new(&r, &mut w).add_animated_entity(placement(), MODEL, IMAGE, ANIMATION).unwrap();
        w.destroy(e);

        assert_eq!(
            SceneBuilder::new(&r, &mut w).play_animation(e, "Jazz Dancing"),
            Err(SceneError::EntityNotFound { entity: e }),
        );
    }

    #[test]
    fn play_by_resolved_name() {
        let r = registry();
        let mut w = World::default();
        let mut scene = SceneBuilder::new(&r, &mut w);

        let e = scene.add_animated_entity(placement(), MODEL, IMAGE, ANIMATION).unwrap();
        scene.play_animation(e, resolve_animation_name(ANIMATION)).unwrap();

        let map = w.get_one::<AnimationMapComponent>(e).unwrap();
        assert_eq!(map.current(), Some(("Jazz Dancing", 1.0)));
    }

    #[test]
    fn entities_get_their_own_playback_state() {
        let r = registry();
        let mut w = World::default();
        let mut scene = SceneBuilder::new(&r, &mut w);

        let a = scene.add_animated_entity(placement(), MODEL, IMAGE, ANIMATION).unwrap();
        let b = scene.add_animated_entity(placement(), MODEL, IMAGE, ANIMATION).unwrap();
        scene.play_animation(a, "Idle").unwrap();

        assert!(w.get_one::<AnimationMapComponent>(a).unwrap().is_playing("Idle"));
        assert_eq!(w.get_one::<AnimationMapComponent>(b).unwrap().current(), None);
    }

    #[test]
    fn billboard_is_additive() {
        let r = registry();
        let mut w = World::default();
        let mut scene = SceneBuilder::new(&r, &mut w);

        let e = scene.add_entity(placement(), MODEL, IMAGE).unwrap();
        scene.add_billboard(e, Vec3::new(0.0, 1.5, 0.0), Vec3::X, Vec2::splat(0.5)).unwrap();

        assert_eq!(scene.world().component_names(e).len(), 4);
        let billboard = w.get_one::<BillboardComponent>(e).unwrap();
        assert_eq!(billboard.color, Vec4::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(billboard.offset, Vec3::new(0.0, 1.5, 0.0));
    }

    #[test]
    fn billboard_on_dead_entity() {
        let r = registry();
        let mut w = World::default();
        let e = w.create();
        w.destroy(e);

        assert_eq!(
            SceneBuilder::new(&r, &mut w).add_billboard(e, Vec3::ZERO, Vec4::ONE, Vec2::ONE),
            Err(SceneError::EntityNotFound { entity: e }),
        );
    }

    #[test]
    fn billboard_needs_no_other_component() {
        let r = registry();
        let mut w = World::default();
        let e = w.create();

        SceneBuilder::new(&r, &mut w).add_billboard(e, Vec3::ZERO, Vec4::ONE, Vec2::ONE).unwrap();

        assert_eq!(w.component_names(e), vec!["BillboardComponent"]);
        assert!(w.get_one::<BonesComponent>(e).is_none());
    }
}
