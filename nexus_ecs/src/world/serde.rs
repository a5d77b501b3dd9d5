use std::collections::HashSet;
use std::ops::Deref;

use ::serde::de::Error;
use ::serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Component, Entity, Version, ID};

use super::World;

// Serde doesn't impl Serialize for std::cell::Ref. We'll do it ourselves
struct Ref<'a, T: ?Sized>(std::cell::Ref<'a, T>);

impl<'a, T: ?Sized + Serialize> Serialize for Ref<'a, T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error> where S: Serializer {
        self.0.deref().serialize(serializer)
    }
}

#[derive(Serialize)]
struct SerializedEntity<'a> {
    id: ID,
    version: Version,
    components: Vec<Ref<'a, dyn Component + 'static>>,
}

#[derive(Serialize)]
struct SerializedWorld<'a> {
    entities: Vec<SerializedEntity<'a>>,
    /// Destroyed slots in free-list order, so that recycling resumes exactly where it left off
    destroyed: Vec<(ID, Version)>,
}

#[derive(Deserialize)]
struct DeserializedEntity {
    id: ID,
    version: Version,
    components: Vec<Box<dyn Component>>,
}

#[derive(Deserialize)]
struct DeserializedWorld {
    entities: Vec<DeserializedEntity>,
    #[serde(default)]
    destroyed: Vec<(ID, Version)>,
}

impl Serialize for World {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error> where S: Serializer {
        let entities = self.entities()
            .into_iter()
            .map(|entity| {
                let mut components: Vec<_> = self.pools
                    .values()
                    .filter_map(|pool| pool.get_as_dyn(entity.id).map(|c| (pool.type_name(), c)))
                    .collect();
                // Pools live in a HashMap, sort to get a stable output
                components.sort_by_key(|(name, _)| *name);

                SerializedEntity {
                    id: entity.id,
                    version: entity.version,
                    components: components.into_iter().map(|(_, c)| Ref(c)).collect(),
                }
            })
            .collect();

        let mut destroyed = Vec::new();
        let mut next = self.destroyed_head;
        while let Some(id) = next {
            let (link, version) = self.entities[id];
            destroyed.push((id, version));
            next = link;
        }

        SerializedWorld { entities, destroyed }.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for World {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error> where D: Deserializer<'de> {
        let DeserializedWorld { entities, destroyed } = DeserializedWorld::deserialize(deserializer)?;

        let mut seen = HashSet::new();
        for id in entities.iter().map(|e| e.id).chain(destroyed.iter().map(|&(id, _)| id)) {
            if !seen.insert(id) {
                return Err(D::Error::custom(format!("entity slot {} appears more than once", id)));
            }
        }

        let slots = seen.iter().max().map_or(0, |max| max + 1);

        let mut world = World::default();
        world.entities = vec![(None, 0); slots];

        for entity in &entities {
            world.entities[entity.id] = (Some(entity.id), entity.version);
        }

        // Rebuild the free list: first the recorded order, then any slot nobody mentioned
        let mut free: Vec<(ID, Version)> = destroyed;
        free.extend((0..slots).filter(|id| !seen.contains(id)).map(|id| (id, 0)));

        world.destroyed_head = free.first().map(|&(id, _)| id);
        for (i, &(id, version)) in free.iter().enumerate() {
            world.entities[id] = (free.get(i + 1).map(|&(next, _)| next), version);
        }

        for DeserializedEntity { id, version, components } in entities {
            for component in components {
                component.inject(&mut world, Entity { id, version });
            }
        }

        Ok(world)
    }
}

#[cfg(test)]
mod test {
    use crate::test::*;

    use super::*;

    #[test]
    fn serde() {
        let mut original = World::default();

        let e1 = original.create();
        let e2 = original.create();
        let e3 = original.create();
        let _e4 = original.create();

        original.destroy(e3);

        original.attach(e1, CompX::new("A")).unwrap();
        original.attach(e1, CompY::new("B")).unwrap();
        original.attach(e2, CompZ::new("C")).unwrap();

        let serialized = serde_json::to_string_pretty(&original).unwrap();
        let mut deserialized: World = serde_json::from_str(&serialized).unwrap();

        assert_eq!(deserialized.entities(), original.entities());
        assert_eq!(deserialized.get_one::<CompX>(e1).as_deref(), Some(&CompX::new("A")));
        assert_eq!(deserialized.get_one::<CompY>(e1).as_deref(), Some(&CompY::new("B")));
        assert_eq!(deserialized.get_one::<CompZ>(e2).as_deref(), Some(&CompZ::new("C")));
        assert!(!deserialized.contains(e3));

        // The destroyed slot is recycled with its bumped version
        assert_eq!(deserialized.create(), original.create());
    }

    #[test]
    fn duplicate_slots_are_rejected() {
        let json = r#"{"entities": [
            {"id": 0, "version": 0, "components": []},
            {"id": 0, "version": 1, "components": []}
        ]}"#;

        assert!(serde_json::from_str::<World>(json).is_err());
    }
}
