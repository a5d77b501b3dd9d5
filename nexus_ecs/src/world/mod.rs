use std::any::TypeId;
use std::cell::{Ref, RefMut};
use std::collections::HashMap;

use thiserror::Error;

use crate::pool::{AnyPool, Pool};
use crate::{Component, Entity, Version, ID};

pub mod query;
mod serde;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("entity {0} does not exist")]
pub struct NoSuchEntity(pub Entity);

pub struct World {
    /// For live entities the first element is the entity's own index. For destroyed ones it links to the next
    /// destroyed entity (or `None`), forming a free list that starts at `destroyed_head`.
    entities: Vec<(Option<ID>, Version)>,
    destroyed_head: Option<usize>,

    pools: HashMap<TypeId, Box<dyn AnyPool>>,
}

impl Default for World {
    fn default() -> Self {
        World {
            entities: Vec::new(),
            destroyed_head: None,
            pools: HashMap::new(),
        }
    }
}

impl World {
    pub fn create(&mut self) -> Entity {
        if let Some(destroyed_next) = self.destroyed_head {
            // Move destroyed_head to the next destroyed entity (or None)
            self.destroyed_head = self.entities[destroyed_next].0;

            let (entity_id, version) = &mut self.entities[destroyed_next];

            // Set entity id to its own index
            *entity_id = Some(destroyed_next);

            Entity {
                id: destroyed_next,
                version: *version,
            }
        } else {
            let entity = Entity {
                id: self.entities.len(),
                version: 0,
            };

            self.entities.push((Some(entity.id), entity.version));

            entity
        }
    }

    pub fn destroy(&mut self, entity: Entity) {
        if !self.contains(entity) {
            return;
        }

        // Remove all components from this entity
        for pool in self.pools.values_mut() {
            pool.clear_entity(entity.id);
        }

        let (entity_id, version) = &mut self.entities[entity.id];

        // Bump version
        *version += 1;

        // Link to what destroyed_head is currently pointing at
        *entity_id = self.destroyed_head;

        // Point destroyed_head to newly destroyed entity
        self.destroyed_head = Some(entity.id);
    }

    /// Whether `entity` is alive, i.e. it has been created and not destroyed since.
    pub fn contains(&self, entity: Entity) -> bool {
        self.entities.get(entity.id) == Some(&(Some(entity.id), entity.version))
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.entities
            .iter()
            .enumerate()
            .filter(|(idx, (entity_id, _))| *entity_id == Some(*idx))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Handles of all live entities, in slot order.
    pub fn entities(&self) -> Vec<Entity> {
        self.entities
            .iter()
            .enumerate()
            .filter(|(idx, (entity_id, _))| *entity_id == Some(*idx))
            .map(|(id, &(_, version))| Entity { id, version })
            .collect()
    }

    fn pool<T: Component>(&self) -> Option<&Pool<T>> {
        let p = self.pools.get(&TypeId::of::<T>())?;
        p.as_any().downcast_ref::<Pool<T>>()
    }

    fn pool_mut<T: Component>(&mut self) -> Option<&mut Pool<T>> {
        let p = self.pools.get_mut(&TypeId::of::<T>())?;
        p.as_any_mut().downcast_mut::<Pool<T>>()
    }

    /// Attaches `component` to `entity`, returning the component of the same type it replaced, if any.
    pub fn attach<T: Component>(&mut self, entity: Entity, component: T) -> Result<Option<T>, NoSuchEntity> {
        if !self.contains(entity) {
            return Err(NoSuchEntity(entity));
        }

        // Does a pool for this component T exist already? If not, create an empty one
        let pool = self.pools
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(Pool::<T>::new()))
            .as_any_mut()
            .downcast_mut::<Pool<T>>()
            .expect("pool registered under the TypeId of another component");

        Ok(pool.attach(entity.id, component))
    }

    pub fn detach<T: Component>(&mut self, entity: Entity) -> Option<T> {
        if !self.contains(entity) {
            return None;
        }

        self.pool_mut::<T>()?.detach(entity.id)
    }

    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        self.contains(entity) && self.pool::<T>().map_or(false, |p| p.contains(entity.id))
    }

    pub fn get_one<T: Component>(&self, entity: Entity) -> Option<Ref<T>> {
        if !self.contains(entity) {
            return None;
        }

        self.pool::<T>()?.get(entity.id)
    }

    pub fn get_one_mut<T: Component>(&mut self, entity: Entity) -> Option<RefMut<T>> {
        if !self.contains(entity) {
            return None;
        }

        self.pool::<T>()?.get_mut(entity.id)
    }

    /// Short type names of every component attached to `entity`, sorted.
    pub fn component_names(&self, entity: Entity) -> Vec<&'static str> {
        if !self.contains(entity) {
            return Vec::new();
        }

        let mut names: Vec<_> = self.pools
            .values()
            .filter(|pool| pool.contains(entity.id))
            .map(|pool| pool.type_name())
            .collect();
        names.sort_unstable();
        names
    }

    /// Starts a batch of component attachments on a live entity.
    pub fn edit(&mut self, entity: Entity) -> Result<EntityEditor<'_>, NoSuchEntity> {
        if !self.contains(entity) {
            return Err(NoSuchEntity(entity));
        }

        Ok(EntityEditor { world: self, entity })
    }

    fn entity_from_id(&self, entity_id: ID) -> Option<Entity> {
        let &(_, version) = self.entities.get(entity_id)?;
        Some(Entity {
            id: entity_id,
            version,
        })
    }
}

/// Borrow of a [`World`] scoped to one entity that is known to be alive.
pub struct EntityEditor<'w> {
    world: &'w mut World,
    entity: Entity,
}

impl<'w> EntityEditor<'w> {
    pub fn entity(&self) -> Entity {
        self.entity
    }

    pub fn add<T: Component>(&mut self, component: T) -> &mut Self {
        // The editor can only be obtained for a live entity and holds the world borrow, so it can't die meanwhile
        let _ = self.world.attach(self.entity, component);
        self
    }
}
