use std::any::Any;
use std::cell::{Ref, RefCell, RefMut};

use crate::{Component, ID};

const PAGE_SIZE: usize = 100;

/// A `Page` is either null or a pointer to an array of optional indices
type Page = Option<Box<[Option<usize>; PAGE_SIZE]>>;

/// Sparse set holding at most one component of type `T` per entity.
pub struct Pool<T: Component> {
    sparse: Vec<Page>,
    packed: Vec<ID>,
    components: Vec<RefCell<T>>,
}

impl<T: Component> Pool<T> {
    pub fn new() -> Self {
        Self {
            sparse: Vec::new(),
            packed: Vec::new(),
            components: Vec::new(),
        }
    }

    /// Index of the page where the entity with the given ID should reside
    fn idx_to_page(entity_id: ID) -> usize {
        entity_id / PAGE_SIZE
    }

    /// Index into the page where the entity with the given ID should reside
    fn idx_into_page(entity_id: ID) -> usize {
        entity_id % PAGE_SIZE
    }

    /// Index into the packed arrays for the given entity, if it has a component in this pool
    fn packed_idx(&self, entity_id: ID) -> Option<usize> {
        // We don't need to check if `idx_into_page` is small enough because it always will. If it was greater or
        // equal to the length of the page, it would've been placed in the next page.
        self.sparse.get(Self::idx_to_page(entity_id))?.as_ref()?[Self::idx_into_page(entity_id)]
    }

    /// Attaches `component` to the entity. If the entity already had a component of this type, it is replaced and
    /// the old one is returned.
    pub fn attach(&mut self, entity_id: ID, component: T) -> Option<T> {
        // Already present: nothing changes regarding the sparse and packed arrays
        if let Some(packed_idx) = self.packed_idx(entity_id) {
            return Some(self.components[packed_idx].replace(component));
        }

        let idx_to_page = Self::idx_to_page(entity_id);
        let idx_into_page = Self::idx_into_page(entity_id);

        // Is the vector large enough for us to be able to place the page at the correct index?
        if self.sparse.len() <= idx_to_page {
            // If not, make it bigger
            self.sparse.resize(idx_to_page + 1, None);
        }

        // Get a mut ref to the page (which is just a pointer to an array or null). If it is null, insert an empty page
        let page = self.sparse[idx_to_page].get_or_insert_with(|| Box::new([None; PAGE_SIZE]));

        // The new component will be pushed to the end of the packed arrays so that's the index that we should store
        page[idx_into_page] = Some(self.packed.len());

        self.packed.push(entity_id);
        self.components.push(RefCell::new(component));

        None
    }

    pub fn detach(&mut self, entity_id: ID) -> Option<T> {
        let idx_to_page = Self::idx_to_page(entity_id);
        let idx_into_page = Self::idx_into_page(entity_id);

        let packed_idx = self.packed_idx(entity_id)?;

        // We will swap the last element of the packed arrays with the removed element
        let packed_idx_of_last = self.packed.len() - 1;
        let entity_id_of_last = self.packed[packed_idx_of_last];

        // `packed_idx` succeeded so the page is there
        if let Some(page) = self.sparse[idx_to_page].as_mut() {
            page[idx_into_page] = None;

            // If the page is now empty, delete it
            if page.iter().all(|e| e.is_none()) {
                self.sparse[idx_to_page] = None;

                // If the sparse array need not to be so large anymore because the page got deleted, shrink it
                while matches!(self.sparse.last(), Some(None)) {
                    self.sparse.pop();
                }
            }
        }

        // Adjust the packed index for the last element of the packed arrays since we will be swapping it with the
        // deleted element. But only if the element we're deleting and the last one are different. Otherwise we
        // may have already deleted the page that we wish to now update.
        if entity_id != entity_id_of_last {
            let page_of_last = Self::idx_to_page(entity_id_of_last);
            let idx_into_page_of_last = Self::idx_into_page(entity_id_of_last);

            if let Some(page) = self.sparse[page_of_last].as_mut() {
                page[idx_into_page_of_last] = Some(packed_idx);
            }
        }

        // Swap-remove in both packed arrays
        self.packed.swap_remove(packed_idx);
        Some(self.components.swap_remove(packed_idx).into_inner())
    }

    pub fn contains(&self, entity_id: ID) -> bool {
        self.packed_idx(entity_id).is_some()
    }

    pub fn get(&self, entity_id: ID) -> Option<Ref<T>> {
        let packed_idx = self.packed_idx(entity_id)?;
        Some(self.components[packed_idx].borrow())
    }

    pub fn get_mut(&self, entity_id: ID) -> Option<RefMut<T>> {
        let packed_idx = self.packed_idx(entity_id)?;
        Some(self.components[packed_idx].borrow_mut())
    }

    pub fn entities_ids(&self) -> Vec<ID> {
        self.packed.clone()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.packed.len()
    }
}

pub trait AnyPool {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn type_name(&self) -> &'static str;
    fn contains(&self, entity_id: ID) -> bool;
    fn clear_entity(&mut self, entity_id: ID);
    fn get_as_dyn(&self, entity_id: ID) -> Option<Ref<'_, dyn Component + 'static>>;
}

impl<T: Component> AnyPool for Pool<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        // Strip the module path, `nexus_core::component::TransformComponent` becomes `TransformComponent`
        let full = std::any::type_name::<T>();
        full.rsplit("::").next().unwrap_or(full)
    }

    fn contains(&self, entity_id: ID) -> bool {
        Pool::contains(self, entity_id)
    }

    fn clear_entity(&mut self, entity_id: ID) {
        self.detach(entity_id);
    }

    fn get_as_dyn(&self, entity_id: ID) -> Option<Ref<'_, dyn Component + 'static>> {
        self.get(entity_id).map(|ref_| Ref::map(ref_, |comp| comp as &dyn Component))
    }
}

#[cfg(test)]
mod test {
    use crate::test::*;

    use super::*;

    #[test]
    fn attach_replaces() {
        let mut p: Pool<CompX> = Pool::new();

        assert_eq!(p.attach(0, CompX::new("A")), None);
        assert_eq!(p.attach(0, CompX::new("B")), Some(CompX::new("A")));

        assert_eq!(p.len(), 1);
        assert_eq!(p.get(0).as_deref(), Some(&CompX::new("B")));
    }

    #[test]
    fn get_mut() {
        let mut p: Pool<CompX> = Pool::new();

        p.attach(0, CompX::new("A"));
        *p.get_mut(0).unwrap() = CompX::new("Z");
        assert_eq!(p.get(0).as_deref(), Some(&CompX::new("Z")));
    }

    #[test]
    fn sparse_grows() {
        let mut p: Pool<CompX> = Pool::new();

        assert_eq!(p.sparse.len(), 0);
        p.attach(0, CompX::new("A"));
        assert_eq!(p.sparse.len(), 1);
        p.attach(99, CompX::new("B")); // Still in the first page
        assert_eq!(p.sparse.len(), 1);
        p.attach(100, CompX::new("C")); // Goes to the second page
        assert_eq!(p.sparse.len(), 2);
    }

    #[test]
    fn sparse_shrinks() {
        let mut p: Pool<CompX> = Pool::new();

        p.attach(0, CompX::new("A"));
        p.attach(PAGE_SIZE - 1, CompX::new("B"));
        p.attach(PAGE_SIZE, CompX::new("C"));

        assert_eq!(p.sparse.len(), 2);
        p.detach(0);
        assert_eq!(p.sparse.len(), 2);
        p.detach(PAGE_SIZE - 1);
        assert_eq!(p.sparse.len(), 2);
        p.detach(PAGE_SIZE);
        assert_eq!(p.sparse.len(), 0);
    }

    #[test]
    fn detach_returns_component() {
        let mut p: Pool<CompX> = Pool::new();

        p.attach(0, CompX::new("Z"));
        assert_eq!(p.detach(0), Some(CompX::new("Z")));
        assert_eq!(p.detach(0), None);
    }

    #[test]
    fn remove_not_adjacent_left() {
        let mut p: Pool<CompX> = Pool::new();

        p.attach(0, CompX::new("A"));
        p.attach(2, CompX::new("B"));

        p.detach(0);

        assert_eq!(
            p.sparse,
            vec![Some(Box::new({
                let mut arr = [None; PAGE_SIZE];
                arr[2] = Some(0); // Last element was swapped into the hole
                arr
            }))]
        );
        assert_eq!(p.packed, vec![2]);

        assert_eq!(p.get(0).as_deref(), None);
        assert_eq!(p.get(2).as_deref(), Some(&CompX::new("B")));
    }

    #[test]
    fn type_name_is_short() {
        let p: Pool<CompX> = Pool::new();
        assert_eq!(AnyPool::type_name(&p), "CompX");
    }

    #[test]
    fn rand_io() {
        use rand::distributions::{Distribution, Uniform};
        use rand::seq::SliceRandom;
        use rand::Rng;

        const N_TARGET_PAGES: usize = 10;

        let mut rng = rand::thread_rng();
        let dist = Uniform::from(0..PAGE_SIZE * N_TARGET_PAGES);

        // Give a random number of distinct entities a component named after their id. The bool tracks whether that
        // entity should still be present in the pool
        let mut entities: Vec<(ID, CompX, bool)> = Vec::new();
        for _ in 0..rng.gen_range(0..PAGE_SIZE) {
            let id: ID = loop {
                let new_id = dist.sample(&mut rng);
                if !entities.iter().any(|(id, _, _)| *id == new_id) {
                    break new_id;
                }
            };

            entities.push((id, CompX::new(&id.to_string()), true));
        }

        let mut p: Pool<CompX> = Pool::new();
        for (entity_id, component, _) in entities.iter().cloned() {
            p.attach(entity_id, component);
        }

        entities.shuffle(&mut rng);

        loop {
            for (entity_id, component, alive) in entities.iter() {
                if *alive {
                    assert_eq!(p.get(*entity_id).as_deref(), Some(component));
                } else {
                    assert_eq!(p.get(*entity_id).as_deref(), None);
                }
            }

            // Delete the first entity still alive
            if let Some((entity_id, _, alive)) = entities.iter_mut().find(|(_, _, alive)| *alive) {
                *alive = false;
                p.detach(*entity_id);
            } else {
                break;
            }
        }

        assert_eq!(p.sparse.len(), 0);
        assert_eq!(p.packed.len(), 0);
        assert_eq!(p.components.len(), 0);
    }
}
