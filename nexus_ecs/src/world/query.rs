use std::cell::{Ref, RefMut};
use std::marker::PhantomData;

use crate::world::World;
use crate::{Component, Entity, ID};

/// Read-only iteration over every entity carrying all the components in the tuple.
///
/// ```ignore
/// for (entity, (transform, mesh)) in <(TransformComponent, MeshComponent)>::query(&world) { ... }
/// ```
pub trait Query<'a> {
    type Out: Iterator;

    fn query(w: &'a World) -> Self::Out;
}

/// Like [`Query`] but yields mutable guards.
///
/// Takes the world by `&mut` so that no other guard can be alive while the iteration runs.
pub trait QueryMut<'a> {
    type Out: Iterator;

    fn query_mut(w: &'a mut World) -> Self::Out;
}

pub struct View1<'a, T: Component> {
    w: &'a World,
    entities_ids: std::vec::IntoIter<ID>,
    _marker: PhantomData<&'a T>,
}

pub struct View1Mut<'a, T: Component> {
    w: &'a World,
    entities_ids: std::vec::IntoIter<ID>,
    _marker: PhantomData<&'a mut T>,
}

pub struct View2<'a, T: Component, U: Component> {
    w: &'a World,
    entities_ids: std::vec::IntoIter<ID>,
    _marker: PhantomData<(&'a T, &'a U)>,
}

pub struct View2Mut<'a, T: Component, U: Component> {
    w: &'a World,
    entities_ids: std::vec::IntoIter<ID>,
    _marker: PhantomData<(&'a mut T, &'a mut U)>,
}

/// Ids found in the smallest pool among the given component types, or no ids at all if one of the pools doesn't
/// exist yet. Every candidate still has to be checked against the other pools.
macro_rules! candidate_ids {
    ($w:expr, $($t:ty),+) => {{
        let mut smallest: Option<Vec<ID>> = None;
        'candidates: {
            $(
                let ids = match $w.pool::<$t>() {
                    Some(pool) => pool.entities_ids(),
                    None => {
                        smallest = Some(Vec::new());
                        break 'candidates;
                    }
                };
                if smallest.as_ref().map_or(true, |s| ids.len() < s.len()) {
                    smallest = Some(ids);
                }
            )+
        }
        smallest.unwrap_or_default().into_iter()
    }}
}

impl<'a, T: Component> Query<'a> for (T,) {
    type Out = View1<'a, T>;

    fn query(w: &'a World) -> Self::Out {
        View1 { w, entities_ids: candidate_ids!(w, T), _marker: PhantomData }
    }
}

impl<'a, T: Component> QueryMut<'a> for (T,) {
    type Out = View1Mut<'a, T>;

    fn query_mut(w: &'a mut World) -> Self::Out {
        let w: &'a World = w;
        View1Mut { w, entities_ids: candidate_ids!(w, T), _marker: PhantomData }
    }
}

impl<'a, T: Component, U: Component> Query<'a> for (T, U) {
    type Out = View2<'a, T, U>;

    fn query(w: &'a World) -> Self::Out {
        View2 { w, entities_ids: candidate_ids!(w, T, U), _marker: PhantomData }
    }
}

impl<'a, T: Component, U: Component> QueryMut<'a> for (T, U) {
    type Out = View2Mut<'a, T, U>;

    fn query_mut(w: &'a mut World) -> Self::Out {
        let w: &'a World = w;
        View2Mut { w, entities_ids: candidate_ids!(w, T, U), _marker: PhantomData }
    }
}

impl<'a, T: Component> Iterator for View1<'a, T> {
    type Item = (Entity, (Ref<'a, T>,));

    fn next(&mut self) -> Option<Self::Item> {
        let entity_id = self.entities_ids.next()?;
        let t = self.w.pool::<T>()?.get(entity_id)?;
        let entity = self.w.entity_from_id(entity_id)?;

        Some((entity, (t,)))
    }
}

impl<'a, T: Component> Iterator for View1Mut<'a, T> {
    type Item = (Entity, (RefMut<'a, T>,));

    fn next(&mut self) -> Option<Self::Item> {
        let entity_id = self.entities_ids.next()?;
        let t = self.w.pool::<T>()?.get_mut(entity_id)?;
        let entity = self.w.entity_from_id(entity_id)?;

        Some((entity, (t,)))
    }
}

impl<'a, T: Component, U: Component> Iterator for View2<'a, T, U> {
    type Item = (Entity, (Ref<'a, T>, Ref<'a, U>));

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entity_id = self.entities_ids.next()?;

            let pool_t = self.w.pool::<T>()?;
            let pool_u = self.w.pool::<U>()?;

            let t = if let Some(t) = pool_t.get(entity_id) { t } else { continue; };
            let u = if let Some(u) = pool_u.get(entity_id) { u } else { continue; };

            let entity = self.w.entity_from_id(entity_id)?;

            break Some((entity, (t, u)));
        }
    }
}

impl<'a, T: Component, U: Component> Iterator for View2Mut<'a, T, U> {
    type Item = (Entity, (RefMut<'a, T>, RefMut<'a, U>));

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entity_id = self.entities_ids.next()?;

            let pool_t = self.w.pool::<T>()?;
            let pool_u = self.w.pool::<U>()?;

            let t = if let Some(t) = pool_t.get_mut(entity_id) { t } else { continue; };
            let u = if let Some(u) = pool_u.get_mut(entity_id) { u } else { continue; };

            let entity = self.w.entity_from_id(entity_id)?;

            break Some((entity, (t, u)));
        }
    }
}
