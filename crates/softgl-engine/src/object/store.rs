use std::marker::PhantomData;
use std::num::NonZeroU32;

use crate::error::{GlError, Result};

use super::ObjectId;

/// Slot storage for one object category.
///
/// Handles are never reused: a deleted slot stays empty so a stale handle
/// reports `UnknownObject` instead of aliasing a newer object.
#[derive(Debug)]
pub struct Store<I: ObjectId, T> {
    slots: Vec<Option<T>>,
    _id: PhantomData<I>,
}

impl<I: ObjectId, T> Default for Store<I, T> {
    fn default() -> Self {
        Self { slots: Vec::new(), _id: PhantomData }
    }
}

impl<I: ObjectId, T> Store<I, T> {
    pub fn insert(&mut self, value: T) -> I {
        let raw = NonZeroU32::MIN.saturating_add(self.slots.len() as u32);
        self.slots.push(Some(value));
        I::from_raw(raw)
    }

    #[inline]
    fn index(id: I) -> usize {
        (id.get() - 1) as usize
    }

    fn unknown(id: I) -> GlError {
        GlError::UnknownObject { kind: I::KIND, id: id.get() }
    }

    pub fn contains(&self, id: I) -> bool {
        matches!(self.slots.get(Self::index(id)), Some(Some(_)))
    }

    pub fn get(&self, id: I) -> Result<&T> {
        self.slots
            .get(Self::index(id))
            .and_then(Option::as_ref)
            .ok_or_else(|| Self::unknown(id))
    }

    pub fn get_mut(&mut self, id: I) -> Result<&mut T> {
        self.slots
            .get_mut(Self::index(id))
            .and_then(Option::as_mut)
            .ok_or_else(|| Self::unknown(id))
    }

    pub fn remove(&mut self, id: I) -> Result<T> {
        self.slots
            .get_mut(Self::index(id))
            .and_then(Option::take)
            .ok_or_else(|| Self::unknown(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            let raw = NonZeroU32::MIN.saturating_add(i as u32);
            slot.as_ref().map(|v| (I::from_raw(raw), v))
        })
    }
}
