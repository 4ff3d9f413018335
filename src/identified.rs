//! Ordered collections addressed by element identity.
//!
//! [`ForEach`](crate::reducer::ForEach) routes child actions to collection
//! elements by id rather than by position, so an action for a row that was
//! moved is still delivered to the right row, and an action for a row that
//! was removed is dropped. [`IdentifiedVec`] is the collection that makes
//! this cheap: insertion-ordered like a `Vec`, keyed like a map.
//!
//! # Example
//!
//! ```rust
//! use reflux::{Identifiable, IdentifiedVec};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Row {
//!     id: u32,
//!     label: &'static str,
//! }
//!
//! impl Identifiable for Row {
//!     type Id = u32;
//!     fn id(&self) -> u32 {
//!         self.id
//!     }
//! }
//!
//! let mut rows: IdentifiedVec<Row> = [
//!     Row { id: 1, label: "a" },
//!     Row { id: 2, label: "b" },
//! ]
//! .into_iter()
//! .collect();
//!
//! rows.get_mut(&2).unwrap().label = "B";
//! rows.move_item(1, 0);
//! assert_eq!(rows.ids().collect::<Vec<_>>(), vec![&2, &1]);
//! ```

use std::fmt;
use std::hash::Hash;
use std::ops::Index;

use indexmap::IndexMap;

/// A value with a stable identity.
pub trait Identifiable {
    /// The identity type.
    type Id: Hash + Eq + Clone + fmt::Debug + Send + Sync + 'static;

    /// This value's identity.
    fn id(&self) -> Self::Id;
}

/// An insertion-ordered collection of [`Identifiable`] values, unique by id.
///
/// Equality is order-sensitive: two collections are equal when they hold
/// equal elements in the same order.
#[derive(Clone)]
pub struct IdentifiedVec<T: Identifiable> {
    items: IndexMap<T::Id, T>,
}

impl<T: Identifiable> IdentifiedVec<T> {
    /// An empty collection.
    pub fn new() -> Self {
        Self {
            items: IndexMap::new(),
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append an element, or replace the element with the same id in place.
    ///
    /// Returns the replaced element, if any.
    pub fn push(&mut self, item: T) -> Option<T> {
        self.items.insert(item.id(), item)
    }

    /// Insert an element at `index`, shifting later elements back.
    ///
    /// An existing element with the same id is removed first. `index` is
    /// clamped to the collection length.
    pub fn insert(&mut self, index: usize, item: T) -> Option<T> {
        let id = item.id();
        let previous = self.items.shift_remove(&id);
        let index = index.min(self.items.len());
        self.items.shift_insert(index, id, item);
        previous
    }

    /// Borrow the element with `id`.
    pub fn get(&self, id: &T::Id) -> Option<&T> {
        self.items.get(id)
    }

    /// Mutably borrow the element with `id`.
    pub fn get_mut(&mut self, id: &T::Id) -> Option<&mut T> {
        self.items.get_mut(id)
    }

    /// Borrow the element at `index`.
    pub fn get_index(&self, index: usize) -> Option<&T> {
        self.items.get_index(index).map(|(_, item)| item)
    }

    /// Position of the element with `id`.
    pub fn index_of(&self, id: &T::Id) -> Option<usize> {
        self.items.get_index_of(id)
    }

    /// Whether an element with `id` is present.
    pub fn contains(&self, id: &T::Id) -> bool {
        self.items.contains_key(id)
    }

    /// Remove the element with `id`, preserving the order of the rest.
    pub fn remove(&mut self, id: &T::Id) -> Option<T> {
        self.items.shift_remove(id)
    }

    /// Remove the element at `index`, preserving the order of the rest.
    pub fn remove_at(&mut self, index: usize) -> Option<T> {
        self.items.shift_remove_index(index).map(|(_, item)| item)
    }

    /// Move the element at `from` to position `to`.
    ///
    /// Out-of-range positions leave the collection unchanged.
    pub fn move_item(&mut self, from: usize, to: usize) {
        if from < self.items.len() && to < self.items.len() {
            self.items.move_index(from, to);
        }
    }

    /// Keep only the elements matching `keep`.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&T) -> bool,
    {
        self.items.retain(|_, item| keep(item));
    }

    /// Stable sort by `compare`.
    pub fn sort_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&T, &T) -> std::cmp::Ordering,
    {
        self.items.sort_by(|_, a, _, b| compare(a, b));
    }

    /// Iterate in order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.values()
    }

    /// Iterate mutably in order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.items.values_mut()
    }

    /// Iterate over ids in order.
    pub fn ids(&self) -> impl Iterator<Item = &T::Id> {
        self.items.keys()
    }
}

impl<T: Identifiable> Default for IdentifiedVec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Identifiable + PartialEq> PartialEq for IdentifiedVec<T> {
    fn eq(&self, other: &Self) -> bool {
        self.items.len() == other.items.len() && self.iter().eq(other.iter())
    }
}

impl<T: Identifiable + Eq> Eq for IdentifiedVec<T> {}

impl<T: Identifiable + fmt::Debug> fmt::Debug for IdentifiedVec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: Identifiable> Index<usize> for IdentifiedVec<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.items[index]
    }
}

impl<T: Identifiable> FromIterator<T> for IdentifiedVec<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut collection = Self::new();
        collection.extend(iter);
        collection
    }
}

impl<T: Identifiable> Extend<T> for IdentifiedVec<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.push(item);
        }
    }
}

impl<T: Identifiable> IntoIterator for IdentifiedVec<T> {
    type Item = T;
    type IntoIter = indexmap::map::IntoValues<T::Id, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_values()
    }
}

impl<T: Identifiable> From<Vec<T>> for IdentifiedVec<T> {
    fn from(items: Vec<T>) -> Self {
        items.into_iter().collect()
    }
}

#[cfg(feature = "serde")]
impl<T> serde::Serialize for IdentifiedVec<T>
where
    T: Identifiable + serde::Serialize,
{
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

#[cfg(feature = "serde")]
impl<'de, T> serde::Deserialize<'de> for IdentifiedVec<T>
where
    T: Identifiable + serde::Deserialize<'de>,
{
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<T>::deserialize(deserializer).map(Self::from)
    }
}

#[cfg(feature = "proptest")]
use proptest::prelude::*;

#[cfg(feature = "proptest")]
impl<T> Arbitrary for IdentifiedVec<T>
where
    T: Identifiable + Arbitrary + 'static,
{
    type Parameters = T::Parameters;
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(args: Self::Parameters) -> Self::Strategy {
        proptest::collection::vec(any_with::<T>(args), 0..16)
            .prop_map(IdentifiedVec::from)
            .boxed()
    }
}
