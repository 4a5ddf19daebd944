//! Named, strongly typed per-element property tables.
//!
//! A [`PropertyRegistry`] owns any number of contiguous arrays, one per
//! registered name, each holding exactly one value per element. Arrays are
//! looked up by name once and then addressed through a typed
//! [`Property<T>`] key, so per-element access involves no type dispatch.
//!
//! # Example
//!
//! ```
//! use mesh_types::{PointId, PropertyRegistry};
//!
//! let mut props: PropertyRegistry<PointId> = PropertyRegistry::new();
//! props.push();
//! props.push();
//!
//! let weight = props.add("p:weight", 1.0_f64).unwrap();
//! props.set(weight, PointId::new(1), 0.25);
//!
//! assert_eq!(props.values(weight), &[1.0, 0.25]);
//! assert!(props.get::<f64>("p:weight").is_some());
//! assert!(props.get::<u32>("p:weight").is_none());
//! ```

use std::any::{Any, type_name};
use std::fmt;
use std::marker::PhantomData;

use crate::error::{PropertyError, PropertyResult};
use crate::handle::Handle;

/// Typed key of one array inside a [`PropertyRegistry`].
///
/// Keys are cheap to copy. A key stays valid until its property is removed;
/// using a key after removal, or with a different registry, panics.
pub struct Property<T> {
    slot: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Property<T> {
    const fn new(slot: usize) -> Self {
        Self {
            slot,
            _marker: PhantomData,
        }
    }
}

impl<T> Clone for Property<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Property<T> {}

impl<T> PartialEq for Property<T> {
    fn eq(&self, other: &Self) -> bool {
        self.slot == other.slot
    }
}

impl<T> Eq for Property<T> {}

impl<T> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("slot", &self.slot)
            .field("type", &type_name::<T>())
            .finish()
    }
}

/// Type-erased view of one property array.
trait ErasedArray: Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn push_default(&mut self);
    fn resize(&mut self, len: usize);
    fn clone_box(&self) -> Box<dyn ErasedArray>;
    fn type_name(&self) -> &'static str;
}

struct TypedArray<T> {
    values: Vec<T>,
    default: T,
}

impl<T: Clone + Send + Sync + 'static> ErasedArray for TypedArray<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn push_default(&mut self) {
        self.values.push(self.default.clone());
    }

    fn resize(&mut self, len: usize) {
        self.values.resize(len, self.default.clone());
    }

    fn clone_box(&self) -> Box<dyn ErasedArray> {
        Box::new(Self {
            values: self.values.clone(),
            default: self.default.clone(),
        })
    }

    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }
}

struct Slot {
    name: String,
    data: Box<dyn ErasedArray>,
}

impl Clone for Slot {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            data: self.data.clone_box(),
        }
    }
}

/// A set of named property arrays attached to one kind of element.
///
/// The registry tracks the element count itself: [`push`](Self::push) and
/// [`resize`](Self::resize) grow every array in lockstep, filling new
/// entries with the default given at registration.
pub struct PropertyRegistry<H> {
    slots: Vec<Option<Slot>>,
    len: usize,
    _marker: PhantomData<fn(H)>,
}

impl<H> Clone for PropertyRegistry<H> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            len: self.len,
            _marker: PhantomData,
        }
    }
}

impl<H> Default for PropertyRegistry<H> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            len: 0,
            _marker: PhantomData,
        }
    }
}

impl<H> fmt::Debug for PropertyRegistry<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries: Vec<(&str, &'static str)> = self
            .slots
            .iter()
            .flatten()
            .map(|slot| (slot.name.as_str(), slot.data.type_name()))
            .collect();
        f.debug_struct("PropertyRegistry")
            .field("len", &self.len)
            .field("properties", &entries)
            .finish()
    }
}

impl<H: Handle> PropertyRegistry<H> {
    /// Create an empty registry for zero elements.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding one property, sized to `values`.
    ///
    /// `default` fills the entries of elements pushed later.
    #[must_use]
    pub fn with_values<T>(name: &str, default: T, values: Vec<T>) -> (Self, Property<T>)
    where
        T: Clone + Send + Sync + 'static,
    {
        let len = values.len();
        let slot = Slot {
            name: name.to_string(),
            data: Box::new(TypedArray { values, default }),
        };
        let registry = Self {
            slots: vec![Some(slot)],
            len,
            _marker: PhantomData,
        };
        (registry, Property::new(0))
    }

    /// Number of elements every array holds.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// True if the registry covers no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of registered properties.
    #[must_use]
    pub fn property_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Names of all registered properties, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().flatten().map(|slot| slot.name.as_str())
    }

    /// True if a property with this name exists, whatever its type.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.find_slot(name).is_some()
    }

    /// Register a new property filled with `default`.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::DuplicateName`] if the name is taken.
    pub fn add<T>(&mut self, name: &str, default: T) -> PropertyResult<Property<T>>
    where
        T: Clone + Send + Sync + 'static,
    {
        if self.contains(name) {
            return Err(PropertyError::DuplicateName {
                name: name.to_string(),
            });
        }

        let data = TypedArray {
            values: vec![default.clone(); self.len],
            default,
        };
        self.slots.push(Some(Slot {
            name: name.to_string(),
            data: Box::new(data),
        }));
        Ok(Property::new(self.slots.len() - 1))
    }

    /// Look up a property by name.
    ///
    /// Returns `None` if no property has this name or if it stores a
    /// different value type.
    #[must_use]
    pub fn get<T: 'static>(&self, name: &str) -> Option<Property<T>> {
        let slot = self.find_slot(name)?;
        self.slots[slot]
            .as_ref()
            .filter(|s| s.data.as_any().is::<TypedArray<T>>())
            .map(|_| Property::new(slot))
    }

    /// Look up a property, registering it with `default` if absent.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::TypeMismatch`] if the name exists with a
    /// different value type.
    pub fn get_or_add<T>(&mut self, name: &str, default: T) -> PropertyResult<Property<T>>
    where
        T: Clone + Send + Sync + 'static,
    {
        match self.find_slot(name) {
            None => self.add(name, default),
            Some(_) => self.get(name).ok_or_else(|| PropertyError::TypeMismatch {
                name: name.to_string(),
                requested: type_name::<T>(),
            }),
        }
    }

    /// Remove a property by name. Returns `true` if one was removed.
    ///
    /// Keys of other properties stay valid.
    pub fn remove(&mut self, name: &str) -> bool {
        match self.find_slot(name) {
            Some(slot) => {
                self.slots[slot] = None;
                true
            }
            None => false,
        }
    }

    /// Append one element, extending every array with its default.
    pub fn push(&mut self) {
        for slot in self.slots.iter_mut().flatten() {
            slot.data.push_default();
        }
        self.len += 1;
    }

    /// Resize every array to `len` elements.
    pub fn resize(&mut self, len: usize) {
        for slot in self.slots.iter_mut().flatten() {
            slot.data.resize(len);
        }
        self.len = len;
    }

    /// All values of a property, indexed by handle.
    ///
    /// # Panics
    ///
    /// Panics if the key was removed or belongs to another registry.
    #[must_use]
    pub fn values<T: 'static>(&self, prop: Property<T>) -> &[T] {
        match self
            .slots
            .get(prop.slot)
            .and_then(Option::as_ref)
            .and_then(|s| s.data.as_any().downcast_ref::<TypedArray<T>>())
        {
            Some(array) => &array.values,
            None => panic!("stale property key for {}", type_name::<T>()),
        }
    }

    /// Mutable values of a property, indexed by handle.
    ///
    /// # Panics
    ///
    /// Panics if the key was removed or belongs to another registry.
    #[must_use]
    pub fn values_mut<T: 'static>(&mut self, prop: Property<T>) -> &mut [T] {
        match self
            .slots
            .get_mut(prop.slot)
            .and_then(Option::as_mut)
            .and_then(|s| s.data.as_any_mut().downcast_mut::<TypedArray<T>>())
        {
            Some(array) => &mut array.values,
            None => panic!("stale property key for {}", type_name::<T>()),
        }
    }

    /// Value of a property for one element.
    ///
    /// # Panics
    ///
    /// Panics on a stale key or an out-of-range handle.
    #[must_use]
    pub fn value<T: 'static>(&self, prop: Property<T>, handle: H) -> &T {
        &self.values(prop)[handle.idx()]
    }

    /// Set the value of a property for one element.
    ///
    /// # Panics
    ///
    /// Panics on a stale key or an out-of-range handle.
    pub fn set<T: 'static>(&mut self, prop: Property<T>, handle: H, value: T) {
        self.values_mut(prop)[handle.idx()] = value;
    }

    fn find_slot(&self, name: &str) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.as_ref().is_some_and(|s| s.name == name))
    }
}
