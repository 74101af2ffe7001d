//! String-keyed lookup over the fields of a type.
//!
//! A [`KeyMapper`] derives a key for each field with a user function, once
//! per type, and then resolves that fixed set of keys against any number of
//! instances.

use core::fmt;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use fieldtree_core::{ConstTypeId, PtrConst, Shaped};

use crate::{
    AccessError, Binding, DescriptorCache, FieldDescriptor, FieldId, FieldMut, FieldRef,
    TypeDescriptor, debug, trace,
};

/// Derives the key of a field, or `None` to leave it out of the map.
pub type KeyFn = Arc<dyn Fn(&FieldDescriptor) -> Option<String> + Send + Sync>;

/// The key map of one type: which field each key names.
#[derive(Debug)]
pub struct KeyedType {
    descriptor: Arc<TypeDescriptor>,
    keys: HashMap<String, FieldId>,
}

impl KeyedType {
    /// Maps every field of `descriptor` that `key_fn` gives a key to.
    ///
    /// When two fields derive the same key, the one later in id order wins.
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    pub fn new(
        descriptor: Arc<TypeDescriptor>,
        key_fn: impl Fn(&FieldDescriptor) -> Option<String>,
    ) -> Self {
        let mut keys = HashMap::new();
        for field in descriptor.fields() {
            if let Some(key) = key_fn(field) {
                if let Some(previous) = keys.insert(key, field.id()) {
                    trace!(field = field.selector(), %previous, "key overrides earlier field");
                }
            }
        }
        Self { descriptor, keys }
    }

    /// The descriptor the keys point into.
    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    /// Every key, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.keys().map(String::as_str)
    }

    /// The field a key names.
    pub fn field_id(&self, key: &str) -> Option<FieldId> {
        self.keys.get(key).copied()
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if no field was given a key.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Binds the key map to one instance.
    pub fn try_bind<'k, 'mem, T: Shaped>(
        &'k self,
        value: &'mem mut T,
    ) -> Result<KeyedBinding<'k, 'mem>, AccessError> {
        Ok(KeyedBinding {
            keyed: self,
            binding: self.descriptor.try_bind(value)?,
        })
    }

    /// Like [`KeyedType::try_bind`], but panics on a type mismatch.
    #[track_caller]
    pub fn bind<'k, 'mem, T: Shaped>(&'k self, value: &'mem mut T) -> KeyedBinding<'k, 'mem> {
        match self.try_bind(value) {
            Ok(binding) => binding,
            Err(err) => panic!("{err}"),
        }
    }

    /// Resolves every keyed field of `value` at once.
    pub fn try_make<'mem, T: Shaped>(
        self: &Arc<Self>,
        value: &'mem mut T,
    ) -> Result<KeyedValues<'mem>, AccessError> {
        let mut binding = self.descriptor.try_bind(value)?;
        let mut values = HashMap::with_capacity(self.keys.len());
        for (key, id) in &self.keys {
            if let Some(ptr) = binding.resolve(*id) {
                values.insert(key.clone(), (*id, ptr.as_const()));
            }
        }
        Ok(KeyedValues {
            keyed: Arc::clone(self),
            values,
        })
    }

    /// Like [`KeyedType::try_make`], but panics on a type mismatch.
    #[track_caller]
    pub fn make<'mem, T: Shaped>(self: &Arc<Self>, value: &'mem mut T) -> KeyedValues<'mem> {
        match self.try_make(value) {
            Ok(values) => values,
            Err(err) => panic!("{err}"),
        }
    }
}

/// A [`KeyedType`] bound to one instance; fields are resolved on demand.
pub struct KeyedBinding<'k, 'mem> {
    keyed: &'k KeyedType,
    binding: Binding<'mem>,
}

impl<'mem> KeyedBinding<'_, 'mem> {
    /// Mutable view of the field named `key`.
    pub fn get(&mut self, key: &str) -> Option<FieldMut<'_>> {
        self.binding.value(self.keyed.field_id(key)?)
    }

    /// Read-only view of the field named `key`.
    pub fn peek(&mut self, key: &str) -> Option<FieldRef<'_>> {
        self.binding.peek(self.keyed.field_id(key)?)
    }

    /// The underlying id-based binding.
    pub fn binding(&mut self) -> &mut Binding<'mem> {
        &mut self.binding
    }
}

impl fmt::Debug for KeyedBinding<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedBinding")
            .field("keys", &self.keyed.len())
            .field("binding", &self.binding)
            .finish()
    }
}

/// Every keyed field of one instance, resolved up front.
///
/// The views are read-only. To write through a key, bind the instance with
/// [`KeyedType::bind`] and use [`KeyedBinding::get`]:
///
/// ```
/// use fieldtree::{KeyMapper, record};
///
/// #[derive(Default)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
/// record!(Point { x, y });
///
/// let mapper = KeyMapper::new(|field| Some(field.name().to_uppercase()));
/// let mut point = Point::default();
/// mapper.keyed_type::<Point>().bind(&mut point).get("Y").unwrap().set(3_i32).unwrap();
/// assert_eq!(mapper.make(&mut point).get("Y").unwrap().get::<i32>(), Ok(&3));
/// ```
pub struct KeyedValues<'mem> {
    keyed: Arc<KeyedType>,
    values: HashMap<String, (FieldId, PtrConst<'mem>)>,
}

impl KeyedValues<'_> {
    /// Read-only view of the field named `key`.
    pub fn get(&self, key: &str) -> Option<FieldRef<'_>> {
        let (id, ptr) = *self.values.get(key)?;
        let field = self.keyed.descriptor.field(id)?;
        Some(FieldRef::new(field, ptr))
    }

    /// Every key with its view, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, FieldRef<'_>)> {
        self.values.iter().filter_map(|(key, (id, ptr))| {
            let field = self.keyed.descriptor.field(*id)?;
            Some((key.as_str(), FieldRef::new(field, *ptr)))
        })
    }

    /// Number of resolved keys.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no key was resolved.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for KeyedValues<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|(key, value)| (key, value.descriptor().selector())))
            .finish()
    }
}

/// Builds and caches a [`KeyedType`] per type, using one key function.
///
/// Like [`DescriptorCache`], lookups take a read lock and a miss builds with
/// no lock held, the last store winning.
pub struct KeyMapper {
    cache: Arc<DescriptorCache>,
    key_fn: KeyFn,
    types: RwLock<HashMap<ConstTypeId, Arc<KeyedType>>>,
}

impl KeyMapper {
    /// A mapper with its own descriptor cache.
    pub fn new<F>(key_fn: F) -> Self
    where
        F: Fn(&FieldDescriptor) -> Option<String> + Send + Sync + 'static,
    {
        Self::with_cache(Arc::new(DescriptorCache::new()), key_fn)
    }

    /// A mapper sharing `cache` for descriptors.
    pub fn with_cache<F>(cache: Arc<DescriptorCache>, key_fn: F) -> Self
    where
        F: Fn(&FieldDescriptor) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            cache,
            key_fn: Arc::new(key_fn),
            types: RwLock::new(HashMap::new()),
        }
    }

    /// The descriptor cache in use.
    pub fn cache(&self) -> &Arc<DescriptorCache> {
        &self.cache
    }

    /// The key map for `T`, building it on first use.
    pub fn try_keyed_type<T: Shaped>(&self) -> Result<Arc<KeyedType>, AccessError> {
        let (record, _) = T::SHAPE.underlying();
        let cached = self
            .types
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&record.id)
            .cloned();
        if let Some(keyed) = cached {
            return Ok(keyed);
        }

        let descriptor = self.cache.try_analyze::<T>()?;
        let keyed = Arc::new(KeyedType::new(descriptor, &*self.key_fn));
        debug!(shape = %record, keys = keyed.len(), "built key map");
        self.types
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(record.id, Arc::clone(&keyed));
        Ok(keyed)
    }

    /// Like [`KeyMapper::try_keyed_type`], but panics if `T` is not a record.
    #[track_caller]
    pub fn keyed_type<T: Shaped>(&self) -> Arc<KeyedType> {
        match self.try_keyed_type::<T>() {
            Ok(keyed) => keyed,
            Err(err) => panic!("{err}"),
        }
    }

    /// Resolves every keyed field of `value`.
    ///
    /// The result only reads; use [`KeyMapper::keyed_type`] and
    /// [`KeyedType::bind`] to write fields by key.
    pub fn try_make<'mem, T: Shaped>(
        &self,
        value: &'mem mut T,
    ) -> Result<KeyedValues<'mem>, AccessError> {
        self.try_keyed_type::<T>()?.try_make(value)
    }

    /// Like [`KeyMapper::try_make`], but panics if `T` is not a record.
    #[track_caller]
    pub fn make<'mem, T: Shaped>(&self, value: &'mem mut T) -> KeyedValues<'mem> {
        match self.try_make(value) {
            Ok(values) => values,
            Err(err) => panic!("{err}"),
        }
    }
}

impl fmt::Debug for KeyMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let types = self.types.read().unwrap_or_else(PoisonError::into_inner).len();
        f.debug_struct("KeyMapper")
            .field("cache", &self.cache)
            .field("types", &types)
            .finish_non_exhaustive()
    }
}
