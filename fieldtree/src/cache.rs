use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use fieldtree_core::{ConstTypeId, Shape, Shaped};

use crate::{AccessError, Binding, BuildOptions, TypeDescriptor, debug, trace};

/// Builds each type's [`TypeDescriptor`] once and hands out shared copies.
///
/// Lookups take a read lock. On a miss the descriptor is built with no lock
/// held and then stored under a write lock, so two threads missing on the
/// same type at once may both build it; the last store wins, and both
/// results are equivalent.
///
/// ```
/// use fieldtree::{DescriptorCache, record};
///
/// #[derive(Default)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
/// record!(Point { x, y });
///
/// let cache = DescriptorCache::new();
/// let mut point = Point::default();
/// let mut binding = cache.access(&mut point);
/// binding.value(1).unwrap().set(7_i32).unwrap();
/// assert_eq!(point.y, 7);
/// ```
pub struct DescriptorCache {
    options: BuildOptions,
    descriptors: RwLock<HashMap<ConstTypeId, Arc<TypeDescriptor>>>,
}

impl Default for DescriptorCache {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for DescriptorCache {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DescriptorCache")
            .field("options", &self.options)
            .field("len", &self.len())
            .finish()
    }
}

impl DescriptorCache {
    /// An empty cache building with [`BuildOptions::default`].
    pub fn new() -> Self {
        Self::with_options(BuildOptions::default())
    }

    /// An empty cache building every descriptor with `options`.
    pub fn with_options(options: BuildOptions) -> Self {
        Self {
            options,
            descriptors: RwLock::new(HashMap::new()),
        }
    }

    /// The options descriptors are built with.
    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// The descriptor for `T`, building it on first use.
    pub fn try_analyze<T: Shaped>(&self) -> Result<Arc<TypeDescriptor>, AccessError> {
        self.try_analyze_shape(T::SHAPE)
    }

    /// Like [`DescriptorCache::try_analyze`], but panics if `T` is not a
    /// record.
    #[track_caller]
    pub fn analyze<T: Shaped>(&self) -> Arc<TypeDescriptor> {
        match self.try_analyze::<T>() {
            Ok(descriptor) => descriptor,
            Err(err) => panic!("{err}"),
        }
    }

    /// The descriptor for `shape`, building it on first use.
    ///
    /// `Box`/`Option` layers around the record are stripped before the
    /// lookup, so `Box<T>` and `T` share one descriptor.
    pub fn try_analyze_shape(
        &self,
        shape: &'static Shape,
    ) -> Result<Arc<TypeDescriptor>, AccessError> {
        let (record, _) = shape.underlying();
        if let Some(descriptor) = self.get(record.id) {
            trace!(shape = %record, "descriptor cache hit");
            return Ok(descriptor);
        }

        let descriptor = Arc::new(TypeDescriptor::build(shape, &self.options)?);
        self.descriptors
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(record.id, Arc::clone(&descriptor));
        debug!(shape = %record, "stored descriptor");
        Ok(descriptor)
    }

    /// Binds `value` using the cached descriptor of its type.
    pub fn try_access<'mem, T: Shaped>(
        &self,
        value: &'mem mut T,
    ) -> Result<Binding<'mem>, AccessError> {
        self.try_analyze::<T>()?.try_bind(value)
    }

    /// Like [`DescriptorCache::try_access`], but panics if `T` is not a
    /// record.
    #[track_caller]
    pub fn access<'mem, T: Shaped>(&self, value: &'mem mut T) -> Binding<'mem> {
        match self.try_access(value) {
            Ok(binding) => binding,
            Err(err) => panic!("{err}"),
        }
    }

    /// Returns true if a descriptor for `T` has been built.
    pub fn contains<T: Shaped>(&self) -> bool {
        self.get(T::SHAPE.underlying().0.id).is_some()
    }

    /// Number of cached descriptors.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns true if nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Drops every cached descriptor. Outstanding `Arc`s stay valid.
    pub fn clear(&self) {
        self.descriptors
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn get(&self, id: ConstTypeId) -> Option<Arc<TypeDescriptor>> {
        self.read().get(&id).cloned()
    }

    fn read(
        &self,
    ) -> std::sync::RwLockReadGuard<'_, HashMap<ConstTypeId, Arc<TypeDescriptor>>> {
        self.descriptors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
