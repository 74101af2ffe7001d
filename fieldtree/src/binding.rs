use core::fmt;
use core::ops::ControlFlow;
use std::sync::Arc;

use fieldtree_core::{Def, PtrMut, Shape, Shaped};

#[cfg(feature = "tracing")]
use crate::trace;
use crate::{AccessError, FieldDescriptor, FieldId, FieldMut, FieldRef, TypeDescriptor};

impl TypeDescriptor {
    /// Binds a descriptor to one instance of its type.
    ///
    /// `value` may also be a `Box` or `Option` around the record; an empty
    /// `Option` is filled with a default record first.
    pub fn try_bind<'mem, T: Shaped>(
        self: &Arc<Self>,
        value: &'mem mut T,
    ) -> Result<Binding<'mem>, AccessError> {
        let (record, _) = T::SHAPE.underlying();
        if !record.is_shape(self.shape()) {
            return Err(AccessError::TypeMismatch {
                expected: self.shape(),
                actual: record,
            });
        }
        let root = materialize(T::SHAPE, PtrMut::from_mut(value));
        Ok(Binding::new(Arc::clone(self), root))
    }

    /// Like [`TypeDescriptor::try_bind`], but panics on a type mismatch.
    #[track_caller]
    pub fn bind<'mem, T: Shaped>(self: &Arc<Self>, value: &'mem mut T) -> Binding<'mem> {
        match self.try_bind(value) {
            Ok(binding) => binding,
            Err(err) => panic!("{err}"),
        }
    }
}

/// Looks through every `Option`/`Box` layer of `shape` at `ptr`, filling
/// empty `Option` layers with their pointee's default value.
fn materialize<'mem>(mut shape: &'static Shape, mut ptr: PtrMut<'mem>) -> PtrMut<'mem> {
    while let Def::Pointer(pointer) = shape.def {
        #[cfg(feature = "tracing")]
        if unsafe { (pointer.vtable.deref)(ptr.as_const()) }.is_none() {
            trace!(layer = %shape, "materializing empty layer");
        }
        ptr = unsafe { (pointer.vtable.deref_or_init)(ptr) };
        shape = pointer.pointee();
    }
    ptr
}

/// A [`TypeDescriptor`] bound to one instance.
///
/// Field addresses are resolved on first access and cached, so repeated
/// access to the same field is a slot lookup. Resolving a field walks its
/// `Option`/`Box` layers and fills empty `Option`s with default values; that
/// write is visible on the instance.
///
/// The binding holds the instance exclusively for `'mem`. Views borrow the
/// binding, so at most one mutable view exists at a time.
pub struct Binding<'mem> {
    descriptor: Arc<TypeDescriptor>,
    slots: Slots<'mem>,
}

struct Slots<'mem> {
    root: PtrMut<'mem>,
    /// Resolved address of each field's underlying value, by field id.
    fields: Vec<Option<PtrMut<'mem>>>,
    /// Resolved address of each nested record instance; slot 0 is the root.
    nested: Vec<Option<PtrMut<'mem>>>,
}

impl<'mem> Slots<'mem> {
    fn resolve(&mut self, descriptor: &TypeDescriptor, id: FieldId) -> Option<PtrMut<'mem>> {
        if let Some(ptr) = *self.fields.get(id.index())? {
            return Some(ptr);
        }

        let field = descriptor.field(id)?;
        let base = match field.parent() {
            None => self.root,
            Some(parent) => self.record(descriptor, parent)?,
        };
        let ptr = materialize(field.declared_shape(), unsafe { base.field(field.offset()) });

        self.fields[id.index()] = Some(ptr);
        if let Some(nested) = field.nested_id() {
            self.nested[nested.index()] = Some(ptr);
        }
        Some(ptr)
    }

    /// Address of the record instance that `parent` holds.
    fn record(&mut self, descriptor: &TypeDescriptor, parent: FieldId) -> Option<PtrMut<'mem>> {
        let slot = descriptor.field(parent)?.nested_id()?.index();
        match self.nested[slot] {
            Some(ptr) => Some(ptr),
            None => self.resolve(descriptor, parent),
        }
    }

    /// Forgets every address below `field`: a mutable view of it can replace
    /// the `Option`/`Box` layers they were resolved through.
    fn invalidate_below(&mut self, descriptor: &TypeDescriptor, field: &FieldDescriptor) {
        for index in field.descendants() {
            self.fields[index] = None;
            if let Some(nested) = descriptor.fields()[index].nested_id() {
                self.nested[nested.index()] = None;
            }
        }
    }
}

impl<'mem> Binding<'mem> {
    fn new(descriptor: Arc<TypeDescriptor>, root: PtrMut<'mem>) -> Self {
        let mut nested = vec![None; descriptor.nested_count()];
        nested[0] = Some(root);
        let slots = Slots {
            root,
            fields: vec![None; descriptor.num_fields()],
            nested,
        };
        Self { descriptor, slots }
    }

    /// Resolves `id` without handing out a view. Pointers returned here must
    /// not be used after a mutable view of an ancestor.
    pub(crate) fn resolve(&mut self, id: FieldId) -> Option<PtrMut<'mem>> {
        self.slots.resolve(&self.descriptor, id)
    }

    /// The descriptor this binding was created from.
    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    /// Mutable view of field `id`, or `None` if there is no such field.
    ///
    /// Empty `Option` layers on the way are filled in.
    pub fn value(&mut self, id: impl Into<FieldId>) -> Option<FieldMut<'_>> {
        let id = id.into();
        let ptr = self.slots.resolve(&self.descriptor, id)?;
        let field = self.descriptor.field(id)?;
        self.slots.invalidate_below(&self.descriptor, field);
        Some(FieldMut::new(field, ptr))
    }

    /// Like [`Binding::value`], with the field's descriptor alongside.
    pub fn field(&mut self, id: impl Into<FieldId>) -> Option<(&FieldDescriptor, FieldMut<'_>)> {
        let value = self.value(id)?;
        Some((value.descriptor(), value))
    }

    /// Read-only view of field `id`.
    ///
    /// Resolution may still fill in empty `Option` layers.
    pub fn peek(&mut self, id: impl Into<FieldId>) -> Option<FieldRef<'_>> {
        let id = id.into();
        let ptr = self.slots.resolve(&self.descriptor, id)?;
        let field = self.descriptor.field(id)?;
        Some(FieldRef::new(field, ptr.as_const()))
    }

    /// Address of the underlying value of field `id`.
    ///
    /// Stable across calls as long as the field's layers are not replaced.
    pub fn address_of(&mut self, id: impl Into<FieldId>) -> Option<usize> {
        self.slots
            .resolve(&self.descriptor, id.into())
            .map(PtrMut::addr)
    }

    /// Visits every field in id order, stopping early on
    /// [`ControlFlow::Break`].
    pub fn for_each<F>(&mut self, mut f: F)
    where
        F: FnMut(&FieldDescriptor, FieldMut<'_>) -> ControlFlow<()>,
    {
        let descriptor = Arc::clone(&self.descriptor);
        for field in descriptor.fields() {
            let Some(value) = self.value(field.id()) else {
                continue;
            };
            if f(field, value).is_break() {
                break;
            }
        }
    }

    /// Read-only views of every field in group `key`, in id order.
    pub fn group_values(&mut self, key: &str) -> Vec<FieldRef<'_>> {
        let ids = self.descriptor.group(key);
        for id in ids {
            self.slots.resolve(&self.descriptor, *id);
        }
        ids.iter()
            .filter_map(|id| {
                let ptr = self.slots.fields[id.index()]?;
                let field = self.descriptor.field(*id)?;
                Some(FieldRef::new(field, ptr.as_const()))
            })
            .collect()
    }

    /// Visits every field in group `key` mutably, in id order.
    pub fn group_for_each<F>(&mut self, key: &str, mut f: F)
    where
        F: FnMut(&FieldDescriptor, FieldMut<'_>) -> ControlFlow<()>,
    {
        let descriptor = Arc::clone(&self.descriptor);
        for id in descriptor.group(key) {
            let Some(value) = self.value(*id) else {
                continue;
            };
            if f(value.descriptor(), value).is_break() {
                break;
            }
        }
    }
}

impl fmt::Debug for Binding<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let resolved = self.slots.fields.iter().filter(|slot| slot.is_some()).count();
        f.debug_struct("Binding")
            .field("shape", &self.descriptor.shape())
            .field("root", &self.slots.root)
            .field("resolved", &resolved)
            .finish_non_exhaustive()
    }
}
