//! Typed access to resolved fields.
//!
//! A view pairs the address of a field's underlying value with the field's
//! descriptor. Turning it into `&T` or `&mut T` checks that `T` is exactly
//! the underlying type, so no view can be read as something it is not.

use core::fmt;

use fieldtree_core::{PtrConst, PtrMut, Shape, Shaped};

use crate::{AccessError, FieldDescriptor};

fn check<T: Shaped>(shape: &'static Shape) -> Result<(), AccessError> {
    if T::SHAPE.is_shape(shape) {
        Ok(())
    } else {
        Err(AccessError::WrongShape {
            expected: shape,
            actual: T::SHAPE,
        })
    }
}

/// Exclusive access to one field of a bound instance.
///
/// Obtained from [`Binding::value`](crate::Binding::value) and friends. Every
/// `Option`/`Box` layer of the field has already been looked through, so the
/// view always points at an initialized value of the underlying type.
pub struct FieldMut<'a> {
    descriptor: &'a FieldDescriptor,
    ptr: PtrMut<'a>,
}

impl<'a> FieldMut<'a> {
    /// `ptr` must point at an initialized value of the descriptor's
    /// underlying type, exclusively borrowed for `'a`.
    pub(crate) fn new(descriptor: &'a FieldDescriptor, ptr: PtrMut<'a>) -> Self {
        Self { descriptor, ptr }
    }

    /// The field this view points into.
    pub fn descriptor(&self) -> &'a FieldDescriptor {
        self.descriptor
    }

    /// Shape of the value behind the view: the field's underlying type.
    pub fn shape(&self) -> &'static Shape {
        self.descriptor.underlying_shape()
    }

    /// Address of the underlying value.
    pub fn address(&self) -> usize {
        self.ptr.addr()
    }

    /// Borrows the value as `&T`.
    pub fn get<T: Shaped>(&self) -> Result<&T, AccessError> {
        check::<T>(self.shape())?;
        Ok(unsafe { self.ptr.as_const().get::<T>() })
    }

    /// Borrows the value as `&mut T`.
    pub fn get_mut<T: Shaped>(&mut self) -> Result<&mut T, AccessError> {
        check::<T>(self.shape())?;
        Ok(unsafe { self.ptr.as_mut::<T>() })
    }

    /// Converts the view into `&'a mut T`.
    pub fn into_mut<T: Shaped>(self) -> Result<&'a mut T, AccessError> {
        check::<T>(self.shape())?;
        Ok(unsafe { self.ptr.as_mut::<T>() })
    }

    /// Overwrites the value, dropping the previous one.
    pub fn set<T: Shaped>(&mut self, value: T) -> Result<(), AccessError> {
        check::<T>(self.shape())?;
        drop(unsafe { self.ptr.replace(value) });
        Ok(())
    }

    /// Reborrows the view as read-only.
    pub fn as_ref(&self) -> FieldRef<'_> {
        FieldRef {
            descriptor: self.descriptor,
            ptr: self.ptr.as_const(),
        }
    }
}

impl fmt::Debug for FieldMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldMut")
            .field("field", &self.descriptor.selector())
            .field("shape", &self.shape())
            .field("ptr", &self.ptr)
            .finish()
    }
}

/// Shared access to one field of a bound instance.
#[derive(Clone, Copy)]
pub struct FieldRef<'a> {
    descriptor: &'a FieldDescriptor,
    ptr: PtrConst<'a>,
}

impl<'a> FieldRef<'a> {
    /// `ptr` must point at an initialized value of the descriptor's
    /// underlying type, not mutated for `'a`.
    pub(crate) fn new(descriptor: &'a FieldDescriptor, ptr: PtrConst<'a>) -> Self {
        Self { descriptor, ptr }
    }

    /// The field this view points into.
    pub fn descriptor(&self) -> &'a FieldDescriptor {
        self.descriptor
    }

    /// Shape of the value behind the view.
    pub fn shape(&self) -> &'static Shape {
        self.descriptor.underlying_shape()
    }

    /// Address of the underlying value.
    pub fn address(&self) -> usize {
        self.ptr.addr()
    }

    /// Borrows the value as `&'a T`.
    pub fn get<T: Shaped>(&self) -> Result<&'a T, AccessError> {
        check::<T>(self.shape())?;
        Ok(unsafe { self.ptr.get::<T>() })
    }
}

impl fmt::Debug for FieldRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRef")
            .field("field", &self.descriptor.selector())
            .field("shape", &self.shape())
            .field("ptr", &self.ptr)
            .finish()
    }
}
