use crate::{Shape, Tag};

/// Describes a struct with named fields.
#[derive(Clone, Copy, Debug)]
#[repr(C)]
pub struct RecordDef {
    /// Fields in declaration order.
    pub fields: &'static [Field],
}

/// Describes a named field of a record.
#[derive(Clone, Copy, Debug)]
#[repr(C)]
pub struct Field {
    /// Name of the field as declared.
    pub name: &'static str,

    /// Shape of the declared type.
    ///
    /// The layer of indirection allows for recursive type definitions.
    pub shape: fn() -> &'static Shape,

    /// Offset of the field in the struct (obtained through `core::mem::offset_of`).
    pub offset: usize,

    /// Raw metadata attached to the field, see [`Tag`].
    pub tag: Tag,
}

impl Field {
    /// Returns the shape of the declared type.
    #[inline]
    pub fn shape(&self) -> &'static Shape {
        (self.shape)()
    }
}

/// Returns the shape of `T`.
///
/// Exists so shape getters can be stored as plain `fn` pointers.
#[doc(hidden)]
#[inline]
pub fn shape_of<T: crate::Shaped>() -> &'static Shape {
    T::SHAPE
}

/// Returns the shape of the field projected by `_project`.
///
/// Used by [`record!`](crate::record) to name a field's type without
/// spelling it out.
#[doc(hidden)]
#[inline]
pub fn shape_of_field<R, T, F>(_project: F) -> &'static Shape
where
    T: crate::Shaped,
    F: for<'a> Fn(&'a R) -> &'a T,
{
    T::SHAPE
}
