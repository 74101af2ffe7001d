use crate::{PtrConst, PtrMut, Shape};

/// Which kind of indirection a [`PointerDef`] describes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[repr(C)]
pub enum PointerKind {
    /// `Option<T>`: may be empty.
    Option,
    /// `Box<T>`: always points at a value.
    Box,
}

/// Describes one layer of indirection: a vtable to look through it and the
/// shape of what it points to.
#[derive(Clone, Copy, Debug)]
#[repr(C)]
pub struct PointerDef {
    /// What kind of layer this is.
    pub kind: PointerKind,

    /// Shape of the pointee.
    pub pointee: fn() -> &'static Shape,

    /// vtable for interacting with the layer
    pub vtable: &'static PointerVTable,
}

impl PointerDef {
    /// Returns the shape of the pointee.
    #[inline]
    pub fn pointee(&self) -> &'static Shape {
        (self.pointee)()
    }
}

/// Look through a layer without modifying it.
///
/// Returns `None` if the layer is empty.
///
/// # Safety
///
/// `layer` must point to an initialized value of the layer's type.
pub type DerefFn = for<'mem> unsafe fn(layer: PtrConst<'mem>) -> Option<PtrConst<'mem>>;

/// Look through a layer, filling it with the pointee's default value first if
/// it is empty.
///
/// # Safety
///
/// `layer` must point to an initialized value of the layer's type, and no
/// other reference to it may be alive.
pub type DerefOrInitFn = for<'mem> unsafe fn(layer: PtrMut<'mem>) -> PtrMut<'mem>;

/// Virtual table for a [`PointerDef`].
#[derive(Clone, Copy, Debug)]
#[repr(C)]
pub struct PointerVTable {
    /// cf. [`DerefFn`]
    pub deref: DerefFn,
    /// cf. [`DerefOrInitFn`]
    pub deref_or_init: DerefOrInitFn,
}
