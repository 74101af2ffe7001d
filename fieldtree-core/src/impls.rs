//! [`Shaped`] implementations for `core` and `alloc` types.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::alloc::Layout;
use core::ptr::NonNull;

use crate::{
    ConstTypeId, Def, PointerDef, PointerKind, PointerVTable, PtrConst, PtrMut, ScalarKind, Shape,
    Shaped, shape_of,
};

macro_rules! impl_scalar {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            unsafe impl Shaped for $ty {
                const SHAPE: &'static Shape = &Shape {
                    id: ConstTypeId::of::<$ty>(),
                    type_name: core::any::type_name::<$ty>,
                    layout: Layout::new::<$ty>(),
                    def: Def::Scalar(ScalarKind::$kind),
                };
            }
        )*
    };
}

impl_scalar! {
    () => Unit,
    bool => Bool,
    char => Char,
    &'static str => Str,
    String => String,
    f32 => F32,
    f64 => F64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    u128 => U128,
    usize => USize,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    i128 => I128,
    isize => ISize,
}

unsafe fn option_deref<'mem, T: 'static>(layer: PtrConst<'mem>) -> Option<PtrConst<'mem>> {
    let option = unsafe { layer.get::<Option<T>>() };
    option.as_ref().map(PtrConst::from_ref)
}

unsafe fn option_deref_or_init<'mem, T: Default + 'static>(layer: PtrMut<'mem>) -> PtrMut<'mem> {
    let option = unsafe { layer.as_mut::<Option<T>>() };
    PtrMut::new(NonNull::from(option.get_or_insert_with(T::default)))
}

unsafe impl<T: Shaped + Default> Shaped for Option<T> {
    const SHAPE: &'static Shape = &const {
        Shape {
            id: ConstTypeId::of::<Self>(),
            type_name: core::any::type_name::<Self>,
            layout: Layout::new::<Self>(),
            def: Def::Pointer(PointerDef {
                kind: PointerKind::Option,
                pointee: shape_of::<T>,
                vtable: &const {
                    PointerVTable {
                        deref: option_deref::<T>,
                        deref_or_init: option_deref_or_init::<T>,
                    }
                },
            }),
        }
    };
}

unsafe fn box_deref<'mem, T: 'static>(layer: PtrConst<'mem>) -> Option<PtrConst<'mem>> {
    let boxed = unsafe { layer.get::<Box<T>>() };
    Some(PtrConst::from_ref(&**boxed))
}

unsafe fn box_deref_mut<'mem, T: 'static>(layer: PtrMut<'mem>) -> PtrMut<'mem> {
    let boxed = unsafe { layer.as_mut::<Box<T>>() };
    PtrMut::new(NonNull::from(&mut **boxed))
}

unsafe impl<T: Shaped> Shaped for Box<T> {
    const SHAPE: &'static Shape = &const {
        Shape {
            id: ConstTypeId::of::<Self>(),
            type_name: core::any::type_name::<Self>,
            layout: Layout::new::<Self>(),
            def: Def::Pointer(PointerDef {
                kind: PointerKind::Box,
                pointee: shape_of::<T>,
                vtable: &const {
                    PointerVTable {
                        deref: box_deref::<T>,
                        deref_or_init: box_deref_mut::<T>,
                    }
                },
            }),
        }
    };
}

// Sequences are leaves: the tree never looks at their elements.
unsafe impl<T: 'static> Shaped for Vec<T> {
    const SHAPE: &'static Shape = &const {
        Shape {
            id: ConstTypeId::of::<Self>(),
            type_name: core::any::type_name::<Self>,
            layout: Layout::new::<Self>(),
            def: Def::Opaque,
        }
    };
}
