/// Implements [`Shaped`](crate::Shaped) for a struct with named fields.
///
/// List the fields to expose, in declaration order. Each field may carry a
/// raw [`Tag`](crate::Tag) string after `=`. Every listed field's type must
/// itself implement `Shaped`.
///
/// ```
/// use fieldtree_core::{Shaped, record};
///
/// #[derive(Default)]
/// struct Inner {
///     b: i64,
/// }
///
/// #[derive(Default)]
/// struct Outer {
///     a: String,
///     inner: Option<Box<Inner>>,
/// }
///
/// record!(Inner { b = r#"mapper:"b""# });
/// record!(Outer { a, inner });
///
/// assert_eq!(Outer::SHAPE.fields().len(), 2);
/// assert_eq!(Inner::SHAPE.fields()[0].tag.get("mapper"), "b");
/// ```
///
/// Generic structs are not supported; wrap them in a concrete type.
#[macro_export]
macro_rules! record {
    ($ty:ident { $($field:ident $(= $tag:literal)?),* $(,)? }) => {
        unsafe impl $crate::Shaped for $ty {
            const SHAPE: &'static $crate::Shape = &$crate::Shape {
                id: $crate::ConstTypeId::of::<$ty>(),
                type_name: ::core::any::type_name::<$ty>,
                layout: ::core::alloc::Layout::new::<$ty>(),
                def: $crate::Def::Record($crate::RecordDef {
                    fields: &[$(
                        $crate::Field {
                            name: ::core::stringify!($field),
                            shape: {
                                fn shape() -> &'static $crate::Shape {
                                    $crate::shape_of_field(|record: &$ty| &record.$field)
                                }
                                shape
                            },
                            offset: ::core::mem::offset_of!($ty, $field),
                            tag: $crate::Tag::new($crate::record!(@tag $($tag)?)),
                        },
                    )*],
                }),
            };
        }
    };
    (@tag) => { "" };
    (@tag $tag:literal) => { $tag };
}

/// Implements [`Shaped`](crate::Shaped) for types that should be treated as
/// leaves: the field tree records them but never looks inside.
///
/// ```
/// use fieldtree_core::{Kind, Shaped, opaque};
///
/// struct Handle(u32);
/// opaque!(Handle);
///
/// assert_eq!(Handle::SHAPE.kind(), Kind::Opaque);
/// ```
#[macro_export]
macro_rules! opaque {
    ($($ty:ty),* $(,)?) => {
        $(
            unsafe impl $crate::Shaped for $ty {
                const SHAPE: &'static $crate::Shape = &$crate::Shape {
                    id: $crate::ConstTypeId::of::<$ty>(),
                    type_name: ::core::any::type_name::<$ty>,
                    layout: ::core::alloc::Layout::new::<$ty>(),
                    def: $crate::Def::Opaque,
                };
            }
        )*
    };
}
