use core::alloc::Layout;
use core::fmt;

use crate::{ConstTypeId, Field, PointerDef, PointerKind, RecordDef, ScalarKind};

/// Schema for reflection of a type.
///
/// Contains what the field tree needs: the type's identity, its layout, and a
/// [`Def`] describing how to look inside it.
#[derive(Clone, Copy)]
#[repr(C)]
pub struct Shape {
    /// Unique type identifier from the compiler.
    /// Use this for type equality checks and hash map keys.
    pub id: ConstTypeId,

    /// Returns the fully qualified type name, e.g. `alloc::string::String`.
    pub type_name: fn() -> &'static str,

    /// Size and alignment.
    pub layout: Layout,

    /// How values of this type are structured.
    pub def: Def,
}

/// How the values of a [`Shape`] are structured.
#[derive(Clone, Copy, Debug)]
#[repr(C)]
pub enum Def {
    /// A leaf value with a well-known representation.
    Scalar(ScalarKind),
    /// A struct with named fields.
    Record(RecordDef),
    /// One layer of indirection (`Option<T>`, `Box<T>`).
    Pointer(PointerDef),
    /// A leaf value we know nothing about beyond its identity and layout.
    Opaque,
}

/// Coarse classification of a [`Shape`], handy for filters and policies.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Kind {
    /// A scalar, see [`ScalarKind`].
    Scalar(ScalarKind),
    /// A struct with named fields.
    Record,
    /// An `Option<T>` layer.
    Option,
    /// A `Box<T>` layer.
    Box,
    /// Anything else.
    Opaque,
}

impl Kind {
    /// Returns true for signed and unsigned integers of any width.
    pub const fn is_integer(self) -> bool {
        matches!(self, Kind::Scalar(s) if s.is_integer())
    }

    /// Returns true for `f32` and `f64`.
    pub const fn is_float(self) -> bool {
        matches!(self, Kind::Scalar(s) if s.is_float())
    }

    /// Returns true for record types.
    pub const fn is_record(self) -> bool {
        matches!(self, Kind::Record)
    }
}

impl Shape {
    /// Returns the fully qualified type name.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        (self.type_name)()
    }

    /// Returns true if both shapes describe the same type.
    #[inline]
    pub fn is_shape(&self, other: &Shape) -> bool {
        self.id == other.id
    }

    /// Returns the coarse [`Kind`] of this shape.
    pub const fn kind(&self) -> Kind {
        match self.def {
            Def::Scalar(s) => Kind::Scalar(s),
            Def::Record(_) => Kind::Record,
            Def::Pointer(PointerDef {
                kind: PointerKind::Option,
                ..
            }) => Kind::Option,
            Def::Pointer(PointerDef {
                kind: PointerKind::Box,
                ..
            }) => Kind::Box,
            Def::Opaque => Kind::Opaque,
        }
    }

    /// Returns true if this shape is a struct with named fields.
    #[inline]
    pub const fn is_record(&self) -> bool {
        matches!(self.def, Def::Record(_))
    }

    /// Returns the declared fields, or an empty slice for non-records.
    #[inline]
    pub const fn fields(&self) -> &'static [Field] {
        match self.def {
            Def::Record(rd) => rd.fields,
            _ => &[],
        }
    }

    /// Strips every [`Def::Pointer`] layer.
    ///
    /// Returns the underlying shape and the number of layers that were
    /// stripped. `Option<Box<T>>` yields `(T, 2)`.
    pub fn underlying(&'static self) -> (&'static Shape, usize) {
        let mut shape = self;
        let mut layers = 0;
        while let Def::Pointer(pd) = shape.def {
            shape = pd.pointee();
            layers += 1;
        }
        (shape, layers)
    }
}

impl PartialEq for Shape {
    fn eq(&self, other: &Self) -> bool {
        self.is_shape(other)
    }
}

impl Eq for Shape {}

impl core::hash::Hash for Shape {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shape")
            .field("type_name", &self.type_name())
            .field("size", &self.layout.size())
            .field("kind", &self.kind())
            .finish_non_exhaustive()
    }
}
