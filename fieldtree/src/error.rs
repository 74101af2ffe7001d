use fieldtree_core::Shape;

/// Errors reported at the boundary of the field tree: when analyzing a type,
/// binding an instance, or viewing a field as a concrete type.
///
/// Resolving a field never fails: an unknown field id is simply `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum AccessError {
    /// The type presented for analysis or binding is not a struct with named
    /// fields, nor a `Box`/`Option` wrapping one.
    NotARecord {
        /// The shape that was presented.
        shape: &'static Shape,
    },

    /// A descriptor built for one type was used to bind an instance of another.
    TypeMismatch {
        /// The record type the descriptor describes.
        expected: &'static Shape,
        /// The record type of the instance.
        actual: &'static Shape,
    },

    /// A field view was read or written as the wrong type, for instance
    /// `.get::<u64>()` on a `String` field.
    WrongShape {
        /// The shape of the field.
        expected: &'static Shape,
        /// The shape that was asked for.
        actual: &'static Shape,
    },
}

impl core::fmt::Display for AccessError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AccessError::NotARecord { shape } => {
                write!(f, "type is not a struct (or a pointer to one): {shape}")
            }
            AccessError::TypeMismatch { expected, actual } => {
                write!(f, "type mismatch: descriptor is for {expected}, instance is {actual}")
            }
            AccessError::WrongShape { expected, actual } => {
                write!(f, "wrong shape: field is {expected}, but {actual} was requested")
            }
        }
    }
}

impl core::error::Error for AccessError {}
