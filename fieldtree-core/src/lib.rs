#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
#![warn(clippy::std_instead_of_alloc)]
#![doc = include_str!("../README.md")]

extern crate alloc;

mod macros;

// Opaque pointer utilities
mod ptr;
pub use ptr::*;

// Const type Id
mod typeid;
pub use typeid::*;

// Scalar type identification
mod scalar;
pub use scalar::*;

mod shape;
pub use shape::*;

mod field;
pub use field::*;

mod pointer;
pub use pointer::*;

mod tag;
pub use tag::*;

// Definition for `core::` and `alloc::` types
mod impls;

/// Allows querying the [`Shape`] of a type, which in turn lets the field tree
/// look at its fields, strip its indirection layers, and check identities.
///
/// Implement it with [`record!`] for structs and [`opaque!`] for leaves.
///
/// # Safety
///
/// The shape must describe the type exactly: offsets, field shapes and
/// pointer vtables are trusted by every access path built on top of it.
pub unsafe trait Shaped: 'static {
    /// The shape of this type
    const SHAPE: &'static Shape;
}
