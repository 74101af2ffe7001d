//! Opaque pointers
//!
//! Type-erased, lifetime-carrying pointers into reflected values. Every
//! reinterpretation of an address as a concrete type goes through the
//! `unsafe` methods here; callers pair them with a [`Shape`](crate::Shape)
//! identity check.

use core::{fmt, marker::PhantomData, ptr::NonNull};

/// A type-erased, read-only pointer to an initialized value.
///
/// The lifetime `'mem` is the borrow of the underlying memory, which must stay
/// valid and initialized for as long as the pointer is used.
#[derive(Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct PtrConst<'mem> {
    ptr: NonNull<u8>,
    phantom: PhantomData<&'mem ()>,
}

impl fmt::Debug for PtrConst<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.ptr.as_ptr().fmt(f)
    }
}

impl<'mem> PtrConst<'mem> {
    /// Create a const pointer from a non-null pointer to a sized value.
    #[inline]
    pub const fn new<T>(ptr: NonNull<T>) -> Self {
        Self {
            ptr: ptr.cast(),
            phantom: PhantomData,
        }
    }

    /// Create a const pointer borrowing `value`.
    #[inline]
    pub const fn from_ref<T>(value: &'mem T) -> Self {
        Self::new(unsafe { NonNull::new_unchecked(value as *const T as *mut T) })
    }

    /// Returns the underlying data pointer as a pointer to `u8`.
    #[inline]
    pub const fn as_byte_ptr(self) -> *const u8 {
        self.ptr.as_ptr() as *const u8
    }

    /// Returns the address this pointer points at.
    #[inline]
    pub fn addr(self) -> usize {
        self.ptr.as_ptr() as usize
    }

    /// Returns a pointer with the given byte offset added.
    ///
    /// # Safety
    ///
    /// The offset must stay within the bounds of the same allocated object.
    #[inline]
    pub const unsafe fn field(self, offset: usize) -> PtrConst<'mem> {
        PtrConst {
            ptr: unsafe { self.ptr.byte_add(offset) },
            phantom: PhantomData,
        }
    }

    /// Borrows the pointed-to value as `&T`.
    ///
    /// # Safety
    ///
    /// `T` must be the actual type of the pointed-to memory, which must be
    /// initialized, aligned, and not mutated while the reference exists.
    #[inline]
    pub const unsafe fn get<T>(self) -> &'mem T {
        unsafe { self.ptr.cast::<T>().as_ref() }
    }
}

/// A type-erased, mutable pointer to an initialized value.
///
/// Like [`PtrConst`], but the borrow tracked by `'mem` is exclusive.
#[derive(Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct PtrMut<'mem> {
    ptr: NonNull<u8>,
    phantom: PhantomData<&'mem mut ()>,
}

impl fmt::Debug for PtrMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.ptr.as_ptr().fmt(f)
    }
}

impl<'mem> PtrMut<'mem> {
    /// Create a mutable pointer from a non-null pointer to a sized value.
    #[inline]
    pub const fn new<T>(ptr: NonNull<T>) -> Self {
        Self {
            ptr: ptr.cast(),
            phantom: PhantomData,
        }
    }

    /// Create a mutable pointer exclusively borrowing `value`.
    #[inline]
    pub fn from_mut<T>(value: &'mem mut T) -> Self {
        Self::new(NonNull::from(value))
    }

    /// Gets the underlying raw pointer
    #[inline]
    pub const fn as_byte_ptr(self) -> *const u8 {
        self.ptr.as_ptr() as *const u8
    }

    /// Gets the underlying raw pointer as mutable
    #[inline]
    pub const fn as_mut_byte_ptr(self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    /// Returns the address this pointer points at.
    #[inline]
    pub fn addr(self) -> usize {
        self.ptr.as_ptr() as usize
    }

    /// Make a const pointer out of this mutable pointer.
    #[inline]
    pub const fn as_const(self) -> PtrConst<'mem> {
        PtrConst {
            ptr: self.ptr,
            phantom: PhantomData,
        }
    }

    /// Returns a pointer with the given byte offset added.
    ///
    /// # Safety
    ///
    /// The offset must stay within the bounds of the same allocated object.
    #[inline]
    pub const unsafe fn field(self, offset: usize) -> PtrMut<'mem> {
        PtrMut {
            ptr: unsafe { self.ptr.byte_add(offset) },
            phantom: PhantomData,
        }
    }

    /// Borrows the pointed-to value as `&T`.
    ///
    /// # Safety
    ///
    /// `T` must be the actual type of the pointed-to memory. No mutable
    /// reference to the same memory may be alive while this one is.
    #[inline]
    pub const unsafe fn get<T>(self) -> &'mem T {
        unsafe { self.ptr.cast::<T>().as_ref() }
    }

    /// Borrows the pointed-to value as `&mut T`.
    ///
    /// # Safety
    ///
    /// `T` must be the actual type of the pointed-to memory. You must respect
    /// aliasing xor mutability: no other reference to the same memory may be
    /// alive while this one is.
    #[inline]
    pub const unsafe fn as_mut<T>(self) -> &'mem mut T {
        unsafe { self.ptr.cast::<T>().as_mut() }
    }

    /// Write `value` after dropping the existing one.
    ///
    /// # Safety
    ///
    /// Same requirements as [`PtrMut::as_mut`].
    #[inline]
    pub unsafe fn replace<T>(self, value: T) -> T {
        core::mem::replace(unsafe { self.as_mut::<T>() }, value)
    }
}
