//! Storage shared by mutually exclusive units.
//!
//! Images that carry several drivers of which only one ever runs (two NICs
//! for different boards, say) don't need a receive ring per driver. The
//! drivers place their large buffers in one [`SharedRegion`] instead.
//!
//! # Single Owner
//!
//! At most one unit holds the region at a time. A claim records the owner;
//! a claim by anyone else fails with [`SharedError::Busy`] until the
//! [`SharedLease`] is dropped. Which unit is active is still the image
//! configuration's call; the region only refuses to hand out aliases.
//!
//! # Usage
//!
//! ```rust,ignore
//! fw_object::shared_region!(pub SHARED_BSS, 16 * 1024);
//!
//! struct Rings {
//!     rx: [[u8; 1536]; 8],
//! }
//!
//! let mut rings = SHARED_BSS.claim_uninit::<Rings>(ObjectId::new("nic"))?;
//! ```

use core::cell::UnsafeCell;
use core::marker::PhantomData;
use core::mem::{align_of, size_of, MaybeUninit};
use core::ops::{Deref, DerefMut};
use core::ptr::NonNull;

use spin::Mutex;
use thiserror::Error;

use crate::attr::ALIGNMENT;
use crate::ident::ObjectId;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Error)]
pub enum SharedError {
    #[error("shared region is held by {holder}, {requester} cannot claim it")]
    Busy {
        holder: ObjectId,
        requester: ObjectId,
    },
}

#[repr(C, align(16))]
struct Storage<const N: usize>([MaybeUninit<u8>; N]);

/// `N` bytes of uninitialized, 16-byte aligned storage with one owner at a
/// time.
pub struct SharedRegion<const N: usize> {
    /// Current holder, if any
    owner: Mutex<Option<ObjectId>>,
    /// Only touched through a lease, which exists only while `owner` is set
    storage: UnsafeCell<Storage<N>>,
}

// Safety: the storage is reachable only through a SharedLease, and the owner
// lock guarantees at most one lease exists.
unsafe impl<const N: usize> Sync for SharedRegion<N> {}

impl<const N: usize> SharedRegion<N> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            owner: Mutex::new(None),
            storage: UnsafeCell::new(Storage([MaybeUninit::uninit(); N])),
        }
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn owner(&self) -> Option<ObjectId> {
        *self.owner.lock()
    }

    pub fn is_free(&self) -> bool {
        self.owner().is_none()
    }

    /// Moves `value` into the region on behalf of `owner`.
    ///
    /// A `T` that does not fit in `N` bytes, or needs more than 16-byte
    /// alignment, fails to compile.
    ///
    /// # Errors
    /// Returns [`SharedError::Busy`] if the region is already held.
    pub fn claim<T>(&self, owner: ObjectId, value: T) -> Result<SharedLease<'_, T>, SharedError> {
        let slot = self.acquire::<T>(owner)?;
        // Safety: acquire checked size and alignment, and we are the only
        // holder.
        unsafe { slot.as_ptr().write(value) };
        Ok(SharedLease {
            owner_slot: &self.owner,
            owner,
            ptr: slot,
            _marker: PhantomData,
        })
    }

    /// Claims the region without initializing it, for buffers too large to
    /// build on the stack.
    ///
    /// # Errors
    /// Returns [`SharedError::Busy`] if the region is already held.
    pub fn claim_uninit<T>(
        &self,
        owner: ObjectId,
    ) -> Result<SharedLease<'_, MaybeUninit<T>>, SharedError> {
        let slot = self.acquire::<MaybeUninit<T>>(owner)?;
        Ok(SharedLease {
            owner_slot: &self.owner,
            owner,
            ptr: slot,
            _marker: PhantomData,
        })
    }

    fn acquire<T>(&self, owner: ObjectId) -> Result<NonNull<T>, SharedError> {
        const {
            assert!(size_of::<T>() <= N, "type does not fit in the shared region");
            assert!(
                align_of::<T>() <= ALIGNMENT,
                "type needs more alignment than the shared region provides"
            );
        }

        let mut holder = self.owner.lock();
        if let Some(holder) = *holder {
            return Err(SharedError::Busy {
                holder,
                requester: owner,
            });
        }
        *holder = Some(owner);

        // The pointer comes from an UnsafeCell in a live `&self`, so it is
        // never null.
        Ok(NonNull::from(unsafe { &mut *self.storage.get() }).cast::<T>())
    }
}

impl<const N: usize> Default for SharedRegion<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Exclusive access to a [`SharedRegion`] holding a `T`.
///
/// Dropping the lease drops the `T` and frees the region.
pub struct SharedLease<'a, T> {
    owner_slot: &'a Mutex<Option<ObjectId>>,
    owner: ObjectId,
    ptr: NonNull<T>,
    _marker: PhantomData<&'a mut T>,
}

// Safety: a lease behaves like `&'a mut T`.
unsafe impl<T: Send> Send for SharedLease<'_, T> {}
unsafe impl<T: Sync> Sync for SharedLease<'_, T> {}

impl<T> SharedLease<'_, T> {
    #[must_use]
    pub fn owner(&self) -> ObjectId {
        self.owner
    }
}

impl<T> Deref for SharedLease<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // Safety: the value was written when the lease was created and the
        // lease is the only handle to it.
        unsafe { self.ptr.as_ref() }
    }
}

impl<T> DerefMut for SharedLease<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // Safety: see Deref.
        unsafe { self.ptr.as_mut() }
    }
}

impl<T> Drop for SharedLease<'_, T> {
    fn drop(&mut self) {
        // Safety: the value is initialized and dropped exactly once, here.
        unsafe { self.ptr.as_ptr().drop_in_place() };
        *self.owner_slot.lock() = None;
    }
}

/// Declares a [`SharedRegion`] static.
#[macro_export]
macro_rules! shared_region {
    ($(#[$meta:meta])* $vis:vis $name:ident, $size:expr) => {
        $(#[$meta])*
        $vis static $name: $crate::shared::SharedRegion<{ $size }> =
            $crate::shared::SharedRegion::new();
    };
}
