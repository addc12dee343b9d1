//! Named wrappers over storage attributes.
//!
//! ```rust,ignore
//! fw_object::packed! {
//!     pub struct DescriptorHeader {
//!         pub kind: u8,
//!         pub len: u32,
//!     }
//! }
//!
//! fw_object::keep! {
//!     static SIGNATURE: [u8; 4] = *b"FWOB";
//! }
//! ```

/// Alignment applied by [`aligned!`](crate::aligned).
pub const ALIGNMENT: usize = 16;

/// Lays out a struct in declaration order without padding.
#[macro_export]
macro_rules! packed {
    ($(#[$meta:meta])* $vis:vis struct $($rest:tt)*) => {
        #[repr(C, packed)]
        $(#[$meta])*
        $vis struct $($rest)*
    };
}

/// Aligns a struct to [`ALIGNMENT`](crate::attr::ALIGNMENT) bytes.
#[macro_export]
macro_rules! aligned {
    ($(#[$meta:meta])* $vis:vis struct $($rest:tt)*) => {
        #[repr(C, align(16))]
        $(#[$meta])*
        $vis struct $($rest)*
    };
}

/// Keeps a static in the object file even if nothing refers to it.
///
/// Only statics can be kept this way; a function that must survive has to be
/// referenced from one.
#[macro_export]
macro_rules! keep {
    ($(#[$meta:meta])* $vis:vis static $name:ident : $ty:ty = $init:expr;) => {
        #[used]
        $(#[$meta])*
        $vis static $name: $ty = $init;
    };
}

/// Silences unused-item diagnostics for a file-scope item.
///
/// The item may still be discarded; use [`keep!`](crate::keep) when it must
/// stay in the image.
#[macro_export]
macro_rules! unused {
    ($item:item) => {
        #[allow(dead_code)]
        $item
    };
}

#[cfg(test)]
mod tests {
    use core::mem::{align_of, size_of};

    use super::ALIGNMENT;

    crate::packed! {
        #[derive(Clone, Copy)]
        struct Header {
            kind: u8,
            len: u32,
        }
    }

    crate::aligned! {
        struct RxRing {
            slots: [u8; 3],
        }
    }

    crate::keep! {
        static SIGNATURE: [u8; 4] = *b"FWOB";
    }

    crate::unused! {
        const SPARE_SLOTS: usize = 4;
    }

    #[test]
    fn packed_struct_has_no_padding() {
        assert_eq!(size_of::<Header>(), 5);
        assert_eq!(align_of::<Header>(), 1);

        let header = Header { kind: 1, len: 64 };
        let len = header.len;
        assert_eq!((header.kind, len), (1, 64));
    }

    #[test]
    fn aligned_struct_uses_fixed_alignment() {
        assert_eq!(align_of::<RxRing>(), ALIGNMENT);
        assert_eq!(size_of::<RxRing>(), ALIGNMENT);
        let ring = RxRing { slots: [0; 3] };
        assert_eq!(ring.slots.len(), 3);
    }

    #[test]
    fn kept_static_is_readable() {
        assert_eq!(&SIGNATURE, b"FWOB");
    }
}
