//! Link-Time Object Composition for Firmware Images
//!
//! A firmware image is assembled from many small units (drivers, protocols,
//! configuration blocks). Each unit is a crate that declares its identity with
//! [`object!`], and the linker decides which units end up in the image by
//! following the marker symbols the units define and reference.
//!
//! # Markers
//!
//! | Symbol | Defined by | Meaning |
//! |--------|------------|---------|
//! | `obj_<id>` | unit `<id>` | the unit is present, value 0 |
//! | `need_<id>` | units requiring `<id>` | local, labels a word holding `obj_<id>`, forces it in |
//! | `DEBUG_LEVEL` | units with a nonzero level | local, value is the level |
//!
//! # Debug Levels
//!
//! Every unit has its own level, chosen at build time:
//!
//! ```bash
//! FW_DEBUG=nic:2,config cargo build
//! ```
//!
//! Level 0 erases all instrumentation, level 1 enables [`dbg1!`] and
//! [`dbg_assert!`], level 2 adds [`dbg2!`].
//!
//! # Quick Start
//!
//! ```ignore
//! fw_object::object!(nic);
//! fw_object::require!(config from config);
//!
//! pub fn attach(bar: u32) {
//!     fw_object::dbg_assert!(bar != 0);
//!     fw_object::dbg1!("attaching at {:#x}", bar);
//! }
//! ```
//!
//! # Modules
//!
//! - [`ident`] - identifier validation and marker names
//! - [`object`] - unit registration and dependencies
//! - [`debug`] - debug levels and tiers
//! - [`instrument`] - conditional prints and assertions
//! - [`attr`] - storage attribute wrappers
//! - [`shared`] - storage shared by mutually exclusive units

#![no_std]

pub mod attr;
pub mod debug;
pub mod ident;
pub mod instrument;
pub mod object;
pub mod shared;

pub use debug::{DebugLevel, Tier};
pub use ident::{Marker, MarkerKind, ObjectId};
pub use object::{find, objects, ObjectDescriptor, OBJECTS};
pub use shared::{SharedError, SharedLease, SharedRegion};

#[doc(hidden)]
pub mod __private {
    pub use linkme;
    pub use log;
    pub use paste;
}
