//! Marker inspection and archive-extraction model for firmware images.
//!
//! [`scan_elf`] reads the marker symbols out of one object file (or a linked
//! image), [`markers`] lists them for display, and [`LinkSet`] replays the
//! linker's archive extraction over a set of scanned units: starting from
//! the root objects, every unresolved `obj_<id>` pulls the one archive
//! member that defines it, until nothing is left unresolved.

#![no_std]

extern crate alloc;

mod link;
mod scan;

pub use link::{LinkError, LinkSet, LinkedImage};
pub use scan::{
    markers, scan_elf, Binding, ImageError, MarkerReport, MarkerSymbol, SymbolKind, UnitSymbols,
};
