use alloc::borrow::ToOwned;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use elf::abi::{ET_REL, SHN_ABS, SHT_NOBITS, STB_GLOBAL, STB_LOCAL, STB_WEAK};
use elf::endian::{AnyEndian, EndianParse};
use elf::parse::ParseError;
use elf::symbol::Symbol;
use elf::string_table::StringTable;
use elf::ElfBytes;
use fw_object::ident::{DEBUG_LEVEL_SYMBOL, Marker, MarkerKind};
use log::trace;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("malformed ELF file: {0:?}")]
    Malformed(ParseError),
    #[error("no symbol table")]
    NoSymbolTable,
}

impl From<ParseError> for ImageError {
    fn from(value: ParseError) -> Self {
        Self::Malformed(value)
    }
}

/// Marker symbols of one object file.
///
/// `defines` and `needs` hold object identifiers (`nic` for `obj_nic`),
/// sorted and without duplicates. An identifier the unit defines itself is
/// never listed as a need.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitSymbols {
    pub name: String,
    pub defines: Vec<String>,
    pub needs: Vec<String>,
    pub debug_level: Option<u64>,
}

impl UnitSymbols {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn define(mut self, id: &str) -> Self {
        insert_sorted(&mut self.defines, id);
        self.needs.retain(|need| need != id);
        self
    }

    #[must_use]
    pub fn need(mut self, id: &str) -> Self {
        if !self.defines.iter().any(|define| define == id) {
            insert_sorted(&mut self.needs, id);
        }
        self
    }
}

fn insert_sorted(list: &mut Vec<String>, id: &str) {
    if let Err(pos) = list.binary_search_by(|entry| entry.as_str().cmp(id)) {
        list.insert(pos, id.to_owned());
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SymbolKind {
    Object,
    Need,
    DebugLevel,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Binding {
    Local,
    Global,
    Weak,
    Other(u8),
}

impl From<u8> for Binding {
    fn from(value: u8) -> Self {
        match value {
            STB_LOCAL => Self::Local,
            STB_GLOBAL => Self::Global,
            STB_WEAK => Self::Weak,
            other => Self::Other(other),
        }
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("local"),
            Self::Global => f.write_str("global"),
            Self::Weak => f.write_str("weak"),
            Self::Other(value) => write!(f, "binding {value}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerSymbol {
    pub name: String,
    pub kind: SymbolKind,
    pub binding: Binding,
    pub defined: bool,
    pub absolute: bool,
    pub value: u64,
    /// For a need marker in a linked image, the value of the object marker
    /// it refers to, read from the word it labels.
    pub target: Option<u64>,
}

/// Every marker and `DEBUG_LEVEL` symbol of a file, in symbol table order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkerReport {
    symbols: Vec<MarkerSymbol>,
}

impl MarkerReport {
    pub fn iter(&self) -> impl Iterator<Item = &MarkerSymbol> {
        self.symbols.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Identifiers of the units whose `obj_` marker is defined.
    pub fn objects(&self) -> impl Iterator<Item = &str> {
        self.symbols
            .iter()
            .filter(|s| s.kind == SymbolKind::Object && s.defined)
            .filter_map(|s| Marker::parse(&s.name).map(|m| m.id()))
    }

    /// Values of all `DEBUG_LEVEL` symbols. A linked image has one per
    /// unit built with a nonzero level.
    pub fn debug_levels(&self) -> impl Iterator<Item = u64> + '_ {
        self.symbols
            .iter()
            .filter(|s| s.kind == SymbolKind::DebugLevel && s.defined)
            .map(|s| s.value)
    }
}

impl<'a> IntoIterator for &'a MarkerReport {
    type Item = &'a MarkerSymbol;
    type IntoIter = core::slice::Iter<'a, MarkerSymbol>;

    fn into_iter(self) -> Self::IntoIter {
        self.symbols.iter()
    }
}

fn for_each_symbol<'data>(
    bytes: &'data [u8],
    mut f: impl FnMut(&ElfBytes<'data, AnyEndian>, &'data str, &Symbol),
) -> Result<(), ImageError> {
    let file = ElfBytes::<AnyEndian>::minimal_parse(bytes)?;
    let (symtab, strtab): (_, StringTable<'data>) =
        file.symbol_table()?.ok_or(ImageError::NoSymbolTable)?;

    for symbol in symtab.iter() {
        if symbol.st_name == 0 {
            continue;
        }
        let name = strtab.get(symbol.st_name as usize)?;
        f(&file, name, &symbol);
    }
    Ok(())
}

/// Reads the 32-bit word a need marker labels. Relocatable objects still
/// carry the relocation instead of the value, so they yield `None`.
fn need_word(file: &ElfBytes<'_, AnyEndian>, symbol: &Symbol) -> Option<u64> {
    if file.ehdr.e_type == ET_REL || symbol.is_undefined() || symbol.st_shndx == SHN_ABS {
        return None;
    }
    let header = file.section_headers()?.get(symbol.st_shndx as usize).ok()?;
    if header.sh_type == SHT_NOBITS {
        return None;
    }
    let mut offset = usize::try_from(symbol.st_value.checked_sub(header.sh_addr)?).ok()?;
    let (data, _) = file.section_data(&header).ok()?;
    file.ehdr
        .endianness
        .parse_u32_at(&mut offset, data)
        .ok()
        .map(u64::from)
}

fn classify(name: &str) -> Option<SymbolKind> {
    if name == DEBUG_LEVEL_SYMBOL {
        return Some(SymbolKind::DebugLevel);
    }
    Marker::parse(name).map(|marker| match marker.kind() {
        MarkerKind::Object => SymbolKind::Object,
        MarkerKind::Need => SymbolKind::Need,
    })
}

/// Lists the marker symbols of an object file or linked image.
///
/// # Errors
/// Fails if `bytes` is not an ELF file with a symbol table.
pub fn markers(bytes: &[u8]) -> Result<MarkerReport, ImageError> {
    let mut report = MarkerReport::default();
    for_each_symbol(bytes, |file, name, symbol| {
        if let Some(kind) = classify(name) {
            let target = match kind {
                SymbolKind::Need => need_word(file, symbol),
                _ => None,
            };
            report.symbols.push(MarkerSymbol {
                name: name.to_owned(),
                kind,
                binding: Binding::from(symbol.st_bind()),
                defined: !symbol.is_undefined(),
                absolute: symbol.st_shndx == SHN_ABS,
                value: symbol.st_value,
                target,
            });
        }
    })?;
    Ok(report)
}

/// Scans one object file for the markers that drive archive extraction.
///
/// Defined `obj_` symbols become `defines`. Undefined `obj_` references and
/// `need_` labels become `needs`. The first defined `DEBUG_LEVEL` becomes
/// `debug_level`.
///
/// # Errors
/// Fails if `bytes` is not an ELF file with a symbol table.
pub fn scan_elf(name: &str, bytes: &[u8]) -> Result<UnitSymbols, ImageError> {
    let mut unit = UnitSymbols::new(name);
    let mut needs = Vec::new();

    for_each_symbol(bytes, |_, symbol_name, symbol| {
        match classify(symbol_name) {
            Some(SymbolKind::DebugLevel) if !symbol.is_undefined() => {
                unit.debug_level.get_or_insert(symbol.st_value);
            }
            Some(SymbolKind::Object) | Some(SymbolKind::Need) => {
                let Some(marker) = Marker::parse(symbol_name) else {
                    return;
                };
                trace!(
                    "{}: {} {}",
                    name,
                    if symbol.is_undefined() { "references" } else { "defines" },
                    symbol_name
                );
                if marker.kind() == MarkerKind::Object && !symbol.is_undefined() {
                    insert_sorted(&mut unit.defines, marker.id());
                } else {
                    needs.push(marker.id());
                }
            }
            _ => {}
        }
    })?;

    for id in needs {
        unit = unit.need(id);
    }
    Ok(unit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_keeps_lists_sorted_and_disjoint() {
        let unit = UnitSymbols::new("config.o")
            .need("nic")
            .define("config")
            .need("config")
            .need("bus")
            .need("nic");
        assert_eq!(unit.defines, ["config"]);
        assert_eq!(unit.needs, ["bus", "nic"]);

        let unit = unit.define("nic");
        assert_eq!(unit.defines, ["config", "nic"]);
        assert_eq!(unit.needs, ["bus"]);
    }

    #[test]
    fn classifies_symbol_names() {
        assert_eq!(classify("obj_nic"), Some(SymbolKind::Object));
        assert_eq!(classify("need_nic"), Some(SymbolKind::Need));
        assert_eq!(classify("DEBUG_LEVEL"), Some(SymbolKind::DebugLevel));
        assert_eq!(classify("objdump"), None);
        assert_eq!(classify("obj_"), None);
    }

    #[test]
    fn garbage_is_rejected() {
        let err = scan_elf("junk.o", b"not an elf file at all, not even close").unwrap_err();
        assert!(matches!(err, ImageError::Malformed(_)));
        assert!(markers(&[0x7f, b'E', b'L', b'F']).is_err());
    }

    #[test]
    fn binding_names() {
        assert_eq!(Binding::from(STB_GLOBAL), Binding::Global);
        assert_eq!(alloc::format!("{}", Binding::from(STB_LOCAL)), "local");
        assert_eq!(Binding::from(13), Binding::Other(13));
    }
}
