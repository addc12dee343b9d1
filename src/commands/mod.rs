//! Subcommand implementations.

pub mod markers;
pub mod resolve;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use fw_image::UnitSymbols;
use log::debug;

/// Reads and scans one object file, naming it after its file name.
pub fn scan_file(path: &Path) -> Result<UnitSymbols> {
    let data = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
    let unit = fw_image::scan_elf(&name, &data)
        .with_context(|| format!("Failed to scan {}", path.display()))?;
    debug!(
        "{}: defines {:?}, needs {:?}",
        unit.name, unit.defines, unit.needs
    );
    Ok(unit)
}
