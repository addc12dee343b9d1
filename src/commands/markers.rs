//! Marker listing.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use fw_image::{MarkerSymbol, SymbolKind};

/// Print every marker symbol of `path`.
pub fn show_markers(path: &Path) -> Result<()> {
    let data = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let report = fw_image::markers(&data)
        .with_context(|| format!("Failed to scan {}", path.display()))?;

    println!("{} {}\n", "Markers:".cyan().bold(), path.display());

    if report.is_empty() {
        println!("  (no marker symbols)");
        return Ok(());
    }

    for symbol in &report {
        println!("  {}", describe(symbol));
    }

    let objects = report.objects().count();
    let levels: Vec<String> = report.debug_levels().map(|l| l.to_string()).collect();
    println!();
    println!("  {} {}", "Objects:".green(), objects);
    if !levels.is_empty() {
        println!("  {} {}", "Debug levels:".green(), levels.join(", "));
    }

    Ok(())
}

fn describe(symbol: &MarkerSymbol) -> String {
    let kind = match symbol.kind {
        SymbolKind::Object => "object",
        SymbolKind::Need => "need",
        SymbolKind::DebugLevel => "debug",
    };

    if symbol.defined {
        let target = symbol
            .target
            .map(|t| format!(" -> {t:#x}"))
            .unwrap_or_default();
        format!(
            "{:<7} {:<24} {:<7} {}{}{}",
            kind,
            symbol.name,
            symbol.binding,
            symbol.value,
            if symbol.absolute { " (abs)" } else { "" },
            target
        )
    } else {
        format!(
            "{:<7} {:<24} {}",
            kind,
            symbol.name,
            "undefined".yellow()
        )
    }
}

#[cfg(test)]
mod tests {
    use fw_image::Binding;

    use super::*;

    fn symbol(name: &str, kind: SymbolKind) -> MarkerSymbol {
        MarkerSymbol {
            name: name.to_owned(),
            kind,
            binding: Binding::Global,
            defined: true,
            absolute: true,
            value: 0,
            target: None,
        }
    }

    #[test]
    fn describes_defined_marker() {
        let line = describe(&symbol("obj_nic", SymbolKind::Object));
        assert!(line.starts_with("object  obj_nic"), "{line}");
        assert!(line.contains("global"), "{line}");
        assert!(line.ends_with("0 (abs)"), "{line}");
    }

    #[test]
    fn describes_need_target() {
        let need = MarkerSymbol {
            binding: Binding::Local,
            absolute: false,
            value: 0x2000,
            target: Some(0),
            ..symbol("need_nic", SymbolKind::Need)
        };
        let line = describe(&need);
        assert!(line.starts_with("need    need_nic"), "{line}");
        assert!(line.ends_with("8192 -> 0x0"), "{line}");
    }

    #[test]
    fn describes_undefined_marker() {
        colored::control::set_override(false);
        let undefined = MarkerSymbol {
            defined: false,
            ..symbol("obj_nic", SymbolKind::Object)
        };
        assert!(describe(&undefined).ends_with("undefined"));
    }

    #[test]
    fn unreadable_file_fails() {
        let err = show_markers(Path::new("/nonexistent/image.elf")).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to read"), "{err:#}");
    }
}
