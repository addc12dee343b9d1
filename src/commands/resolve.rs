//! Archive resolution.

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;
use fw_image::{LinkSet, LinkedImage};

use super::scan_file;

/// Link `roots` against `archive` and print what got pulled in.
pub fn resolve(roots: &[PathBuf], archive: &[PathBuf]) -> Result<()> {
    let mut set = LinkSet::new();
    for path in roots {
        set.root(scan_file(path)?);
    }
    for path in archive {
        set.archive_member(scan_file(path)?);
    }

    let image = link(&set)?;

    println!("{}", "Linked:".cyan().bold());
    for member in image.members() {
        let pulled = image.pulled().any(|p| p == member);
        let level = image
            .debug_level(member)
            .map(|l| format!(" (debug level {l})"))
            .unwrap_or_default();
        println!(
            "  {} {}{}",
            if pulled { "+".green() } else { "*".cyan() },
            member,
            level
        );
    }

    println!("\n{}", "Objects:".cyan().bold());
    for id in image.objects() {
        println!(
            "  obj_{} {} {}",
            id,
            "<-".dimmed(),
            image.provider(id).unwrap_or("?")
        );
    }

    Ok(())
}

fn link(set: &LinkSet) -> Result<LinkedImage> {
    set.resolve().context("Link failed")
}

#[cfg(test)]
mod tests {
    use fw_image::UnitSymbols;

    use super::*;

    #[test]
    fn link_error_names_the_missing_object() {
        let mut set = LinkSet::new();
        set.root(UnitSymbols::new("config.o").define("config").need("nic"));

        let err = link(&set).map(|_| ()).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.starts_with("Link failed"), "{message}");
        assert!(
            message.contains("undefined reference to obj_nic in config.o"),
            "{message}"
        );
    }

    #[test]
    fn link_pulls_needed_member() {
        let mut set = LinkSet::new();
        set.root(UnitSymbols::new("config.o").define("config").need("nic"));
        set.archive_member(UnitSymbols::new("nic.o").define("nic"));

        let image = link(&set).expect("nic in archive");
        assert_eq!(image.provider("nic"), Some("nic.o"));
    }

    #[test]
    fn missing_input_is_reported_with_its_path() {
        let err = resolve(&[PathBuf::from("/nonexistent/config.o")], &[]).unwrap_err();
        assert!(
            format!("{err:#}").contains("Failed to read /nonexistent/config.o"),
            "{err:#}"
        );
    }
}
