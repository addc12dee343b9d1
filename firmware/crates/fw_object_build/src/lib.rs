//! Build-script side of per-unit debug levels.
//!
//! Levels come from an `objects.toml` at the workspace root:
//!
//! ```toml
//! [objects]
//! nic = 2
//! config = 0
//! ```
//!
//! and from the `FW_DEBUG` override list, where a bare name means level 1:
//!
//! ```bash
//! FW_DEBUG=nic:2,config cargo build
//! ```
//!
//! A unit's `build.rs` calls [`configure`], which hands every level to rustc
//! as `FW_DEBUG_<id>`. `fw_object::object!` reads that variable when the unit
//! is compiled.

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::{env, fs};

use fw_object::debug::DebugLevel;
use fw_object::ident::{self, IdentError};
use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_FILE: &str = "objects.toml";
/// Explicit path to the configuration file, skipping the search.
pub const CONFIG_ENV: &str = "FW_OBJECT_CONFIG";
pub const OVERRIDE_ENV: &str = "FW_DEBUG";
pub const LEVEL_ENV_PREFIX: &str = "FW_DEBUG_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid object name `{name}`: {source}")]
    Name { name: String, source: IdentError },
    #[error("invalid debug level `{value}` for object `{name}`")]
    Level { name: String, value: String },
    #[error("failed to write build instructions: {0}")]
    Emit(#[source] io::Error),
    #[error("{0} is not set; configure() must run from a build script")]
    NotInBuildScript(&'static str),
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    objects: BTreeMap<String, u64>,
}

/// Debug levels of every configured unit.
///
/// Units that are not listed build at level 0.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    levels: BTreeMap<String, DebugLevel>,
    sources: Vec<PathBuf>,
}

impl BuildConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads and validates a configuration file.
    ///
    /// # Errors
    /// Fails if the file can't be read, isn't valid TOML, or names an
    /// object with an invalid identifier.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        let mut config = Self::parse(&text, path)?;
        config.sources.push(path.to_owned());
        Ok(config)
    }

    /// Parses configuration text that did not come from a file.
    ///
    /// # Errors
    /// See [`load`](Self::load).
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Self::parse(text, Path::new(CONFIG_FILE))
    }

    fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })?;

        let mut config = Self::new();
        for (name, level) in file.objects {
            let level = u32::try_from(level).unwrap_or(u32::MAX);
            config.set(&name, DebugLevel::new(level))?;
        }
        Ok(config)
    }

    /// Sets the level of one unit, replacing any earlier value.
    ///
    /// # Errors
    /// Fails if `name` can't be used as an object identifier.
    pub fn set(&mut self, name: &str, level: DebugLevel) -> Result<(), ConfigError> {
        ident::validate(name).map_err(|source| ConfigError::Name {
            name: name.to_owned(),
            source,
        })?;
        self.levels.insert(name.to_owned(), level);
        Ok(())
    }

    #[must_use]
    pub fn level(&self, name: &str) -> DebugLevel {
        self.levels.get(name).copied().unwrap_or(DebugLevel::OFF)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, DebugLevel)> {
        self.levels.iter().map(|(name, level)| (name.as_str(), *level))
    }

    /// Applies a `FW_DEBUG` style list on top of the configuration.
    ///
    /// Entries are separated by commas and have the form `name` or
    /// `name:level`. Later entries win.
    ///
    /// # Errors
    /// Fails on an invalid name or a level that is not a non-negative
    /// integer. Nothing is applied in that case. Levels beyond `u32::MAX`
    /// saturate.
    pub fn apply_overrides(&mut self, list: &str) -> Result<(), ConfigError> {
        let overrides = parse_overrides(list)?;
        for (name, level) in overrides {
            self.set(&name, level)?;
        }
        Ok(())
    }

    /// Writes the cargo instructions for a unit's build script.
    ///
    /// # Errors
    /// Propagates write errors from `out`.
    pub fn emit(&self, out: &mut impl Write) -> io::Result<()> {
        for (name, level) in self.iter() {
            writeln!(out, "cargo:rustc-env={LEVEL_ENV_PREFIX}{name}={level}")?;
        }
        writeln!(out, "cargo:rerun-if-env-changed={OVERRIDE_ENV}")?;
        writeln!(out, "cargo:rerun-if-env-changed={CONFIG_ENV}")?;
        for source in &self.sources {
            writeln!(out, "cargo:rerun-if-changed={}", source.display())?;
        }
        Ok(())
    }
}

/// Parses a `FW_DEBUG` style list into `(name, level)` pairs, in order.
///
/// # Errors
/// See [`BuildConfig::apply_overrides`].
pub fn parse_overrides(list: &str) -> Result<Vec<(String, DebugLevel)>, ConfigError> {
    list.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| -> Result<(String, DebugLevel), ConfigError> {
            let (name, level) = match entry.split_once(':') {
                Some((name, value)) => {
                    let name = name.trim();
                    let value = value.trim();
                    let level = DebugLevel::parse(value)
                        .filter(|_| !value.is_empty())
                        .ok_or_else(|| ConfigError::Level {
                            name: name.to_owned(),
                            value: value.to_owned(),
                        })?;
                    (name, level)
                }
                None => (entry, DebugLevel::new(1)),
            };
            ident::validate(name).map_err(|source| ConfigError::Name {
                name: name.to_owned(),
                source,
            })?;
            Ok((name.to_owned(), level))
        })
        .collect()
}

/// Finds the closest `objects.toml` in `start` or one of its ancestors.
#[must_use]
pub fn find_config(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILE))
        .find(|candidate| candidate.is_file())
}

/// Resolves the configuration for the crate being built and prints the cargo
/// instructions.
///
/// The file is `$FW_OBJECT_CONFIG` if set, otherwise the closest
/// `objects.toml` above `CARGO_MANIFEST_DIR`. Without either, all units start
/// at level 0. `$FW_DEBUG` is applied last.
///
/// # Errors
/// Any [`ConfigError`]. A build script should fail the build with it.
pub fn configure() -> Result<BuildConfig, ConfigError> {
    let path = match env::var_os(CONFIG_ENV) {
        Some(path) => Some(PathBuf::from(path)),
        None => {
            let manifest_dir = env::var_os("CARGO_MANIFEST_DIR")
                .ok_or(ConfigError::NotInBuildScript("CARGO_MANIFEST_DIR"))?;
            find_config(Path::new(&manifest_dir))
        }
    };

    let mut config = match path {
        Some(path) => BuildConfig::load(&path)?,
        None => BuildConfig::new(),
    };
    if let Ok(list) = env::var(OVERRIDE_ENV) {
        config.apply_overrides(&list)?;
    }

    config
        .emit(&mut io::stdout().lock())
        .map_err(ConfigError::Emit)?;
    Ok(config)
}
