//! Layered loading: system, user, working directory, then runtime overrides.
//!
//! Each layer is shape-checked on its own, overlaid onto the layers below it,
//! and only the merged result is decoded and range-checked.

mod layer_io;
mod merge;
mod schema;


use crate::{ArchivistConfig, ConfigError};
use log::{debug, info};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_FILE: &str = "archivist.json5";
/// Directory under the home directory holding the user layer.
const DEFAULT_CONFIG_DIR: &str = ".archivist";
/// System-wide layer, only consulted on Unix.
const SYSTEM_CONFIG_PATH: &str = "/etc/archivist/archivist.json5";

/// Merged config and the layers that contributed to it, lowest first.
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub config: ArchivistConfig,
    pub layers: Vec<ConfigLayer>,
}

/// Position of a layer in the stack. Later variants override earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLayerSource {
    System,
    User,
    /// `archivist.json5` in the working directory.
    Cwd,
    /// Explicit paths handed to the loader; these must exist.
    Runtime,
}

impl ConfigLayerSource {
    /// Label used in log lines and schema errors, e.g. `cwd(./archivist.json5)`.
    pub fn label(self, path: &Path) -> String {
        let name = match self {
            Self::System => "system",
            Self::User => "user",
            Self::Cwd => "cwd",
            Self::Runtime => "runtime",
        };
        format!("{name}({})", path.display())
    }
}

/// A layer file that was read and merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLayer {
    pub source: ConfigLayerSource,
    pub path: PathBuf,
}

/// Where to look for each layer. `None` skips the system or user layer.
#[derive(Debug, Clone)]
pub struct LayeredConfigOptions {
    pub cwd: PathBuf,
    pub system_config_path: Option<PathBuf>,
    pub user_config_path: Option<PathBuf>,
    pub runtime_paths: Vec<PathBuf>,
}

impl LayeredConfigOptions {
    /// Default system and user locations, with the cwd layer under `cwd`.
    pub fn new(cwd: impl AsRef<Path>) -> Self {
        Self {
            cwd: cwd.as_ref().to_path_buf(),
            system_config_path: layer_io::default_system_path(),
            user_config_path: layer_io::default_user_path(),
            runtime_paths: Vec::new(),
        }
    }

    pub fn with_runtime_path(mut self, path: impl AsRef<Path>) -> Self {
        self.runtime_paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Every layer to try, lowest precedence first, with its required flag.
    fn candidates(&self, cwd: &Path) -> Vec<(ConfigLayerSource, PathBuf, bool)> {
        let optional = [
            (ConfigLayerSource::System, self.system_config_path.clone()),
            (ConfigLayerSource::User, self.user_config_path.clone()),
            (ConfigLayerSource::Cwd, Some(cwd.join(DEFAULT_CONFIG_FILE))),
        ];
        optional
            .into_iter()
            .filter_map(|(source, path)| path.map(|path| (source, path, false)))
            .chain(
                self.runtime_paths
                    .iter()
                    .map(|path| (ConfigLayerSource::Runtime, path.clone(), true)),
            )
            .collect()
    }
}

impl ArchivistConfig {
    /// Parse, check and validate one JSON5 file without layering.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!("loading config (path={})", path.display());
        let contents = fs::read_to_string(path).map_err(|err| ConfigError::read(path, err))?;
        Self::load_from_str(&contents)
    }

    /// Parse, check and validate JSON5 text without layering.
    pub fn load_from_str(contents: &str) -> Result<Self, ConfigError> {
        let value: Value =
            json5::from_str(contents).map_err(|err| ConfigError::syntax("config", err))?;
        decode(value, "config")
    }

    /// Layered load with the default system and user locations.
    pub fn load_layered(cwd: impl AsRef<Path>) -> Result<LayeredConfig, ConfigError> {
        Self::load_layered_with_options(LayeredConfigOptions::new(cwd))
    }

    /// Missing system, user or cwd files are skipped; a missing runtime path
    /// is an error. A file reached through two sources is read once.
    pub fn load_layered_with_options(
        options: LayeredConfigOptions,
    ) -> Result<LayeredConfig, ConfigError> {
        let cwd = layer_io::resolve_cwd(&options.cwd)?;
        let mut seen = HashSet::new();
        let mut merged = Value::Object(Map::new());
        let mut layers = Vec::new();

        for (source, path, required) in options.candidates(&cwd) {
            if !seen.insert(layer_io::dedup_key(&path)) {
                debug!("skipping duplicate layer (layer={})", source.label(&path));
                continue;
            }
            if let Some(layer) = layer_io::read_layer(source, &path, required)? {
                merge::merge_json_values(&mut merged, &layer.value);
                layers.push(layer.meta);
            }
        }

        let config = decode(merged, "effective")?;
        info!(
            "layered config loaded (cwd={}, layers={})",
            cwd.display(),
            layers.len()
        );
        Ok(LayeredConfig { config, layers })
    }

    /// Range checks on the merged config.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let limits = [
            ("windows.summary", self.windows.summary),
            ("windows.catchup", self.windows.catchup),
            ("windows.observe", self.windows.observe),
            ("windows.silence", self.windows.silence),
            ("windows.extraction", self.windows.extraction),
            ("render.quote_max_chars", self.render.quote_max_chars),
            ("render.question_max_chars", self.render.question_max_chars),
            ("render.extract_max_chars", self.render.extract_max_chars),
            ("render.extract_max_items", self.render.extract_max_items),
            ("redaction.max_chars", self.redaction.max_chars),
        ];
        if let Some(&(field, _)) = limits.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::ZeroLimit { field });
        }
        for (field, value) in [
            ("archive.path", &self.archive.path),
            ("state.path", &self.state.path),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::EmptyPath { field });
            }
        }
        Ok(())
    }
}

struct LoadedLayer {
    meta: ConfigLayer,
    value: Value,
}

fn decode(value: Value, label: &str) -> Result<ArchivistConfig, ConfigError> {
    schema::validate_layer_schema(&value, label)?;
    let config: ArchivistConfig = serde_json::from_value(value)?;
    config.validate()?;
    Ok(config)
}
