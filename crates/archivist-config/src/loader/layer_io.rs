//! Reading config layers from disk.

use super::{
    ConfigLayer, ConfigLayerSource, DEFAULT_CONFIG_DIR, DEFAULT_CONFIG_FILE, LoadedLayer,
    SYSTEM_CONFIG_PATH, schema,
};
use crate::ConfigError;
use directories::BaseDirs;
use log::debug;
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Read one layer. A missing file is `None` unless the layer is required.
pub(super) fn read_layer(
    source: ConfigLayerSource,
    path: &Path,
    required: bool,
) -> Result<Option<LoadedLayer>, ConfigError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound && !required => {
            debug!(
                "config layer absent (layer={})",
                source.label(path)
            );
            return Ok(None);
        }
        Err(err) => return Err(ConfigError::read(path, err)),
    };

    let label = source.label(path);
    let value: Value =
        json5::from_str(&contents).map_err(|err| ConfigError::syntax(label.clone(), err))?;
    schema::validate_layer_schema(&value, &label)?;
    debug!("config layer read (layer={label}, bytes={})", contents.len());
    Ok(Some(LoadedLayer {
        meta: ConfigLayer {
            source,
            path: path.to_path_buf(),
        },
        value,
    }))
}

/// Canonical working directory; a directory that does not exist yet is kept as given.
pub(super) fn resolve_cwd(path: &Path) -> Result<PathBuf, ConfigError> {
    match path.canonicalize() {
        Ok(resolved) => Ok(resolved),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(path.to_path_buf()),
        Err(err) => Err(ConfigError::read(path, err)),
    }
}

/// Key used to skip a layer file that was already read under another source.
pub(super) fn dedup_key(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

pub(super) fn default_system_path() -> Option<PathBuf> {
    cfg!(unix).then(|| PathBuf::from(SYSTEM_CONFIG_PATH))
}

pub(super) fn default_user_path() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| {
        dirs.home_dir()
            .join(DEFAULT_CONFIG_DIR)
            .join(DEFAULT_CONFIG_FILE)
    })
}
