use std::path::Path;

use serde_yaml::{Mapping, Value};

use super::ConfigError;

/// Read and parse a YAML file. A missing file yields `Ok(None)`.
pub(crate) fn load_yaml_file(path: &Path) -> Result<Option<Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load_yaml_str(&content).map(Some)
}

pub(crate) fn load_yaml_str(content: &str) -> Result<Value, ConfigError> {
    if content.trim().is_empty() {
        return Ok(Value::Mapping(Mapping::new()));
    }
    Ok(serde_yaml::from_str(content)?)
}

/// Deep-merge `overlay` into `base`. Mappings merge key by key, any other
/// value in the overlay replaces the base value.
pub(crate) fn merge_yaml(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_yaml(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

/// Pick the `section` mapping out of an application file, or the whole
/// document when it has no such key.
pub(crate) fn select_section(root: Value, section: &str) -> Value {
    match root.get(section) {
        Some(inner) if inner.is_mapping() => inner.clone(),
        _ => root,
    }
}
