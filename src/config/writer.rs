//! JSON output, one builder per section. Empty sections are not emitted.

use std::fs;
use std::path::Path;

use serde_json::{json, Map, Value};

use crate::error::ConfigError;

use super::model::{
    CollectionOverride, ConfigurationCollection, MapElement, RequireBundle, RequirePath, ShimEntry,
};

pub fn to_json(conf: &ConfigurationCollection) -> Value {
    let mut obj = Map::new();
    if !conf.paths.is_empty() {
        obj.insert("paths".into(), paths_json(&conf.paths));
    }
    if !conf.bundle_paths.is_empty() {
        obj.insert("bundlePaths".into(), paths_json(&conf.bundle_paths));
    }
    if !conf.shim.is_empty() {
        obj.insert("shim".into(), shim_json(&conf.shim));
    }
    if !conf.map.is_empty() {
        obj.insert("map".into(), map_json(&conf.map));
    }
    if !conf.bundles.is_empty() {
        obj.insert("bundles".into(), bundles_json(&conf.bundles));
    }
    if !conf.overrides.is_empty() {
        obj.insert("overrides".into(), overrides_json(&conf.overrides));
    }
    Value::Object(obj)
}

pub fn write_config_file(path: &Path, conf: &ConfigurationCollection) -> Result<(), ConfigError> {
    let text = serde_json::to_string_pretty(&to_json(conf)).map_err(|source| ConfigError::Json {
        source_name: path.display().to_string(),
        source,
    })?;
    fs::write(path, text).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn paths_json(paths: &[RequirePath]) -> Value {
    let obj = paths
        .iter()
        .map(|p| {
            let value = match &p.default_bundle {
                Some(bundle) if !bundle.is_empty() => {
                    json!({ "path": p.value, "defaultBundle": bundle })
                }
                _ => Value::from(p.value.as_str()),
            };
            (p.key.clone(), value)
        })
        .collect();
    Value::Object(obj)
}

fn shim_json(shims: &[ShimEntry]) -> Value {
    let obj = shims
        .iter()
        .map(|s| {
            let mut entry = Map::new();
            if !s.dependencies.is_empty() {
                entry.insert("deps".into(), json!(s.dependencies));
            }
            if let Some(exports) = s.exports.as_deref().filter(|e| !e.is_empty()) {
                entry.insert("exports".into(), Value::from(exports));
            }
            (s.for_module.clone(), Value::Object(entry))
        })
        .collect();
    Value::Object(obj)
}

fn map_json(elements: &[MapElement]) -> Value {
    let obj = elements
        .iter()
        .map(|m| {
            let replacements = m
                .replacements
                .iter()
                .map(|r| (r.old_key.clone(), Value::from(r.new_key.as_str())))
                .collect();
            (m.for_module.clone(), Value::Object(replacements))
        })
        .collect();
    Value::Object(obj)
}

fn bundles_json(bundles: &[RequireBundle]) -> Value {
    let obj = bundles
        .iter()
        .map(|b| (b.bundle_id.clone(), json!(b.modules)))
        .collect();
    Value::Object(obj)
}

// Array form, so two overrides for one bundle survive a round trip.
fn overrides_json(overrides: &[CollectionOverride]) -> Value {
    overrides
        .iter()
        .map(|o| {
            let mut entry = Map::new();
            entry.insert("bundleId".into(), Value::from(o.bundle_id.as_str()));
            if !o.paths.is_empty() {
                entry.insert("paths".into(), paths_json(&o.paths));
            }
            if !o.shim.is_empty() {
                entry.insert("shim".into(), shim_json(&o.shim));
            }
            if !o.map.is_empty() {
                entry.insert("map".into(), map_json(&o.map));
            }
            entry.insert("bundledScripts".into(), json!(o.bundled_scripts));
            Value::Object(entry)
        })
        .collect()
}
