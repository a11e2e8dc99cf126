//! JSON fragment reader.
//!
//! Each section has one reading function on [`SectionReader`]; overrides reuse
//! the same functions for their nested sections. A section or entry of the
//! wrong shape becomes a warning and is left out, the rest of the fragment is
//! still read.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::warn;

use crate::error::ConfigError;

use super::model::{
    ConfigurationCollection, MapElement, MapReplacement, RequireBundle, RequirePath, ShimEntry,
};
use super::overrides::read_overrides;

#[derive(Debug, Default)]
pub struct ReadOutcome {
    pub collection: ConfigurationCollection,
    pub warnings: Vec<ConfigError>,
}

/// Parse one fragment. `source_name` is used for diagnostics and recorded as
/// the collection's `file_path`.
pub fn parse_config(text: &str, source_name: &str) -> Result<ReadOutcome, ConfigError> {
    let document: Value = serde_json::from_str(text).map_err(|source| ConfigError::Json {
        source_name: source_name.to_string(),
        source,
    })?;
    let Value::Object(document) = document else {
        return Err(ConfigError::NotAnObject(source_name.to_string()));
    };

    let mut reader = SectionReader::new(source_name);
    let collection = ConfigurationCollection {
        file_path: Some(source_name.to_string()),
        paths: reader.paths("paths", document.get("paths")),
        bundle_paths: reader.paths("bundlePaths", document.get("bundlePaths")),
        shim: reader.shim("shim", document.get("shim")),
        map: reader.map("map", document.get("map")),
        bundles: reader.bundles("bundles", document.get("bundles")),
        overrides: read_overrides(&mut reader, document.get("overrides")),
    };

    Ok(ReadOutcome {
        collection,
        warnings: reader.into_warnings(),
    })
}

pub fn read_config_file(path: &Path) -> Result<ReadOutcome, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&text, &path.display().to_string())
}

// -----------------------------------------------------------------------------
// Section readers
// -----------------------------------------------------------------------------

pub(crate) struct SectionReader<'a> {
    source_name: &'a str,
    warnings: Vec<ConfigError>,
}

impl<'a> SectionReader<'a> {
    pub(crate) fn new(source_name: &'a str) -> Self {
        Self {
            source_name,
            warnings: vec![],
        }
    }

    pub(crate) fn into_warnings(self) -> Vec<ConfigError> {
        self.warnings
    }

    pub(crate) fn warn(&mut self, section: &str, reason: impl Into<String>) {
        let warning = ConfigError::malformed(self.source_name, section, reason);
        warn!(%warning, "ignoring malformed configuration entry");
        self.warnings.push(warning);
    }

    /// The section as an object; absent and `null` sections are empty.
    pub(crate) fn object<'v>(
        &mut self,
        section: &str,
        value: Option<&'v Value>,
    ) -> Option<&'v Map<String, Value>> {
        match value {
            None | Some(Value::Null) => None,
            Some(Value::Object(map)) => Some(map),
            Some(other) => {
                self.warn(section, format!("expected an object, found {}", type_name(other)));
                None
            }
        }
    }

    pub(crate) fn string_list(&mut self, section: &str, value: Option<&Value>) -> Vec<String> {
        match value {
            None | Some(Value::Null) => vec![],
            Some(Value::Array(items)) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    match item.as_str() {
                        Some(s) => out.push(s.to_string()),
                        None => self.warn(
                            section,
                            format!("expected a string, found {}", type_name(item)),
                        ),
                    }
                }
                out
            }
            Some(other) => {
                self.warn(section, format!("expected an array, found {}", type_name(other)));
                vec![]
            }
        }
    }

    /// `{ "id": "target" }` or `{ "id": { "path": "target", "defaultBundle": "b" } }`
    pub(crate) fn paths(&mut self, section: &str, value: Option<&Value>) -> Vec<RequirePath> {
        let Some(entries) = self.object(section, value) else {
            return vec![];
        };
        let mut paths = Vec::with_capacity(entries.len());
        for (key, entry) in entries {
            match entry {
                Value::String(target) => paths.push(RequirePath::new(key, target)),
                Value::Object(obj) => match obj.get("path").and_then(Value::as_str) {
                    Some(target) => paths.push(RequirePath {
                        key: key.clone(),
                        value: target.to_string(),
                        default_bundle: obj
                            .get("defaultBundle")
                            .and_then(Value::as_str)
                            .map(str::to_string),
                    }),
                    None => self.warn(&format!("{section}.{key}"), "missing `path`"),
                },
                other => self.warn(
                    &format!("{section}.{key}"),
                    format!("expected a string or an object, found {}", type_name(other)),
                ),
            }
        }
        paths
    }

    /// `{ "id": { "exports": "Name", "deps": ["a"] } }`
    pub(crate) fn shim(&mut self, section: &str, value: Option<&Value>) -> Vec<ShimEntry> {
        let Some(entries) = self.object(section, value) else {
            return vec![];
        };
        let mut shims = Vec::with_capacity(entries.len());
        for (key, entry) in entries {
            let entry_section = format!("{section}.{key}");
            let Some(body) = self.object(&entry_section, Some(entry)) else {
                continue;
            };
            let exports = match body.get("exports") {
                None | Some(Value::Null) => None,
                Some(Value::String(name)) => Some(name.clone()),
                Some(other) => {
                    self.warn(
                        &entry_section,
                        format!("`exports` must be a string, found {}", type_name(other)),
                    );
                    None
                }
            };
            shims.push(ShimEntry {
                for_module: key.clone(),
                exports,
                dependencies: self.string_list(&format!("{entry_section}.deps"), body.get("deps")),
            });
        }
        shims
    }

    /// `{ "consumer": { "old": "new" } }`
    pub(crate) fn map(&mut self, section: &str, value: Option<&Value>) -> Vec<MapElement> {
        let Some(entries) = self.object(section, value) else {
            return vec![];
        };
        let mut elements = Vec::with_capacity(entries.len());
        for (key, entry) in entries {
            let entry_section = format!("{section}.{key}");
            let Some(body) = self.object(&entry_section, Some(entry)) else {
                continue;
            };
            let mut replacements = Vec::with_capacity(body.len());
            for (old_key, new_key) in body {
                match new_key.as_str() {
                    Some(new_key) => replacements.push(MapReplacement {
                        old_key: old_key.clone(),
                        new_key: new_key.to_string(),
                    }),
                    None => self.warn(
                        &format!("{entry_section}.{old_key}"),
                        format!("expected a string, found {}", type_name(new_key)),
                    ),
                }
            }
            elements.push(MapElement {
                for_module: key.clone(),
                replacements,
            });
        }
        elements
    }

    /// `{ "bundle": ["a", "b"] }`
    pub(crate) fn bundles(&mut self, section: &str, value: Option<&Value>) -> Vec<RequireBundle> {
        let Some(entries) = self.object(section, value) else {
            return vec![];
        };
        entries
            .iter()
            .map(|(bundle_id, modules)| RequireBundle {
                bundle_id: bundle_id.clone(),
                modules: self.string_list(&format!("{section}.{bundle_id}"), Some(modules)),
            })
            .collect()
    }
}

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_all_sections() {
        let text = r#"{
            "paths": {
                "jquery": "lib/jquery",
                "app": { "path": "js/app", "defaultBundle": "core" }
            },
            "bundlePaths": { "core": "bundles/core" },
            "shim": { "backbone": { "exports": "Backbone", "deps": ["underscore", "jquery"] } },
            "map": { "legacy": { "jquery": "jquery-1.8" } },
            "bundles": { "core": ["jquery", "app"] },
            "overrides": [
                { "bundleId": "admin", "paths": { "x": "y" }, "bundledScripts": ["Admin/Index"] }
            ]
        }"#;
        let outcome = parse_config(text, "require.json").unwrap();
        assert!(outcome.warnings.is_empty());

        let coll = outcome.collection;
        assert_eq!(coll.file_path.as_deref(), Some("require.json"));
        assert_eq!(coll.path("jquery"), Some(&RequirePath::new("jquery", "lib/jquery")));
        assert_eq!(
            coll.path("app"),
            Some(&RequirePath::new("app", "js/app").with_default_bundle("core"))
        );
        assert_eq!(
            coll.shim_for("backbone"),
            Some(&ShimEntry::new("backbone").exports("Backbone").deps(["underscore", "jquery"]))
        );
        assert_eq!(
            coll.map_for("legacy"),
            Some(&MapElement::new("legacy").replace("jquery", "jquery-1.8"))
        );
        assert_eq!(coll.bundle("core").unwrap().modules, vec!["jquery", "app"]);
        assert_eq!(
            coll.bundle_path("core"),
            Some(&RequirePath::new("core", "bundles/core"))
        );
        assert_eq!(coll.overrides.len(), 1);
        assert_eq!(coll.overrides[0].paths, vec![RequirePath::new("x", "y")]);
    }

    #[test]
    fn test_missing_sections_are_empty() {
        let outcome = parse_config("{}", "empty.json").unwrap();
        assert!(outcome.collection.is_empty());
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_malformed_section_is_skipped() {
        let text = r#"{ "paths": 5, "shim": { "a": { "deps": ["b", 3] } } }"#;
        let outcome = parse_config(text, "bad.json").unwrap();
        assert!(outcome.collection.paths.is_empty());
        assert_eq!(outcome.collection.shim_for("a").unwrap().dependencies, vec!["b"]);
        assert_eq!(outcome.warnings.len(), 2);
        assert!(outcome.warnings.iter().all(ConfigError::is_recoverable));
    }

    #[test]
    fn test_invalid_json_is_fatal() {
        assert!(matches!(parse_config("{", "x.json"), Err(ConfigError::Json { .. })));
        assert!(matches!(parse_config("[]", "x.json"), Err(ConfigError::NotAnObject(_))));
    }

    #[test]
    fn test_missing_file() {
        let err = read_config_file(Path::new("/nonexistent/require.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
