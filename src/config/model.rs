//! In-memory shape of a RequireJS configuration document.
//!
//! Sections are kept as ordered lists; keys are unique once a collection has
//! gone through the merger.

use serde::Deserialize;

/// Which optional sections the merger processes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigLoaderOptions {
    pub load_overrides: bool,
    pub process_bundles: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirePath {
    pub key: String,
    pub value: String,
    pub default_bundle: Option<String>,
}

impl RequirePath {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            default_bundle: None,
        }
    }

    pub fn with_default_bundle(mut self, bundle: impl Into<String>) -> Self {
        self.default_bundle = Some(bundle.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShimEntry {
    pub for_module: String,
    pub exports: Option<String>,
    pub dependencies: Vec<String>,
}

impl ShimEntry {
    pub fn new(for_module: impl Into<String>) -> Self {
        Self {
            for_module: for_module.into(),
            exports: None,
            dependencies: vec![],
        }
    }

    pub fn exports(mut self, name: impl Into<String>) -> Self {
        self.exports = Some(name.into());
        self
    }

    pub fn deps<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies.extend(deps.into_iter().map(Into::into));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapReplacement {
    pub old_key: String,
    pub new_key: String,
}

/// Per-consumer dependency remapping: inside `for_module`, `old_key` loads `new_key`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapElement {
    pub for_module: String,
    pub replacements: Vec<MapReplacement>,
}

impl MapElement {
    pub fn new(for_module: impl Into<String>) -> Self {
        Self {
            for_module: for_module.into(),
            replacements: vec![],
        }
    }

    pub fn replace(mut self, old_key: impl Into<String>, new_key: impl Into<String>) -> Self {
        self.replacements.push(MapReplacement {
            old_key: old_key.into(),
            new_key: new_key.into(),
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequireBundle {
    pub bundle_id: String,
    pub modules: Vec<String>,
}

/// A bundle-scoped mini configuration, applied only when serving one of
/// `bundled_scripts`. Never folded into the top-level sections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionOverride {
    pub bundle_id: String,
    pub paths: Vec<RequirePath>,
    pub shim: Vec<ShimEntry>,
    pub map: Vec<MapElement>,
    pub bundled_scripts: Vec<String>,
}

impl CollectionOverride {
    pub fn applies_to(&self, script: &str) -> bool {
        self.bundled_scripts.iter().any(|s| s == script)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigurationCollection {
    /// Where the fragment came from; not part of the merged result.
    pub file_path: Option<String>,
    pub paths: Vec<RequirePath>,
    /// Where each bundle is served from; same shape and merge rule as `paths`.
    pub bundle_paths: Vec<RequirePath>,
    pub shim: Vec<ShimEntry>,
    pub map: Vec<MapElement>,
    pub bundles: Vec<RequireBundle>,
    pub overrides: Vec<CollectionOverride>,
}

impl ConfigurationCollection {
    pub fn path(&self, key: &str) -> Option<&RequirePath> {
        self.paths.iter().find(|p| p.key == key)
    }

    pub fn bundle_path(&self, bundle_id: &str) -> Option<&RequirePath> {
        self.bundle_paths.iter().find(|p| p.key == bundle_id)
    }

    pub fn shim_for(&self, module: &str) -> Option<&ShimEntry> {
        self.shim.iter().find(|s| s.for_module == module)
    }

    pub fn map_for(&self, module: &str) -> Option<&MapElement> {
        self.map.iter().find(|m| m.for_module == module)
    }

    pub fn bundle(&self, bundle_id: &str) -> Option<&RequireBundle> {
        self.bundles.iter().find(|b| b.bundle_id == bundle_id)
    }

    /// Overrides that apply when serving `script`, in configuration order.
    pub fn overrides_for<'a>(
        &'a self,
        script: &'a str,
    ) -> impl Iterator<Item = &'a CollectionOverride> + 'a {
        self.overrides.iter().filter(move |o| o.applies_to(script))
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
            && self.bundle_paths.is_empty()
            && self.shim.is_empty()
            && self.map.is_empty()
            && self.bundles.is_empty()
            && self.overrides.is_empty()
    }
}
