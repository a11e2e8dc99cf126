//! Configuration merge logic
//!
//! Fragments are folded in order; a later fragment overrides an earlier one
//! value-for-value, not fragment-for-fragment:
//! - paths and bundle paths: last definition of an id wins, default bundle
//!   included
//! - shim: exports replaced, dependencies concatenated then deduplicated
//!   keeping the last occurrence
//! - map: replacements deduplicated by old id the same way
//! - bundles: concatenated during the fold, distinct-filtered once at the end
//! - overrides: appended, never merged by key

use std::collections::HashSet;
use std::hash::Hash;

use tracing::warn;

use crate::error::ConfigError;

use super::model::{
    ConfigLoaderOptions, ConfigurationCollection, MapElement, RequireBundle, RequirePath, ShimEntry,
};

/// Result of one merge call.
#[derive(Debug, Default)]
pub struct MergeOutcome {
    pub collection: ConfigurationCollection,
    /// Recoverable problems; the offending parts were left out.
    pub warnings: Vec<ConfigError>,
}

pub struct ConfigMerger<'a> {
    collections: &'a [ConfigurationCollection],
    options: ConfigLoaderOptions,
    merged: ConfigurationCollection,
    warnings: Vec<ConfigError>,
}

impl<'a> ConfigMerger<'a> {
    pub fn new(collections: &'a [ConfigurationCollection], options: ConfigLoaderOptions) -> Self {
        Self {
            collections,
            options,
            merged: ConfigurationCollection::default(),
            warnings: vec![],
        }
    }

    pub fn merge(mut self) -> MergeOutcome {
        for coll in self.collections {
            merge_paths(&mut self.merged.paths, &coll.paths);
            merge_paths(&mut self.merged.bundle_paths, &coll.bundle_paths);
            self.merge_shims(&coll.shim);
            self.merge_maps(&coll.map);
            if self.options.process_bundles {
                self.merge_bundles(&coll.bundles);
            }
            if self.options.load_overrides {
                self.merge_overrides(coll);
            }
        }

        if self.options.process_bundles {
            self.ensure_no_duplicates_in_bundles();
        }

        MergeOutcome {
            collection: self.merged,
            warnings: self.warnings,
        }
    }

    fn merge_shims(&mut self, shims: &[ShimEntry]) {
        let merged = &mut self.merged.shim;
        for shim in shims {
            match merged.iter_mut().find(|s| s.for_module == shim.for_module) {
                Some(existing) => {
                    existing.exports = shim.exports.clone();
                    existing.dependencies.extend(shim.dependencies.iter().cloned());
                    existing.dependencies =
                        dedup_keep_last(std::mem::take(&mut existing.dependencies), |d| d.clone());
                }
                None => {
                    let mut entry = shim.clone();
                    entry.dependencies = dedup_keep_last(entry.dependencies, |d| d.clone());
                    merged.push(entry);
                }
            }
        }
    }

    fn merge_maps(&mut self, elements: &[MapElement]) {
        let merged = &mut self.merged.map;
        for element in elements {
            match merged.iter_mut().find(|m| m.for_module == element.for_module) {
                Some(existing) => {
                    existing.replacements.extend(element.replacements.iter().cloned());
                    existing.replacements = dedup_keep_last(
                        std::mem::take(&mut existing.replacements),
                        |r| r.old_key.clone(),
                    );
                }
                None => {
                    let mut entry = element.clone();
                    entry.replacements = dedup_keep_last(entry.replacements, |r| r.old_key.clone());
                    merged.push(entry);
                }
            }
        }
    }

    fn merge_bundles(&mut self, bundles: &[RequireBundle]) {
        let merged = &mut self.merged.bundles;
        for bundle in bundles {
            match merged.iter_mut().find(|b| b.bundle_id == bundle.bundle_id) {
                // add without checking for duplicates, filtered after the fold
                Some(existing) => existing.modules.extend(bundle.modules.iter().cloned()),
                None => merged.push(bundle.clone()),
            }
        }
    }

    fn ensure_no_duplicates_in_bundles(&mut self) {
        for bundle in &mut self.merged.bundles {
            let mut seen = HashSet::new();
            bundle.modules.retain(|m| seen.insert(m.clone()));
        }
    }

    fn merge_overrides(&mut self, coll: &ConfigurationCollection) {
        for ovr in &coll.overrides {
            if ovr.bundle_id.trim().is_empty() {
                let warning = ConfigError::malformed(
                    coll.file_path.as_deref().unwrap_or("<unnamed>"),
                    "overrides",
                    "override without a bundle id",
                );
                warn!(%warning, "skipping override");
                self.warnings.push(warning);
                continue;
            }
            self.merged.overrides.push(ovr.clone());
        }
    }
}

/// Merge `collections` in order and return the result, logging any warnings.
pub fn merge_configs(
    collections: &[ConfigurationCollection],
    options: ConfigLoaderOptions,
) -> ConfigurationCollection {
    ConfigMerger::new(collections, options).merge().collection
}

fn merge_paths(merged: &mut Vec<RequirePath>, paths: &[RequirePath]) {
    for path in paths {
        match merged.iter_mut().find(|p| p.key == path.key) {
            Some(existing) => *existing = path.clone(),
            None => merged.push(path.clone()),
        }
    }
}

/// Drop every item whose key occurs again later in `items`.
fn dedup_keep_last<T, K, F>(items: Vec<T>, key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::new();
    let mut kept: Vec<T> = items
        .into_iter()
        .rev()
        .filter(|item| seen.insert(key(item)))
        .collect();
    kept.reverse();
    kept
}
