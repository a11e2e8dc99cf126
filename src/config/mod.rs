//! RequireJS configuration: model, JSON reader/writer and the merge engine.

mod merge;
mod model;
mod overrides;
mod reader;
mod writer;

use std::path::PathBuf;

use crate::error::ConfigError;

pub use merge::{merge_configs, ConfigMerger, MergeOutcome};
pub use model::{
    CollectionOverride, ConfigLoaderOptions, ConfigurationCollection, MapElement, MapReplacement,
    RequireBundle, RequirePath, ShimEntry,
};
pub use reader::{parse_config, read_config_file, ReadOutcome};
pub use writer::{to_json, write_config_file};

/// Reads a list of configuration files and merges them in the given order.
pub struct ConfigLoader {
    paths: Vec<PathBuf>,
    options: ConfigLoaderOptions,
}

impl ConfigLoader {
    pub fn new<I, P>(paths: I, options: ConfigLoaderOptions) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
            options,
        }
    }

    /// An unreadable or unparseable file aborts the load; malformed sections
    /// only add warnings.
    pub fn load(&self) -> Result<MergeOutcome, ConfigError> {
        let mut fragments = Vec::with_capacity(self.paths.len());
        let mut warnings = vec![];
        for path in &self.paths {
            let outcome = read_config_file(path)?;
            fragments.push(outcome.collection);
            warnings.extend(outcome.warnings);
        }

        let mut merged = ConfigMerger::new(&fragments, self.options).merge();
        warnings.append(&mut merged.warnings);
        merged.warnings = warnings;
        Ok(merged)
    }
}
