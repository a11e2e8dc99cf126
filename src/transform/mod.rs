//! Text edits that normalise AMD call sites.
//!
//! Edits are computed against the original source and applied in one batch by
//! [`execute`]. Each edit is a pure `&str -> String` function; correctness of
//! the batch depends only on the order in which they run, never on offset
//! bookkeeping between edits.

mod builder;
mod deps;
mod executor;

use std::collections::HashMap;
use std::ops::Range;

use serde::Deserialize;

use crate::error::TransformError;

pub use builder::TransformationSetBuilder;
pub use deps::discover_dependencies;
pub use executor::execute;

// -----------------------------------------------------------------------------
// Settings
// -----------------------------------------------------------------------------

/// Options for one transformation run, usually read from JSON:
///
/// ```json
/// { "autoDependencies": true, "aliases": { "$": "jquery" } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransformConfig {
    /// Fill new dependency arrays with modules discovered in the factory body.
    pub auto_dependencies: bool,
    /// Free identifier -> module id.
    pub aliases: HashMap<String, String>,
}

impl TransformConfig {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn with_alias(mut self, identifier: impl Into<String>, module: impl Into<String>) -> Self {
        self.aliases.insert(identifier.into(), module.into());
        self
    }
}

// -----------------------------------------------------------------------------
// Transformations
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TransformationKind {
    AddEmptyDepsArray,
    FillDependencies,
}

impl TransformationKind {
    /// Secondary sort key for edits at the same offset. The batch runs from
    /// the end of the sorted list, so a higher rank runs earlier.
    fn rank(self) -> u8 {
        match self {
            Self::FillDependencies => 0,
            Self::AddEmptyDepsArray => 1,
        }
    }
}

/// A deferred edit on one call site.
///
/// `scope` is the byte range of the statement enclosing the call; the edit
/// point must stay inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transformation {
    /// Insert `[],` in front of the last argument.
    AddEmptyDepsArray {
        scope: Range<usize>,
        insert_at: usize,
    },
    /// Write module ids into the `[]` that `AddEmptyDepsArray` put at `array_at`.
    FillDependencies {
        scope: Range<usize>,
        array_at: usize,
        modules: Vec<String>,
    },
}

impl Transformation {
    pub fn kind(&self) -> TransformationKind {
        match self {
            Self::AddEmptyDepsArray { .. } => TransformationKind::AddEmptyDepsArray,
            Self::FillDependencies { .. } => TransformationKind::FillDependencies,
        }
    }

    /// Offset in the original source where this edit writes.
    pub fn edit_point(&self) -> usize {
        match self {
            Self::AddEmptyDepsArray { insert_at, .. } => *insert_at,
            Self::FillDependencies { array_at, .. } => *array_at,
        }
    }

    pub fn scope(&self) -> &Range<usize> {
        match self {
            Self::AddEmptyDepsArray { scope, .. } | Self::FillDependencies { scope, .. } => scope,
        }
    }

    /// Both edits of a call are pure insertions at the same point, so the
    /// range is empty and the kind rank decides which runs first.
    pub fn target_range(&self) -> Range<usize> {
        let at = self.edit_point();
        at..at
    }

    pub(crate) fn sort_key(&self) -> (usize, usize, u8) {
        let range = self.target_range();
        (range.start, range.end, self.kind().rank())
    }

    pub fn apply(&self, script: &str) -> Result<String, TransformError> {
        match self {
            Self::AddEmptyDepsArray { insert_at, .. } => {
                let at = checked_offset(script, *insert_at)?;
                Ok(splice(script, at, "[],"))
            }
            Self::FillDependencies {
                array_at, modules, ..
            } => {
                let at = checked_offset(script, *array_at)?;
                if script.get(at..at + 2) != Some("[]") {
                    return Err(TransformError::InvariantViolation(format!(
                        "expected an empty dependency array at offset {at}"
                    )));
                }
                if modules.is_empty() {
                    return Ok(script.to_string());
                }
                let list = modules
                    .iter()
                    .map(|m| serde_json::Value::from(m.as_str()).to_string())
                    .collect::<Vec<_>>()
                    .join(",");
                Ok(splice(script, at + 1, &list))
            }
        }
    }
}

fn checked_offset(script: &str, offset: usize) -> Result<usize, TransformError> {
    if offset > script.len() || !script.is_char_boundary(offset) {
        return Err(TransformError::InvariantViolation(format!(
            "offset {offset} is outside a {} byte script or inside a character",
            script.len()
        )));
    }
    Ok(offset)
}

fn splice(script: &str, at: usize, text: &str) -> String {
    let mut out = String::with_capacity(script.len() + text.len());
    out.push_str(&script[..at]);
    out.push_str(text);
    out.push_str(&script[at..]);
    out
}
