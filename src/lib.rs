//! AMD dependency-array injection and RequireJS configuration merging.
//!
//! Two independent pieces:
//! - [`inject_dependencies`] parses a script with SWC, finds `define`/`require`
//!   calls without a dependency array and patches the source text in place of
//!   re-printing the AST, so everything outside the inserted spans stays
//!   byte-identical.
//! - [`config`] reads, merges and writes RequireJS configuration fragments.

pub mod config;
pub mod error;
pub mod extract;
pub mod options;
pub mod parse;
pub mod transform;

use std::ops::Range;

use tracing::debug;

pub use config::{
    merge_configs, CollectionOverride, ConfigLoader, ConfigLoaderOptions, ConfigMerger,
    ConfigurationCollection,
};
pub use error::{ConfigError, TransformError, UnsupportedCallShape};
pub use extract::{extract_calls, CallKind, RequireCall};
pub use parse::parse_script;
pub use transform::{execute, TransformConfig, Transformation, TransformationSetBuilder};

// -----------------------------------------------------------------------------
// Entrypoint
// -----------------------------------------------------------------------------

/// A call site that was left as it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedCall {
    pub kind: CallKind,
    pub callee_range: Range<usize>,
    pub reason: UnsupportedCallShape,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectionOutcome {
    pub source: String,
    pub patched_calls: usize,
    pub skipped: Vec<SkippedCall>,
}

/// Give every AMD call in `source` an explicit dependency array.
///
/// Calls that already have one are not touched; calls with no room for one
/// are reported in [`InjectionOutcome::skipped`]. A parse failure rejects the
/// whole file.
pub fn inject_dependencies(
    source: &str,
    config: &TransformConfig,
) -> Result<InjectionOutcome, TransformError> {
    let parsed = parse_script(source)?;
    let calls = extract_calls(&parsed);
    let builder = TransformationSetBuilder::new(config);

    let mut batch = vec![];
    let mut patched_calls = 0;
    let mut skipped = vec![];

    for call in calls.iter().filter(|c| !c.has_dependency_array) {
        match builder.build(call) {
            Ok(set) => {
                patched_calls += 1;
                batch.extend(set);
            }
            Err(reason) => {
                debug!(
                    call = call.kind.name(),
                    offset = call.callee_range.start,
                    %reason,
                    "skipping call site"
                );
                skipped.push(SkippedCall {
                    kind: call.kind,
                    callee_range: call.callee_range.clone(),
                    reason,
                });
            }
        }
    }

    let source = if batch.is_empty() {
        source.to_string()
    } else {
        execute(source, batch)?
    };

    Ok(InjectionOutcome {
        source,
        patched_calls,
        skipped,
    })
}
