use tracing::debug;

use crate::error::TransformError;

use super::Transformation;

/// Apply every edit of one batch to `source`.
///
/// Edits are sorted by the offset they write at and run from the highest one
/// down, so each edit still finds its insertion point at its original offset.
/// The result does not depend on the order of `transformations`.
pub fn execute(
    source: &str,
    mut transformations: Vec<Transformation>,
) -> Result<String, TransformError> {
    transformations.sort_by_key(Transformation::sort_key);

    for transformation in &transformations {
        let (at, scope) = (transformation.edit_point(), transformation.scope());
        if at < scope.start || at > scope.end {
            return Err(TransformError::InvariantViolation(format!(
                "{:?} at {at} lies outside its statement {scope:?}",
                transformation.kind()
            )));
        }
    }

    // one edit of each kind per offset
    for pair in transformations.windows(2) {
        let (a, b) = (pair[0].target_range(), pair[1].target_range());
        if a.end > b.start || pair[0].sort_key() == pair[1].sort_key() {
            return Err(TransformError::InvariantViolation(format!(
                "{:?} at {a:?} collides with {:?} at {b:?}",
                pair[0].kind(),
                pair[1].kind()
            )));
        }
    }

    debug!(edits = transformations.len(), "applying transformation batch");

    let mut script = source.to_string();
    for transformation in transformations.iter().rev() {
        script = transformation.apply(&script)?;
    }
    Ok(script)
}
