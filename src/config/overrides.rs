//! Per-bundle override sections.
//!
//! Accepted shapes:
//!
//! ```json
//! "overrides": [ { "bundleId": "admin", "paths": {}, "shim": {}, "bundledScripts": [] } ]
//! "overrides": { "admin": { "paths": {}, "bundledScripts": [] } }
//! ```
//!
//! The array form may name the same bundle twice with different scripts.

use serde_json::Value;

use super::model::CollectionOverride;
use super::reader::{type_name, SectionReader};

pub(crate) fn read_overrides(
    reader: &mut SectionReader<'_>,
    value: Option<&Value>,
) -> Vec<CollectionOverride> {
    match value {
        None | Some(Value::Null) => vec![],
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| read_override(reader, &format!("overrides[{i}]"), None, item))
            .collect(),
        Some(Value::Object(keyed)) => keyed
            .iter()
            .filter_map(|(id, item)| {
                read_override(reader, &format!("overrides.{id}"), Some(id), item)
            })
            .collect(),
        Some(other) => {
            reader.warn(
                "overrides",
                format!("expected an array or an object, found {}", type_name(other)),
            );
            vec![]
        }
    }
}

fn read_override(
    reader: &mut SectionReader<'_>,
    section: &str,
    keyed_id: Option<&String>,
    value: &Value,
) -> Option<CollectionOverride> {
    let body = reader.object(section, Some(value))?;

    let bundle_id = keyed_id
        .map(String::as_str)
        .or_else(|| body.get("bundleId").and_then(Value::as_str))
        .filter(|id| !id.trim().is_empty());
    let Some(bundle_id) = bundle_id else {
        reader.warn(section, "missing `bundleId`");
        return None;
    };

    Some(CollectionOverride {
        bundle_id: bundle_id.to_string(),
        paths: reader.paths(&format!("{section}.paths"), body.get("paths")),
        shim: reader.shim(&format!("{section}.shim"), body.get("shim")),
        map: reader.map(&format!("{section}.map"), body.get("map")),
        bundled_scripts: reader.string_list(
            &format!("{section}.bundledScripts"),
            body.get("bundledScripts"),
        ),
    })
}

#[cfg(test)]
mod tests {
    use crate::config::model::{RequirePath, ShimEntry};
    use crate::config::reader::parse_config;

    #[test]
    fn test_array_form_keeps_duplicate_bundles() {
        let text = r#"{ "overrides": [
            { "bundleId": "admin", "bundledScripts": ["Admin/Index"] },
            { "bundleId": "admin", "bundledScripts": ["Admin/Edit"], "shim": { "grid": { "deps": ["jquery"] } } }
        ] }"#;
        let outcome = parse_config(text, "overrides.json").unwrap();
        let overrides = &outcome.collection.overrides;
        assert_eq!(overrides.len(), 2);
        assert!(overrides[0].applies_to("Admin/Index"));
        assert!(!overrides[0].applies_to("Admin/Edit"));
        assert_eq!(overrides[1].shim, vec![ShimEntry::new("grid").deps(["jquery"])]);
    }

    #[test]
    fn test_object_form_takes_id_from_key() {
        let text = r#"{ "overrides": { "shop": { "paths": { "cart": "js/cart" }, "bundledScripts": ["Shop/Cart"] } } }"#;
        let outcome = parse_config(text, "overrides.json").unwrap();
        let ovr = &outcome.collection.overrides[0];
        assert_eq!(ovr.bundle_id, "shop");
        assert_eq!(ovr.paths, vec![RequirePath::new("cart", "js/cart")]);
        assert_eq!(ovr.bundled_scripts, vec!["Shop/Cart"]);
    }

    #[test]
    fn test_missing_bundle_id_skips_only_that_override() {
        let text = r#"{
            "paths": { "a": "b" },
            "overrides": [ { "paths": { "x": "y" } }, { "bundleId": "ok" } ]
        }"#;
        let outcome = parse_config(text, "overrides.json").unwrap();
        assert_eq!(outcome.collection.paths.len(), 1);
        assert_eq!(outcome.collection.overrides.len(), 1);
        assert_eq!(outcome.collection.overrides[0].bundle_id, "ok");
        assert_eq!(outcome.warnings.len(), 1);
    }
}
