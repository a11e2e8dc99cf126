use amd_autodeps::{
    extract_calls, inject_dependencies, parse_script, TransformConfig, TransformError,
    UnsupportedCallShape,
};

fn auto(aliases: &[(&str, &str)]) -> TransformConfig {
    aliases.iter().fold(
        TransformConfig {
            auto_dependencies: true,
            ..Default::default()
        },
        |config, (ident, module)| config.with_alias(*ident, *module),
    )
}

#[test]
fn existing_dependency_array_is_left_byte_for_byte() {
    let src = "define(['a'], function(a){ return a; });";
    let calls = extract_calls(&parse_script(src).unwrap());
    assert!(calls[0].has_dependency_array);

    let outcome = inject_dependencies(src, &TransformConfig::default()).unwrap();
    assert_eq!(outcome.source, src);
    assert_eq!(outcome.patched_calls, 0);
    assert!(outcome.skipped.is_empty());
}

#[test]
fn factory_only_define_gets_empty_array() {
    let outcome =
        inject_dependencies("define(function(){ return 1; })", &TransformConfig::default())
            .unwrap();
    assert_eq!(outcome.source, "define([],function(){ return 1; })");
    assert_eq!(outcome.patched_calls, 1);
}

#[test]
fn adjacent_defines_patched_in_one_batch() {
    let src = "define(function(){});\ndefine(function(){});";
    let outcome = inject_dependencies(src, &TransformConfig::default()).unwrap();
    assert_eq!(outcome.source, "define([],function(){});\ndefine([],function(){});");

    // same as composing each edit applied to the original on its own
    let first = inject_dependencies("define(function(){});", &TransformConfig::default()).unwrap();
    let second = inject_dependencies("define(function(){});", &TransformConfig::default()).unwrap();
    assert_eq!(outcome.source, format!("{}\n{}", first.source, second.source));
}

#[test]
fn sole_non_factory_argument_is_skipped() {
    let src = "define(factory);";
    let outcome = inject_dependencies(src, &TransformConfig::default()).unwrap();
    assert_eq!(outcome.source, src);
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].reason, UnsupportedCallShape::SoleArgumentNotFactory);
}

#[test]
fn skipped_calls_do_not_stop_the_file() {
    let src = "require('jquery');\ndefine(function(){});";
    let outcome = inject_dependencies(src, &TransformConfig::default()).unwrap();
    assert_eq!(outcome.source, "require('jquery');\ndefine([],function(){});");
    assert_eq!(outcome.patched_calls, 1);
    assert_eq!(outcome.skipped.len(), 1);
}

#[test]
fn named_module_gets_array_after_its_name() {
    let outcome =
        inject_dependencies("define('app/main', function(){});", &TransformConfig::default())
            .unwrap();
    assert_eq!(outcome.source, "define('app/main', [],function(){});");
}

#[test]
fn nested_calls_are_patched_independently() {
    let src = "define(function(){\n  require(function(){ $('a'); });\n});";
    let outcome = inject_dependencies(src, &auto(&[("$", "jquery")])).unwrap();
    assert_eq!(
        outcome.source,
        "define([\"jquery\"],function(){\n  require([\"jquery\"],function(){ $('a'); });\n});"
    );
    assert_eq!(outcome.patched_calls, 2);
}

#[test]
fn discovered_dependencies_fill_the_array() {
    let src = "define(function(){ var view = Backbone.View.extend({}); return _.extend(view, $); });";
    let outcome = inject_dependencies(
        src,
        &auto(&[("$", "jquery"), ("_", "underscore"), ("Backbone", "backbone")]),
    )
    .unwrap();
    assert_eq!(
        outcome.source,
        concat!(
            "define([\"backbone\",\"underscore\",\"jquery\"],",
            "function(){ var view = Backbone.View.extend({}); return _.extend(view, $); });"
        )
    );
}

#[test]
fn auto_dependencies_without_matches_leave_empty_array() {
    let outcome =
        inject_dependencies("define(function(){ return 1; });", &auto(&[("$", "jquery")]))
            .unwrap();
    assert_eq!(outcome.source, "define([],function(){ return 1; });");
}

#[test]
fn non_ascii_text_before_the_call_is_preserved() {
    let src = "// déjà vu ✓\ndefine(function(){ return 'ü'; });";
    let outcome = inject_dependencies(src, &TransformConfig::default()).unwrap();
    assert_eq!(outcome.source, "// déjà vu ✓\ndefine([],function(){ return 'ü'; });");
}

#[test]
fn multibyte_code_before_the_call_is_preserved() {
    let src = "var s = 'déjà ✓';\ndefine(function(){ return s; });";
    let outcome = inject_dependencies(src, &TransformConfig::default()).unwrap();
    assert_eq!(
        outcome.source,
        "var s = 'déjà ✓';\ndefine([],function(){ return s; });"
    );
}

#[test]
fn byte_order_mark_is_kept_in_front() {
    let src = "\u{feff}define(function(){});";
    let outcome = inject_dependencies(src, &TransformConfig::default()).unwrap();
    assert_eq!(outcome.source, "\u{feff}define([],function(){});");

    let outcome = inject_dependencies(
        "\u{feff}define(function(){ $(); });",
        &auto(&[("$", "jquery")]),
    )
    .unwrap();
    assert_eq!(
        outcome.source,
        "\u{feff}define([\"jquery\"],function(){ $(); });"
    );
}

#[test]
fn call_inside_an_earlier_argument_is_patched_in_place() {
    let src = "require(define(function(){}), function(){});";
    let expected = "require(define([],function(){}), [],function(){});";

    let outcome = inject_dependencies(src, &TransformConfig::default()).unwrap();
    assert_eq!(outcome.source, expected);
    assert_eq!(outcome.patched_calls, 2);

    let outcome = inject_dependencies(src, &auto(&[("$", "jquery")])).unwrap();
    assert_eq!(outcome.source, expected);
}

#[test]
fn recovered_parser_error_still_rejects_the_file() {
    let err = inject_dependencies("define(function(){});\nreturn 1;", &TransformConfig::default())
        .unwrap_err();
    assert!(matches!(err, TransformError::Parse { .. }));
}

#[test]
fn malformed_script_is_rejected_whole() {
    let err = inject_dependencies("define(function(){ return ; ", &TransformConfig::default())
        .unwrap_err();
    assert!(matches!(err, TransformError::Parse { .. }));
}
