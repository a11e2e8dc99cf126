//! Dependency discovery inside an AMD factory body.

use std::collections::{HashMap, HashSet};

use swc_core::ecma::{
    ast::{
        BindingIdent, BreakStmt, ClassDecl, ClassExpr, ContinueStmt, Expr, FnDecl, FnExpr, Ident,
        LabeledStmt, SimpleAssignTarget,
    },
    visit::{Visit, VisitWith},
};

/// Module ids for the free identifiers of `factory` that have a known alias,
/// in discovery order without duplicates.
///
/// Scoping is deliberately coarse: a name declared anywhere inside the factory
/// (parameter, variable, function, class, catch binding) counts as bound for
/// the whole factory.
pub fn discover_dependencies(factory: &Expr, aliases: &HashMap<String, String>) -> Vec<String> {
    if aliases.is_empty() {
        return vec![];
    }

    let mut collector = IdentCollector::default();
    factory.visit_with(&mut collector);

    let mut seen = HashSet::new();
    collector
        .referenced
        .iter()
        .filter(|name| !collector.declared.contains(*name))
        .filter_map(|name| aliases.get(name))
        .filter(|module| seen.insert(module.as_str()))
        .cloned()
        .collect()
}

#[derive(Default)]
struct IdentCollector {
    declared: HashSet<String>,
    referenced: Vec<String>,
}

impl Visit for IdentCollector {
    fn visit_binding_ident(&mut self, n: &BindingIdent) {
        self.declared.insert(n.id.sym.to_string());
    }

    fn visit_simple_assign_target(&mut self, n: &SimpleAssignTarget) {
        // `x = 1` writes to x, it does not declare it
        match n {
            SimpleAssignTarget::Ident(b) => self.referenced.push(b.id.sym.to_string()),
            _ => n.visit_children_with(self),
        }
    }

    fn visit_fn_decl(&mut self, n: &FnDecl) {
        self.declared.insert(n.ident.sym.to_string());
        n.function.visit_with(self);
    }

    fn visit_fn_expr(&mut self, n: &FnExpr) {
        if let Some(ident) = &n.ident {
            self.declared.insert(ident.sym.to_string());
        }
        n.function.visit_with(self);
    }

    fn visit_class_decl(&mut self, n: &ClassDecl) {
        self.declared.insert(n.ident.sym.to_string());
        n.class.visit_with(self);
    }

    fn visit_class_expr(&mut self, n: &ClassExpr) {
        if let Some(ident) = &n.ident {
            self.declared.insert(ident.sym.to_string());
        }
        n.class.visit_with(self);
    }

    // labels are not variables
    fn visit_labeled_stmt(&mut self, n: &LabeledStmt) {
        n.body.visit_with(self);
    }

    fn visit_break_stmt(&mut self, _: &BreakStmt) {}

    fn visit_continue_stmt(&mut self, _: &ContinueStmt) {}

    fn visit_ident(&mut self, n: &Ident) {
        self.referenced.push(n.sym.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract_calls;
    use crate::parse::parse_script;

    fn deps_of(src: &str, aliases: &[(&str, &str)]) -> Vec<String> {
        let aliases = aliases
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let parsed = parse_script(src).unwrap();
        let calls = extract_calls(&parsed);
        let factory = calls[0].factory.as_ref().expect("factory");
        discover_dependencies(factory, &aliases)
    }

    #[test]
    fn test_free_identifiers_in_discovery_order() {
        let src = "define(function () { _.each([], function () {}); $('#a'); _.map([]); });";
        let found = deps_of(src, &[("$", "jquery"), ("_", "underscore")]);
        assert_eq!(found, vec!["underscore", "jquery"]);
    }

    #[test]
    fn test_locally_bound_names_are_not_dependencies() {
        let src = "define(function ($) { var _ = {}; function ko() {} return [$, _, ko]; });";
        let found = deps_of(
            src,
            &[("$", "jquery"), ("_", "underscore"), ("ko", "knockout")],
        );
        assert!(found.is_empty());
    }

    #[test]
    fn test_assignment_is_a_reference() {
        let src = "define(() => { Backbone = null; });";
        assert_eq!(deps_of(src, &[("Backbone", "backbone")]), vec!["backbone"]);
    }

    #[test]
    fn test_member_properties_are_ignored() {
        let src = "define(function () { return window.$; });";
        assert!(deps_of(src, &[("$", "jquery")]).is_empty());
    }

    #[test]
    fn test_aliases_sharing_a_module_are_deduplicated() {
        let src = "define(function () { jQuery('a'); $('b'); });";
        let found = deps_of(src, &[("$", "jquery"), ("jQuery", "jquery")]);
        assert_eq!(found, vec!["jquery"]);
    }
}
