//! Locates AMD `define(...)` / `require(...)` call sites in a parsed script.

use std::ops::Range;

use swc_core::{
    common::Spanned,
    ecma::{
        ast::{CallExpr, Callee, Expr, ExprOrSpread, Lit, Stmt},
        visit::{Visit, VisitWith},
    },
};

use crate::parse::ParsedScript;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Define,
    Require,
}

impl CallKind {
    fn from_callee(callee: &Callee) -> Option<Self> {
        let Callee::Expr(expr) = callee else {
            return None;
        };
        match &**expr {
            Expr::Ident(id) => match &*id.sym {
                "define" => Some(Self::Define),
                "require" => Some(Self::Require),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Define => "define",
            Self::Require => "require",
        }
    }
}

/// One AMD call site. All ranges are byte offsets into the original source.
#[derive(Debug, Clone)]
pub struct RequireCall {
    pub kind: CallKind,
    pub callee_range: Range<usize>,
    /// From the end of the callee to the end of the call, parentheses included.
    pub arguments_range: Range<usize>,
    pub argument_ranges: Vec<Range<usize>>,
    pub has_dependency_array: bool,
    pub has_spread_argument: bool,
    /// Innermost statement around the call. Edits for this call must land
    /// inside it.
    pub enclosing_statement_range: Range<usize>,
    /// The last argument, when it is a function or arrow literal.
    pub factory: Option<Box<Expr>>,
}

impl RequireCall {
    pub fn argument_count(&self) -> usize {
        self.argument_ranges.len()
    }

    pub fn last_argument_range(&self) -> Option<&Range<usize>> {
        self.argument_ranges.last()
    }
}

/// Every `define`/`require` invocation in `parsed`, in source order.
///
/// Only the literal identifiers are recognised; `window.require(...)` or a
/// renamed alias is not an AMD call here.
pub fn extract_calls(parsed: &ParsedScript<'_>) -> Vec<RequireCall> {
    let mut extractor = CallSiteExtractor {
        parsed,
        statements: vec![],
        calls: vec![],
    };
    parsed.program.visit_with(&mut extractor);
    extractor.calls
}

struct CallSiteExtractor<'p, 's> {
    parsed: &'p ParsedScript<'s>,
    // innermost last
    statements: Vec<Range<usize>>,
    calls: Vec<RequireCall>,
}

impl CallSiteExtractor<'_, '_> {
    fn describe(&self, kind: CallKind, call: &CallExpr) -> RequireCall {
        let callee_range = self.parsed.range(call.callee.span());
        let call_range = self.parsed.range(call.span);
        let argument_ranges = call
            .args
            .iter()
            .map(|arg| self.parsed.range(arg.span()))
            .collect();

        RequireCall {
            kind,
            arguments_range: callee_range.end..call_range.end,
            callee_range,
            argument_ranges,
            has_dependency_array: declares_dependency_array(&call.args),
            has_spread_argument: call.args.iter().any(|a| a.spread.is_some()),
            enclosing_statement_range: self.statements.last().cloned().unwrap_or(call_range),
            factory: call.args.last().and_then(factory_of),
        }
    }
}

impl Visit for CallSiteExtractor<'_, '_> {
    fn visit_stmt(&mut self, n: &Stmt) {
        self.statements.push(self.parsed.range(n.span()));
        n.visit_children_with(self);
        self.statements.pop();
    }

    fn visit_call_expr(&mut self, n: &CallExpr) {
        if let Some(kind) = CallKind::from_callee(&n.callee) {
            let call = self.describe(kind, n);
            self.calls.push(call);
        }
        // nested calls get their own entries
        n.visit_children_with(self);
    }
}

/// A leading module name (`define('id', ...)`) is skipped; the dependency
/// array, if any, is the first argument after it.
fn declares_dependency_array(args: &[ExprOrSpread]) -> bool {
    args.iter()
        .find(|arg| !matches!(&*arg.expr, Expr::Lit(Lit::Str(_))))
        .is_some_and(|arg| arg.spread.is_none() && matches!(&*arg.expr, Expr::Array(_)))
}

fn factory_of(arg: &ExprOrSpread) -> Option<Box<Expr>> {
    if arg.spread.is_some() {
        return None;
    }
    let mut expr = &*arg.expr;
    while let Expr::Paren(p) = expr {
        expr = &*p.expr;
    }
    match expr {
        Expr::Fn(_) | Expr::Arrow(_) => Some(Box::new(expr.clone())),
        _ => None,
    }
}
