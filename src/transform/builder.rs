use crate::error::UnsupportedCallShape;
use crate::extract::RequireCall;

use super::{discover_dependencies, TransformConfig, Transformation};

/// Turns call sites without a dependency array into the edits that add one.
pub struct TransformationSetBuilder<'c> {
    config: &'c TransformConfig,
}

impl<'c> TransformationSetBuilder<'c> {
    pub fn new(config: &'c TransformConfig) -> Self {
        Self { config }
    }

    /// Edits for `call`, empty when it already declares its dependencies.
    ///
    /// A call must have somewhere to put the array: at least one argument, no
    /// spread, and when there is only one argument it has to be the factory
    /// function itself (`define(function () {})`). `define(factory)` or
    /// `require('x')` are left alone.
    pub fn build(&self, call: &RequireCall) -> Result<Vec<Transformation>, UnsupportedCallShape> {
        if call.has_dependency_array {
            return Ok(vec![]);
        }
        if call.has_spread_argument {
            return Err(UnsupportedCallShape::SpreadArgument);
        }
        let last = call
            .last_argument_range()
            .ok_or(UnsupportedCallShape::NoArguments)?;
        if call.argument_count() == 1 && call.factory.is_none() {
            return Err(UnsupportedCallShape::SoleArgumentNotFactory);
        }

        let scope = &call.enclosing_statement_range;
        let mut set = vec![Transformation::AddEmptyDepsArray {
            scope: scope.clone(),
            insert_at: last.start,
        }];

        if self.config.auto_dependencies {
            let modules = call
                .factory
                .as_deref()
                .map(|factory| discover_dependencies(factory, &self.config.aliases))
                .unwrap_or_default();
            set.push(Transformation::FillDependencies {
                scope: scope.clone(),
                array_at: last.start,
                modules,
            });
        }

        Ok(set)
    }
}
