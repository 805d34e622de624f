//! Specification classes and their instances
//!
//! Classes are declared as statics ([`SpecClass`]) that link to their parent.
//! A [`Spec`] is one instance of a class; it resolves the inherited template,
//! binds placeholders to accessors and renders plain text or XML.

pub mod catalog;
mod class;
mod context;
mod error;
mod render;
mod resolver;

use std::cell::Cell;

pub use catalog::CONTEXT;
pub use class::{cleandoc, Accessor, AccessorFn, Field, Fragment, Location, MethodDecl, SpecClass};
pub use error::SpecError;
pub use resolver::TemplateProvider;

use crate::value::{Map, Value};

/// An instance of a spec class
#[derive(Debug)]
pub struct Spec {
    class: &'static SpecClass,
    /// Set while this instance is rendering
    rendering: Cell<bool>,
}

/// Clears the owning spec's rendering flag on drop
pub(crate) struct RenderGuard<'a> {
    flag: &'a Cell<bool>,
}

impl Drop for RenderGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

impl Spec {
    pub fn new(class: &'static SpecClass) -> Self {
        Self {
            class,
            rendering: Cell::new(false),
        }
    }

    pub fn class(&self) -> &'static SpecClass {
        self.class
    }

    pub fn type_name(&self) -> &'static str {
        self.class.name
    }

    /// Module path and type name, e.g. `docspec::samples::bank::BankApi`
    pub fn qualified_name(&self) -> String {
        format!("{}::{}", self.class.module, self.class.name)
    }

    pub fn merged_template(&self) -> String {
        self.class.merged_template()
    }

    pub fn notes(&self) -> String {
        self.class.instance_notes()
    }

    pub fn location(&self) -> Location {
        self.class.location
    }

    /// Mark this instance as rendering
    ///
    /// Returns `None` when it already is, so re-entrant calls can bail out.
    pub(crate) fn enter(&self) -> Option<RenderGuard<'_>> {
        if self.rendering.replace(true) {
            return None;
        }
        Some(RenderGuard {
            flag: &self.rendering,
        })
    }

    pub fn is_rendering(&self) -> bool {
        self.rendering.get()
    }

    /// Descriptors of the methods declared directly on this class
    pub fn methods(&self) -> Result<Value, SpecError> {
        let mut descriptors = Vec::with_capacity(self.class.methods.len());
        for method in self.class.methods {
            let description = method
                .doc
                .map(cleandoc)
                .unwrap_or_else(|| "No description provided".to_string());
            let source_ref = method.location.map(|location| {
                Map::new()
                    .with("name", method.name)
                    .with("file", location.display_path())
            });
            descriptors.push(Value::Map(
                Map::new()
                    .with("name", method.name)
                    .with("params", Value::list(method.params.iter().copied()))
                    .with("description", description)
                    .with("result", (method.example)(self)?)
                    .with("source_ref", source_ref),
            ));
        }
        Ok(Value::List(descriptors))
    }
}
