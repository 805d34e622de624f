//! Explicit registration of the namespaces a document is built from

use thiserror::Error;

use crate::spec::SpecClass;

/// Errors that can occur while registering namespaces
#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    #[error("duplicate namespace registration: {name}")]
    Duplicate { name: String },

    #[error("unknown namespace: {name}")]
    Unknown { name: String },
}

/// A module's declared spec classes
///
/// `name` is the module path the classes belong to; classes declared
/// elsewhere (imported bases, for instance) may be listed but are not
/// discovered from this namespace.
#[derive(Debug)]
pub struct Namespace {
    pub name: &'static str,
    pub classes: &'static [&'static SpecClass],
}

impl Namespace {
    /// Classes declared directly in this namespace
    pub fn declared(&self) -> impl Iterator<Item = &'static SpecClass> + '_ {
        self.classes
            .iter()
            .copied()
            .filter(move |class| class.module == self.name)
    }
}

/// Namespaces in registration order
#[derive(Debug, Default)]
pub struct Registry {
    namespaces: Vec<&'static Namespace>,
}

impl Registry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a namespace
    pub fn register(&mut self, namespace: &'static Namespace) -> Result<(), RegistryError> {
        if self.contains(namespace.name) {
            return Err(RegistryError::Duplicate {
                name: namespace.name.to_string(),
            });
        }
        self.namespaces.push(namespace);
        Ok(())
    }

    /// Check if a namespace is registered
    pub fn contains(&self, name: &str) -> bool {
        self.namespaces.iter().any(|ns| ns.name == name)
    }

    pub fn namespaces(&self) -> &[&'static Namespace] {
        &self.namespaces
    }

    /// Forget every registered namespace
    pub fn clear(&mut self) {
        self.namespaces.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }
}
