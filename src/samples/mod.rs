//! Sample specification documents
//!
//! Each submodule is one namespace of spec classes built on the stock
//! catalog. They back the CLI `generate` command and the integration tests.

/// Accessor returning a fixed value
macro_rules! fixed {
    ($value:expr) => {{
        fn get(_: &$crate::spec::Spec) -> Result<$crate::value::Value, $crate::spec::SpecError> {
            Ok($crate::value::Value::from($value))
        }
        get
    }};
}

pub mod bank;
pub mod cmdline;
pub mod tictactoe;

use crate::aggregate::{Namespace, Registry, RegistryError};

/// Every sample namespace, in the order documents list them
pub static ALL: &[&Namespace] = &[&tictactoe::NAMESPACE, &bank::NAMESPACE, &cmdline::NAMESPACE];

/// Look up a sample namespace by its short name (`tictactoe`, `bank`, `cmdline`)
pub fn by_name(name: &str) -> Option<&'static Namespace> {
    ALL.iter()
        .copied()
        .find(|ns| ns.name.rsplit("::").next() == Some(name))
}

/// Registry holding the given sample namespaces
pub fn registry(names: &[&str]) -> Result<Registry, RegistryError> {
    let mut registry = Registry::new();
    for name in names {
        match by_name(name) {
            Some(namespace) => registry.register(namespace)?,
            None => return Err(RegistryError::Unknown { name: name.to_string() }),
        }
    }
    Ok(registry)
}

/// Registry holding every sample namespace
pub fn registry_all() -> Result<Registry, RegistryError> {
    let mut registry = Registry::new();
    for namespace in ALL.iter().copied() {
        registry.register(namespace)?;
    }
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_name() {
        assert_eq!(by_name("bank").map(|ns| ns.name), Some("docspec::samples::bank"));
        assert!(by_name("nope").is_none());
    }

    #[test]
    fn test_registry_unknown_sample() {
        let err = registry(&["tictactoe", "chess"]).unwrap_err();
        assert_eq!(err, RegistryError::Unknown { name: "chess".to_string() });
    }

    #[test]
    fn test_registry_all() {
        let registry = registry_all().unwrap();
        assert_eq!(registry.namespaces().len(), 3);
        assert!(registry.contains("docspec::samples::cmdline"));
    }
}
