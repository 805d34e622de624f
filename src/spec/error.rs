//! Errors raised while resolving, rendering and persisting specs

use std::path::PathBuf;

use thiserror::Error;

use crate::aggregate::RegistryError;
use crate::config::ConfigError;
use crate::error::TemplateError;
use crate::renderer::XmlError;

#[derive(Error, Debug)]
pub enum SpecError {
    /// A template placeholder has no accessor anywhere in the class chain
    #[error(
        "{type_name}: template variable '{placeholder}' is not bound \
         (used by {declared_in} at {file}:{line}); add an accessor named '{accessor}'"
    )]
    UnboundPlaceholder {
        placeholder: String,
        type_name: String,
        declared_in: String,
        file: String,
        line: u32,
        accessor: String,
    },

    #[error("{type_name}: accessor '{method}' declared by {declared_in} is not implemented")]
    Unimplemented {
        method: String,
        type_name: String,
        declared_in: String,
    },

    #[error("{type_name}: {error}")]
    Template {
        type_name: String,
        template: String,
        #[source]
        error: TemplateError,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("source map error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid XML in {}: {source}", path.display())]
    Xml {
        path: PathBuf,
        #[source]
        source: XmlError,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl SpecError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SpecError::Io {
            path: path.into(),
            source,
        }
    }

    /// Human-readable report, with source context for template errors
    pub fn report(&self) -> String {
        match self {
            SpecError::Template {
                type_name,
                template,
                error,
            } => error.format(template, type_name),
            other => other.to_string(),
        }
    }
}
