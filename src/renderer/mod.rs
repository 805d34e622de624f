//! Output generation: template evaluation and structured XML documents
//!
//! [`eval`] renders a parsed template against a context map, [`xml`] builds
//! and serializes the element trees of structured documents.

pub mod config;
pub mod eval;
pub mod xml;

pub use config::XmlConfig;
pub use eval::render;
pub use xml::{parse_document, value_to_element, write_document, Element, XmlError, XmlNode};
