//! docspec - specification documents rendered from typed declarations
//!
//! Spec classes are declared as statics that link to a parent class. The
//! documentation fragments of a class's ancestors form a template, and the
//! class's accessors supply the values. A spec renders as plain text or as a
//! deterministic XML element tree; the aggregator combines every spec of a
//! set of namespaces into one document.
//!
//! # Example
//!
//! ```rust
//! use docspec::spec::{catalog::REQUIREMENT, Accessor, Spec, SpecClass, SpecError};
//! use docspec::Value;
//!
//! fn title(_: &Spec) -> Result<Value, SpecError> {
//!     Ok(Value::from("Local Play"))
//! }
//!
//! static LOCAL_PLAY: SpecClass = SpecClass {
//!     parent: Some(&REQUIREMENT),
//!     accessors: &[Accessor::new("title", title)],
//!     ..SpecClass::base("LocalPlay", module_path!(), docspec::location!())
//! };
//!
//! let text = Spec::new(&LOCAL_PLAY).render().unwrap();
//! assert!(text.contains("TITLE: Local Play"));
//! ```

pub mod aggregate;
pub mod config;
pub mod diff;
pub mod error;
pub mod parser;
pub mod query;
pub mod renderer;
pub mod samples;
pub mod spec;
pub mod value;

pub use aggregate::{Aggregator, Namespace, Registry, RegistryError};
pub use config::{Config, ConfigError};
pub use diff::{diff_documents, diff_files, latest_pair, DiffReport};
pub use error::TemplateError;
pub use query::{SourceMap, SourceMapEntry};
pub use renderer::XmlConfig;
pub use spec::{Spec, SpecClass, SpecError};
pub use value::{Map, Value};

/// Render template source against a context
///
/// # Example
///
/// ```rust
/// use docspec::{render_template, Map};
///
/// let context = Map::new().with("names", vec!["a", "b"]);
/// let text = render_template("{{ names|join(', ') }}", &context).unwrap();
/// assert_eq!(text, "a, b");
/// ```
pub fn render_template(source: &str, context: &Map) -> Result<String, TemplateError> {
    let template = parser::parse(source).map_err(|errors| {
        errors.into_iter().next().unwrap_or(TemplateError::Syntax {
            span: 0..source.len(),
            message: "invalid template".to_string(),
            expected: Vec::new(),
        })
    })?;
    renderer::render(&template, context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_template() {
        let context = Map::new().with("x", 3).with("items", vec!["p", "q"]);
        let text = render_template(
            "x={{x}}\n{% for i in items %}\n- {{ i|upper }}\n{% endfor %}\n",
            &context,
        )
        .unwrap();
        assert_eq!(text, "x=3\n- P\n- Q\n");
    }

    #[test]
    fn test_render_template_syntax_error() {
        let err = render_template("{% if x %}open", &Map::new()).unwrap_err();
        assert!(matches!(err, TemplateError::Syntax { .. }));
    }

    #[test]
    fn test_render_template_undefined() {
        let err = render_template("{{ missing }}", &Map::new()).unwrap_err();
        assert!(matches!(err, TemplateError::UndefinedVariable { .. }));
    }
}
