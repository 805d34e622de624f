//! Plain-text and structured rendering of a spec instance

use tracing::{debug, warn};

use crate::renderer::{eval, value_to_element, write_document, Element, XmlConfig};
use crate::value::{Map, Value};

use super::{Spec, SpecError};

impl Spec {
    /// Instance notes followed by the rendered merged template
    ///
    /// A re-entrant call made while this instance is already rendering
    /// returns an empty string.
    pub fn render(&self) -> Result<String, SpecError> {
        let Some(_guard) = self.enter() else {
            debug!(spec = self.type_name(), "re-entrant render skipped");
            return Ok(String::new());
        };
        debug!(spec = self.type_name(), "rendering");
        let context = self.ctx()?;
        let body = self.render_source(&self.merged_template(), &context)?;
        Ok(join_sections(&self.notes(), &body))
    }

    /// Plain render wrapped in a `<source_ref>` marker when the declaring
    /// file can be located
    pub fn render_annotated(&self) -> Result<String, SpecError> {
        let text = self.render()?;
        let location = self.location();
        let Some(path) = location.resolve_path() else {
            warn!(spec = self.type_name(), file = location.file, "source file not found");
            return Ok(text);
        };
        let (start, end) = match self.class().doc {
            Some(doc) => (
                location.line.min(doc.location.line),
                location.line.max(doc.end_line()),
            ),
            None => (location.line, location.line),
        };
        Ok(format!(
            "<source_ref target=\"{}\" file=\"{}\" lines=\"{}-{}\">\n{}\n</source_ref>",
            self.type_name(),
            path.display(),
            start,
            end,
            text
        ))
    }

    /// Element tree of this spec, or `None` for a re-entrant call
    pub fn to_element(&self) -> Result<Option<Element>, SpecError> {
        let Some(_guard) = self.enter() else {
            debug!(spec = self.type_name(), "re-entrant serialization skipped");
            return Ok(None);
        };
        debug!(spec = self.type_name(), "serializing");

        let context = self.ctx_extended()?;
        let mut root = Element::new("specification").with_attr("type", self.type_name());

        if let Some(path) = self.location().resolve_path() {
            root.push(
                Element::new("source")
                    .with_attr("target", self.type_name())
                    .with_attr("file", path.display().to_string()),
            );
        }

        let body = self.render_source(&self.merged_template(), &context)?;
        if !body.is_empty() {
            root.push(Element::new("description").with_text(body));
        }

        let notes = self.render_source(&self.notes(), &context)?;
        if !notes.is_empty() {
            root.push(Element::new("notes").with_text(notes));
        }

        root.push(value_to_element("context", &Value::Map(context)));
        Ok(Some(root))
    }

    /// Structured document of this spec with default formatting
    pub fn render_xml(&self) -> Result<String, SpecError> {
        self.render_xml_with(&XmlConfig::default())
    }

    pub fn render_xml_with(&self, config: &XmlConfig) -> Result<String, SpecError> {
        Ok(self
            .to_element()?
            .map(|element| write_document(&element, config))
            .unwrap_or_default())
    }

    /// Render template text against a context, trimmed
    fn render_source(&self, source: &str, context: &Map) -> Result<String, SpecError> {
        if source.is_empty() {
            return Ok(String::new());
        }
        let template = self.parse_template(source)?;
        let text = eval::render(&template, context).map_err(|error| SpecError::Template {
            type_name: self.type_name().to_string(),
            template: source.to_string(),
            error,
        })?;
        Ok(text.trim().to_string())
    }
}

fn join_sections(notes: &str, body: &str) -> String {
    match (notes.trim(), body.trim()) {
        ("", body) => body.to_string(),
        (notes, "") => notes.to_string(),
        (notes, body) => format!("{}\n\n{}", notes, body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::parse_document;
    use crate::spec::{Accessor, SpecClass, CONTEXT};
    use pretty_assertions::assert_eq;

    fn name(_: &Spec) -> Result<Value, SpecError> {
        Ok(Value::from("TestName"))
    }

    fn data(_: &Spec) -> Result<Value, SpecError> {
        Ok(Value::Map(
            Map::new()
                .with("key1", "value1")
                .with(
                    "key2",
                    Value::List(vec![
                        Value::Int(1),
                        Value::Int(2),
                        Value::Map(Map::new().with("nested", "val")),
                    ]),
                )
                .with("dashed-key", "ok"),
        ))
    }

    fn myself(spec: &Spec) -> Result<Value, SpecError> {
        spec.render_xml().map(Value::from)
    }

    fn myself_text(spec: &Spec) -> Result<Value, SpecError> {
        spec.render().map(Value::from)
    }

    static TEST_BASE: SpecClass = SpecClass {
        parent: Some(&CONTEXT),
        doc: Some(crate::fragment!("Base description {{name}}")),
        ..SpecClass::base("TestBase", module_path!(), crate::location!())
    };

    static TEST_SPEC: SpecClass = SpecClass {
        parent: Some(&TEST_BASE),
        doc: Some(crate::fragment!("Instance notes for {{ name }}")),
        accessors: &[Accessor::new("name", name)],
        ..SpecClass::base("TestSpec", module_path!(), crate::location!())
    };

    static COMPLEX: SpecClass = SpecClass {
        parent: Some(&CONTEXT),
        doc: Some(crate::fragment!("Doc")),
        accessors: &[Accessor::new("data", data)],
        ..SpecClass::base("ComplexCtx", module_path!(), crate::location!())
    };

    static RECURSIVE: SpecClass = SpecClass {
        parent: Some(&CONTEXT),
        doc: Some(crate::fragment!("Calls itself")),
        accessors: &[Accessor::new("me", myself), Accessor::new("me_text", myself_text)],
        ..SpecClass::base("Recursive", module_path!(), crate::location!())
    };

    static NOTHING: SpecClass = SpecClass {
        parent: Some(&CONTEXT),
        ..SpecClass::base("Nothing", module_path!(), crate::location!())
    };

    #[test]
    fn test_render_notes_then_body() {
        let spec = Spec::new(&TEST_SPEC);
        assert_eq!(
            spec.render().unwrap(),
            "Instance notes for {{ name }}\n\nBase description TestName"
        );
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(Spec::new(&NOTHING).render().unwrap(), "");
    }

    #[test]
    fn test_render_xml_basic() {
        let xml = Spec::new(&TEST_SPEC).render_xml().unwrap();
        let root = parse_document(&xml).unwrap();

        assert_eq!(root.name, "specification");
        assert_eq!(root.attr("type"), Some("TestSpec"));

        let source = root.find("source").expect("source element");
        assert_eq!(source.attr("target"), Some("TestSpec"));
        assert!(source.attr("file").unwrap().ends_with("render.rs"));
        assert!(source.attr("lines").is_none());

        assert_eq!(root.find("description").unwrap().text(), "Base description TestName");
        assert_eq!(root.find("notes").unwrap().text(), "Instance notes for TestName");
        assert_eq!(
            root.find("context").unwrap().find("name").unwrap().text(),
            "TestName"
        );
    }

    #[test]
    fn test_render_xml_complex_data() {
        let xml = Spec::new(&COMPLEX).render_xml().unwrap();
        let root = parse_document(&xml).unwrap();
        assert!(root.find("description").is_none());

        let data = root.find("context").unwrap().find("data").unwrap();
        assert_eq!(data.find("key1").unwrap().text(), "value1");
        let items: Vec<_> = data.find("key2").unwrap().find_all("item").collect();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].text(), "1");
        assert_eq!(items[1].text(), "2");
        assert_eq!(items[2].find("nested").unwrap().text(), "val");
        assert_eq!(data.find("dashed_key").unwrap().text(), "ok");
    }

    #[test]
    fn test_recursion_yields_empty_entry() {
        let spec = Spec::new(&RECURSIVE);
        let xml = spec.render_xml().unwrap();
        let root = parse_document(&xml).unwrap();
        let context = root.find("context").unwrap();
        let me = context.find("me").expect("entry should be present");
        assert!(me.children.is_empty());
        assert!(context.find("me_text").unwrap().children.is_empty());

        assert!(!spec.is_rendering());
        assert_eq!(spec.render_xml().unwrap(), xml);
    }

    #[test]
    fn test_idempotent() {
        let spec = Spec::new(&TEST_SPEC);
        assert_eq!(spec.render().unwrap(), spec.render().unwrap());
        assert_eq!(spec.render_xml().unwrap(), spec.render_xml().unwrap());
    }

    #[test]
    fn test_guard_cleared_after_error() {
        static BROKEN: SpecClass = SpecClass {
            parent: Some(&CONTEXT),
            doc: Some(crate::fragment!("{{ missing }}")),
            ..SpecClass::base("BrokenBase", module_path!(), crate::location!())
        };
        static BROKEN_LEAF: SpecClass = SpecClass {
            parent: Some(&BROKEN),
            ..SpecClass::base("BrokenLeaf", module_path!(), crate::location!())
        };
        let spec = Spec::new(&BROKEN_LEAF);
        assert!(spec.render_xml().is_err());
        assert!(!spec.is_rendering());
        assert!(spec.render().is_err());
    }

    #[test]
    fn test_render_annotated() {
        let text = Spec::new(&TEST_SPEC).render_annotated().unwrap();
        assert!(text.starts_with("<source_ref target=\"TestSpec\" file=\""));
        assert!(text.contains("lines=\""));
        assert!(text.ends_with("Base description TestName\n</source_ref>"));
    }

    #[test]
    fn test_join_sections() {
        assert_eq!(join_sections("", ""), "");
        assert_eq!(join_sections("  notes \n", ""), "notes");
        assert_eq!(join_sections("", "\nbody\n"), "body");
        assert_eq!(join_sections("n", "b"), "n\n\nb");
    }
}
