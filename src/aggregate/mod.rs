//! Document aggregation over registered namespaces
//!
//! Discovery, instantiation and output are synchronous and stateless: each
//! call walks the registry again. A failing spec fails the whole document.

mod registry;
mod source_map;

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::config::Config;
use crate::query::{LineLocation, SourceMap, SourceMapEntry, SpecLocation};
use crate::renderer::{write_document, Element, XmlConfig};
use crate::spec::{Spec, SpecClass, SpecError, CONTEXT};

pub use registry::{Namespace, Registry, RegistryError};
pub use source_map::{snake_case, WorkspaceIndex};

/// Name of the source map written next to structured documents
pub const SOURCE_MAP_FILE: &str = "source_map.json";

/// Hex digits of the content hash used in document file names
const HASH_PREFIX_LEN: usize = 20;

/// Builds combined documents from every spec in a registry
pub struct Aggregator<'r> {
    registry: &'r Registry,
    config: Config,
}

impl<'r> Aggregator<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self::with_config(registry, Config::default())
    }

    pub fn with_config(registry: &'r Registry, config: Config) -> Self {
        Self { registry, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Spec classes declared in the registered namespaces, in declaration
    /// order; the root marker itself is never included
    pub fn discover(&self) -> Vec<&'static SpecClass> {
        self.registry
            .namespaces()
            .iter()
            .copied()
            .flat_map(|ns| ns.declared())
            .filter(|class| class.descends_from(&CONTEXT))
            .collect()
    }

    pub fn instantiate(&self) -> Vec<Spec> {
        let specs: Vec<Spec> = self.discover().into_iter().map(Spec::new).collect();
        debug!(count = specs.len(), "instantiated specs");
        specs
    }

    /// Plain renders, each preceded by a rule line
    pub fn generate_text(&self) -> Result<String, SpecError> {
        let rule = "-".repeat(self.config.output.rule_width);
        let mut out = String::new();
        for spec in self.instantiate() {
            let text = if self.config.output.annotate_sources {
                spec.render_annotated()?
            } else {
                spec.render()?
            };
            out.push_str(&rule);
            out.push('\n');
            out.push_str(&text);
            out.push('\n');
        }
        Ok(out)
    }

    /// `specification_set` element holding every spec's element
    pub fn to_element(&self) -> Result<Element, SpecError> {
        let mut root = Element::new("specification_set");
        for spec in self.instantiate() {
            if let Some(element) = spec.to_element()? {
                root.push(element);
            }
        }
        Ok(root)
    }

    pub fn xml_config(&self) -> XmlConfig {
        XmlConfig::new()
            .with_declaration(true)
            .with_indent(self.config.output.indent)
    }

    pub fn generate_xml(&self) -> Result<String, SpecError> {
        Ok(write_document(&self.to_element()?, &self.xml_config()))
    }

    /// Write the structured document to `spec-<hash>.xml` in `dir`
    pub fn write_xml(&self, dir: &Path) -> Result<PathBuf, SpecError> {
        let xml = self.generate_xml()?;
        std::fs::create_dir_all(dir).map_err(|e| SpecError::io(dir, e))?;

        let path = dir.join(document_file_name(&xml));
        std::fs::write(&path, &xml).map_err(|e| SpecError::io(&path, e))?;
        info!(path = %path.display(), bytes = xml.len(), "wrote structured document");
        Ok(path)
    }

    /// Write `source_map.json` for a document written by [`Self::write_xml`]
    ///
    /// Without a workspace, candidate source locations are left empty.
    pub fn write_source_map(
        &self,
        dir: &Path,
        xml_path: &Path,
        workspace: Option<&Path>,
    ) -> Result<PathBuf, SpecError> {
        let map = self.source_map(xml_path, workspace)?;
        std::fs::create_dir_all(dir).map_err(|e| SpecError::io(dir, e))?;

        let path = dir.join(SOURCE_MAP_FILE);
        std::fs::write(&path, map.to_json()?).map_err(|e| SpecError::io(&path, e))?;
        info!(path = %path.display(), entries = map.entries.len(), "wrote source map");
        Ok(path)
    }

    /// Source map records in document order
    pub fn source_map(&self, xml_path: &Path, workspace: Option<&Path>) -> Result<SourceMap, SpecError> {
        let xml = std::fs::read_to_string(xml_path).map_err(|e| SpecError::io(xml_path, e))?;
        let element_lines = specification_lines(&xml);
        let index = workspace.map(|root| WorkspaceIndex::build(root, &self.config.index));

        let entries = self
            .instantiate()
            .iter()
            .enumerate()
            .map(|(i, spec)| SourceMapEntry {
                component: spec.type_name().to_string(),
                spec_location: spec_location(spec),
                structured_location: element_lines.get(i).map(|&line| LineLocation {
                    file: xml_path.display().to_string(),
                    line,
                }),
                candidate_source_locations: index
                    .as_ref()
                    .map(|index| index.candidates(spec.type_name()))
                    .unwrap_or_default(),
            })
            .collect();
        Ok(SourceMap::new(entries))
    }
}

/// `spec-<first 20 hex digits of the SHA-256 of content>.xml`
pub fn document_file_name(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    format!("spec-{}.xml", &digest[..HASH_PREFIX_LEN])
}

/// 1-based lines of each `<specification>` start tag
fn specification_lines(xml: &str) -> Vec<usize> {
    xml.lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim_start();
            line.starts_with("<specification ") || line.starts_with("<specification>")
        })
        .map(|(i, _)| i + 1)
        .collect()
}

fn spec_location(spec: &Spec) -> Option<SpecLocation> {
    let location = spec.location();
    let path = location.resolve_path()?;
    let (start, end) = match spec.class().doc {
        Some(doc) => (
            location.line.min(doc.location.line),
            location.line.max(doc.end_line()),
        ),
        None => (location.line, location.line),
    };
    Some(SpecLocation {
        file: path.display().to_string(),
        start_line: start,
        end_line: end,
        target: spec.type_name().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::parse_document;
    use crate::spec::catalog::{FEATURE, REQUIREMENT};
    use crate::spec::{Accessor, SpecClass};
    use crate::value::Value;
    use pretty_assertions::assert_eq;

    fn one(_: &Spec) -> Result<Value, SpecError> {
        Ok(Value::Int(1))
    }

    static FIRST: SpecClass = SpecClass {
        parent: Some(&FEATURE),
        doc: Some(crate::fragment!("Doc")),
        accessors: &[Accessor::new("val", one)],
        ..SpecClass::base("MyFeature", module_path!(), crate::location!())
    };

    static SECOND: SpecClass = SpecClass {
        parent: Some(&REQUIREMENT),
        ..SpecClass::base("SecondReq", module_path!(), crate::location!())
    };

    static THIRD: SpecClass = SpecClass {
        parent: Some(&REQUIREMENT),
        doc: Some(crate::fragment!("Third notes")),
        ..SpecClass::base("ThirdReq", module_path!(), crate::location!())
    };

    static NAMESPACE: Namespace = Namespace {
        name: module_path!(),
        classes: &[&FIRST, &SECOND, &THIRD, &REQUIREMENT],
    };

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry.register(&NAMESPACE).unwrap();
        registry
    }

    #[test]
    fn test_discover_in_declaration_order() {
        let registry = registry();
        let names: Vec<&str> = Aggregator::new(&registry)
            .discover()
            .iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["MyFeature", "SecondReq", "ThirdReq"]);
    }

    #[test]
    fn test_generate_text_has_three_sections() {
        let registry = registry();
        let text = Aggregator::new(&registry).generate_text().unwrap();
        let rule = "-".repeat(80);
        assert_eq!(text.matches(&rule).count(), 3);
        let first = text.find("MyFeature").unwrap();
        let second = text.find("TITLE: SecondReq").unwrap();
        let third = text.find("Third notes").unwrap();
        assert!(first < second && second < third);
    }

    #[test]
    fn test_generate_xml_has_three_specifications() {
        let registry = registry();
        let xml = Aggregator::new(&registry).generate_xml().unwrap();
        assert!(xml.starts_with("<?xml"));
        let root = parse_document(&xml).unwrap();
        assert_eq!(root.name, "specification_set");
        let specs: Vec<_> = root.find_all("specification").collect();
        assert_eq!(specs.len(), 3);
        assert_eq!(specs[0].attr("type"), Some("MyFeature"));
        assert_eq!(
            specs[0].find("context").unwrap().find("val").unwrap().text(),
            "1"
        );
    }

    #[test]
    fn test_write_xml_content_addressed() {
        let registry = registry();
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("specs");
        let aggregator = Aggregator::new(&registry);

        let path = aggregator.write_xml(&out).unwrap();
        let name = path.file_name().unwrap().to_str().unwrap().to_string();
        assert!(name.starts_with("spec-") && name.ends_with(".xml"));
        assert_eq!(name.len(), "spec-".len() + 20 + ".xml".len());

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(document_file_name(&content), name);
        assert_eq!(aggregator.write_xml(&out).unwrap(), path);
    }

    #[test]
    fn test_source_map_records() {
        let registry = registry();
        let dir = tempfile::tempdir().unwrap();
        let aggregator = Aggregator::new(&registry);
        let xml_path = aggregator.write_xml(dir.path()).unwrap();

        let workspace = dir.path().join("ws");
        std::fs::create_dir(&workspace).unwrap();
        std::fs::write(workspace.join("impl.rs"), "// implements ThirdReq\nfn third_req() {}\n").unwrap();

        let map_path = aggregator
            .write_source_map(dir.path(), &xml_path, Some(&workspace))
            .unwrap();
        assert_eq!(map_path.file_name().unwrap(), SOURCE_MAP_FILE);

        let map = SourceMap::load(&map_path).unwrap();
        assert_eq!(map.entries.len(), 3);
        assert_eq!(map.entries[0].component, "MyFeature");

        let xml = std::fs::read_to_string(&xml_path).unwrap();
        let lines: Vec<&str> = xml.lines().collect();
        for entry in &map.entries {
            let location = entry.structured_location.as_ref().unwrap();
            let line = lines[location.line - 1];
            assert!(line.contains(&format!("type=\"{}\"", entry.component)));
            assert!(entry.spec_location.as_ref().unwrap().file.ends_with("mod.rs"));
        }

        let third = &map.entries[2];
        assert_eq!(third.candidate_source_locations.len(), 2);
        assert!(map.entries[1].candidate_source_locations.is_empty());
    }

    #[test]
    fn test_source_map_without_workspace() {
        let registry = registry();
        let dir = tempfile::tempdir().unwrap();
        let aggregator = Aggregator::new(&registry);
        let xml_path = aggregator.write_xml(dir.path()).unwrap();
        let map = aggregator.source_map(&xml_path, None).unwrap();
        assert!(map.entries.iter().all(|e| e.candidate_source_locations.is_empty()));
    }

    #[test]
    fn test_failing_spec_fails_aggregation() {
        static BROKEN: SpecClass = SpecClass {
            parent: Some(&crate::spec::catalog::EDGE_CASE),
            ..SpecClass::base("Broken", module_path!(), crate::location!())
        };
        static BROKEN_NS: Namespace = Namespace {
            name: module_path!(),
            classes: &[&FIRST, &BROKEN],
        };
        let mut registry = Registry::new();
        registry.register(&BROKEN_NS).unwrap();
        let aggregator = Aggregator::new(&registry);
        assert!(aggregator.generate_text().is_err());
        assert!(aggregator.generate_xml().is_err());
    }
}
