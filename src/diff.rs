//! Human-readable differences between two structured documents
//!
//! Children are matched by tag, `type` attribute and occurrence, so
//! reordering alone is not reported. Changes are grouped by the nearest
//! enclosing `specification` element of the newer document.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::debug;

use crate::renderer::{parse_document, Element};
use crate::spec::SpecError;

/// Tags whose insertion is structural noise
const BOILERPLATE: &[&str] = &[
    "specification_set",
    "specification",
    "source",
    "context",
    "notes",
    "description",
    "req_id",
    "title",
];

/// Group label for changes outside any specification
pub const GENERAL: &str = "General System";

/// A raw edit between two element trees
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    InsertNode { tag: String },
    DeleteNode { tag: String },
    UpdateText { tag: String, text: String },
    InsertAttribute { tag: String, name: String, value: String },
    UpdateAttribute { tag: String, name: String, value: String },
    DeleteAttribute { tag: String, name: String },
}

impl Change {
    /// Description for readers, or `None` for structural noise
    pub fn describe(&self) -> Option<String> {
        match self {
            Change::InsertNode { tag } if BOILERPLATE.contains(&tag.as_str()) => None,
            Change::InsertNode { tag } => Some(format!("Added new {} element", tag)),
            Change::UpdateText { tag, text } => {
                let text = text.trim().replace('\n', " ");
                Some(match tag.as_str() {
                    "description" => format!("Updated description: \"{}\"", text),
                    "notes" => format!("Updated requirements: \"{}\"", text),
                    "req_id" => format!("Updated cross-reference ID: {}", text),
                    "title" => format!("Updated title: {}", text),
                    _ => format!("Updated {} text to \"{}\"", tag, text),
                })
            }
            Change::InsertAttribute { name, value, .. } => Some(match name.as_str() {
                "type" => format!("Defined component type as '{}'", value),
                "file" => format!("Set source file to '{}'", value),
                "lines" => format!("Set source lines to {}", value),
                "target" => format!("Set tracking target to '{}'", value),
                _ => format!("Added attribute {}='{}'", name, value),
            }),
            Change::DeleteNode { .. }
            | Change::UpdateAttribute { .. }
            | Change::DeleteAttribute { .. } => None,
        }
    }
}

/// Readable changes grouped by component, in order of first appearance
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DiffReport {
    pub groups: Vec<(String, Vec<String>)>,
}

impl DiffReport {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    fn add(&mut self, component: &str, line: String) {
        match self.groups.iter_mut().find(|(c, _)| c == component) {
            Some((_, lines)) => lines.push(line),
            None => self.groups.push((component.to_string(), vec![line])),
        }
    }
}

impl fmt::Display for DiffReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.groups.is_empty() {
            return writeln!(f, "No changes detected.");
        }
        for (i, (component, lines)) in self.groups.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "COMPONENT: {}", component)?;
            for line in lines {
                writeln!(f, "  - {}", line)?;
            }
        }
        Ok(())
    }
}

/// Raw changes from `old` to `new`, each with its component label
pub fn diff_elements(old: &Element, new: &Element) -> Vec<(String, Change)> {
    let mut changes = Vec::new();
    let component = component_of(new, GENERAL);
    diff_matched(old, new, &component, &mut changes);
    changes
}

/// Readable report of the changes from `old` to `new`
pub fn diff_documents(old: &Element, new: &Element) -> DiffReport {
    let mut report = DiffReport::default();
    for (component, change) in diff_elements(old, new) {
        if let Some(line) = change.describe() {
            report.add(&component, line);
        }
    }
    report
}

pub fn diff_files(old: &Path, new: &Path) -> Result<DiffReport, SpecError> {
    let old_root = load(old)?;
    let new_root = load(new)?;
    Ok(diff_documents(&old_root, &new_root))
}

/// The two most recently modified `*.xml` files in `dir`, older first
pub fn latest_pair(dir: &Path) -> Result<Option<(PathBuf, PathBuf)>, SpecError> {
    let entries = std::fs::read_dir(dir).map_err(|e| SpecError::io(dir, e))?;
    let mut files: Vec<(SystemTime, PathBuf)> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| SpecError::io(dir, e))?;
        let path = entry.path();
        if !path.is_file() || path.extension().map_or(true, |ext| ext != "xml") {
            continue;
        }
        let modified = entry
            .metadata()
            .and_then(|m| m.modified())
            .map_err(|e| SpecError::io(&path, e))?;
        files.push((modified, path));
    }
    files.sort();
    debug!(dir = %dir.display(), count = files.len(), "found structured documents");

    let mut latest = files.into_iter().rev().map(|(_, path)| path);
    match (latest.next(), latest.next()) {
        (Some(newer), Some(older)) => Ok(Some((older, newer))),
        _ => Ok(None),
    }
}

/// Diff the two newest documents in `dir`
pub fn diff_latest(dir: &Path) -> Result<Option<(PathBuf, PathBuf, DiffReport)>, SpecError> {
    let Some((older, newer)) = latest_pair(dir)? else {
        return Ok(None);
    };
    let report = diff_files(&older, &newer)?;
    Ok(Some((older, newer, report)))
}

fn load(path: &Path) -> Result<Element, SpecError> {
    let content = std::fs::read_to_string(path).map_err(|e| SpecError::io(path, e))?;
    parse_document(&content).map_err(|source| SpecError::Xml {
        path: path.to_path_buf(),
        source,
    })
}

/// Label of `element` when it is a specification, else `outer`
fn component_of(element: &Element, outer: &str) -> String {
    if element.name != "specification" {
        return outer.to_string();
    }
    if let Some(ty) = element.attr("type") {
        return format!("[{}]", ty);
    }
    match find_descendant(element, "title") {
        Some(title) => format!("[{}]", title.text().trim()),
        None => "[Specification]".to_string(),
    }
}

fn find_descendant<'a>(element: &'a Element, name: &str) -> Option<&'a Element> {
    element.elements().find_map(|child| {
        if child.name == name {
            Some(child)
        } else {
            find_descendant(child, name)
        }
    })
}

type Key<'a> = (&'a str, Option<&'a str>, usize);

/// Children keyed by tag, `type` attribute and occurrence
fn keyed(element: &Element) -> Vec<(Key<'_>, &Element)> {
    let mut seen: HashMap<(&str, Option<&str>), usize> = HashMap::new();
    element
        .elements()
        .map(|child| {
            let base = (child.name.as_str(), child.attr("type"));
            let count = seen.entry(base).or_insert(0);
            let key = (base.0, base.1, *count);
            *count += 1;
            (key, child)
        })
        .collect()
}

fn diff_matched(old: &Element, new: &Element, component: &str, out: &mut Vec<(String, Change)>) {
    let component = component_of(new, component);
    let push = |out: &mut Vec<(String, Change)>, change| out.push((component.clone(), change));

    for (name, value) in &new.attributes {
        match old.attr(name) {
            None => push(
                out,
                Change::InsertAttribute {
                    tag: new.name.clone(),
                    name: name.clone(),
                    value: value.clone(),
                },
            ),
            Some(previous) if previous != value => push(
                out,
                Change::UpdateAttribute {
                    tag: new.name.clone(),
                    name: name.clone(),
                    value: value.clone(),
                },
            ),
            Some(_) => {}
        }
    }
    for (name, _) in &old.attributes {
        if new.attr(name).is_none() {
            push(
                out,
                Change::DeleteAttribute {
                    tag: new.name.clone(),
                    name: name.clone(),
                },
            );
        }
    }

    let (old_text, new_text) = (old.text(), new.text());
    if old_text.trim() != new_text.trim() {
        push(
            out,
            Change::UpdateText {
                tag: new.name.clone(),
                text: new_text,
            },
        );
    }

    let old_children = keyed(old);
    let new_children = keyed(new);
    for (key, child) in &new_children {
        match old_children.iter().find(|(k, _)| k == key) {
            Some((_, previous)) => diff_matched(previous, child, &component, out),
            None => inserted(child, &component, out),
        }
    }
    for (key, child) in &old_children {
        if !new_children.iter().any(|(k, _)| k == key) {
            push(
                out,
                Change::DeleteNode {
                    tag: child.name.clone(),
                },
            );
        }
    }
}

fn inserted(element: &Element, component: &str, out: &mut Vec<(String, Change)>) {
    let component = component_of(element, component);
    out.push((
        component.clone(),
        Change::InsertNode {
            tag: element.name.clone(),
        },
    ));
    for (name, value) in &element.attributes {
        out.push((
            component.clone(),
            Change::InsertAttribute {
                tag: element.name.clone(),
                name: name.clone(),
                value: value.clone(),
            },
        ));
    }
    let text = element.text();
    if !text.trim().is_empty() {
        out.push((
            component.clone(),
            Change::UpdateText {
                tag: element.name.clone(),
                text,
            },
        ));
    }
    for child in element.elements() {
        inserted(child, &component, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn spec(ty: &str, description: &str) -> Element {
        Element::new("specification")
            .with_attr("type", ty)
            .with_child(Element::new("description").with_text(description))
            .with_child(
                Element::new("context").with_child(Element::new("title").with_text(ty)),
            )
    }

    fn set(specs: Vec<Element>) -> Element {
        let mut root = Element::new("specification_set");
        for s in specs {
            root.push(s);
        }
        root
    }

    #[test]
    fn test_identical_documents() {
        let doc = set(vec![spec("A", "one"), spec("B", "two")]);
        assert!(diff_documents(&doc, &doc).is_empty());
        assert_eq!(diff_documents(&doc, &doc).to_string(), "No changes detected.\n");
    }

    #[test]
    fn test_reordering_is_not_a_change() {
        let old = set(vec![spec("A", "one"), spec("B", "two")]);
        let new = set(vec![spec("B", "two"), spec("A", "one")]);
        assert!(diff_elements(&old, &new).is_empty());
    }

    #[test]
    fn test_updated_description() {
        let old = set(vec![spec("A", "one"), spec("B", "two")]);
        let new = set(vec![spec("A", "one"), spec("B", "two\nlines")]);
        let report = diff_documents(&old, &new);
        assert_eq!(
            report.groups,
            vec![("[B]".to_string(), vec!["Updated description: \"two lines\"".to_string()])]
        );
        assert_eq!(
            report.to_string(),
            "COMPONENT: [B]\n  - Updated description: \"two lines\"\n"
        );
    }

    #[test]
    fn test_inserted_spec() {
        let old = set(vec![spec("A", "one")]);
        let new = set(vec![
            spec("A", "one"),
            spec("C", "three").with_child(Element::new("source").with_attr("file", "/x.rs")),
        ]);
        let report = diff_documents(&old, &new);
        assert_eq!(report.groups.len(), 1);
        let (component, lines) = &report.groups[0];
        assert_eq!(component, "[C]");
        assert_eq!(
            lines,
            &vec![
                "Defined component type as 'C'".to_string(),
                "Updated description: \"three\"".to_string(),
                "Updated title: C".to_string(),
                "Set source file to '/x.rs'".to_string(),
            ]
        );
    }

    #[test]
    fn test_deletions_are_noise() {
        let old = set(vec![spec("A", "one"), spec("B", "two")]);
        let new = set(vec![spec("A", "one")]);
        assert!(diff_elements(&old, &new)
            .iter()
            .any(|(_, c)| matches!(c, Change::DeleteNode { .. })));
        assert!(diff_documents(&old, &new).is_empty());
    }

    #[test]
    fn test_context_value_change() {
        let mut old_spec = spec("A", "one");
        old_spec.push(Element::new("extra").with_text("1"));
        let mut new_spec = spec("A", "one");
        new_spec.push(Element::new("extra").with_text("2"));
        new_spec.push(Element::new("added"));

        let report = diff_documents(&set(vec![old_spec]), &set(vec![new_spec]));
        assert_eq!(
            report.groups[0].1,
            vec![
                "Updated extra text to \"2\"".to_string(),
                "Added new added element".to_string(),
            ]
        );
    }

    #[test]
    fn test_component_fallbacks() {
        let titled = Element::new("specification").with_child(
            Element::new("context").with_child(Element::new("title").with_text("Save")),
        );
        assert_eq!(component_of(&titled, GENERAL), "[Save]");
        assert_eq!(component_of(&Element::new("specification"), GENERAL), "[Specification]");
        assert_eq!(component_of(&Element::new("other"), GENERAL), GENERAL);
    }

    #[test]
    fn test_root_level_change_is_general() {
        let old = Element::new("specification_set");
        let new = Element::new("specification_set").with_attr("version", "2");
        let report = diff_documents(&old, &new);
        assert_eq!(
            report.groups,
            vec![(GENERAL.to_string(), vec!["Added attribute version='2'".to_string()])]
        );
    }

    #[test]
    fn test_latest_pair_by_mtime() {
        let dir = tempfile::tempdir().unwrap();
        let base = SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_700_000_000);
        for (name, offset) in [("b.xml", 10), ("a.xml", 20), ("c.xml", 0)] {
            let path = dir.path().join(name);
            std::fs::write(&path, "<specification_set/>").unwrap();
            let file = std::fs::File::options().write(true).open(&path).unwrap();
            file.set_modified(base + std::time::Duration::from_secs(offset))
                .unwrap();
        }
        std::fs::write(dir.path().join("source_map.json"), "[]").unwrap();

        let (older, newer) = latest_pair(dir.path()).unwrap().unwrap();
        assert!(older.ends_with("b.xml"));
        assert!(newer.ends_with("a.xml"));
    }

    #[test]
    fn test_latest_pair_needs_two_documents() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("only.xml"), "<a/>").unwrap();
        assert!(latest_pair(dir.path()).unwrap().is_none());
        assert!(diff_latest(dir.path()).unwrap().is_none());
    }
}
