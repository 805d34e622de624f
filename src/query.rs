//! Source map records and lookups
//!
//! A source map is written next to each structured document. It lists, per
//! component, where its spec is declared, where it sits in the structured
//! document and which workspace lines mention it.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::spec::SpecError;

/// Declaration site of a spec class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecLocation {
    pub file: String,
    pub start_line: u32,
    pub end_line: u32,
    pub target: String,
}

/// A single line in a file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineLocation {
    pub file: String,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceMapEntry {
    pub component: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec_location: Option<SpecLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured_location: Option<LineLocation>,
    #[serde(default)]
    pub candidate_source_locations: Vec<LineLocation>,
}

impl fmt::Display for SourceMapEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Component: {}", self.component)?;
        if let Some(spec) = &self.spec_location {
            writeln!(
                f,
                "Spec:       {}:{}-{} ({})",
                spec.file, spec.start_line, spec.end_line, spec.target
            )?;
        }
        if let Some(xml) = &self.structured_location {
            writeln!(f, "Structured: {}:{}", xml.file, xml.line)?;
        }
        if !self.candidate_source_locations.is_empty() {
            writeln!(f, "Candidate source:")?;
            for loc in &self.candidate_source_locations {
                writeln!(f, "  - {}:{}", loc.file, loc.line)?;
            }
        }
        Ok(())
    }
}

/// A loaded source map, in document order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceMap {
    pub entries: Vec<SourceMapEntry>,
}

impl SourceMap {
    pub fn new(entries: Vec<SourceMapEntry>) -> Self {
        Self { entries }
    }

    pub fn load(path: &Path) -> Result<Self, SpecError> {
        let content = std::fs::read_to_string(path).map_err(|e| SpecError::io(path, e))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, SpecError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn to_json(&self) -> Result<String, SpecError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Distinct component names, sorted
    pub fn components(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.iter().map(|e| e.component.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Entries whose component contains `query`, ignoring case
    pub fn search(&self, query: &str) -> Vec<&SourceMapEntry> {
        let query = query.to_lowercase();
        self.entries
            .iter()
            .filter(|e| e.component.to_lowercase().contains(&query))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entry(component: &str) -> SourceMapEntry {
        SourceMapEntry {
            component: component.to_string(),
            spec_location: None,
            structured_location: None,
            candidate_source_locations: Vec::new(),
        }
    }

    #[test]
    fn test_components_sorted_unique() {
        let map = SourceMap::new(vec![entry("SaveGame"), entry("GameState"), entry("SaveGame")]);
        assert_eq!(map.components(), vec!["GameState", "SaveGame"]);
    }

    #[test]
    fn test_search_case_insensitive() {
        let map = SourceMap::new(vec![entry("SaveGame"), entry("GameState"), entry("Deposit")]);
        let found: Vec<&str> = map
            .search("game")
            .iter()
            .map(|e| e.component.as_str())
            .collect();
        assert_eq!(found, vec!["SaveGame", "GameState"]);
        assert!(map.search("nothing").is_empty());
    }

    #[test]
    fn test_json_shape() {
        let map = SourceMap::new(vec![SourceMapEntry {
            component: "GameState".to_string(),
            spec_location: Some(SpecLocation {
                file: "/src/game.rs".to_string(),
                start_line: 3,
                end_line: 9,
                target: "GameState".to_string(),
            }),
            structured_location: None,
            candidate_source_locations: vec![LineLocation {
                file: "/src/main.rs".to_string(),
                line: 12,
            }],
        }]);
        let json = map.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["spec_location"]["start_line"], 3);
        assert!(value[0].get("structured_location").is_none());
        assert_eq!(value[0]["candidate_source_locations"][0]["line"], 12);

        assert_eq!(SourceMap::from_json(&json).unwrap(), map);
    }

    #[test]
    fn test_missing_optional_fields() {
        let map = SourceMap::from_json(r#"[{"component": "X"}]"#).unwrap();
        assert_eq!(map.entries[0], entry("X"));
    }

    #[test]
    fn test_display() {
        let mut e = entry("GameState");
        e.structured_location = Some(LineLocation {
            file: "spec.xml".to_string(),
            line: 4,
        });
        assert_eq!(
            e.to_string(),
            "Component: GameState\nStructured: spec.xml:4\n"
        );
    }
}
