//! Workspace search for lines that mention spec components

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::config::IndexConfig;
use crate::query::LineLocation;

/// Text files of a workspace, loaded once and searched per component
pub struct WorkspaceIndex {
    files: Vec<(PathBuf, String)>,
    max_candidates: usize,
}

impl WorkspaceIndex {
    /// Load every file under `root` with a configured extension
    pub fn build(root: &Path, config: &IndexConfig) -> Self {
        let mut files = Vec::new();
        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !is_excluded(entry, &config.exclude));

        for entry in walker.filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() || !has_extension(entry.path(), &config.extensions) {
                continue;
            }
            match std::fs::read_to_string(entry.path()) {
                Ok(content) => files.push((entry.path().to_path_buf(), content)),
                Err(e) => warn!(path = %entry.path().display(), error = %e, "skipping unreadable file"),
            }
        }
        debug!(root = %root.display(), files = files.len(), "indexed workspace");

        Self {
            files,
            max_candidates: config.max_candidates,
        }
    }

    /// Lines mentioning the type name or its snake_case form
    pub fn candidates(&self, type_name: &str) -> Vec<LineLocation> {
        let snake = snake_case(type_name);
        let mut found = Vec::new();
        for (path, content) in &self.files {
            for (index, line) in content.lines().enumerate() {
                if found.len() >= self.max_candidates {
                    return found;
                }
                if line.contains(type_name) || line.contains(&snake) {
                    found.push(LineLocation {
                        file: path.display().to_string(),
                        line: index + 1,
                    });
                }
            }
        }
        found
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

fn is_excluded(entry: &DirEntry, exclude: &[String]) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| exclude.iter().any(|ex| ex == name))
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| e == ext))
}

/// `GameState` -> `game_state`, `SQLite3` -> `sq_lite3`
pub fn snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_lower) {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_snake_case() {
        assert_eq!(snake_case("GameState"), "game_state");
        assert_eq!(snake_case("SQLite3"), "sq_lite3");
        assert_eq!(snake_case("API"), "api");
        assert_eq!(snake_case("move"), "move");
    }

    #[test]
    fn test_candidates_respect_extensions_and_excludes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("game.rs"), "struct GameState;\nfn x() {}\nlet game_state = 1;\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "GameState in prose\n").unwrap();
        std::fs::create_dir(dir.path().join("target")).unwrap();
        std::fs::write(dir.path().join("target").join("gen.rs"), "GameState\n").unwrap();

        let index = WorkspaceIndex::build(dir.path(), &IndexConfig::default());
        assert_eq!(index.file_count(), 1);

        let found = index.candidates("GameState");
        let lines: Vec<usize> = found.iter().map(|l| l.line).collect();
        assert_eq!(lines, vec![1, 3]);
        assert!(found[0].file.ends_with("game.rs"));
    }

    #[test]
    fn test_candidates_capped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("many.py"), "Deposit\n".repeat(50)).unwrap();
        let config = IndexConfig {
            max_candidates: 5,
            ..IndexConfig::default()
        };
        let index = WorkspaceIndex::build(dir.path(), &config);
        assert_eq!(index.candidates("Deposit").len(), 5);
    }
}
