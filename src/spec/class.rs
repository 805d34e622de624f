//! Static declarations of specification classes
//!
//! A [`SpecClass`] is declared once as a `static` and links to its parent,
//! which gives the fragment inheritance chain. Fragments and classes record
//! where they were declared through the [`location!`](crate::location) and
//! [`fragment!`](crate::fragment) macros.

use std::path::{Path, PathBuf};

use crate::value::Value;

use super::{Spec, SpecError};

/// Capture the current source location
#[macro_export]
macro_rules! location {
    () => {
        $crate::spec::Location::new(env!("CARGO_MANIFEST_DIR"), file!(), line!())
    };
}

/// Declare a documentation fragment at the current source location
#[macro_export]
macro_rules! fragment {
    ($text:expr) => {
        $crate::spec::Fragment::new($text, $crate::location!())
    };
}

/// Where a class or fragment was declared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub manifest_dir: &'static str,
    pub file: &'static str,
    pub line: u32,
}

impl Location {
    pub const fn new(manifest_dir: &'static str, file: &'static str, line: u32) -> Self {
        Self {
            manifest_dir,
            file,
            line,
        }
    }

    /// Absolute path of the declaring file, when it exists on disk
    ///
    /// `file!()` is relative to the workspace root, which is the manifest
    /// directory or one of its ancestors.
    pub fn resolve_path(&self) -> Option<PathBuf> {
        let file = Path::new(self.file);
        if file.is_absolute() {
            return file.is_file().then(|| file.to_path_buf());
        }
        Path::new(self.manifest_dir)
            .ancestors()
            .map(|dir| dir.join(file))
            .find(|candidate| candidate.is_file())
    }

    /// Resolved path if available, else the path as recorded
    pub fn display_path(&self) -> String {
        match self.resolve_path() {
            Some(path) => path.display().to_string(),
            None => self.file.to_string(),
        }
    }
}

/// A documentation fragment used as a template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment {
    pub text: &'static str,
    pub location: Location,
}

impl Fragment {
    pub const fn new(text: &'static str, location: Location) -> Self {
        Self { text, location }
    }

    /// Text with the first line stripped, common indentation removed and
    /// surrounding blank lines dropped
    pub fn cleaned(&self) -> String {
        cleandoc(self.text)
    }

    /// Last source line covered by the fragment
    pub fn end_line(&self) -> u32 {
        let extra = self.text.lines().count().saturating_sub(1);
        self.location.line + extra as u32
    }
}

/// Dedent documentation text
pub fn cleandoc(text: &str) -> String {
    let text = text.replace('\t', "        ");
    let mut lines: Vec<&str> = text.lines().collect();
    if lines.is_empty() {
        return String::new();
    }

    let indent = lines[1..]
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| leading_whitespace(line))
        .min()
        .unwrap_or(0);

    let first = lines[0].trim_start();
    let mut cleaned: Vec<String> = Vec::with_capacity(lines.len());
    cleaned.push(first.to_string());
    for line in lines.drain(1..) {
        let cut = indent.min(leading_whitespace(line));
        let start = line.char_indices().nth(cut).map_or(line.len(), |(i, _)| i);
        cleaned.push(line[start..].trim_end().to_string());
    }

    while cleaned.first().is_some_and(|l| l.trim().is_empty()) {
        cleaned.remove(0);
    }
    while cleaned.last().is_some_and(|l| l.trim().is_empty()) {
        cleaned.pop();
    }
    cleaned.join("\n")
}

/// Leading whitespace of a line, in characters
fn leading_whitespace(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

/// Zero-argument accessor of a spec instance
pub type AccessorFn = fn(&Spec) -> Result<Value, SpecError>;

/// A named value source that templates can reference
#[derive(Debug, Clone, Copy)]
pub struct Accessor {
    pub name: &'static str,
    /// `None` declares the accessor without implementing it
    pub get: Option<AccessorFn>,
}

impl Accessor {
    pub const fn new(name: &'static str, get: AccessorFn) -> Self {
        Self {
            name,
            get: Some(get),
        }
    }

    /// An accessor that subclasses are expected to provide
    pub const fn unimplemented(name: &'static str) -> Self {
        Self { name, get: None }
    }
}

/// A declared data field and its type descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub ty: &'static str,
}

impl Field {
    pub const fn new(name: &'static str, ty: &'static str) -> Self {
        Self { name, ty }
    }
}

/// A method exposed by API and command-line specs
#[derive(Debug, Clone, Copy)]
pub struct MethodDecl {
    pub name: &'static str,
    /// Parameter names, excluding the receiver
    pub params: &'static [&'static str],
    pub doc: Option<&'static str>,
    /// Produces the exemplar result shown in documents
    pub example: AccessorFn,
    pub location: Option<Location>,
}

impl MethodDecl {
    pub const fn new(name: &'static str, params: &'static [&'static str], example: AccessorFn) -> Self {
        Self {
            name,
            params,
            doc: None,
            example,
            location: None,
        }
    }

    pub const fn with_doc(mut self, doc: &'static str) -> Self {
        self.doc = Some(doc);
        self
    }

    pub const fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }
}

/// A declared specification class
#[derive(Debug)]
pub struct SpecClass {
    pub name: &'static str,
    /// Module path of the declaring namespace
    pub module: &'static str,
    pub parent: Option<&'static SpecClass>,
    pub doc: Option<Fragment>,
    pub accessors: &'static [Accessor],
    pub fields: Option<&'static [Field]>,
    pub methods: &'static [MethodDecl],
    pub location: Location,
}

impl SpecClass {
    /// A class with no parent, documentation or members
    pub const fn base(name: &'static str, module: &'static str, location: Location) -> Self {
        Self {
            name,
            module,
            parent: None,
            doc: None,
            accessors: &[],
            fields: None,
            methods: &[],
            location,
        }
    }

    /// Parent, grandparent and so on
    pub fn ancestors(&'static self) -> impl Iterator<Item = &'static SpecClass> {
        std::iter::successors(self.parent, |class| class.parent)
    }

    /// This class followed by its ancestors
    pub fn lineage(&'static self) -> impl Iterator<Item = &'static SpecClass> {
        std::iter::once(self).chain(self.ancestors())
    }

    pub fn is(&self, other: &SpecClass) -> bool {
        std::ptr::eq(self, other)
    }

    /// Whether `ancestor` is a proper ancestor of this class
    pub fn descends_from(&'static self, ancestor: &SpecClass) -> bool {
        self.ancestors().any(|class| class.is(ancestor))
    }

    /// Nearest declaration of an accessor, with the class that declares it
    pub fn find_accessor(&'static self, name: &str) -> Option<(&'static SpecClass, &'static Accessor)> {
        self.lineage().find_map(|class| {
            class
                .accessors
                .iter()
                .find(|accessor| accessor.name == name)
                .map(|accessor| (class, accessor))
        })
    }

    /// Nearest declared field table
    pub fn field_table(&'static self) -> Option<&'static [Field]> {
        self.lineage().find_map(|class| class.fields)
    }
}
