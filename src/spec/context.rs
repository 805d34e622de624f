//! Placeholder binding: building the context a spec renders with

use std::collections::HashSet;

use tracing::debug;

use crate::error::TemplateError;
use crate::parser::{lexer, parse, Template};
use crate::value::{Map, Value};

use super::class::SpecClass;
use super::resolver::TemplateProvider;
use super::{Spec, SpecError};

/// Placeholder resolved from the declared field table
const FIELDS: &str = "fields";

/// Accessors never pulled into the extended context
const EXCLUDED: &[&str] = &["render", "render_xml", "ctx"];

impl Spec {
    /// Context for the merged template
    ///
    /// Every placeholder must resolve to an accessor on the class or one of
    /// its ancestors; each accessor runs once.
    pub fn ctx(&self) -> Result<Map, SpecError> {
        let merged = self.merged_template();
        if merged.is_empty() {
            return Ok(Map::new());
        }
        let template = self.parse_template(&merged)?;
        let mut binder = Binder::new(self);
        binder.bind_all(&template)?;
        Ok(binder.context)
    }

    /// Context used for structured output
    ///
    /// Adds the placeholders of the instance notes and every other public
    /// accessor of the class chain. Accessors that are declared but not
    /// implemented are left out.
    pub fn ctx_extended(&self) -> Result<Map, SpecError> {
        let mut binder = Binder::new(self);

        let merged = self.merged_template();
        if !merged.is_empty() {
            binder.bind_all(&self.parse_template(&merged)?)?;
        }
        let notes = self.notes();
        if !notes.is_empty() {
            binder.bind_all(&self.parse_template(&notes)?)?;
        }

        for class in self.class().lineage() {
            for accessor in class.accessors {
                let name = accessor.name;
                if name.starts_with('_') || EXCLUDED.contains(&name) || binder.is_bound(name) {
                    continue;
                }
                match binder.invoke(name) {
                    Ok(value) => binder.insert(name, value),
                    Err(SpecError::Unimplemented { method, .. }) => {
                        debug!(spec = self.type_name(), accessor = %method, "skipping unimplemented accessor");
                        binder.mark_bound(name);
                    }
                    Err(err) => return Err(err),
                }
            }
        }
        Ok(binder.context)
    }

    pub(crate) fn parse_template(&self, source: &str) -> Result<Template, SpecError> {
        parse(source).map_err(|errors| SpecError::Template {
            type_name: self.type_name().to_string(),
            template: source.to_string(),
            error: errors.into_iter().next().unwrap_or(TemplateError::Syntax {
                span: 0..source.len(),
                message: "invalid template".to_string(),
                expected: Vec::new(),
            }),
        })
    }
}

struct Binder<'s> {
    spec: &'s Spec,
    context: Map,
    /// Bound names with hyphens mapped to underscores
    bound: HashSet<String>,
}

impl<'s> Binder<'s> {
    fn new(spec: &'s Spec) -> Self {
        Self {
            spec,
            context: Map::new(),
            bound: HashSet::new(),
        }
    }

    fn is_bound(&self, name: &str) -> bool {
        self.bound.contains(&name.replace('-', "_"))
    }

    fn mark_bound(&mut self, name: &str) {
        self.bound.insert(name.replace('-', "_"));
    }

    fn insert(&mut self, name: &str, value: Value) {
        self.mark_bound(name);
        self.context.insert(name, value);
    }

    /// Expose an already bound value under another spelling of its name
    fn alias(&mut self, placeholder: &str) {
        if self.context.contains_key(placeholder) {
            return;
        }
        let normalized = placeholder.replace('-', "_");
        let existing = self
            .context
            .iter()
            .find(|(key, _)| key.replace('-', "_") == normalized)
            .map(|(_, value)| value.clone());
        if let Some(value) = existing {
            self.context.insert(placeholder, value);
        }
    }

    fn bind_all(&mut self, template: &Template) -> Result<(), SpecError> {
        for placeholder in template.variables() {
            if self.is_bound(&placeholder) {
                self.alias(&placeholder);
                continue;
            }
            let value = if placeholder == FIELDS {
                self.fields()?
            } else {
                self.invoke(&placeholder.replace('-', "_"))
                    .map_err(|err| match err {
                        SpecError::UnboundPlaceholder { .. } => self.unbound(&placeholder),
                        other => other,
                    })?
            };
            self.insert(&placeholder, value);
        }
        Ok(())
    }

    /// The nearest field table, else a `fields` accessor, else null
    fn fields(&self) -> Result<Value, SpecError> {
        let class = self.spec.class();
        if let Some(table) = class.field_table() {
            return Ok(field_map(table));
        }
        if class.find_accessor(FIELDS).is_some() {
            return self.invoke(FIELDS);
        }
        Ok(Value::Null)
    }

    fn invoke(&self, name: &str) -> Result<Value, SpecError> {
        let class = self.spec.class();
        let Some((owner, accessor)) = class.find_accessor(name) else {
            return Err(self.unbound(name));
        };
        let Some(get) = accessor.get else {
            return Err(SpecError::Unimplemented {
                method: name.to_string(),
                type_name: class.name.to_string(),
                declared_in: owner.name.to_string(),
            });
        };
        debug!(spec = class.name, accessor = name, "invoking accessor");
        get(self.spec)
    }

    /// Error naming the fragment that uses `placeholder`
    fn unbound(&self, placeholder: &str) -> SpecError {
        let class = self.spec.class();
        let mut fragments = class.ancestor_fragments();
        if let Some(doc) = class.doc {
            fragments.push((class, doc));
        }
        let (declared_in, location) = fragments
            .iter()
            .find(|(_, fragment)| lexer::mentions(fragment.text, placeholder))
            .map(|(owner, fragment)| (owner.name, fragment.location))
            .unwrap_or((class.name, class.location));

        SpecError::UnboundPlaceholder {
            placeholder: placeholder.to_string(),
            type_name: class.name.to_string(),
            declared_in: declared_in.to_string(),
            file: location.display_path(),
            line: location.line,
            accessor: placeholder.replace('-', "_"),
        }
    }
}

fn field_map(table: &[super::Field]) -> Value {
    Value::Map(table.iter().map(|f| (f.name, f.ty)).collect())
}

/// Field table of a class as a map, for `fields` accessors
pub(crate) fn declared_fields(class: &'static SpecClass) -> Value {
    class.field_table().map(field_map).unwrap_or(Value::Null)
}
