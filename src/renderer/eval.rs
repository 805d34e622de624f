//! Template evaluation against a context map
//!
//! Evaluation is strict: an undefined variable or attribute, an unknown
//! filter or test, and iterating a scalar all fail with a spanned
//! [`TemplateError`] instead of rendering an empty substitution.

use crate::error::TemplateError;
use crate::parser::ast::*;
use crate::value::{Map, Value};

/// Render a parsed template with the given context
pub fn render(template: &Template, context: &Map) -> Result<String, TemplateError> {
    let mut evaluator = Evaluator {
        root: context,
        scopes: Vec::new(),
    };
    let mut out = String::new();
    evaluator.render_nodes(&template.nodes, &mut out)?;
    Ok(out)
}

struct Evaluator<'a> {
    root: &'a Map,
    /// Loop scopes, innermost last
    scopes: Vec<Map>,
}

impl Evaluator<'_> {
    fn render_nodes(&mut self, nodes: &[Spanned<Node>], out: &mut String) -> Result<(), TemplateError> {
        for node in nodes {
            match &node.node {
                Node::Text(text) => out.push_str(text),
                Node::Output(expr) => {
                    let value = self.eval(expr)?;
                    out.push_str(&value.to_string());
                }
                Node::If(block) => self.render_if(block, out)?,
                Node::For(block) => self.render_for(block, out)?,
            }
        }
        Ok(())
    }

    fn render_if(&mut self, block: &IfBlock, out: &mut String) -> Result<(), TemplateError> {
        for (cond, body) in &block.branches {
            if self.check(cond)? {
                return self.render_nodes(body, out);
            }
        }
        match &block.otherwise {
            Some(body) => self.render_nodes(body, out),
            None => Ok(()),
        }
    }

    fn render_for(&mut self, block: &ForBlock, out: &mut String) -> Result<(), TemplateError> {
        let iterable = self.eval(&block.iterable)?;
        let items: Vec<Value> = match iterable {
            Value::List(items) => items,
            Value::Map(map) => {
                if block.targets.len() == 1 {
                    map.keys().map(Value::from).collect()
                } else {
                    map.into_iter()
                        .map(|(k, v)| Value::List(vec![Value::Str(k), v]))
                        .collect()
                }
            }
            other => {
                return Err(TemplateError::NotIterable {
                    kind: other.kind(),
                    span: block.iterable.span.clone(),
                })
            }
        };

        if items.is_empty() {
            if let Some(otherwise) = &block.otherwise {
                self.render_nodes(otherwise, out)?;
            }
            return Ok(());
        }

        let length = items.len();
        for (index, item) in items.into_iter().enumerate() {
            let mut scope = self.bind_targets(&block.targets, item, &block.iterable.span)?;
            scope.insert(
                "loop",
                Map::new()
                    .with("index", index + 1)
                    .with("index0", index)
                    .with("first", index == 0)
                    .with("last", index + 1 == length)
                    .with("length", length),
            );
            self.scopes.push(scope);
            let result = self.render_nodes(&block.body, out);
            self.scopes.pop();
            result?;
        }
        Ok(())
    }

    fn bind_targets(
        &self,
        targets: &[Spanned<Identifier>],
        item: Value,
        span: &Span,
    ) -> Result<Map, TemplateError> {
        let mut scope = Map::new();
        if let [single] = targets {
            scope.insert(single.node.as_str(), item);
            return Ok(scope);
        }
        match item {
            Value::List(parts) if parts.len() == targets.len() => {
                for (target, part) in targets.iter().zip(parts) {
                    scope.insert(target.node.as_str(), part);
                }
                Ok(scope)
            }
            other => Err(TemplateError::Unpack {
                expected: targets.len(),
                found: other.to_string(),
                span: span.clone(),
            }),
        }
    }

    fn lookup(&self, name: &str) -> Option<&Value> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .or_else(|| self.root.get(name))
    }

    fn eval(&self, expr: &Spanned<Expr>) -> Result<Value, TemplateError> {
        match &expr.node {
            Expr::Var(id) => {
                self.lookup(id.as_str())
                    .cloned()
                    .ok_or_else(|| TemplateError::UndefinedVariable {
                        name: id.to_string(),
                        span: expr.span.clone(),
                    })
            }
            Expr::Literal(lit) => Ok(match lit {
                Literal::Str(s) => Value::Str(s.clone()),
                Literal::Int(n) => Value::Int(*n),
                Literal::Float(n) => Value::Float(*n),
                Literal::Bool(b) => Value::Bool(*b),
                Literal::None => Value::Null,
            }),
            Expr::Attr(inner, name) => {
                let owner = self.eval(inner)?;
                attribute(&owner, name)
            }
            Expr::Call(inner, name) => {
                let owner = self.eval(inner)?;
                call_method(&owner, name)
            }
            Expr::Filter { expr, name, args } => {
                let value = self.eval(expr)?;
                let args = args
                    .iter()
                    .map(|arg| self.eval(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                apply_filter(value, name, &args)
            }
        }
    }

    fn check(&self, cond: &Spanned<Condition>) -> Result<bool, TemplateError> {
        match &cond.node {
            Condition::Truthy(expr) => Ok(self.eval(expr)?.is_truthy()),
            Condition::Not(inner) => Ok(!self.check(inner)?),
            Condition::Test {
                expr,
                test,
                negated,
            } => {
                let result = if test.node.as_str() == "defined" {
                    match self.eval(expr) {
                        Ok(_) => true,
                        Err(
                            TemplateError::UndefinedVariable { .. }
                            | TemplateError::UndefinedAttribute { .. },
                        ) => false,
                        Err(err) => return Err(err),
                    }
                } else {
                    run_test(&self.eval(expr)?, test)?
                };
                Ok(result != *negated)
            }
        }
    }
}

fn attribute(owner: &Value, name: &Spanned<Identifier>) -> Result<Value, TemplateError> {
    let key = name.node.as_str();
    let found = match owner {
        Value::Map(map) => map
            .get(key)
            .or_else(|| map.get(&key.replace('-', "_"))),
        _ => None,
    };
    found.cloned().ok_or_else(|| TemplateError::UndefinedAttribute {
        owner: owner.kind(),
        name: key.to_string(),
        span: name.span.clone(),
    })
}

fn call_method(owner: &Value, name: &Spanned<Identifier>) -> Result<Value, TemplateError> {
    let unknown = || TemplateError::UnknownMethod {
        owner: owner.kind(),
        name: name.node.to_string(),
        span: name.span.clone(),
    };
    let Value::Map(map) = owner else {
        return Err(unknown());
    };
    match name.node.as_str() {
        "items" => Ok(Value::List(
            map.iter()
                .map(|(k, v)| Value::List(vec![Value::from(k), v.clone()]))
                .collect(),
        )),
        "keys" => Ok(Value::List(map.keys().map(Value::from).collect())),
        "values" => Ok(Value::List(map.iter().map(|(_, v)| v.clone()).collect())),
        _ => Err(unknown()),
    }
}

fn apply_filter(
    value: Value,
    name: &Spanned<Identifier>,
    args: &[Value],
) -> Result<Value, TemplateError> {
    let bad_args = |reason: &str| TemplateError::FilterArguments {
        name: name.node.to_string(),
        reason: reason.to_string(),
        span: name.span.clone(),
    };

    match name.node.as_str() {
        "join" => {
            let sep = match args {
                [] => String::new(),
                [sep] => sep.to_string(),
                _ => return Err(bad_args("expected at most one separator")),
            };
            let joined = match &value {
                Value::List(items) => items
                    .iter()
                    .map(|item| item.to_string())
                    .collect::<Vec<_>>()
                    .join(sep.as_str()),
                Value::Map(map) => map.keys().collect::<Vec<_>>().join(sep.as_str()),
                other => other.to_string(),
            };
            Ok(Value::Str(joined))
        }
        "length" => {
            let len = match &value {
                Value::List(items) => items.len(),
                Value::Map(map) => map.len(),
                Value::Str(s) => s.chars().count(),
                other => {
                    return Err(bad_args(&format!("{} has no length", other.kind())));
                }
            };
            Ok(Value::from(len))
        }
        "upper" => Ok(Value::Str(value.to_string().to_uppercase())),
        "lower" => Ok(Value::Str(value.to_string().to_lowercase())),
        "trim" => Ok(Value::Str(value.to_string().trim().to_string())),
        "default" => match args {
            [fallback] => Ok(if matches!(value, Value::Null) {
                fallback.clone()
            } else {
                value
            }),
            _ => Err(bad_args("expected exactly one fallback value")),
        },
        other => Err(TemplateError::UnknownFilter {
            name: other.to_string(),
            span: name.span.clone(),
        }),
    }
}

fn run_test(value: &Value, test: &Spanned<Identifier>) -> Result<bool, TemplateError> {
    Ok(match test.node.as_str() {
        "mapping" => matches!(value, Value::Map(_)),
        "sequence" => matches!(value, Value::List(_)),
        "string" => matches!(value, Value::Str(_)),
        "number" => matches!(value, Value::Int(_) | Value::Float(_)),
        "none" => matches!(value, Value::Null),
        other => {
            return Err(TemplateError::UnknownTest {
                name: other.to_string(),
                span: test.span.clone(),
            })
        }
    })
}
