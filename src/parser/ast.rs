//! Abstract Syntax Tree types for the template language

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// AST node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// Template identifier (letters, digits, underscore and hyphen)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(pub String);

impl Identifier {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Root AST node - a parsed template
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub nodes: Vec<Spanned<Node>>,
}

/// A piece of template output
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Literal text copied to the output
    Text(String),
    /// `{{ expr }}`
    Output(Spanned<Expr>),
    /// `{% if %} ... {% elif %} ... {% else %} ... {% endif %}`
    If(IfBlock),
    /// `{% for x in xs %} ... {% else %} ... {% endfor %}`
    For(ForBlock),
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfBlock {
    /// `if` and `elif` arms in source order
    pub branches: Vec<(Spanned<Condition>, Vec<Spanned<Node>>)>,
    pub otherwise: Option<Vec<Spanned<Node>>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForBlock {
    /// Loop variables; more than one destructures each item
    pub targets: Vec<Spanned<Identifier>>,
    pub iterable: Spanned<Expr>,
    pub body: Vec<Spanned<Node>>,
    /// Rendered when the iterable is empty
    pub otherwise: Option<Vec<Spanned<Node>>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Var(Identifier),
    Literal(Literal),
    /// `expr.name`
    Attr(Box<Spanned<Expr>>, Spanned<Identifier>),
    /// `expr.name()`
    Call(Box<Spanned<Expr>>, Spanned<Identifier>),
    /// `expr | name(args)`
    Filter {
        expr: Box<Spanned<Expr>>,
        name: Spanned<Identifier>,
        args: Vec<Spanned<Expr>>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    None,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Truthiness of an expression
    Truthy(Spanned<Expr>),
    /// `expr is [not] test`
    Test {
        expr: Spanned<Expr>,
        test: Spanned<Identifier>,
        negated: bool,
    },
    /// `not cond`
    Not(Box<Spanned<Condition>>),
}

impl Template {
    /// Root variables the template reads without binding them itself
    ///
    /// Loop targets and the implicit `loop` variable are scoped to their
    /// loop body and are not reported. Names keep first-appearance order.
    pub fn variables(&self) -> Vec<String> {
        let mut found = Vec::new();
        let mut scope = Vec::new();
        collect_nodes(&self.nodes, &mut scope, &mut found);
        found
    }
}

fn collect_nodes(nodes: &[Spanned<Node>], scope: &mut Vec<String>, found: &mut Vec<String>) {
    for node in nodes {
        match &node.node {
            Node::Text(_) => {}
            Node::Output(expr) => collect_expr(&expr.node, scope, found),
            Node::If(block) => {
                for (cond, body) in &block.branches {
                    collect_condition(&cond.node, scope, found);
                    collect_nodes(body, scope, found);
                }
                if let Some(otherwise) = &block.otherwise {
                    collect_nodes(otherwise, scope, found);
                }
            }
            Node::For(block) => {
                collect_expr(&block.iterable.node, scope, found);
                let depth = scope.len();
                scope.extend(block.targets.iter().map(|t| t.node.0.clone()));
                scope.push("loop".to_string());
                collect_nodes(&block.body, scope, found);
                scope.truncate(depth);
                if let Some(otherwise) = &block.otherwise {
                    collect_nodes(otherwise, scope, found);
                }
            }
        }
    }
}

fn collect_condition(cond: &Condition, scope: &mut Vec<String>, found: &mut Vec<String>) {
    match cond {
        Condition::Truthy(expr) | Condition::Test { expr, .. } => {
            collect_expr(&expr.node, scope, found)
        }
        Condition::Not(inner) => collect_condition(&inner.node, scope, found),
    }
}

fn collect_expr(expr: &Expr, scope: &[String], found: &mut Vec<String>) {
    match expr {
        Expr::Var(id) => {
            let name = id.as_str();
            if !scope.iter().any(|s| s == name) && !found.iter().any(|f| f == name) {
                found.push(name.to_string());
            }
        }
        Expr::Literal(_) => {}
        Expr::Attr(inner, _) | Expr::Call(inner, _) => collect_expr(&inner.node, scope, found),
        Expr::Filter { expr, args, .. } => {
            collect_expr(&expr.node, scope, found);
            for arg in args {
                collect_expr(&arg.node, scope, found);
            }
        }
    }
}
