//! Lexer for the template language using logos
//!
//! Template source is mostly free text, so lexing happens in two layers.
//! [`lex`] scans for `{{ }}`, `{% %}` and `{# #}` delimiters and emits raw
//! text between them; the inside of each delimiter pair is tokenized by the
//! logos-derived [`TagToken`].

use logos::Logos;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Tokens that appear between template delimiters
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
pub enum TagToken {
    // Control keywords
    #[token("if")]
    If,
    #[token("elif")]
    Elif,
    #[token("else")]
    Else,
    #[token("endif")]
    EndIf,
    #[token("for")]
    For,
    #[token("in")]
    In,
    #[token("endfor")]
    EndFor,
    #[token("is")]
    Is,
    #[token("not")]
    Not,

    // Literal keywords
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("none")]
    None,

    // Punctuation
    #[token(".")]
    Dot,
    #[token(",")]
    Comma,
    #[token("|")]
    Pipe,
    #[token("(")]
    ParenOpen,
    #[token(")")]
    ParenClose,

    // Identifiers may contain hyphens so `{{feature-name}}` names a variable
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_-]*", |lex| lex.slice().to_string(), priority = 1)]
    Ident(String),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| unquote(lex.slice()))]
    #[regex(r#"'([^'\\]|\\.)*'"#, |lex| unquote(lex.slice()))]
    String(String),

    #[regex(r"[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Int(i64),

    #[regex(r"[0-9]+\.[0-9]+", |lex| lex.slice().parse::<f64>().ok())]
    Float(f64),
}

/// A token of the full template stream
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Raw text outside any delimiter
    Text(String),
    /// `{{`
    ExprOpen,
    /// `}}`
    ExprClose,
    /// `{%`
    TagOpen,
    /// `%}`
    TagClose,
    /// A token inside a delimiter pair
    Tag(TagToken),
    /// Characters inside a delimiter pair that do not form a token
    Invalid(String),
}

fn unquote(raw: &str) -> String {
    let inner = &raw[1..raw.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Delimiter {
    Expr,
    Tag,
    Comment,
}

impl Delimiter {
    fn close(self) -> &'static str {
        match self {
            Delimiter::Expr => "}}",
            Delimiter::Tag => "%}",
            Delimiter::Comment => "#}",
        }
    }

    fn is_block(self) -> bool {
        !matches!(self, Delimiter::Expr)
    }
}

fn next_open(input: &str, from: usize) -> Option<(usize, Delimiter)> {
    let rest = &input[from..];
    [
        ("{{", Delimiter::Expr),
        ("{%", Delimiter::Tag),
        ("{#", Delimiter::Comment),
    ]
    .into_iter()
    .filter_map(|(open, kind)| rest.find(open).map(|at| (from + at, kind)))
    .min_by_key(|(at, _)| *at)
}

/// Lex a template into tokens with spans
///
/// Block tags and comments that sit alone on a line swallow their
/// indentation and the newline that follows them, so control flow does not
/// leave blank lines in the output.
pub fn lex(input: &str) -> Vec<(Token, Span)> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < input.len() {
        let Some((open_at, kind)) = next_open(input, pos) else {
            tokens.push((Token::Text(input[pos..].to_string()), pos..input.len()));
            break;
        };

        let inner_start = open_at + 2;
        let close_at = input[inner_start..]
            .find(kind.close())
            .map(|at| inner_start + at);
        let after_close = close_at.map(|at| at + 2).unwrap_or(input.len());

        let mut text_end = open_at;
        let mut resume = after_close;
        if kind.is_block() {
            let line_start = input[pos..open_at]
                .rfind('\n')
                .map(|at| pos + at + 1)
                .unwrap_or(pos);
            let at_line_start = line_start > pos || pos == 0 || input[..pos].ends_with('\n');
            if at_line_start && input[line_start..open_at].trim().is_empty() {
                text_end = line_start;
            }
            if input[resume..].starts_with("\r\n") {
                resume += 2;
            } else if input[resume..].starts_with('\n') {
                resume += 1;
            }
        }

        if text_end > pos {
            tokens.push((Token::Text(input[pos..text_end].to_string()), pos..text_end));
        }

        let inner_end = close_at.unwrap_or(input.len());
        match kind {
            Delimiter::Comment => {}
            Delimiter::Expr | Delimiter::Tag => {
                let (open, close) = if kind == Delimiter::Expr {
                    (Token::ExprOpen, Token::ExprClose)
                } else {
                    (Token::TagOpen, Token::TagClose)
                };
                tokens.push((open, open_at..inner_start));
                tokens.extend(lex_inner(&input[inner_start..inner_end], inner_start));
                if let Some(close_at) = close_at {
                    tokens.push((close, close_at..close_at + 2));
                }
            }
        }

        pos = resume;
    }

    tokens
}

fn lex_inner(inner: &str, offset: usize) -> impl Iterator<Item = (Token, Span)> + '_ {
    TagToken::lexer(inner).spanned().map(move |(tok, span)| {
        let shifted = span.start + offset..span.end + offset;
        match tok {
            Ok(t) => (Token::Tag(t), shifted),
            Err(()) => (Token::Invalid(inner[span].to_string()), shifted),
        }
    })
}

/// Whether any delimiter of `fragment` mentions `name` as an identifier
pub fn mentions(fragment: &str, name: &str) -> bool {
    lex(fragment)
        .iter()
        .any(|(tok, _)| matches!(tok, Token::Tag(TagToken::Ident(id)) if id == name))
}
