//! Error types for template parsing and evaluation

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TemplateError {
    #[error("template syntax error at {span:?}: {message}")]
    Syntax {
        span: Span,
        message: String,
        expected: Vec<String>,
    },

    #[error("undefined variable '{name}'")]
    UndefinedVariable { name: String, span: Span },

    #[error("{owner} has no attribute '{name}'")]
    UndefinedAttribute {
        owner: &'static str,
        name: String,
        span: Span,
    },

    #[error("unknown method '{name}' on {owner}")]
    UnknownMethod {
        owner: &'static str,
        name: String,
        span: Span,
    },

    #[error("unknown filter '{name}'")]
    UnknownFilter { name: String, span: Span },

    #[error("unknown test '{name}'")]
    UnknownTest { name: String, span: Span },

    #[error("invalid arguments for filter '{name}': {reason}")]
    FilterArguments {
        name: String,
        reason: String,
        span: Span,
    },

    #[error("cannot iterate over {kind}")]
    NotIterable { kind: &'static str, span: Span },

    #[error("cannot unpack {found} into {expected} loop variables")]
    Unpack {
        expected: usize,
        found: String,
        span: Span,
    },
}

impl TemplateError {
    /// Location of the error in the template source
    pub fn span(&self) -> &Span {
        match self {
            TemplateError::Syntax { span, .. }
            | TemplateError::UndefinedVariable { span, .. }
            | TemplateError::UndefinedAttribute { span, .. }
            | TemplateError::UnknownMethod { span, .. }
            | TemplateError::UnknownFilter { span, .. }
            | TemplateError::UnknownTest { span, .. }
            | TemplateError::FilterArguments { span, .. }
            | TemplateError::NotIterable { span, .. }
            | TemplateError::Unpack { span, .. } => span,
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let mut buf = Vec::new();
        let span = self.span().clone();
        let label = match self {
            TemplateError::Syntax {
                message, expected, ..
            } if !expected.is_empty() => {
                format!("{}\nExpected: {}", message, expected.join(", "))
            }
            TemplateError::Syntax { message, .. } => message.clone(),
            other => other.to_string(),
        };

        let written = Report::build(ReportKind::Error, filename, span.start)
            .with_message(self.to_string())
            .with_label(
                Label::new((filename, span))
                    .with_message(label)
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf);

        match written {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => self.to_string(),
        }
    }
}

impl<'a> From<chumsky::error::Rich<'a, crate::parser::lexer::Token>> for TemplateError {
    fn from(err: chumsky::error::Rich<'a, crate::parser::lexer::Token>) -> Self {
        use chumsky::error::{RichPattern, RichReason};

        let message = match err.reason() {
            RichReason::Custom(msg) => msg.to_string(),
            _ => match err.found() {
                Some(tok) => format!("Unexpected {}", format_token(tok)),
                None => "Unexpected end of template".to_string(),
            },
        };

        let expected: Vec<String> = err
            .expected()
            .filter_map(|e| match e {
                RichPattern::Token(tok) => Some(format_token(tok)),
                RichPattern::Label(label) => Some(label.to_string()),
                RichPattern::EndOfInput => Some("end of template".to_string()),
                _ => None,
            })
            .collect();

        TemplateError::Syntax {
            span: err.span().into_range(),
            message,
            expected,
        }
    }
}

/// Format a token for human-readable error messages
fn format_token(tok: &crate::parser::lexer::Token) -> String {
    use crate::parser::lexer::{TagToken, Token};
    match tok {
        Token::Text(_) => "text".to_string(),
        Token::ExprOpen => "'{{'".to_string(),
        Token::ExprClose => "'}}'".to_string(),
        Token::TagOpen => "'{%'".to_string(),
        Token::TagClose => "'%}'".to_string(),
        Token::Invalid(s) => format!("character '{}'", s),
        Token::Tag(tag) => match tag {
            TagToken::Ident(s) => format!("identifier '{}'", s),
            TagToken::String(s) => format!("string \"{}\"", s),
            TagToken::Int(n) => format!("number {}", n),
            TagToken::Float(n) => format!("number {}", n),
            TagToken::If => "keyword 'if'".to_string(),
            TagToken::Elif => "keyword 'elif'".to_string(),
            TagToken::Else => "keyword 'else'".to_string(),
            TagToken::EndIf => "keyword 'endif'".to_string(),
            TagToken::For => "keyword 'for'".to_string(),
            TagToken::In => "keyword 'in'".to_string(),
            TagToken::EndFor => "keyword 'endfor'".to_string(),
            TagToken::Is => "keyword 'is'".to_string(),
            TagToken::Not => "keyword 'not'".to_string(),
            TagToken::True => "'true'".to_string(),
            TagToken::False => "'false'".to_string(),
            TagToken::None => "'none'".to_string(),
            TagToken::Dot => "'.'".to_string(),
            TagToken::Comma => "','".to_string(),
            TagToken::Pipe => "'|'".to_string(),
            TagToken::ParenOpen => "'('".to_string(),
            TagToken::ParenClose => "')'".to_string(),
        },
    }
}
