//! Parser implementation using chumsky

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::parser::ast::*;
use crate::parser::lexer::{TagToken as T, Token};

/// Parse template source into an AST
pub fn parse(input: &str) -> Result<Template, Vec<crate::TemplateError>> {
    let len = input.len();

    let token_iter = crate::parser::lexer::lex(input)
        .into_iter()
        .map(|(tok, span)| (tok, span.into()));

    // Turn the token iterator into a stream that chumsky can use
    let token_stream = Stream::from_iter(token_iter)
        // Split (Token, SimpleSpan) into token and span parts
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    template_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| errs.into_iter().map(|e| e.into()).collect())
}

/// Helper to extract span range from chumsky's MapExtra
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> std::ops::Range<usize> {
    e.start()..e.end()
}

/// A complete block tag made of a single keyword, e.g. `{% endif %}`
fn keyword<'a, I>(kw: T) -> impl Parser<'a, I, (), extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    just(Token::TagOpen)
        .ignore_then(just(Token::Tag(kw)))
        .ignore_then(just(Token::TagClose))
        .ignored()
}

fn template_parser<'a, I>() -> impl Parser<'a, I, Template, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let identifier = select! {
        Token::Tag(T::Ident(s)) => Identifier::new(s),
    }
    .map_with(|id, e| Spanned::new(id, span_range(&e.span())));

    let literal = select! {
        Token::Tag(T::String(s)) => Literal::Str(s),
        Token::Tag(T::Int(n)) => Literal::Int(n),
        Token::Tag(T::Float(n)) => Literal::Float(n),
        Token::Tag(T::True) => Literal::Bool(true),
        Token::Tag(T::False) => Literal::Bool(false),
        Token::Tag(T::None) => Literal::None,
    }
    .map_with(|lit, e| Spanned::new(Expr::Literal(lit), span_range(&e.span())));

    let expr = recursive(|expr| {
        let atom = choice((
            identifier
                .clone()
                .map(|id| Spanned::new(Expr::Var(id.node), id.span)),
            literal,
            expr.clone().delimited_by(
                just(Token::Tag(T::ParenOpen)),
                just(Token::Tag(T::ParenClose)),
            ),
        ));

        // `.name` is an attribute, `.name()` a method call
        let postfix = just(Token::Tag(T::Dot))
            .ignore_then(identifier.clone())
            .then(
                just(Token::Tag(T::ParenOpen))
                    .then(just(Token::Tag(T::ParenClose)))
                    .or_not(),
            )
            .map(|(name, call)| (name, call.is_some()));

        let accessed = atom
            .then(postfix.repeated().collect::<Vec<_>>())
            .map_with(|(base, ops), e| {
                let span = span_range(&e.span());
                ops.into_iter().fold(base, |inner, (name, call)| {
                    let node = if call {
                        Expr::Call(Box::new(inner), name)
                    } else {
                        Expr::Attr(Box::new(inner), name)
                    };
                    Spanned::new(node, span.clone())
                })
            });

        let filter_args = expr
            .clone()
            .separated_by(just(Token::Tag(T::Comma)))
            .allow_trailing()
            .collect::<Vec<_>>()
            .delimited_by(
                just(Token::Tag(T::ParenOpen)),
                just(Token::Tag(T::ParenClose)),
            );

        let filter = just(Token::Tag(T::Pipe))
            .ignore_then(identifier.clone())
            .then(filter_args.or_not());

        accessed
            .then(filter.repeated().collect::<Vec<_>>())
            .map_with(|(base, filters), e| {
                let span = span_range(&e.span());
                filters.into_iter().fold(base, |inner, (name, args)| {
                    Spanned::new(
                        Expr::Filter {
                            expr: Box::new(inner),
                            name,
                            args: args.unwrap_or_default(),
                        },
                        span.clone(),
                    )
                })
            })
            .boxed()
    });

    // `none` is a keyword token but also the name of a test
    let test_name = choice((
        identifier.clone(),
        just(Token::Tag(T::None))
            .map_with(|_, e| Spanned::new(Identifier::new("none"), span_range(&e.span()))),
    ));

    let base_condition = expr
        .clone()
        .then(
            just(Token::Tag(T::Is))
                .ignore_then(just(Token::Tag(T::Not)).or_not())
                .then(test_name)
                .or_not(),
        )
        .map(|(expr, test)| match test {
            Some((negated, test)) => Condition::Test {
                expr,
                test,
                negated: negated.is_some(),
            },
            None => Condition::Truthy(expr),
        });

    let condition = just(Token::Tag(T::Not))
        .or_not()
        .then(base_condition)
        .map_with(|(not, cond), e| {
            let span = span_range(&e.span());
            let cond = Spanned::new(cond, span.clone());
            match not {
                Some(_) => Spanned::new(Condition::Not(Box::new(cond)), span),
                None => cond,
            }
        });

    let nodes = recursive(|nodes| {
        let text = select! {
            Token::Text(s) => Node::Text(s),
        };

        let output = expr
            .clone()
            .delimited_by(just(Token::ExprOpen), just(Token::ExprClose))
            .map(Node::Output);

        let if_open = just(Token::TagOpen)
            .ignore_then(just(Token::Tag(T::If)))
            .ignore_then(condition.clone())
            .then_ignore(just(Token::TagClose));

        let elif_open = just(Token::TagOpen)
            .ignore_then(just(Token::Tag(T::Elif)))
            .ignore_then(condition.clone())
            .then_ignore(just(Token::TagClose));

        let if_block = if_open
            .then(nodes.clone())
            .then(
                elif_open
                    .then(nodes.clone())
                    .repeated()
                    .collect::<Vec<_>>(),
            )
            .then(keyword(T::Else).ignore_then(nodes.clone()).or_not())
            .then_ignore(keyword(T::EndIf))
            .map(|(((cond, body), elifs), otherwise)| {
                let mut branches = vec![(cond, body)];
                branches.extend(elifs);
                Node::If(IfBlock {
                    branches,
                    otherwise,
                })
            });

        let for_open = just(Token::TagOpen)
            .ignore_then(just(Token::Tag(T::For)))
            .ignore_then(
                identifier
                    .clone()
                    .separated_by(just(Token::Tag(T::Comma)))
                    .at_least(1)
                    .collect::<Vec<_>>(),
            )
            .then_ignore(just(Token::Tag(T::In)))
            .then(expr.clone())
            .then_ignore(just(Token::TagClose));

        let for_block = for_open
            .then(nodes.clone())
            .then(keyword(T::Else).ignore_then(nodes.clone()).or_not())
            .then_ignore(keyword(T::EndFor))
            .map(|(((targets, iterable), body), otherwise)| {
                Node::For(ForBlock {
                    targets,
                    iterable,
                    body,
                    otherwise,
                })
            });

        choice((text, output, if_block, for_block))
            .map_with(|node, e| Spanned::new(node, span_range(&e.span())))
            .repeated()
            .collect::<Vec<_>>()
            .boxed()
    });

    nodes
        .then_ignore(end())
        .map(|nodes| Template { nodes })
}
