use crate::language::{
    span::Span,
    token::{Token, TokenKind},
};
use nom::{
    branch::alt,
    bytes::complete::{tag, take_until, take_while},
    character::complete::{alpha1, alphanumeric1, char, digit1, multispace1, not_line_ending},
    combinator::{map, map_res, recognize, value},
    multi::many0_count,
    sequence::{delimited, pair},
    IResult,
};

#[derive(Clone, Debug)]
pub struct LexError {
    pub message: String,
    pub span: Span,
}

pub fn lex(source: &str) -> Result<Vec<Token>, Vec<LexError>> {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    let mut remaining = source;

    loop {
        remaining = match trivia(remaining) {
            Ok((rest, _)) => rest,
            Err(_) => remaining,
        };
        let offset = source.len() - remaining.len();
        if remaining.is_empty() {
            tokens.push(Token {
                kind: TokenKind::Eof,
                span: Span::new(offset, offset),
            });
            break;
        }
        if remaining.starts_with("/*") {
            errors.push(LexError {
                message: "unterminated block comment".into(),
                span: Span::new(offset, source.len()),
            });
            tokens.push(Token {
                kind: TokenKind::Eof,
                span: Span::new(source.len(), source.len()),
            });
            break;
        }

        match token(remaining) {
            Ok((rest, kind)) => {
                let end = source.len() - rest.len();
                tokens.push(Token {
                    kind,
                    span: Span::new(offset, end),
                });
                remaining = rest;
            }
            Err(_) => {
                let (rest, message) = recover(remaining);
                let end = source.len() - rest.len();
                errors.push(LexError {
                    message,
                    span: Span::new(offset, end),
                });
                remaining = rest;
            }
        }
    }

    if errors.is_empty() {
        Ok(tokens)
    } else {
        Err(errors)
    }
}

fn trivia(input: &str) -> IResult<&str, usize> {
    many0_count(alt((multispace1, line_comment, block_comment)))(input)
}

fn line_comment(input: &str) -> IResult<&str, &str> {
    recognize(pair(tag("//"), not_line_ending))(input)
}

fn block_comment(input: &str) -> IResult<&str, &str> {
    recognize(delimited(tag("/*"), take_until("*/"), tag("*/")))(input)
}

fn token(input: &str) -> IResult<&str, TokenKind> {
    alt((integer, string_literal, word, double_symbol, single_symbol))(input)
}

fn integer(input: &str) -> IResult<&str, TokenKind> {
    map_res(digit1, |digits: &str| {
        digits.parse::<i64>().map(TokenKind::Integer)
    })(input)
}

fn string_literal(input: &str) -> IResult<&str, TokenKind> {
    map(
        delimited(char('"'), take_while(|c: char| c != '"' && c != '\n'), char('"')),
        |body: &str| TokenKind::String(body.to_string()),
    )(input)
}

fn word(input: &str) -> IResult<&str, TokenKind> {
    map(
        recognize(pair(
            alt((alpha1, tag("_"))),
            many0_count(alt((alphanumeric1, tag("_")))),
        )),
        |ident: &str| {
            TokenKind::keyword(ident).unwrap_or_else(|| TokenKind::Identifier(ident.to_string()))
        },
    )(input)
}

fn double_symbol(input: &str) -> IResult<&str, TokenKind> {
    alt((
        value(TokenKind::AmpersandAmpersand, tag("&&")),
        value(TokenKind::PipePipe, tag("||")),
        value(TokenKind::BangEq, tag("!=")),
        value(TokenKind::EqEq, tag("==")),
        value(TokenKind::LtEq, tag("<=")),
        value(TokenKind::GtEq, tag(">=")),
    ))(input)
}

fn single_symbol(input: &str) -> IResult<&str, TokenKind> {
    alt((
        value(TokenKind::Bang, char('!')),
        value(TokenKind::Eq, char('=')),
        value(TokenKind::Lt, char('<')),
        value(TokenKind::Gt, char('>')),
        value(TokenKind::Plus, char('+')),
        value(TokenKind::Minus, char('-')),
        value(TokenKind::Star, char('*')),
        value(TokenKind::Slash, char('/')),
        value(TokenKind::LParen, char('(')),
        value(TokenKind::RParen, char(')')),
        value(TokenKind::LBrace, char('{')),
        value(TokenKind::RBrace, char('}')),
        value(TokenKind::Comma, char(',')),
        value(TokenKind::Semi, char(';')),
    ))(input)
}

/// Skips past an unlexable prefix, returning the rest and a description of what went wrong.
fn recover(input: &str) -> (&str, String) {
    let mut chars = input.chars();
    match chars.next() {
        Some('"') => {
            let line_end = input.find('\n').unwrap_or(input.len());
            (&input[line_end..], "unterminated string literal".into())
        }
        Some(ch) if ch.is_ascii_digit() => {
            let digits_end = input
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(input.len());
            (
                &input[digits_end..],
                format!("integer literal `{}` is out of range", &input[..digits_end]),
            )
        }
        Some(ch) => (chars.as_str(), format!("unexpected character `{ch}`")),
        None => (input, "unexpected end of input".into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source)
            .expect("lex")
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn lexes_keywords_identifiers_and_symbols() {
        assert_eq!(
            kinds("func main() { var x_1; x_1 = -7 / 2 <= 3; }"),
            vec![
                TokenKind::Func,
                TokenKind::Identifier("main".into()),
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::LBrace,
                TokenKind::Var,
                TokenKind::Identifier("x_1".into()),
                TokenKind::Semi,
                TokenKind::Identifier("x_1".into()),
                TokenKind::Eq,
                TokenKind::Minus,
                TokenKind::Integer(7),
                TokenKind::Slash,
                TokenKind::Integer(2),
                TokenKind::LtEq,
                TokenKind::Integer(3),
                TokenKind::Semi,
                TokenKind::RBrace,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn skips_comments_and_keeps_spans() {
        let tokens = lex("// header\n/* block\n comment */ raise \"bad\";").expect("lex");
        assert_eq!(tokens[0].kind, TokenKind::Raise);
        assert_eq!(tokens[1].kind, TokenKind::String("bad".into()));
        assert_eq!(tokens[1].span, Span::new(37, 42));
    }

    #[test]
    fn longest_symbol_wins() {
        assert_eq!(
            kinds("a==b!=!c&&d||e"),
            vec![
                TokenKind::Identifier("a".into()),
                TokenKind::EqEq,
                TokenKind::Identifier("b".into()),
                TokenKind::BangEq,
                TokenKind::Bang,
                TokenKind::Identifier("c".into()),
                TokenKind::AmpersandAmpersand,
                TokenKind::Identifier("d".into()),
                TokenKind::PipePipe,
                TokenKind::Identifier("e".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn reports_unterminated_string_and_stray_characters() {
        let errors = lex("x = \"oops;\ny = 1 @ 2;").unwrap_err();
        let messages: Vec<_> = errors.iter().map(|err| err.message.as_str()).collect();
        assert_eq!(
            messages,
            vec!["unterminated string literal", "unexpected character `@`"]
        );
    }

    #[test]
    fn reports_oversized_integer() {
        let errors = lex("99999999999999999999").unwrap_err();
        assert!(errors[0].message.contains("out of range"));
    }
}
