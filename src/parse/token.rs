use logos::{Lexer, Logos};
use thiserror::Error;

use super::ParseError;
use crate::limits::MAX_ARGS;

#[derive(Debug, Clone, PartialEq, Default, Error)]
pub enum LexerError {
    #[default]
    #[error("unknown token")]
    UnknownToken,
}

#[derive(Debug, PartialEq, Logos)]
#[logos(skip r"[ \t\n\r\x0B\x0C]+", error = LexerError)]
pub enum Token<'a> {
    #[regex(r#"[^ \t\n\r\x0B\x0C"]+"#)]
    Bare(&'a str),
    #[regex(r#""[^"]*""#, quoted_callback)]
    Quoted(&'a str),
    /// A quote that is never closed runs to the end of the input.
    #[regex(r#""[^"]*"#, unterminated_callback)]
    Unterminated(&'a str),
}

fn quoted_callback<'a>(lex: &mut Lexer<'a, Token<'a>>) -> &'a str {
    let slice = lex.slice();
    &slice[1..slice.len() - 1]
}

fn unterminated_callback<'a>(lex: &mut Lexer<'a, Token<'a>>) -> &'a str {
    &lex.slice()[1..]
}

/// Splits one command into its arguments.
///
/// Whitespace separates arguments unless it sits between double quotes. A
/// bare word directly followed by a quoted span is one argument (`ab"c d"`
/// is `abc d`), and a closing quote always ends the argument. Empty quoted
/// spans produce nothing.
pub fn tokenize(line: &str) -> Result<Vec<String>, ParseError> {
    let mut lexer = Token::lexer(line.trim());
    let mut tokens = Vec::new();
    // bare word that may still be glued to a following quote, with its end offset
    let mut pending: Option<(String, usize)> = None;

    while let Some(token) = lexer.next() {
        let span = lexer.span();

        match token {
            Ok(Token::Quoted(quoted)) | Ok(Token::Unterminated(quoted)) => match pending.take() {
                Some((mut word, end)) if end == span.start => {
                    word.push_str(quoted);
                    push(&mut tokens, word)?;
                }
                other => {
                    if let Some((word, _)) = other {
                        push(&mut tokens, word)?;
                    }
                    if !quoted.is_empty() {
                        push(&mut tokens, quoted.to_owned())?;
                    }
                }
            },
            Ok(Token::Bare(_)) | Err(_) => {
                if let Some((previous, _)) = pending.replace((lexer.slice().to_owned(), span.end))
                {
                    push(&mut tokens, previous)?;
                }
            }
        }
    }

    if let Some((word, _)) = pending {
        push(&mut tokens, word)?;
    }

    Ok(tokens)
}

fn push(tokens: &mut Vec<String>, token: String) -> Result<(), ParseError> {
    if tokens.len() == MAX_ARGS {
        return Err(ParseError::ArgumentOverflow);
    }
    tokens.push(token);
    Ok(())
}
