//! Lexer for the attribute DSL.

use winnow::ascii::space0;
use winnow::combinator::{alt, delimited};
use winnow::prelude::*;
use winnow::token::{take_till, take_while};

/// Token types for the DSL.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Words and values
    Ident(String),  // attribute name or bare value
    Number(String), // word that parses as a number, kept verbatim
    Quoted(String), // "..." or '...'

    // Operators
    Eq, // =
    Ne, // !=
    Lt, // <
    Le, // <=
    Gt, // >
    Ge, // >=

    // Boolean operators
    And, // &
    Or,  // |
    Not, // !

    // Punctuation
    LParen, // (
    RParen, // )
    Star,   // *

    Eof,
}

type PResult<T> = Result<T, winnow::error::ErrMode<winnow::error::ContextError>>;

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | ':' | '-' | '*' | '.' | '/' | '#')
}

/// Lex a bare word: attribute names, unquoted values, numbers, globs.
fn lex_word(input: &mut &str) -> PResult<Token> {
    let word = take_while(1.., is_word_char).parse_next(input)?;

    if word == "*" {
        Ok(Token::Star)
    } else if word.parse::<f64>().is_ok() {
        Ok(Token::Number(word.to_string()))
    } else {
        Ok(Token::Ident(word.to_string()))
    }
}

/// Lex a single- or double-quoted value. No escape sequences.
fn lex_quoted(input: &mut &str) -> PResult<Token> {
    let value = alt((
        delimited('"', take_till(0.., '"'), '"'),
        delimited('\'', take_till(0.., '\''), '\''),
    ))
    .parse_next(input)?;
    Ok(Token::Quoted(value.to_string()))
}

fn lex_token(input: &mut &str) -> PResult<Token> {
    space0.parse_next(input)?;

    if input.is_empty() {
        return Ok(Token::Eof);
    }

    alt((
        // Multi-char operators first
        "!=".value(Token::Ne),
        "<=".value(Token::Le),
        ">=".value(Token::Ge),
        "=".value(Token::Eq),
        "<".value(Token::Lt),
        ">".value(Token::Gt),
        "&".value(Token::And),
        "|".value(Token::Or),
        "!".value(Token::Not),
        "(".value(Token::LParen),
        ")".value(Token::RParen),
        lex_quoted,
        lex_word,
    ))
    .parse_next(input)
}

/// Tokenize the entire input.
pub fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let mut remaining = input;
    let mut tokens = Vec::new();

    loop {
        match lex_token(&mut remaining) {
            Ok(Token::Eof) => break,
            Ok(tok) => tokens.push(tok),
            Err(e) => return Err(format!("Lexer error at '{remaining}': {e:?}")),
        }
    }

    tokens.push(Token::Eof);
    Ok(tokens)
}
