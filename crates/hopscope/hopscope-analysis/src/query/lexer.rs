//! Tokenizer for the neighborhood query language.

use hopscope_core::errors::{HopscopeResult, NeighborhoodError};

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Keyword or field name; keywords are matched case-insensitively by
    /// the parser.
    Ident(String),
    Number(f64),
    Str(String),
    Eq,
    Lt,
    Gt,
    Eof,
}

/// A token with its source text and byte offset.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub position: usize,
}

impl Token {
    /// True when this is the keyword `word` in any letter case.
    pub fn is_keyword(&self, word: &str) -> bool {
        matches!(&self.kind, TokenKind::Ident(s) if s.eq_ignore_ascii_case(word))
    }

    /// Token text for error messages.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Eof => "<end of query>".to_string(),
            _ => self.text.clone(),
        }
    }
}

pub fn tokenize(input: &str) -> HopscopeResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(pos, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        let single = match c {
            '=' => Some(TokenKind::Eq),
            '<' => Some(TokenKind::Lt),
            '>' => Some(TokenKind::Gt),
            _ => None,
        };
        if let Some(kind) = single {
            chars.next();
            tokens.push(Token {
                kind,
                text: c.to_string(),
                position: pos,
            });
            continue;
        }

        if c == '\'' || c == '"' {
            chars.next();
            let mut value = String::new();
            let mut closed = false;
            for (_, ch) in chars.by_ref() {
                if ch == c {
                    closed = true;
                    break;
                }
                value.push(ch);
            }
            if !closed {
                return Err(syntax(&input[pos..], pos, "unterminated string literal"));
            }
            let end = pos + value.len() + 2 * c.len_utf8();
            tokens.push(Token {
                kind: TokenKind::Str(value),
                text: input[pos..end].to_string(),
                position: pos,
            });
            continue;
        }

        if c.is_ascii_digit() || c == '-' {
            let mut end = pos;
            chars.next();
            end += c.len_utf8();
            while let Some(&(i, ch)) = chars.peek() {
                if ch.is_ascii_digit() || ch == '.' {
                    chars.next();
                    end = i + ch.len_utf8();
                } else {
                    break;
                }
            }
            let text = &input[pos..end];
            let value: f64 = text
                .parse()
                .map_err(|_| syntax(text, pos, "malformed number"))?;
            tokens.push(Token {
                kind: TokenKind::Number(value),
                text: text.to_string(),
                position: pos,
            });
            continue;
        }

        if c.is_alphabetic() || c == '_' {
            let mut end = pos;
            while let Some(&(i, ch)) = chars.peek() {
                if ch.is_alphanumeric() || ch == '_' || ch == '.' {
                    chars.next();
                    end = i + ch.len_utf8();
                } else {
                    break;
                }
            }
            let text = &input[pos..end];
            tokens.push(Token {
                kind: TokenKind::Ident(text.to_string()),
                text: text.to_string(),
                position: pos,
            });
            continue;
        }

        return Err(syntax(&c.to_string(), pos, "unexpected character"));
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        text: String::new(),
        position: input.len(),
    });
    Ok(tokens)
}

pub(crate) fn syntax(token: &str, position: usize, message: &str) -> NeighborhoodError {
    NeighborhoodError::QuerySyntax {
        token: token.to_string(),
        position,
        message: message.to_string(),
    }
}
