//! Literal parser for chain-call argument spans.
//!
//! A span is interpreted as a data value only: a JSON superset with unquoted
//! keys, single-quoted strings, and the document-store constructors
//! `ObjectId("...")` and `ISODate("...")`/`Date("...")` (optionally prefixed
//! with `new`). Values are constructed directly as BSON; nothing is ever
//! evaluated as code.

use bson::{oid::ObjectId, Bson, DateTime, Document};

use crate::error::{MongorunError, Result};

/// Parse a span as a single literal. Empty or whitespace-only spans are the
/// empty object.
pub fn parse_literal(span: &str) -> Result<Bson> {
    if span.trim().is_empty() {
        return Ok(Bson::Document(Document::new()));
    }
    Parser::new(span).parse_root().map_err(|message| literal_error(span, message))
}

/// Parse a span that must be an object literal (filters, updates, documents).
pub fn parse_document(span: &str) -> Result<Document> {
    match parse_literal(span)? {
        Bson::Document(doc) => Ok(doc),
        other => Err(literal_error(
            span,
            format!("expected an object literal, found {}", type_name(&other)),
        )),
    }
}

/// Parse a span that must be an array of object literals (pipelines). Empty
/// or whitespace-only spans are the empty pipeline.
pub fn parse_pipeline(span: &str) -> Result<Vec<Document>> {
    if span.trim().is_empty() {
        return Ok(Vec::new());
    }
    let stages = match parse_literal(span)? {
        Bson::Array(items) => items,
        other => {
            return Err(literal_error(
                span,
                format!("expected an array literal, found {}", type_name(&other)),
            ));
        }
    };
    stages
        .into_iter()
        .map(|stage| match stage {
            Bson::Document(doc) => Ok(doc),
            other => Err(literal_error(
                span,
                format!("pipeline stages must be objects, found {}", type_name(&other)),
            )),
        })
        .collect()
}

fn literal_error(span: &str, message: String) -> MongorunError {
    MongorunError::Literal {
        span: span.trim().to_string(),
        message,
    }
}

fn type_name(value: &Bson) -> &'static str {
    match value {
        Bson::Document(_) => "an object",
        Bson::Array(_) => "an array",
        Bson::String(_) => "a string",
        Bson::Boolean(_) => "a boolean",
        Bson::Null => "null",
        Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) => "a number",
        _ => "another value",
    }
}

type ParseResult<T> = std::result::Result<T, String>;

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(src: &str) -> Self {
        Self {
            chars: src.chars().collect(),
            pos: 0,
        }
    }

    fn parse_root(mut self) -> ParseResult<Bson> {
        self.skip_ws();
        let value = self.parse_value()?;
        self.skip_ws();
        match self.peek() {
            None => Ok(value),
            Some(c) => Err(format!("unexpected trailing character '{}'", c)),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, expected: char) -> ParseResult<()> {
        match self.bump() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(format!("expected '{}', found '{}'", expected, c)),
            None => Err(format!("expected '{}', found end of input", expected)),
        }
    }

    fn parse_value(&mut self) -> ParseResult<Bson> {
        self.skip_ws();
        match self.peek() {
            Some('{') => self.parse_object().map(Bson::Document),
            Some('[') => self.parse_array(),
            Some(q @ ('"' | '\'')) => self.parse_string(q).map(Bson::String),
            Some(c) if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' => {
                self.parse_number()
            }
            Some(c) if is_ident_start(c) => self.parse_word(),
            Some(c) => Err(format!("unexpected character '{}'", c)),
            None => Err("unexpected end of input".to_string()),
        }
    }

    fn parse_object(&mut self) -> ParseResult<Document> {
        self.expect('{')?;
        let mut doc = Document::new();
        loop {
            self.skip_ws();
            if self.peek() == Some('}') {
                self.bump();
                return Ok(doc);
            }
            let key = self.parse_key()?;
            self.skip_ws();
            self.expect(':')?;
            let value = self.parse_value()?;
            doc.insert(key, value);
            self.skip_ws();
            match self.bump() {
                Some(',') => continue,
                Some('}') => return Ok(doc),
                Some(c) => return Err(format!("expected ',' or '}}', found '{}'", c)),
                None => return Err("unterminated object literal".to_string()),
            }
        }
    }

    fn parse_key(&mut self) -> ParseResult<String> {
        match self.peek() {
            Some(q @ ('"' | '\'')) => self.parse_string(q),
            Some(c) if is_ident_char(c) => {
                let mut key = String::new();
                while matches!(self.peek(), Some(c) if is_ident_char(c)) {
                    key.push(self.bump().unwrap());
                }
                Ok(key)
            }
            Some(c) => Err(format!("invalid object key starting with '{}'", c)),
            None => Err("unterminated object literal".to_string()),
        }
    }

    fn parse_array(&mut self) -> ParseResult<Bson> {
        self.expect('[')?;
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.peek() == Some(']') {
                self.bump();
                return Ok(Bson::Array(items));
            }
            items.push(self.parse_value()?);
            self.skip_ws();
            match self.bump() {
                Some(',') => continue,
                Some(']') => return Ok(Bson::Array(items)),
                Some(c) => return Err(format!("expected ',' or ']', found '{}'", c)),
                None => return Err("unterminated array literal".to_string()),
            }
        }
    }

    fn parse_string(&mut self, quote: char) -> ParseResult<String> {
        self.expect(quote)?;
        let mut out = String::new();
        loop {
            match self.bump() {
                Some(c) if c == quote => return Ok(out),
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some('b') => out.push('\u{0008}'),
                    Some('f') => out.push('\u{000C}'),
                    Some('u') => {
                        let mut code = String::new();
                        for _ in 0..4 {
                            match self.bump() {
                                Some(h) if h.is_ascii_hexdigit() => code.push(h),
                                _ => return Err("invalid \\u escape".to_string()),
                            }
                        }
                        let value = u32::from_str_radix(&code, 16)
                            .map_err(|_| "invalid \\u escape".to_string())?;
                        match char::from_u32(value) {
                            Some(c) => out.push(c),
                            None => return Err("invalid \\u escape".to_string()),
                        }
                    }
                    Some(c) => out.push(c),
                    None => return Err("unterminated string literal".to_string()),
                },
                Some(c) => out.push(c),
                None => return Err("unterminated string literal".to_string()),
            }
        }
    }

    fn parse_number(&mut self) -> ParseResult<Bson> {
        let mut text = String::new();
        while matches!(
            self.peek(),
            Some(c) if c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E')
        ) {
            text.push(self.bump().unwrap());
        }
        if !text.contains(['.', 'e', 'E']) {
            if let Ok(n) = text.parse::<i64>() {
                return Ok(Bson::Int64(n));
            }
        }
        text.parse::<f64>()
            .map(Bson::Double)
            .map_err(|_| format!("invalid number '{}'", text))
    }

    fn parse_word(&mut self) -> ParseResult<Bson> {
        let word = self.take_ident();
        match word.as_str() {
            "true" => Ok(Bson::Boolean(true)),
            "false" => Ok(Bson::Boolean(false)),
            "null" => Ok(Bson::Null),
            // `new Date(...)` / `new ObjectId(...)` — the keyword is optional.
            "new" => {
                self.skip_ws();
                self.parse_word()
            }
            "ObjectId" => {
                let hex = self.parse_call_string()?;
                ObjectId::parse_str(&hex)
                    .map(Bson::ObjectId)
                    .map_err(|e| format!("invalid ObjectId: {}", e))
            }
            "ISODate" | "Date" => {
                let text = self.parse_call_string()?;
                DateTime::parse_rfc3339_str(&text)
                    .map(Bson::DateTime)
                    .map_err(|e| format!("invalid date '{}': {}", text, e))
            }
            other => Err(format!("unexpected token '{}'", other)),
        }
    }

    fn take_ident(&mut self) -> String {
        let mut word = String::new();
        while matches!(self.peek(), Some(c) if is_ident_char(c)) {
            word.push(self.bump().unwrap());
        }
        word
    }

    /// A constructor argument: `( "<string>" )`.
    fn parse_call_string(&mut self) -> ParseResult<String> {
        self.skip_ws();
        self.expect('(')?;
        self.skip_ws();
        let text = match self.peek() {
            Some(q @ ('"' | '\'')) => self.parse_string(q)?,
            _ => return Err("constructor requires a string argument".to_string()),
        };
        self.skip_ws();
        self.expect(')')?;
        Ok(text)
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}
