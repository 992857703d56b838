//! Chain-call grammar parser.
//!
//! The grammar is intentionally narrow: a fixed `db` receiver, one collection
//! identifier, one of seven operations, and (for `find`) the optional
//! `.sort()`/`.limit()`/`.skip()` modifiers, each matched independently so
//! their order never matters. Argument spans are handed to the literal parser
//! and can only ever become data.

use bson::Document;

use crate::error::{MongorunError, Result};
use crate::literal::{parse_document, parse_pipeline};

/// One parsed chain call, ready for driver dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainCall {
    pub collection: String,
    pub operation: ChainOp,
}

/// Operation plus its parsed argument literals.
#[derive(Debug, Clone, PartialEq)]
pub enum ChainOp {
    Find {
        filter: Document,
        sort: Option<Document>,
        limit: Option<i64>,
        skip: Option<u64>,
    },
    FindOne {
        filter: Document,
    },
    Count {
        filter: Document,
    },
    Aggregate {
        pipeline: Vec<Document>,
    },
    InsertOne {
        document: Document,
    },
    UpdateOne {
        filter: Document,
        update: Document,
    },
    DeleteOne {
        filter: Document,
    },
}

/// Parse a full chain-call string.
pub fn parse_chain(query: &str) -> Result<ChainCall> {
    let query = query.trim();
    let rest = query.strip_prefix("db.").ok_or(MongorunError::MissingReceiver)?;

    let collection: String = rest
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    if collection.is_empty() {
        return Err(MongorunError::MissingReceiver);
    }
    let rest = rest[collection.len()..]
        .strip_prefix('.')
        .ok_or(MongorunError::MissingReceiver)?;

    let operation = parse_operation(rest)?;
    Ok(ChainCall {
        collection,
        operation,
    })
}

fn parse_operation(rest: &str) -> Result<ChainOp> {
    // findOne before find: prefix matching.
    if let Some((span, _)) = call_span(rest, "findOne")? {
        return Ok(ChainOp::FindOne {
            filter: parse_document(span)?,
        });
    }
    if let Some((span, after)) = call_span(rest, "find")? {
        let filter = parse_document(span)?;
        let sort = match modifier_span(after, "sort")? {
            Some(span) => Some(parse_document(span)?),
            None => None,
        };
        let limit = modifier_span(after, "limit")?.and_then(|s| s.trim().parse::<i64>().ok());
        let skip = modifier_span(after, "skip")?.and_then(|s| s.trim().parse::<u64>().ok());
        return Ok(ChainOp::Find {
            filter,
            sort,
            limit,
            skip,
        });
    }
    if let Some((span, _)) = call_span(rest, "countDocuments")? {
        return Ok(ChainOp::Count {
            filter: parse_document(span)?,
        });
    }
    if let Some((span, _)) = call_span(rest, "aggregate")? {
        return Ok(ChainOp::Aggregate {
            pipeline: parse_pipeline(span)?,
        });
    }
    if let Some((span, _)) = call_span(rest, "insertOne")? {
        return Ok(ChainOp::InsertOne {
            document: parse_document(span)?,
        });
    }
    if let Some((span, _)) = call_span(rest, "updateOne")? {
        let (filter_span, update_span) = split_two_arguments(span)?;
        return Ok(ChainOp::UpdateOne {
            filter: parse_document(filter_span)?,
            update: parse_document(update_span)?,
        });
    }
    if let Some((span, _)) = call_span(rest, "deleteOne")? {
        return Ok(ChainOp::DeleteOne {
            filter: parse_document(span)?,
        });
    }

    let name: String = rest.chars().take_while(|c| *c != '(').collect();
    Err(MongorunError::UnsupportedOperation(name.trim().to_string()))
}

/// If `rest` begins with `<name>(`, return the balanced argument span and the
/// text after the closing parenthesis.
fn call_span<'a>(rest: &'a str, name: &str) -> Result<Option<(&'a str, &'a str)>> {
    let after_name = match rest.strip_prefix(name) {
        Some(after) => after,
        None => return Ok(None),
    };
    if !after_name.starts_with('(') {
        return Ok(None);
    }
    let (span, after) = balanced_span(after_name, name)?;
    Ok(Some((span, after)))
}

/// Find `.name(` anywhere in `rest` and return its balanced span. Modifiers
/// are matched independently of each other, so ordering is irrelevant.
fn modifier_span<'a>(rest: &'a str, name: &str) -> Result<Option<&'a str>> {
    let needle = format!(".{}(", name);
    let at = match rest.find(&needle) {
        Some(at) => at,
        None => return Ok(None),
    };
    let (span, _) = balanced_span(&rest[at + name.len() + 1..], name)?;
    Ok(Some(span))
}

/// Given text starting at `(`, return the span between the balanced pair and
/// the remainder after the close. Quotes are respected so parentheses inside
/// string literals do not count.
fn balanced_span<'a>(text: &'a str, context: &str) -> Result<(&'a str, &'a str)> {
    debug_assert!(text.starts_with('('));
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok((&text[1..i], &text[i + 1..]));
                }
            }
            _ => {}
        }
    }
    Err(MongorunError::Parse(format!(
        "unbalanced parentheses in {} arguments",
        context
    )))
}

/// Split an argument span at its top-level comma (for `updateOne`).
fn split_two_arguments(span: &str) -> Result<(&str, &str)> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, c) in span.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => return Ok((&span[..i], &span[i + 1..])),
            _ => {}
        }
    }
    Err(MongorunError::Parse(
        "updateOne requires filter and update arguments".to_string(),
    ))
}
