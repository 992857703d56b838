//! mongorun — restricted MongoDB chain-call interpreter.
//!
//! Parses `db.<collection>.<operation>(<args>)[.modifier(...)]...` text into
//! data-only values and runs the corresponding driver calls. Argument spans
//! are parsed by a dedicated literal grammar; no script evaluation of any
//! kind happens here.

pub mod error;
pub mod exec;
pub mod literal;
pub mod parser;

pub use error::{MongorunError, Result};
pub use parser::{parse_chain, ChainCall, ChainOp};
