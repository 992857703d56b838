//! Structured-query-to-command compiler.
//!
//! Turns a typed connection descriptor plus a free-text query into one
//! executable command line for the matching database client. Each kind is a
//! data record (default port + renderer) in a lookup, so adding a kind is a
//! pure data addition. The mongo kind renders against the `mongorun`
//! interpreter rather than an external shell client.

pub mod chain;
pub mod descriptor;
pub mod render;

pub use chain::{ChainOperation, ChainQueryDescriptor};
pub use descriptor::{ConnectionDescriptor, DbKind};
pub use render::{kind_spec, render, KindSpec};
