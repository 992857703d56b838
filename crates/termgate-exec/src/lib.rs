//! Stateless command-execution core for TermGate.
//!
//! Each request carries the full session state (the caller-owned virtual
//! working directory), so the gateway holds nothing between calls. A request
//! is classified, possibly probed with a short-lived process, and at most one
//! OS process is spawned and awaited before the response is produced.

pub mod classify;
pub mod gateway;
pub mod shell;

pub use classify::{classify, CommandKind};
pub use gateway::{ExecGateway, ExecutionRequest, ExecutionResult, GatewayConfig};
pub use shell::{select_shell, ShellKind, ShellMode};
