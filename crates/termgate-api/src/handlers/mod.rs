//! HTTP request handlers.

pub mod auth;
pub mod dbcmd;
pub mod exec;
pub mod files;

pub use auth::{login_handler, verify_handler};
pub use dbcmd::dbcmd_handler;
pub use exec::exec_handler;
pub use files::{download_handler, upload_handler};
