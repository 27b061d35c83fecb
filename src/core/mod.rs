//! Core library components.
//!
//! The secret-store engine: path routing across mounted stores, the secret
//! codec, recipient management, cipher backends and the insert/show
//! workflow. Nothing here parses arguments or draws to a terminal except
//! through the injected [`prompt::Prompt`].

pub mod cipher;
pub mod config;
pub mod constants;
pub mod domain;
pub mod mount;
pub mod prompt;
pub mod recipients;
pub mod session;
pub mod store;
pub mod sync;
pub mod types;
pub mod vault;
