//! `wppfm-editor` library crate.
//!
//! The page-session controller and its persistence collaborator. The
//! binary entrypoint lives in `main.rs`.

pub mod ajax;
pub mod backend;
pub mod config;
pub mod session;
