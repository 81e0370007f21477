//! Domain logic for the product feed editor.
//!
//! Everything here is pure: category trees, activation propagation, the
//! cascading taxonomy picker, the feed configuration and its attribute
//! blocks. Persistence and rendering live outside this crate.

pub mod attributes;
pub mod category_tree;
pub mod channels;
pub mod error;
pub mod feed;
pub mod level_selector;
pub mod propagator;
pub mod snapshot;
pub mod types;
pub mod validation;
