//! Chat addressing types and error helpers shared by the tessera crates.

pub mod error;
pub mod types;

pub use {
    error::FromMessage,
    types::{ChatType, Destination},
};
