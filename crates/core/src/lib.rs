//! Pure domain logic for the stocktake inventory platform.
//!
//! Everything in this crate is synchronous and free of I/O: status
//! derivation, the shared list-view engine, export writers, CSV import
//! parsing, and field validation. The `db` and `api` crates build on
//! these types; nothing here touches the database or the network.

pub mod document;
pub mod error;
pub mod export;
pub mod import;
pub mod movement;
pub mod patch;
pub mod status;
pub mod types;
pub mod validation;
pub mod view;
