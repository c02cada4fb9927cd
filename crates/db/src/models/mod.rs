//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches
//! - Where the entity has a list screen, a joined row view-model that
//!   implements `stocktake_core::view::ListRecord`

pub mod asset;
pub mod company;
pub mod document;
pub mod license;
pub mod place;
pub mod transfer;
pub mod user;
