//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. All queries bind their
//! parameters; multi-table writes run inside a single transaction.

pub mod asset_repo;
pub mod company_repo;
pub mod document_repo;
pub mod license_repo;
pub mod place_repo;
pub mod transfer_repo;
pub mod user_repo;

pub use asset_repo::AssetRepo;
pub use company_repo::CompanyRepo;
pub use document_repo::DocumentRepo;
pub use license_repo::LicenseRepo;
pub use place_repo::{LocationRepo, SectionRepo};
pub use transfer_repo::TransferRepo;
pub use user_repo::UserRepo;
