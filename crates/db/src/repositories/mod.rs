//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod notice_event_repo;
pub mod notice_repo;
pub mod supplier_repo;

pub use notice_event_repo::NoticeEventRepo;
pub use notice_repo::NoticeRepo;
pub use supplier_repo::SupplierRepo;
