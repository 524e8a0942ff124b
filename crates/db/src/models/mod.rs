//! Row structs and insert DTOs.
//!
//! Each submodule contains a `FromRow` struct matching the table and, where
//! rows are written directly, a `Create*` DTO.

pub mod event;
pub mod notice;
pub mod supplier;
