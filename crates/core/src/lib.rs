//! Supplier correction notice workflow: domain types, validation, and the
//! lifecycle state machine. No I/O beyond the async ports in [`ports`].

pub mod capability;
pub mod error;
pub mod event;
pub mod history;
pub mod memory;
pub mod notice;
pub mod plan;
pub mod ports;
pub mod roles;
pub mod service;
pub mod status;
pub mod types;
pub mod workflow;
