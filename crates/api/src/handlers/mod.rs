pub mod notice;
pub mod supplier;
