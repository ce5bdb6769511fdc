//! Core domain types and logic.

pub mod aggregate;
pub mod analysis;
pub mod config_validation;
pub mod error;
pub mod index;
pub mod ranking;
pub mod summary;
pub mod trade_record;
