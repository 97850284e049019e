//! Core types shared across calltrail crates
//!
//! This crate provides foundational types used by the error facility,
//! the capture core and the logger facade:
//!
//! - **Schema constants**: canonical field keys, channel names and the
//!   reserved backtrace key prefix
//! - **Sensitive data**: `Sensitive<T>` marker for automatic redaction

pub mod schema;
pub mod sensitive;

pub use sensitive::Sensitive;
