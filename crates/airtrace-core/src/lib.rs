//! airtrace-core: Shared domain types for the airtrace Wi-Fi auditor.
//!
//! This crate provides the types used across all airtrace components:
//! - `Bssid`, the validated hardware-address key of an access point
//! - `NetworkRecord`, one observed access point at scan time
//! - `ScanSnapshot`, one full scan event
//! - Encryption / cipher / authentication enums
//! - Common error types

pub mod error;
pub mod types;

pub use error::CoreError;
