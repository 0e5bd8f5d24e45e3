//! # Patientor API
//!
//! HTTP client for the Patientor REST service.
//!
//! Handles:
//! - JSON requests and responses with `reqwest`
//! - mapping HTTP failures onto `PatientorError` (server `{ "error": ... }` bodies become
//!   `PatientorError::Rejected`)
//!
//! Implements `patientor_core::PatientorApi`, so the core's page orchestration can run against the
//! real service.

#![warn(rust_2018_idioms)]

pub mod client;

pub use client::PatientorClient;
