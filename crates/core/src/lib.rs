//! Portfolio Core - Shared types library.
//!
//! This crate provides the domain types used across all portfolio components:
//! - `site` - HTTP server for the public site API and the admin API
//! - `cli` - Command-line tools for migrations, seeding and admin API access
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. Stored documents come in as `serde_json::Value` and
//! leave as typed records, so every reader sees the same normalized shapes.
//!
//! # Modules
//!
//! - [`types`] - Projects, skills, company content and the `ProjectRef` union
//! - [`seed`] - Static default content used for seeding and read fallbacks
//! - [`forms`] - Draft types that stage admin edits before submission

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod forms;
pub mod seed;
pub mod types;

pub use types::*;
