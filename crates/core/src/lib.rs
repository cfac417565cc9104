//! Portfolio Core - Shared domain types.
//!
//! This crate provides the types shared by every portfolio console component:
//! - `console` - HTTP client adapter and entity stores
//! - `cli` - Command-line front end for the admin console
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no HTTP clients.
//! Records mirror the backend's JSON shape; inputs carry what the admin forms
//! submit, including the optional binary attachment.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, attachments, pagination
//! - [`models`] - Project, certification, and contact response records

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod models;
pub mod types;

pub use models::*;
pub use types::*;
