//! Core types for the portfolio console.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod attachment;
pub mod email;
pub mod id;
pub mod pagination;

pub use attachment::{Attachment, AttachmentError};
pub use email::{Email, EmailError};
pub use id::*;
pub use pagination::{ContactQuery, Pagination};
