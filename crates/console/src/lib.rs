//! Portfolio admin console.
//!
//! An HTTP client adapter for the portfolio backend plus one cached store per
//! entity collection (projects, certifications and contact responses).
//!
//! ```rust,ignore
//! let config = ConsoleConfig::from_env()?;
//! let console = Console::from_config(&config)?;
//!
//! console.projects().fetch_all(&()).await?;
//! for project in console.projects().items() {
//!     println!("{} {}", project.id, project.name);
//! }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod client;
pub mod config;
pub mod credential;
pub mod state;
pub mod store;

pub use client::{ApiClient, ApiError};
pub use config::{ConfigError, ConsoleConfig};
pub use credential::CredentialSource;
pub use state::Console;
pub use store::{CertificationStore, ContactStore, EntityStore, ProjectStore, StoreState};
