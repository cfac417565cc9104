//! Console state shared by every screen.

use std::sync::Arc;

use crate::api::{CertificationsApi, ContactsApi, ProjectsApi};
use crate::client::{ApiClient, ApiError};
use crate::config::ConsoleConfig;
use crate::store::{CertificationStore, ContactStore, ProjectStore};

/// The client and one store per entity collection.
///
/// Cloning is cheap; every clone observes the same stores.
#[derive(Clone, Debug)]
pub struct Console {
    inner: Arc<ConsoleInner>,
}

#[derive(Debug)]
struct ConsoleInner {
    client: ApiClient,
    projects: ProjectStore,
    certifications: CertificationStore,
    contacts: ContactStore,
}

impl Console {
    /// Build the stores over a shared client.
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self {
            inner: Arc::new(ConsoleInner {
                projects: ProjectStore::new(ProjectsApi::new(client.clone())),
                certifications: CertificationStore::new(CertificationsApi::new(client.clone())),
                contacts: ContactStore::new(ContactsApi::new(client.clone())),
                client,
            }),
        }
    }

    /// Build the client from configuration, then the stores.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] if the HTTP client cannot be built.
    pub fn from_config(config: &ConsoleConfig) -> Result<Self, ApiError> {
        Ok(Self::new(ApiClient::from_config(config)?))
    }

    #[must_use]
    pub fn client(&self) -> &ApiClient {
        &self.inner.client
    }

    #[must_use]
    pub fn projects(&self) -> &ProjectStore {
        &self.inner.projects
    }

    #[must_use]
    pub fn certifications(&self) -> &CertificationStore {
        &self.inner.certifications
    }

    #[must_use]
    pub fn contacts(&self) -> &ContactStore {
        &self.inner.contacts
    }
}
