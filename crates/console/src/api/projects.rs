//! Project routes.

use portfolio_core::{FormPayload, Project, ProjectId, ProjectInput};
use tracing::instrument;

use super::{Listing, Resource};
use crate::client::{ApiClient, ApiError, Body};

/// `/api/projects` resource.
#[derive(Debug, Clone)]
pub struct ProjectsApi {
    client: ApiClient,
}

impl ProjectsApi {
    /// Create the resource over a shared client.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

impl Resource for ProjectsApi {
    type Entity = Project;
    type Input = ProjectInput;
    type Query = ();

    fn validate(&self, input: &ProjectInput) -> Result<(), ApiError> {
        input.validate().map_err(ApiError::from)
    }

    #[instrument(skip_all)]
    async fn list(&self, _query: &()) -> Result<Listing<Project>, ApiError> {
        let items: Vec<Project> = self.client.get(&["api", "projects"], &[]).await?;
        Ok(Listing::unpaged(items))
    }

    #[instrument(skip_all, fields(name = %input.name))]
    async fn create(&self, input: &ProjectInput) -> Result<Project, ApiError> {
        self.client
            .post(&["api", "projects", "add-project"], Body::multipart(input)?)
            .await
    }

    #[instrument(skip_all, fields(id = %id))]
    async fn update(&self, id: &ProjectId, input: &ProjectInput) -> Result<Project, ApiError> {
        self.client
            .put(
                &["api", "projects", "update", id.as_str()],
                Body::multipart(input)?,
            )
            .await
    }

    #[instrument(skip_all, fields(id = %id))]
    async fn delete(&self, id: &ProjectId) -> Result<(), ApiError> {
        self.client
            .delete(&["api", "projects", "delete", id.as_str()])
            .await
    }
}
