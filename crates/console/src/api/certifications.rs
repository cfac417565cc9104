//! Certification routes.

use portfolio_core::{Certification, CertificationId, CertificationInput, FormPayload};
use tracing::instrument;

use super::{Listing, Resource};
use crate::client::{ApiClient, ApiError, Body};

/// `/api/certifications` resource. The list route accepts no filters.
#[derive(Debug, Clone)]
pub struct CertificationsApi {
    client: ApiClient,
}

impl CertificationsApi {
    /// Create the resource over a shared client.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

impl Resource for CertificationsApi {
    type Entity = Certification;
    type Input = CertificationInput;
    type Query = ();

    fn validate(&self, input: &CertificationInput) -> Result<(), ApiError> {
        input.validate().map_err(ApiError::from)
    }

    #[instrument(skip_all)]
    async fn list(&self, _query: &()) -> Result<Listing<Certification>, ApiError> {
        let items: Vec<Certification> = self.client.get(&["api", "certifications"], &[]).await?;
        Ok(Listing::unpaged(items))
    }

    #[instrument(skip_all, fields(course = %input.course_name))]
    async fn create(&self, input: &CertificationInput) -> Result<Certification, ApiError> {
        self.client
            .post(
                &["api", "certifications", "add-certification"],
                Body::multipart(input)?,
            )
            .await
    }

    #[instrument(skip_all, fields(id = %id))]
    async fn update(
        &self,
        id: &CertificationId,
        input: &CertificationInput,
    ) -> Result<Certification, ApiError> {
        self.client
            .put(
                &["api", "certifications", "update", id.as_str()],
                Body::multipart(input)?,
            )
            .await
    }

    #[instrument(skip_all, fields(id = %id))]
    async fn delete(&self, id: &CertificationId) -> Result<(), ApiError> {
        self.client
            .delete(&["api", "certifications", "delete", id.as_str()])
            .await
    }
}
