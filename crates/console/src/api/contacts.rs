//! Contact response routes.
//!
//! Unlike projects and certifications, contact submissions carry no
//! attachment and travel as JSON. The list is paged and searchable.

use portfolio_core::{ContactId, ContactInput, ContactQuery, ContactResponse, Pagination};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{BulkDeleteResource, DetailResource, Listing, Resource};
use crate::client::{ApiClient, ApiError, Body};

/// Route for deleting several contact responses at once.
pub const BULK_DELETE_ROUTE: &[&str] = &["api", "contacts", "bulk-delete"];

/// List body: paged, wrapped without paging, or a bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum ContactPage {
    Paged {
        #[serde(alias = "contacts")]
        data: Vec<ContactResponse>,
        pagination: Pagination,
    },
    Wrapped {
        #[serde(alias = "contacts")]
        data: Vec<ContactResponse>,
    },
    Unpaged(Vec<ContactResponse>),
}

#[derive(Serialize)]
struct BulkDeleteRequest<'a> {
    ids: &'a [ContactId],
}

/// `/api/contacts` resource.
#[derive(Debug, Clone)]
pub struct ContactsApi {
    client: ApiClient,
}

impl ContactsApi {
    /// Create the resource over a shared client.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

impl Resource for ContactsApi {
    type Entity = ContactResponse;
    type Input = ContactInput;
    type Query = ContactQuery;

    fn validate(&self, input: &ContactInput) -> Result<(), ApiError> {
        input.validate().map_err(ApiError::from)
    }

    #[instrument(skip_all, fields(page = ?query.page, search = ?query.search))]
    async fn list(&self, query: &ContactQuery) -> Result<Listing<ContactResponse>, ApiError> {
        let page: ContactPage = self
            .client
            .request_document(
                reqwest::Method::GET,
                &["api", "contacts"],
                &query.to_pairs(),
                None,
            )
            .await?;

        Ok(match page {
            ContactPage::Paged { data, pagination } => Listing {
                items: data,
                pagination: Some(pagination),
            },
            ContactPage::Wrapped { data } | ContactPage::Unpaged(data) => Listing::unpaged(data),
        })
    }

    #[instrument(skip_all, fields(email = %input.email))]
    async fn create(&self, input: &ContactInput) -> Result<ContactResponse, ApiError> {
        self.client
            .post(
                &["api", "contacts", "add-contact"],
                Body::json(&input.normalized()?)?,
            )
            .await
    }

    #[instrument(skip_all, fields(id = %id))]
    async fn update(
        &self,
        id: &ContactId,
        input: &ContactInput,
    ) -> Result<ContactResponse, ApiError> {
        self.client
            .put(
                &["api", "contacts", "update", id.as_str()],
                Body::json(&input.normalized()?)?,
            )
            .await
    }

    #[instrument(skip_all, fields(id = %id))]
    async fn delete(&self, id: &ContactId) -> Result<(), ApiError> {
        self.client
            .delete(&["api", "contacts", "delete", id.as_str()])
            .await
    }
}

impl DetailResource for ContactsApi {
    #[instrument(skip_all, fields(id = %id))]
    async fn fetch(&self, id: &ContactId) -> Result<ContactResponse, ApiError> {
        self.client
            .get(&["api", "contacts", id.as_str()], &[])
            .await
    }
}

impl BulkDeleteResource for ContactsApi {
    #[instrument(skip_all, fields(count = ids.len()))]
    async fn delete_many(&self, ids: &[ContactId]) -> Result<(), ApiError> {
        let body = Body::json(&BulkDeleteRequest { ids })?;
        self.client
            .request_empty(reqwest::Method::POST, BULK_DELETE_ROUTE, Some(body))
            .await
    }
}
