//! Per-entity REST resources.
//!
//! Each resource maps the store's CRUD operations onto the backend's routes:
//!
//! | Operation | Route                                   |
//! |-----------|-----------------------------------------|
//! | list      | `GET /api/<entity>`                     |
//! | create    | `POST /api/<entity>/add-<singular>`     |
//! | update    | `PUT /api/<entity>/update/<id>`         |
//! | delete    | `DELETE /api/<entity>/delete/<id>`      |
//!
//! Contacts additionally support `GET /api/contacts/<id>` and
//! `POST /api/contacts/bulk-delete`.

mod certifications;
mod contacts;
mod projects;

pub use certifications::CertificationsApi;
pub use contacts::{BULK_DELETE_ROUTE, ContactsApi};
pub use projects::ProjectsApi;

use std::future::Future;

use portfolio_core::{Entity, Pagination};

use crate::client::ApiError;

/// Identifier type of a resource's entity.
pub type IdOf<R> = <<R as Resource>::Entity as Entity>::Id;

/// One page (or the whole) of a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing<E> {
    /// Records in backend order.
    pub items: Vec<E>,
    /// Paging metadata, for paged collections.
    pub pagination: Option<Pagination>,
}

impl<E> Listing<E> {
    /// A listing without paging metadata.
    #[must_use]
    pub const fn unpaged(items: Vec<E>) -> Self {
        Self {
            items,
            pagination: None,
        }
    }
}

/// CRUD access to one entity collection.
pub trait Resource: Send + Sync + 'static {
    /// Record type returned by the backend.
    type Entity: Entity;
    /// Payload submitted by create and update.
    type Input: Send + Sync;
    /// Filters accepted by list.
    type Query: Default + Send + Sync;

    /// Validate a payload before any request is made.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] describing the problem.
    fn validate(&self, input: &Self::Input) -> Result<(), ApiError>;

    /// Fetch the collection.
    fn list(
        &self,
        query: &Self::Query,
    ) -> impl Future<Output = Result<Listing<Self::Entity>, ApiError>> + Send;

    /// Create a record; the backend assigns its identifier.
    fn create(
        &self,
        input: &Self::Input,
    ) -> impl Future<Output = Result<Self::Entity, ApiError>> + Send;

    /// Replace every field of the record identified by `id`.
    fn update(
        &self,
        id: &IdOf<Self>,
        input: &Self::Input,
    ) -> impl Future<Output = Result<Self::Entity, ApiError>> + Send;

    /// Delete the record identified by `id`.
    fn delete(&self, id: &IdOf<Self>) -> impl Future<Output = Result<(), ApiError>> + Send;
}

/// A resource that can fetch a single record.
pub trait DetailResource: Resource {
    /// Fetch the record identified by `id`.
    fn fetch(&self, id: &IdOf<Self>)
    -> impl Future<Output = Result<Self::Entity, ApiError>> + Send;
}

/// A resource that can delete several records in one request.
pub trait BulkDeleteResource: Resource {
    /// Delete every record in `ids`.
    fn delete_many(&self, ids: &[IdOf<Self>]) -> impl Future<Output = Result<(), ApiError>> + Send;
}
