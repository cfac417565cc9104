//! Entity stores: an in-memory cache of one record type plus its loading and
//! error metadata.
//!
//! # Reconciliation
//!
//! The list is only touched once the backend confirms a mutation:
//! - create prepends the returned record
//! - update replaces the record in place (position is kept)
//! - delete filters the record out by identifier
//!
//! A failed operation stores the normalized error, clears its loading flag,
//! and leaves the list as it was. The one exception is an unauthorized
//! `fetch_all`: the session is gone, so the cached list is cleared too.
//!
//! # Concurrency
//!
//! Each transition is applied atomically through a `watch` channel, and
//! subscribers see every committed state. Nothing serializes concurrent
//! mutations: they are applied in completion order, so the last response to
//! arrive wins. The loading flags stay raised while any call of their kind is
//! in flight.

#[cfg(test)]
mod tests;

use portfolio_core::{Entity, Pagination};
use tokio::sync::watch;
use tracing::{debug, instrument, warn};

use crate::api::{
    BulkDeleteResource, CertificationsApi, ContactsApi, DetailResource, IdOf, ProjectsApi,
    Resource,
};
use crate::client::ApiError;

/// Store over `/api/projects`.
pub type ProjectStore = EntityStore<ProjectsApi>;
/// Store over `/api/certifications`.
pub type CertificationStore = EntityStore<CertificationsApi>;
/// Store over `/api/contacts`.
pub type ContactStore = EntityStore<ContactsApi>;

/// Observable state of an [`EntityStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreState<E> {
    /// Cached records, most recently created first after a create.
    pub items: Vec<E>,
    /// A bulk fetch is in flight.
    pub list_loading: bool,
    /// A single-record operation is in flight.
    pub operation_loading: bool,
    /// Error from the most recent failed operation.
    pub error: Option<ApiError>,
    /// Paging metadata from the last fetch (paged collections only).
    pub pagination: Option<Pagination>,
    /// Record loaded by the last detail fetch.
    pub selected: Option<E>,
    lists_in_flight: usize,
    operations_in_flight: usize,
}

impl<E> Default for StoreState<E> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            list_loading: false,
            operation_loading: false,
            error: None,
            pagination: None,
            selected: None,
            lists_in_flight: 0,
            operations_in_flight: 0,
        }
    }
}

impl<E: Entity> StoreState<E> {
    /// Find a cached record by identifier.
    #[must_use]
    pub fn get(&self, id: &E::Id) -> Option<&E> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Position of a cached record.
    #[must_use]
    pub fn position(&self, id: &E::Id) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    /// Number of cached records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn begin_list(&mut self) {
        self.lists_in_flight += 1;
        self.list_loading = true;
        self.error = None;
    }

    fn end_list(&mut self) {
        self.lists_in_flight = self.lists_in_flight.saturating_sub(1);
        self.list_loading = self.lists_in_flight > 0;
    }

    fn begin_operation(&mut self) {
        self.operations_in_flight += 1;
        self.operation_loading = true;
        self.error = None;
    }

    fn end_operation(&mut self) {
        self.operations_in_flight = self.operations_in_flight.saturating_sub(1);
        self.operation_loading = self.operations_in_flight > 0;
    }

    /// Insert at the front, dropping any stale copy with the same identifier.
    fn prepend(&mut self, entity: E) {
        self.items.retain(|item| item.id() != entity.id());
        self.items.insert(0, entity);
    }

    /// Replace in place. Returns false when the record is no longer cached.
    fn replace(&mut self, entity: E) -> bool {
        if self
            .selected
            .as_ref()
            .is_some_and(|selected| selected.id() == entity.id())
        {
            self.selected = Some(entity.clone());
        }

        match self.position(entity.id()) {
            Some(index) => {
                if let Some(slot) = self.items.get_mut(index) {
                    *slot = entity;
                }
                true
            }
            None => false,
        }
    }

    /// Remove every record whose identifier is in `ids`; returns the count.
    fn remove_all(&mut self, ids: &[E::Id]) -> usize {
        let before = self.items.len();
        self.items.retain(|item| !ids.contains(item.id()));
        if self
            .selected
            .as_ref()
            .is_some_and(|selected| ids.contains(selected.id()))
        {
            self.selected = None;
        }
        before - self.items.len()
    }

    fn clear_session_data(&mut self) {
        self.items.clear();
        self.pagination = None;
        self.selected = None;
    }
}

/// An in-memory cache of one entity collection with CRUD operations.
pub struct EntityStore<R: Resource> {
    resource: R,
    state: watch::Sender<StoreState<R::Entity>>,
}

impl<R: Resource + std::fmt::Debug> std::fmt::Debug for EntityStore<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("EntityStore")
            .field("resource", &self.resource)
            .field("len", &state.items.len())
            .field("list_loading", &state.list_loading)
            .field("operation_loading", &state.operation_loading)
            .field("error", &state.error)
            .finish()
    }
}

impl<R: Resource> EntityStore<R> {
    /// Create an empty store over `resource`.
    #[must_use]
    pub fn new(resource: R) -> Self {
        let (state, _) = watch::channel(StoreState::default());
        Self { resource, state }
    }

    /// The underlying resource.
    #[must_use]
    pub const fn resource(&self) -> &R {
        &self.resource
    }

    /// Clone of the current state.
    #[must_use]
    pub fn snapshot(&self) -> StoreState<R::Entity> {
        self.state.borrow().clone()
    }

    /// Cached records.
    #[must_use]
    pub fn items(&self) -> Vec<R::Entity> {
        self.state.borrow().items.clone()
    }

    /// Error from the most recent failed operation.
    #[must_use]
    pub fn error(&self) -> Option<ApiError> {
        self.state.borrow().error.clone()
    }

    /// Receiver that observes every state transition.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<StoreState<R::Entity>> {
        self.state.subscribe()
    }

    /// Replace the cached list with the backend's collection.
    ///
    /// On failure the previous list is kept, unless the backend reports the
    /// session as unauthorized, in which case the cache is cleared.
    ///
    /// # Errors
    ///
    /// Returns the normalized error, which is also stored as the last error.
    #[instrument(skip_all, fields(kind = <R::Entity as Entity>::KIND))]
    pub async fn fetch_all(&self, query: &R::Query) -> Result<(), ApiError> {
        self.state.send_modify(StoreState::begin_list);

        match self.resource.list(query).await {
            Ok(listing) => {
                debug!(count = listing.items.len(), "Fetched collection");
                self.state.send_modify(|state| {
                    state.items = listing.items;
                    state.pagination = listing.pagination;
                    state.end_list();
                });
                Ok(())
            }
            Err(err) => {
                warn!(kind = err.kind(), error = %err, "Failed to fetch collection");
                self.state.send_modify(|state| {
                    if err.is_unauthorized() {
                        state.clear_session_data();
                    }
                    state.error = Some(err.clone());
                    state.end_list();
                });
                Err(err)
            }
        }
    }

    /// Create a record and prepend it to the list.
    ///
    /// # Errors
    ///
    /// Returns the validation or backend error; the list is unchanged.
    #[instrument(skip_all, fields(kind = <R::Entity as Entity>::KIND))]
    pub async fn create(&self, input: &R::Input) -> Result<R::Entity, ApiError> {
        self.reject_invalid(input)?;
        self.state.send_modify(StoreState::begin_operation);

        let result = self.resource.create(input).await;
        self.finish_operation(result, |state, entity| {
            debug!(id = %entity.id(), "Created record");
            state.prepend(entity.clone());
        })
    }

    /// Replace the record identified by `id`, keeping its list position.
    ///
    /// # Errors
    ///
    /// Returns the validation or backend error; the list is unchanged.
    #[instrument(skip_all, fields(kind = <R::Entity as Entity>::KIND, id = %id))]
    pub async fn update(&self, id: &IdOf<R>, input: &R::Input) -> Result<R::Entity, ApiError> {
        self.reject_invalid(input)?;
        self.state.send_modify(StoreState::begin_operation);

        let result = self.resource.update(id, input).await;
        self.finish_operation(result, |state, entity| {
            if state.replace(entity.clone()) {
                debug!("Updated record");
            } else {
                debug!("Updated record is no longer cached");
            }
        })
    }

    /// Delete the record identified by `id` and drop it from the list.
    ///
    /// Deleting an identifier that is not cached is a no-op on the list once
    /// the backend confirms.
    ///
    /// # Errors
    ///
    /// Returns the backend error; the list is unchanged.
    #[instrument(skip_all, fields(kind = <R::Entity as Entity>::KIND, id = %id))]
    pub async fn delete(&self, id: &IdOf<R>) -> Result<(), ApiError> {
        self.state.send_modify(StoreState::begin_operation);

        let result = self.resource.delete(id).await;
        self.finish_operation(result, |state, _| {
            let removed = state.remove_all(std::slice::from_ref(id));
            debug!(removed, "Deleted record");
        })
    }

    /// Clear the last error. Lists and loading flags are untouched.
    pub fn clear_error(&self) {
        self.state.send_if_modified(|state| state.error.take().is_some());
    }

    /// Record a client-side validation failure without making a request.
    fn reject_invalid(&self, input: &R::Input) -> Result<(), ApiError> {
        if let Err(err) = self.resource.validate(input) {
            warn!(error = %err, "Rejected invalid input");
            self.state
                .send_modify(|state| state.error = Some(err.clone()));
            return Err(err);
        }
        Ok(())
    }

    /// Apply the outcome of a single-record operation.
    fn finish_operation<T>(
        &self,
        result: Result<T, ApiError>,
        apply: impl FnOnce(&mut StoreState<R::Entity>, &T),
    ) -> Result<T, ApiError> {
        match result {
            Ok(value) => {
                self.state.send_modify(|state| {
                    apply(state, &value);
                    state.end_operation();
                });
                Ok(value)
            }
            Err(err) => {
                warn!(kind = err.kind(), error = %err, "Operation failed");
                self.state.send_modify(|state| {
                    state.error = Some(err.clone());
                    state.end_operation();
                });
                Err(err)
            }
        }
    }
}

impl<R: DetailResource> EntityStore<R> {
    /// Load a single record into `selected`.
    ///
    /// A cached copy of the same record is refreshed in place.
    ///
    /// # Errors
    ///
    /// Returns the backend error; `selected` and the list are unchanged.
    #[instrument(skip_all, fields(kind = <R::Entity as Entity>::KIND, id = %id))]
    pub async fn fetch_one(&self, id: &IdOf<R>) -> Result<R::Entity, ApiError> {
        self.state.send_modify(StoreState::begin_operation);

        let result = self.resource.fetch(id).await;
        self.finish_operation(result, |state, entity| {
            state.selected = Some(entity.clone());
            state.replace(entity.clone());
        })
    }

    /// Forget the selected record.
    pub fn clear_selected(&self) {
        self.state
            .send_if_modified(|state| state.selected.take().is_some());
    }
}

impl<R: BulkDeleteResource> EntityStore<R> {
    /// Delete several records in one request.
    ///
    /// Returns how many cached records were removed. An empty `ids` makes no
    /// request.
    ///
    /// # Errors
    ///
    /// Returns the backend error; the list is unchanged.
    #[instrument(skip_all, fields(kind = <R::Entity as Entity>::KIND, count = ids.len()))]
    pub async fn delete_many(&self, ids: &[IdOf<R>]) -> Result<usize, ApiError> {
        if ids.is_empty() {
            return Ok(0);
        }
        self.state.send_modify(StoreState::begin_operation);

        let result = self.resource.delete_many(ids).await;
        let mut removed = 0;
        self.finish_operation(result, |state, _| {
            removed = state.remove_all(ids);
            debug!(removed, "Deleted records");
        })?;
        Ok(removed)
    }
}
