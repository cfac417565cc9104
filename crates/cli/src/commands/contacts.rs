//! `folio contacts` commands.

use std::path::Path;

use portfolio_console::ContactStore;
use portfolio_core::{ContactId, ContactInput, ContactQuery};
use serde::Serialize;

use super::{CommandError, print_json, read_payload};

#[derive(Serialize)]
struct Page<'a, T> {
    data: &'a [T],
    #[serde(skip_serializing_if = "Option::is_none")]
    pagination: Option<portfolio_core::Pagination>,
}

pub async fn list(
    store: &ContactStore,
    page: Option<u32>,
    limit: Option<u32>,
    search: Option<String>,
) -> Result<(), CommandError> {
    let mut query = ContactQuery {
        page,
        limit,
        search: None,
    };
    if let Some(search) = search {
        query = query.with_search(search);
    }

    store.fetch_all(&query).await?;
    let state = store.snapshot();
    print_json(&Page {
        data: &state.items,
        pagination: state.pagination,
    })
}

pub async fn show(store: &ContactStore, id: ContactId) -> Result<(), CommandError> {
    let contact = store.fetch_one(&id).await?;
    print_json(&contact)
}

pub async fn submit(store: &ContactStore, file: &Path) -> Result<(), CommandError> {
    let input: ContactInput = read_payload(file).await?;
    let contact = store.create(&input).await?;
    tracing::info!(id = %contact.id, "Contact response submitted");
    print_json(&contact)
}

pub async fn delete(store: &ContactStore, id: ContactId) -> Result<(), CommandError> {
    store.delete(&id).await?;
    tracing::info!(id = %id, "Contact response deleted");
    Ok(())
}

pub async fn delete_many(store: &ContactStore, ids: &[ContactId]) -> Result<(), CommandError> {
    let removed = store.delete_many(ids).await?;
    tracing::info!(requested = ids.len(), removed, "Contact responses deleted");
    Ok(())
}
