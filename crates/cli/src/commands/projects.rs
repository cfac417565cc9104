//! `folio projects` commands.

use std::path::Path;

use portfolio_console::ProjectStore;
use portfolio_core::{ProjectId, ProjectInput};

use super::{CommandError, print_json, read_attachment, read_payload};

pub async fn list(store: &ProjectStore) -> Result<(), CommandError> {
    store.fetch_all(&()).await?;
    print_json(&store.items())
}

async fn load_input(file: &Path, attachment: Option<&Path>) -> Result<ProjectInput, CommandError> {
    let mut input: ProjectInput = read_payload(file).await?;
    if let Some(path) = attachment {
        input.image = Some(read_attachment(path).await?);
    }
    Ok(input)
}

pub async fn create(
    store: &ProjectStore,
    file: &Path,
    attachment: Option<&Path>,
) -> Result<(), CommandError> {
    let input = load_input(file, attachment).await?;
    let project = store.create(&input).await?;
    tracing::info!(id = %project.id, name = %project.name, "Project created");
    print_json(&project)
}

pub async fn update(
    store: &ProjectStore,
    id: ProjectId,
    file: &Path,
    attachment: Option<&Path>,
) -> Result<(), CommandError> {
    let input = load_input(file, attachment).await?;
    let project = store.update(&id, &input).await?;
    tracing::info!(id = %project.id, "Project updated");
    print_json(&project)
}

pub async fn delete(store: &ProjectStore, id: ProjectId) -> Result<(), CommandError> {
    store.delete(&id).await?;
    tracing::info!(id = %id, "Project deleted");
    Ok(())
}
