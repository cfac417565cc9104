//! `folio certifications` commands.

use std::path::Path;

use portfolio_console::CertificationStore;
use portfolio_core::{CertificationId, CertificationInput};

use super::{CommandError, print_json, read_attachment, read_payload};

pub async fn list(store: &CertificationStore) -> Result<(), CommandError> {
    store.fetch_all(&()).await?;
    print_json(&store.items())
}

async fn load_input(
    file: &Path,
    attachment: Option<&Path>,
) -> Result<CertificationInput, CommandError> {
    let mut input: CertificationInput = read_payload(file).await?;
    if let Some(path) = attachment {
        input.certificate = Some(read_attachment(path).await?);
    }
    Ok(input)
}

pub async fn create(
    store: &CertificationStore,
    file: &Path,
    attachment: Option<&Path>,
) -> Result<(), CommandError> {
    let input = load_input(file, attachment).await?;
    let certification = store.create(&input).await?;
    tracing::info!(
        id = %certification.id,
        course = %certification.course_name,
        "Certification created"
    );
    print_json(&certification)
}

pub async fn update(
    store: &CertificationStore,
    id: CertificationId,
    file: &Path,
    attachment: Option<&Path>,
) -> Result<(), CommandError> {
    let input = load_input(file, attachment).await?;
    let certification = store.update(&id, &input).await?;
    tracing::info!(id = %certification.id, "Certification updated");
    print_json(&certification)
}

pub async fn delete(store: &CertificationStore, id: CertificationId) -> Result<(), CommandError> {
    store.delete(&id).await?;
    tracing::info!(id = %id, "Certification deleted");
    Ok(())
}
