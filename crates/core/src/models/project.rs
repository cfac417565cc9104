//! Portfolio project records.

use serde::{Deserialize, Serialize};

use super::{Entity, FieldValue, FormPayload, InputError, push_optional, require};
use crate::types::{Attachment, ProjectId};

/// External links shown on a project card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectLinks {
    /// Source repository URL.
    #[serde(default, alias = "github", skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    /// Live demo URL.
    #[serde(default, alias = "live", skip_serializing_if = "Option::is_none")]
    pub live_demo: Option<String>,
}

/// A portfolio project as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Backend-assigned identifier.
    #[serde(rename = "_id", alias = "id")]
    pub id: ProjectId,
    /// Project name.
    pub name: String,
    /// Free-text duration ("Jan 2024 - Mar 2024").
    #[serde(default)]
    pub duration: String,
    /// Description lines, in display order.
    #[serde(default)]
    pub description: Vec<String>,
    /// Technology tags.
    #[serde(default)]
    pub tech_stack: Vec<String>,
    /// Client the project was built for.
    #[serde(default)]
    pub client_name: String,
    /// Target audience tags.
    #[serde(default)]
    pub target_audience: Vec<String>,
    /// Feature tags.
    #[serde(default)]
    pub features: Vec<String>,
    /// Role on the project.
    #[serde(default)]
    pub role: String,
    /// Repository and live demo links.
    #[serde(default)]
    pub links: ProjectLinks,
    /// Stored image reference (URL or path), if an image was uploaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Entity for Project {
    type Id = ProjectId;

    const KIND: &'static str = "project";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Fields submitted by the project form.
///
/// Used for both create and update; an update replaces every field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInput {
    pub name: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub description: Vec<String>,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub target_audience: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub links: ProjectLinks,
    /// New image to upload. Leaving this unset keeps the stored image.
    #[serde(skip)]
    pub image: Option<Attachment>,
}

impl FormPayload for ProjectInput {
    const ATTACHMENT_FIELD: &'static str = "image";

    fn fields(&self) -> Vec<(&'static str, FieldValue)> {
        let mut fields = vec![
            ("name", FieldValue::Text(self.name.clone())),
            ("duration", FieldValue::Text(self.duration.clone())),
            ("description", FieldValue::List(self.description.clone())),
            ("techStack", FieldValue::List(self.tech_stack.clone())),
            ("clientName", FieldValue::Text(self.client_name.clone())),
            (
                "targetAudience",
                FieldValue::List(self.target_audience.clone()),
            ),
            ("features", FieldValue::List(self.features.clone())),
            ("role", FieldValue::Text(self.role.clone())),
        ];
        push_optional(&mut fields, "repository", self.links.repository.as_ref());
        push_optional(&mut fields, "liveDemo", self.links.live_demo.as_ref());
        fields
    }

    fn attachment(&self) -> Option<&Attachment> {
        self.image.as_ref()
    }

    fn validate(&self) -> Result<(), InputError> {
        require(&self.name, "name")?;
        require(&self.role, "role")?;
        Ok(())
    }
}

impl From<&Project> for ProjectInput {
    fn from(project: &Project) -> Self {
        Self {
            name: project.name.clone(),
            duration: project.duration.clone(),
            description: project.description.clone(),
            tech_stack: project.tech_stack.clone(),
            client_name: project.client_name.clone(),
            target_audience: project.target_audience.clone(),
            features: project.features.clone(),
            role: project.role.clone(),
            links: project.links.clone(),
            image: None,
        }
    }
}
