use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Product category
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    /// Unique category name
    pub name: String,
    pub description: Option<String>,
    /// Inactive categories are hidden from public lookups
    pub active: bool,
    /// User that created the category
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DTO for creating a category
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCategory {
    #[validate(length(min = 2, max = 50))]
    pub name: String,
    #[validate(length(max = 255))]
    pub description: Option<String>,
}

/// DTO for updating a category
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCategory {
    #[validate(length(min = 2, max = 50))]
    pub name: Option<String>,
    #[validate(length(max = 255))]
    pub description: Option<String>,
    pub active: Option<bool>,
}

impl Category {
    pub fn new(user_id: Uuid, input: CreateCategory) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: input.name,
            description: input.description,
            active: true,
            user_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_update(&mut self, update: UpdateCategory) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(active) = update.active {
            self.active = active;
        }
        self.updated_at = Utc::now();
    }
}
