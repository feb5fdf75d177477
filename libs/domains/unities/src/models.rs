use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Unit of measure for products
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Unity {
    pub id: Uuid,
    /// Unique unit name
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DTO for creating a unity
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUnity {
    #[validate(length(min = 2, max = 50))]
    pub name: String,
    #[validate(length(max = 255))]
    pub description: Option<String>,
}

/// DTO for updating a unity
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUnity {
    #[validate(length(min = 2, max = 50))]
    pub name: Option<String>,
    #[validate(length(max = 255))]
    pub description: Option<String>,
}

impl Unity {
    pub fn new(input: CreateUnity) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: input.name,
            description: input.description,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_update(&mut self, update: UpdateUnity) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        self.updated_at = Utc::now();
    }
}
