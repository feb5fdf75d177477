use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// States accepted for Venezuela, the only supported country.
pub const VENEZUELA_STATES: [&str; 24] = [
    "Amazonas",
    "Anzoátegui",
    "Apure",
    "Aragua",
    "Barinas",
    "Bolívar",
    "Carabobo",
    "Cojedes",
    "Delta Amacuro",
    "Falcón",
    "Guárico",
    "Lara",
    "Mérida",
    "Miranda",
    "Monagas",
    "Nueva Esparta",
    "Portuguesa",
    "Sucre",
    "Táchira",
    "Trujillo",
    "La Guaira",
    "Yaracuy",
    "Zulia",
    "Distrito Capital",
];

fn states_for_country(country: &str) -> Option<&'static [&'static str]> {
    match country {
        "Venezuela" => Some(&VENEZUELA_STATES),
        _ => None,
    }
}

fn validate_country_state(input: &CreateShippingAddress) -> Result<(), ValidationError> {
    let Some(states) = states_for_country(&input.country) else {
        return Err(ValidationError::new("country")
            .with_message("País no soportado".into()));
    };

    if !states.contains(&input.state.as_str()) {
        return Err(ValidationError::new("state")
            .with_message("Estado o provincia no pertenece al país seleccionado".into()));
    }

    Ok(())
}

/// Shipping address owned by a user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub id: Uuid,
    pub user_id: Uuid,
    pub alias: String,
    pub name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    #[serde(rename = "address_line_1")]
    pub address_line_1: String,
    pub country: String,
    pub state: String,
    pub city: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DTO for creating a shipping address
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = validate_country_state))]
pub struct CreateShippingAddress {
    #[validate(length(min = 2, max = 50, message = "Alias es requerido"))]
    pub alias: String,
    #[validate(length(min = 2, max = 150, message = "Nombre es requerido"))]
    pub name: String,
    #[validate(length(min = 2, max = 150, message = "Apellido es requerido"))]
    pub last_name: String,
    #[validate(email(message = "Correo electrónico requerido"))]
    pub email: String,
    #[validate(length(min = 8, message = "Número de teléfono requerido"))]
    pub phone: String,
    #[serde(rename = "address_line_1")]
    #[validate(length(min = 10, max = 250, message = "Dirección es requerida"))]
    pub address_line_1: String,
    pub country: String,
    pub state: String,
    #[validate(length(min = 2, message = "Ciudad es requerida"))]
    pub city: String,
}

/// DTO for updating a shipping address
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateShippingAddress {
    #[validate(length(min = 2, max = 50, message = "Alias es requerido"))]
    pub alias: Option<String>,
    #[validate(length(min = 2, max = 150, message = "Nombre es requerido"))]
    pub name: Option<String>,
    #[validate(length(min = 2, max = 150, message = "Apellido es requerido"))]
    pub last_name: Option<String>,
    #[validate(email(message = "Correo electrónico requerido"))]
    pub email: Option<String>,
    #[validate(length(min = 8, message = "Número de teléfono requerido"))]
    pub phone: Option<String>,
    #[serde(rename = "address_line_1")]
    #[validate(length(min = 10, max = 250, message = "Dirección es requerida"))]
    pub address_line_1: Option<String>,
    #[validate(length(min = 2, message = "Ciudad es requerida"))]
    pub city: Option<String>,
}

impl ShippingAddress {
    pub fn new(user_id: Uuid, input: CreateShippingAddress) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            user_id,
            alias: input.alias,
            name: input.name,
            last_name: input.last_name,
            email: input.email,
            phone: input.phone,
            address_line_1: input.address_line_1,
            country: input.country,
            state: input.state,
            city: input.city,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_update(&mut self, update: UpdateShippingAddress) {
        if let Some(alias) = update.alias {
            self.alias = alias;
        }
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(last_name) = update.last_name {
            self.last_name = last_name;
        }
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(phone) = update.phone {
            self.phone = phone;
        }
        if let Some(address_line_1) = update.address_line_1 {
            self.address_line_1 = address_line_1;
        }
        if let Some(city) = update.city {
            self.city = city;
        }
        self.updated_at = Utc::now();
    }
}
