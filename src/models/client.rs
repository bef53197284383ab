use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Category of a client request.
/// Corresponds to the `request_category` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "request_category", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestCategory {
    Software,
    Hardware,
    Network,
    Account,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Client {
    pub id: i32,
    pub name: String,
    /// Free-text department label, not a reference to `Department`.
    pub department: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ClientInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 100))]
    pub department: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct ClientPatch {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub department: Option<String>,
}

impl From<ClientInput> for ClientPatch {
    fn from(input: ClientInput) -> Self {
        Self {
            name: Some(input.name),
            department: Some(input.department),
        }
    }
}

/// A support request raised by a client. Deleted together with its client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ClientRequest {
    pub id: i32,
    /// Identifier of the owning client.
    pub client: i32,
    pub category: RequestCategory,
    pub description: String,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ClientRequestInput {
    pub client: i32,
    pub category: RequestCategory,
    #[validate(length(min = 1))]
    pub description: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct ClientRequestPatch {
    pub client: Option<i32>,
    pub category: Option<RequestCategory>,
    #[validate(length(min = 1))]
    pub description: Option<String>,
}

impl From<ClientRequestInput> for ClientRequestPatch {
    fn from(input: ClientRequestInput) -> Self {
        Self {
            client: Some(input.client),
            category: Some(input.category),
            description: Some(input.description),
        }
    }
}
