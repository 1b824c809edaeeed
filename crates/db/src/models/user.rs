//! User entity model and DTOs.

use bastion_core::status::UserRole;
use bastion_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: DbId,
    pub organization_id: DbId,
    pub name: String,
    pub email: String,
    pub title: Option<String>,
    pub role: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a user.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    pub organization_id: DbId,
    pub name: String,
    pub email: String,
    pub title: Option<String>,
    /// Defaults to `analyst`.
    pub role: Option<UserRole>,
}

/// DTO for updating a user. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub title: Option<String>,
    pub role: Option<UserRole>,
}

/// Query-string filter for listing users.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFilter {
    pub organization_id: Option<DbId>,
    pub role: Option<UserRole>,
}
