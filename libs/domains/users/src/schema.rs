use resource_servlet::{FieldKind, FieldSpec, ResourceDescriptor};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Resource name and collection of users
pub const USERS: &str = "users";

const USER_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("id", FieldKind::String),
    FieldSpec::required("name", FieldKind::String),
    FieldSpec::optional("email", FieldKind::Email),
    FieldSpec::optional("description", FieldKind::String),
    FieldSpec::optional("avatar", FieldKind::String),
];

/// Descriptor of the `users` resource.
///
/// `name` and `email` are unique; a missing email is allowed for any number
/// of users.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserSchema;

impl ResourceDescriptor for UserSchema {
    fn name(&self) -> &'static str {
        USERS
    }

    fn fields(&self) -> &'static [FieldSpec] {
        USER_FIELDS
    }

    fn unique_fields(&self) -> &'static [&'static str] {
        &["name", "email"]
    }
}

/// User document as stored and returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// Generated when omitted on create
    #[schema(example = "u1")]
    pub id: String,
    #[schema(example = "alice")]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "alice@example.com")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Path of the uploaded avatar
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}
