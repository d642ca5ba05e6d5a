use axum::{
    Json, Router,
    extract::{
        Multipart, Path, State,
        multipart::{MultipartError, MultipartRejection},
    },
    routing::MethodFilter,
};
use axum_helpers::{
    Chain,
    errors::responses::{
        BadRequestValidationResponse, ConflictResponse, InternalServerErrorResponse,
        NotFoundResponse, UnauthorizedResponse,
    },
};
use resource_servlet::{
    DocumentStore, Outcome, Record, RecordPayload, ResourceDescriptor, RouteBinder,
    SchemaRegistry, ServletError, handlers,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};

use crate::avatar::{AVATAR_FIELD, AvatarStore, StoredFile, UploadedFile};
use crate::error::{UserError, UserResult};
use crate::failure::user_failure;
use crate::schema::{USERS, User};

/// OpenAPI documentation for the users API
#[derive(OpenApi)]
#[openapi(
    paths(create_user, get_user, upload_avatar, replace_user, update_user, delete_user),
    components(
        schemas(User, StoredFile, AvatarResponse, AvatarUpload),
        responses(
            BadRequestValidationResponse,
            UnauthorizedResponse,
            NotFoundResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Users", description = "User management endpoints. Every route requires a credential.")
    )
)]
pub struct ApiDoc;

/// Shared state of the user routes
#[derive(Clone)]
pub struct UsersState {
    store: Arc<dyn DocumentStore>,
    schema: Arc<dyn ResourceDescriptor>,
    avatars: Arc<dyn AvatarStore>,
}

impl UsersState {
    /// Fails when `registry` has no `users` descriptor.
    pub fn new(
        registry: &SchemaRegistry,
        store: Arc<dyn DocumentStore>,
        avatars: Arc<dyn AvatarStore>,
    ) -> Result<Self, ServletError> {
        Ok(Self {
            store,
            schema: registry.require(USERS)?,
            avatars,
        })
    }
}

/// Create the users router; every route runs behind `gated`.
pub fn router(state: UsersState, gated: &Chain) -> Router {
    RouteBinder::new()
        .bind(MethodFilter::POST, "/users", gated, create_user)
        .bind(MethodFilter::GET, "/users/{id}", gated, get_user)
        .bind(MethodFilter::POST, "/users/{id}/avatar", gated, upload_avatar)
        .bind(MethodFilter::PUT, "/users/{id}", gated, replace_user)
        .bind(MethodFilter::PATCH, "/users/{id}", gated, update_user)
        .bind(MethodFilter::DELETE, "/users/{id}", gated, delete_user)
        .into_router()
        .with_state(state)
}

/// Avatar upload response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AvatarResponse {
    pub file: StoredFile,
}

/// Multipart body of an avatar upload
#[derive(ToSchema)]
#[allow(dead_code)]
struct AvatarUpload {
    #[schema(value_type = String, format = Binary)]
    avatar: Vec<u8>,
}

/// Create a user
#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    request_body = User,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_user(
    State(state): State<UsersState>,
    RecordPayload(record): RecordPayload,
) -> UserResult<Outcome> {
    let outcome = handlers::create(
        state.store.as_ref(),
        state.schema.as_ref(),
        record,
        Some(&user_failure),
    )
    .await?;
    Ok(outcome)
}

/// Get a user by ID
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "Users",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_user(State(state): State<UsersState>, Path(id): Path<String>) -> UserResult<Outcome> {
    let outcome = handlers::fetch_one(state.store.as_ref(), state.schema.as_ref(), &id, None).await?;
    Ok(outcome)
}

/// Upload the avatar of a user
///
/// Stores the `avatar` multipart file and records its path on the user. The
/// file is removed again when the user cannot be updated.
#[utoipa::path(
    post,
    path = "/users/{id}/avatar",
    tag = "Users",
    params(("id" = String, Path, description = "User ID")),
    request_body(content = AvatarUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Avatar stored", body = AvatarResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn upload_avatar(
    State(state): State<UsersState>,
    Path(id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> UserResult<Json<AvatarResponse>> {
    handlers::fetch_one(state.store.as_ref(), state.schema.as_ref(), &id, None).await?;

    let mut multipart = multipart.map_err(|rejection| {
        tracing::debug!(%rejection, "Avatar upload without multipart body");
        UserError::MissingAvatar
    })?;
    let upload = read_avatar(&mut multipart).await?;
    let stored = state.avatars.store(&id, upload).await?;

    let mut patch = Record::new();
    patch.insert(AVATAR_FIELD.to_string(), stored.path.clone().into());
    let linked = handlers::partial_update(
        state.store.as_ref(),
        state.schema.as_ref(),
        &id,
        patch,
        Some(&user_failure),
    )
    .await;

    // No user points at the file once the link fails
    if let Err(err) = linked {
        if let Err(cleanup) = state.avatars.remove(&stored).await {
            tracing::warn!(path = %stored.path, error = %cleanup, "Failed to remove unlinked avatar");
        }
        return Err(err.into());
    }

    Ok(Json(AvatarResponse { file: stored }))
}

fn malformed(err: MultipartError) -> UserError {
    UserError::Multipart(err.body_text())
}

/// First `avatar` field of the body; other fields are ignored.
async fn read_avatar(multipart: &mut Multipart) -> UserResult<UploadedFile> {
    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        if field.name() != Some(AVATAR_FIELD) {
            continue;
        }

        let original_name = field.file_name().map(str::to_string);
        let mime_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(malformed)?;

        return Ok(UploadedFile {
            original_name,
            mime_type,
            bytes: bytes.to_vec(),
        });
    }
    Err(UserError::MissingAvatar)
}

/// Replace a user
///
/// Fields missing from the body are removed from the user.
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "Users",
    params(("id" = String, Path, description = "User ID")),
    request_body = User,
    responses(
        (status = 200, description = "User replaced", body = User),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn replace_user(
    State(state): State<UsersState>,
    Path(id): Path<String>,
    RecordPayload(record): RecordPayload,
) -> UserResult<Outcome> {
    let outcome = handlers::replace(
        state.store.as_ref(),
        state.schema.as_ref(),
        &id,
        record,
        Some(&user_failure),
    )
    .await?;
    Ok(outcome)
}

/// Update some fields of a user
#[utoipa::path(
    patch,
    path = "/users/{id}",
    tag = "Users",
    params(("id" = String, Path, description = "User ID")),
    request_body = User,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_user(
    State(state): State<UsersState>,
    Path(id): Path<String>,
    RecordPayload(patch): RecordPayload,
) -> UserResult<Outcome> {
    let outcome = handlers::partial_update(
        state.store.as_ref(),
        state.schema.as_ref(),
        &id,
        patch,
        Some(&user_failure),
    )
    .await?;
    Ok(outcome)
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "Users",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 204, description = "User removed"),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_user(
    State(state): State<UsersState>,
    Path(id): Path<String>,
) -> UserResult<Outcome> {
    let outcome = handlers::delete(state.store.as_ref(), state.schema.as_ref(), &id, None).await?;
    Ok(outcome)
}
