//! HTTP-level tests for the generic handlers behind the authorization gate,
//! backed by the in-memory store.

use axum::{
    Router,
    body::Body,
    extract::{Path, State},
    http::{Request, StatusCode, header},
    routing::MethodFilter,
};
use axum_helpers::{AuthorizationGate, Chain, JwtConfig, JwtVerifier, OwnershipPolicy};
use http_body_util::BodyExt;
use resource_servlet::{
    DocumentStore, FieldKind, FieldSpec, InMemoryDocumentStore, Outcome, RecordPayload,
    ResourceDescriptor, RouteBinder, ServletError, handlers,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

const SECRET: &str = "test-secret-key-that-is-at-least-32-characters";

struct Gadgets;

const GADGET_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("id", FieldKind::String),
    FieldSpec::required("name", FieldKind::String),
    FieldSpec::optional("serial", FieldKind::String),
    FieldSpec::optional("note", FieldKind::String),
];

impl ResourceDescriptor for Gadgets {
    fn name(&self) -> &'static str {
        "gadgets"
    }

    fn fields(&self) -> &'static [FieldSpec] {
        GADGET_FIELDS
    }

    fn unique_fields(&self) -> &'static [&'static str] {
        &["name", "serial"]
    }
}

#[derive(Clone)]
struct TestState {
    store: Arc<InMemoryDocumentStore>,
}

async fn create(
    State(state): State<TestState>,
    RecordPayload(record): RecordPayload,
) -> Result<Outcome, ServletError> {
    handlers::create(state.store.as_ref(), &Gadgets, record, None).await
}

async fn fetch(
    State(state): State<TestState>,
    Path(id): Path<String>,
) -> Result<Outcome, ServletError> {
    handlers::fetch_one(state.store.as_ref(), &Gadgets, &id, None).await
}

async fn replace(
    State(state): State<TestState>,
    Path(id): Path<String>,
    RecordPayload(record): RecordPayload,
) -> Result<Outcome, ServletError> {
    handlers::replace(state.store.as_ref(), &Gadgets, &id, record, None).await
}

async fn patch(
    State(state): State<TestState>,
    Path(id): Path<String>,
    RecordPayload(record): RecordPayload,
) -> Result<Outcome, ServletError> {
    handlers::partial_update(state.store.as_ref(), &Gadgets, &id, record, None).await
}

async fn remove(
    State(state): State<TestState>,
    Path(id): Path<String>,
) -> Result<Outcome, ServletError> {
    handlers::delete(state.store.as_ref(), &Gadgets, &id, None).await
}

struct Harness {
    app: Router,
    store: Arc<InMemoryDocumentStore>,
    token: String,
}

async fn harness() -> Harness {
    let store = Arc::new(InMemoryDocumentStore::new());
    store
        .ensure_indexes(Gadgets.name(), Gadgets.unique_indexes())
        .await
        .unwrap();

    let verifier = JwtVerifier::new(&JwtConfig::new(SECRET));
    let token = verifier.create_access_token("tester", None).unwrap();
    let gated = Chain::new().then(AuthorizationGate::new(
        Arc::new(verifier),
        OwnershipPolicy::Presence,
    ));

    let app = RouteBinder::new()
        .bind(MethodFilter::POST, "/gadgets", &gated, create)
        .bind(MethodFilter::GET, "/gadgets/{id}", &gated, fetch)
        .bind(MethodFilter::PUT, "/gadgets/{id}", &gated, replace)
        .bind(MethodFilter::PATCH, "/gadgets/{id}", &gated, patch)
        .bind(MethodFilter::DELETE, "/gadgets/{id}", &gated, remove)
        .into_router()
        .with_state(TestState {
            store: store.clone(),
        });

    Harness { app, store, token }
}

impl Harness {
    async fn send(&self, method: &str, uri: &str, body: Option<Value>, authed: bool) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if authed {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", self.token));
        }
        let body = match body {
            Some(v) => Body::from(v.to_string()),
            None => Body::empty(),
        };

        let response = self
            .app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }
}

#[tokio::test]
async fn test_unauthenticated_mutation_has_no_side_effects() {
    let h = harness().await;

    let (status, body) = h
        .send("POST", "/gadgets", Some(json!({"id": "g1", "name": "lamp"})), false)
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "UNAUTHORIZED");
    assert_eq!(h.store.count("gadgets").await, 0);
}

#[tokio::test]
async fn test_invalid_token_is_rejected() {
    let h = harness().await;
    let response = h
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/gadgets/g1")
                .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_duplicate_unique_field_conflicts() {
    let h = harness().await;

    let (status, created) = h
        .send("POST", "/gadgets", Some(json!({"id": "g1", "name": "lamp"})), true)
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["id"], "g1");

    let (status, body) = h
        .send("POST", "/gadgets", Some(json!({"id": "g2", "name": "lamp"})), true)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "NAME_IN_USE");
    assert_eq!(body["details"]["field"], "name");

    let (status, first) = h.send("GET", "/gadgets/g1", None, true).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first, created);
    assert_eq!(h.store.count("gadgets").await, 1);
}

#[tokio::test]
async fn test_repeated_create_of_same_record_reports_first_unique_field() {
    let h = harness().await;
    let payload = json!({"id": "g1", "name": "lamp"});

    h.send("POST", "/gadgets", Some(payload.clone()), true).await;
    let (status, body) = h.send("POST", "/gadgets", Some(payload), true).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "NAME_IN_USE");
}

#[tokio::test]
async fn test_duplicate_optional_unique_field() {
    let h = harness().await;
    h.send(
        "POST",
        "/gadgets",
        Some(json!({"name": "lamp", "serial": "SN-1"})),
        true,
    )
    .await;

    let (status, body) = h
        .send(
            "POST",
            "/gadgets",
            Some(json!({"name": "desk", "serial": "SN-1"})),
            true,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "SERIAL_IN_USE");
}

#[tokio::test]
async fn test_null_optional_unique_field_is_not_a_conflict() {
    let h = harness().await;

    for (id, name) in [("g1", "lamp"), ("g2", "desk")] {
        let (status, body) = h
            .send(
                "POST",
                "/gadgets",
                Some(json!({"id": id, "name": name, "serial": null})),
                true,
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(body.get("serial").is_none());
    }

    for (id, name, serial) in [("g3", "chair", "SN-3"), ("g4", "shelf", "SN-4")] {
        h.send(
            "POST",
            "/gadgets",
            Some(json!({"id": id, "name": name, "serial": serial})),
            true,
        )
        .await;

        let (status, body) = h
            .send("PATCH", &format!("/gadgets/{id}"), Some(json!({"serial": null})), true)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.get("serial").is_none());
    }

    let (status, _) = h
        .send("PUT", "/gadgets/g1", Some(json!({"name": "lamp", "serial": null})), true)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(h.store.count("gadgets").await, 4);
}

#[tokio::test]
async fn test_create_generates_primary_key() {
    let h = harness().await;
    let (status, body) = h
        .send("POST", "/gadgets", Some(json!({"name": "lamp"})), true)
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["id"].as_str().is_some_and(|id| !id.is_empty()));
}

#[tokio::test]
async fn test_validation_failure_is_bad_request() {
    let h = harness().await;
    let (status, body) = h
        .send("POST", "/gadgets", Some(json!({"note": "no name"})), true)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert_eq!(body["message"], "name is required");
    assert_eq!(h.store.count("gadgets").await, 0);
}

#[tokio::test]
async fn test_invalid_json_body() {
    let h = harness().await;
    let response = h
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/gadgets")
                .header(header::AUTHORIZATION, format!("Bearer {}", h.token))
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_fetch_missing_is_not_found() {
    let h = harness().await;
    let (status, body) = h.send("GET", "/gadgets/nope", None, true).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_second_delete_is_not_found() {
    let h = harness().await;
    h.send("POST", "/gadgets", Some(json!({"id": "g1", "name": "lamp"})), true)
        .await;

    let (status, body) = h.send("DELETE", "/gadgets/g1", None, true).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = h.send("DELETE", "/gadgets/g1", None, true).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_patch_keeps_and_put_drops_omitted_fields() {
    let h = harness().await;
    h.send(
        "POST",
        "/gadgets",
        Some(json!({"id": "g1", "name": "lamp", "note": "bright"})),
        true,
    )
    .await;

    let (status, patched) = h
        .send("PATCH", "/gadgets/g1", Some(json!({"name": "lantern"})), true)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["name"], "lantern");
    assert_eq!(patched["note"], "bright");

    let (status, replaced) = h
        .send("PUT", "/gadgets/g1", Some(json!({"name": "torch"})), true)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replaced["id"], "g1");
    assert_eq!(replaced["name"], "torch");
    assert!(replaced.get("note").is_none());
}

#[tokio::test]
async fn test_mutations_on_missing_record_are_not_found() {
    let h = harness().await;
    let (status, _) = h
        .send("PATCH", "/gadgets/ghost", Some(json!({"note": "x"})), true)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = h
        .send("PUT", "/gadgets/ghost", Some(json!({"name": "x"})), true)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
