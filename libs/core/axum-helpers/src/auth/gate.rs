use super::config::OwnershipPolicy;
use super::jwt::{AuthError, CredentialVerifier};
use crate::errors::AppError;
use crate::middleware::Step;
use async_trait::async_trait;
use axum::{
    RequestExt,
    extract::{RawPathParams, Request},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// Path parameter compared against the identity under [`OwnershipPolicy::Owner`]
pub const OWNER_PATH_PARAM: &str = "id";

/// Extract the credential from the request headers.
///
/// Accepted, in order: `Authorization: Bearer <token>`, a bare
/// `Authorization: <token>`, then the `access_token` cookie.
pub fn extract_token_from_request(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|auth| !auth.is_empty())
        .map(|auth| strip_bearer(auth).trim().to_string())
        .or_else(|| {
            headers
                .get("cookie")
                .and_then(|v| v.to_str().ok())
                .and_then(|cookies| {
                    cookies.split(';').find_map(|cookie| {
                        let (name, value) = cookie.trim().split_once('=')?;
                        (name == "access_token" && !value.is_empty()).then(|| value.to_string())
                    })
                })
        })
}

/// Drop a leading `Bearer ` scheme; scheme names are case-insensitive.
fn strip_bearer(auth: &str) -> &str {
    const SCHEME: &str = "bearer ";
    match auth.get(..SCHEME.len()) {
        Some(scheme) if scheme.eq_ignore_ascii_case(SCHEME) => &auth[SCHEME.len()..],
        _ => auth,
    }
}

/// Rejects requests that carry no valid credential.
///
/// Runs as the first step of a route's chain; on rejection the handler never
/// runs. On success the resolved [`Identity`](super::Identity) is available to
/// handlers through `Extension<Identity>`.
#[derive(Clone)]
pub struct AuthorizationGate {
    verifier: Arc<dyn CredentialVerifier>,
    policy: OwnershipPolicy,
}

impl AuthorizationGate {
    pub fn new(verifier: Arc<dyn CredentialVerifier>, policy: OwnershipPolicy) -> Self {
        Self { verifier, policy }
    }

    pub fn policy(&self) -> OwnershipPolicy {
        self.policy
    }

    fn reject(error: AuthError) -> Response {
        tracing::debug!(reason = %error, "Request rejected by authorization gate");
        AppError::Unauthorized(error.to_string()).into_response()
    }
}

#[async_trait]
impl Step for AuthorizationGate {
    async fn process(&self, request: &mut Request) -> Result<(), Response> {
        let token = extract_token_from_request(request.headers())
            .ok_or_else(|| Self::reject(AuthError::MissingCredential))?;

        let identity = self.verifier.verify(&token).map_err(Self::reject)?;

        if self.policy == OwnershipPolicy::Owner {
            // Routes without path params have nothing to own
            if let Ok(params) = request.extract_parts::<RawPathParams>().await {
                let owned = params
                    .iter()
                    .find(|(key, _)| *key == OWNER_PATH_PARAM)
                    .map(|(_, value)| value.to_string());

                if owned.is_some_and(|id| id != identity.subject) {
                    return Err(Self::reject(AuthError::NotOwner));
                }
            }
        }

        tracing::debug!(subject = %identity.subject, "Request authorized");
        request.extensions_mut().insert(identity);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::{Identity, MockCredentialVerifier};
    use axum::http::{HeaderValue, StatusCode};

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_extract_bearer_token() {
        let h = headers(&[("authorization", "Bearer abc.def.ghi")]);
        assert_eq!(extract_token_from_request(&h).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_extract_bearer_scheme_any_case() {
        for value in ["bearer abc.def.ghi", "BEARER abc.def.ghi", "BeArEr  abc.def.ghi"] {
            let mut h = HeaderMap::new();
            h.insert("authorization", HeaderValue::from_str(value).unwrap());
            assert_eq!(extract_token_from_request(&h).as_deref(), Some("abc.def.ghi"));
        }
    }

    #[test]
    fn test_extract_raw_authorization_value() {
        let h = headers(&[("authorization", "abc.def.ghi")]);
        assert_eq!(extract_token_from_request(&h).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_extract_cookie_token() {
        let h = headers(&[("cookie", "theme=dark; access_token=tok123")]);
        assert_eq!(extract_token_from_request(&h).as_deref(), Some("tok123"));
    }

    #[test]
    fn test_extract_nothing() {
        let h = headers(&[("cookie", "theme=dark")]);
        assert!(extract_token_from_request(&h).is_none());
    }

    #[tokio::test]
    async fn test_missing_credential_short_circuits_without_verifying() {
        let mut verifier = MockCredentialVerifier::new();
        verifier.expect_verify().never();
        let gate = AuthorizationGate::new(Arc::new(verifier), OwnershipPolicy::Presence);

        let mut request = Request::builder().uri("/users").body(axum::body::Body::empty()).unwrap();
        let response = gate.process(&mut request).await.unwrap_err();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_valid_credential_inserts_identity() {
        let mut verifier = MockCredentialVerifier::new();
        verifier
            .expect_verify()
            .withf(|token: &str| token == "good")
            .returning(|_| {
                Ok(Identity {
                    subject: "u1".to_string(),
                    name: None,
                })
            });
        let gate = AuthorizationGate::new(Arc::new(verifier), OwnershipPolicy::Presence);

        let mut request = Request::builder()
            .uri("/users")
            .header("authorization", "Bearer good")
            .body(axum::body::Body::empty())
            .unwrap();
        gate.process(&mut request).await.unwrap();

        let identity = request.extensions().get::<Identity>().unwrap();
        assert_eq!(identity.subject, "u1");
    }
}
