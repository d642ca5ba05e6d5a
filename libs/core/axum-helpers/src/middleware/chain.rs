use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::fmt;
use std::sync::Arc;

/// One pre-handler step.
///
/// Returning `Err(response)` stops the chain and sends `response`.
#[async_trait]
pub trait Step: Send + Sync + 'static {
    async fn process(&self, request: &mut Request) -> Result<(), Response>;
}

/// Ordered sequence of steps. Cheap to clone.
#[derive(Clone, Default)]
pub struct Chain {
    steps: Vec<Arc<dyn Step>>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step; steps run in insertion order.
    pub fn then(mut self, step: impl Step) -> Self {
        self.steps.push(Arc::new(step));
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run every step against `request`, stopping at the first rejection.
    pub async fn process(&self, request: &mut Request) -> Result<(), Response> {
        for step in &self.steps {
            step.process(request).await?;
        }
        Ok(())
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain").field("steps", &self.steps.len()).finish()
    }
}

/// Axum middleware adapter for a [`Chain`].
///
/// Use with `axum::middleware::from_fn_with_state(chain, run_chain)`.
pub async fn run_chain(State(chain): State<Chain>, mut request: Request, next: Next) -> Response {
    match chain.process(&mut request).await {
        Ok(()) => next.run(request).await,
        Err(response) => response,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        body::Body,
        http::StatusCode,
        middleware,
        response::IntoResponse,
        routing::get,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    struct Tag(&'static str);

    #[async_trait]
    impl Step for Tag {
        async fn process(&self, request: &mut Request) -> Result<(), Response> {
            let mut seen = request
                .extensions()
                .get::<Vec<&'static str>>()
                .cloned()
                .unwrap_or_default();
            seen.push(self.0);
            request.extensions_mut().insert(seen);
            Ok(())
        }
    }

    struct Deny(Arc<AtomicUsize>);

    #[async_trait]
    impl Step for Deny {
        async fn process(&self, _request: &mut Request) -> Result<(), Response> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Err(StatusCode::UNAUTHORIZED.into_response())
        }
    }

    async fn echo_tags(request: Request) -> String {
        request
            .extensions()
            .get::<Vec<&'static str>>()
            .map(|tags| tags.join(","))
            .unwrap_or_default()
    }

    fn app(chain: Chain) -> Router {
        Router::new().route(
            "/",
            get(echo_tags).route_layer(middleware::from_fn_with_state(chain, run_chain)),
        )
    }

    #[tokio::test]
    async fn test_steps_run_in_order() {
        let chain = Chain::new().then(Tag("first")).then(Tag("second"));
        assert_eq!(chain.len(), 2);

        let response = app(chain)
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"first,second");
    }

    #[tokio::test]
    async fn test_rejection_stops_later_steps() {
        let calls = Arc::new(AtomicUsize::new(0));
        let later = Arc::new(AtomicUsize::new(0));
        let chain = Chain::new()
            .then(Deny(calls.clone()))
            .then(Deny(later.clone()));

        let response = app(chain)
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(later.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_chain_passes_through() {
        let chain = Chain::new();
        assert!(chain.is_empty());

        let response = app(chain)
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
