use axum::{
    Router,
    handler::Handler,
    middleware::from_fn_with_state,
    routing::{MethodFilter, on},
};
use axum_helpers::{Chain, run_chain};

/// Binds (method, path) pairs to a handler behind an ordered step chain.
///
/// The chain is attached with `route_layer`, so it only runs for requests
/// that matched the bound route. Binding the same path under another method
/// adds to the existing route.
///
/// ```ignore
/// let router = RouteBinder::new()
///     .bind(MethodFilter::GET, "/users/{id}", &gated, fetch_user)
///     .bind(MethodFilter::DELETE, "/users/{id}", &gated, delete_user)
///     .into_router()
///     .with_state(state);
/// ```
pub struct RouteBinder<S = ()> {
    router: Router<S>,
    bound: usize,
}

impl<S> Default for RouteBinder<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self {
            router: Router::new(),
            bound: 0,
        }
    }
}

impl<S> RouteBinder<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind<H, T>(mut self, method: MethodFilter, path: &str, chain: &Chain, handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        tracing::debug!(?method, path, steps = chain.len(), "Binding route");

        let route = if chain.is_empty() {
            on(method, handler)
        } else {
            on(method, handler).route_layer(from_fn_with_state(chain.clone(), run_chain))
        };

        self.router = self.router.route(path, route);
        self.bound += 1;
        self
    }

    /// Number of (method, path) bindings made so far
    pub fn len(&self) -> usize {
        self.bound
    }

    pub fn is_empty(&self) -> bool {
        self.bound == 0
    }

    pub fn into_router(self) -> Router<S> {
        self.router
    }
}
