use axum::Router;
use std::sync::Arc;

use crate::handlers::openapi_routes;
use crate::service::SpecService;

/// Mounts the spec endpoints on an application router.
///
/// # Example
///
/// ```ignore
/// use apiscribe_openapi::{OpenApiRouterExt, SpecService};
///
/// let spec = Arc::new(SpecService::new(config, routes)?);
/// let app = Router::new()
///     .route("/pets", get(list_pets))
///     .with_openapi(spec);
/// ```
pub trait OpenApiRouterExt {
    fn with_openapi(self, service: Arc<SpecService>) -> Self;
}

impl<S> OpenApiRouterExt for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_openapi(self, service: Arc<SpecService>) -> Self {
        tracing::debug!(
            spec_path = %service.config().spec_path,
            docs_ui = service.config().docs_ui,
            "mounting OpenAPI routes"
        );
        self.merge(openapi_routes::<S>(service))
    }
}
