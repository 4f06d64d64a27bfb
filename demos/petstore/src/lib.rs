//! The petstore from the OpenAPI examples, documented with apiscribe.

pub mod controllers;
pub mod docs;
pub mod models;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use apiscribe::{ConfigError, Contact, OpenApiConfig, OpenApiRouterExt, SpecService};
use axum::Router;

use services::PetService;

/// Settings used when no config file is found.
pub fn default_config() -> OpenApiConfig {
    OpenApiConfig::new("Swagger Petstore", "1.0.0")
        .with_description(
            "A sample API that uses a petstore as an example to demonstrate features in the OpenAPI specification",
        )
        .with_terms_of_service("http://swagger.io/terms/")
        .with_contact(Contact {
            name: Some("Swagger API Team".into()),
            ..Contact::default()
        })
        .with_license("MIT")
        .with_tag("pets", Some("Everything about your pets"))
        .with_spec_path("/api.json")
        .with_docs_path("/swagger")
        .with_docs_ui(true)
}

/// Load `application.yaml` (plus the `profile` overlay) from `dir`, or the
/// built-in settings when the directory has no base file. A file that
/// exists but does not parse or validate is an error.
pub fn load_config(dir: impl AsRef<Path>, profile: &str) -> Result<OpenApiConfig, ConfigError> {
    let dir = dir.as_ref();
    if !dir.join("application.yaml").exists() {
        tracing::info!(dir = %dir.display(), "no application.yaml, using built-in OpenAPI config");
        return Ok(default_config());
    }
    OpenApiConfig::load_profile(dir, profile)
}

/// The API routes plus the spec and docs endpoints.
pub fn app(service: PetService, spec: Arc<SpecService>) -> Router {
    controllers::pet_controller::router(service).with_openapi(spec)
}
