use std::sync::Arc;

use apiscribe::SpecService;
use petstore::services::PetService;

#[tokio::main]
async fn main() {
    apiscribe::init_tracing();

    let config_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/config");
    let config = match petstore::load_config(config_dir, "dev") {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "invalid OpenAPI config");
            std::process::exit(1);
        }
    };

    let spec = match SpecService::new(config, petstore::docs::routes()) {
        Ok(spec) => Arc::new(spec),
        Err(err) => {
            tracing::error!(error = %err, "OpenAPI document could not be assembled");
            std::process::exit(1);
        }
    };
    tracing::info!(
        diagnostics = spec.current().diagnostics().len(),
        "OpenAPI document ready"
    );

    let spec_path = spec.config().spec_path.clone();
    let docs_path = spec.config().docs_path.clone();
    let app = petstore::app(PetService::new(), spec);

    let listener = match tokio::net::TcpListener::bind("127.0.0.1:8080").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(error = %err, "failed to bind 127.0.0.1:8080");
            std::process::exit(1);
        }
    };
    tracing::info!(spec = %spec_path, docs = %docs_path, "petstore listening on http://127.0.0.1:8080");
    if let Err(err) = axum::serve(listener, app).await {
        tracing::error!(error = %err, "server error");
    }
}
