use apiscribe_core::{OpenApiConfig, RouteTable};
use arc_swap::ArcSwap;
use axum::Router;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::builder::{Document, DocumentAssembler};
use crate::error::SpecError;
use crate::handlers::openapi_routes;

/// Serves one assembled document over HTTP and swaps it on reload.
///
/// Construction assembles eagerly, so a broken route tree fails before the
/// host starts serving anything. Readers get the current document without
/// locking; only reloads take the assembler lock.
pub struct SpecService {
    config: OpenApiConfig,
    assembler: Mutex<DocumentAssembler>,
    current: ArcSwap<Document>,
}

impl SpecService {
    pub fn new(config: OpenApiConfig, routes: RouteTable) -> Result<Self, SpecError> {
        let assembler = DocumentAssembler::with_routes(config.clone(), routes);
        let document = assembler.document()?;
        Ok(Self {
            config,
            assembler: Mutex::new(assembler),
            current: ArcSwap::new(document),
        })
    }

    pub fn config(&self) -> &OpenApiConfig {
        &self.config
    }

    /// The document being served right now.
    pub fn current(&self) -> Arc<Document> {
        self.current.load_full()
    }

    /// Reassemble from a new route tree and start serving the result.
    ///
    /// On failure the previous routes and document stay in place and the
    /// error is returned.
    pub fn reload(&self, routes: RouteTable) -> Result<Arc<Document>, SpecError> {
        let mut assembler = self.lock();
        let previous = assembler.replace_routes(routes);
        match assembler.document() {
            Ok(document) => {
                self.current.store(document.clone());
                tracing::info!(operations = assembler.routes().len(), "OpenAPI document reloaded");
                Ok(document)
            }
            Err(err) => {
                assembler.replace_routes(previous);
                tracing::warn!(error = %err, "OpenAPI reload failed, keeping previous document");
                Err(err)
            }
        }
    }

    /// Reassemble from the current route tree.
    pub fn refresh(&self) -> Result<Arc<Document>, SpecError> {
        let assembler = self.lock();
        assembler.routes_changed();
        let document = assembler.document()?;
        self.current.store(document.clone());
        Ok(document)
    }

    /// Routes serving the spec (and the docs page when enabled).
    pub fn router<S>(self: &Arc<Self>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        openapi_routes(self.clone())
    }

    fn lock(&self) -> MutexGuard<'_, DocumentAssembler> {
        self.assembler
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
