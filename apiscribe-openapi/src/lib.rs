//! OpenAPI document synthesis for apiscribe.
//!
//! Type descriptors become JSON Schema through [`TypeSchemaResolver`], named
//! types are interned in a [`ComponentRegistry`], each route becomes an
//! Operation via [`OperationBuilder`], and [`assemble`] ties everything into
//! one [`Document`]. [`SpecService`] serves it over HTTP.

mod builder;
pub mod diagnostics;
mod error;
pub mod examples;
mod ext;
mod handlers;
pub mod negotiate;
mod operation;
pub mod registry;
pub mod schema;
mod service;

pub use apiscribe_core::OpenApiConfig;
pub use builder::{assemble, Document, DocumentAssembler};
pub use diagnostics::{Diagnostic, DiagnosticKind};
pub use error::SpecError;
pub use ext::OpenApiRouterExt;
pub use handlers::{openapi_routes, serve_spec};
pub use negotiate::SpecFormat;
pub use operation::{infer_media_type, path_template_params, OperationBuilder};
pub use registry::ComponentRegistry;
pub use schema::{resolve_standalone, ResolveContext, ResolveOptions, TypeCatalog, TypeSchemaResolver};
pub use service::SpecService;
