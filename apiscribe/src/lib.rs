//! apiscribe: declare route documentation next to your handlers and serve one
//! deterministic OpenAPI document.
//!
//! This facade crate re-exports the sub-crates through a single dependency.
//!
//! ```ignore
//! use apiscribe::prelude::*;
//! ```
//!
//! # Feature flags
//!
//! | Feature   | Default | Crate               |
//! |-----------|---------|---------------------|
//! | `openapi` | **yes** | `apiscribe-openapi` |

pub extern crate apiscribe_core;

// Descriptor model at the top level.
pub use apiscribe_core::*;

#[cfg(feature = "openapi")]
pub use apiscribe_openapi;

#[cfg(feature = "openapi")]
pub use apiscribe_openapi::{
    assemble, Document, DocumentAssembler, OpenApiRouterExt, SpecError, SpecService,
};

/// Unified prelude, `use apiscribe::prelude::*`.
pub mod prelude {
    pub use apiscribe_core::prelude::*;

    #[cfg(feature = "openapi")]
    pub use apiscribe_openapi::{Document, OpenApiRouterExt, SpecError, SpecService};
}
