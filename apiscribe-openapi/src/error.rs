use apiscribe_core::{ParamLocation, StatusSelector};

/// Every way document assembly can fail.
///
/// All variants are fatal: assembly stops and no document is produced.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SpecError {
    /// A type descriptor could not be mapped to a schema.
    #[error("cannot resolve schema for `{type_name}`{}: {reason}", format_chain(.chain))]
    SchemaResolution {
        type_name: String,
        /// Outermost first: operation, location, then each enclosing type or field.
        chain: Vec<String>,
        reason: String,
    },

    #[error("duplicate operation {method} {path}")]
    DuplicateOperation { method: String, path: String },

    #[error("duplicate operationId `{0}`")]
    DuplicateOperationId(String),

    #[error("operation `{operation_id}` declares invalid response status `{selector}` (expected 100-599 or `default`)")]
    InvalidResponseCode {
        operation_id: String,
        selector: String,
    },

    #[error("operation `{operation_id}` declares response `{selector}` more than once")]
    DuplicateResponse {
        operation_id: String,
        selector: StatusSelector,
    },

    #[error("operation `{operation_id}` declares {location} parameter `{name}` more than once")]
    DuplicateParameter {
        operation_id: String,
        location: ParamLocation,
        name: String,
    },

    /// Only raised when example validation is strict.
    #[error("operation `{operation_id}`: example `{example}` does not match its schema: {reason}")]
    ExampleMismatch {
        operation_id: String,
        example: String,
        reason: String,
    },

    #[error("failed to serialize document: {0}")]
    Serialize(String),
}

fn format_chain(chain: &[String]) -> String {
    if chain.is_empty() {
        String::new()
    } else {
        format!(" (in {})", chain.join(" > "))
    }
}

impl From<serde_json::Error> for SpecError {
    fn from(err: serde_json::Error) -> Self {
        SpecError::Serialize(err.to_string())
    }
}

impl From<serde_yaml::Error> for SpecError {
    fn from(err: serde_yaml::Error) -> Self {
        SpecError::Serialize(err.to_string())
    }
}
