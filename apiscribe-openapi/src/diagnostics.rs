use serde::Serialize;
use std::fmt;

/// What a non-fatal finding is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A documentation example does not fit the schema it illustrates.
    ExampleMismatch,
    /// The path template names a parameter no descriptor declares.
    UndeclaredPathParameter,
    /// A path parameter is declared but absent from the template.
    UnusedPathParameter,
    /// A path parameter was declared optional; it is emitted as required.
    OptionalPathParameter,
    /// A security requirement names a scheme the config does not define.
    UnknownSecurityScheme,
}

/// A finding that does not stop assembly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub operation_id: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, operation_id: &str, message: impl Into<String>) -> Self {
        Self {
            kind,
            operation_id: Some(operation_id.to_string()),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operation_id {
            Some(ref id) => write!(f, "[{id}] {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Collects diagnostics during one assembly pass, logging each as it lands.
#[derive(Debug, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        tracing::warn!(
            kind = ?diagnostic.kind,
            operation_id = diagnostic.operation_id.as_deref().unwrap_or(""),
            "{}",
            diagnostic.message
        );
        self.items.push(diagnostic);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}
