use http::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use super::types::TypeDescriptor;

/// Where a parameter is located in the HTTP request.
///
/// Variant order is the order parameters are emitted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    Path,
    Query,
    Header,
    Cookie,
}

impl ParamLocation {
    pub fn as_str(self) -> &'static str {
        match self {
            ParamLocation::Path => "path",
            ParamLocation::Query => "query",
            ParamLocation::Header => "header",
            ParamLocation::Cookie => "cookie",
        }
    }
}

impl fmt::Display for ParamLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A documentation example: a literal value plus optional metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Example {
    pub value: Value,
    pub summary: Option<String>,
    pub description: Option<String>,
}

impl Example {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            summary: None,
            description: None,
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl From<Value> for Example {
    fn from(value: Value) -> Self {
        Example::new(value)
    }
}

/// Insert or replace a named example, keeping first-declaration order.
fn upsert_example(examples: &mut Vec<(String, Example)>, name: String, example: Example) {
    match examples.iter_mut().find(|(n, _)| *n == name) {
        Some(slot) => slot.1 = example,
        None => examples.push((name, example)),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDescriptor {
    pub location: ParamLocation,
    pub name: String,
    pub required: bool,
    pub ty: TypeDescriptor,
    pub description: Option<String>,
    pub example: Option<Value>,
    pub examples: Vec<(String, Example)>,
    pub deprecated: bool,
}

impl ParameterDescriptor {
    pub fn new(location: ParamLocation, name: impl Into<String>, ty: TypeDescriptor) -> Self {
        let required = location == ParamLocation::Path || !ty.is_nullable();
        Self {
            location,
            name: name.into(),
            required,
            ty,
            description: None,
            example: None,
            examples: Vec::new(),
            deprecated: false,
        }
    }

    pub fn path(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self::new(ParamLocation::Path, name, ty)
    }

    /// Query parameters typed as nullable start out optional.
    pub fn query(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self::new(ParamLocation::Query, name, ty)
    }

    pub fn header(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self::new(ParamLocation::Header, name, ty)
    }

    pub fn cookie(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self::new(ParamLocation::Cookie, name, ty)
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn example(mut self, value: impl Into<Value>) -> Self {
        self.example = Some(value.into());
        self
    }

    pub fn named_example(mut self, name: impl Into<String>, example: impl Into<Example>) -> Self {
        upsert_example(&mut self.examples, name.into(), example.into());
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BodyDescriptor {
    pub ty: TypeDescriptor,
    pub required: bool,
    /// Empty means "infer from the schema".
    pub media_types: Vec<String>,
    pub description: Option<String>,
    pub examples: Vec<(String, Example)>,
}

impl BodyDescriptor {
    pub fn new(ty: TypeDescriptor) -> Self {
        Self {
            ty,
            required: true,
            media_types: Vec::new(),
            description: None,
            examples: Vec::new(),
        }
    }

    /// Body typed by a [`Describe`](crate::Describe) implementor.
    pub fn of<T: crate::Describe>() -> Self {
        Self::new(T::describe())
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn media_type(mut self, media_type: impl Into<String>) -> Self {
        let media_type = media_type.into();
        if !self.media_types.contains(&media_type) {
            self.media_types.push(media_type);
        }
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn example(mut self, name: impl Into<String>, example: impl Into<Example>) -> Self {
        upsert_example(&mut self.examples, name.into(), example.into());
        self
    }
}

/// Which status codes a response descriptor covers.
///
/// Ordering puts concrete codes first, ascending, and `Default` last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StatusSelector {
    Code(u16),
    /// Every code not listed explicitly.
    Default,
}

impl StatusSelector {
    /// Whether the selector names a status the HTTP grammar allows.
    pub fn is_valid(self) -> bool {
        match self {
            StatusSelector::Code(code) => (100..=599).contains(&code),
            StatusSelector::Default => true,
        }
    }

    /// Key used in the `responses` map.
    pub fn key(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for StatusSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusSelector::Code(code) => write!(f, "{code}"),
            StatusSelector::Default => f.write_str("default"),
        }
    }
}

impl From<u16> for StatusSelector {
    fn from(code: u16) -> Self {
        StatusSelector::Code(code)
    }
}

impl From<StatusCode> for StatusSelector {
    fn from(code: StatusCode) -> Self {
        StatusSelector::Code(code.as_u16())
    }
}

/// Returned when a status selector string is neither a number nor `default`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid status selector `{0}`")]
pub struct InvalidStatusSelector(pub String);

impl FromStr for StatusSelector {
    type Err = InvalidStatusSelector;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("default") {
            return Ok(StatusSelector::Default);
        }
        trimmed
            .parse::<u16>()
            .map(StatusSelector::Code)
            .map_err(|_| InvalidStatusSelector(s.to_string()))
    }
}

/// A header a response may carry.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseHeader {
    pub name: String,
    pub ty: TypeDescriptor,
    pub description: Option<String>,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResponseDescriptor {
    pub status: StatusSelector,
    pub description: Option<String>,
    pub body: Option<BodyDescriptor>,
    pub headers: Vec<ResponseHeader>,
}

impl ResponseDescriptor {
    pub fn new(status: impl Into<StatusSelector>) -> Self {
        Self {
            status: status.into(),
            description: None,
            body: None,
            headers: Vec::new(),
        }
    }

    pub fn ok() -> Self {
        Self::new(StatusCode::OK)
    }

    /// Response covering every status not declared explicitly.
    pub fn fallback() -> Self {
        Self::new(StatusSelector::Default)
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn body(mut self, body: BodyDescriptor) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header(
        mut self,
        name: impl Into<String>,
        ty: TypeDescriptor,
        description: impl Into<String>,
    ) -> Self {
        self.headers.push(ResponseHeader {
            name: name.into(),
            ty,
            description: Some(description.into()),
            required: false,
        });
        self
    }
}

/// A named security scheme plus the scopes an operation needs from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityRequirement {
    pub scheme: String,
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl SecurityRequirement {
    pub fn new(scheme: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            scopes: Vec::new(),
        }
    }

    pub fn with_scopes(mut self, scopes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalDocs {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Everything documented about one route.
///
/// Produced by [`OperationDescriptorBuilder::build`] and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationDescriptor {
    /// Explicit id; when absent one is derived from method and path.
    pub operation_id: Option<String>,
    pub method: Method,
    pub path: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub parameters: Vec<ParameterDescriptor>,
    pub request_body: Option<BodyDescriptor>,
    pub responses: Vec<ResponseDescriptor>,
    pub deprecated: bool,
    /// Hidden operations are left out of the document entirely.
    pub hidden: bool,
    pub security: Vec<SecurityRequirement>,
    pub external_docs: Option<ExternalDocs>,
}

impl OperationDescriptor {
    pub fn builder(method: Method, path: impl Into<String>) -> OperationDescriptorBuilder {
        OperationDescriptorBuilder::new(method, path.into())
    }

    pub fn get(path: impl Into<String>) -> OperationDescriptorBuilder {
        Self::builder(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> OperationDescriptorBuilder {
        Self::builder(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> OperationDescriptorBuilder {
        Self::builder(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> OperationDescriptorBuilder {
        Self::builder(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> OperationDescriptorBuilder {
        Self::builder(Method::DELETE, path)
    }

    /// The id this operation is published under.
    ///
    /// Derived ids look like `get_pets_id` for `GET /pets/{id}`.
    pub fn effective_id(&self) -> String {
        if let Some(ref id) = self.operation_id {
            return id.clone();
        }
        let mut id = self.method.as_str().to_lowercase();
        for segment in self.path.split('/').filter(|s| !s.is_empty()) {
            let cleaned: String = segment
                .chars()
                .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
                .collect();
            let cleaned = cleaned.trim_matches('_');
            if !cleaned.is_empty() {
                id.push('_');
                id.push_str(cleaned);
            }
        }
        id
    }
}

/// Mutable accumulator for an [`OperationDescriptor`].
#[derive(Debug)]
pub struct OperationDescriptorBuilder {
    inner: OperationDescriptor,
}

impl OperationDescriptorBuilder {
    fn new(method: Method, path: String) -> Self {
        Self {
            inner: OperationDescriptor {
                operation_id: None,
                method,
                path,
                summary: None,
                description: None,
                tags: Vec::new(),
                parameters: Vec::new(),
                request_body: None,
                responses: Vec::new(),
                deprecated: false,
                hidden: false,
                security: Vec::new(),
                external_docs: None,
            },
        }
    }

    pub fn operation_id(mut self, id: impl Into<String>) -> Self {
        self.inner.operation_id = Some(id.into());
        self
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.inner.summary = Some(summary.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.inner.description = Some(description.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        if !self.inner.tags.contains(&tag) {
            self.inner.tags.push(tag);
        }
        self
    }

    pub fn parameter(mut self, parameter: ParameterDescriptor) -> Self {
        self.inner.parameters.push(parameter);
        self
    }

    pub fn request_body(mut self, body: BodyDescriptor) -> Self {
        self.inner.request_body = Some(body);
        self
    }

    pub fn response(mut self, response: ResponseDescriptor) -> Self {
        self.inner.responses.push(response);
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.inner.deprecated = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.inner.hidden = true;
        self
    }

    pub fn security(mut self, requirement: SecurityRequirement) -> Self {
        self.inner.security.push(requirement);
        self
    }

    pub fn external_docs(mut self, url: impl Into<String>, description: Option<&str>) -> Self {
        self.inner.external_docs = Some(ExternalDocs {
            url: url.into(),
            description: description.map(str::to_string),
        });
        self
    }

    pub fn build(self) -> OperationDescriptor {
        self.inner
    }
}
