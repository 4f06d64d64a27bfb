use axum::body::Body;
use axum::Router;
use bytes::Bytes;
use http::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE, IF_NONE_MATCH};
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tower::util::ServiceExt;

/// In-process HTTP test client wrapping an Axum `Router`.
///
/// Uses `tower::ServiceExt::oneshot` to dispatch requests without binding
/// to a TCP port.
pub struct TestApp {
    router: Router,
}

impl TestApp {
    /// Create a `TestApp` from an assembled `axum::Router`.
    pub fn new(router: Router) -> Self {
        Self { router }
    }

    /// Start building a GET request.
    pub fn get(&self, path: &str) -> TestRequest<'_> {
        TestRequest::new(self, Method::GET, path)
    }

    /// Start building a POST request.
    pub fn post(&self, path: &str) -> TestRequest<'_> {
        TestRequest::new(self, Method::POST, path)
    }

    /// Start building a DELETE request.
    pub fn delete(&self, path: &str) -> TestRequest<'_> {
        TestRequest::new(self, Method::DELETE, path)
    }
}

/// Builder for constructing and sending a test HTTP request.
pub struct TestRequest<'a> {
    app: &'a TestApp,
    method: Method,
    path: String,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
}

impl<'a> TestRequest<'a> {
    fn new(app: &'a TestApp, method: Method, path: &str) -> Self {
        Self {
            app,
            method,
            path: path.to_string(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    fn with_header(mut self, name: HeaderName, value: &str) -> Self {
        let value = HeaderValue::from_str(value)
            .unwrap_or_else(|e| panic!("invalid `{name}` header value {value:?}: {e}"));
        self.headers.insert(name, value);
        self
    }

    /// Set the `Accept` header.
    pub fn accept(self, media_range: &str) -> Self {
        self.with_header(ACCEPT, media_range)
    }

    /// Make the request conditional on the given entity tag(s).
    pub fn if_none_match(self, etag: &str) -> Self {
        self.with_header(IF_NONE_MATCH, etag)
    }

    /// Set the request body as JSON. Also sets Content-Type to `application/json`.
    pub fn json(mut self, body: &impl Serialize) -> Self {
        self.body = Some(serde_json::to_vec(body).expect("request body must serialize"));
        self.with_header(CONTENT_TYPE, "application/json")
    }

    /// Send the request and return the response.
    pub async fn send(self) -> TestResponse {
        let body = self.body.map_or_else(Body::empty, Body::from);
        let mut request = Request::builder()
            .method(self.method)
            .uri(&self.path)
            .body(body)
            .unwrap_or_else(|e| panic!("invalid request to {}: {e}", self.path));
        *request.headers_mut() = self.headers;

        let response = self
            .app
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("failed to read response body")
            .to_bytes();

        TestResponse { status, headers, body }
    }
}

// ─── JSON path resolution ───

enum Step<'p> {
    Field(&'p str),
    Index(usize),
    Len,
}

/// `users[0].name` becomes `Field(users) Index(0) Field(name)`.
fn steps(path: &str) -> Vec<Step<'_>> {
    let mut out = Vec::new();
    for segment in path.split('.').filter(|s| !s.is_empty()) {
        if segment == "len()" || segment == "size()" {
            out.push(Step::Len);
            continue;
        }
        let (field, mut indices) = segment.split_at(segment.find('[').unwrap_or(segment.len()));
        if !field.is_empty() {
            out.push(Step::Field(field));
        }
        while let Some(rest) = indices.strip_prefix('[') {
            let (index, tail) = rest
                .split_once(']')
                .unwrap_or_else(|| panic!("unclosed bracket in JSON path `{path}`"));
            let index = index
                .parse()
                .unwrap_or_else(|_| panic!("non-numeric index `{index}` in JSON path `{path}`"));
            out.push(Step::Index(index));
            indices = tail;
        }
    }
    out
}

/// Resolve a dotted path (`users[0].name`, `items.len()`) or, when the path
/// starts with `/`, a JSON pointer (`/paths/~1pets/get`). Missing values
/// resolve to `null`.
pub fn resolve_path(root: &Value, path: &str) -> Value {
    if path.starts_with('/') {
        return root.pointer(path).cloned().unwrap_or(Value::Null);
    }
    let mut current = Some(root);
    for step in steps(path) {
        let Some(value) = current else {
            return Value::Null;
        };
        current = match step {
            Step::Field(name) => value.get(name),
            Step::Index(index) => value.get(index),
            Step::Len => {
                let len = match value {
                    Value::Array(a) => a.len(),
                    Value::Object(o) => o.len(),
                    Value::String(s) => s.len(),
                    other => panic!("len() applied to non-collection in `{path}`: {other}"),
                };
                return Value::from(len);
            }
        };
    }
    current.cloned().unwrap_or(Value::Null)
}

// ─── TestResponse ───

/// Response wrapper with status assertions, JSON-path assertions, and body helpers.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    // ── Status assertions (common codes) ──

    /// Assert status is 200 OK.
    pub fn assert_ok(self) -> Self {
        self.assert_status(StatusCode::OK)
    }

    /// Assert status is 204 No Content.
    pub fn assert_no_content(self) -> Self {
        self.assert_status(StatusCode::NO_CONTENT)
    }

    /// Assert status is 304 Not Modified with an empty body.
    pub fn assert_not_modified(self) -> Self {
        let resp = self.assert_status(StatusCode::NOT_MODIFIED);
        assert!(
            resp.body.is_empty(),
            "Expected empty body on 304, got {} bytes",
            resp.body.len()
        );
        resp
    }

    /// Assert status is 404 Not Found.
    pub fn assert_not_found(self) -> Self {
        self.assert_status(StatusCode::NOT_FOUND)
    }

    /// Assert the response has a specific status code.
    pub fn assert_status(self, expected: StatusCode) -> Self {
        assert_eq!(
            self.status,
            expected,
            "Expected {expected}, got {}\nBody: {}",
            self.status,
            self.text()
        );
        self
    }

    // ── JSON-path assertions ──

    /// Assert that a JSON path resolves to the expected value.
    ///
    /// ```ignore
    /// resp.assert_json_path("info.title", "Petstore")
    ///     .assert_json_path("/paths/~1pets/get/operationId", "findPets")
    ///     .assert_json_path("components.schemas.len()", 3);
    /// ```
    pub fn assert_json_path(self, path: &str, expected: impl Into<Value>) -> Self {
        let root: Value = self.json();
        let actual = resolve_path(&root, path);
        let expected = expected.into();
        assert_eq!(
            actual, expected,
            "JSON path \"{path}\" assertion failed\n  Expected: {expected}\n  Actual:   {actual}\n  Body: {root}",
        );
        self
    }

    /// Extract and deserialize a value at a JSON path.
    ///
    /// ```ignore
    /// let id: i64 = resp.json_path("id");
    /// ```
    pub fn json_path<T: DeserializeOwned>(&self, path: &str) -> T {
        let root: Value = self.json();
        let value = resolve_path(&root, path);
        serde_json::from_value(value.clone()).unwrap_or_else(|e| {
            panic!(
                "Failed to deserialize JSON path \"{path}\": {e}\n  Value: {value}\n  Body: {root}"
            )
        })
    }

    // ── Header access ──

    /// Get a response header value by name.
    pub fn header(&self, name: impl AsRef<str>) -> Option<&str> {
        let name: HeaderName = name.as_ref().parse().ok()?;
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Assert a response header has exactly the given value.
    pub fn assert_header(self, name: &str, expected: &str) -> Self {
        let actual = self.header(name).map(str::to_string);
        assert_eq!(
            actual.as_deref(),
            Some(expected),
            "Header \"{name}\" assertion failed\n  Headers: {:?}",
            self.headers
        );
        self
    }

    /// Assert the media type of `Content-Type`, ignoring parameters.
    pub fn assert_content_type(self, expected: &str) -> Self {
        let actual = self
            .header(CONTENT_TYPE.as_str())
            .map(|v| v.split(';').next().unwrap_or("").trim().to_string());
        assert_eq!(
            actual.as_deref(),
            Some(expected),
            "Content-Type assertion failed"
        );
        self
    }

    /// The `ETag` header, panicking if absent.
    pub fn etag(&self) -> String {
        self.header("etag")
            .unwrap_or_else(|| panic!("response has no ETag header"))
            .to_string()
    }

    // ── Body helpers ──

    /// Deserialize the entire response body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body)
            .unwrap_or_else(|e| panic!("Failed to parse JSON: {e}\nBody: {}", self.text()))
    }

    /// Deserialize the entire response body as YAML.
    pub fn yaml<T: DeserializeOwned>(&self) -> T {
        serde_yaml::from_slice(&self.body)
            .unwrap_or_else(|e| panic!("Failed to parse YAML: {e}\nBody: {}", self.text()))
    }

    /// Return the response body as a UTF-8 string.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }
}
