use axum::body::Body;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE, ETAG, IF_NONE_MATCH, VARY};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use std::sync::Arc;

use crate::builder::Document;
use crate::negotiate::{etag_matches, negotiate};
use crate::service::SpecService;

/// Build an `axum::Router` serving the spec at `spec_path` and, when
/// enabled, the docs page at `docs_path`.
pub fn openapi_routes<S>(service: Arc<SpecService>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let config = service.config();
    let spec_path = config.spec_path.clone();
    let docs = config
        .docs_ui
        .then(|| (config.docs_path.clone(), docs_html(&config.title, &spec_path)));

    let spec_service = service.clone();
    let mut router = Router::<S>::new().route(
        &spec_path,
        get(move |headers: HeaderMap| {
            let document = spec_service.current();
            async move { serve_spec(&document, &headers) }
        }),
    );

    if let Some((docs_path, html)) = docs {
        let html: Arc<str> = Arc::from(html);
        router = router.route(
            &docs_path,
            get(move || {
                let html = html.clone();
                async move { Html(html.to_string()).into_response() }
            }),
        );
    }

    router
}

/// Respond with the negotiated serialization, or 304 when the client
/// already holds it.
pub fn serve_spec(document: &Document, headers: &HeaderMap) -> Response {
    let accept = headers.get(axum::http::header::ACCEPT).and_then(|v| v.to_str().ok());
    let negotiated = negotiate(accept);
    let (body, etag) = document.rendered(negotiated.format);

    let not_modified = headers
        .get(IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|candidates| etag_matches(candidates, etag));

    let mut builder = Response::builder()
        .header(VARY, "Accept")
        .header(CACHE_CONTROL, "no-cache")
        .header(ETAG, etag);

    let response = if not_modified {
        tracing::debug!(format = ?negotiated.format, "spec not modified");
        builder = builder.status(StatusCode::NOT_MODIFIED);
        builder.body(Body::empty())
    } else {
        tracing::debug!(format = ?negotiated.format, bytes = body.len(), "serving spec");
        builder = builder
            .status(StatusCode::OK)
            .header(CONTENT_TYPE, HeaderValue::from_static(negotiated.content_type));
        builder.body(Body::from(body.clone()))
    };

    response.unwrap_or_else(|err| {
        tracing::warn!(error = %err, "failed to build spec response");
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    })
}

fn html_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// A JavaScript string literal, safe to inline in `<script>`.
fn js_string(input: &str) -> String {
    let quoted = serde_json::to_string(input).unwrap_or_else(|_| String::from("\"\""));
    quoted.replace('<', "\\u003c").replace('>', "\\u003e")
}

fn docs_html(title: &str, spec_path: &str) -> String {
    DOCS_HTML
        .replace("{{title}}", &html_escape(title))
        .replace("{{spec_url}}", &js_string(spec_path))
}

const DOCS_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{{title}}</title>
    <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js" crossorigin></script>
    <script>
        window.onload = () => {
            window.ui = SwaggerUIBundle({
                url: {{spec_url}},
                dom_id: "#swagger-ui",
            });
        };
    </script>
</body>
</html>"##;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_url_is_a_javascript_literal() {
        let html = docs_html("Pets", "/spec.json?a=1&b='x'</script>");
        assert!(html.contains(r#"url: "/spec.json?a=1&b='x'\u003c/script\u003e","#));
        assert!(html.contains(r##"dom_id: "#swagger-ui""##));
    }
}
