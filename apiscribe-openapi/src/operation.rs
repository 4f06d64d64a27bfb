use apiscribe_core::{
    BodyDescriptor, Example, ExampleValidation, OpenApiConfig, OperationDescriptor, ParamLocation,
    ParameterDescriptor, Primitive, ResponseDescriptor, StatusSelector, TypeDescriptor,
};
use http::StatusCode;
use serde_json::{json, Map, Value};
use std::collections::HashSet;

use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::error::SpecError;
use crate::examples::check_example;
use crate::schema::{ResolveContext, ResolveOptions, TypeSchemaResolver};

/// Media type picked for a body when none is declared.
///
/// Plain strings and dates go out as `text/plain`, raw bytes as
/// `application/octet-stream`, everything else as JSON.
pub fn infer_media_type(ty: &TypeDescriptor) -> &'static str {
    match ty.non_null() {
        TypeDescriptor::Primitive(Primitive::Binary | Primitive::Byte) => "application/octet-stream",
        TypeDescriptor::Primitive(
            Primitive::String | Primitive::Date | Primitive::DateTime | Primitive::Uuid,
        ) => "text/plain",
        _ => "application/json",
    }
}

/// Names between braces in a path template, in order. `{*rest}` yields `rest`.
pub fn path_template_params(path: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = path;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            break;
        };
        let name = after[..close].trim_start_matches('*');
        if !name.is_empty() {
            names.push(name);
        }
        rest = &after[close + 1..];
    }
    names
}

/// Turns one [`OperationDescriptor`] into an OpenAPI Operation object.
pub struct OperationBuilder<'a> {
    config: &'a OpenApiConfig,
    resolver: TypeSchemaResolver,
}

impl<'a> OperationBuilder<'a> {
    pub fn new(config: &'a OpenApiConfig) -> Self {
        Self {
            config,
            resolver: TypeSchemaResolver::new(ResolveOptions::from_config(config)),
        }
    }

    /// Build the Operation object, published under `id`. Every schema the
    /// operation touches is resolved through `ctx`, so named types land in
    /// its registry.
    pub fn build(
        &self,
        op: &OperationDescriptor,
        id: &str,
        ctx: &mut ResolveContext<'_>,
        diagnostics: &mut Diagnostics,
    ) -> Result<Value, SpecError> {
        ctx.framed(id.to_string(), |ctx| {
            self.build_inner(op, id, ctx, diagnostics)
        })
    }

    fn build_inner(
        &self,
        op: &OperationDescriptor,
        id: &str,
        ctx: &mut ResolveContext<'_>,
        diagnostics: &mut Diagnostics,
    ) -> Result<Value, SpecError> {
        let mut operation = Map::new();

        if !op.tags.is_empty() {
            operation.insert("tags".into(), json!(op.tags));
        }
        if let Some(ref summary) = op.summary {
            operation.insert("summary".into(), json!(summary));
        }
        if let Some(ref description) = op.description {
            operation.insert("description".into(), json!(description));
        }
        if let Some(ref docs) = op.external_docs {
            operation.insert("externalDocs".into(), serde_json::to_value(docs)?);
        }
        operation.insert("operationId".into(), json!(id));

        let parameters = self.parameters(op, id, ctx, diagnostics)?;
        if !parameters.is_empty() {
            operation.insert("parameters".into(), Value::Array(parameters));
        }

        if let Some(ref body) = op.request_body {
            let request_body =
                ctx.framed("request body", |ctx| self.request_body(body, id, ctx, diagnostics))?;
            operation.insert("requestBody".into(), request_body);
        }

        operation.insert("responses".into(), self.responses(op, id, ctx, diagnostics)?);

        if op.deprecated {
            operation.insert("deprecated".into(), json!(true));
        }

        if !op.security.is_empty() {
            let mut alternatives = Vec::with_capacity(op.security.len());
            for requirement in &op.security {
                if !self.config.security_schemes.contains_key(&requirement.scheme) {
                    diagnostics.push(Diagnostic::new(
                        DiagnosticKind::UnknownSecurityScheme,
                        id,
                        format!("security scheme `{}` is not defined", requirement.scheme),
                    ));
                }
                let mut alternative = Map::new();
                alternative.insert(requirement.scheme.clone(), json!(requirement.scopes));
                alternatives.push(Value::Object(alternative));
            }
            operation.insert("security".into(), Value::Array(alternatives));
        }

        Ok(Value::Object(operation))
    }

    // ── Parameters ──────────────────────────────────────────────────────

    fn parameters(
        &self,
        op: &OperationDescriptor,
        id: &str,
        ctx: &mut ResolveContext<'_>,
        diagnostics: &mut Diagnostics,
    ) -> Result<Vec<Value>, SpecError> {
        let mut seen: HashSet<(ParamLocation, String)> = HashSet::new();
        for param in &op.parameters {
            // Header names are case-insensitive on the wire.
            let name = match param.location {
                ParamLocation::Header => param.name.to_ascii_lowercase(),
                _ => param.name.clone(),
            };
            if !seen.insert((param.location, name)) {
                return Err(SpecError::DuplicateParameter {
                    operation_id: id.to_string(),
                    location: param.location,
                    name: param.name.clone(),
                });
            }
        }

        self.check_path_template(op, id, diagnostics);

        let mut ordered: Vec<&ParameterDescriptor> = op.parameters.iter().collect();
        ordered.sort_by_key(|p| p.location);

        let mut out = Vec::with_capacity(ordered.len());
        for param in ordered {
            let label = format!("{} parameter `{}`", param.location, param.name);
            out.push(ctx.framed(label, |ctx| self.parameter(param, id, ctx, diagnostics))?);
        }
        Ok(out)
    }

    fn parameter(
        &self,
        param: &ParameterDescriptor,
        id: &str,
        ctx: &mut ResolveContext<'_>,
        diagnostics: &mut Diagnostics,
    ) -> Result<Value, SpecError> {
        let required = if param.location == ParamLocation::Path {
            if !param.required {
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::OptionalPathParameter,
                    id,
                    format!("path parameter `{}` is declared optional; emitted as required", param.name),
                ));
            }
            true
        } else {
            param.required
        };

        let schema = self.resolver.resolve(&param.ty, ctx)?;

        let mut out = Map::new();
        out.insert("name".into(), json!(param.name));
        out.insert("in".into(), json!(param.location.as_str()));
        if let Some(ref description) = param.description {
            out.insert("description".into(), json!(description));
        }
        out.insert("required".into(), json!(required));
        if param.deprecated {
            out.insert("deprecated".into(), json!(true));
        }
        out.insert("schema".into(), schema);

        if let Some(ref example) = param.example {
            self.check(id, &format!("parameter `{}`", param.name), example, &param.ty, ctx, diagnostics)?;
            out.insert("example".into(), example.clone());
        }
        if !param.examples.is_empty() {
            for (name, example) in &param.examples {
                self.check(id, name, &example.value, &param.ty, ctx, diagnostics)?;
            }
            out.insert("examples".into(), examples_object(&param.examples));
        }
        Ok(Value::Object(out))
    }

    fn check_path_template(&self, op: &OperationDescriptor, id: &str, diagnostics: &mut Diagnostics) {
        let template = path_template_params(&op.path);
        let declared: Vec<&str> = op
            .parameters
            .iter()
            .filter(|p| p.location == ParamLocation::Path)
            .map(|p| p.name.as_str())
            .collect();

        for name in &template {
            if !declared.contains(name) {
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::UndeclaredPathParameter,
                    id,
                    format!("path `{}` uses `{{{name}}}` but declares no such path parameter", op.path),
                ));
            }
        }
        for name in declared {
            if !template.contains(&name) {
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::UnusedPathParameter,
                    id,
                    format!("path parameter `{name}` does not appear in `{}`", op.path),
                ));
            }
        }
    }

    // ── Bodies ──────────────────────────────────────────────────────────

    fn request_body(
        &self,
        body: &BodyDescriptor,
        id: &str,
        ctx: &mut ResolveContext<'_>,
        diagnostics: &mut Diagnostics,
    ) -> Result<Value, SpecError> {
        let mut out = Map::new();
        if let Some(ref description) = body.description {
            out.insert("description".into(), json!(description));
        }
        out.insert("content".into(), self.content(body, id, ctx, diagnostics)?);
        out.insert("required".into(), json!(body.required));
        Ok(Value::Object(out))
    }

    fn content(
        &self,
        body: &BodyDescriptor,
        id: &str,
        ctx: &mut ResolveContext<'_>,
        diagnostics: &mut Diagnostics,
    ) -> Result<Value, SpecError> {
        let schema = self.resolver.resolve(&body.ty, ctx)?;

        for (name, example) in &body.examples {
            self.check(id, name, &example.value, &body.ty, ctx, diagnostics)?;
        }

        let media_types: Vec<&str> = if body.media_types.is_empty() {
            vec![infer_media_type(&body.ty)]
        } else {
            body.media_types.iter().map(String::as_str).collect()
        };

        let mut content = Map::new();
        for media_type in media_types {
            let mut entry = Map::new();
            entry.insert("schema".into(), schema.clone());
            if !body.examples.is_empty() {
                entry.insert("examples".into(), examples_object(&body.examples));
            }
            content.insert(media_type.to_string(), Value::Object(entry));
        }
        Ok(Value::Object(content))
    }

    // ── Responses ───────────────────────────────────────────────────────

    fn responses(
        &self,
        op: &OperationDescriptor,
        id: &str,
        ctx: &mut ResolveContext<'_>,
        diagnostics: &mut Diagnostics,
    ) -> Result<Value, SpecError> {
        let mut seen = HashSet::new();
        for response in &op.responses {
            if !response.status.is_valid() {
                return Err(SpecError::InvalidResponseCode {
                    operation_id: id.to_string(),
                    selector: response.status.key(),
                });
            }
            if !seen.insert(response.status) {
                return Err(SpecError::DuplicateResponse {
                    operation_id: id.to_string(),
                    selector: response.status,
                });
            }
        }

        if op.responses.is_empty() {
            return Ok(json!({ "200": { "description": "Successful response" } }));
        }

        let mut ordered: Vec<&ResponseDescriptor> = op.responses.iter().collect();
        ordered.sort_by_key(|r| r.status);

        let mut out = Map::new();
        for response in ordered {
            let key = response.status.key();
            let value = ctx.framed(format!("response {key}"), |ctx| {
                self.response(response, id, ctx, diagnostics)
            })?;
            out.insert(key, value);
        }
        Ok(Value::Object(out))
    }

    fn response(
        &self,
        response: &ResponseDescriptor,
        id: &str,
        ctx: &mut ResolveContext<'_>,
        diagnostics: &mut Diagnostics,
    ) -> Result<Value, SpecError> {
        let mut out = Map::new();
        let description = response
            .description
            .clone()
            .unwrap_or_else(|| default_description(response.status).to_string());
        out.insert("description".into(), json!(description));

        if !response.headers.is_empty() {
            let mut headers = Map::new();
            for header in &response.headers {
                let schema = ctx.framed(format!("header `{}`", header.name), |ctx| {
                    self.resolver.resolve(&header.ty, ctx)
                })?;
                let mut entry = Map::new();
                if let Some(ref description) = header.description {
                    entry.insert("description".into(), json!(description));
                }
                if header.required {
                    entry.insert("required".into(), json!(true));
                }
                entry.insert("schema".into(), schema);
                headers.insert(header.name.clone(), Value::Object(entry));
            }
            out.insert("headers".into(), Value::Object(headers));
        }

        if let Some(ref body) = response.body {
            out.insert("content".into(), self.content(body, id, ctx, diagnostics)?);
        }
        Ok(Value::Object(out))
    }

    // ── Examples ────────────────────────────────────────────────────────

    fn check(
        &self,
        id: &str,
        example: &str,
        value: &Value,
        ty: &TypeDescriptor,
        ctx: &ResolveContext<'_>,
        diagnostics: &mut Diagnostics,
    ) -> Result<(), SpecError> {
        if self.config.example_validation == ExampleValidation::Off {
            return Ok(());
        }
        let Err(err) = check_example(value, ty, ctx.catalog()) else {
            return Ok(());
        };
        match self.config.example_validation {
            ExampleValidation::Strict => Err(SpecError::ExampleMismatch {
                operation_id: id.to_string(),
                example: example.to_string(),
                reason: err.to_string(),
            }),
            _ => {
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::ExampleMismatch,
                    id,
                    format!("example `{example}` does not match its schema: {err}"),
                ));
                Ok(())
            }
        }
    }
}

fn examples_object(examples: &[(String, Example)]) -> Value {
    let mut out = Map::new();
    for (name, example) in examples {
        let mut entry = Map::new();
        if let Some(ref summary) = example.summary {
            entry.insert("summary".into(), json!(summary));
        }
        if let Some(ref description) = example.description {
            entry.insert("description".into(), json!(description));
        }
        entry.insert("value".into(), example.value.clone());
        out.insert(name.clone(), Value::Object(entry));
    }
    Value::Object(out)
}

fn default_description(status: StatusSelector) -> &'static str {
    match status {
        StatusSelector::Default => "Default response",
        StatusSelector::Code(code) => StatusCode::from_u16(code)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Response"),
    }
}
