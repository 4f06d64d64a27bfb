use apiscribe_core::{
    OpenApiConfig, OpenApiVersion, OperationDescriptor, RouteTable, SecurityRequirement,
    TypeDescriptor,
};
use arc_swap::ArcSwapOption;
use bytes::Bytes;
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::SpecError;
use crate::negotiate::SpecFormat;
use crate::operation::{path_template_params, OperationBuilder};
use crate::schema::{ResolveContext, TypeCatalog};

/// An assembled OpenAPI document, pre-rendered in both serializations.
///
/// Immutable once built. A reload builds a new one instead of patching.
#[derive(Debug)]
pub struct Document {
    value: Value,
    diagnostics: Vec<Diagnostic>,
    json: Bytes,
    json_etag: String,
    yaml: Bytes,
    yaml_etag: String,
}

impl Document {
    fn render(value: Value, diagnostics: Vec<Diagnostic>, pretty: bool) -> Result<Self, SpecError> {
        let json = if pretty {
            serde_json::to_vec_pretty(&value)?
        } else {
            serde_json::to_vec(&value)?
        };
        let yaml = serde_yaml::to_string(&value)?.into_bytes();
        Ok(Self {
            json_etag: entity_tag(&json),
            yaml_etag: entity_tag(&yaml),
            json: Bytes::from(json),
            yaml: Bytes::from(yaml),
            value,
            diagnostics,
        })
    }

    /// The document as a JSON value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Non-fatal findings collected while assembling.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn json(&self) -> &Bytes {
        &self.json
    }

    pub fn yaml(&self) -> &Bytes {
        &self.yaml
    }

    /// Serialized bytes and quoted entity tag for one format.
    pub fn rendered(&self, format: SpecFormat) -> (&Bytes, &str) {
        match format {
            SpecFormat::Json => (&self.json, &self.json_etag),
            SpecFormat::Yaml => (&self.yaml, &self.yaml_etag),
        }
    }

    pub fn etag(&self, format: SpecFormat) -> &str {
        self.rendered(format).1
    }

    /// Schema of a component, by name.
    pub fn component(&self, name: &str) -> Option<&Value> {
        self.value.pointer(&format!("/components/schemas/{name}"))
    }

    /// Operation object for `method` (any case) at `path`.
    pub fn operation(&self, method: &str, path: &str) -> Option<&Value> {
        self.value
            .get("paths")?
            .get(path)?
            .get(method.to_ascii_lowercase())
    }
}

/// Strong entity tag: quoted lowercase hex SHA-256 of the bytes.
fn entity_tag(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut tag = String::with_capacity(digest.len() * 2 + 2);
    tag.push('"');
    for b in digest.iter() {
        tag.push_str(&format!("{b:02x}"));
    }
    tag.push('"');
    tag
}

/// `/pets/{id}` and `/pets/{petId}` denote the same route.
fn normalize_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut in_param = false;
    for c in path.chars() {
        match c {
            '{' => {
                in_param = true;
                out.push_str("{}");
            }
            '}' => in_param = false,
            _ if in_param => {}
            _ => out.push(c),
        }
    }
    out
}

/// Published operationIds, index-aligned with `visible`.
///
/// Declared ids must be unique. Derived ids never fail: a repeat takes a
/// `_2`, `_3`, ... suffix in registration order, skipping declared ids.
fn assign_operation_ids(visible: &[&OperationDescriptor]) -> Result<Vec<String>, SpecError> {
    let mut taken: HashSet<String> = HashSet::new();
    for op in visible {
        if let Some(ref id) = op.operation_id {
            if !taken.insert(id.clone()) {
                return Err(SpecError::DuplicateOperationId(id.clone()));
            }
        }
    }

    let mut ids = Vec::with_capacity(visible.len());
    for op in visible {
        if let Some(ref id) = op.operation_id {
            ids.push(id.clone());
            continue;
        }
        let base = op.effective_id();
        let mut candidate = base.clone();
        let mut n = 2;
        while !taken.insert(candidate.clone()) {
            candidate = format!("{base}_{n}");
            n += 1;
        }
        ids.push(candidate);
    }
    Ok(ids)
}

/// An operation filed under another template of the same route gets its
/// path parameters renamed to that template's names, matched by position.
fn rename_path_parameters(operation: &mut Value, path: &str, template: &str) {
    let renames: Vec<(&str, &str)> = path_template_params(path)
        .into_iter()
        .zip(path_template_params(template))
        .filter(|(from, to)| from != to)
        .collect();
    let Some(params) = operation.get_mut("parameters").and_then(Value::as_array_mut) else {
        return;
    };
    for param in params {
        if param.get("in").and_then(Value::as_str) != Some("path") {
            continue;
        }
        let Some(name) = param.get("name").and_then(Value::as_str).map(str::to_owned) else {
            continue;
        };
        if let Some((_, to)) = renames.iter().find(|(from, _)| *from == name) {
            param["name"] = json!(to);
        }
    }
}

fn operation_types(op: &OperationDescriptor) -> impl Iterator<Item = &TypeDescriptor> {
    op.parameters
        .iter()
        .map(|p| &p.ty)
        .chain(op.request_body.iter().map(|b| &b.ty))
        .chain(op.responses.iter().flat_map(|r| {
            r.body
                .iter()
                .map(|b| &b.ty)
                .chain(r.headers.iter().map(|h| &h.ty))
        }))
}

fn security_value(requirements: &[SecurityRequirement]) -> Value {
    let alternatives = requirements
        .iter()
        .map(|r| {
            let mut entry = Map::new();
            entry.insert(r.scheme.clone(), json!(r.scopes));
            Value::Object(entry)
        })
        .collect();
    Value::Array(alternatives)
}

fn info_value(config: &OpenApiConfig) -> Result<Value, SpecError> {
    let mut info = Map::new();
    info.insert("title".into(), json!(config.title));
    if let Some(ref description) = config.description {
        info.insert("description".into(), json!(description));
    }
    if let Some(ref terms) = config.terms_of_service {
        info.insert("termsOfService".into(), json!(terms));
    }
    if let Some(ref contact) = config.contact {
        info.insert("contact".into(), serde_json::to_value(contact)?);
    }
    if let Some(ref license) = config.license {
        let mut license = license.clone();
        // `identifier` only exists from 3.1 on.
        if config.openapi_version == OpenApiVersion::V3_0 {
            license.identifier = None;
        }
        info.insert("license".into(), serde_json::to_value(license)?);
    }
    info.insert("version".into(), json!(config.version));
    Ok(Value::Object(info))
}

/// Build a complete document from global settings and the route tree.
///
/// Hidden operations are skipped. Fails on the first fatal problem; no
/// partial document is ever produced.
pub fn assemble(config: &OpenApiConfig, operations: &[OperationDescriptor]) -> Result<Document, SpecError> {
    let visible: Vec<&OperationDescriptor> = operations.iter().filter(|op| !op.hidden).collect();

    let mut routes = HashSet::new();
    for op in &visible {
        if !routes.insert((normalize_path(&op.path), op.method.clone())) {
            return Err(SpecError::DuplicateOperation {
                method: op.method.to_string(),
                path: op.path.clone(),
            });
        }
    }
    let ids = assign_operation_ids(&visible)?;

    let catalog = TypeCatalog::collect(visible.iter().flat_map(|op| operation_types(op)));
    let mut ctx = ResolveContext::new(&catalog);
    let mut diagnostics = Diagnostics::new();
    let builder = OperationBuilder::new(config);

    let mut paths = Map::new();
    let mut templates: HashMap<String, &str> = HashMap::new();
    let mut op_tags: Vec<&str> = Vec::new();
    for (op, id) in visible.iter().zip(&ids) {
        let mut operation = builder.build(op, id, &mut ctx, &mut diagnostics)?;
        let template = *templates
            .entry(normalize_path(&op.path))
            .or_insert(op.path.as_str());
        if template != op.path {
            tracing::debug!(path = %op.path, template, "filing operation under first-seen template");
            rename_path_parameters(&mut operation, &op.path, template);
        }
        let item = paths
            .entry(template.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Some(item) = item.as_object_mut() {
            item.insert(op.method.as_str().to_ascii_lowercase(), operation);
        }
        for tag in &op.tags {
            if !op_tags.contains(&tag.as_str()) {
                op_tags.push(tag);
            }
        }
    }

    let mut tags: Vec<Value> = Vec::new();
    let mut tag_names: HashSet<&str> = HashSet::new();
    for tag in &config.tags {
        if tag_names.insert(&tag.name) {
            tags.push(serde_json::to_value(tag)?);
        }
    }
    for tag in op_tags {
        if tag_names.insert(tag) {
            tags.push(json!({ "name": tag }));
        }
    }

    let registry = ctx.into_registry();
    let component_count = registry.len();
    let schemas = registry.into_schemas();

    let mut document = Map::new();
    document.insert("openapi".into(), json!(config.openapi_version.as_str()));
    document.insert("info".into(), info_value(config)?);
    if !config.servers.is_empty() {
        document.insert("servers".into(), serde_json::to_value(&config.servers)?);
    }
    if !tags.is_empty() {
        document.insert("tags".into(), Value::Array(tags));
    }
    let path_count = paths.len();
    document.insert("paths".into(), Value::Object(paths));

    let mut components = Map::new();
    if !schemas.is_empty() {
        components.insert("schemas".into(), Value::Object(schemas));
    }
    if !config.security_schemes.is_empty() {
        components.insert(
            "securitySchemes".into(),
            serde_json::to_value(&config.security_schemes)?,
        );
    }
    if !components.is_empty() {
        document.insert("components".into(), Value::Object(components));
    }
    if !config.security.is_empty() {
        document.insert("security".into(), security_value(&config.security));
    }

    let diagnostics = diagnostics.into_vec();
    tracing::info!(
        operations = visible.len(),
        paths = path_count,
        components = component_count,
        diagnostics = diagnostics.len(),
        version = config.openapi_version.as_str(),
        "OpenAPI document assembled"
    );

    Document::render(Value::Object(document), diagnostics, config.pretty)
}

/// Owns the route tree and memoizes the assembled document.
///
/// The memo is dropped only by [`routes_changed`](Self::routes_changed) or
/// by changing the routes; serving requests never invalidates it.
pub struct DocumentAssembler {
    config: OpenApiConfig,
    routes: RouteTable,
    cached: ArcSwapOption<Document>,
}

impl DocumentAssembler {
    pub fn new(config: OpenApiConfig) -> Self {
        Self::with_routes(config, RouteTable::new())
    }

    pub fn with_routes(config: OpenApiConfig, routes: RouteTable) -> Self {
        Self {
            config,
            routes,
            cached: ArcSwapOption::empty(),
        }
    }

    pub fn config(&self) -> &OpenApiConfig {
        &self.config
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Add one documented route. Taking `&mut self` keeps registration out
    /// of any window where the document is being read.
    pub fn register_operation(&mut self, operation: OperationDescriptor) {
        self.routes.register_operation(operation);
        self.cached.store(None);
    }

    /// Swap in a new route tree, returning the old one.
    pub fn replace_routes(&mut self, routes: RouteTable) -> RouteTable {
        self.cached.store(None);
        std::mem::replace(&mut self.routes, routes)
    }

    /// Forget the memoized document; the next [`document`](Self::document)
    /// call assembles afresh.
    pub fn routes_changed(&self) {
        tracing::debug!("route tree changed, dropping cached document");
        self.cached.store(None);
    }

    pub fn is_cached(&self) -> bool {
        self.cached.load().is_some()
    }

    /// The memoized document, assembling it on first use.
    pub fn document(&self) -> Result<Arc<Document>, SpecError> {
        if let Some(document) = self.cached.load_full() {
            return Ok(document);
        }
        let document = Arc::new(self.assemble()?);
        self.cached.store(Some(document.clone()));
        Ok(document)
    }

    /// Assemble without touching the memo.
    pub fn assemble(&self) -> Result<Document, SpecError> {
        assemble(&self.config, self.routes.operations())
    }
}
