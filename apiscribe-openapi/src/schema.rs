//! Type-driven JSON Schema derivation.
//!
//! [`TypeSchemaResolver`] maps a [`TypeDescriptor`] to a schema fragment.
//! Named objects, enums and unions are interned as components and come back
//! as `$ref`s; everything else is inlined.

use apiscribe_core::{
    EnumType, Field, NamedRef, ObjectType, OpenApiConfig, OpenApiVersion, Primitive,
    TypeDescriptor, TypeName, UnionType,
};
use serde_json::{json, Map, Value};
use std::collections::{HashMap, HashSet};

use crate::error::SpecError;
use crate::registry::{ComponentRegistry, Slot, SCHEMA_REF_PREFIX};

/// Knobs that change how schemas are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    pub version: OpenApiVersion,
    pub explicit_nullable: bool,
}

impl ResolveOptions {
    pub fn from_config(config: &OpenApiConfig) -> Self {
        Self {
            version: config.openapi_version,
            explicit_nullable: config.explicit_nullable,
        }
    }
}

/// Named type definitions reachable from a set of descriptors, by identity key.
///
/// Lets a bare [`TypeDescriptor::named_ref`] resolve no matter where the
/// definition appears in the route tree. The first definition seen for a key
/// wins.
#[derive(Debug, Default)]
pub struct TypeCatalog {
    types: HashMap<String, TypeDescriptor>,
    followed: HashSet<String>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collect<'a>(roots: impl IntoIterator<Item = &'a TypeDescriptor>) -> Self {
        let mut catalog = Self::new();
        for root in roots {
            catalog.add(root);
        }
        catalog
    }

    /// Record every named definition inside `ty`.
    pub fn add(&mut self, ty: &TypeDescriptor) {
        match ty {
            TypeDescriptor::Primitive(_) | TypeDescriptor::Generic(_) => {}
            TypeDescriptor::Array { items, .. } => self.add(items),
            TypeDescriptor::Map { key, value } => {
                self.add(key);
                self.add(value);
            }
            TypeDescriptor::Nullable(inner) => self.add(inner),
            TypeDescriptor::Object(object) => {
                if let Some(ref name) = object.name {
                    if !self.define(name, ty) {
                        return;
                    }
                }
                for field in &object.fields {
                    self.add(&field.ty);
                }
            }
            TypeDescriptor::Enum(e) => {
                if let Some(ref name) = e.name {
                    self.define(name, ty);
                }
            }
            TypeDescriptor::Union(union) => {
                if let Some(ref name) = union.name {
                    if !self.define(name, ty) {
                        return;
                    }
                }
                for variant in &union.variants {
                    self.add(&variant.ty);
                }
            }
            TypeDescriptor::Reference(NamedRef { name, target }) => {
                if self.types.contains_key(&name.key) || !self.followed.insert(name.key.clone()) {
                    return;
                }
                if let Some(target) = target {
                    self.add(&target());
                }
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&TypeDescriptor> {
        self.types.get(key)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Returns false when the key was already defined.
    fn define(&mut self, name: &TypeName, ty: &TypeDescriptor) -> bool {
        if self.types.contains_key(&name.key) {
            return false;
        }
        self.types.insert(name.key.clone(), ty.clone());
        true
    }
}

/// Mutable state of one resolution pass: the registry being filled, the
/// identities currently being resolved, and a breadcrumb trail for errors.
#[derive(Debug)]
pub struct ResolveContext<'c> {
    registry: ComponentRegistry,
    catalog: &'c TypeCatalog,
    in_progress: Vec<String>,
    chain: Vec<String>,
}

impl<'c> ResolveContext<'c> {
    pub fn new(catalog: &'c TypeCatalog) -> Self {
        Self {
            registry: ComponentRegistry::new(),
            catalog,
            in_progress: Vec::new(),
            chain: Vec::new(),
        }
    }

    pub fn catalog(&self) -> &'c TypeCatalog {
        self.catalog
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub fn into_registry(self) -> ComponentRegistry {
        self.registry
    }

    /// Enter a named location (operation, body, field...) for error reporting.
    pub fn push_frame(&mut self, label: impl Into<String>) {
        self.chain.push(label.into());
    }

    pub fn pop_frame(&mut self) {
        self.chain.pop();
    }

    /// Run `f` inside a breadcrumb frame.
    pub fn framed<T>(
        &mut self,
        label: impl Into<String>,
        f: impl FnOnce(&mut Self) -> Result<T, SpecError>,
    ) -> Result<T, SpecError> {
        self.push_frame(label);
        let result = f(self);
        self.pop_frame();
        result
    }

    pub fn error(&self, ty: &TypeDescriptor, reason: impl Into<String>) -> SpecError {
        SpecError::SchemaResolution {
            type_name: ty.to_string(),
            chain: self.chain.clone(),
            reason: reason.into(),
        }
    }
}

/// Maps type descriptors to JSON Schema fragments.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeSchemaResolver {
    options: ResolveOptions,
}

impl TypeSchemaResolver {
    pub fn new(options: ResolveOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> ResolveOptions {
        self.options
    }

    /// Resolve `ty` to a schema, interning named types into the context's registry.
    pub fn resolve(&self, ty: &TypeDescriptor, ctx: &mut ResolveContext<'_>) -> Result<Value, SpecError> {
        match ty {
            TypeDescriptor::Primitive(p) => Ok(primitive_schema(*p)),
            TypeDescriptor::Nullable(inner) => {
                let schema = self.resolve(inner, ctx)?;
                if self.options.explicit_nullable {
                    Ok(self.mark_nullable(schema))
                } else {
                    Ok(schema)
                }
            }
            TypeDescriptor::Array { items, unique } => {
                let items = ctx.framed("items", |ctx| self.resolve(items, ctx))?;
                let mut schema = json!({ "type": "array", "items": items });
                if *unique {
                    schema["uniqueItems"] = json!(true);
                }
                Ok(schema)
            }
            TypeDescriptor::Map { key, value } => {
                if !is_valid_map_key(key) {
                    return Err(ctx.error(
                        ty,
                        format!("map keys must be strings, numbers or enums, got `{key}`"),
                    ));
                }
                let value = ctx.framed("values", |ctx| self.resolve(value, ctx))?;
                Ok(json!({ "type": "object", "additionalProperties": value }))
            }
            TypeDescriptor::Enum(e) => self.resolve_enum(ty, e, ctx),
            TypeDescriptor::Object(object) => self.resolve_object(ty, object, ctx),
            TypeDescriptor::Union(union) => self.resolve_union(ty, union, ctx),
            TypeDescriptor::Reference(reference) => self.resolve_reference(ty, reference, ctx),
            TypeDescriptor::Generic(param) => {
                Err(ctx.error(ty, format!("unbound generic parameter `{param}`")))
            }
        }
    }

    /// Intern a named type, or return its `$ref` if it is already known or
    /// currently being resolved further up the stack.
    fn resolve_named<'c, F>(&self, name: &TypeName, ctx: &mut ResolveContext<'c>, build: F) -> Result<Value, SpecError>
    where
        F: FnOnce(&mut ResolveContext<'c>) -> Result<Value, SpecError>,
    {
        if ctx.in_progress.contains(&name.key) {
            if let Some(found) = ctx.registry.lookup(&name.key) {
                tracing::trace!(component = %found.name, "cyclic reference");
                return Ok(found.reference());
            }
        }

        match ctx.registry.reserve(&name.key, &name.name) {
            Slot::Existing(found) => Ok(found.reference()),
            Slot::Reserved(reserved) => {
                ctx.in_progress.push(name.key.clone());
                ctx.push_frame(name.name.clone());
                let built = build(ctx);
                ctx.pop_frame();
                ctx.in_progress.pop();
                let schema = built?;
                Ok(ctx.registry.fulfil(reserved, schema).reference())
            }
        }
    }

    fn resolve_object(
        &self,
        ty: &TypeDescriptor,
        object: &ObjectType,
        ctx: &mut ResolveContext<'_>,
    ) -> Result<Value, SpecError> {
        match object.name {
            Some(ref name) => self.resolve_named(name, ctx, |ctx| self.object_body(ty, object, ctx)),
            None => self.object_body(ty, object, ctx),
        }
    }

    fn object_body(
        &self,
        ty: &TypeDescriptor,
        object: &ObjectType,
        ctx: &mut ResolveContext<'_>,
    ) -> Result<Value, SpecError> {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for field in &object.fields {
            if properties.contains_key(&field.name) {
                return Err(ctx.error(ty, format!("field `{}` is declared twice", field.name)));
            }
            let schema = ctx.framed(field.name.clone(), |ctx| self.resolve(&field.ty, ctx))?;
            properties.insert(field.name.clone(), self.annotate_field(schema, field));
            if field.is_required() {
                required.push(Value::String(field.name.clone()));
            }
        }

        let mut schema = Map::new();
        schema.insert("type".into(), json!("object"));
        if let Some(ref description) = object.description {
            schema.insert("description".into(), json!(description));
        }
        if !properties.is_empty() {
            schema.insert("properties".into(), Value::Object(properties));
        }
        if !required.is_empty() {
            schema.insert("required".into(), Value::Array(required));
        }
        Ok(Value::Object(schema))
    }

    fn resolve_enum(
        &self,
        ty: &TypeDescriptor,
        e: &EnumType,
        ctx: &mut ResolveContext<'_>,
    ) -> Result<Value, SpecError> {
        if e.values.is_empty() {
            return Err(ctx.error(ty, "enum declares no values"));
        }
        let mut body = json!({ "type": "string", "enum": e.values });
        if let Some(ref description) = e.description {
            body["description"] = json!(description);
        }
        match e.name {
            Some(ref name) => self.resolve_named(name, ctx, |_| Ok(body)),
            None => Ok(body),
        }
    }

    fn resolve_union<'c>(
        &self,
        ty: &TypeDescriptor,
        union: &UnionType,
        ctx: &mut ResolveContext<'c>,
    ) -> Result<Value, SpecError> {
        if union.variants.is_empty() {
            return Err(ctx.error(ty, "polymorphic type declares no variants"));
        }
        if union.discriminator.trim().is_empty() {
            return Err(ctx.error(ty, "polymorphic type needs a discriminator field name"));
        }

        let build = |ctx: &mut ResolveContext<'c>| -> Result<Value, SpecError> {
            let mut one_of = Vec::with_capacity(union.variants.len());
            let mut mapping = Map::new();
            for variant in &union.variants {
                if mapping.contains_key(&variant.tag) {
                    return Err(ctx.error(ty, format!("variant tag `{}` is used twice", variant.tag)));
                }
                if variant.ty.type_name().is_none() {
                    return Err(ctx.error(
                        ty,
                        format!("variant `{}` must be a named type to be registered as a component", variant.tag),
                    ));
                }
                let schema = ctx.framed(format!("variant `{}`", variant.tag), |ctx| {
                    self.resolve(&variant.ty, ctx)
                })?;
                let target = match schema.get("$ref").and_then(Value::as_str) {
                    Some(target) => target.to_string(),
                    None => {
                        return Err(ctx.error(
                            ty,
                            format!("variant `{}` did not resolve to a component", variant.tag),
                        ))
                    }
                };
                mapping.insert(variant.tag.clone(), json!(target));
                one_of.push(schema);
            }

            let mut body = json!({
                "oneOf": one_of,
                "discriminator": {
                    "propertyName": union.discriminator,
                    "mapping": mapping,
                }
            });
            if let Some(ref description) = union.description {
                body["description"] = json!(description);
            }
            Ok(body)
        };

        match union.name {
            Some(ref name) => self.resolve_named(name, ctx, build),
            None => build(ctx),
        }
    }

    fn resolve_reference(
        &self,
        ty: &TypeDescriptor,
        reference: &NamedRef,
        ctx: &mut ResolveContext<'_>,
    ) -> Result<Value, SpecError> {
        if let Some(found) = ctx.registry.lookup(&reference.name.key) {
            return Ok(found.reference());
        }

        let definition = match reference.target {
            Some(target) => target(),
            None => match ctx.catalog.get(&reference.name.key) {
                Some(definition) => definition.clone(),
                None => {
                    return Err(ctx.error(
                        ty,
                        "reference to a named type with no reachable definition",
                    ))
                }
            },
        };

        match definition.type_name() {
            Some(name) if name.key == reference.name.key && !matches!(definition, TypeDescriptor::Reference(_)) => {
                self.resolve(&definition, ctx)
            }
            Some(name) => Err(ctx.error(
                ty,
                format!("reference target has identity `{}`, expected `{}`", name.key, reference.name.key),
            )),
            None => Err(ctx.error(ty, "reference target is not a named type")),
        }
    }

    /// Attach field-level metadata. OpenAPI 3.0 ignores siblings of `$ref`,
    /// so there the reference is wrapped in `allOf` first.
    fn annotate_field(&self, schema: Value, field: &Field) -> Value {
        if field.description.is_none() && field.default.is_none() && !field.deprecated {
            return schema;
        }
        let mut schema = if schema.get("$ref").is_some() && self.options.version == OpenApiVersion::V3_0 {
            json!({ "allOf": [schema] })
        } else {
            schema
        };
        if let Some(obj) = schema.as_object_mut() {
            if let Some(ref description) = field.description {
                obj.insert("description".into(), json!(description));
            }
            if let Some(ref default) = field.default {
                obj.insert("default".into(), default.clone());
            }
            if field.deprecated {
                obj.insert("deprecated".into(), json!(true));
            }
        }
        schema
    }

    /// Explicit nullable marker in the form the target revision expects.
    fn mark_nullable(&self, schema: Value) -> Value {
        let is_ref = schema.get("$ref").is_some();
        match self.options.version {
            OpenApiVersion::V3_0 => {
                if is_ref {
                    return json!({ "allOf": [schema], "nullable": true });
                }
                let mut schema = schema;
                if let Some(obj) = schema.as_object_mut() {
                    obj.insert("nullable".into(), json!(true));
                }
                schema
            }
            OpenApiVersion::V3_1 => {
                if schema.as_object().is_some_and(Map::is_empty) {
                    return schema;
                }
                if let (false, Some(Value::String(t))) = (is_ref, schema.get("type").cloned()) {
                    let mut schema = schema;
                    schema["type"] = json!([t, "null"]);
                    if let Some(Value::Array(values)) = schema.get_mut("enum") {
                        values.push(Value::Null);
                    }
                    return schema;
                }
                json!({ "anyOf": [schema, { "type": "null" }] })
            }
        }
    }
}

fn is_valid_map_key(key: &TypeDescriptor) -> bool {
    match key {
        TypeDescriptor::Primitive(p) => {
            !matches!(p, Primitive::Any | Primitive::Binary | Primitive::Byte)
        }
        TypeDescriptor::Enum(_) | TypeDescriptor::Reference(_) => true,
        _ => false,
    }
}

/// Scalar schema with format hint.
pub fn primitive_schema(primitive: Primitive) -> Value {
    match primitive {
        Primitive::Boolean => json!({ "type": "boolean" }),
        Primitive::Int32 => json!({ "type": "integer", "format": "int32" }),
        Primitive::Int64 => json!({ "type": "integer", "format": "int64" }),
        Primitive::UInt32 => json!({ "type": "integer", "format": "uint32", "minimum": 0 }),
        Primitive::UInt64 => json!({ "type": "integer", "format": "uint64", "minimum": 0 }),
        Primitive::Float => json!({ "type": "number", "format": "float" }),
        Primitive::Double => json!({ "type": "number", "format": "double" }),
        Primitive::String => json!({ "type": "string" }),
        Primitive::Date => json!({ "type": "string", "format": "date" }),
        Primitive::DateTime => json!({ "type": "string", "format": "date-time" }),
        Primitive::Uuid => json!({ "type": "string", "format": "uuid" }),
        Primitive::Byte => json!({ "type": "string", "format": "byte" }),
        Primitive::Binary => json!({ "type": "string", "format": "binary" }),
        Primitive::Any => json!({}),
    }
}

/// Component name behind a `$ref` schema, if it is one.
pub fn referenced_component(schema: &Value) -> Option<&str> {
    schema
        .get("$ref")
        .and_then(Value::as_str)
        .and_then(|r| r.strip_prefix(SCHEMA_REF_PREFIX))
}

/// Resolve a single descriptor in isolation, returning the root schema and
/// the components it produced.
pub fn resolve_standalone(
    ty: &TypeDescriptor,
    options: ResolveOptions,
) -> Result<(Value, Map<String, Value>), SpecError> {
    let catalog = TypeCatalog::collect([ty]);
    let mut ctx = ResolveContext::new(&catalog);
    let schema = TypeSchemaResolver::new(options).resolve(ty, &mut ctx)?;
    Ok((schema, ctx.into_registry().into_schemas()))
}
