use apiscribe_core::{
    BodyDescriptor, Describe, EnumType, Example, Field, ObjectType, OperationDescriptor,
    ParamLocation, ParameterDescriptor, ResponseDescriptor, RouteTable, StatusSelector,
    TypeDescriptor, TypeName, UnionType,
};
use http::{Method, StatusCode};
use serde_json::json;
use std::collections::HashMap;

struct Pet;
struct Cat;

// ── Types ───────────────────────────────────────────────────────────────────

#[test]
fn test_named_object_identity() {
    let a = ObjectType::named::<Pet>("Pet").build();
    let b = ObjectType::named::<Pet>("Animal").build();
    assert_eq!(a.type_name().unwrap().key, b.type_name().unwrap().key);
    assert_ne!(a.type_name().unwrap().key, ObjectType::named::<Cat>("Pet").build().type_name().unwrap().key);
    assert!(ObjectType::anonymous().build().type_name().is_none());
}

#[test]
fn test_field_requiredness() {
    assert!(Field::new("id", i64::describe()).is_required());
    assert!(!Field::new("id", i64::describe()).optional().is_required());
    assert!(!Field::new("tag", Option::<String>::describe()).is_required());
    assert!(!Field::new("limit", i32::describe()).with_default(10).is_required());
}

#[test]
fn test_nullable_does_not_nest() {
    let once = TypeDescriptor::nullable(TypeDescriptor::string());
    let twice = TypeDescriptor::nullable(once.clone());
    assert_eq!(once, twice);
    assert_eq!(twice.non_null(), &TypeDescriptor::string());
}

#[test]
fn test_maps_describe_keys() {
    assert_eq!(
        HashMap::<String, i64>::describe(),
        TypeDescriptor::map(TypeDescriptor::int64())
    );
    assert_eq!(
        HashMap::<u32, bool>::describe(),
        TypeDescriptor::map_with_key(u32::describe(), TypeDescriptor::boolean())
    );
}

#[test]
fn test_display() {
    let ty = TypeDescriptor::array(TypeDescriptor::nullable(ObjectType::named::<Pet>("Pet").build()));
    assert_eq!(ty.to_string(), "array<Pet?>");
    assert_eq!(TypeDescriptor::generic("T").to_string(), "T");
    assert_eq!(
        TypeDescriptor::map(EnumType::anonymous(["a"])).to_string(),
        "map<string, enum>"
    );
}

#[test]
fn test_reference_equality_ignores_target() {
    let name = TypeName::of::<Pet>("Pet");
    let bare = TypeDescriptor::named_ref(name);
    let deferred = TypeDescriptor::recursive::<Pet>("Pet");
    assert_eq!(bare, deferred);
}

impl Describe for Pet {
    fn describe() -> TypeDescriptor {
        ObjectType::named::<Pet>("Pet").field("id", i64::describe()).build()
    }
}

#[test]
fn test_union_builder_keeps_variant_order() {
    let ty = UnionType::named::<Cat>("Shape", "kind")
        .variant("b", i32::describe())
        .variant("a", i32::describe())
        .build();
    let TypeDescriptor::Union(union) = ty else {
        panic!("expected a union");
    };
    assert_eq!(union.discriminator, "kind");
    let tags: Vec<&str> = union.variants.iter().map(|v| v.tag.as_str()).collect();
    assert_eq!(tags, ["b", "a"]);
}

// ── Operations ──────────────────────────────────────────────────────────────

#[test]
fn test_status_selector_ordering_and_parsing() {
    let mut selectors = vec![
        StatusSelector::Default,
        StatusSelector::from(StatusCode::NOT_FOUND),
        StatusSelector::Code(200),
    ];
    selectors.sort();
    assert_eq!(
        selectors,
        [StatusSelector::Code(200), StatusSelector::Code(404), StatusSelector::Default]
    );
    assert_eq!("default".parse::<StatusSelector>().unwrap(), StatusSelector::Default);
    assert_eq!(" 201 ".parse::<StatusSelector>().unwrap(), StatusSelector::Code(201));
    assert!("2XX".parse::<StatusSelector>().is_err());
    assert!(!StatusSelector::Code(600).is_valid());
    assert!(!StatusSelector::Code(99).is_valid());
    assert!(StatusSelector::Code(599).is_valid());
}

#[test]
fn test_parameter_requiredness_follows_type() {
    assert!(ParameterDescriptor::query("q", String::describe()).required);
    assert!(!ParameterDescriptor::query("q", Option::<String>::describe()).required);
    assert!(ParameterDescriptor::path("id", Option::<i64>::describe()).required);
    assert_eq!(
        ParameterDescriptor::header("X-Id", String::describe()).location,
        ParamLocation::Header
    );
}

#[test]
fn test_examples_upsert_by_name() {
    let body = BodyDescriptor::of::<Pet>()
        .example("a", json!({ "id": 1 }))
        .example("b", json!({ "id": 2 }))
        .example("a", Example::new(json!({ "id": 3 })).with_summary("replaced"));
    let names: Vec<&str> = body.examples.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, ["a", "b"]);
    assert_eq!(body.examples[0].1.value, json!({ "id": 3 }));
    assert_eq!(body.examples[0].1.summary.as_deref(), Some("replaced"));
}

#[test]
fn test_media_types_deduplicated() {
    let body = BodyDescriptor::new(TypeDescriptor::string())
        .media_type("text/csv")
        .media_type("text/csv");
    assert_eq!(body.media_types, ["text/csv"]);
}

#[test]
fn test_operation_builder() {
    let op = OperationDescriptor::builder(Method::PUT, "/pets/{id}")
        .tag("pets")
        .tag("pets")
        .summary("Replace a pet")
        .parameter(ParameterDescriptor::path("id", i64::describe()))
        .request_body(BodyDescriptor::of::<Pet>())
        .response(ResponseDescriptor::ok())
        .deprecated()
        .build();
    assert_eq!(op.method, Method::PUT);
    assert_eq!(op.tags, ["pets"]);
    assert!(op.deprecated);
    assert!(!op.hidden);
    assert_eq!(op.responses[0].status, StatusSelector::Code(200));
}

#[test]
fn test_effective_operation_id() {
    let explicit = OperationDescriptor::get("/pets").operation_id("findPets").build();
    assert_eq!(explicit.effective_id(), "findPets");
    let derived = OperationDescriptor::get("/pets/{id}/toys").build();
    assert_eq!(derived.effective_id(), "get_pets_id_toys");
    let root = OperationDescriptor::post("/").build();
    assert_eq!(root.effective_id(), "post");
}

// ── RouteTable ──────────────────────────────────────────────────────────────

#[test]
fn test_route_table_keeps_registration_order() {
    let mut table = RouteTable::new()
        .with(OperationDescriptor::get("/b").build())
        .with(OperationDescriptor::get("/a").build());
    table.register_operation(OperationDescriptor::delete("/a").build());

    let mut other: RouteTable = vec![OperationDescriptor::get("/c").build()].into_iter().collect();
    other.extend([OperationDescriptor::get("/d").build()]);
    table.merge(other);

    let paths: Vec<String> = table
        .iter()
        .map(|op| format!("{} {}", op.method, op.path))
        .collect();
    assert_eq!(paths, ["GET /b", "GET /a", "DELETE /a", "GET /c", "GET /d"]);
    assert_eq!(table.len(), 5);
    assert!(!table.is_empty());
}
