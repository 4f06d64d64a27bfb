use apiscribe_core::{
    BodyDescriptor, Describe, ExampleValidation, ObjectType, OpenApiConfig, OpenApiVersion,
    OperationDescriptor, ParamLocation, ParameterDescriptor, ResponseDescriptor, RouteTable,
    SecurityRequirement, SecurityScheme, StatusSelector, TypeDescriptor,
};
use http::StatusCode;
use apiscribe_openapi::{assemble, DiagnosticKind, Document, DocumentAssembler, SpecError, SpecFormat};
use serde_json::{json, Value};
use std::sync::Arc;

// ── Helpers ─────────────────────────────────────────────────────────────────

fn default_config() -> OpenApiConfig {
    OpenApiConfig::new("Test API", "0.1.0")
}

struct Pet;
struct Owner;

impl Describe for Pet {
    fn describe() -> TypeDescriptor {
        ObjectType::named::<Pet>("Pet")
            .field("id", i64::describe())
            .field("name", String::describe())
            .field("tag", String::describe())
            .build()
    }
}

impl Describe for Owner {
    fn describe() -> TypeDescriptor {
        ObjectType::named::<Owner>("Owner")
            .field("name", String::describe())
            .field("pets", Vec::<Pet>::describe())
            .build()
    }
}

fn find_pets() -> OperationDescriptor {
    OperationDescriptor::get("/pets")
        .operation_id("findPets")
        .parameter(ParameterDescriptor::query("limit", Option::<i32>::describe()))
        .response(ResponseDescriptor::ok().body(BodyDescriptor::of::<Vec<Pet>>()))
        .build()
}

fn get_pet() -> OperationDescriptor {
    OperationDescriptor::get("/pets/{id}")
        .operation_id("getPet")
        .parameter(ParameterDescriptor::path("id", i64::describe()))
        .response(ResponseDescriptor::ok().body(BodyDescriptor::of::<Pet>()))
        .build()
}

fn build(ops: Vec<OperationDescriptor>) -> Document {
    assemble(&default_config(), &ops).unwrap()
}

fn build_with(config: OpenApiConfig, ops: Vec<OperationDescriptor>) -> Document {
    assemble(&config, &ops).unwrap()
}

fn diagnostics_of(doc: &Document, kind: DiagnosticKind) -> usize {
    doc.diagnostics().iter().filter(|d| d.kind == kind).count()
}

// ── Document shell ──────────────────────────────────────────────────────────

#[test]
fn empty_document() {
    let doc = build(vec![]);
    let v = doc.value();
    assert_eq!(v["openapi"], "3.1.0");
    assert_eq!(v["info"], json!({ "title": "Test API", "version": "0.1.0" }));
    assert!(v["paths"].as_object().unwrap().is_empty());
    assert!(v.get("components").is_none());
    assert!(v.get("tags").is_none());
}

#[test]
fn top_level_key_order() {
    let config = default_config()
        .with_server("https://api.example.com", None)
        .with_tag("pets", None)
        .with_security_scheme("bearerAuth", SecurityScheme::bearer(Some("JWT")))
        .with_default_security(SecurityRequirement::new("bearerAuth"));
    let doc = build_with(config, vec![find_pets()]);
    let keys: Vec<&String> = doc.value().as_object().unwrap().keys().collect();
    assert_eq!(keys, ["openapi", "info", "servers", "tags", "paths", "components", "security"]);
    assert_eq!(
        doc.value()["components"]["securitySchemes"]["bearerAuth"],
        json!({ "type": "http", "scheme": "bearer", "bearerFormat": "JWT" })
    );
    assert_eq!(doc.value()["security"], json!([{ "bearerAuth": [] }]));
}

#[test]
fn version_3_0_drops_license_identifier() {
    let mut config = default_config().with_openapi_version(OpenApiVersion::V3_0);
    config.license = Some(apiscribe_core::License {
        name: "MIT".into(),
        url: None,
        identifier: Some("MIT".into()),
    });
    let doc = build_with(config, vec![]);
    assert_eq!(doc.value()["openapi"], "3.0.3");
    assert_eq!(doc.value()["info"]["license"], json!({ "name": "MIT" }));
}

#[test]
fn operation_tags_are_appended_after_configured_ones() {
    let config = default_config().with_tag("store", Some("Store access"));
    let op = OperationDescriptor::get("/pets").tag("pets").tag("store").build();
    let doc = build_with(config, vec![op]);
    assert_eq!(
        doc.value()["tags"],
        json!([{ "name": "store", "description": "Store access" }, { "name": "pets" }])
    );
}

// ── End to end ──────────────────────────────────────────────────────────────

#[test]
fn pets_listing_scenario() {
    let doc = build(vec![find_pets()]);
    let params = doc.operation("GET", "/pets").unwrap()["parameters"].as_array().unwrap();
    assert_eq!(params.len(), 1);
    assert_eq!(params[0]["name"], "limit");
    assert_eq!(params[0]["required"], false);

    let pet = doc.component("Pet").unwrap();
    assert_eq!(pet["properties"]["id"], json!({ "type": "integer", "format": "int64" }));
    assert_eq!(pet["properties"]["name"], json!({ "type": "string" }));
    assert_eq!(pet["properties"]["tag"], json!({ "type": "string" }));
    assert_eq!(pet["required"], json!(["id", "name", "tag"]));
}

#[test]
fn shared_types_are_deduplicated_across_operations() {
    let owner = OperationDescriptor::get("/owners")
        .response(ResponseDescriptor::ok().body(BodyDescriptor::of::<Vec<Owner>>()))
        .build();
    let doc = build(vec![find_pets(), get_pet(), owner]);
    let schemas = doc.value()["components"]["schemas"].as_object().unwrap();
    let names: Vec<&String> = schemas.keys().collect();
    assert_eq!(names, ["Pet", "Owner"]);
}

#[test]
fn assembly_is_deterministic() {
    let ops = || vec![find_pets(), get_pet()];
    let first = build(ops());
    let second = build(ops());
    assert_eq!(first.json(), second.json());
    assert_eq!(first.yaml(), second.yaml());
    assert_eq!(
        first.etag(SpecFormat::Json),
        second.etag(SpecFormat::Json)
    );
}

#[test]
fn yaml_rendering_matches_json() {
    let doc = build(vec![find_pets()]);
    let from_yaml: Value = serde_yaml::from_slice(doc.yaml()).unwrap();
    assert_eq!(&from_yaml, doc.value());
}

#[test]
fn paths_keep_registration_order() {
    let doc = build(vec![get_pet(), find_pets()]);
    let paths: Vec<&String> = doc.value()["paths"].as_object().unwrap().keys().collect();
    assert_eq!(paths, ["/pets/{id}", "/pets"]);
}

// ── Operation structure ─────────────────────────────────────────────────────

#[test]
fn derived_operation_id() {
    let op = OperationDescriptor::delete("/pets/{id}")
        .parameter(ParameterDescriptor::path("id", i64::describe()))
        .build();
    let doc = build(vec![op]);
    assert_eq!(doc.operation("delete", "/pets/{id}").unwrap()["operationId"], "delete_pets_id");
}

#[test]
fn parameters_grouped_by_location() {
    let op = OperationDescriptor::get("/items/{id}")
        .parameter(ParameterDescriptor::cookie("session", String::describe()))
        .parameter(ParameterDescriptor::header("X-Trace", String::describe()))
        .parameter(ParameterDescriptor::query("b", String::describe()))
        .parameter(ParameterDescriptor::path("id", i64::describe()))
        .parameter(ParameterDescriptor::query("a", String::describe()))
        .build();
    let doc = build(vec![op]);
    let names: Vec<(&str, &str)> = doc.operation("get", "/items/{id}").unwrap()["parameters"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| (p["in"].as_str().unwrap(), p["name"].as_str().unwrap()))
        .collect();
    assert_eq!(
        names,
        [("path", "id"), ("query", "b"), ("query", "a"), ("header", "X-Trace"), ("cookie", "session")]
    );
}

#[test]
fn path_parameters_are_always_required() {
    let op = OperationDescriptor::get("/pets/{id}")
        .parameter(ParameterDescriptor::path("id", i64::describe()).required(false))
        .build();
    let doc = build(vec![op]);
    let param = &doc.operation("get", "/pets/{id}").unwrap()["parameters"][0];
    assert_eq!(param["required"], true);
    assert_eq!(diagnostics_of(&doc, DiagnosticKind::OptionalPathParameter), 1);
}

#[test]
fn path_template_mismatches_are_diagnosed() {
    let op = OperationDescriptor::get("/owners/{ownerId}/pets")
        .parameter(ParameterDescriptor::path("id", i64::describe()))
        .build();
    let doc = build(vec![op]);
    assert_eq!(diagnostics_of(&doc, DiagnosticKind::UndeclaredPathParameter), 1);
    assert_eq!(diagnostics_of(&doc, DiagnosticKind::UnusedPathParameter), 1);
}

#[test]
fn responses_sorted_with_default_last() {
    let op = OperationDescriptor::get("/pets")
        .response(ResponseDescriptor::fallback())
        .response(ResponseDescriptor::new(StatusCode::NOT_FOUND))
        .response(ResponseDescriptor::ok())
        .build();
    let doc = build(vec![op]);
    let responses = &doc.operation("get", "/pets").unwrap()["responses"];
    let keys: Vec<&String> = responses.as_object().unwrap().keys().collect();
    assert_eq!(keys, ["200", "404", "default"]);
    assert_eq!(responses["200"]["description"], "OK");
    assert_eq!(responses["404"]["description"], "Not Found");
    assert_eq!(responses["default"]["description"], "Default response");
}

#[test]
fn operation_without_responses_gets_200() {
    let doc = build(vec![OperationDescriptor::get("/ping").build()]);
    assert_eq!(
        doc.operation("get", "/ping").unwrap()["responses"],
        json!({ "200": { "description": "Successful response" } })
    );
}

#[test]
fn response_headers_are_documented() {
    let op = OperationDescriptor::get("/pets")
        .response(ResponseDescriptor::ok().header("X-Total", i64::describe(), "total count"))
        .build();
    let doc = build(vec![op]);
    assert_eq!(
        doc.operation("get", "/pets").unwrap()["responses"]["200"]["headers"]["X-Total"],
        json!({ "description": "total count", "schema": { "type": "integer", "format": "int64" } })
    );
}

#[test]
fn request_body_shape() {
    let op = OperationDescriptor::post("/pets")
        .request_body(BodyDescriptor::of::<Pet>().description("Pet to add"))
        .build();
    let doc = build(vec![op]);
    assert_eq!(
        doc.operation("post", "/pets").unwrap()["requestBody"],
        json!({
            "description": "Pet to add",
            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Pet" } } },
            "required": true
        })
    );
}

#[test]
fn media_types_inferred_unless_declared() {
    let op = OperationDescriptor::get("/raw")
        .response(ResponseDescriptor::ok().body(BodyDescriptor::new(String::describe())))
        .response(
            ResponseDescriptor::new(StatusCode::CREATED)
                .body(BodyDescriptor::new(TypeDescriptor::binary())),
        )
        .response(
            ResponseDescriptor::new(StatusCode::ACCEPTED).body(
                BodyDescriptor::new(String::describe())
                    .media_type("text/csv")
                    .media_type("text/html"),
            ),
        )
        .build();
    let doc = build(vec![op]);
    let responses = &doc.operation("get", "/raw").unwrap()["responses"];
    assert!(responses["200"]["content"].get("text/plain").is_some());
    assert!(responses["201"]["content"].get("application/octet-stream").is_some());
    let declared: Vec<&String> = responses["202"]["content"].as_object().unwrap().keys().collect();
    assert_eq!(declared, ["text/csv", "text/html"]);
}

#[test]
fn hidden_operations_are_left_out() {
    let hidden = OperationDescriptor::get("/internal").hidden().build();
    let doc = build(vec![find_pets(), hidden]);
    assert!(doc.value()["paths"].get("/internal").is_none());
}

#[test]
fn operation_security_and_unknown_scheme() {
    let config = default_config().with_security_scheme("bearerAuth", SecurityScheme::bearer(None));
    let op = OperationDescriptor::get("/me")
        .security(SecurityRequirement::new("bearerAuth").with_scopes(["read"]))
        .security(SecurityRequirement::new("apiKey"))
        .build();
    let doc = build_with(config, vec![op]);
    assert_eq!(
        doc.operation("get", "/me").unwrap()["security"],
        json!([{ "bearerAuth": ["read"] }, { "apiKey": [] }])
    );
    assert_eq!(diagnostics_of(&doc, DiagnosticKind::UnknownSecurityScheme), 1);
}

// ── Examples ────────────────────────────────────────────────────────────────

fn op_with_bad_example() -> OperationDescriptor {
    OperationDescriptor::post("/pets")
        .operation_id("addPet")
        .request_body(
            BodyDescriptor::of::<Pet>()
                .example("good", json!({ "id": 1, "name": "Rex", "tag": "dog" }))
                .example("bad", json!({ "id": "one", "name": "Rex", "tag": "dog" })),
        )
        .build()
}

#[test]
fn example_mismatch_is_advisory_by_default() {
    let doc = build(vec![op_with_bad_example()]);
    assert_eq!(diagnostics_of(&doc, DiagnosticKind::ExampleMismatch), 1);
    let examples = &doc.operation("post", "/pets").unwrap()["requestBody"]["content"]["application/json"]["examples"];
    assert_eq!(examples["bad"]["value"]["id"], "one");
}

#[test]
fn example_mismatch_is_fatal_when_strict() {
    let config = default_config().with_example_validation(ExampleValidation::Strict);
    match assemble(&config, &[op_with_bad_example()]) {
        Err(SpecError::ExampleMismatch { operation_id, example, reason }) => {
            assert_eq!(operation_id, "addPet");
            assert_eq!(example, "bad");
            assert_eq!(reason, "$.id: expected int64");
        }
        other => panic!("expected ExampleMismatch, got {other:?}"),
    }
}

#[test]
fn example_checking_can_be_disabled() {
    let config = default_config().with_example_validation(ExampleValidation::Off);
    let doc = build_with(config, vec![op_with_bad_example()]);
    assert!(doc.diagnostics().is_empty());
}

// ── Fatal errors ────────────────────────────────────────────────────────────

#[test]
fn duplicate_route_is_rejected() {
    let err = assemble(&default_config(), &[get_pet(), get_pet()]).unwrap_err();
    assert_eq!(
        err,
        SpecError::DuplicateOperation { method: "GET".into(), path: "/pets/{id}".into() }
    );
}

#[test]
fn duplicate_route_with_renamed_parameter_is_rejected() {
    let other = OperationDescriptor::get("/pets/{petId}")
        .operation_id("getPetAgain")
        .parameter(ParameterDescriptor::path("petId", i64::describe()))
        .build();
    let err = assemble(&default_config(), &[get_pet(), other]).unwrap_err();
    assert!(matches!(err, SpecError::DuplicateOperation { .. }));
}

#[test]
fn duplicate_operation_id_is_rejected() {
    let a = OperationDescriptor::get("/a").operation_id("same").build();
    let b = OperationDescriptor::get("/b").operation_id("same").build();
    let err = assemble(&default_config(), &[a, b]).unwrap_err();
    assert_eq!(err, SpecError::DuplicateOperationId("same".into()));
}

#[test]
fn colliding_derived_operation_ids_are_suffixed() {
    let ops = vec![
        OperationDescriptor::get("/pets").build(),
        OperationDescriptor::get("/pets/").build(),
        OperationDescriptor::get("/a-b").build(),
        OperationDescriptor::get("/a_b").build(),
        OperationDescriptor::get("/c").build(),
        OperationDescriptor::get("/c/").build(),
        OperationDescriptor::get("/d").operation_id("get_c_2").build(),
    ];
    let doc = build(ops);
    let id = |path: &str| doc.operation("get", path).unwrap()["operationId"].clone();
    assert_eq!(id("/pets"), "get_pets");
    assert_eq!(id("/pets/"), "get_pets_2");
    assert_eq!(id("/a-b"), "get_a_b");
    assert_eq!(id("/a_b"), "get_a_b_2");
    assert_eq!(id("/c"), "get_c");
    assert_eq!(id("/c/"), "get_c_3");
    assert_eq!(id("/d"), "get_c_2");
}

#[test]
fn declared_operation_id_wins_over_derived_one() {
    let derived = OperationDescriptor::get("/pets").build();
    let declared = OperationDescriptor::post("/pets/search").operation_id("get_pets").build();
    let doc = build(vec![derived, declared]);
    assert_eq!(doc.operation("get", "/pets").unwrap()["operationId"], "get_pets_2");
    assert_eq!(doc.operation("post", "/pets/search").unwrap()["operationId"], "get_pets");
}

#[test]
fn renamed_templates_share_one_path_item() {
    let delete = OperationDescriptor::delete("/pets/{petId}")
        .parameter(ParameterDescriptor::path("petId", i64::describe()))
        .build();
    let doc = build(vec![get_pet(), delete]);
    let paths: Vec<&String> = doc.value()["paths"].as_object().unwrap().keys().collect();
    assert_eq!(paths, ["/pets/{id}"]);

    let delete = doc.operation("delete", "/pets/{id}").unwrap();
    assert_eq!(delete["operationId"], "delete_pets_petId");
    assert_eq!(delete["parameters"][0]["name"], "id");
    assert_eq!(delete["parameters"][0]["in"], "path");
    assert_eq!(doc.operation("get", "/pets/{id}").unwrap()["operationId"], "getPet");
}

#[test]
fn invalid_response_codes_are_rejected() {
    for code in [99u16, 600] {
        let op = OperationDescriptor::get("/x")
            .operation_id("x")
            .response(ResponseDescriptor::new(code))
            .build();
        let err = assemble(&default_config(), &[op]).unwrap_err();
        assert_eq!(
            err,
            SpecError::InvalidResponseCode { operation_id: "x".into(), selector: code.to_string() }
        );
    }
}

#[test]
fn duplicate_response_is_rejected() {
    let op = OperationDescriptor::get("/x")
        .operation_id("x")
        .response(ResponseDescriptor::ok())
        .response(ResponseDescriptor::new(200u16))
        .build();
    let err = assemble(&default_config(), &[op]).unwrap_err();
    assert_eq!(
        err,
        SpecError::DuplicateResponse { operation_id: "x".into(), selector: StatusSelector::Code(200) }
    );
}

#[test]
fn duplicate_parameter_is_rejected() {
    let op = OperationDescriptor::get("/x")
        .operation_id("x")
        .parameter(ParameterDescriptor::header("X-Token", String::describe()))
        .parameter(ParameterDescriptor::header("x-token", String::describe()))
        .build();
    let err = assemble(&default_config(), &[op]).unwrap_err();
    assert_eq!(
        err,
        SpecError::DuplicateParameter {
            operation_id: "x".into(),
            location: ParamLocation::Header,
            name: "x-token".into()
        }
    );
}

#[test]
fn same_name_in_different_locations_is_fine() {
    let op = OperationDescriptor::get("/x/{id}")
        .parameter(ParameterDescriptor::path("id", i64::describe()))
        .parameter(ParameterDescriptor::query("id", String::describe()))
        .build();
    assert!(assemble(&default_config(), &[op]).is_ok());
}

#[test]
fn resolution_error_names_its_location() {
    let op = OperationDescriptor::get("/pages")
        .operation_id("listPages")
        .response(ResponseDescriptor::ok().body(BodyDescriptor::new(TypeDescriptor::generic("T"))))
        .build();
    let err = assemble(&default_config(), &[op]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "cannot resolve schema for `T` (in listPages > response 200): unbound generic parameter `T`"
    );
}

// ── DocumentAssembler ───────────────────────────────────────────────────────

#[test]
fn assembler_memoizes_until_routes_change() {
    let routes: RouteTable = vec![find_pets()].into_iter().collect();
    let mut assembler = DocumentAssembler::with_routes(default_config(), routes);
    assert!(!assembler.is_cached());

    let first = assembler.document().unwrap();
    let again = assembler.document().unwrap();
    assert!(Arc::ptr_eq(&first, &again));

    assembler.routes_changed();
    let rebuilt = assembler.document().unwrap();
    assert!(!Arc::ptr_eq(&first, &rebuilt));
    assert_eq!(first.json(), rebuilt.json());

    assembler.register_operation(get_pet());
    assert!(!assembler.is_cached());
    let grown = assembler.document().unwrap();
    assert!(grown.operation("get", "/pets/{id}").is_some());
}

#[test]
fn assembler_surfaces_errors_without_caching() {
    let mut assembler = DocumentAssembler::new(default_config());
    assembler.register_operation(get_pet());
    assembler.register_operation(get_pet());
    assert!(assembler.document().is_err());
    assert!(!assembler.is_cached());

    let previous = assembler.replace_routes(RouteTable::new().with(get_pet()));
    assert_eq!(previous.len(), 2);
    assert!(assembler.document().is_ok());
}
