use apiscribe::prelude::*;
use serde_json::json;

use crate::models::{ErrorModel, NewPet, Pet};

fn pet_example(id: i64, name: &str, tag: &str) -> Example {
    Example::new(json!({ "id": id, "name": name, "tag": tag }))
}

fn unexpected_error() -> ResponseDescriptor {
    ResponseDescriptor::fallback()
        .description("unexpected error")
        .body(
            BodyDescriptor::of::<ErrorModel>()
                .example("Error", json!({ "message": "unexpected error" })),
        )
}

fn pet_id(description: &str) -> ParameterDescriptor {
    ParameterDescriptor::path("id", i64::describe())
        .description(description)
        .example(123)
}

/// Documentation for every petstore route, in registration order.
pub fn routes() -> RouteTable {
    RouteTable::new()
        .with(
            OperationDescriptor::get("/pets")
                .operation_id("findPets")
                .tag("pets")
                .description("Returns all pets from the system that the user has access to")
                .parameter(
                    ParameterDescriptor::query("tags", Vec::<String>::describe())
                        .required(false)
                        .description("tags to filter by")
                        .example(json!(["dog"])),
                )
                .parameter(
                    ParameterDescriptor::query("limit", i32::describe())
                        .required(false)
                        .description("maximum number of results to return")
                        .example(100),
                )
                .response(
                    ResponseDescriptor::ok()
                        .description("the list of available pets")
                        .body(BodyDescriptor::of::<Vec<Pet>>().example(
                            "Pet List",
                            json!([
                                { "id": 123, "name": "Big Bird", "tag": "bird" },
                                { "id": 456, "name": "Charlie", "tag": "dog" }
                            ]),
                        )),
                )
                .response(unexpected_error())
                .build(),
        )
        .with(
            OperationDescriptor::post("/pets")
                .operation_id("addPet")
                .tag("pets")
                .description("Creates a new pet in the store. Duplicates are allowed")
                .request_body(
                    BodyDescriptor::of::<NewPet>()
                        .description("Pet to add to the store")
                        .example("New Bird", json!({ "name": "Big Bird", "tag": "bird" }))
                        .example("New Dog", json!({ "name": "Charlie", "tag": "dog" })),
                )
                .response(
                    ResponseDescriptor::ok().description("the created pet").body(
                        BodyDescriptor::of::<Pet>()
                            .example("Bird", pet_example(123, "Big Bird", "bird"))
                            .example("Dog", pet_example(456, "Charlie", "dog")),
                    ),
                )
                .response(unexpected_error())
                .build(),
        )
        .with(
            OperationDescriptor::get("/pets/{id}")
                .operation_id("findPetById")
                .tag("pets")
                .description("Returns a pet based on a single ID.")
                .parameter(pet_id("Id of pet to fetch"))
                .response(
                    ResponseDescriptor::ok().description("the pet with the given id").body(
                        BodyDescriptor::of::<Pet>()
                            .example("Bird", pet_example(123, "Big Bird", "bird"))
                            .example("Dog", pet_example(123, "Charlie", "dog")),
                    ),
                )
                .response(
                    ResponseDescriptor::new(StatusCode::NOT_FOUND)
                        .description("the pet with the given id was not found"),
                )
                .response(unexpected_error())
                .build(),
        )
        .with(
            OperationDescriptor::delete("/pets/{id}")
                .operation_id("deletePet")
                .tag("pets")
                .description("deletes a single pet based on the supplied ID")
                .parameter(pet_id("Id of pet to delete"))
                .response(
                    ResponseDescriptor::new(StatusCode::NO_CONTENT)
                        .description("the pet was successfully deleted"),
                )
                .response(
                    ResponseDescriptor::new(StatusCode::NOT_FOUND)
                        .description("the pet with the given id was not found"),
                )
                .response(unexpected_error())
                .build(),
        )
}
