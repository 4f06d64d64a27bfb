//! Everything needed to document routes, in one `use`.
//!
//! ```ignore
//! use apiscribe_core::prelude::*;
//!
//! let routes = RouteTable::new().with(
//!     OperationDescriptor::get("/pets")
//!         .operation_id("findPets")
//!         .parameter(ParameterDescriptor::query("limit", Option::<i32>::describe()))
//!         .response(ResponseDescriptor::ok().body(BodyDescriptor::of::<Vec<Pet>>()))
//!         .build(),
//! );
//! ```

pub use crate::config::{ExampleValidation, OpenApiConfig, OpenApiVersion, SecurityScheme};
pub use crate::describe::Describe;
pub use crate::descriptor::{
    BodyDescriptor, EnumType, Example, Field, ObjectType, OperationDescriptor, ParamLocation,
    ParameterDescriptor, ResponseDescriptor, SecurityRequirement, StatusSelector,
    TypeDescriptor, TypeName, UnionType,
};
pub use crate::meta::RouteTable;
pub use http::{Method, StatusCode};
