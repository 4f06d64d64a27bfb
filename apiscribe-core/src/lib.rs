//! Descriptor model for apiscribe.
//!
//! Hosts describe routes with [`OperationDescriptor`] values, types with
//! [`TypeDescriptor`] values (usually via [`Describe`]), collect them in a
//! [`RouteTable`], and hand the table plus an [`OpenApiConfig`] to the
//! document engine in `apiscribe-openapi`.

pub mod config;
pub mod describe;
pub mod descriptor;
pub mod logging;
pub mod meta;
pub mod prelude;

pub use config::{
    ApiKeyLocation, ConfigError, Contact, ExampleValidation, License, OpenApiConfig,
    OpenApiVersion, SecurityScheme, Server, Tag,
};
pub use describe::Describe;
pub use descriptor::{
    BodyDescriptor, EnumType, Example, ExternalDocs, Field, InvalidStatusSelector, NamedRef,
    ObjectBuilder, ObjectType, OperationDescriptor, OperationDescriptorBuilder, ParamLocation,
    ParameterDescriptor, Primitive, ResponseDescriptor, ResponseHeader, SecurityRequirement,
    StatusSelector, TypeDescriptor, TypeName, UnionBuilder, UnionType, Variant,
};
pub use logging::init_tracing;
pub use meta::RouteTable;

pub use http;
