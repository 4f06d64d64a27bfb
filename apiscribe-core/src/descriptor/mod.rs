//! Immutable descriptors a host hands to the document engine.
//!
//! Types are described with [`TypeDescriptor`], routes with
//! [`OperationDescriptor`]. Both come out of builders that are finalized
//! once; nothing downstream mutates them.

mod operation;
mod types;

pub use operation::{
    BodyDescriptor, Example, ExternalDocs, InvalidStatusSelector, OperationDescriptor,
    OperationDescriptorBuilder, ParamLocation, ParameterDescriptor, ResponseDescriptor,
    ResponseHeader, SecurityRequirement, StatusSelector,
};
pub use types::{
    EnumType, Field, NamedRef, ObjectBuilder, ObjectType, Primitive, TypeDescriptor, TypeName,
    UnionBuilder, UnionType, Variant,
};
