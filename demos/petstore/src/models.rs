use apiscribe::{Describe, ObjectType, TypeDescriptor};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pet {
    pub id: i64,
    pub name: String,
    pub tag: String,
}

impl Describe for Pet {
    fn describe() -> TypeDescriptor {
        ObjectType::named::<Pet>("Pet")
            .field("id", i64::describe())
            .field("name", String::describe())
            .field("tag", String::describe())
            .build()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewPet {
    pub name: String,
    pub tag: String,
}

impl Describe for NewPet {
    fn describe() -> TypeDescriptor {
        ObjectType::named::<NewPet>("NewPet")
            .field("name", String::describe())
            .field("tag", String::describe())
            .build()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorModel {
    pub message: String,
}

impl ErrorModel {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Describe for ErrorModel {
    fn describe() -> TypeDescriptor {
        ObjectType::named::<ErrorModel>("ErrorModel")
            .field("message", String::describe())
            .build()
    }
}

/// Query string of `GET /pets`.
#[derive(Debug, Default, Deserialize)]
pub struct PetFilter {
    /// Comma separated.
    pub tags: Option<String>,
    pub limit: Option<usize>,
}
