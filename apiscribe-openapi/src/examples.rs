//! Generation-time example checking.
//!
//! Examples are compared against the descriptor they illustrate, not against
//! a full JSON Schema validator: type of each value, required fields present,
//! enum membership and union tags. Unknown object members are tolerated.

use apiscribe_core::{NamedRef, Primitive, TypeDescriptor};
use serde_json::Value;
use std::fmt;

use crate::schema::TypeCatalog;

/// Where in an example a mismatch was found, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExampleError {
    /// JSONPath-like location, `$` is the example root.
    pub path: String,
    pub reason: String,
}

impl fmt::Display for ExampleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.reason)
    }
}

/// Check `value` against `ty`. Named references are looked up in `catalog`
/// when they carry no deferred target; unknown references are accepted.
pub fn check_example(value: &Value, ty: &TypeDescriptor, catalog: &TypeCatalog) -> Result<(), ExampleError> {
    let mut path = String::from("$");
    check(value, ty, catalog, &mut path)
}

fn mismatch(path: &str, reason: impl Into<String>) -> ExampleError {
    ExampleError {
        path: path.to_string(),
        reason: reason.into(),
    }
}

fn check(value: &Value, ty: &TypeDescriptor, catalog: &TypeCatalog, path: &mut String) -> Result<(), ExampleError> {
    if value.is_null() {
        return match ty {
            TypeDescriptor::Nullable(_) | TypeDescriptor::Primitive(Primitive::Any) => Ok(()),
            _ => Err(mismatch(path, format!("null is not allowed for `{ty}`"))),
        };
    }

    match ty {
        TypeDescriptor::Nullable(inner) => check(value, inner, catalog, path),
        TypeDescriptor::Primitive(p) => check_primitive(value, *p, path),
        TypeDescriptor::Array { items, unique } => {
            let Some(elements) = value.as_array() else {
                return Err(mismatch(path, "expected array"));
            };
            for (i, element) in elements.iter().enumerate() {
                let len = path.len();
                path.push_str(&format!("[{i}]"));
                check(element, items, catalog, path)?;
                path.truncate(len);
            }
            if *unique {
                for (i, element) in elements.iter().enumerate() {
                    if elements[..i].contains(element) {
                        return Err(mismatch(path, format!("item {i} is a duplicate")));
                    }
                }
            }
            Ok(())
        }
        TypeDescriptor::Map { value: values, .. } => {
            let Some(members) = value.as_object() else {
                return Err(mismatch(path, "expected object"));
            };
            for (key, member) in members {
                let len = path.len();
                push_member(path, key);
                check(member, values, catalog, path)?;
                path.truncate(len);
            }
            Ok(())
        }
        TypeDescriptor::Enum(e) => match value.as_str() {
            Some(s) if e.values.iter().any(|v| v == s) => Ok(()),
            Some(s) => Err(mismatch(path, format!("`{s}` is not one of {:?}", e.values))),
            None => Err(mismatch(path, "expected string")),
        },
        TypeDescriptor::Object(object) => {
            let Some(members) = value.as_object() else {
                return Err(mismatch(path, "expected object"));
            };
            for field in &object.fields {
                match members.get(&field.name) {
                    Some(member) => {
                        let len = path.len();
                        push_member(path, &field.name);
                        check(member, &field.ty, catalog, path)?;
                        path.truncate(len);
                    }
                    None if field.is_required() => {
                        return Err(mismatch(path, format!("missing required field `{}`", field.name)));
                    }
                    None => {}
                }
            }
            Ok(())
        }
        TypeDescriptor::Union(union) => {
            let Some(members) = value.as_object() else {
                return Err(mismatch(path, "expected object"));
            };
            let Some(tag) = members.get(&union.discriminator).and_then(Value::as_str) else {
                return Err(mismatch(
                    path,
                    format!("missing discriminator `{}`", union.discriminator),
                ));
            };
            match union.variants.iter().find(|v| v.tag == tag) {
                Some(variant) => check(value, &variant.ty, catalog, path),
                None => Err(mismatch(path, format!("unknown variant `{tag}`"))),
            }
        }
        TypeDescriptor::Reference(NamedRef { name, target }) => {
            let definition = match target {
                Some(target) => Some(target()),
                None => catalog.get(&name.key).cloned(),
            };
            match definition {
                Some(TypeDescriptor::Reference(_)) | None => Ok(()),
                Some(definition) => check(value, &definition, catalog, path),
            }
        }
        TypeDescriptor::Generic(_) => Ok(()),
    }
}

fn check_primitive(value: &Value, primitive: Primitive, path: &str) -> Result<(), ExampleError> {
    let fits = match primitive {
        Primitive::Any => true,
        Primitive::Boolean => value.is_boolean(),
        Primitive::Int32 => value
            .as_i64()
            .is_some_and(|n| i32::try_from(n).is_ok()),
        Primitive::Int64 => value.is_i64(),
        Primitive::UInt32 => value
            .as_u64()
            .is_some_and(|n| u32::try_from(n).is_ok()),
        Primitive::UInt64 => value.is_u64(),
        Primitive::Float | Primitive::Double => value.is_number(),
        p if p.is_string_like() => value.is_string(),
        _ => false,
    };
    if fits {
        Ok(())
    } else {
        Err(mismatch(path, format!("expected {primitive}")))
    }
}

fn push_member(path: &mut String, key: &str) {
    if !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        path.push('.');
        path.push_str(key);
    } else {
        path.push_str(&format!("[{key:?}]"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apiscribe_core::ObjectType;
    use serde_json::json;

    struct Pet;

    fn pet() -> TypeDescriptor {
        ObjectType::named::<Pet>("Pet")
            .field("id", TypeDescriptor::int64())
            .field("name", TypeDescriptor::string())
            .field("tag", TypeDescriptor::nullable(TypeDescriptor::string()))
            .build()
    }

    #[test]
    fn accepts_matching_example() {
        let catalog = TypeCatalog::new();
        let value = json!({ "id": 1, "name": "Rex", "tag": null });
        assert!(check_example(&value, &pet(), &catalog).is_ok());
    }

    #[test]
    fn reports_path_of_first_mismatch() {
        let catalog = TypeCatalog::new();
        let ty = TypeDescriptor::array(pet());
        let value = json!([{ "id": 1, "name": "Rex" }, { "id": 2, "name": 7 }]);
        let err = check_example(&value, &ty, &catalog).unwrap_err();
        assert_eq!(err.to_string(), "$[1].name: expected string");
    }

    #[test]
    fn missing_required_field() {
        let catalog = TypeCatalog::new();
        let err = check_example(&json!({ "id": 1 }), &pet(), &catalog).unwrap_err();
        assert_eq!(err.path, "$");
        assert!(err.reason.contains("`name`"));
    }

    #[test]
    fn int32_range_is_checked() {
        let catalog = TypeCatalog::new();
        assert!(check_example(&json!(5_000_000_000_i64), &TypeDescriptor::int32(), &catalog).is_err());
        assert!(check_example(&json!(5_000_000_000_i64), &TypeDescriptor::int64(), &catalog).is_ok());
    }
}
