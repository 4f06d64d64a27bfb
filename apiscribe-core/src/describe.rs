//! Explicit type description, standing in for runtime reflection.
//!
//! The engine only ever sees [`TypeDescriptor`] values. This trait is the
//! conventional way to produce them: std types are covered here, application
//! types implement it by hand with the builders.
//!
//! ```ignore
//! use apiscribe_core::{Describe, ObjectType, TypeDescriptor};
//!
//! struct Pet { id: i64, name: String, tag: Option<String> }
//!
//! impl Describe for Pet {
//!     fn describe() -> TypeDescriptor {
//!         ObjectType::named::<Pet>("Pet")
//!             .field("id", i64::describe())
//!             .field("name", String::describe())
//!             .field("tag", Option::<String>::describe())
//!             .build()
//!     }
//! }
//! ```

use crate::descriptor::{Primitive, TypeDescriptor};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::rc::Rc;
use std::sync::Arc;

/// Types that can describe their own shape.
pub trait Describe {
    fn describe() -> TypeDescriptor;
}

macro_rules! describe_primitive {
    ( $( $ty:ty => $prim:ident ),* $(,)? ) => {
        $(
            impl Describe for $ty {
                fn describe() -> TypeDescriptor {
                    TypeDescriptor::Primitive(Primitive::$prim)
                }
            }
        )*
    };
}

describe_primitive! {
    bool => Boolean,
    i8 => Int32,
    i16 => Int32,
    i32 => Int32,
    u8 => Int32,
    u16 => Int32,
    u32 => UInt32,
    i64 => Int64,
    isize => Int64,
    u64 => UInt64,
    usize => UInt64,
    f32 => Float,
    f64 => Double,
    char => String,
    str => String,
    String => String,
    serde_json::Value => Any,
    () => Any,
}

impl<T: Describe> Describe for Option<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::nullable(T::describe())
    }
}

impl<T: Describe> Describe for Vec<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::array(T::describe())
    }
}

impl<T: Describe> Describe for VecDeque<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::array(T::describe())
    }
}

impl<T: Describe> Describe for [T] {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::array(T::describe())
    }
}

impl<T: Describe, const N: usize> Describe for [T; N] {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::array(T::describe())
    }
}

impl<T: Describe, S> Describe for HashSet<T, S> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::set(T::describe())
    }
}

impl<T: Describe> Describe for BTreeSet<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::set(T::describe())
    }
}

impl<K: Describe, V: Describe, S> Describe for HashMap<K, V, S> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::map_with_key(K::describe(), V::describe())
    }
}

impl<K: Describe, V: Describe> Describe for BTreeMap<K, V> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::map_with_key(K::describe(), V::describe())
    }
}

// Smart pointers are transparent.

impl<T: Describe + ?Sized> Describe for Box<T> {
    fn describe() -> TypeDescriptor {
        T::describe()
    }
}

impl<T: Describe + ?Sized> Describe for Arc<T> {
    fn describe() -> TypeDescriptor {
        T::describe()
    }
}

impl<T: Describe + ?Sized> Describe for Rc<T> {
    fn describe() -> TypeDescriptor {
        T::describe()
    }
}

impl<T: Describe + ?Sized> Describe for &T {
    fn describe() -> TypeDescriptor {
        T::describe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_is_nullable() {
        assert!(Option::<i32>::describe().is_nullable());
        assert_eq!(
            Option::<Option<i32>>::describe(),
            TypeDescriptor::nullable(TypeDescriptor::int32())
        );
    }

    #[test]
    fn collections_map_to_arrays_and_sets() {
        assert_eq!(Vec::<String>::describe(), TypeDescriptor::array(TypeDescriptor::string()));
        assert_eq!(
            BTreeSet::<i64>::describe(),
            TypeDescriptor::set(TypeDescriptor::int64())
        );
    }

    #[test]
    fn pointers_are_transparent() {
        assert_eq!(Box::<u64>::describe(), u64::describe());
        assert_eq!(Arc::<str>::describe(), TypeDescriptor::string());
    }
}
