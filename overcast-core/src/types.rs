//! # Type Descriptors
//!
//! A [`TypeDesc`] is the declared type of a parameter. The matcher checks a
//! runtime [`Value`] against it structurally:
//!
//! - [`TypeDesc::of`] - exactly the Rust type `T`
//! - [`TypeDesc::any_of`] / `a | b` - any member of a union
//! - [`TypeDesc::seq_of`] - a `Vec<Value>` whose elements all match
//! - [`TypeDesc::tuple_of`] - a fixed-length `Vec<Value>`, element-wise
//! - [`TypeDesc::map_of`] - an `IndexMap<String, Value>` whose values all match
//! - [`TypeDesc::predicate`] - an arbitrary `Fn(&Value) -> bool`
//!
//! Descriptors compose, so `seq_of(of::<Circle>() | of::<Square>())` accepts a
//! sequence mixing circles and squares.

use crate::value::{Value, short_type_name};
use indexmap::IndexMap;
use std::{
    any::{Any, TypeId},
    borrow::Cow,
    fmt,
    ops::BitOr,
    sync::Arc,
};

/// A runtime predicate used by [`TypeDesc::Where`].
pub type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// The declared type of a parameter.
#[derive(Clone)]
pub enum TypeDesc {
    /// Matches every value.
    Any,
    /// Matches values of exactly one Rust type.
    Exact {
        /// The `TypeId` to compare against.
        id: TypeId,
        /// The Rust type name, for diagnostics.
        name: &'static str,
    },
    /// Matches values matching at least one member.
    Union(Vec<TypeDesc>),
    /// Matches a `Vec<Value>` whose elements all match.
    SeqOf(Box<TypeDesc>),
    /// Matches a `Vec<Value>` of the same length, element-wise.
    TupleOf(Vec<TypeDesc>),
    /// Matches an `IndexMap<String, Value>` whose values all match.
    MapOf(Box<TypeDesc>),
    /// Matches values accepted by a predicate.
    Where {
        /// Shown in diagnostics in place of a type name.
        name: Cow<'static, str>,
        /// The check itself.
        predicate: Predicate,
    },
}

impl TypeDesc {
    /// Exactly the Rust type `T`.
    pub fn of<T: Any>() -> Self {
        TypeDesc::Exact {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The unit type, used as "none".
    pub fn unit() -> Self {
        Self::of::<()>()
    }

    /// Any member of the given union. Nested unions are flattened.
    pub fn any_of<I>(members: I) -> Self
    where
        I: IntoIterator<Item = TypeDesc>,
    {
        let mut flat = Vec::new();
        for member in members {
            match member {
                TypeDesc::Union(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        TypeDesc::Union(flat)
    }

    /// `inner` or unit.
    pub fn optional(inner: TypeDesc) -> Self {
        Self::any_of([inner, Self::unit()])
    }

    /// A sequence whose elements all match `element`.
    pub fn seq_of(element: TypeDesc) -> Self {
        TypeDesc::SeqOf(Box::new(element))
    }

    /// A fixed-length sequence matched element-wise.
    pub fn tuple_of<I>(elements: I) -> Self
    where
        I: IntoIterator<Item = TypeDesc>,
    {
        TypeDesc::TupleOf(elements.into_iter().collect())
    }

    /// A string-keyed map whose values all match `value`.
    pub fn map_of(value: TypeDesc) -> Self {
        TypeDesc::MapOf(Box::new(value))
    }

    /// A named predicate check.
    pub fn predicate<F>(name: impl Into<Cow<'static, str>>, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        TypeDesc::Where {
            name: name.into(),
            predicate: Arc::new(predicate),
        }
    }

    /// Check a runtime value against this descriptor.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            TypeDesc::Any => true,
            TypeDesc::Exact { id, .. } => value.type_id() == *id,
            TypeDesc::Union(members) => members.iter().any(|m| m.matches(value)),
            TypeDesc::SeqOf(element) => value
                .as_seq()
                .is_some_and(|items| items.iter().all(|item| element.matches(item))),
            TypeDesc::TupleOf(elements) => value.as_seq().is_some_and(|items| {
                items.len() == elements.len()
                    && items.iter().zip(elements).all(|(item, ty)| ty.matches(item))
            }),
            TypeDesc::MapOf(entry) => value
                .downcast_ref::<IndexMap<String, Value>>()
                .is_some_and(|map| map.values().all(|item| entry.matches(item))),
            TypeDesc::Where { predicate, .. } => predicate(value),
        }
    }
}

impl BitOr for TypeDesc {
    type Output = TypeDesc;

    fn bitor(self, rhs: TypeDesc) -> TypeDesc {
        TypeDesc::any_of([self, rhs])
    }
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDesc::Any => f.write_str("Any"),
            TypeDesc::Exact { name, .. } => f.write_str(&short_type_name(name)),
            TypeDesc::Union(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{member}")?;
                }
                Ok(())
            }
            TypeDesc::SeqOf(element) => write!(f, "Seq[{element}]"),
            TypeDesc::TupleOf(elements) => {
                f.write_str("(")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{element}")?;
                }
                f.write_str(")")
            }
            TypeDesc::MapOf(entry) => write!(f, "Map[str, {entry}]"),
            TypeDesc::Where { name, .. } => f.write_str(name),
        }
    }
}

impl fmt::Debug for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeDesc({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Circle;
    struct Square;

    #[test]
    fn test_exact() {
        let ty = TypeDesc::of::<Circle>();
        assert!(ty.matches(&Value::new(Circle)));
        assert!(!ty.matches(&Value::new(Square)));
        assert!(!ty.matches(&Value::new(42_i32)));
    }

    #[test]
    fn test_union_flattens_and_matches_any_member() {
        let ty = TypeDesc::of::<Circle>() | TypeDesc::of::<Square>() | TypeDesc::of::<i32>();
        match &ty {
            TypeDesc::Union(members) => assert_eq!(members.len(), 3),
            other => panic!("expected a union, got {other:?}"),
        }
        assert!(ty.matches(&Value::new(Square)));
        assert!(ty.matches(&Value::new(1_i32)));
        assert!(!ty.matches(&Value::new("circle")));
        assert_eq!(ty.to_string(), "Circle | Square | i32");
    }

    #[test]
    fn test_optional() {
        let ty = TypeDesc::optional(TypeDesc::of::<String>());
        assert!(ty.matches(&Value::unit()));
        assert!(ty.matches(&Value::new(String::from("x"))));
        assert!(!ty.matches(&Value::new(1_u8)));
    }

    #[test]
    fn test_seq_of() {
        let ty = TypeDesc::seq_of(TypeDesc::of::<Circle>() | TypeDesc::of::<Square>());
        assert!(ty.matches(&Value::seq([Value::new(Circle), Value::new(Square)])));
        assert!(ty.matches(&Value::seq(Vec::new())));
        assert!(!ty.matches(&Value::seq([Value::new(Circle), Value::new(3_u8)])));
        assert!(!ty.matches(&Value::new(Circle)));
        assert_eq!(ty.to_string(), "Seq[Circle | Square]");
    }

    #[test]
    fn test_tuple_of() {
        let ty = TypeDesc::tuple_of([TypeDesc::of::<i32>(), TypeDesc::of::<String>()]);
        assert!(ty.matches(&Value::seq([Value::new(1_i32), Value::new(String::new())])));
        assert!(!ty.matches(&Value::seq([Value::new(1_i32)])));
        assert!(!ty.matches(&Value::seq([Value::new(String::new()), Value::new(1_i32)])));
        assert_eq!(ty.to_string(), "(i32, String)");
    }

    #[test]
    fn test_map_of() {
        let ty = TypeDesc::map_of(TypeDesc::of::<f64>());
        let mut map = IndexMap::new();
        map.insert(String::from("x"), Value::new(1.0_f64));
        assert!(ty.matches(&Value::new(map.clone())));
        map.insert(String::from("y"), Value::new(2_i32));
        assert!(!ty.matches(&Value::new(map)));
    }

    #[test]
    fn test_predicate() {
        let positive = TypeDesc::predicate("positive i32", |v| {
            v.downcast_ref::<i32>().is_some_and(|n| *n > 0)
        });
        assert!(positive.matches(&Value::new(5_i32)));
        assert!(!positive.matches(&Value::new(-5_i32)));
        assert_eq!(positive.to_string(), "positive i32");
    }

    #[test]
    fn test_any() {
        assert!(TypeDesc::Any.matches(&Value::new(Circle)));
        assert!(TypeDesc::Any.matches(&Value::unit()));
    }
}
