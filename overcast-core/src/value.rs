//! # Runtime Values
//!
//! Provides [`Value`], the type-erased argument and result carrier used by the
//! dispatch engine.
//!
//! # Example
//!
//! ```rust,ignore
//! let value = Value::new(Circle { radius: 1.0 });
//! let cloned = value.clone(); // O(1) - only increments reference count
//! assert!(cloned.is::<Circle>());
//! ```

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// A shared, type-erased runtime value.
///
/// `Value` wraps any `Send + Sync + 'static` value in an `Arc` and remembers the
/// Rust type name it was created from, so that diagnostics can describe the
/// arguments a dispatch received.
///
/// Heterogeneous sequences are represented as `Vec<Value>` and "none" as the
/// unit value `()`.
///
/// # Performance
///
/// - **Clone**: O(1) - only increments atomic reference count
/// - **Type test**: O(1) - a `TypeId` comparison
#[derive(Clone)]
pub struct Value {
    inner: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Value {
    /// Wrap a value.
    ///
    /// Wrapping a `Value` returns it unchanged rather than nesting it.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        if let Some(value) = (&value as &dyn Any).downcast_ref::<Value>() {
            return value.clone();
        }
        Self {
            inner: Arc::new(value),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Wrap an already shared value without copying it.
    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self {
            inner: value,
            type_name: std::any::type_name::<T>(),
        }
    }

    /// The unit value, used as "none" and as the result of operations that
    /// return nothing.
    pub fn unit() -> Self {
        Self::new(())
    }

    /// Build a heterogeneous sequence value (`Vec<Value>`).
    pub fn seq<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        Self::new(items.into_iter().collect::<Vec<Value>>())
    }

    /// The `TypeId` of the wrapped value.
    pub fn type_id(&self) -> TypeId {
        (*self.inner).type_id()
    }

    /// The full Rust type name of the wrapped value.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The type name with module paths stripped, e.g. `Vec<Circle>`.
    pub fn short_type_name(&self) -> String {
        short_type_name(self.type_name)
    }

    /// Returns `true` if the wrapped value is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.inner.is::<T>()
    }

    /// Returns `true` if this is the unit value.
    pub fn is_unit(&self) -> bool {
        self.is::<()>()
    }

    /// Borrow the wrapped value as a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Get a shared handle to the wrapped value as a `T`.
    pub fn downcast_arc<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.inner).downcast::<T>().ok()
    }

    /// View the value as a heterogeneous sequence, if it is one.
    pub fn as_seq(&self) -> Option<&[Value]> {
        self.downcast_ref::<Vec<Value>>().map(Vec::as_slice)
    }

    /// Returns `true` if both values share the same allocation.
    pub fn ptr_eq(&self, other: &Value) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Returns the number of strong references to the wrapped value.
    pub fn strong_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value<{}>", self.short_type_name())
    }
}

/// Strip module paths from a Rust type name, including inside generics.
///
/// `alloc::vec::Vec<geometry::Circle>` becomes `Vec<Circle>`.
pub fn short_type_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut segment_start = 0;
    let mut chars = full.chars().peekable();

    while let Some(c) = chars.next() {
        if c == ':' && chars.peek() == Some(&':') {
            chars.next();
            out.truncate(segment_start);
        } else if c.is_alphanumeric() || c == '_' {
            out.push(c);
        } else {
            out.push(c);
            segment_start = out.len();
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Circle {
        radius: u32,
    }

    #[test]
    fn test_downcast() {
        let value = Value::new(Circle { radius: 3 });
        assert!(value.is::<Circle>());
        assert!(!value.is::<u32>());
        assert_eq!(value.downcast_ref::<Circle>(), Some(&Circle { radius: 3 }));
        assert_eq!(value.downcast_arc::<Circle>().map(|c| c.radius), Some(3));
        assert_eq!(value.type_id(), TypeId::of::<Circle>());
    }

    #[test]
    fn test_wrapping_a_value_does_not_nest() {
        let inner = Value::new(7_i64);
        let outer = Value::new(inner.clone());
        assert!(outer.is::<i64>());
        assert!(outer.ptr_eq(&inner));
    }

    #[test]
    fn test_clone_shares_allocation() {
        let value = Value::new(String::from("shared"));
        let cloned = value.clone();
        assert!(value.ptr_eq(&cloned));
        assert_eq!(value.strong_count(), 2);
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name("i32"), "i32");
        assert_eq!(short_type_name("alloc::string::String"), "String");
        assert_eq!(
            short_type_name("alloc::vec::Vec<geometry::shapes::Circle>"),
            "Vec<Circle>"
        );
        assert_eq!(
            short_type_name("(i32, &alloc::string::String)"),
            "(i32, &String)"
        );
        assert_eq!(Value::seq(Vec::new()).short_type_name(), "Vec<Value>");
    }
}
