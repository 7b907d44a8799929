//! Argument tuples and bound arguments.
//!
//! [`Args`] is what a call site passes to `dispatch`: positional values plus
//! ordered keyword values. [`Bound`] is what a selected candidate receives:
//! every argument assigned to a parameter name.

use crate::{error::ArgError, value::Value};
use indexmap::IndexMap;
use std::{any::Any, fmt, sync::Arc};

/// The runtime arguments of one call.
#[derive(Clone, Default)]
pub struct Args {
    positional: Vec<Value>,
    keywords: IndexMap<String, Value>,
}

impl Args {
    /// Create an empty argument tuple.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument (builder style).
    pub fn arg<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.push(value);
        self
    }

    /// Add a keyword argument (builder style).
    pub fn kw<T: Any + Send + Sync>(mut self, name: impl Into<String>, value: T) -> Self {
        self.push_kw(name, value);
        self
    }

    /// Append a positional argument.
    pub fn push<T: Any + Send + Sync>(&mut self, value: T) {
        self.positional.push(Value::new(value));
    }

    /// Add a keyword argument. A repeated name replaces the earlier value.
    pub fn push_kw<T: Any + Send + Sync>(&mut self, name: impl Into<String>, value: T) {
        self.keywords.insert(name.into(), Value::new(value));
    }

    /// Insert a positional argument in front of the others.
    pub fn prepend(&mut self, value: Value) {
        self.positional.insert(0, value);
    }

    /// Positional arguments, in call order.
    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    /// Keyword arguments, in call order.
    pub fn keywords(&self) -> &IndexMap<String, Value> {
        &self.keywords
    }

    /// Total number of arguments.
    pub fn len(&self) -> usize {
        self.positional.len() + self.keywords.len()
    }

    /// Check if there are no arguments.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Summarise the argument types, e.g. `(Circle, scale=f64)`.
    pub fn describe(&self) -> String {
        let positional = self.positional.iter().map(Value::short_type_name);
        let keywords = self
            .keywords
            .iter()
            .map(|(name, value)| format!("{name}={}", value.short_type_name()));
        let parts: Vec<String> = positional.chain(keywords).collect();
        format!("({})", parts.join(", "))
    }
}

impl fmt::Debug for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Build an [`Args`] from positional values and `name = value` keywords.
///
/// ```rust,ignore
/// let args = args![Circle::new(1.0), 2; scale = 0.5];
/// ```
#[macro_export]
macro_rules! args {
    ($($pos:expr),* $(,)? $(; $($key:ident = $kw:expr),* $(,)?)?) => {{
        #[allow(unused_mut)]
        let mut args = $crate::Args::new();
        $( args.push($pos); )*
        $( $( args.push_kw(stringify!($key), $kw); )* )?
        args
    }};
}

/// What one parameter was bound to.
#[derive(Clone, Debug)]
pub enum Binding {
    /// A single value.
    One(Value),
    /// Surplus positional values collected by a variadic parameter.
    Many(Vec<Value>),
    /// Surplus keyword values collected by a variadic keyword parameter.
    Named(IndexMap<String, Value>),
}

/// Arguments bound to a candidate's parameter names.
#[derive(Clone, Debug, Default)]
pub struct Bound {
    entries: IndexMap<String, Binding>,
}

impl Bound {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, name: impl Into<String>, binding: Binding) {
        self.entries.insert(name.into(), binding);
    }

    /// Check if a parameter is bound.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// The raw binding of a parameter.
    pub fn binding(&self, name: &str) -> Option<&Binding> {
        self.entries.get(name)
    }

    /// Iterate over parameter names and their bindings, in binding order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Binding)> {
        self.entries.iter().map(|(name, binding)| (name.as_str(), binding))
    }

    /// The value bound to a single-valued parameter.
    pub fn value(&self, name: &str) -> Option<&Value> {
        match self.entries.get(name) {
            Some(Binding::One(value)) => Some(value),
            _ => None,
        }
    }

    /// The value bound to a single-valued parameter, or an error.
    pub fn require(&self, name: &str) -> Result<&Value, ArgError> {
        self.value(name)
            .ok_or_else(|| ArgError::Missing(name.to_string()))
    }

    /// Borrow the value bound to `name` as a `T`.
    pub fn get<T: Any>(&self, name: &str) -> Result<&T, ArgError> {
        let value = self.require(name)?;
        value.downcast_ref::<T>().ok_or_else(|| ArgError::WrongType {
            name: name.to_string(),
            requested: std::any::type_name::<T>(),
            found: value.short_type_name(),
        })
    }

    /// Get a shared handle to the value bound to `name` as a `T`.
    pub fn get_arc<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>, ArgError> {
        let value = self.require(name)?;
        value.downcast_arc::<T>().ok_or_else(|| ArgError::WrongType {
            name: name.to_string(),
            requested: std::any::type_name::<T>(),
            found: value.short_type_name(),
        })
    }

    /// Values collected by a variadic positional parameter (empty if none).
    pub fn rest(&self, name: &str) -> &[Value] {
        match self.entries.get(name) {
            Some(Binding::Many(values)) => values,
            _ => &[],
        }
    }

    /// Values collected by a variadic keyword parameter.
    pub fn extra(&self, name: &str) -> Option<&IndexMap<String, Value>> {
        match self.entries.get(name) {
            Some(Binding::Named(values)) => Some(values),
            _ => None,
        }
    }

    /// Number of bound parameters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
