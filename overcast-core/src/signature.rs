//! # Signatures and Binding
//!
//! A [`Signature`] is a candidate's declared parameter list. [`Signature::bind`]
//! is the matcher: it assigns an [`Args`] tuple to parameter names exactly as an
//! ordinary call would, then checks every typed parameter's value against its
//! [`TypeDesc`].
//!
//! # Binding rules
//!
//! - Positional arguments fill positional-only, then positional-or-keyword
//!   parameters, in declaration order.
//! - Surplus positional arguments go to the variadic positional parameter, or
//!   the candidate is rejected.
//! - Keywords bind by name to positional-or-keyword and keyword-only
//!   parameters. Unknown keywords (including names of positional-only
//!   parameters) go to the variadic keyword parameter, or reject.
//! - A keyword naming an already bound parameter rejects.
//! - A required parameter left unbound rejects.
//!
//! Defaults are not type-checked; they are filled in by
//! [`Signature::fill_defaults`] once a candidate has been selected.

use crate::{
    args::{Args, Binding, Bound},
    error::BindError,
    types::TypeDesc,
    value::Value,
};
use indexmap::IndexMap;
use std::{any::Any, borrow::Cow, fmt};

/// How a parameter accepts arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Only by position.
    PositionalOnly,
    /// By position or by keyword.
    Positional,
    /// Only by keyword.
    KeywordOnly,
    /// Collects surplus positional arguments.
    VarPositional,
    /// Collects surplus keyword arguments.
    VarKeyword,
}

impl ParamKind {
    fn takes_position(self) -> bool {
        matches!(self, ParamKind::PositionalOnly | ParamKind::Positional)
    }

    fn takes_keyword(self) -> bool {
        matches!(self, ParamKind::Positional | ParamKind::KeywordOnly)
    }

    fn is_variadic(self) -> bool {
        matches!(self, ParamKind::VarPositional | ParamKind::VarKeyword)
    }
}

/// One declared parameter.
#[derive(Clone)]
pub struct Param {
    name: Cow<'static, str>,
    kind: ParamKind,
    ty: Option<TypeDesc>,
    default: Option<Value>,
}

impl Param {
    fn new(name: impl Into<Cow<'static, str>>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ty: None,
            default: None,
        }
    }

    /// A positional-or-keyword parameter.
    pub fn positional(name: impl Into<Cow<'static, str>>) -> Self {
        Self::new(name, ParamKind::Positional)
    }

    /// A positional-only parameter.
    pub fn positional_only(name: impl Into<Cow<'static, str>>) -> Self {
        Self::new(name, ParamKind::PositionalOnly)
    }

    /// A keyword-only parameter.
    pub fn keyword_only(name: impl Into<Cow<'static, str>>) -> Self {
        Self::new(name, ParamKind::KeywordOnly)
    }

    /// A parameter collecting surplus positional arguments.
    pub fn var_positional(name: impl Into<Cow<'static, str>>) -> Self {
        Self::new(name, ParamKind::VarPositional)
    }

    /// A parameter collecting surplus keyword arguments.
    pub fn var_keyword(name: impl Into<Cow<'static, str>>) -> Self {
        Self::new(name, ParamKind::VarKeyword)
    }

    /// Declare the parameter's type. For variadic parameters this applies to
    /// every collected value.
    pub fn typed(mut self, ty: TypeDesc) -> Self {
        self.ty = Some(ty);
        self
    }

    /// Declare the parameter as exactly the Rust type `T`.
    pub fn of<T: Any>(self) -> Self {
        self.typed(TypeDesc::of::<T>())
    }

    /// Make the parameter optional with a default value.
    pub fn with_default<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.default = Some(Value::new(value));
        self
    }

    /// The parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// How the parameter accepts arguments.
    pub fn kind(&self) -> ParamKind {
        self.kind
    }

    /// The declared type, if any.
    pub fn ty(&self) -> Option<&TypeDesc> {
        self.ty.as_ref()
    }

    /// The default value, if any.
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    fn is_required(&self) -> bool {
        self.default.is_none() && !self.kind.is_variadic()
    }

    fn check(&self, value: &Value) -> Result<(), BindError> {
        match &self.ty {
            Some(ty) if !ty.matches(value) => Err(BindError::TypeMismatch {
                param: self.name.to_string(),
                expected: ty.to_string(),
                found: value.short_type_name(),
            }),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ParamKind::VarPositional => write!(f, "*{}", self.name)?,
            ParamKind::VarKeyword => write!(f, "**{}", self.name)?,
            _ => f.write_str(&self.name)?,
        }
        if let Some(ty) = &self.ty {
            write!(f, ": {ty}")?;
        }
        if self.default.is_some() {
            f.write_str(" = ..")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Param({self})")
    }
}

/// A declared parameter list.
#[derive(Clone, Default)]
pub struct Signature {
    params: Vec<Param>,
}

impl Signature {
    /// Create a signature from parameters in declaration order.
    pub fn new(params: impl IntoIterator<Item = Param>) -> Self {
        Self {
            params: params.into_iter().collect(),
        }
    }

    /// Append a parameter.
    pub fn push(&mut self, param: Param) {
        self.params.push(param);
    }

    /// The parameters in declaration order.
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Look up a parameter by name.
    pub fn param(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Check if the signature takes no parameters.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Bind `args` to this signature and check declared types.
    ///
    /// Returns the bound arguments (without defaults) if the candidate
    /// accepts the call, or the first reason it does not.
    pub fn bind(&self, args: &Args) -> Result<Bound, BindError> {
        let mut slots: Vec<Option<Binding>> = vec![None; self.params.len()];

        // Positional arguments
        let mut positional = args.positional().iter();
        for (slot, param) in slots.iter_mut().zip(&self.params) {
            if !param.kind.takes_position() {
                continue;
            }
            match positional.next() {
                Some(value) => *slot = Some(Binding::One(value.clone())),
                None => break,
            }
        }
        let surplus: Vec<Value> = positional.cloned().collect();
        let var_positional = self.index_of(ParamKind::VarPositional);
        match var_positional {
            Some(index) => slots[index] = Some(Binding::Many(surplus)),
            None if !surplus.is_empty() => {
                return Err(BindError::TooManyPositional {
                    expected: self.params.iter().filter(|p| p.kind.takes_position()).count(),
                    given: args.positional().len(),
                });
            }
            None => {}
        }

        // Keyword arguments
        let var_keyword = self.index_of(ParamKind::VarKeyword);
        let mut extra = IndexMap::new();
        for (name, value) in args.keywords() {
            let target = self
                .params
                .iter()
                .position(|p| p.kind.takes_keyword() && p.name == name.as_str());
            match target {
                Some(index) if slots[index].is_some() => {
                    return Err(BindError::DuplicateArgument(name.clone()));
                }
                Some(index) => slots[index] = Some(Binding::One(value.clone())),
                None if var_keyword.is_some() => {
                    extra.insert(name.clone(), value.clone());
                }
                None => return Err(BindError::UnexpectedKeyword(name.clone())),
            }
        }
        if let Some(index) = var_keyword {
            slots[index] = Some(Binding::Named(extra));
        }

        // Required parameters and declared types
        let mut bound = Bound::new();
        for (slot, param) in slots.into_iter().zip(&self.params) {
            match slot {
                Some(binding) => {
                    match &binding {
                        Binding::One(value) => param.check(value)?,
                        Binding::Many(values) => {
                            values.iter().try_for_each(|value| param.check(value))?
                        }
                        Binding::Named(values) => {
                            values.values().try_for_each(|value| param.check(value))?
                        }
                    }
                    bound.insert(param.name.clone(), binding);
                }
                None if param.is_required() => {
                    return Err(BindError::MissingArgument(param.name.to_string()));
                }
                None => {}
            }
        }
        Ok(bound)
    }

    /// Fill unbound parameters that declare a default.
    pub fn fill_defaults(&self, bound: &mut Bound) {
        for param in &self.params {
            if let Some(default) = &param.default {
                if !bound.contains(&param.name) {
                    bound.insert(param.name.clone(), Binding::One(default.clone()));
                }
            }
        }
    }

    fn index_of(&self, kind: ParamKind) -> Option<usize> {
        self.params.iter().position(|p| p.kind == kind)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{param}")?;
        }
        f.write_str(")")
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature{self}")
    }
}

impl FromIterator<Param> for Signature {
    fn from_iter<I: IntoIterator<Item = Param>>(iter: I) -> Self {
        Self::new(iter)
    }
}
