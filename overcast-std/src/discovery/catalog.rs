//! The catalog: an immutable table of scopes, types and their members.
//!
//! Discovery never scans modules at runtime. Instead, the operations that may
//! become siblings are declared up front with a [`CatalogBuilder`]:
//!
//! ```rust,ignore
//! let catalog = Catalog::builder()
//!     .scope("geometry", |scope| {
//!         scope
//!             .function(Arc::clone(&area))
//!             .overload(area_circle())
//!             .overload(area_square())
//!             .type_of::<Circle>(|ty| ty.parent("Shape").member(circle_scale()))
//!             .type_named("Shape", |ty| ty)
//!     })
//!     .build()?;
//! ```
//!
//! Calling `scope`, `type_of` or `type_named` again with the same name extends
//! the existing declaration.

use indexmap::IndexMap;
use overcast_core::{Candidate, DiscoveryError, Value, short_type_name};
use std::{
    any::{TypeId, type_name},
    collections::HashMap,
    fmt,
    sync::Arc,
};

/// The fully qualified location of a type: its scope and its name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypePath {
    scope: String,
    name: String,
}

impl TypePath {
    /// Create a path from a scope and a type name.
    pub fn new(scope: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            name: name.into(),
        }
    }

    /// Resolve `reference` relative to `scope`.
    ///
    /// A bare name refers to a type in `scope`; `a::b::Name` refers to `Name`
    /// in scope `a::b`.
    pub fn resolve(scope: &str, reference: &str) -> Self {
        match reference.rsplit_once("::") {
            Some((other, name)) => Self::new(other, name),
            None => Self::new(scope, reference),
        }
    }

    /// The scope the type is declared in.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// The type name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for TypePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scope.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}::{}", self.scope, self.name)
        }
    }
}

/// One named operation in a scope or type.
///
/// An entry has an implementation, an explicit overload group, or both.
#[derive(Clone, Default)]
pub struct Entry {
    implementation: Option<Arc<Candidate>>,
    overloads: Vec<Arc<Candidate>>,
}

impl Entry {
    /// The declared implementation.
    pub fn implementation(&self) -> Option<&Arc<Candidate>> {
        self.implementation.as_ref()
    }

    /// The explicit overload group, in declaration order.
    pub fn overloads(&self) -> &[Arc<Candidate>] {
        &self.overloads
    }

    /// The candidates discovery yields for this entry: the overload group when
    /// one was declared, otherwise the implementation alone.
    pub fn group(&self) -> Vec<Arc<Candidate>> {
        if self.overloads.is_empty() {
            self.implementation.iter().cloned().collect()
        } else {
            self.overloads.clone()
        }
    }

    /// The implementation, or the overload group when there is none.
    pub(crate) fn declared(&self) -> Vec<Arc<Candidate>> {
        match &self.implementation {
            Some(implementation) => vec![Arc::clone(implementation)],
            None => self.overloads.clone(),
        }
    }

    fn set_implementation(&mut self, candidate: Arc<Candidate>) {
        self.implementation = Some(candidate);
    }

    fn push_overload(&mut self, candidate: Arc<Candidate>) {
        self.overloads.push(candidate);
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("implementation", &self.implementation.as_ref().map(|c| c.id()))
            .field("overloads", &self.overloads.len())
            .finish()
    }
}

/// A declared type: its parents and its own members.
#[derive(Debug, Clone)]
pub struct TypeEntry {
    path: TypePath,
    type_id: Option<TypeId>,
    parents: Vec<TypePath>,
    members: IndexMap<String, Entry>,
}

impl TypeEntry {
    /// Where the type is declared.
    pub fn path(&self) -> &TypePath {
        &self.path
    }

    /// The Rust type backing this entry, if it was declared with one.
    pub fn type_id(&self) -> Option<TypeId> {
        self.type_id
    }

    /// Direct parents, in declaration order.
    pub fn parents(&self) -> &[TypePath] {
        &self.parents
    }

    /// The type's own member named `name`. Inherited members are not included.
    pub fn member(&self, name: &str) -> Option<&Entry> {
        self.members.get(name)
    }

    /// The type's own members, in declaration order.
    pub fn members(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.members.iter().map(|(name, entry)| (name.as_str(), entry))
    }
}

/// A scope: free operations and types declared together.
#[derive(Debug, Clone)]
pub struct Scope {
    name: String,
    functions: IndexMap<String, Entry>,
    types: IndexMap<String, TypeEntry>,
}

impl Scope {
    /// The scope name, e.g. a module path.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The free operation named `name`.
    pub fn function(&self, name: &str) -> Option<&Entry> {
        self.functions.get(name)
    }

    /// The type named `name`.
    pub fn type_entry(&self, name: &str) -> Option<&TypeEntry> {
        self.types.get(name)
    }

    /// Types declared in this scope.
    pub fn types(&self) -> impl Iterator<Item = &TypeEntry> {
        self.types.values()
    }
}

/// An immutable table of scopes and types.
///
/// The reflection collaborator of the [`Discoverer`](super::Discoverer).
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    scopes: IndexMap<String, Scope>,
    by_type_id: HashMap<TypeId, TypePath>,
}

impl Catalog {
    /// Start building a catalog.
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::new()
    }

    /// The scope named `name`.
    pub fn scope(&self, name: &str) -> Option<&Scope> {
        self.scopes.get(name)
    }

    /// All scopes, in declaration order.
    pub fn scopes(&self) -> impl Iterator<Item = &Scope> {
        self.scopes.values()
    }

    /// The type at `path`.
    pub fn type_entry(&self, path: &TypePath) -> Result<&TypeEntry, DiscoveryError> {
        self.scope(path.scope())
            .ok_or_else(|| DiscoveryError::UnknownScope(path.scope().to_string()))?
            .type_entry(path.name())
            .ok_or_else(|| DiscoveryError::UnknownType {
                scope: path.scope().to_string(),
                name: path.name().to_string(),
            })
    }

    /// The type entry declared for the Rust type `T`.
    pub fn type_of<T: 'static>(&self) -> Option<&TypeEntry> {
        self.type_by_id(TypeId::of::<T>())
    }

    /// The type entry matching a value's runtime type.
    pub fn type_of_value(&self, value: &Value) -> Option<&TypeEntry> {
        self.type_by_id(value.type_id())
    }

    /// Returns `true` if `candidate` is a member of a type.
    pub fn is_member(&self, candidate: &Candidate) -> bool {
        candidate.is_member()
    }

    /// The type that owns the member `candidate`.
    ///
    /// A bound receiver's runtime type takes precedence. Otherwise the owner
    /// is everything before the last `::` of the candidate's qualified name,
    /// looked up in its defining scope.
    pub fn owner_of(&self, candidate: &Candidate) -> Result<&TypeEntry, DiscoveryError> {
        if let Some(receiver) = candidate.receiver() {
            return self
                .type_of_value(receiver)
                .ok_or_else(|| DiscoveryError::UnknownReceiverType(receiver.short_type_name()));
        }

        let (owner, _) = candidate
            .qualname()
            .rsplit_once("::")
            .ok_or_else(|| DiscoveryError::UnresolvedOwner(candidate.display_name()))?;
        self.type_entry(&TypePath::resolve(candidate.scope(), owner))
    }

    fn type_by_id(&self, id: TypeId) -> Option<&TypeEntry> {
        let path = self.by_type_id.get(&id)?;
        self.scope(path.scope())?.type_entry(path.name())
    }
}

/// Builder for constructing a [`Catalog`].
#[derive(Default)]
pub struct CatalogBuilder {
    scopes: IndexMap<String, ScopeBuilder>,
}

impl CatalogBuilder {
    /// Create a new empty catalog builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare or extend the scope `name`.
    pub fn scope<F>(mut self, name: impl Into<String>, declare: F) -> Self
    where
        F: FnOnce(ScopeBuilder) -> ScopeBuilder,
    {
        let name = name.into();
        let scope = self
            .scopes
            .shift_remove(&name)
            .unwrap_or_else(|| ScopeBuilder::new(name.clone()));
        self.scopes.insert(name, declare(scope));
        self
    }

    /// Add a candidate to the overload group it belongs to.
    ///
    /// Members go into their owning type's group (the type is declared by
    /// name if needed), free candidates into their scope's.
    pub fn overload(self, candidate: impl Into<Arc<Candidate>>) -> Self {
        let candidate = candidate.into();
        let scope = candidate.scope().to_string();
        let owner = candidate
            .qualname()
            .rsplit_once("::")
            .map(|(owner, _)| owner.to_string());

        match owner {
            Some(owner) => {
                let path = TypePath::resolve(&scope, &owner);
                self.scope(path.scope().to_string(), |s| {
                    s.type_named(path.name().to_string(), |ty| ty.overload(candidate))
                })
            }
            None => self.scope(scope, |s| s.overload(candidate)),
        }
    }

    /// Build the catalog.
    ///
    /// Fails if a declared parent does not exist.
    pub fn build(self) -> Result<Catalog, DiscoveryError> {
        let mut catalog = Catalog::default();
        for (name, scope) in self.scopes {
            let scope = scope.finish();
            for ty in scope.types.values() {
                if let Some(id) = ty.type_id {
                    catalog.by_type_id.insert(id, ty.path.clone());
                }
            }
            catalog.scopes.insert(name, scope);
        }

        for scope in catalog.scopes.values() {
            for ty in scope.types.values() {
                for parent in &ty.parents {
                    catalog.type_entry(parent)?;
                }
            }
        }
        Ok(catalog)
    }
}

/// Declares the contents of one scope.
pub struct ScopeBuilder {
    name: String,
    functions: IndexMap<String, Entry>,
    types: IndexMap<String, TypeBuilder>,
}

impl ScopeBuilder {
    fn new(name: String) -> Self {
        Self {
            name,
            functions: IndexMap::new(),
            types: IndexMap::new(),
        }
    }

    /// Declare the implementation of a free operation, under its name.
    pub fn function(mut self, candidate: impl Into<Arc<Candidate>>) -> Self {
        let candidate = candidate.into();
        self.functions
            .entry(candidate.name().to_string())
            .or_default()
            .set_implementation(candidate);
        self
    }

    /// Append to the overload group of a free operation, under its name.
    pub fn overload(mut self, candidate: impl Into<Arc<Candidate>>) -> Self {
        let candidate = candidate.into();
        self.functions
            .entry(candidate.name().to_string())
            .or_default()
            .push_overload(candidate);
        self
    }

    /// Declare or extend a type backed by the Rust type `T`.
    ///
    /// The type is named after `T`'s last path segment.
    pub fn type_of<T: 'static>(self, declare: impl FnOnce(TypeBuilder) -> TypeBuilder) -> Self {
        let name = short_type_name(type_name::<T>());
        self.declare_type(name, Some(TypeId::of::<T>()), declare)
    }

    /// Declare or extend a type known only by name, such as an abstract base.
    pub fn type_named(
        self,
        name: impl Into<String>,
        declare: impl FnOnce(TypeBuilder) -> TypeBuilder,
    ) -> Self {
        self.declare_type(name.into(), None, declare)
    }

    fn declare_type(
        mut self,
        name: String,
        type_id: Option<TypeId>,
        declare: impl FnOnce(TypeBuilder) -> TypeBuilder,
    ) -> Self {
        let mut ty = self
            .types
            .shift_remove(&name)
            .unwrap_or_else(|| TypeBuilder::new(TypePath::new(self.name.clone(), name.clone())));
        if type_id.is_some() {
            ty.type_id = type_id;
        }
        self.types.insert(name, declare(ty));
        self
    }

    fn finish(self) -> Scope {
        Scope {
            name: self.name,
            functions: self.functions,
            types: self
                .types
                .into_iter()
                .map(|(name, ty)| (name, ty.finish()))
                .collect(),
        }
    }
}

/// Declares one type.
pub struct TypeBuilder {
    path: TypePath,
    type_id: Option<TypeId>,
    parents: Vec<TypePath>,
    members: IndexMap<String, Entry>,
}

impl TypeBuilder {
    fn new(path: TypePath) -> Self {
        Self {
            path,
            type_id: None,
            parents: Vec::new(),
            members: IndexMap::new(),
        }
    }

    /// Add a direct parent. A bare name refers to the same scope.
    pub fn parent(mut self, reference: &str) -> Self {
        self.parents
            .push(TypePath::resolve(self.path.scope(), reference));
        self
    }

    /// Declare a member implementation, under its name.
    pub fn member(mut self, candidate: impl Into<Arc<Candidate>>) -> Self {
        let candidate = candidate.into();
        self.members
            .entry(candidate.name().to_string())
            .or_default()
            .set_implementation(candidate);
        self
    }

    /// Append to a member's overload group, under its name.
    pub fn overload(mut self, candidate: impl Into<Arc<Candidate>>) -> Self {
        let candidate = candidate.into();
        self.members
            .entry(candidate.name().to_string())
            .or_default()
            .push_overload(candidate);
        self
    }

    fn finish(self) -> TypeEntry {
        TypeEntry {
            path: self.path,
            type_id: self.type_id,
            parents: self.parents,
            members: self.members,
        }
    }
}
