//! Named, polymorphically typed registries.
//!
//! A [`NamedTypedRegistry`] holds objects of one base type `B` keyed by a
//! unique name, in creation order. Objects are only created through the
//! registry, and only as one of the concrete subtypes the registry was set up
//! with: each accepted subtype carries a zero-argument factory registered
//! ahead of time, so there is no reflective instantiation at call time.
//!
//! The base type is usually a trait object (`dyn NativeLibrary`). Concrete
//! types opt in to a base through [`Subtype`], and are recovered from it
//! through [`DomainObject`].

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::marker::PhantomData;

use indexmap::IndexMap;
use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::core::ErrorKind;

/// An object that can be narrowed back to its concrete type.
///
/// Implemented for every `'static` type; trait objects get it by declaring
/// `DomainObject` as a supertrait.
pub trait DomainObject: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> DomainObject for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A concrete type that can be stored in a registry with base type `B`.
///
/// `upcast` must return the same object it was given. A registry rejects a
/// factory whose upcast produces a different concrete type.
pub trait Subtype<B: ?Sized>: Sized + Send + Sync + 'static {
    fn upcast(self: Box<Self>) -> Box<B>;
}

/// Runtime descriptor of a concrete type: its `TypeId` plus a readable name.
#[derive(Clone, Copy)]
pub struct TypeDescriptor {
    id: TypeId,
    name: &'static str,
}

impl TypeDescriptor {
    /// Describe `T`.
    pub fn of<T: Any>() -> Self {
        TypeDescriptor {
            id: TypeId::of::<T>(),
            name: short_type_name(type_name::<T>()),
        }
    }

    /// The `TypeId` of the described type.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The unqualified type name, e.g. `StaticLibrary`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Check whether this descriptor describes `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeDescriptor {}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Strip the module path from a type name, keeping generic arguments intact.
fn short_type_name(full: &'static str) -> &'static str {
    let head_end = full.find('<').unwrap_or(full.len());
    match full[..head_end].rfind("::") {
        Some(pos) => &full[pos + 2..],
        None => full,
    }
}

/// Error from a registry operation.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum RegistryError {
    #[error("cannot add {element} `{name}`: the name is already in use")]
    #[diagnostic(
        code(slipway::registry::duplicate_name),
        help("choose a different name or configure the existing {element}")
    )]
    DuplicateName { element: &'static str, name: String },

    #[error("cannot create {element} `{name}` as `{requested}`: no factory is registered for that type")]
    #[diagnostic(
        code(slipway::registry::unsupported_type),
        help("supported types: {supported}")
    )]
    UnsupportedType {
        element: &'static str,
        name: String,
        requested: &'static str,
        supported: String,
    },

    #[error("the factory registered for `{requested}` produced a different type while creating {element} `{name}`")]
    #[diagnostic(code(slipway::registry::factory_mismatch))]
    FactoryMismatch {
        element: &'static str,
        name: String,
        requested: &'static str,
    },

    #[error("{element} with name `{name}` not found")]
    #[diagnostic(code(slipway::registry::not_found))]
    NotFound {
        element: &'static str,
        name: String,
        available: Vec<String>,
    },
}

impl RegistryError {
    /// The failure category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RegistryError::DuplicateName { .. } => ErrorKind::InvalidInput,
            RegistryError::UnsupportedType { .. } | RegistryError::FactoryMismatch { .. } => {
                ErrorKind::UnsupportedType
            }
            RegistryError::NotFound { .. } => ErrorKind::NotFound,
        }
    }
}

struct TypedFactory<U>(Box<dyn Fn() -> U + Send + Sync>);

struct FactoryEntry {
    declared: TypeDescriptor,
    // Always a `TypedFactory<U>` where `U` is the type `declared` describes.
    factory: Box<dyn Any + Send + Sync>,
}

struct Entry<B: ?Sized> {
    declared: TypeDescriptor,
    value: Box<B>,
}

/// An order-preserving collection of uniquely named objects of base type `B`.
pub struct NamedTypedRegistry<B: ?Sized + DomainObject> {
    /// What the registry holds, for messages ("library", "repository", ...)
    element: &'static str,
    factories: IndexMap<TypeId, FactoryEntry>,
    entries: IndexMap<String, Entry<B>>,
}

impl<B: ?Sized + DomainObject> NamedTypedRegistry<B> {
    /// Create an empty registry that accepts no types yet.
    pub fn new(element: &'static str) -> Self {
        NamedTypedRegistry {
            element,
            factories: IndexMap::new(),
            entries: IndexMap::new(),
        }
    }

    /// Accept `U` as a creatable subtype, built by `factory`.
    ///
    /// Registering the same type again replaces its factory.
    pub fn register<U, F>(&mut self, factory: F) -> &mut Self
    where
        U: Subtype<B>,
        F: Fn() -> U + Send + Sync + 'static,
    {
        let declared = TypeDescriptor::of::<U>();
        tracing::trace!(element = self.element, ty = declared.name(), "registered factory");
        self.factories.insert(
            declared.id(),
            FactoryEntry {
                declared,
                factory: Box::new(TypedFactory::<U>(Box::new(factory))),
            },
        );
        self
    }

    /// Builder form of [`register`](Self::register).
    pub fn with_factory<U, F>(mut self, factory: F) -> Self
    where
        U: Subtype<B>,
        F: Fn() -> U + Send + Sync + 'static,
    {
        self.register(factory);
        self
    }

    /// The accepted subtypes, in registration order.
    pub fn supported_types(&self) -> impl Iterator<Item = TypeDescriptor> + '_ {
        self.factories.values().map(|f| f.declared)
    }

    /// What this registry holds, e.g. `"library"`.
    pub fn element(&self) -> &'static str {
        self.element
    }

    /// Create a `U` named `name` and add it.
    pub fn create<U>(&mut self, name: impl Into<String>) -> Result<&mut U, RegistryError>
    where
        U: Subtype<B>,
    {
        self.create_with(name, |_: &mut U| {})
    }

    /// Create a `U` named `name`, run `configure` on it, then add it.
    ///
    /// The name and type are checked before the factory runs, and `configure`
    /// sees the object before it is stored, so a failed call leaves the
    /// registry untouched and never invokes `configure`.
    pub fn create_with<U, F>(
        &mut self,
        name: impl Into<String>,
        configure: F,
    ) -> Result<&mut U, RegistryError>
    where
        U: Subtype<B>,
        F: FnOnce(&mut U),
    {
        let name = name.into();
        if self.entries.contains_key(&name) {
            return Err(RegistryError::DuplicateName {
                element: self.element,
                name,
            });
        }

        let requested = TypeDescriptor::of::<U>();
        let factory = match self
            .factories
            .get(&requested.id())
            .and_then(|entry| entry.factory.downcast_ref::<TypedFactory<U>>())
        {
            Some(factory) => factory,
            None => {
                return Err(RegistryError::UnsupportedType {
                    element: self.element,
                    name,
                    requested: requested.name(),
                    supported: self.supported_type_list(),
                })
            }
        };

        let mut value = (factory.0)();
        configure(&mut value);

        let value: Box<B> = <U as Subtype<B>>::upcast(Box::new(value));
        if !<B as DomainObject>::as_any(&*value).is::<U>() {
            return Err(RegistryError::FactoryMismatch {
                element: self.element,
                name,
                requested: requested.name(),
            });
        }

        tracing::debug!(element = self.element, name = %name, ty = requested.name(), "created");

        let element = self.element;
        let (index, _) = self.entries.insert_full(
            name.clone(),
            Entry {
                declared: requested,
                value,
            },
        );
        <B as DomainObject>::as_any_mut(&mut *self.entries[index].value)
            .downcast_mut::<U>()
            .ok_or(RegistryError::FactoryMismatch {
                element,
                name,
                requested: requested.name(),
            })
    }

    /// Look up an object by exact name, failing if it is absent.
    pub fn get_by_name(&self, name: &str) -> Result<&B, RegistryError> {
        self.find_by_name(name).ok_or_else(|| self.not_found(name))
    }

    /// Mutable form of [`get_by_name`](Self::get_by_name).
    pub fn get_by_name_mut(&mut self, name: &str) -> Result<&mut B, RegistryError> {
        match self.entries.get_index_of(name) {
            Some(index) => Ok(&mut *self.entries[index].value),
            None => Err(self.not_found(name)),
        }
    }

    /// Look up an object by exact name.
    pub fn find_by_name(&self, name: &str) -> Option<&B> {
        self.entries.get(name).map(|entry| &*entry.value)
    }

    /// Look up an object by name and narrow it to `U`.
    pub fn get_as<U: Any>(&self, name: &str) -> Option<&U> {
        self.find_by_name(name)
            .and_then(|value| <B as DomainObject>::as_any(value).downcast_ref::<U>())
    }

    /// Mutable form of [`get_as`](Self::get_as).
    pub fn get_as_mut<U: Any>(&mut self, name: &str) -> Option<&mut U> {
        self.entries
            .get_mut(name)
            .and_then(|entry| <B as DomainObject>::as_any_mut(&mut *entry.value).downcast_mut::<U>())
    }

    /// The type an object was created as.
    pub fn declared_type(&self, name: &str) -> Option<TypeDescriptor> {
        self.entries.get(name).map(|entry| entry.declared)
    }

    /// A lazy, restartable view over the objects created as `U`, in creation order.
    pub fn with_type<U: Any>(&self) -> TypedView<'_, B, U> {
        TypedView {
            entries: &self.entries,
            _marker: PhantomData,
        }
    }

    /// Iterate over all objects in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &B)> + '_ {
        self.entries
            .iter()
            .map(|(name, entry)| (name.as_str(), &*entry.value))
    }

    /// Object names in creation order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    /// Check whether an object with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of objects.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the registry holds no objects.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn not_found(&self, name: &str) -> RegistryError {
        RegistryError::NotFound {
            element: self.element,
            name: name.to_string(),
            available: self.entries.keys().cloned().collect(),
        }
    }

    fn supported_type_list(&self) -> String {
        if self.factories.is_empty() {
            return "(none)".to_string();
        }
        self.supported_types()
            .map(|t| t.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl<B: ?Sized + DomainObject> fmt::Debug for NamedTypedRegistry<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedTypedRegistry")
            .field("element", &self.element)
            .field(
                "types",
                &self.factories.values().map(|f| f.declared).collect::<Vec<_>>(),
            )
            .field(
                "entries",
                &self
                    .entries
                    .iter()
                    .map(|(name, entry)| (name.as_str(), entry.declared))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Objects of a registry that were created as `U`.
///
/// The view borrows the registry and filters on every iteration, so it
/// always reflects the registry's current contents and can be iterated any
/// number of times.
pub struct TypedView<'a, B: ?Sized + DomainObject, U> {
    entries: &'a IndexMap<String, Entry<B>>,
    _marker: PhantomData<fn() -> U>,
}

impl<B: ?Sized + DomainObject, U> Clone for TypedView<'_, B, U> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B: ?Sized + DomainObject, U> Copy for TypedView<'_, B, U> {}

impl<'a, B: ?Sized + DomainObject, U: Any> TypedView<'a, B, U> {
    /// Start a fresh iteration over `(name, object)` pairs.
    pub fn iter(&self) -> TypedIter<'a, B, U> {
        TypedIter {
            inner: self.entries.iter(),
            _marker: PhantomData,
        }
    }

    /// Names of the matching objects.
    pub fn names(&self) -> impl Iterator<Item = &'a str> {
        self.iter().map(|(name, _)| name)
    }

    /// Number of matching objects.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Check whether nothing matches.
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

impl<'a, B: ?Sized + DomainObject, U: Any> IntoIterator for TypedView<'a, B, U> {
    type Item = (&'a str, &'a U);
    type IntoIter = TypedIter<'a, B, U>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, B: ?Sized + DomainObject, U: Any> IntoIterator for &TypedView<'a, B, U> {
    type Item = (&'a str, &'a U);
    type IntoIter = TypedIter<'a, B, U>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator produced by [`TypedView::iter`].
pub struct TypedIter<'a, B: ?Sized, U> {
    inner: indexmap::map::Iter<'a, String, Entry<B>>,
    _marker: PhantomData<fn() -> U>,
}

impl<'a, B: ?Sized + DomainObject, U: Any> Iterator for TypedIter<'a, B, U> {
    type Item = (&'a str, &'a U);

    fn next(&mut self) -> Option<Self::Item> {
        for (name, entry) in self.inner.by_ref() {
            if !entry.declared.is::<U>() {
                continue;
            }
            if let Some(value) = <B as DomainObject>::as_any(&*entry.value).downcast_ref::<U>() {
                return Some((name.as_str(), value));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::sync::{Arc, Mutex};
    use std::thread;

    use super::*;

    trait Shape: DomainObject + std::fmt::Debug + Send + Sync {
        fn sides(&self) -> u32;
    }

    impl<T: Shape> Subtype<dyn Shape> for T {
        fn upcast(self: Box<Self>) -> Box<dyn Shape> {
            self
        }
    }

    #[derive(Debug, Default)]
    struct Triangle {
        label: String,
    }

    #[derive(Debug, Default)]
    struct Square;

    #[derive(Debug, Default)]
    struct Circle;

    impl Shape for Triangle {
        fn sides(&self) -> u32 {
            3
        }
    }

    impl Shape for Square {
        fn sides(&self) -> u32 {
            4
        }
    }

    impl Shape for Circle {
        fn sides(&self) -> u32 {
            0
        }
    }

    fn shapes() -> NamedTypedRegistry<dyn Shape> {
        NamedTypedRegistry::new("shape")
            .with_factory(Triangle::default)
            .with_factory(|| Square)
    }

    #[test]
    fn test_create_distinct_names() {
        let mut registry = shapes();
        registry.create::<Triangle>("a").unwrap();
        registry.create::<Square>("b").unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get_by_name("a").unwrap().sides(), 3);
        assert_eq!(registry.get_by_name("b").unwrap().sides(), 4);
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_duplicate_name_keeps_first() {
        let mut registry = shapes();
        registry
            .create_with::<Triangle, _>("dup", |t| t.label = "first".to_string())
            .unwrap();

        let err = registry.create::<Square>("dup").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(err.to_string().contains("`dup`"));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get_as::<Triangle>("dup").unwrap().label, "first");
        assert!(registry.declared_type("dup").unwrap().is::<Triangle>());
    }

    #[test]
    fn test_unsupported_type() {
        let mut registry = shapes();
        let err = registry.create::<Circle>("round").unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UnsupportedType);
        match err {
            RegistryError::UnsupportedType {
                requested,
                supported,
                ..
            } => {
                assert_eq!(requested, "Circle");
                assert_eq!(supported, "Triangle, Square");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn test_duplicate_checked_before_type() {
        let mut registry = shapes();
        registry.create::<Square>("x").unwrap();

        let err = registry.create::<Circle>("x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_configure_runs_once_before_visible() {
        let mut registry = shapes();
        let calls = Cell::new(0);

        let created = registry
            .create_with::<Triangle, _>("t", |t| {
                calls.set(calls.get() + 1);
                t.label = "configured".to_string();
            })
            .unwrap();
        assert_eq!(created.label, "configured");
        assert_eq!(calls.get(), 1);
        assert_eq!(registry.get_as::<Triangle>("t").unwrap().label, "configured");
    }

    #[test]
    fn test_configure_not_invoked_on_failure() {
        let mut registry = shapes();
        registry.create::<Triangle>("t").unwrap();
        let calls = Cell::new(0);

        let dup = registry.create_with::<Triangle, _>("t", |_| calls.set(calls.get() + 1));
        assert!(dup.is_err());
        let unsupported = registry.create_with::<Circle, _>("c", |_| calls.set(calls.get() + 1));
        assert!(unsupported.is_err());

        assert_eq!(calls.get(), 0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_get_by_name_not_found() {
        let mut registry = shapes();
        registry.create::<Square>("present").unwrap();

        let err = registry.get_by_name("missing").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "shape with name `missing` not found");
        match err {
            RegistryError::NotFound { available, .. } => assert_eq!(available, vec!["present"]),
            other => panic!("unexpected error: {other}"),
        }
        assert!(registry.find_by_name("missing").is_none());
    }

    #[test]
    fn test_with_type_filters_in_order() {
        let mut registry = shapes();
        registry.create::<Triangle>("t1").unwrap();
        registry.create::<Square>("s1").unwrap();
        registry.create::<Triangle>("t2").unwrap();

        let triangles = registry.with_type::<Triangle>();
        assert_eq!(triangles.names().collect::<Vec<_>>(), vec!["t1", "t2"]);

        // Restartable: a second pass yields the same sequence
        assert_eq!(triangles.len(), 2);
        assert_eq!(triangles.iter().count(), 2);

        let squares: Vec<_> = registry.with_type::<Square>().names().collect();
        assert_eq!(squares, vec!["s1"]);
    }

    #[test]
    fn test_with_type_empty_when_nothing_matches() {
        let mut registry = shapes();
        registry.create::<Square>("s").unwrap();

        let circles = registry.with_type::<Circle>();
        assert!(circles.is_empty());
        assert_eq!(circles.into_iter().count(), 0);
    }

    #[test]
    fn test_mutable_access() {
        let mut registry = shapes();
        registry.create::<Triangle>("t").unwrap();

        registry.get_as_mut::<Triangle>("t").unwrap().label = "edited".to_string();
        assert_eq!(registry.get_as::<Triangle>("t").unwrap().label, "edited");

        assert!(registry.get_by_name_mut("t").is_ok());
        assert_eq!(
            registry.get_by_name_mut("nope").unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn test_reregistering_replaces_factory() {
        let mut registry = shapes();
        registry.register(|| Triangle {
            label: "from new factory".to_string(),
        });

        assert_eq!(registry.supported_types().count(), 2);
        let t = registry.create::<Triangle>("t").unwrap();
        assert_eq!(t.label, "from new factory");
    }

    trait Tool: DomainObject + std::fmt::Debug + Send + Sync {}

    #[derive(Debug)]
    struct Hammer;
    #[derive(Debug)]
    struct Wrench;

    impl Tool for Hammer {}
    impl Tool for Wrench {}

    impl Subtype<dyn Tool> for Hammer {
        fn upcast(self: Box<Self>) -> Box<dyn Tool> {
            Box::new(Wrench)
        }
    }

    #[test]
    fn test_factory_mismatch_rejected() {
        let mut tools: NamedTypedRegistry<dyn Tool> =
            NamedTypedRegistry::new("tool").with_factory(|| Hammer);

        let err = tools.create::<Hammer>("h").unwrap_err();
        assert!(matches!(err, RegistryError::FactoryMismatch { .. }));
        assert!(tools.is_empty());
    }

    #[test]
    fn test_external_lock_for_concurrent_creation() {
        let registry = Arc::new(Mutex::new(shapes()));

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    let mut registry = registry.lock().unwrap();
                    registry.create::<Square>(format!("square-{i}")).map(|_| ())
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap().unwrap();
        }
        assert_eq!(registry.lock().unwrap().len(), 4);
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name("a::b::Thing"), "Thing");
        assert_eq!(short_type_name("Thing"), "Thing");
        assert_eq!(
            short_type_name("alloc::vec::Vec<alloc::string::String>"),
            "Vec<alloc::string::String>"
        );
    }
}
