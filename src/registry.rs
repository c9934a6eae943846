//! Discriminator → factory lookup for polymorphic sequence elements.
use std::any::{Any, TypeId};
use std::fmt;

use indexmap::IndexMap;
use once_cell::sync::Lazy;

use crate::shape::short_type_name;

type Factory<I> = Box<dyn Fn() -> Box<I> + Send + Sync>;

struct Interface {
    name: String,
    // each value is a `Factory<I>` for the interface keyed above
    factories: IndexMap<String, Box<dyn Any + Send + Sync>>,
}

/// Factories grouped by the trait-object interface they produce, so the same
/// discriminator can mean different things for different element types.
///
/// Read-only once built; share it freely between threads.
#[derive(Default)]
pub struct TypeRegistry {
    interfaces: IndexMap<TypeId, Interface>,
}

pub(crate) static EMPTY: Lazy<TypeRegistry> = Lazy::new(TypeRegistry::new);

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `factory` under `name` for elements of type `Box<I>`.
    /// A later registration with the same name replaces the earlier one.
    pub fn register<I, F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        I: ?Sized + 'static,
        F: Fn() -> Box<I> + Send + Sync + 'static,
    {
        let factory: Factory<I> = Box::new(factory);
        self.interfaces
            .entry(TypeId::of::<I>())
            .or_insert_with(|| Interface { name: short_type_name::<I>(), factories: IndexMap::new() })
            .factories
            .insert(name.into(), Box::new(factory));
        self
    }

    /// Builder form of [`TypeRegistry::register`].
    pub fn with<I, F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        I: ?Sized + 'static,
        F: Fn() -> Box<I> + Send + Sync + 'static,
    {
        self.register(name, factory);
        self
    }

    pub fn instantiate<I: ?Sized + 'static>(&self, name: &str) -> Option<Box<I>> {
        let factory = self
            .interfaces
            .get(&TypeId::of::<I>())?
            .factories
            .get(name)?
            .downcast_ref::<Factory<I>>()?;
        Some(factory())
    }

    /// Registered discriminators for `I`, in registration order.
    pub fn names<I: ?Sized + 'static>(&self) -> Vec<String> {
        self.interfaces
            .get(&TypeId::of::<I>())
            .map(|interface| interface.factories.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.interfaces.values().all(|interface| interface.factories.is_empty())
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for interface in self.interfaces.values() {
            map.entry(&interface.name, &interface.factories.keys().collect::<Vec<_>>());
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Shape {
        fn sides(&self) -> u8;
    }
    trait Tool {
        fn label(&self) -> &'static str;
    }

    struct Square;
    struct Hammer;

    impl Shape for Square {
        fn sides(&self) -> u8 { 4 }
    }
    impl Tool for Hammer {
        fn label(&self) -> &'static str { "hammer" }
    }

    #[test]
    fn instantiates_fresh_values_by_name() {
        let registry = TypeRegistry::new().with("Square", || Box::new(Square) as Box<dyn Shape>);
        let shape = registry.instantiate::<dyn Shape>("Square").expect("registered");
        assert_eq!(shape.sides(), 4);
        assert!(registry.instantiate::<dyn Shape>("Circle").is_none());
    }

    #[test]
    fn names_are_scoped_per_interface() {
        let mut registry = TypeRegistry::new();
        registry
            .register("Square", || Box::new(Square) as Box<dyn Shape>)
            .register("Hammer", || Box::new(Hammer) as Box<dyn Tool>);

        assert!(registry.instantiate::<dyn Tool>("Square").is_none());
        assert_eq!(registry.instantiate::<dyn Tool>("Hammer").map(|t| t.label()), Some("hammer"));
        assert_eq!(registry.names::<dyn Shape>(), ["Square"]);
        assert_eq!(format!("{registry:?}"), r#"{"dyn Shape": ["Square"], "dyn Tool": ["Hammer"]}"#);
    }

    #[test]
    fn empty_registry_knows_nothing() {
        assert!(EMPTY.is_empty());
        assert!(EMPTY.names::<dyn Shape>().is_empty());
    }
}
