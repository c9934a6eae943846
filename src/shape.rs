//! Field descriptors: the static stand-in for run-time struct reflection.
//!
//! A target type implements [`Fill`] and hands out one [`Field`] per declared
//! field, in declaration order. Each field pairs its name and [`Tags`] with a
//! [`Slot`], a mutable reference to the storage tagged with its shape. The fill
//! pass only ever dispatches on slots; it never needs to know the concrete type.
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::BuildHasher;
use std::num::ParseIntError;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::Result;
use crate::registry::TypeRegistry;

// ————————————————————————————————————————————————————————————————————————————
// TARGETS & FIELDS
// ————————————————————————————————————————————————————————————————————————————

/// A target structure.
///
/// ```ignore
/// impl Fill for Employee {
///     fn fields(&mut self) -> Vec<Field<'_>> {
///         vec![
///             Field::new("Name", &mut self.name).with_default("John Doe"),
///             Field::new("Age", &mut self.age).with_default("30").validate("min=18,max=65"),
///             Field::new("Address", Slot::nested(&mut self.address)),
///         ]
///     }
/// }
/// ```
pub trait Fill {
    fn fields(&mut self) -> Vec<Field<'_>>;
}

/// Static per-field annotations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tags {
    /// Textual default, parsed according to the field's scalar kind.
    pub default: Option<&'static str>,
    /// Comma-separated `rule=bound` pairs (`min`, `max`).
    pub validate: Option<&'static str>,
}

impl Tags {
    pub const NONE: Tags = Tags { default: None, validate: None };
}

pub struct Field<'a> {
    pub name: &'static str,
    pub tags: Tags,
    pub slot: Slot<'a>,
}

impl<'a> Field<'a> {
    pub fn new(name: &'static str, slot: impl Into<Slot<'a>>) -> Self {
        Self { name, tags: Tags::NONE, slot: slot.into() }
    }
    pub fn with_default(mut self, literal: &'static str) -> Self {
        self.tags.default = Some(literal);
        self
    }
    pub fn validate(mut self, rules: &'static str) -> Self {
        self.tags.validate = Some(rules);
        self
    }
}

// ————————————————————————————————————————————————————————————————————————————
// SLOTS
// ————————————————————————————————————————————————————————————————————————————

/// Mutable access to one field, tagged with its declared shape.
pub enum Slot<'a> {
    Str(&'a mut String),
    Int(&'a mut dyn Integer),
    Bool(&'a mut bool),
    Float(&'a mut dyn Float),
    /// Nested structure, filled from its own sub-mapping.
    Struct(&'a mut dyn Fill),
    /// Flattened structure, filled from the enclosing mapping.
    Embedded(&'a mut dyn Fill),
    Seq(Box<dyn SeqSlot + 'a>),
    Map(&'a mut dyn MapSlot),
    Variants(Box<dyn VariantSlot + 'a>),
    /// Declared, but not something the fill pass knows how to materialize.
    Unsupported(&'static str),
}

impl<'a> Slot<'a> {
    pub fn nested<T: Fill>(target: &'a mut T) -> Self {
        Slot::Struct(target)
    }
    pub fn embedded<T: Fill>(target: &'a mut T) -> Self {
        Slot::Embedded(target)
    }
    /// Sequence of scalars.
    pub fn seq<T: Scalar + 'a>(items: &'a mut Vec<T>) -> Self {
        Slot::Seq(Box::new(Scalars(items)))
    }
    /// Sequence of nested structures.
    pub fn records<T: Fill + Default + 'a>(items: &'a mut Vec<T>) -> Self {
        Slot::Seq(Box::new(Records(items)))
    }
    pub fn map<M: MapSlot>(map: &'a mut M) -> Self {
        Slot::Map(map)
    }
    /// Sequence of trait objects instantiated through a [`TypeRegistry`].
    pub fn variants<I: ?Sized + Fill + 'static>(items: &'a mut Vec<Box<I>>) -> Self {
        Slot::Variants(Box::new(Variants { target: items, staged: Vec::new() }))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Slot::Str(_) => "string",
            Slot::Int(int) => int.kind(),
            Slot::Bool(_) => "bool",
            Slot::Float(float) => float.kind(),
            Slot::Struct(_) => "struct",
            Slot::Embedded(_) => "embedded struct",
            Slot::Seq(_) => "sequence",
            Slot::Map(_) => "mapping",
            Slot::Variants(_) => "interface sequence",
            Slot::Unsupported(kind) => kind,
        }
    }
}

impl fmt::Debug for Slot<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Slot({})", self.kind())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// SCALARS
// ————————————————————————————————————————————————————————————————————————————

/// Element types allowed in a scalar sequence.
pub trait Scalar: Default {
    fn slot(&mut self) -> Slot<'_>;
}

/// Signed integer storage of any width. Values are carried as `i64` and are
/// always parsed at the field's own width first, so `assign` never truncates.
pub trait Integer {
    fn kind(&self) -> &'static str;
    fn parse(&self, text: &str) -> Result<i64, ParseIntError>;
    fn assign(&mut self, value: i64);
}

pub trait Float {
    fn kind(&self) -> &'static str;
    /// Parses at the field's own width. Finite text that overflows it is an error.
    fn parse(&self, text: &str) -> Result<f64, String>;
    fn assign(&mut self, value: f64);
}

macro_rules! integer_slots {
    ($($t:ty),*) => {$(
        impl Integer for $t {
            fn kind(&self) -> &'static str { stringify!($t) }
            fn parse(&self, text: &str) -> Result<i64, ParseIntError> {
                text.parse::<$t>().map(|v| v as i64)
            }
            fn assign(&mut self, value: i64) { *self = value as $t; }
        }
        impl Scalar for $t {
            fn slot(&mut self) -> Slot<'_> { Slot::Int(self) }
        }
        impl<'a> From<&'a mut $t> for Slot<'a> {
            fn from(value: &'a mut $t) -> Self { Slot::Int(value) }
        }
    )*};
}

macro_rules! float_slots {
    ($($t:ty),*) => {$(
        impl Float for $t {
            fn kind(&self) -> &'static str { stringify!($t) }
            fn parse(&self, text: &str) -> Result<f64, String> {
                let value = text.parse::<$t>().map_err(|e| e.to_string())?;
                if value.is_infinite() && !spells_infinity(text) {
                    return Err("value out of range".to_string());
                }
                Ok(f64::from(value))
            }
            fn assign(&mut self, value: f64) { *self = value as $t; }
        }
        impl Scalar for $t {
            fn slot(&mut self) -> Slot<'_> { Slot::Float(self) }
        }
        impl<'a> From<&'a mut $t> for Slot<'a> {
            fn from(value: &'a mut $t) -> Self { Slot::Float(value) }
        }
    )*};
}

// Unsigned integers and chars can be declared but are rejected when input shows up.
macro_rules! unsupported_slots {
    ($($t:ty),*) => {$(
        impl<'a> From<&'a mut $t> for Slot<'a> {
            fn from(_: &'a mut $t) -> Self { Slot::Unsupported(stringify!($t)) }
        }
    )*};
}

integer_slots!(i8, i16, i32, i64, isize);
float_slots!(f32, f64);
unsupported_slots!(u8, u16, u32, u64, usize, char);

impl Scalar for String {
    fn slot(&mut self) -> Slot<'_> { Slot::Str(self) }
}
impl<'a> From<&'a mut String> for Slot<'a> {
    fn from(value: &'a mut String) -> Self { Slot::Str(value) }
}

impl Scalar for bool {
    fn slot(&mut self) -> Slot<'_> { Slot::Bool(self) }
}
impl<'a> From<&'a mut bool> for Slot<'a> {
    fn from(value: &'a mut bool) -> Self { Slot::Bool(value) }
}

// ————————————————————————————————————————————————————————————————————————————
// SEQUENCES
// ————————————————————————————————————————————————————————————————————————————

pub trait SeqSlot {
    fn element_kind(&self) -> String;

    /// Builds a fresh sequence of `len` default elements, hands each element to
    /// `fill` in order, and replaces the field only if every element succeeded.
    fn rebuild(
        &mut self,
        len: usize,
        fill: &mut dyn FnMut(usize, Slot<'_>) -> Result<()>,
    ) -> Result<()>;

    /// Lends a throwaway default element, for introspection.
    fn blank(&self, visit: &mut dyn FnMut(Slot<'_>));
}

struct Scalars<'a, T>(&'a mut Vec<T>);

struct Records<'a, T>(&'a mut Vec<T>);

impl<T: Scalar> SeqSlot for Scalars<'_, T> {
    fn element_kind(&self) -> String {
        short_type_name::<T>()
    }
    fn rebuild(
        &mut self,
        len: usize,
        fill: &mut dyn FnMut(usize, Slot<'_>) -> Result<()>,
    ) -> Result<()> {
        let mut items: Vec<T> = (0..len).map(|_| T::default()).collect();
        for (index, item) in items.iter_mut().enumerate() {
            fill(index, item.slot())?;
        }
        *self.0 = items;
        Ok(())
    }
    fn blank(&self, visit: &mut dyn FnMut(Slot<'_>)) {
        let mut item = T::default();
        visit(item.slot());
    }
}

impl<T: Fill + Default> SeqSlot for Records<'_, T> {
    fn element_kind(&self) -> String {
        short_type_name::<T>()
    }
    fn rebuild(
        &mut self,
        len: usize,
        fill: &mut dyn FnMut(usize, Slot<'_>) -> Result<()>,
    ) -> Result<()> {
        let mut items: Vec<T> = (0..len).map(|_| T::default()).collect();
        for (index, item) in items.iter_mut().enumerate() {
            fill(index, Slot::Struct(item))?;
        }
        *self.0 = items;
        Ok(())
    }
    fn blank(&self, visit: &mut dyn FnMut(Slot<'_>)) {
        let mut item = T::default();
        visit(Slot::Struct(&mut item));
    }
}

// ————————————————————————————————————————————————————————————————————————————
// MAPPINGS
// ————————————————————————————————————————————————————————————————————————————

/// Associative containers, converted wholesale from a JSON object by direct
/// deserialization. No defaults, validation or nested fill happen here.
pub trait MapSlot {
    fn kind(&self) -> String;
    fn convert(&mut self, input: &Map<String, Value>) -> Result<(), String>;
}

impl<K, V, S> MapSlot for HashMap<K, V, S>
where
    S: BuildHasher,
    Self: DeserializeOwned,
{
    fn kind(&self) -> String {
        short_type_name::<Self>()
    }
    fn convert(&mut self, input: &Map<String, Value>) -> Result<(), String> {
        *self = crate::path_de::from_value_with_path(Value::Object(input.clone()))?;
        Ok(())
    }
}

impl<K, V> MapSlot for BTreeMap<K, V>
where
    Self: DeserializeOwned,
{
    fn kind(&self) -> String {
        short_type_name::<Self>()
    }
    fn convert(&mut self, input: &Map<String, Value>) -> Result<(), String> {
        *self = crate::path_de::from_value_with_path(Value::Object(input.clone()))?;
        Ok(())
    }
}

impl<K, V, S> MapSlot for IndexMap<K, V, S>
where
    S: BuildHasher,
    Self: DeserializeOwned,
{
    fn kind(&self) -> String {
        short_type_name::<Self>()
    }
    fn convert(&mut self, input: &Map<String, Value>) -> Result<(), String> {
        *self = crate::path_de::from_value_with_path(Value::Object(input.clone()))?;
        Ok(())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// POLYMORPHIC SEQUENCES
// ————————————————————————————————————————————————————————————————————————————

pub trait VariantSlot {
    fn interface(&self) -> String;

    /// Discriminators the registry knows for this interface.
    fn known(&self, registry: &TypeRegistry) -> Vec<String>;

    /// Instantiates `discriminator`, fills it through `fill` and stages it.
    /// `Ok(false)` means the registry has no factory for it.
    fn push(
        &mut self,
        registry: &TypeRegistry,
        discriminator: &str,
        fill: &mut dyn FnMut(Vec<Field<'_>>) -> Result<()>,
    ) -> Result<bool>;

    /// Replaces the field with everything staged so far.
    fn commit(&mut self);
}

struct Variants<'a, I: ?Sized> {
    target: &'a mut Vec<Box<I>>,
    staged: Vec<Box<I>>,
}

impl<I: ?Sized + Fill + 'static> VariantSlot for Variants<'_, I> {
    fn interface(&self) -> String {
        short_type_name::<I>()
    }
    fn known(&self, registry: &TypeRegistry) -> Vec<String> {
        registry.names::<I>()
    }
    fn push(
        &mut self,
        registry: &TypeRegistry,
        discriminator: &str,
        fill: &mut dyn FnMut(Vec<Field<'_>>) -> Result<()>,
    ) -> Result<bool> {
        let Some(mut instance) = registry.instantiate::<I>(discriminator) else {
            return Ok(false);
        };
        fill(instance.fields())?;
        self.staged.push(instance);
        Ok(true)
    }
    fn commit(&mut self) {
        *self.target = std::mem::take(&mut self.staged);
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn spells_infinity(text: &str) -> bool {
    text.trim_start_matches(['+', '-']).to_ascii_lowercase().starts_with("inf")
}

/// `type_name` with every module path stripped, generics included:
/// `alloc::vec::Vec<my_crate::Pet>` becomes `Vec<Pet>`.
pub(crate) fn short_type_name<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    let mut out = String::with_capacity(full.len());
    let mut segment = String::new();
    for c in full.chars() {
        if c.is_alphanumeric() || c == '_' || c == ':' {
            segment.push(c);
        } else {
            out.push_str(segment.rsplit("::").next().unwrap_or_default());
            segment.clear();
            out.push(c);
        }
    }
    out.push_str(segment.rsplit("::").next().unwrap_or_default());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Pair {
        left: i32,
        right: String,
    }

    impl Fill for Pair {
        fn fields(&mut self) -> Vec<Field<'_>> {
            vec![
                Field::new("Left", &mut self.left).with_default("1").validate("min=0"),
                Field::new("Right", &mut self.right),
            ]
        }
    }

    #[test]
    fn descriptors_keep_declaration_order_and_tags() {
        let mut pair = Pair::default();
        let fields = pair.fields();
        let names: Vec<_> = fields.iter().map(|f| f.name).collect();
        assert_eq!(names, ["Left", "Right"]);
        assert_eq!(fields[0].tags, Tags { default: Some("1"), validate: Some("min=0") });
        assert_eq!(fields[1].tags, Tags::NONE);
        assert_eq!(fields[0].slot.kind(), "i32");
        assert_eq!(fields[1].slot.kind(), "string");
    }

    #[test]
    fn integers_parse_at_their_own_width() {
        let mut small = 0i8;
        assert_eq!(small.parse("127"), Ok(127));
        assert!(small.parse("128").is_err());
        small.assign(-5);
        assert_eq!(small, -5);
    }

    #[test]
    fn floats_parse_at_their_own_width() {
        let narrow = 0f32;
        assert_eq!(narrow.parse("0.5"), Ok(0.5));
        assert_eq!(narrow.parse("1e40"), Err("value out of range".to_string()));
        assert_eq!(narrow.parse("-inf"), Ok(f64::NEG_INFINITY));

        let wide = 0f64;
        assert_eq!(wide.parse("1e40"), Ok(1e40));
        assert!(wide.parse("1e400").is_err());
        assert!(wide.parse("abc").is_err());
    }

    #[test]
    fn unsigned_fields_are_declared_unsupported() {
        let mut count = 0u32;
        let slot = Slot::from(&mut count);
        assert!(matches!(slot, Slot::Unsupported("u32")));
    }

    #[test]
    fn scalar_rebuild_replaces_only_on_success() {
        let mut items = vec![7i64];
        let mut seq = Scalars(&mut items);
        let failed = seq.rebuild(2, &mut |index, _| {
            if index == 1 {
                Err(crate::FillError::UnsupportedFieldKind { field: "x".into(), kind: "i64" })
            } else {
                Ok(())
            }
        });
        assert!(failed.is_err());
        assert_eq!(items, [7]);
    }

    #[test]
    fn short_type_names_strip_module_paths() {
        assert_eq!(short_type_name::<Vec<String>>(), "Vec<String>");
        assert_eq!(short_type_name::<HashMap<String, i32>>(), "HashMap<String, i32>");
        assert_eq!(short_type_name::<Pair>(), "Pair");
    }
}
