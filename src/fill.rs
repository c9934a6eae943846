//! The fill pass.
//!
//! One recursive walk over a target's field descriptors, driven by the input
//! mapping:
//! - every field is looked up by its lower-cased name; embedded structures are
//!   resolved against the enclosing mapping instead of a sub-mapping,
//! - present values are materialized into the field's shape (scalar coercion,
//!   nested recursion, sequences, maps, registry-built trait objects),
//! - absent (or null) fields fall back to their `default` tag.
//!
//! The first error aborts the pass. Fields written before it stay written.
pub mod coerce;


use serde_json::{Map, Value};
use tracing::{trace, warn};

use crate::defaults::apply_default;
use crate::error::{FillError, Result};
use crate::registry::{self, TypeRegistry};
use crate::shape::{Field, Fill, Slot, Tags};
use crate::validate::validate_int;

use coerce::{canonical_text, parse_bool, value_kind};

/// Key naming the concrete type of a polymorphic sequence element.
pub const DISCRIMINATOR: &str = "type";

/// Fills `target` from `input`. Without a registry, polymorphic fields can only
/// receive empty sequences.
pub fn fill<T: Fill>(
    target: &mut T,
    input: &Map<String, Value>,
    registry: Option<&TypeRegistry>,
) -> Result<()> {
    fill_slot(Slot::Struct(target), input, registry)
}

/// Untyped entry point: anything but a structure slot is rejected.
pub fn fill_slot(
    target: Slot<'_>,
    input: &Map<String, Value>,
    registry: Option<&TypeRegistry>,
) -> Result<()> {
    let pass = Pass { registry: registry.unwrap_or(&*registry::EMPTY) };
    pass.target(target, input)
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

struct Pass<'r> {
    registry: &'r TypeRegistry,
}

impl Pass<'_> {
    fn target(&self, slot: Slot<'_>, input: &Map<String, Value>) -> Result<()> {
        match slot {
            Slot::Struct(target) | Slot::Embedded(target) => self.fields(target.fields(), input),
            other => Err(FillError::NotAPointerToStruct { found: other.kind() }),
        }
    }

    fn fields(&self, fields: Vec<Field<'_>>, input: &Map<String, Value>) -> Result<()> {
        for Field { name, tags, slot } in fields {
            match slot {
                Slot::Embedded(target) => self.target(Slot::Embedded(target), input)?,
                slot => match input.get(&name.to_lowercase()) {
                    Some(value) if !value.is_null() => self.materialize(name, &tags, slot, value)?,
                    _ => apply_default(name, slot, &tags),
                },
            }
        }
        Ok(())
    }

    fn materialize(&self, name: &str, tags: &Tags, slot: Slot<'_>, value: &Value) -> Result<()> {
        trace!(field = name, kind = slot.kind(), "materializing");
        match slot {
            Slot::Str(s) => {
                *s = scalar_text(name, "string", value)?.into_owned();
            }
            Slot::Int(int) => {
                let text = scalar_text(name, int.kind(), value)?;
                let parsed = int.parse(&text).map_err(|e| conversion(name, value, int.kind(), e))?;
                validate_int(name, tags.validate, parsed)?;
                int.assign(parsed);
            }
            Slot::Bool(b) => {
                let text = scalar_text(name, "bool", value)?;
                *b = parse_bool(&text).ok_or_else(|| conversion(name, value, "bool", "invalid syntax"))?;
            }
            Slot::Float(float) => {
                let text = scalar_text(name, float.kind(), value)?;
                let parsed = float.parse(&text).map_err(|e| conversion(name, value, float.kind(), e))?;
                float.assign(parsed);
            }
            Slot::Struct(target) | Slot::Embedded(target) => {
                let map = expect_mapping(name, value)?;
                self.target(Slot::Struct(target), map)?;
            }
            Slot::Seq(mut seq) => {
                let items = expect_sequence(name, value)?;
                seq.rebuild(items.len(), &mut |index, element| {
                    let item = items.get(index).ok_or_else(|| {
                        conversion(name, value, "sequence", format!("element index {index} out of range for {} items", items.len()))
                    })?;
                    self.materialize(&format!("{name}[{index}]"), &Tags::NONE, element, item)
                })?;
            }
            Slot::Variants(mut variants) => {
                let items = expect_sequence(name, value)?;
                for (index, item) in items.iter().enumerate() {
                    let element_name = format!("{name}[{index}]");
                    let map = expect_mapping(&element_name, item)?;
                    let Some(discriminator) = map.get(DISCRIMINATOR).and_then(Value::as_str) else {
                        warn!(field = name, index, "warning: type identifier missing, skipping element");
                        continue;
                    };
                    let known = variants.push(self.registry, discriminator, &mut |fields| {
                        self.fields(fields, map)
                    })?;
                    if !known {
                        return Err(FillError::UnknownTypeIdentifier {
                            field: element_name,
                            identifier: discriminator.to_string(),
                            known: variants.known(self.registry),
                        });
                    }
                }
                variants.commit();
            }
            Slot::Map(target) => {
                let map = expect_mapping(name, value)?;
                target.convert(map).map_err(|reason| conversion(name, value, "mapping", reason))?;
            }
            Slot::Unsupported(kind) => {
                return Err(FillError::UnsupportedFieldKind { field: name.to_string(), kind });
            }
        }
        Ok(())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn scalar_text<'v>(
    name: &str,
    kind: &'static str,
    value: &'v Value,
) -> Result<std::borrow::Cow<'v, str>> {
    canonical_text(value)
        .ok_or_else(|| conversion(name, value, kind, format!("{} is not a scalar", value_kind(value))))
}

fn expect_mapping<'v>(name: &str, value: &'v Value) -> Result<&'v Map<String, Value>> {
    value.as_object().ok_or_else(|| FillError::InvalidNestedInput {
        field: name.to_string(),
        expected: "mapping",
        found: value_kind(value),
    })
}

fn expect_sequence<'v>(name: &str, value: &'v Value) -> Result<&'v Vec<Value>> {
    value.as_array().ok_or_else(|| FillError::InvalidNestedInput {
        field: name.to_string(),
        expected: "sequence",
        found: value_kind(value),
    })
}

fn conversion(name: &str, value: &Value, kind: &'static str, reason: impl ToString) -> FillError {
    const PREVIEW: usize = 64;
    let mut text = value.to_string();
    if let Some((cut, _)) = text.char_indices().nth(PREVIEW) {
        text.truncate(cut);
        text.push('…');
    }
    FillError::Conversion { field: name.to_string(), value: text, kind, reason: reason.to_string() }
}
