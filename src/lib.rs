//! Populate typed structures from loosely-typed JSON mappings.
//!
//! Targets describe their fields through [`Fill::fields`]: a name, optional
//! `default` / `validate` tags, and a [`Slot`] naming the field's shape. A fill
//! pass walks those descriptors against a `serde_json::Map`, coercing scalars,
//! recursing into nested and embedded structures, building sequences and maps,
//! and instantiating trait objects through a [`TypeRegistry`].
//!
//! ```ignore
//! let mut person = Employee::default();
//! structfill::fill(&mut person, &input, None)?;
//! ```
mod defaults;
pub mod describe;
pub mod error;
pub mod fill;
pub mod path_de;
pub mod registry;
pub mod shape;
mod validate;

pub use describe::{describe, FieldInfo};
pub use error::{Bound, FillError};
pub use fill::{fill, fill_slot, DISCRIMINATOR};
pub use registry::TypeRegistry;
pub use shape::{Field, Fill, Float, Integer, MapSlot, Scalar, SeqSlot, Slot, Tags, VariantSlot};
