//! Flat listing of a target's descriptors, keyed the way input is looked up.
use serde::Serialize;

use crate::shape::{Field, Fill, Slot};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldInfo {
    /// Input key path: lower-cased names joined with `.`, `[]` for structure
    /// sequence elements. Embedded fields sit at their parent's level.
    pub path: String,
    pub kind: String,
    pub default: Option<String>,
    pub validate: Option<String>,
}

pub fn describe(target: &mut dyn Fill) -> Vec<FieldInfo> {
    let mut out = Vec::new();
    walk("", target.fields(), &mut out);
    out
}

fn walk(prefix: &str, fields: Vec<Field<'_>>, out: &mut Vec<FieldInfo>) {
    for Field { name, tags, slot } in fields {
        let key = name.to_lowercase();
        let path = if prefix.is_empty() { key } else { format!("{prefix}.{key}") };
        let info = |kind: String| FieldInfo {
            path: path.clone(),
            kind,
            default: tags.default.map(str::to_string),
            validate: tags.validate.map(str::to_string),
        };
        match slot {
            Slot::Embedded(target) => walk(prefix, target.fields(), out),
            Slot::Struct(target) => {
                out.push(info("struct".to_string()));
                walk(&path, target.fields(), out);
            }
            Slot::Seq(seq) => {
                out.push(info(format!("sequence<{}>", seq.element_kind())));
                let element = format!("{path}[]");
                seq.blank(&mut |slot| {
                    if let Slot::Struct(target) = slot {
                        walk(&element, target.fields(), out);
                    }
                });
            }
            Slot::Map(map) => out.push(info(map.kind())),
            Slot::Variants(variants) => out.push(info(format!("sequence<{}>", variants.interface()))),
            other => out.push(info(other.kind().to_string())),
        }
    }
}
