//! Defaults for fields the input mapping does not mention.
use tracing::debug;

use crate::fill::coerce::parse_bool;
use crate::shape::{Slot, Tags};

/// Applies the `default` literal of an absent field.
///
/// A literal that does not parse for the field's kind leaves the field as it
/// is. Without a literal, nested and embedded structures recurse so that their
/// own defaults still land, however deep they sit.
pub(crate) fn apply_default(name: &str, slot: Slot<'_>, tags: &Tags) {
    let Some(literal) = tags.default else {
        if let Slot::Struct(target) | Slot::Embedded(target) = slot {
            for field in target.fields() {
                apply_default(field.name, field.slot, &field.tags);
            }
        }
        return;
    };

    let applied = match slot {
        Slot::Str(s) => {
            *s = literal.to_string();
            true
        }
        Slot::Int(int) => int.parse(literal).map(|v| int.assign(v)).is_ok(),
        Slot::Bool(b) => parse_bool(literal).map(|v| *b = v).is_some(),
        Slot::Float(float) => float.parse(literal).map(|v| float.assign(v)).is_ok(),
        _ => false,
    };
    if !applied {
        debug!(field = name, literal, "ignoring default that does not fit the field");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{Field, Fill};

    #[derive(Debug, Default, PartialEq)]
    struct Inner {
        label: String,
        ratio: f32,
    }

    impl Fill for Inner {
        fn fields(&mut self) -> Vec<Field<'_>> {
            vec![
                Field::new("Label", &mut self.label).with_default("inner"),
                Field::new("Ratio", &mut self.ratio).with_default("0.5"),
            ]
        }
    }

    #[derive(Debug, Default, PartialEq)]
    struct Outer {
        on: bool,
        level: i16,
        inner: Inner,
    }

    impl Fill for Outer {
        fn fields(&mut self) -> Vec<Field<'_>> {
            vec![
                Field::new("On", &mut self.on).with_default("T"),
                Field::new("Level", &mut self.level).with_default("-3"),
                Field::new("Inner", Slot::nested(&mut self.inner)),
            ]
        }
    }

    #[test]
    fn literals_are_parsed_per_kind() {
        let mut flag = false;
        apply_default("flag", Slot::from(&mut flag), &Tags { default: Some("1"), validate: None });
        assert!(flag);

        let mut n = 0i64;
        apply_default("n", Slot::from(&mut n), &Tags { default: Some("42"), validate: None });
        assert_eq!(n, 42);
    }

    #[test]
    fn unparsable_literals_leave_the_field_alone() {
        let mut n = 7i32;
        apply_default("n", Slot::from(&mut n), &Tags { default: Some("seven"), validate: None });
        assert_eq!(n, 7);

        let mut small = 0i8;
        apply_default("small", Slot::from(&mut small), &Tags { default: Some("300"), validate: None });
        assert_eq!(small, 0);
    }

    #[test]
    fn untagged_structures_recurse() {
        let mut outer = Outer::default();
        apply_default("outer", Slot::nested(&mut outer), &Tags::NONE);
        assert_eq!(
            outer,
            Outer { on: true, level: -3, inner: Inner { label: "inner".into(), ratio: 0.5 } }
        );
    }

    #[test]
    fn tagged_structures_do_not_recurse() {
        let mut inner = Inner::default();
        apply_default("inner", Slot::nested(&mut inner), &Tags { default: Some("x"), validate: None });
        assert_eq!(inner, Inner::default());
    }
}
