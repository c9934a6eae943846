//! Demo targets for the command line.
use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use structfill::{Field, FieldInfo, Fill, Slot, TypeRegistry, DISCRIMINATOR};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub height: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Employee {
    pub name: String,
    pub age: i64,
    pub address: Address,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Classroom {
    pub building: String,
    pub number: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct School {
    pub students: Vec<String>,
    pub ages: Vec<i32>,
    pub classrooms: Vec<Classroom>,
}

/// Teams are converted as plain data: no defaults or validation per employee.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Company {
    pub name: String,
    pub team: BTreeMap<String, Vec<Employee>>,
}

pub trait Animal: Fill {
    fn kind(&self) -> &'static str;
    fn fields_json(&self) -> serde_json::Result<Value>;

    /// Serialized form with the discriminator put back, so output can be fed in again.
    fn to_json(&self) -> serde_json::Result<Value> {
        let mut value = self.fields_json()?;
        if let Value::Object(map) = &mut value {
            map.insert(DISCRIMINATOR.to_string(), Value::from(self.kind()));
        }
        Ok(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Pet {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dog {
    #[serde(flatten)]
    pub pet: Pet,
    pub good: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Cat {
    #[serde(flatten)]
    pub pet: Pet,
    pub wild: bool,
}

#[derive(Default)]
pub struct House {
    pub address: Address,
    pub pets: Vec<Box<dyn Animal>>,
}

/// Which demo model to fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Target {
    Employee,
    School,
    Company,
    House,
}

// ————————————————————————————————————————————————————————————————————————————
// DESCRIPTORS
// ————————————————————————————————————————————————————————————————————————————

impl Fill for Address {
    fn fields(&mut self) -> Vec<Field<'_>> {
        vec![
            Field::new("Street", &mut self.street).with_default("Main St"),
            Field::new("City", &mut self.city),
            Field::new("Height", &mut self.height).with_default("1.8").validate("min=1.5,max=2.0"),
        ]
    }
}

impl Fill for Employee {
    fn fields(&mut self) -> Vec<Field<'_>> {
        vec![
            Field::new("Name", &mut self.name).with_default("John Doe"),
            Field::new("Age", &mut self.age).with_default("30").validate("min=18,max=65"),
            Field::new("Address", Slot::nested(&mut self.address)),
        ]
    }
}

impl Fill for Classroom {
    fn fields(&mut self) -> Vec<Field<'_>> {
        vec![
            Field::new("Building", &mut self.building),
            Field::new("Number", &mut self.number).validate("min=1"),
        ]
    }
}

impl Fill for School {
    fn fields(&mut self) -> Vec<Field<'_>> {
        vec![
            Field::new("Students", Slot::seq(&mut self.students)),
            Field::new("Ages", Slot::seq(&mut self.ages)),
            Field::new("Classrooms", Slot::records(&mut self.classrooms)),
        ]
    }
}

impl Fill for Company {
    fn fields(&mut self) -> Vec<Field<'_>> {
        vec![
            Field::new("Name", &mut self.name).with_default("Acme"),
            Field::new("Team", Slot::map(&mut self.team)),
        ]
    }
}

impl Fill for Pet {
    fn fields(&mut self) -> Vec<Field<'_>> {
        vec![Field::new("Name", &mut self.name)]
    }
}

impl Fill for Dog {
    fn fields(&mut self) -> Vec<Field<'_>> {
        vec![
            Field::new("Pet", Slot::embedded(&mut self.pet)),
            Field::new("Good", &mut self.good).with_default("true"),
        ]
    }
}

impl Animal for Dog {
    fn kind(&self) -> &'static str { "Dog" }
    fn fields_json(&self) -> serde_json::Result<Value> { serde_json::to_value(self) }
}

impl Fill for Cat {
    fn fields(&mut self) -> Vec<Field<'_>> {
        vec![
            Field::new("Pet", Slot::embedded(&mut self.pet)),
            Field::new("Wild", &mut self.wild),
        ]
    }
}

impl Animal for Cat {
    fn kind(&self) -> &'static str { "Cat" }
    fn fields_json(&self) -> serde_json::Result<Value> { serde_json::to_value(self) }
}

impl Fill for House {
    fn fields(&mut self) -> Vec<Field<'_>> {
        vec![
            Field::new("Address", Slot::nested(&mut self.address)),
            Field::new("Pets", Slot::variants(&mut self.pets)),
        ]
    }
}

impl Serialize for House {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let pets = self
            .pets
            .iter()
            .map(|pet| pet.to_json())
            .collect::<serde_json::Result<Vec<_>>>()
            .map_err(serde::ser::Error::custom)?;
        let mut state = serializer.serialize_struct("House", 2)?;
        state.serialize_field("address", &self.address)?;
        state.serialize_field("pets", &pets)?;
        state.end()
    }
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

pub fn registry() -> TypeRegistry {
    TypeRegistry::new()
        .with("Dog", || Box::new(Dog::default()) as Box<dyn Animal>)
        .with("Cat", || Box::new(Cat::default()) as Box<dyn Animal>)
}

impl Target {
    /// Fills a fresh model from one document and returns it serialized.
    pub fn fill(self, document: &Value, registry: &TypeRegistry) -> Result<Value> {
        match self {
            Target::Employee => fill_as::<Employee>(document, registry),
            Target::School => fill_as::<School>(document, registry),
            Target::Company => fill_as::<Company>(document, registry),
            Target::House => fill_as::<House>(document, registry),
        }
    }

    pub fn describe(self) -> Vec<FieldInfo> {
        match self {
            Target::Employee => structfill::describe(&mut Employee::default()),
            Target::School => structfill::describe(&mut School::default()),
            Target::Company => structfill::describe(&mut Company::default()),
            Target::House => structfill::describe(&mut House::default()),
        }
    }
}

fn fill_as<T: Fill + Default + Serialize>(document: &Value, registry: &TypeRegistry) -> Result<Value> {
    let input = document
        .as_object()
        .context("document must be a JSON object")?;
    let mut target = T::default();
    structfill::fill(&mut target, input, Some(registry))?;
    Ok(serde_json::to_value(&target)?)
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn house_output_keeps_discriminators() {
        let input = json!({
            "address": {"city": "Springfield"},
            "pets": [
                {"type": "Dog", "name": "Rex"},
                {"type": "Cat", "name": "Whiskers", "wild": true},
            ],
        });
        let out = Target::House.fill(&input, &registry()).unwrap();
        assert_eq!(
            out,
            json!({
                "address": {"street": "Main St", "city": "Springfield", "height": 1.8},
                "pets": [
                    {"name": "Rex", "good": true, "type": "Dog"},
                    {"name": "Whiskers", "wild": true, "type": "Cat"},
                ],
            })
        );
        // output is valid input again
        assert_eq!(Target::House.fill(&out, &registry()).unwrap(), out);
    }

    #[test]
    fn company_teams_convert_without_defaults() {
        let input = json!({"team": {"dev": [{"name": "Alice", "age": 25}]}});
        let out = Target::Company.fill(&input, &registry()).unwrap();
        assert_eq!(out["name"], "Acme");
        assert_eq!(
            out["team"]["dev"][0],
            json!({"name": "Alice", "age": 25, "address": {"street": "", "city": "", "height": 0.0}})
        );
    }

    #[test]
    fn non_object_documents_are_rejected() {
        let err = Target::Employee.fill(&json!([1, 2]), &registry()).unwrap_err();
        assert!(err.to_string().contains("must be a JSON object"));
    }

    #[test]
    fn fill_errors_surface_through_anyhow() {
        let err = Target::School.fill(&json!({"classrooms": [{"number": 0}]}), &registry()).unwrap_err();
        let fill_error = err.downcast_ref::<structfill::FillError>().expect("fill error");
        assert!(fill_error.to_string().contains("value 0 is less than min 1"));
    }

    #[test]
    fn every_target_describes_itself() {
        for target in [Target::Employee, Target::School, Target::Company, Target::House] {
            assert!(!target.describe().is_empty(), "{target:?}");
        }
        let house = Target::House.describe();
        assert_eq!(house.last().map(|f| f.kind.as_str()), Some("sequence<dyn Animal>"));
    }
}
