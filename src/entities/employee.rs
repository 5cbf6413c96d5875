//! Employee entity type

use serde::{Deserialize, Serialize};

use crate::core::entity::{Collection, Entity};
use crate::core::error::ValidationError;

/// An employee's pointer to a qualification
///
/// Forms usually only know the name of a freshly typed skill, while data
/// returned by the backend carries the id as well. Both shapes share the
/// wire format `{ "skill": ..., "id"?: ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawSkill", into = "RawSkill")]
pub enum SkillReference {
    /// Only the display name is known
    ByName(String),
    /// Name plus the authoritative catalog id
    ById { id: i64, skill: String },
}

#[derive(Serialize, Deserialize)]
struct RawSkill {
    skill: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<i64>,
}

impl From<RawSkill> for SkillReference {
    fn from(raw: RawSkill) -> Self {
        match raw.id {
            Some(id) => SkillReference::ById {
                id,
                skill: raw.skill,
            },
            None => SkillReference::ByName(raw.skill),
        }
    }
}

impl From<SkillReference> for RawSkill {
    fn from(reference: SkillReference) -> Self {
        match reference {
            SkillReference::ByName(skill) => RawSkill { skill, id: None },
            SkillReference::ById { id, skill } => RawSkill { skill, id: Some(id) },
        }
    }
}

impl SkillReference {
    pub fn by_name(skill: impl Into<String>) -> Self {
        SkillReference::ByName(skill.into())
    }

    pub fn by_id(id: i64, skill: impl Into<String>) -> Self {
        SkillReference::ById {
            id,
            skill: skill.into(),
        }
    }

    /// The qualification name this reference points at
    pub fn name(&self) -> &str {
        match self {
            SkillReference::ByName(skill) => skill,
            SkillReference::ById { skill, .. } => skill,
        }
    }

    /// The catalog id, when the reference carries one
    pub fn id(&self) -> Option<i64> {
        match self {
            SkillReference::ByName(_) => None,
            SkillReference::ById { id, .. } => Some(*id),
        }
    }
}

impl std::fmt::Display for SkillReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// An employee record as held in the local cache
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    /// Backend-assigned identifier (absent until persisted)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    #[serde(default)]
    pub first_name: String,

    #[serde(default)]
    pub last_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postcode: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// Held qualifications, unique by name; `null` on the wire reads as empty
    #[serde(default, deserialize_with = "nullable_skills")]
    pub skill_set: Vec<SkillReference>,
}

fn nullable_skills<'de, D>(deserializer: D) -> Result<Vec<SkillReference>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<SkillReference>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Employee {
    /// Create an unsaved employee draft
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            ..Self::default()
        }
    }

    /// "Firstname Lastname"
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Upper-cased first letters of first and last name
    pub fn initials(&self) -> String {
        self.first_name
            .chars()
            .next()
            .into_iter()
            .chain(self.last_name.chars().next())
            .flat_map(char::to_uppercase)
            .collect()
    }

    /// Whether a reference with this exact name is already held
    pub fn has_skill(&self, name: &str) -> bool {
        self.skill_set.iter().any(|s| s.name() == name)
    }

    /// First and last name are required before any network call
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.first_name.trim().is_empty() {
            return Err(ValidationError::BlankField { field: "firstName" });
        }
        if self.last_name.trim().is_empty() {
            return Err(ValidationError::BlankField { field: "lastName" });
        }
        Ok(())
    }
}

impl Entity for Employee {
    const COLLECTION: Collection = Collection::Employees;

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn label(&self) -> String {
        self.full_name()
    }
}

/// The only employee shape the backend accepts for create and update
///
/// Every optional contact field is present (blank when unknown) and the
/// skill set is a list of qualification ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePayload {
    pub first_name: String,
    pub last_name: String,
    pub street: String,
    pub postcode: String,
    pub city: String,
    pub phone: String,
    pub skill_set: Vec<i64>,
}

/// Minimal employee projection used by the qualification details join
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeBasic {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skill_reference_wire_shapes() {
        let by_name: SkillReference = serde_json::from_str(r#"{"skill":"Java"}"#).unwrap();
        assert_eq!(by_name, SkillReference::by_name("Java"));

        let by_id: SkillReference = serde_json::from_str(r#"{"skill":"Java","id":4}"#).unwrap();
        assert_eq!(by_id, SkillReference::by_id(4, "Java"));
        assert_eq!(by_id.id(), Some(4));

        let json = serde_json::to_string(&SkillReference::by_name("Go")).unwrap();
        assert_eq!(json, r#"{"skill":"Go"}"#);
    }

    #[test]
    fn test_employee_parses_backend_shape() {
        let json = r#"{
            "id": 12,
            "firstName": "Anna",
            "lastName": "Bella",
            "city": "Berlin",
            "skillSet": [{"skill": "Java", "id": 1}]
        }"#;
        let emp: Employee = serde_json::from_str(json).unwrap();
        assert_eq!(emp.id, Some(12));
        assert_eq!(emp.city.as_deref(), Some("Berlin"));
        assert_eq!(emp.street, None);
        assert!(emp.has_skill("Java"));
    }

    #[test]
    fn test_null_skill_set_reads_as_empty() {
        let json = r#"{"firstName": "Max", "lastName": "Koch", "skillSet": null}"#;
        let emp: Employee = serde_json::from_str(json).unwrap();
        assert!(emp.skill_set.is_empty());
    }

    #[test]
    fn test_initials() {
        assert_eq!(Employee::new("anna", "bella").initials(), "AB");
        assert_eq!(Employee::new("", "Koch").initials(), "K");
    }

    #[test]
    fn test_validate_requires_names() {
        assert!(Employee::new("Anna", "Bella").validate().is_ok());
        assert!(matches!(
            Employee::new("  ", "Bella").validate(),
            Err(ValidationError::BlankField { field: "firstName" })
        ));
        assert!(matches!(
            Employee::new("Anna", "").validate(),
            Err(ValidationError::BlankField { field: "lastName" })
        ));
    }

    #[test]
    fn test_payload_field_names() {
        let payload = EmployeePayload {
            first_name: "Anna".into(),
            last_name: "Bella".into(),
            street: String::new(),
            postcode: String::new(),
            city: String::new(),
            phone: String::new(),
            skill_set: vec![1, 2],
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["firstName"], "Anna");
        assert_eq!(value["street"], "");
        assert_eq!(value["skillSet"], serde_json::json!([1, 2]));
    }
}
