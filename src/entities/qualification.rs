//! Qualification entity type

use serde::{Deserialize, Serialize};

use crate::core::entity::{Collection, Entity};
use crate::core::error::ValidationError;
use crate::entities::employee::EmployeeBasic;

/// A named competency record from the qualification catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Qualification {
    /// Backend-assigned identifier (absent until persisted)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// Display name, unique within the catalog
    pub skill: String,
}

impl Qualification {
    /// Create a not-yet-persisted qualification
    pub fn new(skill: impl Into<String>) -> Self {
        Self {
            id: None,
            skill: skill.into(),
        }
    }

    /// Create a qualification as returned by the backend
    pub fn with_id(id: i64, skill: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            skill: skill.into(),
        }
    }

    /// Reject blank names before anything is sent
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.skill.trim().is_empty() {
            return Err(ValidationError::BlankField { field: "skill" });
        }
        Ok(())
    }

    /// Outbound body for create and update calls
    pub fn to_payload(&self) -> QualificationPayload {
        QualificationPayload {
            skill: self.skill.trim().to_string(),
        }
    }
}

impl Entity for Qualification {
    const COLLECTION: Collection = Collection::Qualifications;

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn label(&self) -> String {
        format!("\"{}\"", self.skill)
    }
}

/// Body accepted by `POST /qualifications` and `PUT /qualifications/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualificationPayload {
    pub skill: String,
}

/// A qualification joined with every employee holding it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualificationDetails {
    pub qualification: Qualification,

    #[serde(default)]
    pub employees: Vec<EmployeeBasic>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unpersisted_qualification_omits_id() {
        let json = serde_json::to_string(&Qualification::new("Java")).unwrap();
        assert_eq!(json, r#"{"skill":"Java"}"#);
    }

    #[test]
    fn test_qualification_details_parse() {
        let json = r#"{
            "qualification": {"id": 3, "skill": "Rust"},
            "employees": [{"id": 7, "firstName": "Anna", "lastName": "Bella"}]
        }"#;
        let details: QualificationDetails = serde_json::from_str(json).unwrap();
        assert_eq!(details.qualification, Qualification::with_id(3, "Rust"));
        assert_eq!(details.employees.len(), 1);
        assert_eq!(details.employees[0].last_name, "Bella");
    }

    #[test]
    fn test_blank_skill_rejected() {
        assert!(Qualification::new("   ").validate().is_err());
        assert!(Qualification::new("Go").validate().is_ok());
    }

    #[test]
    fn test_payload_trims_name() {
        assert_eq!(Qualification::new(" Go ").to_payload().skill, "Go");
    }
}
