//! Reference reconciliation between employee skill sets and the catalog
//!
//! Skill references reach the core in two shapes: bare names typed into a
//! form, and `{name, id}` pairs returned by the backend or picked from a
//! list. Everything here resolves both through one path:
//!
//! 1. a reference with an id the catalog knows is taken as-is
//! 2. otherwise the name is looked up (exact, case-sensitive, first match)
//! 3. references that still do not resolve are dropped from outbound data
//!    and reported back to the caller
//!
//! All functions are pure: inputs are borrowed and never mutated.

use std::collections::HashSet;

use crate::core::catalog::QualificationCatalog;
use crate::core::error::ReconcileError;
use crate::entities::{Employee, EmployeePayload, Qualification, SkillReference};

/// Outcome of resolving a skill set against the catalog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkillResolution {
    /// Catalog ids in first-seen order, without duplicates
    pub ids: Vec<i64>,
    /// Names that could not be mapped to an id
    pub unresolved: Vec<String>,
}

impl SkillResolution {
    /// True when no reference was dropped
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// A backend-ready employee body plus the references that had to be dropped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedPayload {
    pub payload: EmployeePayload,
    pub unresolved: Vec<String>,
}

fn resolve_one(reference: &SkillReference, catalog: &QualificationCatalog<'_>) -> Option<i64> {
    reference
        .id()
        .filter(|id| catalog.contains_id(*id))
        .or_else(|| catalog.id_for(reference.name()))
}

/// Resolve every reference, keeping track of the ones that were dropped
pub fn resolve_skill_set(
    skill_set: &[SkillReference],
    catalog: &[Qualification],
) -> SkillResolution {
    let catalog = QualificationCatalog::new(catalog);
    let mut seen = HashSet::new();
    let mut resolution = SkillResolution::default();

    for reference in skill_set {
        match resolve_one(reference, &catalog) {
            Some(id) => {
                if seen.insert(id) {
                    resolution.ids.push(id);
                }
            }
            None => {
                let name = reference.name().to_string();
                if !resolution.unresolved.contains(&name) {
                    resolution.unresolved.push(name);
                }
            }
        }
    }

    resolution
}

/// Map a skill set to the id list the backend expects
///
/// Unresolvable references are omitted; use [`resolve_skill_set`] when the
/// caller needs to know which ones.
pub fn resolve_skill_set_to_ids(skill_set: &[SkillReference], catalog: &[Qualification]) -> Vec<i64> {
    resolve_skill_set(skill_set, catalog).ids
}

/// Build the full-replacement body for create/update, reporting dropped skills
pub fn prepare_employee_payload(employee: &Employee, catalog: &[Qualification]) -> PreparedPayload {
    let resolution = resolve_skill_set(&employee.skill_set, catalog);
    let payload = EmployeePayload {
        first_name: employee.first_name.clone(),
        last_name: employee.last_name.clone(),
        street: employee.street.clone().unwrap_or_default(),
        postcode: employee.postcode.clone().unwrap_or_default(),
        city: employee.city.clone().unwrap_or_default(),
        phone: employee.phone.clone().unwrap_or_default(),
        skill_set: resolution.ids,
    };
    PreparedPayload {
        payload,
        unresolved: resolution.unresolved,
    }
}

/// Build the full-replacement body for create/update
pub fn build_employee_payload(employee: &Employee, catalog: &[Qualification]) -> EmployeePayload {
    prepare_employee_payload(employee, catalog).payload
}

/// Add a catalog qualification to a skill set by name
///
/// Fails with [`ReconcileError::NotFound`] when no persisted catalog entry
/// has that exact name. Adding a name that is already held is a no-op.
pub fn add_skill_reference(
    skill_set: &[SkillReference],
    candidate_name: &str,
    catalog: &[Qualification],
) -> Result<Vec<SkillReference>, ReconcileError> {
    let name = candidate_name.trim();
    let catalog = QualificationCatalog::new(catalog);
    let id = catalog.id_for(name).ok_or_else(|| ReconcileError::NotFound {
        name: name.to_string(),
    })?;

    let mut updated = skill_set.to_vec();
    if !updated.iter().any(|s| s.name() == name) {
        updated.push(SkillReference::by_id(id, name));
    }
    Ok(updated)
}

/// Remove every reference with this (trimmed) name; unknown names are a no-op
pub fn remove_skill_reference(skill_set: &[SkillReference], name: &str) -> Vec<SkillReference> {
    let name = name.trim();
    skill_set
        .iter()
        .filter(|s| s.name() != name)
        .cloned()
        .collect()
}

/// Rewrite inbound references into canonical `{id, name}` display records
///
/// Resolvable references take the catalog's id and name. Unresolvable ones
/// are kept unchanged so the caller can still show them. The result is
/// unique by name.
pub fn canonicalize_skill_set(
    skill_set: &[SkillReference],
    catalog: &[Qualification],
) -> Vec<SkillReference> {
    let catalog = QualificationCatalog::new(catalog);
    let mut names = HashSet::new();
    let mut canonical = Vec::with_capacity(skill_set.len());

    for reference in skill_set {
        let record = match resolve_one(reference, &catalog) {
            Some(id) => {
                let name = catalog
                    .find_by_id(id)
                    .map(|q| q.skill.as_str())
                    .unwrap_or(reference.name());
                SkillReference::by_id(id, name)
            }
            None => reference.clone(),
        };
        if names.insert(record.name().to_string()) {
            canonical.push(record);
        }
    }

    canonical
}
