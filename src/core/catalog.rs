//! Transient name/id lookup over a qualification snapshot
//!
//! Built per reconciliation from whatever qualification list the caller
//! holds. Duplicate names are tolerated: the first catalog entry wins.

use std::collections::{HashMap, HashSet};

use crate::entities::Qualification;

/// Lookup view over a borrowed qualification list
#[derive(Debug)]
pub struct QualificationCatalog<'a> {
    entries: &'a [Qualification],
    /// Name -> index of the first entry with that name
    by_name: HashMap<&'a str, usize>,
    ids: HashSet<i64>,
}

impl<'a> QualificationCatalog<'a> {
    pub fn new(entries: &'a [Qualification]) -> Self {
        let mut by_name = HashMap::with_capacity(entries.len());
        let mut ids = HashSet::with_capacity(entries.len());
        for (idx, qual) in entries.iter().enumerate() {
            by_name.entry(qual.skill.as_str()).or_insert(idx);
            if let Some(id) = qual.id {
                ids.insert(id);
            }
        }
        Self {
            entries,
            by_name,
            ids,
        }
    }

    /// First entry whose name matches exactly (case-sensitive)
    pub fn find_by_name(&self, name: &str) -> Option<&'a Qualification> {
        self.by_name.get(name).map(|&idx| &self.entries[idx])
    }

    /// Id of the first entry with this name, if that entry is persisted
    pub fn id_for(&self, name: &str) -> Option<i64> {
        self.find_by_name(name).and_then(|q| q.id)
    }

    pub fn find_by_id(&self, id: i64) -> Option<&'a Qualification> {
        self.entries.iter().find(|q| q.id == Some(id))
    }

    pub fn contains_id(&self, id: i64) -> bool {
        self.ids.contains(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_duplicate_wins() {
        let quals = vec![
            Qualification::with_id(1, "Java"),
            Qualification::with_id(9, "Java"),
            Qualification::with_id(2, "Go"),
        ];
        let catalog = QualificationCatalog::new(&quals);
        assert_eq!(catalog.id_for("Java"), Some(1));
        assert_eq!(catalog.id_for("Go"), Some(2));
        assert!(catalog.contains_id(9));
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let quals = vec![Qualification::with_id(1, "Java")];
        let catalog = QualificationCatalog::new(&quals);
        assert_eq!(catalog.id_for("java"), None);
        assert_eq!(catalog.id_for("Java "), None);
    }

    #[test]
    fn test_unpersisted_entry_has_no_id() {
        let quals = vec![Qualification::new("Draft")];
        let catalog = QualificationCatalog::new(&quals);
        assert!(catalog.find_by_name("Draft").is_some());
        assert_eq!(catalog.id_for("Draft"), None);
    }

    #[test]
    fn test_find_by_id() {
        let quals = vec![Qualification::with_id(5, "SQL")];
        let catalog = QualificationCatalog::new(&quals);
        assert_eq!(catalog.find_by_id(5).map(|q| q.skill.as_str()), Some("SQL"));
        assert!(catalog.find_by_id(6).is_none());
    }
}
