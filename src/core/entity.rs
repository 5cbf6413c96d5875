//! Entity trait - common interface for cached record types

use serde::{de::DeserializeOwned, Serialize};

/// The two collections mirrored from the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Employees,
    Qualifications,
}

impl Collection {
    /// Singular noun used in prompts and messages
    pub fn singular(&self) -> &'static str {
        match self {
            Collection::Employees => "employee",
            Collection::Qualifications => "qualification",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Collection::Employees => write!(f, "employees"),
            Collection::Qualifications => write!(f, "qualifications"),
        }
    }
}

/// Common trait for records held in an [`EntityCache`](crate::core::cache::EntityCache)
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// The collection this record type lives in
    const COLLECTION: Collection;

    /// Backend-assigned id, if persisted
    fn id(&self) -> Option<i64>;

    /// Human-readable label for prompts and notifications
    fn label(&self) -> String;
}

/// Mutation kinds, used in error reports and log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

impl std::fmt::Display for MutationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MutationKind::Create => write!(f, "create"),
            MutationKind::Update => write!(f, "update"),
            MutationKind::Delete => write!(f, "delete"),
        }
    }
}

impl MutationKind {
    /// Past tense for success messages
    pub fn past_tense(&self) -> &'static str {
        match self {
            MutationKind::Create => "created",
            MutationKind::Update => "updated",
            MutationKind::Delete => "deleted",
        }
    }
}
