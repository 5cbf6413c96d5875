//! Error taxonomy for the roster core

use miette::Diagnostic;
use thiserror::Error;

use crate::core::entity::{Collection, MutationKind};

/// Caller-level input problems, rejected before any network call
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ValidationError {
    #[error("required field '{field}' must not be blank")]
    #[diagnostic(code(roster::validation::blank))]
    BlankField { field: &'static str },

    #[error("{collection} record has no id yet")]
    #[diagnostic(
        code(roster::validation::unsaved),
        help("only records returned by the backend can be updated or deleted")
    )]
    MissingId { collection: Collection },
}

/// Reconciliation failures surfaced to the caller
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ReconcileError {
    #[error("qualification '{name}' not found in the catalog")]
    #[diagnostic(
        code(roster::reconcile::not_found),
        help("names match exactly and case-sensitively; run `roster qual list` to see the catalog")
    )]
    NotFound { name: String },
}

/// Failures reported by a transport collaborator
#[derive(Debug, Error, Diagnostic)]
pub enum TransportError {
    #[error("backend responded with HTTP {status}: {body}")]
    #[diagnostic(code(roster::transport::status))]
    Status { status: u16, body: String },

    #[error("could not reach the backend: {message}")]
    #[diagnostic(code(roster::transport::network))]
    Network { message: String },

    #[error("unexpected response body: {message}")]
    #[diagnostic(code(roster::transport::decode))]
    Decode { message: String },

    #[error("no access token available: {message}")]
    #[diagnostic(
        code(roster::transport::credential),
        help("set ROSTER_TOKEN or `token` in the config file")
    )]
    Credential { message: String },
}

impl TransportError {
    /// HTTP status, when the backend answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors produced by the coordinator's network-facing operations
#[derive(Debug, Error, Diagnostic)]
pub enum RosterError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error("failed to fetch {collection}")]
    #[diagnostic(code(roster::fetch))]
    Fetch {
        collection: Collection,
        #[source]
        #[diagnostic_source]
        source: TransportError,
    },

    #[error("failed to {action} {}", .collection.singular())]
    #[diagnostic(code(roster::mutation))]
    Mutation {
        action: MutationKind,
        collection: Collection,
        #[source]
        #[diagnostic_source]
        source: TransportError,
    },
}

impl RosterError {
    /// True when the failure came from the transport layer
    pub fn is_transport(&self) -> bool {
        matches!(self, RosterError::Fetch { .. } | RosterError::Mutation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mutation_error_message() {
        let err = RosterError::Mutation {
            action: MutationKind::Delete,
            collection: Collection::Qualifications,
            source: TransportError::Status {
                status: 409,
                body: "in use".into(),
            },
        };
        assert_eq!(err.to_string(), "failed to delete qualification");
        assert!(err.is_transport());
    }

    #[test]
    fn test_validation_is_not_transport() {
        let err = RosterError::from(ValidationError::BlankField { field: "skill" });
        assert!(!err.is_transport());
        assert!(err.to_string().contains("skill"));
    }

    #[test]
    fn test_status_accessor() {
        let err = TransportError::Status {
            status: 404,
            body: String::new(),
        };
        assert_eq!(err.status(), Some(404));
        let err = TransportError::Network {
            message: "refused".into(),
        };
        assert_eq!(err.status(), None);
    }
}
