//! Core module - reconciliation, local queries, cache and coordinator

pub mod cache;
pub mod catalog;
pub mod config;
pub mod confirm;
pub mod coordinator;
pub mod entity;
pub mod error;
pub mod notify;
pub mod query;
pub mod reconcile;
pub mod seed;
pub mod transport;

pub use cache::{Applied, EntityCache, Generation, LoadState};
pub use catalog::QualificationCatalog;
pub use config::Config;
pub use confirm::{AssumeNo, AssumeYes, Confirmation, PromptConfirmation};
pub use coordinator::{BatchFailure, BatchOutcome, Coordinator, DeleteOutcome, Loaded, MutationOutcome};
pub use entity::{Collection, Entity, MutationKind};
pub use error::{ReconcileError, RosterError, TransportError, ValidationError};
pub use notify::{ConsoleNotifier, Notifier, RecordingNotifier};
pub use query::{QueryView, Searchable};
pub use reconcile::{
    add_skill_reference, build_employee_payload, canonicalize_skill_set, remove_skill_reference,
    resolve_skill_set, resolve_skill_set_to_ids, SkillResolution,
};
pub use transport::{AccessTokenProvider, EnvToken, HttpTransport, StaticToken, Transport};
