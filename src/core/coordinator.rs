//! Mutation coordinator - owns the cached collections and the write policy
//!
//! Every write follows the same sequence:
//!
//! ```text
//! validate -> reconcile -> transport call -> notify -> refetch collection
//!                                  \-> (failure) notify, cache untouched
//! ```
//!
//! The cache is only replaced by a full fetch. The refetch after a write
//! starts a new load generation, so a fetch still in flight from before
//! the write can never overwrite what the refetch brings back. A failed
//! write starts nothing and leaves pending loads valid.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::core::cache::{Applied, EntityCache, LoadState};
use crate::core::confirm::{Confirmation, PromptConfirmation};
use crate::core::entity::{Collection, Entity, MutationKind};
use crate::core::error::{RosterError, TransportError};
use crate::core::notify::{ConsoleNotifier, Notifier};
use crate::core::reconcile::{add_skill_reference, prepare_employee_payload, remove_skill_reference};
use crate::core::transport::Transport;
use crate::entities::{Employee, Qualification, QualificationDetails, SkillReference};

/// Result of a load
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Loaded<T> {
    /// The fetch was the latest one and now is the cache content
    Current(Vec<T>),
    /// A newer load started meanwhile; the cache kept the newer data and
    /// these are the items this fetch returned
    Superseded(Vec<T>),
}

impl<T> Loaded<T> {
    pub fn is_current(&self) -> bool {
        matches!(self, Loaded::Current(_))
    }

    /// The fetched items, whether or not they made it into the cache
    pub fn into_items(self) -> Vec<T> {
        match self {
            Loaded::Current(items) | Loaded::Superseded(items) => items,
        }
    }
}

/// A successful write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationOutcome<R> {
    /// What the backend returned for the write
    pub record: R,
    /// Skill names dropped from the payload because the catalog lacks them
    pub unresolved: Vec<String>,
    /// Whether the follow-up refetch succeeded
    pub refreshed: bool,
}

impl<R> MutationOutcome<R> {
    /// True when skill references had to be dropped
    pub fn is_partial(&self) -> bool {
        !self.unresolved.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted { refreshed: bool },
    /// The confirmation hook declined; nothing was sent
    Cancelled,
}

/// One draft of a batch that could not be written
#[derive(Debug)]
pub struct BatchFailure {
    /// Position in the submitted list
    pub index: usize,
    pub label: String,
    pub error: RosterError,
}

/// Summary of a batch create
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub created: usize,
    pub failures: Vec<BatchFailure>,
    pub unresolved: Vec<String>,
    pub refreshed: bool,
}

fn lock<C>(mutex: &Mutex<C>) -> MutexGuard<'_, C> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn capitalized(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn push_unique(target: &mut Vec<String>, names: Vec<String>) {
    for name in names {
        if !target.contains(&name) {
            target.push(name);
        }
    }
}

/// Owns both cached collections and performs every read and write
///
/// Methods take `&self` so loads and writes may interleave on one task.
/// Cache locks are never held across an await.
pub struct Coordinator<T> {
    transport: T,
    employees: Mutex<EntityCache<Employee>>,
    qualifications: Mutex<EntityCache<Qualification>>,
    notifier: Arc<dyn Notifier>,
    confirmation: Arc<dyn Confirmation>,
}

impl<T: Transport> Coordinator<T> {
    /// Coordinator with console notifications and an interactive delete prompt
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            employees: Mutex::new(EntityCache::new()),
            qualifications: Mutex::new(EntityCache::new()),
            notifier: Arc::new(ConsoleNotifier::default()),
            confirmation: Arc::new(PromptConfirmation),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_confirmation(mut self, confirmation: Arc<dyn Confirmation>) -> Self {
        self.confirmation = confirmation;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    // ------------------------------------------------------------------
    // Snapshots
    // ------------------------------------------------------------------

    pub fn employees(&self) -> Vec<Employee> {
        lock(&self.employees).snapshot()
    }

    pub fn qualifications(&self) -> Vec<Qualification> {
        lock(&self.qualifications).snapshot()
    }

    pub fn employees_state(&self) -> LoadState {
        lock(&self.employees).state()
    }

    pub fn qualifications_state(&self) -> LoadState {
        lock(&self.qualifications).state()
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Replace the employee cache with a fresh fetch
    pub async fn load_employees(&self) -> Result<Loaded<Employee>, RosterError> {
        load_into(&self.employees, self.transport.fetch_employees()).await
    }

    /// Replace the qualification cache with a fresh fetch
    pub async fn load_qualifications(&self) -> Result<Loaded<Qualification>, RosterError> {
        load_into(&self.qualifications, self.transport.fetch_qualifications()).await
    }

    /// Fetch one employee for a detail view; the cache is not touched
    pub async fn employee(&self, id: i64) -> Result<Employee, RosterError> {
        self.transport
            .fetch_employee(id)
            .await
            .map_err(|source| RosterError::Fetch {
                collection: Collection::Employees,
                source,
            })
    }

    /// A qualification and every employee holding it
    pub async fn qualification_details(&self, id: i64) -> Result<QualificationDetails, RosterError> {
        self.transport
            .fetch_qualification_details(id)
            .await
            .map_err(|source| RosterError::Fetch {
                collection: Collection::Qualifications,
                source,
            })
    }

    /// The catalog snapshot, fetching it when stale or never loaded
    pub async fn catalog(&self, refresh: bool) -> Result<Vec<Qualification>, RosterError> {
        let loaded = self.qualifications_state() == LoadState::Loaded;
        if refresh || !loaded {
            return Ok(self.load_qualifications().await?.into_items());
        }
        Ok(self.qualifications())
    }

    async fn catalog_for(&self, skill_set: &[SkillReference]) -> Result<Vec<Qualification>, RosterError> {
        if skill_set.is_empty() {
            Ok(Vec::new())
        } else {
            self.catalog(false).await
        }
    }

    // ------------------------------------------------------------------
    // Employee writes
    // ------------------------------------------------------------------

    pub async fn create_employee(&self, draft: &Employee) -> Result<MutationOutcome<Employee>, RosterError> {
        draft.validate()?;
        let catalog = self.catalog_for(&draft.skill_set).await?;
        let prepared = prepare_employee_payload(draft, &catalog);

        let created = self
            .write(
                &self.employees,
                MutationKind::Create,
                &draft.label(),
                self.transport.create_employee(&prepared.payload),
            )
            .await?;
        self.report_unresolved(&draft.label(), &prepared.unresolved);

        let refreshed = self.refresh_employees().await;
        Ok(MutationOutcome {
            record: created,
            unresolved: prepared.unresolved,
            refreshed,
        })
    }

    /// Full replacement of an employee, skill set included
    pub async fn update_employee(&self, id: i64, draft: &Employee) -> Result<MutationOutcome<Employee>, RosterError> {
        draft.validate()?;
        let catalog = self.catalog_for(&draft.skill_set).await?;
        self.replace_employee(id, draft, &catalog).await
    }

    async fn replace_employee(
        &self,
        id: i64,
        draft: &Employee,
        catalog: &[Qualification],
    ) -> Result<MutationOutcome<Employee>, RosterError> {
        let prepared = prepare_employee_payload(draft, catalog);

        let updated = self
            .write(
                &self.employees,
                MutationKind::Update,
                &draft.label(),
                self.transport.update_employee(id, &prepared.payload),
            )
            .await?;
        self.report_unresolved(&draft.label(), &prepared.unresolved);

        let refreshed = self.refresh_employees().await;
        Ok(MutationOutcome {
            record: updated,
            unresolved: prepared.unresolved,
            refreshed,
        })
    }

    /// Delete after the confirmation hook agrees
    pub async fn delete_employee(&self, id: i64) -> Result<DeleteOutcome, RosterError> {
        let label = lock(&self.employees)
            .find(id)
            .map(|e| e.label())
            .unwrap_or_else(|| format!("#{id}"));

        if !self.confirm_delete(Collection::Employees, &label) {
            return Ok(DeleteOutcome::Cancelled);
        }

        self.write(
            &self.employees,
            MutationKind::Delete,
            &label,
            self.transport.delete_employee(id),
        )
        .await?;

        let refreshed = self.refresh_employees().await;
        Ok(DeleteOutcome::Deleted { refreshed })
    }

    /// Add a catalog qualification to an existing employee by name
    ///
    /// The catalog is reloaded first. An unknown name fails with
    /// [`ReconcileError::NotFound`](crate::core::error::ReconcileError::NotFound)
    /// before anything is written; a name already held is a no-op.
    pub async fn add_skill(&self, employee_id: i64, name: &str) -> Result<MutationOutcome<Employee>, RosterError> {
        let catalog = self.catalog(true).await?;
        let employee = self.employee(employee_id).await?;

        let skill_set = add_skill_reference(&employee.skill_set, name, &catalog)?;
        if skill_set.len() == employee.skill_set.len() {
            debug!(employee_id, skill = name.trim(), "skill already held");
            self.notifier
                .info(&format!("{} already holds {}", employee.full_name(), name.trim()));
            return Ok(MutationOutcome {
                record: employee,
                unresolved: Vec::new(),
                refreshed: false,
            });
        }

        let draft = Employee { skill_set, ..employee };
        self.replace_employee(employee_id, &draft, &catalog).await
    }

    /// Remove every reference with this name; unknown names are a no-op
    pub async fn remove_skill(&self, employee_id: i64, name: &str) -> Result<MutationOutcome<Employee>, RosterError> {
        let name = name.trim();
        let employee = self.employee(employee_id).await?;

        let skill_set = remove_skill_reference(&employee.skill_set, name);
        if skill_set.len() == employee.skill_set.len() {
            debug!(employee_id, skill = name, "skill not held");
            self.notifier
                .info(&format!("{} does not hold {}", employee.full_name(), name));
            return Ok(MutationOutcome {
                record: employee,
                unresolved: Vec::new(),
                refreshed: false,
            });
        }

        let catalog = self.catalog_for(&skill_set).await?;
        let draft = Employee { skill_set, ..employee };
        self.replace_employee(employee_id, &draft, &catalog).await
    }

    /// Create many employees with a single refetch at the end
    ///
    /// Per-draft failures are collected, not propagated. Only a failed
    /// catalog fetch aborts the whole batch.
    pub async fn create_employees(&self, drafts: &[Employee]) -> Result<BatchOutcome, RosterError> {
        let needs_catalog = drafts.iter().any(|d| !d.skill_set.is_empty());
        let catalog = if needs_catalog {
            self.catalog(false).await?
        } else {
            Vec::new()
        };

        lock(&self.employees).begin_write();
        let mut outcome = BatchOutcome::default();

        for (index, draft) in drafts.iter().enumerate() {
            if let Err(e) = draft.validate() {
                outcome.failures.push(BatchFailure {
                    index,
                    label: draft.label(),
                    error: e.into(),
                });
                continue;
            }
            let prepared = prepare_employee_payload(draft, &catalog);
            match self.transport.create_employee(&prepared.payload).await {
                Ok(_) => {
                    outcome.created += 1;
                    push_unique(&mut outcome.unresolved, prepared.unresolved);
                }
                Err(source) => outcome.failures.push(BatchFailure {
                    index,
                    label: draft.label(),
                    error: RosterError::Mutation {
                        action: MutationKind::Create,
                        collection: Collection::Employees,
                        source,
                    },
                }),
            }
        }

        lock(&self.employees).end_write();
        if outcome.created > 0 {
            outcome.refreshed = self.refresh_employees().await;
        }
        self.report_batch(Collection::Employees, drafts.len(), &outcome);
        Ok(outcome)
    }

    // ------------------------------------------------------------------
    // Qualification writes
    // ------------------------------------------------------------------

    pub async fn create_qualification(
        &self,
        draft: &Qualification,
    ) -> Result<MutationOutcome<Qualification>, RosterError> {
        draft.validate()?;
        let created = self
            .write(
                &self.qualifications,
                MutationKind::Create,
                &draft.label(),
                self.transport.create_qualification(&draft.to_payload()),
            )
            .await?;

        let refreshed = self.refresh_qualifications().await;
        Ok(MutationOutcome {
            record: created,
            unresolved: Vec::new(),
            refreshed,
        })
    }

    /// Rename a qualification; loaded employees are refreshed as well
    pub async fn update_qualification(
        &self,
        id: i64,
        draft: &Qualification,
    ) -> Result<MutationOutcome<Qualification>, RosterError> {
        draft.validate()?;
        let updated = self
            .write(
                &self.qualifications,
                MutationKind::Update,
                &draft.label(),
                self.transport.update_qualification(id, &draft.to_payload()),
            )
            .await?;

        let refreshed = self.refresh_qualifications().await;
        self.refresh_holders().await;
        Ok(MutationOutcome {
            record: updated,
            unresolved: Vec::new(),
            refreshed,
        })
    }

    pub async fn delete_qualification(&self, id: i64) -> Result<DeleteOutcome, RosterError> {
        let label = lock(&self.qualifications)
            .find(id)
            .map(|q| q.label())
            .unwrap_or_else(|| format!("#{id}"));

        if !self.confirm_delete(Collection::Qualifications, &label) {
            return Ok(DeleteOutcome::Cancelled);
        }

        self.write(
            &self.qualifications,
            MutationKind::Delete,
            &label,
            self.transport.delete_qualification(id),
        )
        .await?;

        let refreshed = self.refresh_qualifications().await;
        self.refresh_holders().await;
        Ok(DeleteOutcome::Deleted { refreshed })
    }

    /// Create many qualifications with a single refetch at the end
    pub async fn create_qualifications(&self, drafts: &[Qualification]) -> Result<BatchOutcome, RosterError> {
        lock(&self.qualifications).begin_write();
        let mut outcome = BatchOutcome::default();

        for (index, draft) in drafts.iter().enumerate() {
            if let Err(e) = draft.validate() {
                outcome.failures.push(BatchFailure {
                    index,
                    label: draft.label(),
                    error: e.into(),
                });
                continue;
            }
            match self.transport.create_qualification(&draft.to_payload()).await {
                Ok(_) => outcome.created += 1,
                Err(source) => outcome.failures.push(BatchFailure {
                    index,
                    label: draft.label(),
                    error: RosterError::Mutation {
                        action: MutationKind::Create,
                        collection: Collection::Qualifications,
                        source,
                    },
                }),
            }
        }

        lock(&self.qualifications).end_write();
        if outcome.created > 0 {
            outcome.refreshed = self.refresh_qualifications().await;
        }
        self.report_batch(Collection::Qualifications, drafts.len(), &outcome);
        Ok(outcome)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Run one transport write, holding the collection at `Loading`
    ///
    /// Load generations are left alone: a load running alongside a failed
    /// write still lands, and after a success the caller's refetch
    /// supersedes it.
    async fn write<E: Entity, R>(
        &self,
        cache: &Mutex<EntityCache<E>>,
        action: MutationKind,
        label: &str,
        call: impl Future<Output = Result<R, TransportError>>,
    ) -> Result<R, RosterError> {
        lock(cache).begin_write();
        debug!(collection = %E::COLLECTION, %action, "write started");

        let result = call.await;
        lock(cache).end_write();
        match result {
            Ok(record) => {
                info!(collection = %E::COLLECTION, %action, label, "write succeeded");
                self.notifier.success(&format!(
                    "{} {} {}",
                    capitalized(E::COLLECTION.singular()),
                    label,
                    action.past_tense()
                ));
                Ok(record)
            }
            Err(source) => {
                warn!(collection = %E::COLLECTION, %action, label, error = %source, "write failed");
                self.notifier.error(&format!(
                    "Could not {} {} {}: {}",
                    action,
                    E::COLLECTION.singular(),
                    label,
                    source
                ));
                Err(RosterError::Mutation {
                    action,
                    collection: E::COLLECTION,
                    source,
                })
            }
        }
    }

    fn confirm_delete(&self, collection: Collection, label: &str) -> bool {
        let confirmed = self
            .confirmation
            .confirm(&format!("Delete {} {}?", collection.singular(), label));
        if !confirmed {
            debug!(%collection, label, "delete cancelled");
            self.notifier.info("Deletion cancelled");
        }
        confirmed
    }

    async fn refresh_employees(&self) -> bool {
        match self.load_employees().await {
            Ok(_) => true,
            Err(e) => {
                self.notifier.error(&e.to_string());
                false
            }
        }
    }

    async fn refresh_qualifications(&self) -> bool {
        match self.load_qualifications().await {
            Ok(_) => true,
            Err(e) => {
                self.notifier.error(&e.to_string());
                false
            }
        }
    }

    /// Employee skill names follow the catalog, so reload them if shown
    async fn refresh_holders(&self) {
        if self.employees_state() != LoadState::Empty {
            self.refresh_employees().await;
        }
    }

    fn report_unresolved(&self, label: &str, unresolved: &[String]) {
        if unresolved.is_empty() {
            return;
        }
        warn!(employee = label, skills = ?unresolved, "dropped unresolved skill references");
        self.notifier.warning(&format!(
            "{}: unknown qualification(s) not saved: {}",
            label,
            unresolved.join(", ")
        ));
    }

    fn report_batch(&self, collection: Collection, submitted: usize, outcome: &BatchOutcome) {
        info!(
            %collection,
            submitted,
            created = outcome.created,
            failed = outcome.failures.len(),
            "batch create finished"
        );
        if outcome.created > 0 {
            self.notifier
                .success(&format!("Created {} of {} {}", outcome.created, submitted, collection));
        }
        if !outcome.failures.is_empty() {
            warn!(%collection, failed = outcome.failures.len(), "batch create had failures");
            self.notifier.error(&format!(
                "{} {} could not be created",
                outcome.failures.len(),
                collection
            ));
        }
        if !outcome.unresolved.is_empty() {
            warn!(skills = ?outcome.unresolved, "dropped unresolved skill references");
            self.notifier.warning(&format!(
                "unknown qualification(s) not saved: {}",
                outcome.unresolved.join(", ")
            ));
        }
    }
}

/// Run a fetch under a fresh generation and apply it if still current
async fn load_into<E: Entity>(
    cache: &Mutex<EntityCache<E>>,
    fetch: impl Future<Output = Result<Vec<E>, TransportError>>,
) -> Result<Loaded<E>, RosterError> {
    let generation = lock(cache).begin();
    debug!(collection = %E::COLLECTION, generation = generation.value(), "load started");

    let result = fetch.await;

    let mut guard = lock(cache);
    match guard.complete(generation, result) {
        Ok(Applied::Current) => {
            debug!(collection = %E::COLLECTION, count = guard.len(), "load applied");
            Ok(Loaded::Current(guard.snapshot()))
        }
        Ok(Applied::Superseded(items)) => {
            debug!(collection = %E::COLLECTION, generation = generation.value(), "stale load discarded");
            Ok(Loaded::Superseded(items))
        }
        Err(source) => {
            warn!(collection = %E::COLLECTION, error = %source, "load failed");
            Err(RosterError::Fetch {
                collection: E::COLLECTION,
                source,
            })
        }
    }
}
