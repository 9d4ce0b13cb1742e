//! Collaborator seams of the engine.
//!
//! Everything the engine needs from the rest of the system comes in through
//! these traits: recipient/role resolution, identity display lookups, email
//! preferences, domain lookups, and the two output sinks. Handlers receive
//! them by parameter injection so every one of them runs against fakes in
//! tests.
//!
//! Absence contract: "recipient not found" is `None` or a missing map
//! entry, never an error. Only structural failures (a missing innovation,
//! a broken query) surface as `AppError`.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use uuid::Uuid;

use innoflow_common::error::AppError;
use innoflow_common::types::{
    DeliverableEmail, IdentityInfo, InAppIntent, InnovationInfo, NotificationCategory,
    OrganisationUnitInfo, PreferenceValue, Recipient, ServiceRole, TaskInfo,
};

/// Optional unit/organisation scoping for role resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecipientScope {
    pub unit_id: Option<Uuid>,
    pub organisation_id: Option<Uuid>,
}

/// Resolves abstract recipient descriptors into concrete [`Recipient`]s.
#[async_trait]
pub trait RecipientDirectory: Send + Sync {
    /// Resolve the role a user holds among `allowed_roles`, optionally
    /// scoped to a unit/organisation. `None` means "do not notify".
    async fn role_for_user(
        &self,
        user_id: Uuid,
        allowed_roles: &[ServiceRole],
        scope: Option<RecipientScope>,
    ) -> Result<Option<Recipient>, AppError>;

    /// Batched variant of [`role_for_user`](Self::role_for_user) for one
    /// role. Users that fail to resolve are silently omitted — deleted and
    /// unknown accounts are expected in steady state.
    async fn roles_for_users(
        &self,
        user_ids: &[Uuid],
        role: ServiceRole,
        scope: Option<RecipientScope>,
    ) -> Result<Vec<Recipient>, AppError>;

    /// All active holders of the needs-assessment role.
    async fn needs_assessors(&self) -> Result<Vec<Recipient>, AppError>;

    /// Bulk identity-provider lookup. Identities the provider does not know
    /// are simply absent from the returned map.
    async fn identity_display(
        &self,
        identity_ids: &[String],
    ) -> Result<HashMap<String, IdentityInfo>, AppError>;
}

/// Returns each role's email opt-in/opt-out choices per category.
#[async_trait]
pub trait PreferenceResolver: Send + Sync {
    /// Roles without a stored entry for a category are absent from the
    /// inner map; callers must treat absence as Yes.
    async fn email_preferences(
        &self,
        role_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, HashMap<NotificationCategory, PreferenceValue>>, AppError>;
}

/// Domain lookups the handlers need.
///
/// These return `AppError::NotFound` when the id does not exist; handlers
/// let that abort the whole run so partial notification sets are never
/// delivered.
#[async_trait]
pub trait DomainInfo: Send + Sync {
    async fn innovation_info(
        &self,
        innovation_id: Uuid,
        include_deleted: bool,
    ) -> Result<InnovationInfo, AppError>;

    async fn organisation_unit_info(
        &self,
        unit_id: Uuid,
    ) -> Result<OrganisationUnitInfo, AppError>;

    async fn task_info_with_owner(&self, task_id: Uuid) -> Result<TaskInfo, AppError>;

    /// Followers of a thread, one entry per following role.
    async fn thread_followers(&self, thread_id: Uuid) -> Result<Vec<Recipient>, AppError>;
}

/// Downstream email transport boundary.
#[async_trait]
pub trait EmailSink: Send + Sync {
    async fn deliver(&self, emails: &[DeliverableEmail]) -> Result<(), AppError>;
}

/// Downstream in-app notification store boundary.
#[async_trait]
pub trait InAppStore: Send + Sync {
    async fn store(&self, intents: &[InAppIntent]) -> Result<(), AppError>;
}

/// Drop recipients sharing an identity with an earlier one, keeping input
/// order. One identity gets at most one email per event even when it holds
/// several roles.
pub fn dedupe_by_identity(recipients: Vec<Recipient>) -> Vec<Recipient> {
    let mut seen: HashSet<String> = HashSet::new();
    recipients
        .into_iter()
        .filter(|r| seen.insert(r.identity_id.clone()))
        .collect()
}
