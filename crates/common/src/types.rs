use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Roles a user can hold within the service.
///
/// A user may hold several roles at once; each role held is a distinct
/// in-app notification target, while the underlying identity receives at
/// most one email per event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum ServiceRole {
    Innovator,
    Assessment,
    QualifyingAccessor,
    Accessor,
    Admin,
}

impl std::fmt::Display for ServiceRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceRole::Innovator => write!(f, "innovator"),
            ServiceRole::Assessment => write!(f, "assessment"),
            ServiceRole::QualifyingAccessor => write!(f, "qualifying_accessor"),
            ServiceRole::Accessor => write!(f, "accessor"),
            ServiceRole::Admin => write!(f, "admin"),
        }
    }
}

/// Notification categories used as email preference keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum NotificationCategory {
    Task,
    Support,
    Messaging,
    NeedsAssessment,
}

impl std::fmt::Display for NotificationCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationCategory::Task => write!(f, "task"),
            NotificationCategory::Support => write!(f, "support"),
            NotificationCategory::Messaging => write!(f, "messaging"),
            NotificationCategory::NeedsAssessment => write!(f, "needs_assessment"),
        }
    }
}

/// A role's email opt-in/opt-out choice for one category.
///
/// A role with no stored entry for a category is treated as `Yes` —
/// notifications are opt-out, never opt-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum PreferenceValue {
    Yes,
    No,
}

/// Review-task lifecycle statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum TaskStatus {
    Open,
    Done,
    Declined,
    Cancelled,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Open => write!(f, "open"),
            TaskStatus::Done => write!(f, "done"),
            TaskStatus::Declined => write!(f, "declined"),
            TaskStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Organisation-unit support statuses for an innovation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum SupportStatus {
    Suggested,
    Engaging,
    Waiting,
    Unsuitable,
    Closed,
}

impl std::fmt::Display for SupportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SupportStatus::Suggested => write!(f, "suggested"),
            SupportStatus::Engaging => write!(f, "engaging"),
            SupportStatus::Waiting => write!(f, "waiting"),
            SupportStatus::Unsuitable => write!(f, "unsuitable"),
            SupportStatus::Closed => write!(f, "closed"),
        }
    }
}

/// Closed enumeration of email message variants.
///
/// One variant per downstream template; the Display output is the stable
/// template id the rendering service keys on. Params are already
/// stringified when an intent is built — the renderer does no coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmailTemplate {
    TaskCreationToInnovator,
    TaskDoneToRequester,
    TaskDeclinedToRequester,
    TaskCancelledToInnovator,
    TaskReopenedToInnovator,
    SupportStatusChangedToInnovator,
    SupportNewAssignedAccessor,
    ThreadCreationToFollower,
    ThreadMessageToFollower,
    InnovationSubmittedToAssessor,
    InnovationSubmittedConfirmation,
}

impl std::fmt::Display for EmailTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmailTemplate::TaskCreationToInnovator => write!(f, "task_creation_to_innovator"),
            EmailTemplate::TaskDoneToRequester => write!(f, "task_done_to_requester"),
            EmailTemplate::TaskDeclinedToRequester => write!(f, "task_declined_to_requester"),
            EmailTemplate::TaskCancelledToInnovator => write!(f, "task_cancelled_to_innovator"),
            EmailTemplate::TaskReopenedToInnovator => write!(f, "task_reopened_to_innovator"),
            EmailTemplate::SupportStatusChangedToInnovator => {
                write!(f, "support_status_changed_to_innovator")
            }
            EmailTemplate::SupportNewAssignedAccessor => {
                write!(f, "support_new_assigned_accessor")
            }
            EmailTemplate::ThreadCreationToFollower => write!(f, "thread_creation_to_follower"),
            EmailTemplate::ThreadMessageToFollower => write!(f, "thread_message_to_follower"),
            EmailTemplate::InnovationSubmittedToAssessor => {
                write!(f, "innovation_submitted_to_assessor")
            }
            EmailTemplate::InnovationSubmittedConfirmation => {
                write!(f, "innovation_submitted_confirmation")
            }
        }
    }
}

/// Context types an in-app notification links back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum InAppContextType {
    Task,
    Support,
    Thread,
    Innovation,
}

impl std::fmt::Display for InAppContextType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InAppContextType::Task => write!(f, "task"),
            InAppContextType::Support => write!(f, "support"),
            InAppContextType::Thread => write!(f, "thread"),
            InAppContextType::Innovation => write!(f, "innovation"),
        }
    }
}

/// Fine-grained detail of what happened within an in-app context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum InAppDetail {
    TaskCreation,
    TaskUpdate,
    SupportStatusUpdate,
    ThreadCreation,
    ThreadMessageCreation,
    InnovationSubmission,
}

impl std::fmt::Display for InAppDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InAppDetail::TaskCreation => write!(f, "task_creation"),
            InAppDetail::TaskUpdate => write!(f, "task_update"),
            InAppDetail::SupportStatusUpdate => write!(f, "support_status_update"),
            InAppDetail::ThreadCreation => write!(f, "thread_creation"),
            InAppDetail::ThreadMessageCreation => write!(f, "thread_message_creation"),
            InAppDetail::InnovationSubmission => write!(f, "innovation_submission"),
        }
    }
}

/// A resolved role-bound notification target.
///
/// `role_id` is the dedup key for in-app delivery; `identity_id` is the
/// dedup key for email delivery. Recipients with `is_active = false`
/// (locked or deleted accounts) are excluded from email delivery unless an
/// intent opts in via `IntentOptions::include_locked`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub role_id: Uuid,
    pub user_id: Uuid,
    pub identity_id: String,
    pub role: ServiceRole,
    pub is_active: bool,
    pub unit_id: Option<Uuid>,
}

/// Where an email intent is addressed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmailTarget {
    /// A role-bound recipient; address and display name are resolved via
    /// the identity provider during assembly.
    Role(Recipient),
    /// A raw address known up front (e.g., a not-yet-registered invitee).
    Address {
        email: String,
        display_name: Option<String>,
    },
}

/// Per-intent delivery overrides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentOptions {
    /// Deliver even when the recipient's preference for the category is No.
    pub ignore_preferences: bool,
    /// Deliver even when the recipient account is locked.
    pub include_locked: bool,
}

/// An unresolved email request produced by an event handler.
///
/// Owned by the handler for the duration of its run and consumed exactly
/// once by the assembler; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailIntent {
    pub template: EmailTemplate,
    pub to: EmailTarget,
    /// Preference key; `None` means the email is not preference-filtered.
    pub category: Option<NotificationCategory>,
    pub params: BTreeMap<String, String>,
    pub options: IntentOptions,
}

/// Link-back context of an in-app notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InAppContext {
    pub context_type: InAppContextType,
    pub detail: InAppDetail,
    pub id: Uuid,
}

/// An in-app notification request produced by an event handler.
///
/// In-app visibility is not opt-out: no preference filtering applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InAppIntent {
    pub innovation_id: Uuid,
    pub context: InAppContext,
    pub user_role_ids: Vec<Uuid>,
    pub params: serde_json::Value,
    pub notification_id: Option<Uuid>,
}

/// A fully resolved, ready-to-send email record.
///
/// `params` carries `display_name` whenever one could be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliverableEmail {
    pub template: EmailTemplate,
    pub to: String,
    pub params: BTreeMap<String, String>,
}

/// Display data the identity provider holds for one identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityInfo {
    pub display_name: String,
    pub email: String,
}

/// Innovation summary as returned by the domain-info collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InnovationInfo {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Option<Uuid>,
    pub owner_identity_id: Option<String>,
}

/// Organisation + unit display names for an organisation unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganisationUnitInfo {
    pub organisation: String,
    pub organisation_unit: String,
}

/// Review task summary, including the role that created it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskInfo {
    pub id: Uuid,
    pub display_id: String,
    pub status: TaskStatus,
    pub owner: Recipient,
}

/// The already-authorized acting user that triggered a domain event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    pub user_id: Uuid,
    pub role_id: Uuid,
    pub identity_id: String,
    pub role: ServiceRole,
    pub unit_id: Option<Uuid>,
}
