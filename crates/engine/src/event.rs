//! Domain events the engine reacts to.
//!
//! A closed tagged union: adding an event variant forces a handler arm in
//! `handlers::run_handler`, and adding a task status forces a template arm
//! in the task handler — missing coverage is a compile error, not a silent
//! no-op.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use innoflow_common::types::{SupportStatus, TaskStatus};

/// One variant per notifiable domain event, with its validated payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NotifierEvent {
    TaskCreation {
        innovation_id: Uuid,
        task_id: Uuid,
    },
    TaskUpdate {
        innovation_id: Uuid,
        task_id: Uuid,
        status: TaskStatus,
        comment: Option<String>,
    },
    SupportStatusUpdate {
        innovation_id: Uuid,
        support_id: Uuid,
        status: SupportStatus,
        message: Option<String>,
        unit_id: Uuid,
        assigned_accessor_ids: Vec<Uuid>,
    },
    ThreadCreation {
        innovation_id: Uuid,
        thread_id: Uuid,
        subject: String,
    },
    ThreadMessageCreation {
        innovation_id: Uuid,
        thread_id: Uuid,
        message_id: Uuid,
        subject: String,
    },
    InnovationSubmitted {
        innovation_id: Uuid,
    },
}

impl NotifierEvent {
    /// Stable event kind name for logging and queue routing.
    pub fn kind(&self) -> &'static str {
        match self {
            NotifierEvent::TaskCreation { .. } => "task_creation",
            NotifierEvent::TaskUpdate { .. } => "task_update",
            NotifierEvent::SupportStatusUpdate { .. } => "support_status_update",
            NotifierEvent::ThreadCreation { .. } => "thread_creation",
            NotifierEvent::ThreadMessageCreation { .. } => "thread_message_creation",
            NotifierEvent::InnovationSubmitted { .. } => "innovation_submitted",
        }
    }
}

impl std::fmt::Display for NotifierEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind())
    }
}
