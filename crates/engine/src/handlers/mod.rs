//! Per-event notification handlers.
//!
//! Each handler is a pure async function `(ctx, payload, domain, directory)
//! -> HandlerOutput`: it resolves the domain data and recipient sets for
//! its event and returns the email/in-app intents to emit. Nothing is
//! observable until the whole handler resolves — an error discards the
//! accumulated intents, so partial notification sets are never delivered.
//!
//! Structural-vs-expected absence is declared per handler: recipients a
//! handler is entitled to assume exist (the innovation owner on owner-facing
//! events, the task requester) abort with `NotFound` when missing; cohort
//! members (followers, assessors, bulk-resolved accessors) are skipped
//! silently when they fail to resolve.

mod innovation;
mod support;
mod task;
mod thread;

use innoflow_common::error::AppError;
use innoflow_common::types::{
    EmailIntent, InAppIntent, InnovationInfo, Recipient, RequestContext, ServiceRole,
};

use crate::event::NotifierEvent;
use crate::ports::{DomainInfo, RecipientDirectory};

/// The two intent queues a handler populates.
#[derive(Debug, Clone, Default)]
pub struct HandlerOutput {
    pub emails: Vec<EmailIntent>,
    pub in_app: Vec<InAppIntent>,
}

/// Run the handler matching `event`.
///
/// The match is exhaustive over [`NotifierEvent`]; a new event variant
/// will not compile until it gets a handler arm.
pub async fn run_handler<D, R>(
    ctx: &RequestContext,
    event: &NotifierEvent,
    domain: &D,
    directory: &R,
) -> Result<HandlerOutput, AppError>
where
    D: DomainInfo,
    R: RecipientDirectory,
{
    match event {
        NotifierEvent::TaskCreation {
            innovation_id,
            task_id,
        } => task::task_creation(ctx, *innovation_id, *task_id, domain, directory).await,
        NotifierEvent::TaskUpdate {
            innovation_id,
            task_id,
            status,
            comment,
        } => {
            task::task_update(
                ctx,
                *innovation_id,
                *task_id,
                *status,
                comment.as_deref(),
                domain,
                directory,
            )
            .await
        }
        NotifierEvent::SupportStatusUpdate {
            innovation_id,
            support_id,
            status,
            message,
            unit_id,
            assigned_accessor_ids,
        } => {
            support::support_status_update(
                ctx,
                *innovation_id,
                *support_id,
                *status,
                message.as_deref(),
                *unit_id,
                assigned_accessor_ids,
                domain,
                directory,
            )
            .await
        }
        NotifierEvent::ThreadCreation {
            innovation_id,
            thread_id,
            subject,
        } => thread::thread_creation(ctx, *innovation_id, *thread_id, subject, domain).await,
        NotifierEvent::ThreadMessageCreation {
            innovation_id,
            thread_id,
            message_id,
            subject,
        } => {
            thread::thread_message_creation(
                ctx,
                *innovation_id,
                *thread_id,
                *message_id,
                subject,
                domain,
            )
            .await
        }
        NotifierEvent::InnovationSubmitted { innovation_id } => {
            innovation::innovation_submitted(ctx, *innovation_id, domain, directory).await
        }
    }
}

/// Resolve the innovator role of the innovation owner.
///
/// The owner is a structurally required recipient on owner-facing events:
/// a missing owner or owner role aborts the run with `NotFound`.
pub(crate) async fn owner_recipient<R>(
    innovation: &InnovationInfo,
    directory: &R,
) -> Result<Recipient, AppError>
where
    R: RecipientDirectory,
{
    let owner_id = innovation.owner_id.ok_or_else(|| {
        AppError::NotFound(format!("Innovation {} has no owner", innovation.id))
    })?;

    directory
        .role_for_user(owner_id, &[ServiceRole::Innovator], None)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "Innovator role for owner of innovation {} not found",
                innovation.id
            ))
        })
}

/// Display name of the acting user's organisation unit.
///
/// Assessment-side actors have no unit; the needs-assessment team label is
/// used instead.
pub(crate) async fn actor_unit_name<D>(
    ctx: &RequestContext,
    domain: &D,
) -> Result<String, AppError>
where
    D: DomainInfo,
{
    match ctx.unit_id {
        Some(unit_id) => Ok(domain.organisation_unit_info(unit_id).await?.organisation_unit),
        None => Ok("needs assessment team".to_string()),
    }
}
