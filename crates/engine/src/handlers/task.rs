//! Task event handlers.
//!
//! Task creation notifies the innovation owner. Task responses (DONE /
//! DECLINED) notify the requester that opened the task; cancellations and
//! reopenings notify the innovation owner. The status match is exhaustive
//! so a new task status cannot ship without template coverage.

use std::collections::BTreeMap;

use serde_json::json;
use uuid::Uuid;

use innoflow_common::error::AppError;
use innoflow_common::types::{
    EmailIntent, EmailTarget, EmailTemplate, InAppContext, InAppContextType, InAppDetail,
    InAppIntent, IntentOptions, NotificationCategory, RequestContext, TaskStatus,
};

use crate::ports::{DomainInfo, RecipientDirectory};

use super::{HandlerOutput, actor_unit_name, owner_recipient};

pub(super) async fn task_creation<D, R>(
    ctx: &RequestContext,
    innovation_id: Uuid,
    task_id: Uuid,
    domain: &D,
    directory: &R,
) -> Result<HandlerOutput, AppError>
where
    D: DomainInfo,
    R: RecipientDirectory,
{
    let innovation = domain.innovation_info(innovation_id, false).await?;
    let task = domain.task_info_with_owner(task_id).await?;
    let owner = owner_recipient(&innovation, directory).await?;
    let unit_name = actor_unit_name(ctx, domain).await?;

    let mut params = BTreeMap::new();
    params.insert("innovation_name".to_string(), innovation.name.clone());
    params.insert("task_display_id".to_string(), task.display_id.clone());
    params.insert("unit_name".to_string(), unit_name.clone());

    let emails = vec![EmailIntent {
        template: EmailTemplate::TaskCreationToInnovator,
        to: EmailTarget::Role(owner.clone()),
        category: Some(NotificationCategory::Task),
        params,
        options: IntentOptions::default(),
    }];

    let in_app = vec![InAppIntent {
        innovation_id,
        context: InAppContext {
            context_type: InAppContextType::Task,
            detail: InAppDetail::TaskCreation,
            id: task_id,
        },
        user_role_ids: vec![owner.role_id],
        params: json!({
            "task_display_id": task.display_id,
            "unit_name": unit_name,
        }),
        notification_id: None,
    }];

    Ok(HandlerOutput { emails, in_app })
}

#[allow(clippy::too_many_arguments)]
pub(super) async fn task_update<D, R>(
    _ctx: &RequestContext,
    innovation_id: Uuid,
    task_id: Uuid,
    status: TaskStatus,
    comment: Option<&str>,
    domain: &D,
    directory: &R,
) -> Result<HandlerOutput, AppError>
where
    D: DomainInfo,
    R: RecipientDirectory,
{
    let innovation = domain.innovation_info(innovation_id, false).await?;
    let task = domain.task_info_with_owner(task_id).await?;

    let mut params = BTreeMap::new();
    params.insert("innovation_name".to_string(), innovation.name.clone());
    params.insert("task_display_id".to_string(), task.display_id.clone());
    params.insert("status".to_string(), status.to_string());

    // No default arm: a new TaskStatus variant must pick its template here.
    let (template, target) = match status {
        TaskStatus::Done => (EmailTemplate::TaskDoneToRequester, task.owner.clone()),
        TaskStatus::Declined => {
            if let Some(comment) = comment {
                params.insert("comment".to_string(), comment.to_string());
            }
            (EmailTemplate::TaskDeclinedToRequester, task.owner.clone())
        }
        TaskStatus::Cancelled => (
            EmailTemplate::TaskCancelledToInnovator,
            owner_recipient(&innovation, directory).await?,
        ),
        TaskStatus::Open => (
            EmailTemplate::TaskReopenedToInnovator,
            owner_recipient(&innovation, directory).await?,
        ),
    };

    let emails = vec![EmailIntent {
        template,
        to: EmailTarget::Role(target.clone()),
        category: Some(NotificationCategory::Task),
        params,
        options: IntentOptions::default(),
    }];

    let in_app = vec![InAppIntent {
        innovation_id,
        context: InAppContext {
            context_type: InAppContextType::Task,
            detail: InAppDetail::TaskUpdate,
            id: task_id,
        },
        user_role_ids: vec![target.role_id],
        params: json!({
            "task_display_id": task.display_id,
            "status": status.to_string(),
        }),
        notification_id: None,
    }];

    Ok(HandlerOutput { emails, in_app })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeDirectory, FakeDomain, make_ctx, make_recipient};
    use innoflow_common::types::{InnovationInfo, OrganisationUnitInfo, ServiceRole, TaskInfo};

    fn fixtures() -> (FakeDomain, FakeDirectory, RequestContext, Uuid, Uuid) {
        let owner = make_recipient(ServiceRole::Innovator, "owner-identity");
        let requester = make_recipient(ServiceRole::Accessor, "requester-identity");
        let innovation_id = Uuid::new_v4();
        let task_id = Uuid::new_v4();

        let domain = FakeDomain {
            innovation: Some(InnovationInfo {
                id: innovation_id,
                name: "Portable dialysis unit".to_string(),
                owner_id: Some(owner.user_id),
                owner_identity_id: Some(owner.identity_id.clone()),
            }),
            unit: Some(OrganisationUnitInfo {
                organisation: "Health Org".to_string(),
                organisation_unit: "Evaluation Unit".to_string(),
            }),
            task: Some(TaskInfo {
                id: task_id,
                display_id: "TSK-001".to_string(),
                status: TaskStatus::Open,
                owner: requester.clone(),
            }),
            followers: vec![],
        };

        let mut directory = FakeDirectory::default();
        directory.roles.insert(owner.user_id, owner);

        let mut ctx = make_ctx(ServiceRole::QualifyingAccessor);
        ctx.unit_id = Some(Uuid::new_v4());

        (domain, directory, ctx, innovation_id, task_id)
    }

    #[tokio::test]
    async fn test_task_creation_notifies_owner() {
        let (domain, directory, ctx, innovation_id, task_id) = fixtures();

        let out = task_creation(&ctx, innovation_id, task_id, &domain, &directory)
            .await
            .unwrap();

        assert_eq!(out.emails.len(), 1);
        let email = &out.emails[0];
        assert_eq!(email.template, EmailTemplate::TaskCreationToInnovator);
        assert_eq!(email.category, Some(NotificationCategory::Task));
        assert_eq!(
            email.params.get("unit_name").map(String::as_str),
            Some("Evaluation Unit")
        );
        match &email.to {
            EmailTarget::Role(r) => assert_eq!(r.identity_id, "owner-identity"),
            other => panic!("expected role target, got {other:?}"),
        }

        assert_eq!(out.in_app.len(), 1);
        assert_eq!(out.in_app[0].context.detail, InAppDetail::TaskCreation);
        assert_eq!(out.in_app[0].user_role_ids.len(), 1);
    }

    #[tokio::test]
    async fn test_task_creation_without_unit_uses_assessment_label() {
        let (domain, directory, mut ctx, innovation_id, task_id) = fixtures();
        ctx.unit_id = None;

        let out = task_creation(&ctx, innovation_id, task_id, &domain, &directory)
            .await
            .unwrap();

        assert_eq!(
            out.emails[0].params.get("unit_name").map(String::as_str),
            Some("needs assessment team")
        );
    }

    #[tokio::test]
    async fn test_task_creation_missing_innovation_aborts() {
        let (_, directory, ctx, innovation_id, task_id) = fixtures();
        let empty_domain = FakeDomain::default();

        let result = task_creation(&ctx, innovation_id, task_id, &empty_domain, &directory).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_task_creation_missing_owner_role_aborts() {
        let (domain, _, ctx, innovation_id, task_id) = fixtures();
        let empty_directory = FakeDirectory::default();

        let result = task_creation(&ctx, innovation_id, task_id, &domain, &empty_directory).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_task_done_targets_requester() {
        let (domain, directory, ctx, innovation_id, task_id) = fixtures();

        let out = task_update(
            &ctx,
            innovation_id,
            task_id,
            TaskStatus::Done,
            None,
            &domain,
            &directory,
        )
        .await
        .unwrap();

        assert_eq!(out.emails[0].template, EmailTemplate::TaskDoneToRequester);
        match &out.emails[0].to {
            EmailTarget::Role(r) => assert_eq!(r.identity_id, "requester-identity"),
            other => panic!("expected role target, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_task_declined_carries_comment() {
        let (domain, directory, ctx, innovation_id, task_id) = fixtures();

        let out = task_update(
            &ctx,
            innovation_id,
            task_id,
            TaskStatus::Declined,
            Some("missing evidence"),
            &domain,
            &directory,
        )
        .await
        .unwrap();

        assert_eq!(
            out.emails[0].template,
            EmailTemplate::TaskDeclinedToRequester
        );
        assert_eq!(
            out.emails[0].params.get("comment").map(String::as_str),
            Some("missing evidence")
        );
    }

    #[tokio::test]
    async fn test_task_declined_without_comment_omits_param() {
        let (domain, directory, ctx, innovation_id, task_id) = fixtures();

        let out = task_update(
            &ctx,
            innovation_id,
            task_id,
            TaskStatus::Declined,
            None,
            &domain,
            &directory,
        )
        .await
        .unwrap();

        assert!(!out.emails[0].params.contains_key("comment"));
    }

    #[tokio::test]
    async fn test_task_cancelled_targets_innovation_owner() {
        let (domain, directory, ctx, innovation_id, task_id) = fixtures();

        let out = task_update(
            &ctx,
            innovation_id,
            task_id,
            TaskStatus::Cancelled,
            None,
            &domain,
            &directory,
        )
        .await
        .unwrap();

        assert_eq!(
            out.emails[0].template,
            EmailTemplate::TaskCancelledToInnovator
        );
        match &out.emails[0].to {
            EmailTarget::Role(r) => assert_eq!(r.identity_id, "owner-identity"),
            other => panic!("expected role target, got {other:?}"),
        }
        assert_eq!(out.in_app[0].context.detail, InAppDetail::TaskUpdate);
    }
}
