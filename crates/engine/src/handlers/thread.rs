//! Thread event handlers.
//!
//! Thread creation and new messages notify every follower of the thread
//! except the acting role. Followers are a cohort: an empty or partially
//! resolvable follower list is never an error. Emails are deduplicated by
//! identity so a user following through two roles gets one email; the
//! in-app intent keeps one entry per following role.

use std::collections::BTreeMap;

use serde_json::json;
use uuid::Uuid;

use innoflow_common::error::AppError;
use innoflow_common::types::{
    EmailIntent, EmailTarget, EmailTemplate, InAppContext, InAppContextType, InAppDetail,
    InAppIntent, IntentOptions, NotificationCategory, Recipient, RequestContext,
};

use crate::ports::{DomainInfo, dedupe_by_identity};

use super::HandlerOutput;

pub(super) async fn thread_creation<D>(
    ctx: &RequestContext,
    innovation_id: Uuid,
    thread_id: Uuid,
    subject: &str,
    domain: &D,
) -> Result<HandlerOutput, AppError>
where
    D: DomainInfo,
{
    thread_notification(
        ctx,
        innovation_id,
        thread_id,
        thread_id,
        subject,
        EmailTemplate::ThreadCreationToFollower,
        InAppDetail::ThreadCreation,
        domain,
    )
    .await
}

pub(super) async fn thread_message_creation<D>(
    ctx: &RequestContext,
    innovation_id: Uuid,
    thread_id: Uuid,
    message_id: Uuid,
    subject: &str,
    domain: &D,
) -> Result<HandlerOutput, AppError>
where
    D: DomainInfo,
{
    thread_notification(
        ctx,
        innovation_id,
        thread_id,
        message_id,
        subject,
        EmailTemplate::ThreadMessageToFollower,
        InAppDetail::ThreadMessageCreation,
        domain,
    )
    .await
}

#[allow(clippy::too_many_arguments)]
async fn thread_notification<D>(
    ctx: &RequestContext,
    innovation_id: Uuid,
    thread_id: Uuid,
    context_id: Uuid,
    subject: &str,
    template: EmailTemplate,
    detail: InAppDetail,
    domain: &D,
) -> Result<HandlerOutput, AppError>
where
    D: DomainInfo,
{
    let innovation = domain.innovation_info(innovation_id, false).await?;
    let followers: Vec<Recipient> = domain
        .thread_followers(thread_id)
        .await?
        .into_iter()
        .filter(|r| r.role_id != ctx.role_id)
        .collect();

    if followers.is_empty() {
        return Ok(HandlerOutput::default());
    }

    let mut params = BTreeMap::new();
    params.insert("innovation_name".to_string(), innovation.name);
    params.insert("subject".to_string(), subject.to_string());

    let emails = dedupe_by_identity(followers.clone())
        .into_iter()
        .map(|follower| EmailIntent {
            template,
            to: EmailTarget::Role(follower),
            category: Some(NotificationCategory::Messaging),
            params: params.clone(),
            options: IntentOptions::default(),
        })
        .collect();

    let in_app = vec![InAppIntent {
        innovation_id,
        context: InAppContext {
            context_type: InAppContextType::Thread,
            detail,
            id: context_id,
        },
        user_role_ids: followers.iter().map(|r| r.role_id).collect(),
        params: json!({ "subject": subject }),
        notification_id: None,
    }];

    Ok(HandlerOutput { emails, in_app })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeDomain, make_ctx, make_recipient};
    use innoflow_common::types::{InnovationInfo, ServiceRole};

    fn domain_with_followers(followers: Vec<Recipient>) -> (FakeDomain, Uuid) {
        let innovation_id = Uuid::new_v4();
        let domain = FakeDomain {
            innovation: Some(InnovationInfo {
                id: innovation_id,
                name: "Fall-detection wearable".to_string(),
                owner_id: None,
                owner_identity_id: None,
            }),
            unit: None,
            task: None,
            followers,
        };
        (domain, innovation_id)
    }

    #[tokio::test]
    async fn test_thread_creation_notifies_followers_except_actor() {
        let actor_follower = make_recipient(ServiceRole::Innovator, "actor-identity");
        let other = make_recipient(ServiceRole::Accessor, "other-identity");
        let (domain, innovation_id) =
            domain_with_followers(vec![actor_follower.clone(), other.clone()]);

        let mut ctx = make_ctx(ServiceRole::Innovator);
        ctx.role_id = actor_follower.role_id;

        let out = thread_creation(&ctx, innovation_id, Uuid::new_v4(), "Follow-up", &domain)
            .await
            .unwrap();

        assert_eq!(out.emails.len(), 1);
        assert_eq!(out.emails[0].template, EmailTemplate::ThreadCreationToFollower);
        match &out.emails[0].to {
            EmailTarget::Role(r) => assert_eq!(r.identity_id, "other-identity"),
            other => panic!("expected role target, got {other:?}"),
        }
        assert_eq!(out.in_app[0].user_role_ids, vec![other.role_id]);
    }

    #[tokio::test]
    async fn test_thread_message_dedupes_email_by_identity() {
        // Same identity follows through two roles: two in-app targets,
        // one email.
        let mut qa_role = make_recipient(ServiceRole::QualifyingAccessor, "shared-identity");
        let accessor_role = make_recipient(ServiceRole::Accessor, "shared-identity");
        qa_role.user_id = accessor_role.user_id;

        let (domain, innovation_id) =
            domain_with_followers(vec![qa_role.clone(), accessor_role.clone()]);
        let ctx = make_ctx(ServiceRole::Innovator);

        let out = thread_message_creation(
            &ctx,
            innovation_id,
            Uuid::new_v4(),
            Uuid::new_v4(),
            "Re: evidence",
            &domain,
        )
        .await
        .unwrap();

        assert_eq!(out.emails.len(), 1);
        assert_eq!(out.in_app[0].user_role_ids.len(), 2);
    }

    #[tokio::test]
    async fn test_no_followers_produces_no_intents() {
        let (domain, innovation_id) = domain_with_followers(vec![]);
        let ctx = make_ctx(ServiceRole::Innovator);

        let out = thread_creation(&ctx, innovation_id, Uuid::new_v4(), "Hello", &domain)
            .await
            .unwrap();

        assert!(out.emails.is_empty());
        assert!(out.in_app.is_empty());
    }
}
