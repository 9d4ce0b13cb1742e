//! Innovation submission handler.
//!
//! Submission for needs assessment notifies every needs assessor and sends
//! the owner a confirmation. The confirmation carries no preference
//! category — an innovator cannot opt out of submission receipts.

use std::collections::BTreeMap;

use serde_json::json;
use uuid::Uuid;

use innoflow_common::error::AppError;
use innoflow_common::types::{
    EmailIntent, EmailTarget, EmailTemplate, InAppContext, InAppContextType, InAppDetail,
    InAppIntent, IntentOptions, NotificationCategory, RequestContext,
};

use crate::ports::{DomainInfo, RecipientDirectory, dedupe_by_identity};

use super::{HandlerOutput, owner_recipient};

pub(super) async fn innovation_submitted<D, R>(
    _ctx: &RequestContext,
    innovation_id: Uuid,
    domain: &D,
    directory: &R,
) -> Result<HandlerOutput, AppError>
where
    D: DomainInfo,
    R: RecipientDirectory,
{
    let innovation = domain.innovation_info(innovation_id, false).await?;
    let owner = owner_recipient(&innovation, directory).await?;
    let assessors = directory.needs_assessors().await?;

    let mut params = BTreeMap::new();
    params.insert("innovation_name".to_string(), innovation.name.clone());

    let mut emails = vec![EmailIntent {
        template: EmailTemplate::InnovationSubmittedConfirmation,
        to: EmailTarget::Role(owner.clone()),
        category: None,
        params: params.clone(),
        options: IntentOptions::default(),
    }];

    for assessor in dedupe_by_identity(assessors.clone()) {
        emails.push(EmailIntent {
            template: EmailTemplate::InnovationSubmittedToAssessor,
            to: EmailTarget::Role(assessor),
            category: Some(NotificationCategory::NeedsAssessment),
            params: params.clone(),
            options: IntentOptions::default(),
        });
    }

    let mut in_app = Vec::new();
    if !assessors.is_empty() {
        in_app.push(InAppIntent {
            innovation_id,
            context: InAppContext {
                context_type: InAppContextType::Innovation,
                detail: InAppDetail::InnovationSubmission,
                id: innovation_id,
            },
            user_role_ids: assessors.iter().map(|r| r.role_id).collect(),
            params: json!({ "innovation_name": innovation.name }),
            notification_id: None,
        });
    }

    Ok(HandlerOutput { emails, in_app })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeDirectory, FakeDomain, make_ctx, make_recipient};
    use innoflow_common::types::{InnovationInfo, ServiceRole};

    fn fixtures(assessor_count: usize) -> (FakeDomain, FakeDirectory, Uuid) {
        let owner = make_recipient(ServiceRole::Innovator, "owner-identity");
        let innovation_id = Uuid::new_v4();

        let domain = FakeDomain {
            innovation: Some(InnovationInfo {
                id: innovation_id,
                name: "Triage assistant".to_string(),
                owner_id: Some(owner.user_id),
                owner_identity_id: Some(owner.identity_id.clone()),
            }),
            unit: None,
            task: None,
            followers: vec![],
        };

        let mut directory = FakeDirectory::default();
        directory.roles.insert(owner.user_id, owner);
        directory.assessors = (0..assessor_count)
            .map(|i| make_recipient(ServiceRole::Assessment, &format!("assessor-{i}")))
            .collect();

        (domain, directory, innovation_id)
    }

    #[tokio::test]
    async fn test_submission_notifies_assessors_and_owner() {
        let (domain, directory, innovation_id) = fixtures(2);
        let ctx = make_ctx(ServiceRole::Innovator);

        let out = innovation_submitted(&ctx, innovation_id, &domain, &directory)
            .await
            .unwrap();

        assert_eq!(out.emails.len(), 3);
        assert_eq!(
            out.emails[0].template,
            EmailTemplate::InnovationSubmittedConfirmation
        );
        // Confirmation is never preference-filtered
        assert_eq!(out.emails[0].category, None);
        assert!(
            out.emails[1..]
                .iter()
                .all(|e| e.template == EmailTemplate::InnovationSubmittedToAssessor)
        );
        assert_eq!(out.in_app.len(), 1);
        assert_eq!(out.in_app[0].user_role_ids.len(), 2);
    }

    #[tokio::test]
    async fn test_submission_with_no_assessors_still_confirms() {
        let (domain, directory, innovation_id) = fixtures(0);
        let ctx = make_ctx(ServiceRole::Innovator);

        let out = innovation_submitted(&ctx, innovation_id, &domain, &directory)
            .await
            .unwrap();

        assert_eq!(out.emails.len(), 1);
        assert!(out.in_app.is_empty());
    }
}
