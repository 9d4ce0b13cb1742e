//! Support status event handler.
//!
//! A support status change always goes to the innovation owner. When a
//! unit moves to ENGAGING the newly assigned accessors are notified too;
//! that cohort is resolved in bulk and unresolvable members are skipped
//! silently.

use std::collections::BTreeMap;

use serde_json::json;
use uuid::Uuid;

use innoflow_common::error::AppError;
use innoflow_common::types::{
    EmailIntent, EmailTarget, EmailTemplate, InAppContext, InAppContextType, InAppDetail,
    InAppIntent, IntentOptions, NotificationCategory, RequestContext, ServiceRole, SupportStatus,
};

use crate::ports::{DomainInfo, RecipientDirectory, RecipientScope, dedupe_by_identity};

use super::{HandlerOutput, owner_recipient};

#[allow(clippy::too_many_arguments)]
pub(super) async fn support_status_update<D, R>(
    ctx: &RequestContext,
    innovation_id: Uuid,
    support_id: Uuid,
    status: SupportStatus,
    message: Option<&str>,
    unit_id: Uuid,
    assigned_accessor_ids: &[Uuid],
    domain: &D,
    directory: &R,
) -> Result<HandlerOutput, AppError>
where
    D: DomainInfo,
    R: RecipientDirectory,
{
    let innovation = domain.innovation_info(innovation_id, false).await?;
    let owner = owner_recipient(&innovation, directory).await?;
    let unit = domain.organisation_unit_info(unit_id).await?;

    let unit_name = unit.organisation_unit;

    let mut params = BTreeMap::new();
    params.insert("innovation_name".to_string(), innovation.name.clone());
    params.insert("organisation_unit".to_string(), unit_name.clone());
    params.insert("support_status".to_string(), status.to_string());
    if let Some(message) = message {
        params.insert("message".to_string(), message.to_string());
    }

    let mut emails = vec![EmailIntent {
        template: EmailTemplate::SupportStatusChangedToInnovator,
        to: EmailTarget::Role(owner.clone()),
        category: Some(NotificationCategory::Support),
        params: params.clone(),
        options: IntentOptions::default(),
    }];

    let mut in_app = vec![InAppIntent {
        innovation_id,
        context: InAppContext {
            context_type: InAppContextType::Support,
            detail: InAppDetail::SupportStatusUpdate,
            id: support_id,
        },
        user_role_ids: vec![owner.role_id],
        params: json!({
            "support_status": status.to_string(),
            "organisation_unit": unit_name.clone(),
        }),
        notification_id: None,
    }];

    if status == SupportStatus::Engaging && !assigned_accessor_ids.is_empty() {
        let scope = RecipientScope {
            unit_id: Some(unit_id),
            organisation_id: None,
        };
        let accessors: Vec<_> = directory
            .roles_for_users(assigned_accessor_ids, ServiceRole::Accessor, Some(scope))
            .await?
            .into_iter()
            .filter(|r| r.role_id != ctx.role_id)
            .collect();

        for accessor in dedupe_by_identity(accessors.clone()) {
            emails.push(EmailIntent {
                template: EmailTemplate::SupportNewAssignedAccessor,
                to: EmailTarget::Role(accessor),
                category: Some(NotificationCategory::Support),
                params: params.clone(),
                options: IntentOptions::default(),
            });
        }

        if !accessors.is_empty() {
            in_app.push(InAppIntent {
                innovation_id,
                context: InAppContext {
                    context_type: InAppContextType::Support,
                    detail: InAppDetail::SupportStatusUpdate,
                    id: support_id,
                },
                user_role_ids: accessors.iter().map(|r| r.role_id).collect(),
                params: json!({
                    "innovation_name": innovation.name,
                    "organisation_unit": unit_name,
                }),
                notification_id: None,
            });
        }
    }

    Ok(HandlerOutput { emails, in_app })
}
