//! Email assembly — resolves a handler's email intents into deliverable
//! emails.
//!
//! Pipeline over one intent batch:
//! 1. Collect the distinct role ids among role targets and fetch their
//!    preferences in ONE batched call
//! 2. Collect the distinct identity ids among role targets and resolve
//!    display data in ONE batched call
//! 3. Walk the intents in order, dropping per-row: locked recipients
//!    (unless `include_locked`), opted-out categories (default Yes,
//!    unless `ignore_preferences`), unresolvable identities
//! 4. Inject `display_name` into params when not already present
//!
//! The batching dedup is part of the contract — the preference resolver
//! must see each role id once per batch, not once per intent. Output is
//! NOT deduplicated: two templates addressed to the same recipient both
//! deliver. A single bad recipient never fails the batch.

use std::collections::HashSet;

use innoflow_common::error::AppError;
use innoflow_common::types::{
    DeliverableEmail, EmailIntent, EmailTarget, PreferenceValue,
};
use uuid::Uuid;

use crate::ports::{PreferenceResolver, RecipientDirectory};

pub async fn assemble_emails<R, P>(
    intents: Vec<EmailIntent>,
    directory: &R,
    preferences: &P,
) -> Result<Vec<DeliverableEmail>, AppError>
where
    R: RecipientDirectory,
    P: PreferenceResolver,
{
    // Distinct role ids across role targets, first occurrence wins
    let mut seen_roles: HashSet<Uuid> = HashSet::new();
    let mut role_ids: Vec<Uuid> = Vec::new();
    for intent in &intents {
        if let EmailTarget::Role(recipient) = &intent.to {
            if seen_roles.insert(recipient.role_id) {
                role_ids.push(recipient.role_id);
            }
        }
    }

    let preference_map = if role_ids.is_empty() {
        Default::default()
    } else {
        preferences.email_preferences(&role_ids).await?
    };

    // Distinct identity ids needing display/address resolution
    let mut seen_identities: HashSet<String> = HashSet::new();
    let mut identity_ids: Vec<String> = Vec::new();
    for intent in &intents {
        if let EmailTarget::Role(recipient) = &intent.to {
            if seen_identities.insert(recipient.identity_id.clone()) {
                identity_ids.push(recipient.identity_id.clone());
            }
        }
    }

    let identity_map = if identity_ids.is_empty() {
        Default::default()
    } else {
        directory.identity_display(&identity_ids).await?
    };

    let mut deliverable = Vec::with_capacity(intents.len());

    for intent in intents {
        match intent.to {
            EmailTarget::Role(recipient) => {
                if !recipient.is_active && !intent.options.include_locked {
                    tracing::debug!(
                        role_id = %recipient.role_id,
                        template = %intent.template,
                        "Email suppressed — recipient locked"
                    );
                    continue;
                }

                if let Some(category) = intent.category {
                    if !intent.options.ignore_preferences {
                        // Absent entries mean Yes: opt-out, never opt-in
                        let wants_email = preference_map
                            .get(&recipient.role_id)
                            .and_then(|prefs| prefs.get(&category))
                            .map(|value| *value == PreferenceValue::Yes)
                            .unwrap_or(true);
                        if !wants_email {
                            tracing::debug!(
                                role_id = %recipient.role_id,
                                category = %category,
                                template = %intent.template,
                                "Email suppressed — recipient opted out"
                            );
                            continue;
                        }
                    }
                }

                let Some(identity) = identity_map.get(&recipient.identity_id) else {
                    tracing::warn!(
                        role_id = %recipient.role_id,
                        template = %intent.template,
                        "Email skipped — identity not resolvable"
                    );
                    continue;
                };

                let mut params = intent.params;
                params
                    .entry("display_name".to_string())
                    .or_insert_with(|| identity.display_name.clone());

                deliverable.push(DeliverableEmail {
                    template: intent.template,
                    to: identity.email.clone(),
                    params,
                });
            }
            EmailTarget::Address {
                email,
                display_name,
            } => {
                let mut params = intent.params;
                if let Some(display_name) = display_name {
                    params
                        .entry("display_name".to_string())
                        .or_insert(display_name);
                }

                deliverable.push(DeliverableEmail {
                    template: intent.template,
                    to: email,
                    params,
                });
            }
        }
    }

    Ok(deliverable)
}
