//! Identity-provider client.
//!
//! Bulk lookup of display data for identity ids. Requests are chunked so a
//! large cohort never exceeds the provider's batch limit; identities the
//! provider does not know are simply absent from the result — deleted
//! accounts are expected and must not fail the batch.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use innoflow_common::config::AppConfig;
use innoflow_common::error::AppError;
use innoflow_common::types::IdentityInfo;

#[derive(Debug, Serialize)]
struct UsersInfoRequest<'a> {
    identity_ids: &'a [String],
}

#[derive(Debug, Deserialize)]
struct UsersInfoEntry {
    identity_id: String,
    display_name: String,
    email: String,
}

/// HTTP client for the external identity provider.
#[derive(Debug, Clone)]
pub struct IdentityClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    batch_size: usize,
}

impl IdentityClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.identity_api_url.trim_end_matches('/').to_string(),
            api_key: config.identity_api_key.clone(),
            batch_size: config.identity_batch_size,
        }
    }

    /// Resolve display data for a set of identity ids.
    ///
    /// Missing identities are absent from the map; only transport-level
    /// failures are errors.
    pub async fn users_info(
        &self,
        identity_ids: &[String],
    ) -> Result<HashMap<String, IdentityInfo>, AppError> {
        let mut resolved = HashMap::with_capacity(identity_ids.len());

        for chunk in identity_ids.chunks(self.batch_size.max(1)) {
            let mut request = self
                .http
                .post(format!("{}/v1/users/info", self.base_url))
                .json(&UsersInfoRequest {
                    identity_ids: chunk,
                });
            if let Some(api_key) = &self.api_key {
                request = request.bearer_auth(api_key);
            }

            let entries: Vec<UsersInfoEntry> = request
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;

            for entry in entries {
                resolved.insert(
                    entry.identity_id,
                    IdentityInfo {
                        display_name: entry.display_name,
                        email: entry.email,
                    },
                );
            }
        }

        tracing::debug!(
            requested = identity_ids.len(),
            resolved = resolved.len(),
            "Identity batch resolved"
        );

        Ok(resolved)
    }
}
