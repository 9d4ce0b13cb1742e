//! Concrete collaborators for the notification engine.
//!
//! Postgres-backed recipient, preference, and domain-info resolution plus
//! the identity-provider HTTP client. These implement the traits in
//! `innoflow_engine::ports`; the engine itself never touches sqlx or
//! reqwest.

pub mod domain;
pub mod identity;
pub mod store;

use innoflow_common::config::AppConfig;

use crate::domain::{PgDomainInfo, PgInAppStore};
use crate::identity::IdentityClient;
use crate::store::PgDirectory;

/// Build the full collaborator set from configuration: one shared
/// connection pool, one identity client.
pub async fn from_config(
    config: &AppConfig,
) -> anyhow::Result<(PgDirectory, PgDomainInfo, PgInAppStore)> {
    let pool =
        innoflow_common::db::create_pool(&config.database_url, config.db_max_connections).await?;
    let identity = IdentityClient::new(config);

    Ok((
        PgDirectory::new(pool.clone(), identity),
        PgDomainInfo::new(pool.clone()),
        PgInAppStore::new(pool),
    ))
}
