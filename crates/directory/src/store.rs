//! Postgres-backed recipient directory and preference resolver.
//!
//! Role resolution reads `user_roles` joined with `users`; preference
//! resolution reads `notification_preferences`. Per the engine's absence
//! contract, rows that do not exist produce `None`/omissions, never errors.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use innoflow_common::error::AppError;
use innoflow_common::types::{
    IdentityInfo, NotificationCategory, PreferenceValue, Recipient, ServiceRole,
};
use innoflow_engine::ports::{PreferenceResolver, RecipientDirectory, RecipientScope};

use crate::identity::IdentityClient;

#[derive(Debug, sqlx::FromRow)]
struct RecipientRow {
    role_id: Uuid,
    user_id: Uuid,
    identity_id: String,
    role: ServiceRole,
    is_active: bool,
    unit_id: Option<Uuid>,
}

impl From<RecipientRow> for Recipient {
    fn from(row: RecipientRow) -> Self {
        Recipient {
            role_id: row.role_id,
            user_id: row.user_id,
            identity_id: row.identity_id,
            role: row.role,
            is_active: row.is_active,
            unit_id: row.unit_id,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PreferenceRow {
    user_role_id: Uuid,
    category: NotificationCategory,
    value: PreferenceValue,
}

/// Recipient/preference resolution over Postgres plus the identity client.
pub struct PgDirectory {
    pool: PgPool,
    identity: IdentityClient,
}

impl PgDirectory {
    pub fn new(pool: PgPool, identity: IdentityClient) -> Self {
        Self { pool, identity }
    }
}

#[async_trait]
impl RecipientDirectory for PgDirectory {
    async fn role_for_user(
        &self,
        user_id: Uuid,
        allowed_roles: &[ServiceRole],
        scope: Option<RecipientScope>,
    ) -> Result<Option<Recipient>, AppError> {
        let roles: Vec<String> = allowed_roles.iter().map(ToString::to_string).collect();
        let scope = scope.unwrap_or_default();

        let row: Option<RecipientRow> = sqlx::query_as(
            r#"
            SELECT ur.id AS role_id, ur.user_id, u.identity_id, ur.role,
                   ur.is_active, ur.organisation_unit_id AS unit_id
            FROM user_roles ur
            JOIN users u ON u.id = ur.user_id
            LEFT JOIN organisation_units ou ON ou.id = ur.organisation_unit_id
            WHERE ur.user_id = $1
              AND ur.role = ANY($2)
              AND ($3::uuid IS NULL OR ur.organisation_unit_id = $3)
              AND ($4::uuid IS NULL OR ou.organisation_id = $4)
            ORDER BY ur.created_at
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(&roles)
        .bind(scope.unit_id)
        .bind(scope.organisation_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Recipient::from))
    }

    async fn roles_for_users(
        &self,
        user_ids: &[Uuid],
        role: ServiceRole,
        scope: Option<RecipientScope>,
    ) -> Result<Vec<Recipient>, AppError> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        let scope = scope.unwrap_or_default();

        let rows: Vec<RecipientRow> = sqlx::query_as(
            r#"
            SELECT ur.id AS role_id, ur.user_id, u.identity_id, ur.role,
                   ur.is_active, ur.organisation_unit_id AS unit_id
            FROM user_roles ur
            JOIN users u ON u.id = ur.user_id
            LEFT JOIN organisation_units ou ON ou.id = ur.organisation_unit_id
            WHERE ur.user_id = ANY($1)
              AND ur.role = $2
              AND ($3::uuid IS NULL OR ur.organisation_unit_id = $3)
              AND ($4::uuid IS NULL OR ou.organisation_id = $4)
            ORDER BY ur.created_at
            "#,
        )
        .bind(user_ids)
        .bind(role.to_string())
        .bind(scope.unit_id)
        .bind(scope.organisation_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Recipient::from).collect())
    }

    async fn needs_assessors(&self) -> Result<Vec<Recipient>, AppError> {
        let rows: Vec<RecipientRow> = sqlx::query_as(
            r#"
            SELECT ur.id AS role_id, ur.user_id, u.identity_id, ur.role,
                   ur.is_active, ur.organisation_unit_id AS unit_id
            FROM user_roles ur
            JOIN users u ON u.id = ur.user_id
            WHERE ur.role = $1
              AND ur.is_active = true
            ORDER BY ur.created_at
            "#,
        )
        .bind(ServiceRole::Assessment.to_string())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Recipient::from).collect())
    }

    async fn identity_display(
        &self,
        identity_ids: &[String],
    ) -> Result<HashMap<String, IdentityInfo>, AppError> {
        if identity_ids.is_empty() {
            return Ok(HashMap::new());
        }
        self.identity.users_info(identity_ids).await
    }
}

#[async_trait]
impl PreferenceResolver for PgDirectory {
    async fn email_preferences(
        &self,
        role_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, HashMap<NotificationCategory, PreferenceValue>>, AppError> {
        if role_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<PreferenceRow> = sqlx::query_as(
            r#"
            SELECT user_role_id, category, value
            FROM notification_preferences
            WHERE user_role_id = ANY($1)
            "#,
        )
        .bind(role_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut preferences: HashMap<Uuid, HashMap<NotificationCategory, PreferenceValue>> =
            HashMap::new();
        for row in rows {
            preferences
                .entry(row.user_role_id)
                .or_default()
                .insert(row.category, row.value);
        }

        Ok(preferences)
    }
}
