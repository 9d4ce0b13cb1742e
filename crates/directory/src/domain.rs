//! Postgres-backed domain lookups and the in-app notification store.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use innoflow_common::error::AppError;
use innoflow_common::types::{
    InAppIntent, InnovationInfo, OrganisationUnitInfo, Recipient, ServiceRole, TaskInfo,
    TaskStatus,
};
use innoflow_engine::ports::{DomainInfo, InAppStore};

/// Read-side domain lookups the handlers consume.
pub struct PgDomainInfo {
    pool: PgPool,
}

impl PgDomainInfo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct InnovationRow {
    id: Uuid,
    name: String,
    owner_id: Option<Uuid>,
    owner_identity_id: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct TaskRow {
    id: Uuid,
    display_id: String,
    status: TaskStatus,
    owner_role_id: Uuid,
    owner_user_id: Uuid,
    owner_identity_id: String,
    owner_role: ServiceRole,
    owner_is_active: bool,
    owner_unit_id: Option<Uuid>,
}

#[derive(Debug, sqlx::FromRow)]
struct FollowerRow {
    role_id: Uuid,
    user_id: Uuid,
    identity_id: String,
    role: ServiceRole,
    is_active: bool,
    unit_id: Option<Uuid>,
}

#[async_trait]
impl DomainInfo for PgDomainInfo {
    async fn innovation_info(
        &self,
        innovation_id: Uuid,
        include_deleted: bool,
    ) -> Result<InnovationInfo, AppError> {
        let row: InnovationRow = sqlx::query_as(
            r#"
            SELECT i.id, i.name, i.owner_id, u.identity_id AS owner_identity_id
            FROM innovations i
            LEFT JOIN users u ON u.id = i.owner_id
            WHERE i.id = $1
              AND ($2 OR i.deleted_at IS NULL)
            "#,
        )
        .bind(innovation_id)
        .bind(include_deleted)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Innovation {innovation_id} not found")))?;

        Ok(InnovationInfo {
            id: row.id,
            name: row.name,
            owner_id: row.owner_id,
            owner_identity_id: row.owner_identity_id,
        })
    }

    async fn organisation_unit_info(
        &self,
        unit_id: Uuid,
    ) -> Result<OrganisationUnitInfo, AppError> {
        let row: Option<(String, String)> = sqlx::query_as(
            r#"
            SELECT o.name, ou.name
            FROM organisation_units ou
            JOIN organisations o ON o.id = ou.organisation_id
            WHERE ou.id = $1
            "#,
        )
        .bind(unit_id)
        .fetch_optional(&self.pool)
        .await?;

        let (organisation, organisation_unit) = row.ok_or_else(|| {
            AppError::NotFound(format!("Organisation unit {unit_id} not found"))
        })?;

        Ok(OrganisationUnitInfo {
            organisation,
            organisation_unit,
        })
    }

    async fn task_info_with_owner(&self, task_id: Uuid) -> Result<TaskInfo, AppError> {
        let row: TaskRow = sqlx::query_as(
            r#"
            SELECT t.id, t.display_id, t.status,
                   ur.id AS owner_role_id, ur.user_id AS owner_user_id,
                   u.identity_id AS owner_identity_id, ur.role AS owner_role,
                   ur.is_active AS owner_is_active,
                   ur.organisation_unit_id AS owner_unit_id
            FROM innovation_tasks t
            JOIN user_roles ur ON ur.id = t.created_by_role_id
            JOIN users u ON u.id = ur.user_id
            WHERE t.id = $1
            "#,
        )
        .bind(task_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Task {task_id} not found")))?;

        Ok(TaskInfo {
            id: row.id,
            display_id: row.display_id,
            status: row.status,
            owner: Recipient {
                role_id: row.owner_role_id,
                user_id: row.owner_user_id,
                identity_id: row.owner_identity_id,
                role: row.owner_role,
                is_active: row.owner_is_active,
                unit_id: row.owner_unit_id,
            },
        })
    }

    async fn thread_followers(&self, thread_id: Uuid) -> Result<Vec<Recipient>, AppError> {
        let rows: Vec<FollowerRow> = sqlx::query_as(
            r#"
            SELECT ur.id AS role_id, ur.user_id, u.identity_id, ur.role,
                   ur.is_active, ur.organisation_unit_id AS unit_id
            FROM innovation_thread_followers f
            JOIN user_roles ur ON ur.id = f.user_role_id
            JOIN users u ON u.id = ur.user_id
            WHERE f.thread_id = $1
            ORDER BY ur.created_at
            "#,
        )
        .bind(thread_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| Recipient {
                role_id: row.role_id,
                user_id: row.user_id,
                identity_id: row.identity_id,
                role: row.role,
                is_active: row.is_active,
                unit_id: row.unit_id,
            })
            .collect())
    }
}

/// Persists emitted in-app intents: one notification row per intent, one
/// recipient row per target role.
pub struct PgInAppStore {
    pool: PgPool,
}

impl PgInAppStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InAppStore for PgInAppStore {
    async fn store(&self, intents: &[InAppIntent]) -> Result<(), AppError> {
        for intent in intents {
            let notification_id = intent.notification_id.unwrap_or_else(Uuid::new_v4);

            // One transaction per intent: the notification row and its
            // recipient fan-out land together or not at all.
            let mut tx = self.pool.begin().await?;

            sqlx::query(
                r#"
                INSERT INTO notifications
                    (id, innovation_id, context_type, context_detail, context_id, params, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(notification_id)
            .bind(intent.innovation_id)
            .bind(intent.context.context_type.to_string())
            .bind(intent.context.detail.to_string())
            .bind(intent.context.id)
            .bind(&intent.params)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;

            for user_role_id in &intent.user_role_ids {
                sqlx::query(
                    r#"
                    INSERT INTO notification_users (notification_id, user_role_id)
                    VALUES ($1, $2)
                    "#,
                )
                .bind(notification_id)
                .bind(user_role_id)
                .execute(&mut *tx)
                .await?;
            }

            tx.commit().await?;

            tracing::info!(
                notification_id = %notification_id,
                innovation_id = %intent.innovation_id,
                recipients = intent.user_role_ids.len(),
                "In-app notification stored"
            );
        }

        Ok(())
    }
}
