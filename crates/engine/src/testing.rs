//! In-memory collaborator fakes shared by the unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use innoflow_common::error::AppError;
use innoflow_common::types::{
    IdentityInfo, InnovationInfo, NotificationCategory, OrganisationUnitInfo, PreferenceValue,
    Recipient, RequestContext, ServiceRole, TaskInfo,
};

use crate::ports::{DomainInfo, PreferenceResolver, RecipientDirectory, RecipientScope};

pub(crate) fn make_recipient(role: ServiceRole, identity_id: &str) -> Recipient {
    Recipient {
        role_id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        identity_id: identity_id.to_string(),
        role,
        is_active: true,
        unit_id: None,
    }
}

pub(crate) fn make_identity(display_name: &str, email: &str) -> IdentityInfo {
    IdentityInfo {
        display_name: display_name.to_string(),
        email: email.to_string(),
    }
}

pub(crate) fn make_ctx(role: ServiceRole) -> RequestContext {
    RequestContext {
        user_id: Uuid::new_v4(),
        role_id: Uuid::new_v4(),
        identity_id: format!("actor-{}", Uuid::new_v4()),
        role,
        unit_id: None,
    }
}

/// Fixture-backed [`DomainInfo`]; `None` fields answer `NotFound`.
#[derive(Default)]
pub(crate) struct FakeDomain {
    pub innovation: Option<InnovationInfo>,
    pub unit: Option<OrganisationUnitInfo>,
    pub task: Option<TaskInfo>,
    pub followers: Vec<Recipient>,
}

#[async_trait]
impl DomainInfo for FakeDomain {
    async fn innovation_info(
        &self,
        innovation_id: Uuid,
        _include_deleted: bool,
    ) -> Result<InnovationInfo, AppError> {
        self.innovation
            .clone()
            .ok_or_else(|| AppError::NotFound(format!("Innovation {innovation_id} not found")))
    }

    async fn organisation_unit_info(
        &self,
        unit_id: Uuid,
    ) -> Result<OrganisationUnitInfo, AppError> {
        self.unit
            .clone()
            .ok_or_else(|| AppError::NotFound(format!("Organisation unit {unit_id} not found")))
    }

    async fn task_info_with_owner(&self, task_id: Uuid) -> Result<TaskInfo, AppError> {
        self.task
            .clone()
            .ok_or_else(|| AppError::NotFound(format!("Task {task_id} not found")))
    }

    async fn thread_followers(&self, _thread_id: Uuid) -> Result<Vec<Recipient>, AppError> {
        Ok(self.followers.clone())
    }
}

/// Map-backed [`RecipientDirectory`] recording its identity batch calls.
#[derive(Default)]
pub(crate) struct FakeDirectory {
    pub roles: HashMap<Uuid, Recipient>,
    pub assessors: Vec<Recipient>,
    pub identities: HashMap<String, IdentityInfo>,
    pub identity_calls: Mutex<Vec<Vec<String>>>,
}

#[async_trait]
impl RecipientDirectory for FakeDirectory {
    async fn role_for_user(
        &self,
        user_id: Uuid,
        allowed_roles: &[ServiceRole],
        _scope: Option<RecipientScope>,
    ) -> Result<Option<Recipient>, AppError> {
        Ok(self
            .roles
            .get(&user_id)
            .filter(|r| allowed_roles.contains(&r.role))
            .cloned())
    }

    async fn roles_for_users(
        &self,
        user_ids: &[Uuid],
        role: ServiceRole,
        _scope: Option<RecipientScope>,
    ) -> Result<Vec<Recipient>, AppError> {
        Ok(user_ids
            .iter()
            .filter_map(|id| self.roles.get(id))
            .filter(|r| r.role == role)
            .cloned()
            .collect())
    }

    async fn needs_assessors(&self) -> Result<Vec<Recipient>, AppError> {
        Ok(self.assessors.clone())
    }

    async fn identity_display(
        &self,
        identity_ids: &[String],
    ) -> Result<HashMap<String, IdentityInfo>, AppError> {
        self.identity_calls
            .lock()
            .unwrap()
            .push(identity_ids.to_vec());
        Ok(identity_ids
            .iter()
            .filter_map(|id| self.identities.get(id).map(|info| (id.clone(), info.clone())))
            .collect())
    }
}

/// Map-backed [`PreferenceResolver`] recording its batch calls.
#[derive(Default)]
pub(crate) struct FakePreferences {
    pub entries: HashMap<Uuid, HashMap<NotificationCategory, PreferenceValue>>,
    pub calls: Mutex<Vec<Vec<Uuid>>>,
}

#[async_trait]
impl PreferenceResolver for FakePreferences {
    async fn email_preferences(
        &self,
        role_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, HashMap<NotificationCategory, PreferenceValue>>, AppError> {
        self.calls.lock().unwrap().push(role_ids.to_vec());
        Ok(role_ids
            .iter()
            .filter_map(|id| self.entries.get(id).map(|prefs| (*id, prefs.clone())))
            .collect())
    }
}
