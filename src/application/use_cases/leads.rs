use crate::domain::activity::ActivityAction;
use crate::domain::error::Result;
use crate::domain::lead::{Lead, LeadInput, LeadList, LeadListInput, LeadStatus};
use crate::domain::profile::Profile;
use crate::infrastructure::db::repository::LeadFilter;
use crate::infrastructure::db::CrmRepository;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

pub struct LeadsUseCase {
    repository: Arc<CrmRepository>,
}

impl LeadsUseCase {
    pub fn new(repository: Arc<CrmRepository>) -> Self {
        Self { repository }
    }

    pub async fn list(&self, filter: &LeadFilter) -> Result<Vec<Lead>> {
        self.repository.list_leads(filter).await
    }

    pub async fn get(&self, id: &str) -> Result<Lead> {
        self.repository.get_lead(id).await
    }

    pub async fn create(&self, actor: &Profile, input: LeadInput) -> Result<Lead> {
        input.validate()?;
        if let Some(list_id) = &input.list_id {
            self.repository.get_lead_list(list_id).await?;
        }
        let lead = self.repository.create_lead(&input).await?;
        if let Some(list_id) = &lead.list_id {
            self.repository.record_list_import(list_id, 1, None).await?;
        }
        self.repository
            .log_activity(
                Some(&actor.id),
                "lead",
                &lead.id,
                ActivityAction::Created,
                json!({ "name": lead.name }),
            )
            .await?;
        Ok(lead)
    }

    pub async fn update(&self, id: &str, input: LeadInput) -> Result<Lead> {
        input.validate()?;
        self.repository.update_lead(id, &input).await
    }

    pub async fn change_status(&self, actor: &Profile, id: &str, status: LeadStatus) -> Result<Lead> {
        let current = self.repository.get_lead(id).await?;
        if current.status == status {
            return Ok(current);
        }
        let lead = self.repository.update_lead_status(id, status).await?;
        self.repository
            .log_activity(
                Some(&actor.id),
                "lead",
                id,
                ActivityAction::StatusChanged,
                json!({ "old_status": current.status, "new_status": status }),
            )
            .await?;
        Ok(lead)
    }

    pub async fn delete(&self, actor: &Profile, id: &str) -> Result<()> {
        self.repository.delete_lead(id).await?;
        self.repository
            .log_activity(Some(&actor.id), "lead", id, ActivityAction::Deleted, json!({}))
            .await?;
        Ok(())
    }

    pub async fn lists(&self) -> Result<Vec<LeadList>> {
        self.repository.list_lead_lists().await
    }

    pub async fn get_list(&self, id: &str) -> Result<LeadList> {
        self.repository.get_lead_list(id).await
    }

    pub async fn create_list(&self, actor: &Profile, input: LeadListInput) -> Result<LeadList> {
        input.validate()?;
        let list = self.repository.create_lead_list(&input).await?;
        self.repository
            .log_activity(
                Some(&actor.id),
                "lead_list",
                &list.id,
                ActivityAction::Created,
                json!({ "name": list.name }),
            )
            .await?;
        Ok(list)
    }

    pub async fn update_list(&self, id: &str, input: LeadListInput) -> Result<LeadList> {
        input.validate()?;
        self.repository.update_lead_list(id, &input).await
    }

    pub async fn delete_list(&self, actor: &Profile, id: &str) -> Result<()> {
        self.repository.delete_lead_list(id).await?;
        self.repository
            .log_activity(Some(&actor.id), "lead_list", id, ActivityAction::Deleted, json!({}))
            .await?;
        Ok(())
    }
}
