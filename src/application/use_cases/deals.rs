use crate::domain::activity::ActivityAction;
use crate::domain::deal::{Deal, DealInput, DealStage, NewDeal};
use crate::domain::error::Result;
use crate::domain::profile::Profile;
use crate::infrastructure::db::CrmRepository;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

pub struct DealsUseCase {
    repository: Arc<CrmRepository>,
}

impl DealsUseCase {
    pub fn new(repository: Arc<CrmRepository>) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> Result<Vec<Deal>> {
        self.repository.list_deals(None).await
    }

    pub async fn get(&self, id: &str) -> Result<Deal> {
        self.repository.get_deal(id).await
    }

    pub async fn create(&self, actor: &Profile, input: DealInput) -> Result<Deal> {
        input.validate()?;
        let deal = self.repository.create_deal(&NewDeal::from(input)).await?;
        self.repository
            .log_activity(
                Some(&actor.id),
                "deal",
                &deal.id,
                ActivityAction::Created,
                json!({ "name": deal.name, "value": deal.value, "stage": deal.stage }),
            )
            .await?;
        Ok(deal)
    }

    pub async fn update(&self, id: &str, input: DealInput) -> Result<Deal> {
        input.validate()?;
        self.repository.update_deal(id, &input).await
    }

    /// Moves a deal through the pipeline. Moving to the stage it is already
    /// in is a no-op and leaves no activity entry.
    pub async fn change_stage(&self, actor: &Profile, id: &str, stage: DealStage) -> Result<Deal> {
        let current = self.repository.get_deal(id).await?;
        if current.stage == stage {
            return Ok(current);
        }

        let deal = self.repository.update_deal_stage(id, stage).await?;
        self.repository
            .log_activity(
                Some(&actor.id),
                "deal",
                id,
                ActivityAction::StatusChanged,
                json!({ "old_stage": current.stage, "new_stage": stage }),
            )
            .await?;
        tracing::info!(deal_id = id, from = current.stage.as_str(), to = stage.as_str(), "Deal stage changed");
        Ok(deal)
    }

    pub async fn delete(&self, actor: &Profile, id: &str) -> Result<()> {
        self.repository.delete_deal(id).await?;
        self.repository
            .log_activity(Some(&actor.id), "deal", id, ActivityAction::Deleted, json!({}))
            .await?;
        Ok(())
    }
}
