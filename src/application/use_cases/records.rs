use crate::domain::activity::{ActivityAction, ActivityEntry};
use crate::domain::error::{AppError, Result};
use crate::domain::profile::Profile;
use crate::domain::records::{
    AdCreative, AdCreativeInput, Client, ClientAd, ClientAdInput, ClientInput, Meeting, MeetingInput, Project, ProjectInput,
    WebAsset, WebAssetInput, WebAssetKind,
};
use crate::infrastructure::db::repository::NewMeeting;
use crate::infrastructure::db::CrmRepository;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

/// Newest-first window served by the activity feed.
pub const ACTIVITY_FEED_LIMIT: i64 = 500;

/// Plain CRUD for the record pages. Creates and deletes leave an entry in
/// the activity log.
pub struct RecordsUseCase {
    repository: Arc<CrmRepository>,
}

impl RecordsUseCase {
    pub fn new(repository: Arc<CrmRepository>) -> Self {
        Self { repository }
    }

    async fn record(
        &self,
        actor: &Profile,
        entity_type: &str,
        entity_id: &str,
        action: ActivityAction,
        details: serde_json::Value,
    ) -> Result<()> {
        self.repository
            .log_activity(Some(&actor.id), entity_type, entity_id, action, details)
            .await?;
        Ok(())
    }

    pub async fn list_clients(&self) -> Result<Vec<Client>> {
        self.repository.list_clients().await
    }

    pub async fn get_client(&self, id: &str) -> Result<Client> {
        self.repository.get_client(id).await
    }

    pub async fn create_client(&self, actor: &Profile, input: ClientInput) -> Result<Client> {
        input.validate()?;
        let client = self.repository.create_client(&input, &actor.id).await?;
        self.record(actor, "client", &client.id, ActivityAction::Created, json!({ "name": client.name }))
            .await?;
        Ok(client)
    }

    pub async fn update_client(&self, id: &str, input: ClientInput) -> Result<Client> {
        input.validate()?;
        self.repository.update_client(id, &input).await
    }

    pub async fn delete_client(&self, actor: &Profile, id: &str) -> Result<()> {
        self.repository.delete_client(id).await?;
        self.record(actor, "client", id, ActivityAction::Deleted, json!({})).await
    }

    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        self.repository.list_projects(None).await
    }

    pub async fn create_project(&self, actor: &Profile, input: ProjectInput) -> Result<Project> {
        input.validate()?;
        let project = self.repository.create_project(&input).await?;
        self.record(
            actor,
            "project",
            &project.id,
            ActivityAction::Created,
            json!({ "name": project.name, "client_id": project.client_id }),
        )
        .await?;
        Ok(project)
    }

    pub async fn update_project(&self, id: &str, input: ProjectInput) -> Result<Project> {
        input.validate()?;
        self.repository.update_project(id, &input).await
    }

    pub async fn delete_project(&self, actor: &Profile, id: &str) -> Result<()> {
        self.repository.delete_project(id).await?;
        self.record(actor, "project", id, ActivityAction::Deleted, json!({})).await
    }

    pub async fn list_web_assets(&self, kind: WebAssetKind) -> Result<Vec<WebAsset>> {
        self.repository.list_web_assets(kind).await
    }

    pub async fn create_web_asset(
        &self,
        actor: &Profile,
        kind: WebAssetKind,
        input: WebAssetInput,
    ) -> Result<WebAsset> {
        input.validate()?;
        let asset = self.repository.create_web_asset(kind, &input).await?;
        self.record(
            actor,
            kind.entity_type(),
            &asset.id,
            ActivityAction::Created,
            json!({ "name": asset.name }),
        )
        .await?;
        Ok(asset)
    }

    pub async fn update_web_asset(
        &self,
        kind: WebAssetKind,
        id: &str,
        input: WebAssetInput,
    ) -> Result<WebAsset> {
        input.validate()?;
        self.repository.update_web_asset(kind, id, &input).await
    }

    pub async fn delete_web_asset(&self, actor: &Profile, kind: WebAssetKind, id: &str) -> Result<()> {
        self.repository.delete_web_asset(kind, id).await?;
        self.record(actor, kind.entity_type(), id, ActivityAction::Deleted, json!({}))
            .await
    }

    pub async fn list_meetings(&self) -> Result<Vec<Meeting>> {
        self.repository.list_meetings(None).await
    }

    pub async fn book_meeting(&self, actor: &Profile, input: MeetingInput) -> Result<Meeting> {
        input.validate()?;
        let meeting = self
            .repository
            .create_meeting(&NewMeeting::manual(&input, &actor.id))
            .await?;
        self.record(
            actor,
            "meeting",
            &meeting.id,
            ActivityAction::Created,
            json!({ "scheduled_at": meeting.scheduled_at, "source": meeting.source }),
        )
        .await?;
        Ok(meeting)
    }

    pub async fn list_client_ads(&self) -> Result<Vec<ClientAd>> {
        self.repository.list_client_ads(None).await
    }

    pub async fn create_client_ad(&self, actor: &Profile, input: ClientAdInput) -> Result<ClientAd> {
        input.validate()?;
        let ad = self.repository.create_client_ad(&input).await?;
        self.record(actor, "ad", &ad.id, ActivityAction::Created, json!({ "name": ad.name }))
            .await?;
        Ok(ad)
    }

    pub async fn update_client_ad(&self, id: &str, input: ClientAdInput) -> Result<ClientAd> {
        input.validate()?;
        self.repository.update_client_ad(id, &input).await
    }

    pub async fn delete_client_ad(&self, actor: &Profile, id: &str) -> Result<()> {
        self.repository.delete_client_ad(id).await?;
        self.record(actor, "ad", id, ActivityAction::Deleted, json!({})).await
    }

    pub async fn list_ad_creatives(&self) -> Result<Vec<AdCreative>> {
        self.repository.list_ad_creatives().await
    }

    pub async fn list_project_creatives(&self, project_id: &str) -> Result<Vec<AdCreative>> {
        self.repository.get_project(project_id).await?;
        self.repository.list_project_creatives(project_id).await
    }

    pub async fn create_ad_creative(
        &self,
        actor: &Profile,
        project_id: &str,
        input: AdCreativeInput,
    ) -> Result<AdCreative> {
        check_creative(&input)?;
        self.repository.get_project(project_id).await?;
        let creative = self.repository.create_ad_creative(project_id, &input).await?;
        self.record(
            actor,
            "ad_creative",
            &creative.id,
            ActivityAction::Created,
            json!({ "name": creative.name, "project_id": project_id }),
        )
        .await?;
        Ok(creative)
    }

    pub async fn update_ad_creative(&self, id: &str, input: AdCreativeInput) -> Result<AdCreative> {
        check_creative(&input)?;
        self.repository.update_ad_creative(id, &input).await
    }

    pub async fn delete_ad_creative(&self, actor: &Profile, id: &str) -> Result<()> {
        self.repository.delete_ad_creative(id).await?;
        self.record(actor, "ad_creative", id, ActivityAction::Deleted, json!({})).await
    }

    pub async fn activity_feed(&self) -> Result<Vec<ActivityEntry>> {
        self.repository.recent_activity(ACTIVITY_FEED_LIMIT).await
    }
}

/// Media entries must be absolute http(s) URLs.
fn check_creative(input: &AdCreativeInput) -> Result<()> {
    input.validate()?;
    for raw in input.image_urls.iter().chain(&input.video_urls) {
        let valid = url::Url::parse(raw)
            .map(|parsed| matches!(parsed.scheme(), "http" | "https"))
            .unwrap_or(false);
        if !valid {
            return Err(AppError::ValidationError(format!("Invalid media URL: {}", raw)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::role::UserRole;

    async fn setup() -> (RecordsUseCase, Profile) {
        let repository = Arc::new(CrmRepository::in_memory().await.unwrap());
        let owner = repository
            .create_profile(Some("Owner"), UserRole::Owner, "hash-owner")
            .await
            .unwrap();
        (RecordsUseCase::new(repository), owner)
    }

    fn client_input(name: &str) -> ClientInput {
        ClientInput {
            name: name.to_string(),
            email: Some("hello@acme.test".to_string()),
            phone: None,
            company: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn create_and_delete_are_logged() {
        let (records, owner) = setup().await;
        let client = records.create_client(&owner, client_input("Acme")).await.unwrap();
        assert_eq!(client.created_by, owner.id);

        records.delete_client(&owner, &client.id).await.unwrap();

        let feed = records.activity_feed().await.unwrap();
        let actions: Vec<&str> = feed.iter().map(|e| e.action.as_str()).collect();
        assert_eq!(actions, vec!["deleted", "created"]);
        assert!(feed.iter().all(|e| e.entity_id == client.id));
    }

    #[tokio::test]
    async fn invalid_client_is_rejected_before_insert() {
        let (records, owner) = setup().await;
        let err = records.create_client(&owner, client_input("")).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
        assert!(records.list_clients().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn manual_meeting_is_booked_by_actor() {
        let (records, owner) = setup().await;
        let meeting = records
            .book_meeting(
                &owner,
                MeetingInput {
                    lead_id: None,
                    client_id: None,
                    scheduled_at: "2026-11-02T10:00:00".to_string(),
                    closer_id: None,
                    notes: Some("Intro call".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(meeting.booked_by, owner.id);
        assert_eq!(records.list_meetings().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn funnel_delete_logs_funnel_entity() {
        let (records, owner) = setup().await;
        let funnel = records
            .create_web_asset(
                &owner,
                WebAssetKind::Funnel,
                WebAssetInput {
                    client_id: None,
                    name: "Spring promo".to_string(),
                    url: Some("https://promo.acme.test".to_string()),
                    status: None,
                },
            )
            .await
            .unwrap();
        records
            .delete_web_asset(&owner, WebAssetKind::Funnel, &funnel.id)
            .await
            .unwrap();

        let feed = records.activity_feed().await.unwrap();
        assert!(feed.iter().all(|e| e.entity_type == "funnel"));
        assert!(records.list_web_assets(WebAssetKind::Funnel).await.unwrap().is_empty());
    }

    fn creative_input(image: &str) -> AdCreativeInput {
        AdCreativeInput {
            name: "Spring promo".to_string(),
            platform: Some("tiktok".to_string()),
            primary_text: None,
            headline: Some("Two for one".to_string()),
            cta: None,
            image_urls: vec![image.to_string()],
            video_urls: Vec::new(),
        }
    }

    #[tokio::test]
    async fn creatives_belong_to_an_existing_project() {
        let (records, owner) = setup().await;
        let err = records
            .create_ad_creative(&owner, "missing", creative_input("https://cdn.test/a.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let project = records
            .create_project(
                &owner,
                ProjectInput {
                    client_id: "client-1".to_string(),
                    name: "Promo".to_string(),
                    status: None,
                    project_type: None,
                    progress: None,
                    owner_id: None,
                    update_text: None,
                },
            )
            .await
            .unwrap();
        let err = records
            .create_ad_creative(&owner, &project.id, creative_input("not a url"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let creative = records
            .create_ad_creative(&owner, &project.id, creative_input("https://cdn.test/a.png"))
            .await
            .unwrap();
        assert_eq!(creative.platform, "tiktok");
        assert_eq!(records.list_project_creatives(&project.id).await.unwrap().len(), 1);

        records.delete_project(&owner, &project.id).await.unwrap();
        assert!(records.list_ad_creatives().await.unwrap().is_empty());
    }
}
