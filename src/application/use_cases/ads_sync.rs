use crate::domain::ads::{AgencyAd, CampaignMetrics, FacebookLeadAd};
use crate::domain::error::{AppError, Result};
use crate::infrastructure::config::{non_empty, require};
use crate::infrastructure::db::CrmRepository;
use crate::infrastructure::integrations::meta_graph::{AdsPlatform, META_PLATFORM};
use serde::Serialize;
use std::sync::Arc;

const LIST_LIMIT: i64 = 100;

/// Tokens for the two sync paths. The account-wide sync uses the ads token,
/// the single-account sync uses the graph token and a fixed account id.
#[derive(Debug, Clone, Default)]
pub struct AdsCredentials {
    pub access_token: Option<String>,
    pub graph_token: Option<String>,
    pub ad_account_id: Option<String>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct AdsSyncResult {
    pub ok: bool,
    pub synced: u64,
    pub message: String,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct SkippedCampaign {
    pub id: String,
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CampaignError {
    pub campaign: String,
    pub error: String,
}

#[derive(Debug, Serialize, Default)]
pub struct CampaignSyncDetails {
    pub synced_campaigns: Vec<String>,
    pub skipped_campaigns: Vec<SkippedCampaign>,
    pub errors: Vec<CampaignError>,
}

#[derive(Debug, Serialize)]
pub struct CampaignSyncReport {
    pub success: bool,
    pub synced: usize,
    pub total: usize,
    pub skipped: usize,
    pub errors: usize,
    pub details: CampaignSyncDetails,
}

pub struct AdsSyncUseCase {
    repository: Arc<CrmRepository>,
    platform: Arc<dyn AdsPlatform>,
    credentials: AdsCredentials,
}

impl AdsSyncUseCase {
    pub fn new(
        repository: Arc<CrmRepository>,
        platform: Arc<dyn AdsPlatform>,
        credentials: AdsCredentials,
    ) -> Self {
        Self {
            repository,
            platform,
            credentials,
        }
    }

    pub async fn agency_ads(&self) -> Result<Vec<AgencyAd>> {
        self.repository.list_agency_ads(Some(LIST_LIMIT)).await
    }

    pub async fn facebook_leads(&self) -> Result<Vec<FacebookLeadAd>> {
        self.repository.list_facebook_leads(Some(LIST_LIMIT)).await
    }

    /// Pulls lifetime numbers for every campaign of every account the token
    /// can see and replaces all stored `meta` rows with them.
    pub async fn sync_all_accounts(&self) -> Result<AdsSyncResult> {
        let token = non_empty(&self.credentials.access_token).ok_or_else(|| {
            AppError::ValidationError(
                "Meta Ads not configured. Set CRM_META__ACCESS_TOKEN in the environment.".to_string(),
            )
        })?;

        let accounts = self.platform.ad_accounts(&token).await?;
        let mut rows: Vec<CampaignMetrics> = Vec::new();

        for account in &accounts {
            let campaigns = match self
                .platform
                .lifetime_campaigns(&token, account.numeric_id())
                .await
            {
                Ok(campaigns) => campaigns,
                Err(e) => {
                    tracing::warn!(account = %account.id, error = %e, "Skipping ad account");
                    continue;
                }
            };

            if !campaigns.is_empty() {
                rows.extend(campaigns);
                continue;
            }

            match self.platform.account_insights(&token, account).await {
                Ok(Some(metrics)) => rows.push(metrics),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(account = %account.id, error = %e, "Account insights unavailable");
                }
            }
        }

        let synced = self
            .repository
            .replace_platform_ads(META_PLATFORM, &rows)
            .await?;
        tracing::info!(accounts = accounts.len(), synced, "Meta ads synced");

        Ok(AdsSyncResult {
            ok: true,
            synced,
            message: format!("Synced {} Meta ad campaign(s).", synced),
        })
    }

    /// Upserts the configured account's campaigns over the last 30 days.
    /// Campaigns without insights are skipped and per-row failures are reported.
    pub async fn sync_recent_campaigns(&self) -> Result<CampaignSyncReport> {
        let token = require(&self.credentials.graph_token, "FACEBOOK_GRAPH_ACCESS_TOKEN")?;
        let account_id = require(&self.credentials.ad_account_id, "META_ADS_ACCOUNT_ID")?;

        let campaigns = self.platform.recent_campaigns(&token, &account_id).await?;
        tracing::info!(count = campaigns.len(), "Meta API returned campaigns");

        let mut details = CampaignSyncDetails::default();
        for campaign in &campaigns {
            let Some(metrics) = &campaign.metrics else {
                tracing::debug!(campaign = %campaign.id, "Skipping campaign without insights");
                details.skipped_campaigns.push(SkippedCampaign {
                    id: campaign.id.clone(),
                    name: campaign.name.clone(),
                    reason: "No insights data available".to_string(),
                });
                continue;
            };

            match self.repository.upsert_agency_ad(metrics).await {
                Ok(ad) => details
                    .synced_campaigns
                    .push(ad.campaign_name.unwrap_or_default()),
                Err(e) => {
                    tracing::error!(campaign = %campaign.name, error = %e, "Agency ad upsert failed");
                    details.errors.push(CampaignError {
                        campaign: campaign.name.clone(),
                        error: e.message().to_string(),
                    });
                }
            }
        }

        Ok(CampaignSyncReport {
            success: details.errors.is_empty(),
            synced: details.synced_campaigns.len(),
            total: campaigns.len(),
            skipped: details.skipped_campaigns.len(),
            errors: details.errors.len(),
            details,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::infrastructure::integrations::meta_graph::{AdAccount, CampaignReport};
    use async_trait::async_trait;
    use serde_json::{json, Value};

    pub(crate) fn metrics(id: &str, spend: f64) -> CampaignMetrics {
        CampaignMetrics {
            platform: META_PLATFORM.to_string(),
            campaign_id: Some(id.to_string()),
            campaign_name: Some(format!("Campaign {id}")),
            spend,
            impressions: 1000,
            clicks: 25,
            conversions: 0.0,
        }
    }

    /// Account `act_1` has two campaigns, `act_2` has none, `act_3` fails.
    #[derive(Default)]
    pub(crate) struct FakeAdsPlatform {
        pub lead: Value,
    }

    #[async_trait]
    impl AdsPlatform for FakeAdsPlatform {
        async fn ad_accounts(&self, _token: &str) -> Result<Vec<AdAccount>> {
            Ok(["act_1", "act_2", "act_3"]
                .iter()
                .map(|id| AdAccount {
                    id: id.to_string(),
                    name: None,
                })
                .collect())
        }

        async fn lifetime_campaigns(&self, _token: &str, account_id: &str) -> Result<Vec<CampaignMetrics>> {
            match account_id {
                "1" => Ok(vec![metrics("c1", 10.0), metrics("c2", 20.0)]),
                "2" => Ok(Vec::new()),
                _ => Err(AppError::Upstream("permission denied".to_string())),
            }
        }

        async fn account_insights(&self, _token: &str, account: &AdAccount) -> Result<Option<CampaignMetrics>> {
            let mut row = metrics(&account.id, 5.0);
            row.campaign_name = Some(format!("Account {}", account.numeric_id()));
            Ok(Some(row))
        }

        async fn recent_campaigns(&self, _token: &str, _account_id: &str) -> Result<Vec<CampaignReport>> {
            Ok(vec![
                CampaignReport {
                    id: "c1".to_string(),
                    name: "Campaign c1".to_string(),
                    metrics: Some(metrics("c1", 42.0)),
                },
                CampaignReport {
                    id: "c9".to_string(),
                    name: "Paused".to_string(),
                    metrics: None,
                },
            ])
        }

        async fn lead_details(&self, _token: &str, leadgen_id: &str) -> Result<Value> {
            if self.lead.is_null() {
                return Err(AppError::Upstream(format!("lead {leadgen_id} not found")));
            }
            Ok(self.lead.clone())
        }
    }

    async fn use_case(credentials: AdsCredentials) -> AdsSyncUseCase {
        let repository = Arc::new(CrmRepository::in_memory().await.unwrap());
        AdsSyncUseCase::new(repository, Arc::new(FakeAdsPlatform { lead: json!(null) }), credentials)
    }

    #[tokio::test]
    async fn account_without_campaigns_gets_account_row() {
        let sync = use_case(AdsCredentials {
            access_token: Some("tok".to_string()),
            ..Default::default()
        })
        .await;

        let result = sync.sync_all_accounts().await.unwrap();
        assert_eq!(result.synced, 3);
        assert_eq!(result.message, "Synced 3 Meta ad campaign(s).");

        let ads = sync.agency_ads().await.unwrap();
        assert!(ads.iter().any(|ad| ad.campaign_name.as_deref() == Some("Account 2")));
    }

    #[tokio::test]
    async fn missing_ads_token_is_a_bad_request() {
        let sync = use_case(AdsCredentials::default()).await;
        let err = sync.sync_all_accounts().await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn recent_sync_skips_campaigns_without_insights() {
        let sync = use_case(AdsCredentials {
            graph_token: Some("graph".to_string()),
            ad_account_id: Some("123".to_string()),
            ..Default::default()
        })
        .await;

        let report = sync.sync_recent_campaigns().await.unwrap();
        assert!(report.success);
        assert_eq!((report.synced, report.total, report.skipped, report.errors), (1, 2, 1, 0));
        assert_eq!(report.details.skipped_campaigns[0].reason, "No insights data available");
        assert_eq!(sync.agency_ads().await.unwrap()[0].spend, 42.0);
    }

    #[tokio::test]
    async fn recent_sync_requires_account_id() {
        let sync = use_case(AdsCredentials {
            graph_token: Some("graph".to_string()),
            ..Default::default()
        })
        .await;
        let err = sync.sync_recent_campaigns().await.unwrap_err();
        assert_eq!(err.message(), "META_ADS_ACCOUNT_ID not configured");
    }
}
