use crate::application::use_cases::analytics::{aov, roas, round2};
use crate::domain::ads::AgencyAd;
use crate::domain::calling::{CallLog, CallOutcome};
use crate::domain::deal::{Deal, DealStage};
use crate::domain::error::{AppError, Result};
use crate::domain::insight::{AiInsight, InsightPayload};
use crate::domain::lead::{Lead, LeadStatus};
use crate::domain::llm_config::LLMConfig;
use crate::domain::records::{ClientAd, Meeting, Project};
use crate::infrastructure::db::repository::{CountFilter, LeadFilter};
use crate::infrastructure::db::CrmRepository;
use crate::infrastructure::llm_clients::LLMClient;
use crate::infrastructure::response::strip_code_fences;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

const SYSTEM_PROMPT: &str = "You are an expert agency operations analyst. Your job is to produce a daily executive rundown and analytics summary for a web-creation agency CRM. Use the provided JSON data from every area of the business (clients, projects, deals, leads, meetings, client ads, cold calling, and our own agency ads). Be concise, use numbers, and give 3-5 actionable recommendations. Focus on: pipeline health, cold-call conversion, ad performance, and what to prioritize today. Output only valid JSON.";

const PROJECT_LIMIT: i64 = 50;
const DEAL_LIMIT: i64 = 100;
const LEAD_LIMIT: i64 = 500;
const MEETING_LIMIT: i64 = 100;
const CLIENT_AD_LIMIT: i64 = 100;
const CALL_LOG_LIMIT: i64 = 500;
const AGENCY_AD_LIMIT: i64 = 100;

#[derive(Debug, Serialize, Default, PartialEq)]
pub struct Snapshot {
    pub clients: ClientStats,
    pub projects: ProjectStats,
    pub deals: DealStats,
    pub leads: LeadStats,
    pub meetings: MeetingStats,
    pub client_ads: ClientAdStats,
    pub cold_calling: ColdCallingStats,
    pub agency_ads: AgencyAdStats,
}

#[derive(Debug, Serialize, Default, PartialEq)]
pub struct ClientStats {
    pub total: i64,
}

#[derive(Debug, Serialize, Default, PartialEq)]
pub struct ProjectStats {
    pub total: usize,
    pub active: usize,
}

#[derive(Debug, Serialize, Default, PartialEq)]
pub struct DealStats {
    pub total: usize,
    pub closed_won: usize,
    pub from_cold_call: usize,
}

#[derive(Debug, Serialize, Default, PartialEq)]
pub struct LeadStatusCounts {
    pub new: usize,
    pub booked: usize,
    pub no_answer: usize,
    pub didnt_book: usize,
}

#[derive(Debug, Serialize, Default, PartialEq)]
pub struct LeadStats {
    pub total: usize,
    pub by_status: LeadStatusCounts,
}

#[derive(Debug, Serialize, Default, PartialEq)]
pub struct MeetingStats {
    pub total: usize,
    pub upcoming: usize,
}

#[derive(Debug, Serialize, Default, PartialEq)]
pub struct ClientAdStats {
    pub total_spend: f64,
    pub total_revenue: f64,
    pub roas: f64,
    pub aov: f64,
}

#[derive(Debug, Serialize, Default, PartialEq)]
pub struct CallOutcomeCounts {
    pub no_answer: usize,
    pub didnt_book: usize,
    pub booked: usize,
}

#[derive(Debug, Serialize, Default, PartialEq)]
pub struct ColdCallingStats {
    pub call_outcomes: CallOutcomeCounts,
}

#[derive(Debug, Serialize, Default, PartialEq)]
pub struct AgencyAdStats {
    pub total_spend: f64,
    pub campaigns: usize,
}

/// Rows read for one snapshot.
pub struct SnapshotRows {
    pub clients: i64,
    pub projects: Vec<Project>,
    pub deals: Vec<Deal>,
    pub leads: Vec<Lead>,
    pub meetings: Vec<Meeting>,
    pub client_ads: Vec<ClientAd>,
    pub call_logs: Vec<CallLog>,
    pub agency_ads: Vec<AgencyAd>,
}

/// Accepts RFC 3339 or the zone-less `YYYY-MM-DDTHH:MM[:SS]` the booking
/// forms store, read as UTC.
fn parse_scheduled_at(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
}

pub fn summarize(rows: &SnapshotRows, now: DateTime<Utc>) -> Snapshot {
    let lead_count = |status: LeadStatus| rows.leads.iter().filter(|l| l.status == status).count();
    let call_count = |outcome: CallOutcome| {
        rows.call_logs
            .iter()
            .filter(|c| c.outcome == outcome)
            .count()
    };

    let closed_won = rows
        .deals
        .iter()
        .filter(|d| d.stage == DealStage::ClosedWon)
        .count();
    let total_spend: f64 = rows.client_ads.iter().map(|ad| ad.spend).sum();
    let total_revenue: f64 = rows.client_ads.iter().map(|ad| ad.revenue).sum();

    Snapshot {
        clients: ClientStats { total: rows.clients },
        projects: ProjectStats {
            total: rows.projects.len(),
            active: rows.projects.iter().filter(|p| p.status == "active").count(),
        },
        deals: DealStats {
            total: rows.deals.len(),
            closed_won,
            from_cold_call: rows.deals.iter().filter(|d| d.meeting_id.is_some()).count(),
        },
        leads: LeadStats {
            total: rows.leads.len(),
            by_status: LeadStatusCounts {
                new: lead_count(LeadStatus::New),
                booked: lead_count(LeadStatus::Booked),
                no_answer: lead_count(LeadStatus::NoAnswer),
                didnt_book: lead_count(LeadStatus::DidntBook),
            },
        },
        meetings: MeetingStats {
            total: rows.meetings.len(),
            upcoming: rows
                .meetings
                .iter()
                .filter(|m| parse_scheduled_at(&m.scheduled_at).is_some_and(|at| at > now))
                .count(),
        },
        client_ads: ClientAdStats {
            total_spend: round2(total_spend),
            total_revenue: round2(total_revenue),
            roas: round2(roas(total_revenue, total_spend)),
            aov: round2(aov(total_revenue, closed_won as i64)),
        },
        cold_calling: ColdCallingStats {
            call_outcomes: CallOutcomeCounts {
                no_answer: call_count(CallOutcome::NoAnswer),
                didnt_book: call_count(CallOutcome::DidntBook),
                booked: call_count(CallOutcome::Booked),
            },
        },
        agency_ads: AgencyAdStats {
            total_spend: round2(rows.agency_ads.iter().map(|a| a.spend).sum()),
            campaigns: rows.agency_ads.len(),
        },
    }
}

fn user_prompt(snapshot_json: &str) -> String {
    format!(
        "Today's full CRM data (use this for the rundown and analytics):\n\n\
         ```json\n{}\n```\n\n\
         Provide:\n\
         1. A 2-4 sentence executive summary (overall health and highlights).\n\
         2. A \"Rundown\" section: bullet points for Clients, Projects, Deals, Leads, Meetings, Ads, Cold Calling.\n\
         3. \"Actionable items\": array of 3-5 specific next steps (prioritized).\n\n\
         Format your response as JSON only:\n\
         {{\n  \"summary\": \"...\",\n  \"actionable_items\": [\"...\", \"...\", \"...\"]\n}}",
        snapshot_json
    )
}

/// Model output as `{summary, actionable_items}`. Anything that is not that
/// JSON becomes the summary verbatim.
pub fn parse_insight(raw: &str) -> InsightPayload {
    let cleaned = strip_code_fences(raw);
    serde_json::from_str::<InsightPayload>(&cleaned).unwrap_or_else(|_| InsightPayload {
        summary: cleaned,
        actionable_items: Vec::new(),
    })
}

pub struct InsightsUseCase {
    repository: Arc<CrmRepository>,
    llm_client: Arc<dyn LLMClient>,
    config: LLMConfig,
}

impl InsightsUseCase {
    pub fn new(repository: Arc<CrmRepository>, llm_client: Arc<dyn LLMClient>, config: LLMConfig) -> Self {
        Self {
            repository,
            llm_client,
            config,
        }
    }

    pub async fn list(&self) -> Result<Vec<AiInsight>> {
        self.repository.list_insights(30).await
    }

    async fn load_rows(&self) -> Result<SnapshotRows> {
        let repo = &self.repository;
        let lead_filter = LeadFilter {
            limit: Some(LEAD_LIMIT),
            ..Default::default()
        };
        let (clients, projects, deals, leads, meetings, client_ads, call_logs, agency_ads) = tokio::try_join!(
            repo.count_rows("clients", CountFilter::All),
            repo.list_projects(Some(PROJECT_LIMIT)),
            repo.list_deals(Some(DEAL_LIMIT)),
            repo.list_leads(&lead_filter),
            repo.list_meetings(Some(MEETING_LIMIT)),
            repo.list_client_ads(Some(CLIENT_AD_LIMIT)),
            repo.list_call_logs(Some(CALL_LOG_LIMIT)),
            repo.list_agency_ads(Some(AGENCY_AD_LIMIT)),
        )?;

        Ok(SnapshotRows {
            clients,
            projects,
            deals,
            leads,
            meetings,
            client_ads,
            call_logs,
            agency_ads,
        })
    }

    pub async fn generate(&self) -> Result<AiInsight> {
        // Fail before touching the database when no key is set.
        if self.config.api_key.is_none() {
            return Err(AppError::NotConfigured(
                "OPENAI_API_KEY not configured".to_string(),
            ));
        }

        let rows = self.load_rows().await?;
        let snapshot = summarize(&rows, Utc::now());
        let snapshot_json = serde_json::to_string_pretty(&snapshot).map_err(|e| {
            AppError::Internal(format!("Failed to encode snapshot: {}", e))
        })?;

        let raw = self
            .llm_client
            .generate(&self.config, SYSTEM_PROMPT, &user_prompt(&snapshot_json))
            .await?;
        let payload = parse_insight(&raw);

        let today = Utc::now().format("%Y-%m-%d").to_string();
        let insight = self.repository.upsert_insight(&today, &payload).await?;
        tracing::info!(date = %today, items = insight.actionable_items.len(), "AI insight generated");
        Ok(insight)
    }
}
