use crate::domain::activity::ActivityEntry;
use crate::domain::ads::{AgencyAd, FacebookLeadAd};
use crate::domain::calling::{CallLog, CallOutcome};
use crate::domain::deal::{Deal, DealStage};
use crate::domain::insight::AiInsight;
use crate::domain::invoice::{Invoice, InvoiceStatus};
use crate::domain::lead::{Lead, LeadList, LeadStatus};
use crate::domain::profile::Profile;
use crate::domain::records::{AdCreative, Client, ClientAd, Meeting, Project, WebAsset};
use crate::domain::role::UserRole;

use super::parse_json_column;

#[derive(sqlx::FromRow)]
pub(super) struct ProfileEntity {
    id: String,
    role: String,
    display_name: Option<String>,
    avatar_url: Option<String>,
    created_at: String,
    updated_at: String,
}

impl From<ProfileEntity> for Profile {
    fn from(entity: ProfileEntity) -> Self {
        Self {
            id: entity.id,
            role: entity.role.parse().unwrap_or(UserRole::Pending),
            display_name: entity.display_name,
            avatar_url: entity.avatar_url,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(super) struct ClientEntity {
    id: String,
    name: String,
    email: Option<String>,
    phone: Option<String>,
    company: Option<String>,
    notes: Option<String>,
    created_by: String,
    created_at: String,
}

impl From<ClientEntity> for Client {
    fn from(entity: ClientEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            email: entity.email,
            phone: entity.phone,
            company: entity.company,
            notes: entity.notes,
            created_by: entity.created_by,
            created_at: entity.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(super) struct ProjectEntity {
    id: String,
    client_id: String,
    name: String,
    status: String,
    project_type: String,
    progress: i64,
    owner_id: Option<String>,
    updates: String,
    created_at: String,
}

impl From<ProjectEntity> for Project {
    fn from(entity: ProjectEntity) -> Self {
        Self {
            id: entity.id,
            client_id: entity.client_id,
            name: entity.name,
            status: entity.status,
            project_type: entity.project_type,
            progress: entity.progress,
            owner_id: entity.owner_id,
            updates: parse_json_column(&entity.updates),
            created_at: entity.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(super) struct WebAssetEntity {
    id: String,
    client_id: Option<String>,
    name: String,
    url: Option<String>,
    status: String,
    created_at: String,
}

impl From<WebAssetEntity> for WebAsset {
    fn from(entity: WebAssetEntity) -> Self {
        Self {
            id: entity.id,
            client_id: entity.client_id,
            name: entity.name,
            url: entity.url,
            status: entity.status,
            created_at: entity.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(super) struct LeadEntity {
    id: String,
    client_id: Option<String>,
    name: String,
    email: Option<String>,
    phone: String,
    niche: Option<String>,
    city: Option<String>,
    website: Option<String>,
    list_id: Option<String>,
    status: String,
    cold_caller_id: Option<String>,
    source: Option<String>,
    created_at: String,
}

impl From<LeadEntity> for Lead {
    fn from(entity: LeadEntity) -> Self {
        Self {
            id: entity.id,
            client_id: entity.client_id,
            name: entity.name,
            email: entity.email,
            phone: entity.phone,
            niche: entity.niche,
            city: entity.city,
            website: entity.website,
            list_id: entity.list_id,
            status: entity.status.parse().unwrap_or(LeadStatus::New),
            cold_caller_id: entity.cold_caller_id,
            source: entity.source,
            created_at: entity.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(super) struct LeadListEntity {
    id: String,
    name: String,
    niche: Option<String>,
    total_count: i64,
    assigned_cold_callers: String,
    csv_column_map: Option<String>,
    created_at: String,
}

impl From<LeadListEntity> for LeadList {
    fn from(entity: LeadListEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            niche: entity.niche,
            total_count: entity.total_count,
            assigned_cold_callers: parse_json_column(&entity.assigned_cold_callers),
            csv_column_map: entity
                .csv_column_map
                .and_then(|raw| serde_json::from_str(&raw).ok()),
            created_at: entity.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(super) struct MeetingEntity {
    id: String,
    lead_id: Option<String>,
    client_id: Option<String>,
    scheduled_at: String,
    booked_by: String,
    closer_id: Option<String>,
    source: String,
    notes: Option<String>,
    created_at: String,
}

impl From<MeetingEntity> for Meeting {
    fn from(entity: MeetingEntity) -> Self {
        Self {
            id: entity.id,
            lead_id: entity.lead_id,
            client_id: entity.client_id,
            scheduled_at: entity.scheduled_at,
            booked_by: entity.booked_by,
            closer_id: entity.closer_id,
            source: entity.source,
            notes: entity.notes,
            created_at: entity.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(super) struct DealEntity {
    id: String,
    client_id: Option<String>,
    lead_id: Option<String>,
    meeting_id: Option<String>,
    name: String,
    value: f64,
    min_value: Option<f64>,
    max_value: Option<f64>,
    stage: String,
    closer_id: Option<String>,
    created_at: String,
    updated_at: String,
}

impl From<DealEntity> for Deal {
    fn from(entity: DealEntity) -> Self {
        Self {
            id: entity.id,
            client_id: entity.client_id,
            lead_id: entity.lead_id,
            meeting_id: entity.meeting_id,
            name: entity.name,
            value: entity.value,
            min_value: entity.min_value,
            max_value: entity.max_value,
            stage: entity.stage.parse().unwrap_or(DealStage::Qualification),
            closer_id: entity.closer_id,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(super) struct CallLogEntity {
    id: String,
    lead_id: String,
    cold_caller_id: String,
    outcome: String,
    created_at: String,
}

impl From<CallLogEntity> for CallLog {
    fn from(entity: CallLogEntity) -> Self {
        Self {
            id: entity.id,
            lead_id: entity.lead_id,
            cold_caller_id: entity.cold_caller_id,
            outcome: entity.outcome.parse().unwrap_or(CallOutcome::NoAnswer),
            created_at: entity.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(super) struct InvoiceEntity {
    id: String,
    client_id: String,
    client_name: Option<String>,
    created_by: String,
    stripe_invoice_id: Option<String>,
    stripe_customer_id: Option<String>,
    status: String,
    currency: String,
    amount_total: f64,
    amount_due: Option<f64>,
    due_date: Option<String>,
    line_items: String,
    memo: Option<String>,
    footer: Option<String>,
    sent_at: Option<String>,
    paid_at: Option<String>,
    created_at: String,
    updated_at: String,
}

impl From<InvoiceEntity> for Invoice {
    fn from(entity: InvoiceEntity) -> Self {
        Self {
            id: entity.id,
            client_id: entity.client_id,
            client_name: entity.client_name,
            created_by: entity.created_by,
            stripe_invoice_id: entity.stripe_invoice_id,
            stripe_customer_id: entity.stripe_customer_id,
            status: entity.status.parse().unwrap_or(InvoiceStatus::Draft),
            currency: entity.currency,
            amount_total: entity.amount_total,
            amount_due: entity.amount_due,
            due_date: entity.due_date,
            line_items: parse_json_column(&entity.line_items),
            memo: entity.memo,
            footer: entity.footer,
            sent_at: entity.sent_at,
            paid_at: entity.paid_at,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(super) struct ClientAdEntity {
    id: String,
    client_id: Option<String>,
    name: String,
    platform: Option<String>,
    spend: f64,
    revenue: f64,
    status: Option<String>,
    created_at: String,
}

impl From<ClientAdEntity> for ClientAd {
    fn from(entity: ClientAdEntity) -> Self {
        Self {
            id: entity.id,
            client_id: entity.client_id,
            name: entity.name,
            platform: entity.platform,
            spend: entity.spend,
            revenue: entity.revenue,
            status: entity.status,
            created_at: entity.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(super) struct AdCreativeEntity {
    id: String,
    project_id: String,
    #[sqlx(default)]
    project_name: Option<String>,
    name: String,
    platform: String,
    primary_text: Option<String>,
    headline: Option<String>,
    cta: Option<String>,
    image_urls: String,
    video_urls: String,
    created_at: String,
}

impl From<AdCreativeEntity> for AdCreative {
    fn from(entity: AdCreativeEntity) -> Self {
        Self {
            id: entity.id,
            project_id: entity.project_id,
            project_name: entity.project_name,
            name: entity.name,
            platform: entity.platform,
            primary_text: entity.primary_text,
            headline: entity.headline,
            cta: entity.cta,
            image_urls: parse_json_column(&entity.image_urls),
            video_urls: parse_json_column(&entity.video_urls),
            created_at: entity.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(super) struct AgencyAdEntity {
    id: String,
    platform: String,
    campaign_id: Option<String>,
    campaign_name: Option<String>,
    spend: f64,
    impressions: i64,
    clicks: i64,
    conversions: f64,
    lead_count: i64,
    synced_at: String,
}

impl From<AgencyAdEntity> for AgencyAd {
    fn from(entity: AgencyAdEntity) -> Self {
        Self {
            id: entity.id,
            platform: entity.platform,
            campaign_id: entity.campaign_id,
            campaign_name: entity.campaign_name,
            spend: entity.spend,
            impressions: entity.impressions,
            clicks: entity.clicks,
            conversions: entity.conversions,
            lead_count: entity.lead_count,
            synced_at: entity.synced_at,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(super) struct FacebookLeadAdEntity {
    id: String,
    leadgen_id: String,
    page_id: Option<String>,
    ad_id: Option<String>,
    form_id: Option<String>,
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    custom_fields: Option<String>,
    raw_data: String,
    synced_at: String,
}

impl From<FacebookLeadAdEntity> for FacebookLeadAd {
    fn from(entity: FacebookLeadAdEntity) -> Self {
        Self {
            id: entity.id,
            leadgen_id: entity.leadgen_id,
            page_id: entity.page_id,
            ad_id: entity.ad_id,
            form_id: entity.form_id,
            name: entity.name,
            email: entity.email,
            phone: entity.phone,
            custom_fields: entity
                .custom_fields
                .and_then(|raw| serde_json::from_str(&raw).ok()),
            raw_data: serde_json::from_str(&entity.raw_data).unwrap_or(serde_json::Value::Null),
            synced_at: entity.synced_at,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(super) struct AiInsightEntity {
    date: String,
    summary: String,
    actionable_items: String,
    created_at: String,
}

impl From<AiInsightEntity> for AiInsight {
    fn from(entity: AiInsightEntity) -> Self {
        Self {
            date: entity.date,
            summary: entity.summary,
            actionable_items: parse_json_column(&entity.actionable_items),
            created_at: entity.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(super) struct ActivityEntity {
    id: String,
    actor_id: Option<String>,
    entity_type: String,
    entity_id: String,
    action: String,
    details: String,
    created_at: String,
}

impl From<ActivityEntity> for ActivityEntry {
    fn from(entity: ActivityEntity) -> Self {
        Self {
            id: entity.id,
            actor_id: entity.actor_id,
            entity_type: entity.entity_type,
            entity_id: entity.entity_id,
            action: entity.action,
            details: serde_json::from_str(&entity.details)
                .unwrap_or_else(|_| serde_json::json!({})),
            created_at: entity.created_at,
        }
    }
}
