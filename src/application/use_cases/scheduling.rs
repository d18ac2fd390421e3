use crate::domain::error::{AppError, Result};
use crate::domain::scheduling::{BookingLink, BookingRequest, ScheduledEvent};
use crate::infrastructure::integrations::calendly::{EventType, Scheduler};
use crate::infrastructure::security::bearer_token;
use serde::Serialize;
use std::sync::Arc;
use url::Url;

const NOT_CONFIGURED: &str = "Calendly API token not configured";

#[derive(Debug, Serialize)]
pub struct RefreshSummary {
    pub ok: bool,
    pub message: String,
    pub event_count: usize,
}

/// Appends the invitee to a scheduling page link so the form opens prefilled.
pub fn prefilled_link(scheduling_url: &str, name: &str, email: &str) -> Result<String> {
    let mut url = Url::parse(scheduling_url)
        .map_err(|e| AppError::Upstream(format!("Invalid scheduling URL {}: {}", scheduling_url, e)))?;
    url.query_pairs_mut()
        .append_pair("name", name)
        .append_pair("email", email);
    Ok(url.into())
}

fn pick_event_type<'a>(types: &'a [EventType], requested: Option<&str>) -> Option<&'a EventType> {
    requested
        .and_then(|uri| types.iter().find(|et| et.uri == uri))
        .or_else(|| types.first())
}

pub struct SchedulingUseCase {
    scheduler: Option<Arc<dyn Scheduler>>,
    cron_secret: Option<String>,
}

impl SchedulingUseCase {
    pub fn new(scheduler: Option<Arc<dyn Scheduler>>, cron_secret: Option<String>) -> Self {
        Self {
            scheduler,
            cron_secret,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.scheduler.is_some()
    }

    // A missing token answers 400 on the scheduling endpoints.
    fn scheduler(&self) -> Result<&Arc<dyn Scheduler>> {
        self.scheduler
            .as_ref()
            .ok_or_else(|| AppError::ValidationError(NOT_CONFIGURED.to_string()))
    }

    /// The API cannot create events directly, so this hands back the booking
    /// page of the chosen event type with the invitee filled in.
    pub async fn booking_link(&self, request: &BookingRequest) -> Result<BookingLink> {
        if request.invitee_name.trim().is_empty()
            || request.invitee_email.trim().is_empty()
            || request.start_time.trim().is_empty()
        {
            return Err(AppError::ValidationError(
                "invitee_name, invitee_email, and start_time are required".to_string(),
            ));
        }

        let types = self.scheduler()?.event_types().await?;
        let event_type = pick_event_type(&types, request.event_type_uri.as_deref()).ok_or_else(|| {
            AppError::ValidationError(
                "No event types found. Please create an event type in Calendly.".to_string(),
            )
        })?;
        let scheduling_url = event_type.scheduling_url.as_deref().ok_or_else(|| {
            AppError::Upstream(format!("Event type {} has no scheduling URL", event_type.uri))
        })?;

        Ok(BookingLink {
            booking_link: prefilled_link(
                scheduling_url,
                request.invitee_name.trim(),
                request.invitee_email.trim(),
            )?,
            event_type: event_type.name.clone(),
        })
    }

    pub async fn upcoming_events(&self) -> Result<Vec<ScheduledEvent>> {
        self.scheduler()?.upcoming_events().await
    }

    /// With a cron secret configured, only `Bearer <secret>` may trigger a refresh.
    pub fn authorize_cron(&self, authorization: Option<&str>) -> Result<()> {
        let Some(secret) = self.cron_secret.as_deref() else {
            return Ok(());
        };
        match authorization.and_then(bearer_token) {
            Some(token) if token == secret => Ok(()),
            _ => Err(AppError::Unauthorized("Unauthorized".to_string())),
        }
    }

    pub async fn refresh(&self) -> Result<RefreshSummary> {
        let event_count = self.scheduler()?.upcoming_event_count().await?;
        tracing::info!(event_count, "Calendar refreshed");
        Ok(RefreshSummary {
            ok: true,
            message: format!("Refreshed calendar. Found {} upcoming events.", event_count),
            event_count,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;

    pub(crate) struct FakeScheduler {
        pub types: Vec<EventType>,
    }

    impl FakeScheduler {
        pub(crate) fn with_default_type() -> Self {
            Self {
                types: vec![
                    EventType {
                        uri: "https://api.calendly.com/event_types/intro".to_string(),
                        name: Some("Intro Call".to_string()),
                        scheduling_url: Some("https://calendly.com/agency/intro".to_string()),
                    },
                    EventType {
                        uri: "https://api.calendly.com/event_types/audit".to_string(),
                        name: Some("Site Audit".to_string()),
                        scheduling_url: Some("https://calendly.com/agency/audit".to_string()),
                    },
                ],
            }
        }
    }

    #[async_trait]
    impl Scheduler for FakeScheduler {
        async fn event_types(&self) -> Result<Vec<EventType>> {
            Ok(self.types.clone())
        }

        async fn upcoming_events(&self) -> Result<Vec<ScheduledEvent>> {
            Ok(Vec::new())
        }

        async fn upcoming_event_count(&self) -> Result<usize> {
            Ok(3)
        }
    }

    fn request(event_type_uri: Option<&str>) -> BookingRequest {
        BookingRequest {
            event_type_uri: event_type_uri.map(str::to_string),
            invitee_name: "Joe Rossi".to_string(),
            invitee_email: "joe@pizza.test".to_string(),
            start_time: "2026-10-21T14:30:00".to_string(),
            notes: None,
        }
    }

    #[test]
    fn link_carries_encoded_invitee() {
        let link = prefilled_link("https://calendly.com/agency/intro", "Joe Rossi", "joe+1@pizza.test")
            .unwrap();
        assert_eq!(
            link,
            "https://calendly.com/agency/intro?name=Joe+Rossi&email=joe%2B1%40pizza.test"
        );
    }

    #[tokio::test]
    async fn first_event_type_is_the_default() {
        let scheduling = SchedulingUseCase::new(Some(Arc::new(FakeScheduler::with_default_type())), None);
        let link = scheduling.booking_link(&request(None)).await.unwrap();
        assert!(link.booking_link.starts_with("https://calendly.com/agency/intro?"));
        assert_eq!(link.event_type.as_deref(), Some("Intro Call"));

        let chosen = scheduling
            .booking_link(&request(Some("https://api.calendly.com/event_types/audit")))
            .await
            .unwrap();
        assert_eq!(chosen.event_type.as_deref(), Some("Site Audit"));
    }

    #[tokio::test]
    async fn no_event_types_is_a_bad_request() {
        let scheduling = SchedulingUseCase::new(Some(Arc::new(FakeScheduler { types: vec![] })), None);
        let err = scheduling.booking_link(&request(None)).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn missing_token_is_a_bad_request() {
        let scheduling = SchedulingUseCase::new(None, None);
        let err = scheduling.upcoming_events().await.unwrap_err();
        assert_eq!(err.message(), NOT_CONFIGURED);
    }

    #[tokio::test]
    async fn cron_secret_is_enforced_only_when_set() {
        let open = SchedulingUseCase::new(Some(Arc::new(FakeScheduler::with_default_type())), None);
        assert!(open.authorize_cron(None).is_ok());
        assert_eq!(open.refresh().await.unwrap().event_count, 3);

        let locked = SchedulingUseCase::new(None, Some("s3cret".to_string()));
        assert!(locked.authorize_cron(Some("Bearer s3cret")).is_ok());
        assert!(matches!(
            locked.authorize_cron(Some("Bearer wrong")),
            Err(AppError::Unauthorized(_))
        ));
        assert!(locked.authorize_cron(None).is_err());
    }
}
