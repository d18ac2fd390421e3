use crate::application::use_cases::scheduling::SchedulingUseCase;
use crate::domain::activity::ActivityAction;
use crate::domain::calling::{BookingDetails, CallLog, CallOutcome};
use crate::domain::deal::{Deal, DealStage, NewDeal};
use crate::domain::error::{AppError, Result};
use crate::domain::lead::{Lead, LeadStatus};
use crate::domain::profile::Profile;
use crate::domain::records::Meeting;
use crate::domain::scheduling::BookingRequest;
use crate::domain::{new_id, now_timestamp};
use crate::infrastructure::db::repository::NewMeeting;
use crate::infrastructure::db::CrmRepository;
use crate::infrastructure::integrations::workflows::{
    MeetingBookedEvent, NoAnswerEvent, WorkflowNotifier,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const COLD_CALL_SOURCE: &str = "cold_call";

/// One caller working through one list. Leads already shown are never
/// served again in the same session.
#[derive(Debug, Clone, Serialize)]
pub struct CallingSession {
    pub id: String,
    pub owner_id: String,
    pub list_id: String,
    pub viewed: Vec<String>,
    /// Lead currently on screen, waiting for an outcome.
    pub current_lead_id: Option<String>,
    pub started_at: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutcomeRequest {
    pub lead_id: String,
    pub outcome: CallOutcome,
    #[serde(default)]
    pub booking: Option<BookingDetails>,
}

#[derive(Debug, Serialize)]
pub struct OutcomeResult {
    pub call_log: CallLog,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting: Option<Meeting>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deal: Option<Deal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_link: Option<String>,
    pub next_lead: Option<Lead>,
}

/// Placeholder invitee address for leads without an email.
fn fallback_email(name: &str) -> String {
    let local = name.split_whitespace().collect::<Vec<_>>().join(".").to_lowercase();
    format!("{}@example.com", local)
}

/// A live session plus the lock that serializes its requests. The owner is
/// fixed at start, so ownership is checked without waiting on the lock.
struct SessionSlot {
    owner_id: String,
    state: tokio::sync::Mutex<CallingSession>,
}

pub struct CallingQueueUseCase {
    repository: Arc<CrmRepository>,
    notifier: Arc<dyn WorkflowNotifier>,
    scheduling: Arc<SchedulingUseCase>,
    sessions: Mutex<HashMap<String, Arc<SessionSlot>>>,
}

impl CallingQueueUseCase {
    pub fn new(
        repository: Arc<CrmRepository>,
        notifier: Arc<dyn WorkflowNotifier>,
        scheduling: Arc<SchedulingUseCase>,
    ) -> Self {
        Self {
            repository,
            notifier,
            scheduling,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    fn sessions(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Arc<SessionSlot>>>> {
        self.sessions
            .lock()
            .map_err(|_| AppError::Internal("Calling sessions lock poisoned".to_string()))
    }

    fn slot(&self, actor: &Profile, session_id: &str) -> Result<Arc<SessionSlot>> {
        let slot = self
            .sessions()?
            .get(session_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Calling session not found: {}", session_id)))?;
        if slot.owner_id != actor.id {
            return Err(AppError::Forbidden(
                "This calling session belongs to another user".to_string(),
            ));
        }
        Ok(slot)
    }

    /// Starts a session on `list_id`. A caller has one live session: any
    /// earlier one is dropped.
    pub async fn start(&self, actor: &Profile, list_id: &str) -> Result<CallingSession> {
        self.repository.get_lead_list(list_id).await?;

        let session = CallingSession {
            id: new_id(),
            owner_id: actor.id.clone(),
            list_id: list_id.to_string(),
            viewed: Vec::new(),
            current_lead_id: None,
            started_at: now_timestamp(),
        };
        {
            let mut sessions = self.sessions()?;
            sessions.retain(|_, slot| slot.owner_id != actor.id);
            sessions.insert(
                session.id.clone(),
                Arc::new(SessionSlot {
                    owner_id: actor.id.clone(),
                    state: tokio::sync::Mutex::new(session.clone()),
                }),
            );
        }

        tracing::info!(session_id = %session.id, list_id, caller = %actor.id, "Calling session started");
        Ok(session)
    }

    /// Serves the oldest callable lead this session has not shown yet.
    pub async fn next(&self, actor: &Profile, session_id: &str) -> Result<Option<Lead>> {
        let slot = self.slot(actor, session_id)?;
        let mut session = slot.state.lock().await;

        let lead = self
            .repository
            .next_callable_lead(&session.list_id, &session.viewed)
            .await?;
        session.current_lead_id = lead.as_ref().map(|l| l.id.clone());
        if let Some(lead) = &lead {
            session.viewed.push(lead.id.clone());
        }
        Ok(lead)
    }

    pub async fn record_outcome(
        &self,
        actor: &Profile,
        session_id: &str,
        request: OutcomeRequest,
    ) -> Result<OutcomeResult> {
        let slot = self.slot(actor, session_id)?;

        let booking = match (request.outcome, &request.booking) {
            (CallOutcome::Booked, Some(booking))
                if !booking.date.trim().is_empty() && !booking.time.trim().is_empty() =>
            {
                Some(booking.clone())
            }
            (CallOutcome::Booked, _) => {
                return Err(AppError::ValidationError(
                    "date and time are required to book a meeting".to_string(),
                ))
            }
            _ => None,
        };

        // Claim the served lead so a repeated post for it is rejected.
        {
            let mut session = slot.state.lock().await;
            if session.current_lead_id.as_deref() != Some(request.lead_id.as_str()) {
                return Err(AppError::ValidationError(
                    "Lead is not the one currently served by this session".to_string(),
                ));
            }
            session.current_lead_id = None;
        }

        let mut result = match self.apply_outcome(actor, &request, booking).await {
            Ok(result) => result,
            Err(e) => {
                let mut session = slot.state.lock().await;
                if session.current_lead_id.is_none() {
                    session.current_lead_id = Some(request.lead_id.clone());
                }
                return Err(e);
            }
        };

        result.next_lead = self.next(actor, session_id).await?;
        Ok(result)
    }

    async fn apply_outcome(
        &self,
        actor: &Profile,
        request: &OutcomeRequest,
        booking: Option<BookingDetails>,
    ) -> Result<OutcomeResult> {
        let lead = self.repository.get_lead(&request.lead_id).await?;
        let call_log = self
            .repository
            .create_call_log(&lead.id, &actor.id, request.outcome)
            .await?;
        let updated = self
            .repository
            .update_lead_status(&lead.id, request.outcome.lead_status())
            .await?;
        if updated.status != lead.status {
            self.repository
                .log_activity(
                    Some(&actor.id),
                    "lead",
                    &lead.id,
                    ActivityAction::StatusChanged,
                    json!({ "old_status": lead.status, "new_status": updated.status }),
                )
                .await?;
        }

        let mut result = OutcomeResult {
            call_log,
            meeting: None,
            deal: None,
            booking_link: None,
            next_lead: None,
        };

        match request.outcome {
            CallOutcome::NoAnswer => self.notify_no_answer(actor, &lead),
            CallOutcome::DidntBook => {}
            CallOutcome::Booked => {
                if let Some(booking) = booking {
                    let (meeting, deal, link) = self.book(actor, &lead, &booking).await?;
                    result.meeting = Some(meeting);
                    result.deal = Some(deal);
                    result.booking_link = link;
                }
            }
        }

        Ok(result)
    }

    // Fire and forget: the caller moves on whether or not the follow-up sends.
    fn notify_no_answer(&self, actor: &Profile, lead: &Lead) {
        let notifier = self.notifier.clone();
        let event = NoAnswerEvent {
            lead_id: lead.id.clone(),
            phone: lead.phone.clone(),
            cold_caller_id: Some(actor.id.clone()),
            list_id: lead.list_id.clone(),
        };
        tokio::spawn(async move {
            if let Err(e) = notifier.no_answer(&event).await {
                tracing::warn!(lead_id = %event.lead_id, error = %e, "No-answer workflow failed");
            }
        });
    }

    async fn book(
        &self,
        actor: &Profile,
        lead: &Lead,
        booking: &BookingDetails,
    ) -> Result<(Meeting, Deal, Option<String>)> {
        let scheduled_at = booking.scheduled_at();

        let meeting = self
            .repository
            .create_meeting(&NewMeeting {
                lead_id: Some(lead.id.clone()),
                client_id: lead.client_id.clone(),
                scheduled_at: scheduled_at.clone(),
                booked_by: actor.id.clone(),
                closer_id: None,
                source: COLD_CALL_SOURCE.to_string(),
                notes: booking.notes.clone(),
            })
            .await?;

        let deal = self
            .repository
            .create_deal(&NewDeal {
                client_id: lead.client_id.clone(),
                lead_id: Some(lead.id.clone()),
                meeting_id: Some(meeting.id.clone()),
                name: format!("Deal: {}", lead.name),
                value: 0.0,
                min_value: None,
                max_value: None,
                stage: DealStage::Qualification,
                closer_id: None,
            })
            .await?;
        self.repository
            .log_activity(
                Some(&actor.id),
                "meeting",
                &meeting.id,
                ActivityAction::Created,
                json!({ "lead_id": lead.id, "deal_id": deal.id, "source": COLD_CALL_SOURCE }),
            )
            .await?;

        let event = MeetingBookedEvent {
            lead_id: lead.id.clone(),
            meeting_time: scheduled_at.clone(),
            closer_id: None,
            cold_caller_id: Some(actor.id.clone()),
        };
        if let Err(e) = self.notifier.meeting_booked(&event).await {
            tracing::warn!(lead_id = %lead.id, error = %e, "Meeting-booked workflow failed");
        }

        let mut booking_link = None;
        if self.scheduling.is_configured() {
            let request = BookingRequest {
                event_type_uri: None,
                invitee_name: lead.name.clone(),
                invitee_email: lead
                    .email
                    .clone()
                    .unwrap_or_else(|| fallback_email(&lead.name)),
                start_time: scheduled_at,
                notes: Some(
                    booking
                        .notes
                        .clone()
                        .unwrap_or_else(|| format!("Cold call booking for {}", lead.name)),
                ),
            };
            match self.scheduling.booking_link(&request).await {
                Ok(link) => booking_link = Some(link.booking_link),
                Err(e) => tracing::warn!(lead_id = %lead.id, error = %e, "Booking link unavailable"),
            }
        }

        tracing::info!(lead_id = %lead.id, meeting_id = %meeting.id, deal_id = %deal.id, "Meeting booked from cold call");
        Ok((meeting, deal, booking_link))
    }

    pub fn end(&self, actor: &Profile, session_id: &str) -> Result<()> {
        self.slot(actor, session_id)?;
        self.sessions()?.remove(session_id);
        Ok(())
    }
}
