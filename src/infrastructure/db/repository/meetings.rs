use crate::domain::error::{AppError, Result};
use crate::domain::records::{Meeting, MeetingInput};
use crate::domain::{new_id, now_timestamp};

use super::entities::MeetingEntity;
use super::CrmRepository;

/// Meeting row as written by the booking flows.
#[derive(Debug, Clone)]
pub struct NewMeeting {
    pub lead_id: Option<String>,
    pub client_id: Option<String>,
    pub scheduled_at: String,
    pub booked_by: String,
    pub closer_id: Option<String>,
    pub source: String,
    pub notes: Option<String>,
}

impl NewMeeting {
    pub fn manual(input: &MeetingInput, booked_by: &str) -> Self {
        Self {
            lead_id: input.lead_id.clone(),
            client_id: input.client_id.clone(),
            scheduled_at: input.scheduled_at.trim().to_string(),
            booked_by: booked_by.to_string(),
            closer_id: input.closer_id.clone(),
            source: "manual".to_string(),
            notes: input.notes.clone(),
        }
    }
}

impl CrmRepository {
    pub async fn create_meeting(&self, meeting: &NewMeeting) -> Result<Meeting> {
        let created = sqlx::query_as::<_, MeetingEntity>(
            "INSERT INTO meetings (id, lead_id, client_id, scheduled_at, booked_by, closer_id, source, notes, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(new_id())
        .bind(&meeting.lead_id)
        .bind(&meeting.client_id)
        .bind(&meeting.scheduled_at)
        .bind(&meeting.booked_by)
        .bind(&meeting.closer_id)
        .bind(&meeting.source)
        .bind(&meeting.notes)
        .bind(now_timestamp())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create meeting: {}", e)))?;

        Ok(created.into())
    }

    pub async fn list_meetings(&self, limit: Option<i64>) -> Result<Vec<Meeting>> {
        let meetings = sqlx::query_as::<_, MeetingEntity>(
            "SELECT * FROM meetings ORDER BY scheduled_at DESC, rowid DESC LIMIT ?",
        )
        .bind(limit.unwrap_or(-1))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list meetings: {}", e)))?;

        Ok(meetings.into_iter().map(Into::into).collect())
    }
}
