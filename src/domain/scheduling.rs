use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ScheduledEvent {
    pub id: String,
    pub uri: String,
    pub name: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub location: Option<serde_json::Value>,
    pub invitees: Vec<String>,
    pub invitee_count: usize,
    pub status: String,
    pub event_type: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BookingLink {
    pub booking_link: String,
    pub event_type: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BookingRequest {
    #[serde(default)]
    pub event_type_uri: Option<String>,
    pub invitee_name: String,
    pub invitee_email: String,
    pub start_time: String,
    #[serde(default)]
    pub notes: Option<String>,
}
