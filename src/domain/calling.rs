use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::lead::LeadStatus;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CallOutcome {
    NoAnswer,
    DidntBook,
    Booked,
}

impl CallOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallOutcome::NoAnswer => "no_answer",
            CallOutcome::DidntBook => "didnt_book",
            CallOutcome::Booked => "booked",
        }
    }

    pub fn lead_status(&self) -> LeadStatus {
        match self {
            CallOutcome::NoAnswer => LeadStatus::NoAnswer,
            CallOutcome::DidntBook => LeadStatus::DidntBook,
            CallOutcome::Booked => LeadStatus::Booked,
        }
    }
}

impl FromStr for CallOutcome {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "no_answer" => Ok(CallOutcome::NoAnswer),
            "didnt_book" => Ok(CallOutcome::DidntBook),
            "booked" => Ok(CallOutcome::Booked),
            other => Err(format!("Unknown call outcome: {}", other)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CallLog {
    pub id: String,
    pub lead_id: String,
    pub cold_caller_id: String,
    pub outcome: CallOutcome,
    pub created_at: String,
}

/// Date/time picked in the booking dialog after a successful call.
#[derive(Debug, Deserialize, Clone)]
pub struct BookingDetails {
    pub date: String,
    pub time: String,
    #[serde(default)]
    pub notes: Option<String>,
}

impl BookingDetails {
    /// `YYYY-MM-DD` + `HH:MM` → `YYYY-MM-DDTHH:MM:00`.
    pub fn scheduled_at(&self) -> String {
        format!("{}T{}:00", self.date.trim(), self.time.trim())
    }
}
