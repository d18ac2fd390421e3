use serde::{Deserialize, Serialize};
use std::str::FromStr;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    New,
    Called,
    NoAnswer,
    DidntBook,
    Booked,
    CalledNoAnswer,
    AnsweredDeclinedDemo,
    AnsweredAcceptedDemo,
}

impl LeadStatus {
    /// Statuses a cold-call session will still dial.
    pub const CALLABLE: [LeadStatus; 2] = [LeadStatus::New, LeadStatus::NoAnswer];

    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::Called => "called",
            LeadStatus::NoAnswer => "no_answer",
            LeadStatus::DidntBook => "didnt_book",
            LeadStatus::Booked => "booked",
            LeadStatus::CalledNoAnswer => "called_no_answer",
            LeadStatus::AnsweredDeclinedDemo => "answered_declined_demo",
            LeadStatus::AnsweredAcceptedDemo => "answered_accepted_demo",
        }
    }
}

impl FromStr for LeadStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "new" => Ok(LeadStatus::New),
            "called" => Ok(LeadStatus::Called),
            "no_answer" => Ok(LeadStatus::NoAnswer),
            "didnt_book" => Ok(LeadStatus::DidntBook),
            "booked" => Ok(LeadStatus::Booked),
            "called_no_answer" => Ok(LeadStatus::CalledNoAnswer),
            "answered_declined_demo" => Ok(LeadStatus::AnsweredDeclinedDemo),
            "answered_accepted_demo" => Ok(LeadStatus::AnsweredAcceptedDemo),
            other => Err(format!("Unknown lead status: {}", other)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Lead {
    pub id: String,
    pub client_id: Option<String>,
    pub name: String,
    pub email: Option<String>,
    pub phone: String,
    pub niche: Option<String>,
    pub city: Option<String>,
    pub website: Option<String>,
    pub list_id: Option<String>,
    pub status: LeadStatus,
    pub cold_caller_id: Option<String>,
    pub source: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct LeadInput {
    #[validate(length(min = 1, message = "Lead name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Phone is required"))]
    pub phone: String,
    #[validate(email(message = "Invalid email address"))]
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub niche: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub list_id: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub cold_caller_id: Option<String>,
    #[serde(default)]
    pub status: Option<LeadStatus>,
}

/// Row shape for batch inserts coming from imports.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLead {
    pub list_id: String,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub city: Option<String>,
    pub website: Option<String>,
    pub niche: Option<String>,
    pub source: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct LeadColumnMap {
    pub name: String,
    pub city: Option<String>,
    pub phone: String,
    pub email: Option<String>,
    pub website: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LeadList {
    pub id: String,
    pub name: String,
    pub niche: Option<String>,
    pub total_count: i64,
    pub assigned_cold_callers: Vec<String>,
    pub csv_column_map: Option<LeadColumnMap>,
    pub created_at: String,
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct LeadListInput {
    #[validate(length(min = 1, message = "List name is required"))]
    pub name: String,
    #[serde(default)]
    pub niche: Option<String>,
    #[serde(default)]
    pub assigned_cold_callers: Vec<String>,
}

/// Digits-only phone, used to spot duplicates that differ only in formatting.
pub fn phone_key(phone: &str) -> String {
    phone.chars().filter(|c| c.is_ascii_digit()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_key_strips_formatting() {
        assert_eq!(phone_key("(905) 555-0101"), "9055550101");
        assert_eq!(phone_key("+1 905.555.0101"), "19055550101");
    }

    #[test]
    fn status_parses_from_wire_names() {
        assert_eq!("didnt_book".parse::<LeadStatus>().unwrap(), LeadStatus::DidntBook);
        assert_eq!(
            serde_json::to_string(&LeadStatus::NoAnswer).unwrap(),
            "\"no_answer\""
        );
        assert!("maybe".parse::<LeadStatus>().is_err());
    }
}
