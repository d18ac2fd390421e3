use serde::{Deserialize, Serialize};
use std::str::FromStr;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DealStage {
    Qualification,
    Proposal,
    Negotiation,
    ClosedWon,
    ClosedLost,
}

impl DealStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            DealStage::Qualification => "qualification",
            DealStage::Proposal => "proposal",
            DealStage::Negotiation => "negotiation",
            DealStage::ClosedWon => "closed_won",
            DealStage::ClosedLost => "closed_lost",
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, DealStage::ClosedWon | DealStage::ClosedLost)
    }
}

impl FromStr for DealStage {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "qualification" => Ok(DealStage::Qualification),
            "proposal" => Ok(DealStage::Proposal),
            "negotiation" => Ok(DealStage::Negotiation),
            "closed_won" => Ok(DealStage::ClosedWon),
            "closed_lost" => Ok(DealStage::ClosedLost),
            other => Err(format!("Unknown deal stage: {}", other)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Deal {
    pub id: String,
    pub client_id: Option<String>,
    pub lead_id: Option<String>,
    pub meeting_id: Option<String>,
    pub name: String,
    pub value: f64,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub stage: DealStage,
    pub closer_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize, Clone, Validate)]
#[validate(schema(function = "validate_value_range"))]
pub struct DealInput {
    #[validate(length(min = 1, message = "Deal name is required"))]
    pub name: String,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub lead_id: Option<String>,
    #[validate(range(min = 0.0, message = "Deal value cannot be negative"))]
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub min_value: Option<f64>,
    #[serde(default)]
    pub max_value: Option<f64>,
    #[serde(default)]
    pub stage: Option<DealStage>,
    #[serde(default)]
    pub closer_id: Option<String>,
}

fn validate_value_range(input: &DealInput) -> Result<(), validator::ValidationError> {
    match (input.min_value, input.max_value) {
        (Some(min), Some(max)) if min > max => {
            let mut err = validator::ValidationError::new("value_range");
            err.message = Some("min_value cannot exceed max_value".into());
            Err(err)
        }
        _ => Ok(()),
    }
}

/// Deal created automatically when a cold call books a meeting.
#[derive(Debug, Clone)]
pub struct NewDeal {
    pub client_id: Option<String>,
    pub lead_id: Option<String>,
    pub meeting_id: Option<String>,
    pub name: String,
    pub value: f64,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub stage: DealStage,
    pub closer_id: Option<String>,
}

impl From<DealInput> for NewDeal {
    fn from(input: DealInput) -> Self {
        Self {
            client_id: input.client_id,
            lead_id: input.lead_id,
            meeting_id: None,
            name: input.name,
            value: input.value,
            min_value: input.min_value,
            max_value: input.max_value,
            stage: input.stage.unwrap_or(DealStage::Qualification),
            closer_id: input.closer_id,
        }
    }
}
