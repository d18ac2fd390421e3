use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AiInsight {
    pub date: String,
    pub summary: String,
    pub actionable_items: Vec<String>,
    pub created_at: String,
}

/// What the model is asked to return.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct InsightPayload {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub actionable_items: Vec<String>,
}
