use crate::plan::{Plan, PlanDisplay, PlanResult, clamp_real};
use crate::track::{HistoryLog, TrackDisplay, TrackResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProgressState {
    #[serde(default)]
    pub pages_completed: u32,
    #[serde(default)]
    pub last_updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub at: DateTime<Utc>,
    pub label: String,
    pub pages_completed: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// A numeric field as it arrives from a form or JSON body: a number, free
/// text that may or may not parse, or any other JSON value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl NumericInput {
    pub fn as_f64(&self) -> f64 {
        match self {
            NumericInput::Number(value) => *value,
            NumericInput::Text(text) => text.trim().parse::<f64>().unwrap_or(f64::NAN),
            NumericInput::Other(_) => f64::NAN,
        }
    }

    pub fn clamped(&self, min: i64, max: i64) -> i64 {
        clamp_real(self.as_f64(), min, max)
    }
}

/// Clamps an optional field; anything missing is treated like non-numeric input.
pub fn clamp_field(input: Option<&NumericInput>, min: i64, max: i64) -> i64 {
    input.map_or(min, |value| value.clamped(min, max))
}

#[derive(Debug, Default, Deserialize)]
pub struct PlanInputRequest {
    #[serde(default)]
    pub goal: Option<NumericInput>,
    #[serde(default)]
    pub days: Option<NumericInput>,
    #[serde(default)]
    pub sessions: Option<NumericInput>,
}

impl PlanInputRequest {
    pub fn is_empty(&self) -> bool {
        self.goal.is_none() && self.days.is_none() && self.sessions.is_none()
    }
}

#[derive(Debug, Deserialize)]
pub struct DayRequest {
    #[serde(default)]
    pub day: Option<NumericInput>,
}

#[derive(Debug, Deserialize)]
pub struct ProgressRequest {
    pub mode: String,
    #[serde(default)]
    pub value: Option<NumericInput>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanPreviewResponse {
    pub result: PlanResult,
    pub display: PlanDisplay,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResponse {
    pub progress: ProgressState,
    pub entry: HistoryEntry,
    pub track: TrackResult,
    pub display: TrackDisplay,
    pub ambiguous_page_warning: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub theme: Theme,
    pub live_inputs: Plan,
    pub saved_plan: Option<Plan>,
    pub active_plan: Plan,
    pub plan: PlanResult,
    pub plan_display: PlanDisplay,
    pub track: TrackResult,
    pub track_display: TrackDisplay,
    pub progress: ProgressState,
    pub history: HistoryLog,
    pub ramadan_day: u32,
    pub plan_saved: bool,
}
