use serde::{Deserialize, Serialize};

/// Pages in one full read-through of the mushaf.
pub const TOTAL_UNITS: u32 = 604;

pub const GOAL_MIN: i64 = 1;
pub const GOAL_MAX: i64 = 50;
pub const DAYS_MIN: i64 = 1;
pub const DAYS_MAX: i64 = 60;

pub const SALAH_PER_DAY: u32 = 5;

pub fn clamp_int(value: i64, min: i64, max: i64) -> i64 {
    value.max(min).min(max)
}

/// Clamps a real-valued input into `[min, max]` after truncating it.
/// NaN collapses to `min`.
pub fn clamp_real(value: f64, min: i64, max: i64) -> i64 {
    if value.is_nan() {
        return min;
    }
    let truncated = value.trunc();
    if truncated <= min as f64 {
        min
    } else if truncated >= max as f64 {
        max
    } else {
        truncated as i64
    }
}

/// Rounds a computed page count for display; never below zero.
pub fn display_pages(value: f64) -> u64 {
    if value.is_nan() || value <= 0.0 {
        return 0;
    }
    value.round() as u64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum SessionsPerDay {
    One,
    Two,
    Three,
    Five,
}

impl SessionsPerDay {
    pub fn count(self) -> u32 {
        match self {
            SessionsPerDay::One => 1,
            SessionsPerDay::Two => 2,
            SessionsPerDay::Three => 3,
            SessionsPerDay::Five => 5,
        }
    }

    pub fn is_per_salah(self) -> bool {
        self == SessionsPerDay::Five
    }

    pub fn from_raw(value: i64) -> Self {
        match value {
            2 => SessionsPerDay::Two,
            3 => SessionsPerDay::Three,
            5 => SessionsPerDay::Five,
            _ => SessionsPerDay::One,
        }
    }
}

impl From<u32> for SessionsPerDay {
    fn from(value: u32) -> Self {
        Self::from_raw(i64::from(value))
    }
}

impl From<SessionsPerDay> for u32 {
    fn from(value: SessionsPerDay) -> Self {
        value.count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    #[serde(rename = "goalKhatmah")]
    pub goal_cycles: u32,
    pub days_total: u32,
    pub sessions_per_day: SessionsPerDay,
}

impl Default for Plan {
    fn default() -> Self {
        Self {
            goal_cycles: 1,
            days_total: 30,
            sessions_per_day: SessionsPerDay::Five,
        }
    }
}

impl Plan {
    pub fn new(goal_cycles: i64, days_total: i64, sessions_per_day: SessionsPerDay) -> Self {
        Self {
            goal_cycles: clamp_int(goal_cycles, GOAL_MIN, GOAL_MAX) as u32,
            days_total: clamp_int(days_total, DAYS_MIN, DAYS_MAX) as u32,
            sessions_per_day,
        }
    }

    /// Re-applies the field ranges to a plan that came from storage.
    pub fn sanitized(self) -> Self {
        Self::new(
            i64::from(self.goal_cycles),
            i64::from(self.days_total),
            self.sessions_per_day,
        )
    }

    pub fn total_pages(&self) -> u32 {
        TOTAL_UNITS * self.goal_cycles
    }

    pub fn compute(&self) -> PlanResult {
        compute(
            i64::from(self.goal_cycles),
            i64::from(self.days_total),
            self.sessions_per_day,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanResult {
    pub goal_cycles: u32,
    pub days_total: u32,
    pub sessions_per_day: u32,
    pub total_pages: u32,
    pub per_day: f64,
    pub per_session: f64,
    pub per_salah: Option<f64>,
}

impl PlanResult {
    pub fn display(&self) -> PlanDisplay {
        PlanDisplay {
            total_pages: self.total_pages,
            per_day: display_pages(self.per_day),
            per_session: display_pages(self.per_session),
            per_salah: self.per_salah.map(display_pages),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDisplay {
    pub total_pages: u32,
    pub per_day: u64,
    pub per_session: u64,
    pub per_salah: Option<u64>,
}

pub fn compute(goal_cycles: i64, days_total: i64, sessions_per_day: SessionsPerDay) -> PlanResult {
    let plan = Plan::new(goal_cycles, days_total, sessions_per_day);
    let total_pages = plan.total_pages();
    let per_day = f64::from(total_pages) / f64::from(plan.days_total);
    let per_session = per_day / f64::from(sessions_per_day.count());
    let per_salah = sessions_per_day
        .is_per_salah()
        .then(|| per_day / f64::from(SALAH_PER_DAY));

    PlanResult {
        goal_cycles: plan.goal_cycles,
        days_total: plan.days_total,
        sessions_per_day: sessions_per_day.count(),
        total_pages,
        per_day,
        per_session,
        per_salah,
    }
}

/// The saved plan wins; before anything is saved the live inputs stand in.
pub fn resolve_active_plan(saved: Option<&Plan>, live: &Plan) -> Plan {
    match saved {
        Some(plan) => plan.sanitized(),
        None => live.sanitized(),
    }
}
