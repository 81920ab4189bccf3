use crate::models::{HistoryEntry, NumericInput, ProgressState};
use crate::plan::{DAYS_MAX, DAYS_MIN, Plan, SALAH_PER_DAY, TOTAL_UNITS, clamp_int, display_pages};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Pages ahead of or behind the linear pace that still count as on schedule.
pub const STATUS_TOLERANCE: f64 = 10.0;

pub const HISTORY_CAPACITY: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    OnTrack,
    SlightlyBehind,
    Behind,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::OnTrack => "on-track",
            Status::SlightlyBehind => "slightly-behind",
            Status::Behind => "behind",
        }
    }
}

pub fn classify(delta: f64) -> Status {
    if delta >= STATUS_TOLERANCE {
        Status::OnTrack
    } else if delta >= -STATUS_TOLERANCE {
        Status::SlightlyBehind
    } else {
        Status::Behind
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackResult {
    pub total_pages: u32,
    pub completed: u32,
    pub left: u32,
    pub days_total: u32,
    pub day_now: u32,
    pub days_left: u32,
    pub needed_per_day: f64,
    pub needed_per_session: f64,
    pub needed_per_salah: Option<f64>,
    pub pct: f64,
    pub ideal_completed_by_now: f64,
    pub delta: f64,
    pub status: Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackDisplay {
    pub needed_per_day: u64,
    pub needed_per_session: u64,
    pub needed_per_salah: Option<u64>,
    pub pct: u64,
    pub ideal_completed_by_now: u64,
}

impl TrackResult {
    pub fn display(&self) -> TrackDisplay {
        TrackDisplay {
            needed_per_day: display_pages(self.needed_per_day),
            needed_per_session: display_pages(self.needed_per_session),
            needed_per_salah: self.needed_per_salah.map(display_pages),
            pct: display_pages(self.pct),
            ideal_completed_by_now: display_pages(self.ideal_completed_by_now),
        }
    }
}

pub fn compute(active_plan: &Plan, cursor_day: i64, progress: &ProgressState) -> TrackResult {
    let total_pages = active_plan.total_pages();
    let days_total = clamp_int(i64::from(active_plan.days_total), DAYS_MIN, DAYS_MAX);
    let day_now = clamp_int(cursor_day, 1, days_total);

    let completed = progress.pages_completed.min(total_pages);
    let left = total_pages.saturating_sub(completed);
    let days_left = (days_total - day_now + 1).max(0);

    let needed_per_day = if days_left > 0 {
        f64::from(left) / days_left as f64
    } else {
        f64::from(left)
    };
    let sessions = active_plan.sessions_per_day;
    let needed_per_session = needed_per_day / f64::from(sessions.count());
    let needed_per_salah = sessions
        .is_per_salah()
        .then(|| needed_per_day / f64::from(SALAH_PER_DAY));

    let pct = if total_pages == 0 {
        0.0
    } else {
        f64::from(completed) / f64::from(total_pages) * 100.0
    };
    let ideal_completed_by_now = f64::from(total_pages) / days_total as f64 * day_now as f64;
    let delta = f64::from(completed) - ideal_completed_by_now;

    TrackResult {
        total_pages,
        completed,
        left,
        days_total: days_total as u32,
        day_now: day_now as u32,
        days_left: days_left as u32,
        needed_per_day,
        needed_per_session,
        needed_per_salah,
        pct,
        ideal_completed_by_now,
        delta,
        status: classify(delta),
    }
}

/// Newest-first log of progress updates, holding at most [`HISTORY_CAPACITY`] entries.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryLog {
    entries: VecDeque<HistoryEntry>,
}

impl HistoryLog {
    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(HISTORY_CAPACITY);
    }

    /// Drops anything past capacity, for logs that came from storage.
    pub fn truncated(mut self) -> Self {
        self.entries.truncate(HISTORY_CAPACITY);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UpdateMode {
    OnPage,
    ReadPages,
}

impl UpdateMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "onPage" => Some(UpdateMode::OnPage),
            "readPages" => Some(UpdateMode::ReadPages),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    pub progress: ProgressState,
    pub entry: HistoryEntry,
    /// A bare page number cannot tell which read-through it belongs to.
    pub ambiguous: bool,
}

/// Turns a raw progress report into a pages-completed count and its history entry.
pub fn apply_update(
    mode: UpdateMode,
    raw: Option<&NumericInput>,
    active_plan: &Plan,
    cursor_day: u32,
    now: DateTime<Utc>,
) -> ProgressUpdate {
    let total_pages = i64::from(active_plan.total_pages());
    let (pages_completed, label) = match mode {
        UpdateMode::OnPage => {
            let page = raw.map_or(1, |value| value.clamped(1, i64::from(TOTAL_UNITS)));
            let completed = clamp_int(page - 1, 0, total_pages);
            (completed, format!("Day {cursor_day}: on page {page}"))
        }
        UpdateMode::ReadPages => {
            let read = raw.map_or(0, |value| value.clamped(0, total_pages));
            (read, format!("Day {cursor_day}: {read} pages read"))
        }
    };
    let pages_completed = pages_completed as u32;

    ProgressUpdate {
        progress: ProgressState {
            pages_completed,
            last_updated_at: Some(now),
        },
        entry: HistoryEntry {
            at: now,
            label,
            pages_completed,
        },
        ambiguous: mode == UpdateMode::OnPage && active_plan.goal_cycles > 1,
    }
}
