use crate::errors::AppError;
use crate::models::{
    NumericInput, PlanInputRequest, ProgressState, Snapshot, Theme, clamp_field,
};
use crate::plan::{
    self, DAYS_MAX, DAYS_MIN, GOAL_MAX, GOAL_MIN, Plan, PlanResult, SessionsPerDay,
    resolve_active_plan,
};
use crate::storage::{
    KEY_HISTORY, KEY_PLAN, KEY_PROGRESS, KEY_RAMADAN_DAY, KEY_THEME, KvStore,
};
use crate::track::{self, HistoryLog, ProgressUpdate, TrackResult, UpdateMode};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

/// Everything the two screens show, plus the store it is mirrored into.
#[derive(Debug, Clone)]
pub struct Session {
    pub theme: Theme,
    pub live_inputs: Plan,
    pub saved_plan: Option<Plan>,
    pub progress: ProgressState,
    pub history: HistoryLog,
    pub ramadan_day: u32,
    pub plan_saved: bool,
    pub store: KvStore,
}

impl Session {
    /// Rebuilds the session from the store. Each key falls back to its
    /// default on its own when missing or unreadable.
    pub fn restore(store: KvStore) -> Self {
        let theme = match store.get(KEY_THEME) {
            Some(raw) => Theme::parse(raw).unwrap_or_else(|| {
                warn!("unknown theme {raw:?}, using light");
                Theme::Light
            }),
            None => Theme::Light,
        };
        let saved_plan = store.get_json::<Plan>(KEY_PLAN).map(Plan::sanitized);
        let progress = store.get_json::<ProgressState>(KEY_PROGRESS).unwrap_or_default();
        let history = store
            .get_json::<HistoryLog>(KEY_HISTORY)
            .unwrap_or_default()
            .truncated();
        let ramadan_day = match store.get(KEY_RAMADAN_DAY) {
            Some(raw) => NumericInput::Text(raw.to_string()).clamped(1, DAYS_MAX),
            None => 1,
        };

        let mut session = Self {
            theme,
            live_inputs: saved_plan.unwrap_or_default(),
            saved_plan,
            progress,
            history,
            ramadan_day: ramadan_day as u32,
            plan_saved: false,
            store,
        };
        session.progress.pages_completed = session.clamp_progress(session.progress.pages_completed);
        session.ramadan_day = session.clamp_day(i64::from(session.ramadan_day));
        session
    }

    pub fn active_plan(&self) -> Plan {
        resolve_active_plan(self.saved_plan.as_ref(), &self.live_inputs)
    }

    pub fn plan_result(&self) -> PlanResult {
        self.live_inputs.compute()
    }

    pub fn track_result(&self) -> TrackResult {
        track::compute(
            &self.active_plan(),
            i64::from(self.ramadan_day),
            &self.progress,
        )
    }

    pub fn snapshot(&self) -> Snapshot {
        let plan = self.plan_result();
        let track = self.track_result();
        Snapshot {
            theme: self.theme,
            live_inputs: self.live_inputs,
            saved_plan: self.saved_plan,
            active_plan: self.active_plan(),
            plan_display: plan.display(),
            plan,
            track_display: track.display(),
            track,
            progress: self.progress,
            history: self.history.clone(),
            ramadan_day: self.ramadan_day,
            plan_saved: self.plan_saved,
        }
    }

    /// Replaces the live plan-screen inputs. Fields left out of the request
    /// keep their current value.
    pub fn set_live_inputs(
        &mut self,
        request: &PlanInputRequest,
    ) -> Result<PlanResult, AppError> {
        let current = self.live_inputs;
        let goal = request
            .goal
            .as_ref()
            .map_or(i64::from(current.goal_cycles), |raw| {
                clamp_field(Some(raw), GOAL_MIN, GOAL_MAX)
            });
        let days = request
            .days
            .as_ref()
            .map_or(i64::from(current.days_total), |raw| {
                clamp_field(Some(raw), DAYS_MIN, DAYS_MAX)
            });
        let sessions = request
            .sessions
            .as_ref()
            .map_or(current.sessions_per_day, |raw| {
                SessionsPerDay::from_raw(raw.clamped(1, 5))
            });

        self.live_inputs = Plan::new(goal, days, sessions);
        self.plan_saved = false;
        self.reclamp_to_active_plan()?;
        Ok(self.plan_result())
    }

    pub fn save_plan(&mut self) -> Result<Plan, AppError> {
        let plan = self.live_inputs.sanitized();
        self.store.set_json(KEY_PLAN, &plan)?;
        self.saved_plan = Some(plan);
        self.plan_saved = true;
        self.reclamp_to_active_plan()?;
        info!(
            goal = plan.goal_cycles,
            days = plan.days_total,
            sessions = plan.sessions_per_day.count(),
            "plan saved"
        );
        Ok(plan)
    }

    pub fn set_day(&mut self, raw: Option<&NumericInput>) -> u32 {
        let days_total = self.active_plan().days_total;
        let day = clamp_field(raw, 1, i64::from(days_total)) as u32;
        self.ramadan_day = day;
        self.store.set(KEY_RAMADAN_DAY, day.to_string());
        day
    }

    pub fn record_progress(
        &mut self,
        mode: UpdateMode,
        raw: Option<&NumericInput>,
        now: DateTime<Utc>,
    ) -> Result<ProgressUpdate, AppError> {
        let update = track::apply_update(mode, raw, &self.active_plan(), self.ramadan_day, now);
        self.progress = update.progress;
        self.history.push(update.entry.clone());
        self.store.set_json(KEY_PROGRESS, &self.progress)?;
        self.store.set_json(KEY_HISTORY, &self.history)?;

        if update.ambiguous {
            warn!("page number is ambiguous for a multi-cycle goal");
        }
        info!(
            pages_completed = update.progress.pages_completed,
            "progress recorded"
        );
        Ok(update)
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.store.set(KEY_THEME, self.theme.as_str());
        self.theme
    }

    /// Clears plan, progress, history and the day cursor, in memory and in
    /// the store. The theme is left alone.
    pub fn reset(&mut self) {
        for key in [KEY_PLAN, KEY_PROGRESS, KEY_HISTORY, KEY_RAMADAN_DAY] {
            self.store.remove(key);
        }
        self.live_inputs = Plan::default();
        self.saved_plan = None;
        self.progress = ProgressState::default();
        self.history = HistoryLog::default();
        self.ramadan_day = 1;
        self.plan_saved = false;
        info!("session reset");
    }

    fn clamp_day(&self, day: i64) -> u32 {
        plan::clamp_int(day, 1, i64::from(self.active_plan().days_total)) as u32
    }

    fn clamp_progress(&self, pages: u32) -> u32 {
        pages.min(self.active_plan().total_pages())
    }

    /// Keeps the day cursor and progress inside the active plan after its
    /// goal or day total changed.
    fn reclamp_to_active_plan(&mut self) -> Result<(), AppError> {
        self.reclamp_day();
        self.reclamp_progress()
    }

    fn reclamp_day(&mut self) {
        let day = self.clamp_day(i64::from(self.ramadan_day));
        if day != self.ramadan_day {
            self.ramadan_day = day;
            self.store.set(KEY_RAMADAN_DAY, day.to_string());
        }
    }

    fn reclamp_progress(&mut self) -> Result<(), AppError> {
        let pages = self.clamp_progress(self.progress.pages_completed);
        if pages != self.progress.pages_completed {
            self.progress.pages_completed = pages;
            self.store.set_json(KEY_PROGRESS, &self.progress)?;
        }
        Ok(())
    }
}
