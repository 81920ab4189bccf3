use crate::models::Snapshot;
use chrono::Local;

pub fn render_index(snapshot: &Snapshot) -> String {
    let plan = &snapshot.plan_display;
    let track = &snapshot.track;
    let track_display = &snapshot.track_display;
    let inputs = &snapshot.live_inputs;

    INDEX_HTML
        .replace("{{THEME}}", snapshot.theme.as_str())
        .replace("{{GOAL}}", &inputs.goal_cycles.to_string())
        .replace("{{DAYS}}", &inputs.days_total.to_string())
        .replace("{{SESSION_OPTIONS}}", &session_options(inputs.sessions_per_day.count()))
        .replace("{{TOTAL_PAGES}}", &plan.total_pages.to_string())
        .replace("{{PER_DAY}}", &plan.per_day.to_string())
        .replace("{{PER_SESSION}}", &plan.per_session.to_string())
        .replace("{{PER_SALAH}}", &optional(plan.per_salah))
        .replace(
            "{{SAVED}}",
            if snapshot.plan_saved { "Plan saved." } else { "" },
        )
        .replace("{{DAY}}", &snapshot.ramadan_day.to_string())
        .replace("{{DAYS_TOTAL}}", &track.days_total.to_string())
        .replace("{{COMPLETED}}", &track.completed.to_string())
        .replace("{{TRACK_TOTAL}}", &track.total_pages.to_string())
        .replace("{{LEFT}}", &track.left.to_string())
        .replace("{{DAYS_LEFT}}", &track.days_left.to_string())
        .replace("{{PCT}}", &track_display.pct.to_string())
        .replace("{{NEEDED_DAY}}", &track_display.needed_per_day.to_string())
        .replace("{{NEEDED_SESSION}}", &track_display.needed_per_session.to_string())
        .replace("{{NEEDED_SALAH}}", &optional(track_display.needed_per_salah))
        .replace("{{IDEAL}}", &track_display.ideal_completed_by_now.to_string())
        .replace("{{STATUS}}", track.status.as_str())
        .replace("{{AMBIGUOUS}}", &ambiguity_notice(snapshot.active_plan.goal_cycles))
        .replace("{{LAST_UPDATED}}", &last_updated(snapshot))
        .replace("{{HISTORY}}", &history_items(snapshot))
}

fn optional(value: Option<u64>) -> String {
    value.map_or_else(|| "--".to_string(), |value| value.to_string())
}

fn session_options(selected: u32) -> String {
    [1u32, 2, 3, 5]
        .iter()
        .map(|count| {
            let marker = if *count == selected { " selected" } else { "" };
            format!(r#"<option value="{count}"{marker}>{count}</option>"#)
        })
        .collect()
}

fn ambiguity_notice(goal_cycles: u32) -> String {
    if goal_cycles > 1 {
        format!(
            r#"<p class="warning">With a goal of {goal_cycles} read-throughs a page number is ambiguous. Prefer "pages read".</p>"#
        )
    } else {
        String::new()
    }
}

fn last_updated(snapshot: &Snapshot) -> String {
    snapshot.progress.last_updated_at.map_or_else(
        || "never".to_string(),
        |at| at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
    )
}

fn history_items(snapshot: &Snapshot) -> String {
    if snapshot.history.is_empty() {
        return r#"<li class="empty">No updates yet</li>"#.to_string();
    }
    snapshot
        .history
        .iter()
        .map(|entry| {
            format!(
                "<li><span>{}</span><span>{}</span><span>{} pages</span></li>",
                entry.at.with_timezone(&Local).format("%m-%d %H:%M"),
                escape(&entry.label),
                entry.pages_completed
            )
        })
        .collect()
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en" data-theme="{{THEME}}">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Khatm Planner</title>
  <style>
    :root {
      --bg: #f8f3e6;
      --ink: #2b2a28;
      --muted: #8b857d;
      --accent: #2f6f58;
      --card: rgba(255, 255, 255, 0.9);
      --warn: #b5541c;
    }

    [data-theme="dark"] {
      --bg: #1d2226;
      --ink: #ecebe6;
      --muted: #9aa3a8;
      --accent: #7fc8a9;
      --card: rgba(40, 46, 51, 0.95);
      --warn: #f0a46b;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(860px, 100%);
      display: grid;
      gap: 24px;
    }

    header {
      display: flex;
      justify-content: space-between;
      align-items: center;
    }

    h1 {
      font-family: "Georgia", serif;
      margin: 0;
    }

    section {
      background: var(--card);
      border-radius: 22px;
      padding: 28px;
      display: grid;
      gap: 18px;
    }

    form {
      display: flex;
      flex-wrap: wrap;
      gap: 12px;
      align-items: end;
    }

    label {
      display: grid;
      gap: 6px;
      font-size: 0.85rem;
      color: var(--muted);
    }

    input, select, button {
      font: inherit;
      padding: 8px 12px;
      border-radius: 10px;
      border: 1px solid var(--muted);
    }

    button {
      background: var(--accent);
      color: white;
      border: none;
      cursor: pointer;
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(150px, 1fr));
      gap: 12px;
    }

    .stat .label {
      display: block;
      font-size: 0.8rem;
      text-transform: uppercase;
      letter-spacing: 0.1em;
      color: var(--muted);
    }

    .stat .value {
      font-size: 1.5rem;
      font-weight: 600;
    }

    .status[data-status="on-track"] { color: var(--accent); }
    .status[data-status="slightly-behind"] { color: var(--warn); }
    .status[data-status="behind"] { color: #c0392b; }

    .warning {
      color: var(--warn);
      margin: 0;
    }

    .saved {
      color: var(--accent);
      min-height: 1em;
      margin: 0;
    }

    ul {
      list-style: none;
      margin: 0;
      padding: 0;
      display: grid;
      gap: 6px;
    }

    li {
      display: grid;
      grid-template-columns: 110px 1fr auto;
      gap: 12px;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Khatm Planner</h1>
      <form method="post" action="/theme/toggle"><button type="submit">Theme</button></form>
    </header>

    <section id="plan">
      <h2>Plan</h2>
      <form method="post" action="/plan/save" id="plan-form">
        <label>Read-throughs <input type="number" name="goal" min="1" max="50" value="{{GOAL}}" /></label>
        <label>Days <input type="number" name="days" min="1" max="60" value="{{DAYS}}" /></label>
        <label>Sessions per day <select name="sessions">{{SESSION_OPTIONS}}</select></label>
        <button type="submit">Save plan</button>
      </form>
      <p class="saved" id="saved">{{SAVED}}</p>
      <div class="panel">
        <div class="stat"><span class="label">Total pages</span><span class="value" id="total-pages">{{TOTAL_PAGES}}</span></div>
        <div class="stat"><span class="label">Per day</span><span class="value" id="per-day">{{PER_DAY}}</span></div>
        <div class="stat"><span class="label">Per session</span><span class="value" id="per-session">{{PER_SESSION}}</span></div>
        <div class="stat"><span class="label">Per salah</span><span class="value" id="per-salah">{{PER_SALAH}}</span></div>
      </div>
    </section>

    <section id="track">
      <h2>Track</h2>
      <form method="post" action="/track/day">
        <label>Day (of {{DAYS_TOTAL}}) <input type="number" name="day" min="1" max="{{DAYS_TOTAL}}" value="{{DAY}}" /></label>
        <button type="submit">Set day</button>
      </form>
      <form method="post" action="/track/progress">
        <label>Report
          <select name="mode">
            <option value="onPage">I am on page</option>
            <option value="readPages">Pages read so far</option>
          </select>
        </label>
        <label>Value <input type="number" name="value" min="0" /></label>
        <button type="submit">Update</button>
      </form>
      {{AMBIGUOUS}}
      <div class="panel">
        <div class="stat"><span class="label">Completed</span><span class="value"><span id="completed">{{COMPLETED}}</span> / <span id="track-total">{{TRACK_TOTAL}}</span></span></div>
        <div class="stat"><span class="label">Progress</span><span class="value"><span id="pct">{{PCT}}</span>%</span></div>
        <div class="stat"><span class="label">Pages left</span><span class="value" id="left">{{LEFT}}</span></div>
        <div class="stat"><span class="label">Days left</span><span class="value" id="days-left">{{DAYS_LEFT}}</span></div>
        <div class="stat"><span class="label">Needed per day</span><span class="value" id="needed-day">{{NEEDED_DAY}}</span></div>
        <div class="stat"><span class="label">Needed per session</span><span class="value" id="needed-session">{{NEEDED_SESSION}}</span></div>
        <div class="stat"><span class="label">Needed per salah</span><span class="value" id="needed-salah">{{NEEDED_SALAH}}</span></div>
        <div class="stat"><span class="label">Ideal by now</span><span class="value" id="ideal">{{IDEAL}}</span></div>
      </div>
      <p class="status" id="status" data-status="{{STATUS}}">Status: <span id="status-text">{{STATUS}}</span> (last update: {{LAST_UPDATED}})</p>
      <h3>History</h3>
      <ul>{{HISTORY}}</ul>
      <form method="post" action="/reset"><button type="submit">Reset everything</button></form>
    </section>
  </main>
  <script>
    const planForm = document.getElementById('plan-form');
    const fields = {
      total: document.getElementById('total-pages'),
      perDay: document.getElementById('per-day'),
      perSession: document.getElementById('per-session'),
      perSalah: document.getElementById('per-salah'),
      saved: document.getElementById('saved')
    };
    const byId = (id) => document.getElementById(id);

    const refreshTrack = async () => {
      const res = await fetch('/api/state');
      if (!res.ok) {
        return;
      }
      const { track, trackDisplay } = await res.json();
      byId('completed').textContent = track.completed;
      byId('track-total').textContent = track.totalPages;
      byId('pct').textContent = trackDisplay.pct;
      byId('left').textContent = track.left;
      byId('days-left').textContent = track.daysLeft;
      byId('needed-day').textContent = trackDisplay.neededPerDay;
      byId('needed-session').textContent = trackDisplay.neededPerSession;
      byId('needed-salah').textContent = trackDisplay.neededPerSalah ?? '--';
      byId('ideal').textContent = trackDisplay.idealCompletedByNow;
      byId('status').dataset.status = track.status;
      byId('status-text').textContent = track.status;
    };

    const preview = async () => {
      const data = new FormData(planForm);
      const res = await fetch('/api/plan/preview', {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify({
          goal: data.get('goal'),
          days: data.get('days'),
          sessions: data.get('sessions')
        })
      });
      if (!res.ok) {
        return;
      }
      const { display } = await res.json();
      fields.total.textContent = display.totalPages;
      fields.perDay.textContent = display.perDay;
      fields.perSession.textContent = display.perSession;
      fields.perSalah.textContent = display.perSalah ?? '--';
      fields.saved.textContent = '';
      await refreshTrack();
    };

    planForm.addEventListener('input', () => {
      preview().catch(() => {});
    });
  </script>
</body>
</html>
"#;
